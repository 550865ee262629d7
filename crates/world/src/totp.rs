// SPDX-License-Identifier: MIT

//! RFC 6238 TOTP over a base32 secret, 30s step, 6 digits, HMAC-SHA1
//! (`SPEC_FULL.md` §4 "TOTP": the conventional default the distillation
//! omitted; used by `AuthMode::Otp`, `§4.9`).

use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

const STEP_SECONDS: u64 = 30;
const DIGITS: u32 = 6;

/// Compute the current TOTP code for `secret_base32` at `now_ms`.
/// Returns `None` if the secret is not valid base32.
pub fn totp_now(secret_base32: &str, now_ms: u64) -> Option<String> {
    let secret = base32::decode(base32::Alphabet::RFC4648 { padding: false }, secret_base32)?;
    let counter = (now_ms / 1000) / STEP_SECONDS;
    let mut mac = HmacSha1::new_from_slice(&secret).ok()?;
    mac.update(&counter.to_be_bytes());
    let result = mac.finalize().into_bytes();

    let offset = (result[result.len() - 1] & 0x0f) as usize;
    let truncated = ((u32::from(result[offset]) & 0x7f) << 24)
        | (u32::from(result[offset + 1]) << 16)
        | (u32::from(result[offset + 2]) << 8)
        | u32::from(result[offset + 3]);

    let modulus = 10u32.pow(DIGITS);
    Some(format!("{:0width$}", truncated % modulus, width = DIGITS as usize))
}

/// Verify a candidate code against the current step.
pub fn verify(secret_base32: &str, now_ms: u64, candidate: &str) -> bool {
    totp_now(secret_base32, now_ms).as_deref() == Some(candidate)
}

#[cfg(test)]
#[path = "totp_tests.rs"]
mod tests;
