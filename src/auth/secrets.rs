use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::Rng;

/// Four-digit verification code, uniform over [1000, 9999]. Drawn from the
/// OS entropy source; codes are guessable in 9000 tries at best, so the
/// consume-once store semantics carry the real weight here.
pub fn generate_otp() -> i32 {
    OsRng.gen_range(1000..=9999)
}

/// Single-use opaque token for password-reset links. 24 random bytes,
/// URL-safe base64 without padding: 32 characters, 192 bits of entropy.
pub fn generate_opaque_token() -> String {
    let mut bytes = [0u8; 24];
    OsRng.fill(&mut bytes[..]);
    URL_SAFE_NO_PAD.encode(bytes)
}
