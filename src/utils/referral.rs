/// Base62 alphabet: base64 without `+` and `/`, which are unsafe in URLs.
const ALPHABET: &[u8; 62] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

pub const REFERRAL_CODE_LEN: usize = 10;

/// Generate a random base62 referral code. Uniqueness is enforced by the
/// database constraint; at 62^10 the collision odds are negligible.
pub fn generate_referral_code() -> String {
    let mut buf = [0u8; REFERRAL_CODE_LEN];
    if getrandom::getrandom(&mut buf).is_err() {
        // OS RNG 不可用时退化为时间戳派生（仅用于推荐码，不用于密钥）
        let t = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        for (i, b) in buf.iter_mut().enumerate() {
            *b = (t >> (i * 6)) as u8;
        }
    }
    buf.iter()
        .map(|b| ALPHABET[(*b as usize) % ALPHABET.len()] as char)
        .collect()
}
