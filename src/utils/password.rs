use anyhow::{Context, Result};

/// bcrypt at the library default cost. Social-only accounts store an
/// empty string instead of a hash and never go through these functions;
/// callers check for that before verifying.
pub fn hash_password(plain: &str) -> Result<String> {
    bcrypt::hash(plain, bcrypt::DEFAULT_COST).context("Password hashing failed")
}

/// False means wrong password; a malformed stored hash is an error, not
/// a mismatch.
pub fn verify_password(plain: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(plain, hash).context("Password verification failed")
}
