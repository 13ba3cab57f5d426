//! Password hashing with bcrypt at the library's default cost.

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}

pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
}

/// False on mismatch and on a digest bcrypt cannot parse.
pub fn verify_password(password: &str, digest: &str) -> bool {
    match bcrypt::verify(password, digest) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!("Rejecting malformed password digest: {}", e);
            false
        }
    }
}
