use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("hashing task was cancelled")]
    Cancelled,
}

/// Salted one-way password hashing with a configurable work factor.
///
/// bcrypt key stretching is CPU-bound, so both operations run on the
/// blocking thread pool rather than on the async executor.
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let cost = self.cost;
        let plaintext = plaintext.to_owned();
        tokio::task::spawn_blocking(move || bcrypt::hash(plaintext, cost))
            .await
            .map_err(|_| PasswordError::Cancelled)?
            .map_err(PasswordError::from)
    }

    /// A mismatch is a normal negative result, not an error.
    pub async fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, PasswordError> {
        let plaintext = plaintext.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || bcrypt::verify(plaintext, &hash))
            .await
            .map_err(|_| PasswordError::Cancelled)?
            .map_err(PasswordError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum bcrypt cost keeps the suite fast
    fn hasher() -> PasswordHasher {
        PasswordHasher::new(4)
    }

    #[tokio::test]
    async fn hash_then_verify_round_trips() {
        let hasher = hasher();
        let hash = hasher.hash("secret1").await.unwrap();
        assert_ne!(hash, "secret1");
        assert!(hasher.verify("secret1", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn wrong_password_does_not_verify() {
        let hasher = hasher();
        let hash = hasher.hash("secret1").await.unwrap();
        assert!(!hasher.verify("secret2", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn hashes_embed_unique_salts() {
        let hasher = hasher();
        let a = hasher.hash("secret1").await.unwrap();
        let b = hasher.hash("secret1").await.unwrap();
        assert_ne!(a, b);
    }
}
