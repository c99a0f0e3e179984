use crate::Result;

/// Salted one-way hashing for stored passwords. The cost factor comes from
/// configuration; bcrypt's verify does the final comparison in constant time.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, plaintext: &str) -> Result<String> {
        Ok(bcrypt::hash(plaintext, self.cost)?)
    }

    pub fn verify(&self, plaintext: &str, digest: &str) -> Result<bool> {
        Ok(bcrypt::verify(plaintext, digest)?)
    }
}
