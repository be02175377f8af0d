/// Unified interface for post-quantum signatures
use crate::error::Result;
use crate::mode::Mode;

/// Freshly generated key material
///
/// Both halves are raw scheme encodings, owned by the caller for the duration
/// of one request. Nothing here is persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub public_key: Vec<u8>,
    pub secret_key: Vec<u8>,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key_len", &self.public_key.len())
            .field("secret_key_len", &self.secret_key.len())
            .finish()
    }
}

/// Stateless signature scheme bound to one parameter tier
///
/// Keys are passed in on every call, so one value can serve any number of
/// concurrent requests.
pub trait SignatureScheme {
    /// Generate keypair
    fn generate_keypair(&self) -> Result<KeyPair>;

    /// Produce a detached signature over `message`
    fn sign(&self, secret_key: &[u8], message: &[u8]) -> Result<Vec<u8>>;

    /// Verify a detached signature
    ///
    /// `Ok(false)` means well-formed inputs that do not verify. Inputs that
    /// cannot be decoded for this tier are reported as errors instead.
    fn verify(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<bool>;

    /// Parameter tier
    fn mode(&self) -> Mode;

    /// Algorithm name
    fn algorithm_name(&self) -> &str {
        self.mode().name()
    }
}
