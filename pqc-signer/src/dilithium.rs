//! Dilithium post-quantum digital signature engine
//!
//! # About Dilithium
//!
//! Dilithium is the lattice-based signature scheme selected in the NIST
//! post-quantum standardization process (FIPS 204). The engine here wraps the
//! three parameter sets of `pqcrypto-dilithium` behind one stateless type:
//!
//! - **Dilithium2**: smallest keys and signatures, fastest. Used for
//!   interactive requests when no mode is named.
//! - **Dilithium3**: NIST Level 3 (equivalent to AES-192).
//! - **Dilithium5**: largest and slowest. Used for benchmarks when no mode is
//!   named, since it is the worst case.
//!
//! # Detached signatures
//!
//! `pqcrypto-dilithium` can produce either a `SignedMessage`
//! (`[signature] + [message]`) or a detached signature. Only detached
//! signatures are exposed: the message travels separately and the signature
//! length is fixed per tier.
//!
//! # Malformed input
//!
//! Byte lengths are checked against [`Mode::info`] before anything reaches the
//! C implementation. A secret key of the wrong length is `MalformedKey`; a
//! public key or signature of the wrong length is `MalformedInput`. Correctly
//! sized bytes that simply do not verify yield `Ok(false)`.

use crate::error::{PqcError, Result};
use crate::mode::Mode;
use crate::traits::{KeyPair, SignatureScheme};
use pqcrypto_traits::sign::{DetachedSignature as _, PublicKey as _, SecretKey as _};

/// Bind the `pqcrypto-dilithium` module matching `$mode` to `$params` and
/// evaluate `$body` with it.
macro_rules! with_params {
    ($mode:expr, $params:ident => $body:expr) => {
        match $mode {
            Mode::Dilithium2 => {
                use pqcrypto_dilithium::dilithium2 as $params;
                $body
            }
            Mode::Dilithium3 => {
                use pqcrypto_dilithium::dilithium3 as $params;
                $body
            }
            Mode::Dilithium5 => {
                use pqcrypto_dilithium::dilithium5 as $params;
                $body
            }
        }
    };
}

/// Dilithium signature engine
///
/// # Example
///
/// ```rust
/// use pqc_signer::{DilithiumEngine, Mode, SignatureScheme};
///
/// let engine = DilithiumEngine::new(Mode::Dilithium2);
/// let keypair = engine.generate_keypair().unwrap();
///
/// let message = b"hello";
/// let signature = engine.sign(&keypair.secret_key, message).unwrap();
///
/// assert!(engine.verify(&keypair.public_key, message, &signature).unwrap());
/// assert!(!engine.verify(&keypair.public_key, b"hallo", &signature).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DilithiumEngine {
    mode: Mode,
}

impl DilithiumEngine {
    /// Create an engine for a resolved tier
    pub fn new(mode: Mode) -> Self {
        Self { mode }
    }

    /// Resolve `mode_name` and create an engine for it
    ///
    /// # Errors
    /// - Returns `InvalidMode` if the name is not a supported tier
    pub fn from_mode_name(mode_name: &str) -> Result<Self> {
        Mode::resolve(mode_name).map(Self::new)
    }

    fn check_length(&self, what: &str, expected: usize, actual: usize) -> Option<String> {
        (expected != actual).then(|| {
            format!(
                "Invalid {} length for {}: expected {} bytes, got {}",
                what, self.mode, expected, actual
            )
        })
    }
}

impl SignatureScheme for DilithiumEngine {
    /// Generate a new keypair from the system randomness source
    ///
    /// # Errors
    /// - Returns `KeyGenerationError` if the produced keys do not have the
    ///   sizes the tier prescribes
    fn generate_keypair(&self) -> Result<KeyPair> {
        let (public_key, secret_key) = with_params!(self.mode, params => {
            let (pk, sk) = params::keypair();
            (pk.as_bytes().to_vec(), sk.as_bytes().to_vec())
        });

        let info = self.mode.info();
        if let Some(msg) = self
            .check_length("public key", info.public_key_size, public_key.len())
            .or_else(|| self.check_length("secret key", info.secret_key_size, secret_key.len()))
        {
            return Err(PqcError::KeyGenerationError(msg));
        }

        tracing::debug!(
            "Generated {} keypair: pk_len={} bytes, sk_len={} bytes",
            self.mode,
            public_key.len(),
            secret_key.len()
        );

        Ok(KeyPair {
            public_key,
            secret_key,
        })
    }

    /// Sign message
    ///
    /// # Errors
    /// - Returns `MalformedKey` if the secret key has the wrong length or
    ///   fails to decode
    fn sign(&self, secret_key: &[u8], message: &[u8]) -> Result<Vec<u8>> {
        let info = self.mode.info();
        if let Some(msg) = self.check_length("secret key", info.secret_key_size, secret_key.len()) {
            return Err(PqcError::MalformedKey(msg));
        }

        let signature = with_params!(self.mode, params => {
            let sk = params::SecretKey::from_bytes(secret_key).map_err(|e| {
                PqcError::MalformedKey(format!("Failed to parse secret key: {:?}", e))
            })?;
            params::detached_sign(message, &sk).as_bytes().to_vec()
        });

        if signature.len() != info.signature_size {
            return Err(PqcError::SigningError(format!(
                "Unexpected signature length: expected {} bytes, got {}",
                info.signature_size,
                signature.len()
            )));
        }

        tracing::debug!(
            "Signed message with {}: msg_len={} bytes, sig_len={} bytes",
            self.mode,
            message.len(),
            signature.len()
        );

        Ok(signature)
    }

    /// Verify signature
    ///
    /// # Returns
    /// - `Ok(true)`: Signature is valid
    /// - `Ok(false)`: Signature is well-formed but invalid
    /// - `Err(MalformedInput)`: Public key or signature cannot be decoded for
    ///   this tier
    fn verify(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<bool> {
        let info = self.mode.info();
        if let Some(msg) = self
            .check_length("public key", info.public_key_size, public_key.len())
            .or_else(|| self.check_length("signature", info.signature_size, signature.len()))
        {
            return Err(PqcError::MalformedInput(msg));
        }

        let is_valid = with_params!(self.mode, params => {
            let pk = params::PublicKey::from_bytes(public_key).map_err(|e| {
                PqcError::MalformedInput(format!("Failed to parse public key: {:?}", e))
            })?;
            let sig = params::DetachedSignature::from_bytes(signature).map_err(|e| {
                PqcError::MalformedInput(format!("Failed to parse signature: {:?}", e))
            })?;
            params::verify_detached_signature(&sig, message, &pk).is_ok()
        });

        tracing::debug!(
            "{} signature verification: valid={}, msg_len={} bytes",
            self.mode,
            is_valid,
            message.len()
        );

        Ok(is_valid)
    }

    fn mode(&self) -> Mode {
        self.mode
    }
}
