//! Post-quantum cryptography signature library
//!
//! Provides the three NIST-standardized Dilithium parameter tiers behind a
//! single stateless engine.
//!
//! # Quick Start
//!
//! ```rust
//! use pqc_signer::{DilithiumEngine, Mode, SignatureScheme};
//!
//! // Resolve the tier by name
//! let mode = Mode::resolve("Dilithium3").unwrap();
//! let engine = DilithiumEngine::new(mode);
//!
//! // Generate keypair
//! let keypair = engine.generate_keypair().unwrap();
//!
//! // Sign message
//! let message = b"Quarterly report";
//! let signature = engine.sign(&keypair.secret_key, message).unwrap();
//!
//! // Verify signature
//! let is_valid = engine.verify(&keypair.public_key, message, &signature).unwrap();
//! assert!(is_valid);
//! ```

pub mod dilithium;
pub mod error;
pub mod mode;
pub mod traits;

// Re-export commonly used types
pub use dilithium::DilithiumEngine;
pub use error::{PqcError, Result};
pub use mode::{AlgorithmInfo, Mode};
pub use traits::{KeyPair, SignatureScheme};
