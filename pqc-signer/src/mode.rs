//! Dilithium parameter tiers
//!
//! A [`Mode`] selects one of the three Dilithium parameter sets shipped by
//! `pqcrypto-dilithium`. The set is closed: names outside of it are rejected
//! with [`PqcError::InvalidMode`], there is no fuzzy or case-insensitive
//! matching.
//!
//! | Mode | NIST Level | Public Key | Secret Key | Signature |
//! |------|-----------|------------|------------|-----------|
//! | Dilithium2 | 2 | 1,312 bytes | 2,560 bytes | 2,420 bytes |
//! | Dilithium3 | 3 | 1,952 bytes | 4,032 bytes | 3,309 bytes |
//! | Dilithium5 | 5 | 2,592 bytes | 4,896 bytes | 4,627 bytes |

use crate::error::{PqcError, Result};
use pqcrypto_dilithium::{dilithium2, dilithium3, dilithium5};
use std::fmt;
use std::str::FromStr;

/// Dilithium parameter tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Dilithium2,
    Dilithium3,
    Dilithium5,
}

impl Mode {
    /// Every supported tier, weakest first
    pub const ALL: [Mode; 3] = [Mode::Dilithium2, Mode::Dilithium3, Mode::Dilithium5];

    /// Tier used when an interactive request (generate, sign, verify) names no mode
    pub const INTERACTIVE_DEFAULT: Mode = Mode::Dilithium2;

    /// Tier used when a benchmark request names no mode
    pub const BENCHMARK_DEFAULT: Mode = Mode::Dilithium5;

    /// Resolve a mode name
    ///
    /// # Errors
    /// - Returns `InvalidMode` for any name other than `Dilithium2`,
    ///   `Dilithium3` or `Dilithium5`
    pub fn resolve(name: &str) -> Result<Self> {
        match name {
            "Dilithium2" => Ok(Mode::Dilithium2),
            "Dilithium3" => Ok(Mode::Dilithium3),
            "Dilithium5" => Ok(Mode::Dilithium5),
            other => Err(PqcError::InvalidMode(other.to_string())),
        }
    }

    /// Canonical mode name
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Dilithium2 => "Dilithium2",
            Mode::Dilithium3 => "Dilithium3",
            Mode::Dilithium5 => "Dilithium5",
        }
    }

    /// Parameter record for this tier
    pub fn info(&self) -> AlgorithmInfo {
        match self {
            Mode::Dilithium2 => AlgorithmInfo {
                name: self.name(),
                nist_level: 2,
                public_key_size: dilithium2::public_key_bytes(),
                secret_key_size: dilithium2::secret_key_bytes(),
                signature_size: dilithium2::signature_bytes(),
            },
            Mode::Dilithium3 => AlgorithmInfo {
                name: self.name(),
                nist_level: 3,
                public_key_size: dilithium3::public_key_bytes(),
                secret_key_size: dilithium3::secret_key_bytes(),
                signature_size: dilithium3::signature_bytes(),
            },
            Mode::Dilithium5 => AlgorithmInfo {
                name: self.name(),
                nist_level: 5,
                public_key_size: dilithium5::public_key_bytes(),
                secret_key_size: dilithium5::secret_key_bytes(),
                signature_size: dilithium5::signature_bytes(),
            },
        }
    }
}

impl FromStr for Mode {
    type Err = PqcError;

    fn from_str(s: &str) -> Result<Self> {
        Mode::resolve(s)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Algorithm information structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlgorithmInfo {
    /// Algorithm name
    pub name: &'static str,
    /// NIST security level
    pub nist_level: u8,
    /// Public key size (bytes)
    pub public_key_size: usize,
    /// Secret key size (bytes)
    pub secret_key_size: usize,
    /// Signature size (bytes)
    pub signature_size: usize,
}
