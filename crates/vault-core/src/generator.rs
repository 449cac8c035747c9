//! Random password generation

use std::fmt;
use std::str::FromStr;

use rand::distributions::{Distribution, Uniform};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::crypto::{CryptoCapability, SecretString};
use crate::error::{Result, VaultError};

pub const MIN_LENGTH: usize = 8;
pub const MAX_LENGTH: usize = 128;

const LETTERS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const DIGITS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?~`";

/// Character classes a generated password draws from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    /// Letters and digits
    Low,
    /// Letters, digits and symbols
    Medium,
    #[default]
    High,
}

impl Complexity {
    fn charset(self) -> Vec<char> {
        let mut chars: Vec<char> = LETTERS.chars().chain(DIGITS.chars()).collect();
        if self != Complexity::Low {
            chars.extend(SYMBOLS.chars());
        }
        chars
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Complexity::Low => write!(f, "low"),
            Complexity::Medium => write!(f, "medium"),
            Complexity::High => write!(f, "high"),
        }
    }
}

impl FromStr for Complexity {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Complexity::Low),
            "medium" => Ok(Complexity::Medium),
            "high" => Ok(Complexity::High),
            other => Err(VaultError::validation(
                "complexity",
                format!("unknown level '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub length: usize,
    pub complexity: Complexity,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            length: 16,
            complexity: Complexity::High,
        }
    }
}

/// Generate a random password, each character drawn uniformly from the
/// charset of `options.complexity`
pub fn generate_password(options: GeneratorOptions) -> Result<SecretString> {
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&options.length) {
        return Err(VaultError::validation(
            "length",
            format!(
                "must be between {} and {}, got {}",
                MIN_LENGTH, MAX_LENGTH, options.length
            ),
        ));
    }
    CryptoCapability::probe()?;

    let charset = options.complexity.charset();
    let index = Uniform::from(0..charset.len());
    let password: String = index
        .sample_iter(OsRng)
        .take(options.length)
        .map(|i| charset[i])
        .collect();

    Ok(SecretString::new(password))
}
