//! One-time probe for the cryptographic capabilities the codecs rely on

use std::sync::OnceLock;

use tracing::{debug, error};

use super::{cipher, CipherKey};
use crate::error::{Result, VaultError};

static PROBE: OnceLock<std::result::Result<(), String>> = OnceLock::new();

/// Proof that the runtime has a working random source and AES-256-GCM.
///
/// Codecs are constructed from this value, so their operations never
/// re-check the environment.
#[derive(Debug, Clone, Copy)]
pub struct CryptoCapability {
    _probed: (),
}

impl CryptoCapability {
    /// Probe the environment (cached for the lifetime of the process)
    pub fn probe() -> Result<Self> {
        PROBE
            .get_or_init(run_probe)
            .clone()
            .map(|()| Self { _probed: () })
            .map_err(VaultError::EnvironmentUnavailable)
    }
}

fn run_probe() -> std::result::Result<(), String> {
    let outcome = self_test().map_err(|e| e.to_string());
    match &outcome {
        Ok(()) => debug!("Cryptographic capability probe passed"),
        Err(e) => error!("Cryptographic capability probe failed: {}", e),
    }
    outcome
}

fn self_test() -> Result<()> {
    let key = CipherKey::new(cipher::random_bytes::<32>()?);
    let nonce = cipher::generate_nonce()?;

    let sealed = cipher::encrypt(&key, &nonce, b"capability-probe")?;
    if cipher::decrypt(&key, &nonce, &sealed)? != b"capability-probe" {
        return Err(VaultError::EnvironmentUnavailable(
            "AES-256-GCM self-test produced wrong plaintext".to_string(),
        ));
    }
    Ok(())
}
