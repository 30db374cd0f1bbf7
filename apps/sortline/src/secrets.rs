//! # Secrets Module
//!
//! Credential resolution for the vision estimator.
//!
//! The Gemini adapter never reads credentials itself; it is handed a
//! [`CredentialProvider`]. The default chain tries, in priority order:
//!
//! 1. A local `.env` file (local development; keeps the key out of the
//!    shell environment and the process table)
//! 2. The process environment (CI / container-injected secrets)
//!
//! A remote secret store slots in as another provider implementation
//! supplied by the deployment.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Name of the secret holding the Gemini API key.
pub const SECRET_NAME: &str = "GOOGLE_API_KEY";

/// Failure to resolve a credential.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// The provider was reachable but does not hold the secret.
    #[error("{secret} not found in {provider}")]
    NotFound {
        /// The secret that was requested.
        secret: &'static str,
        /// Which provider reported the miss.
        provider: &'static str,
    },

    /// Every provider in a chain failed.
    #[error("{0} not found in any configured credential provider")]
    Exhausted(&'static str),
}

// =============================================================================
// PROVIDER TRAIT
// =============================================================================

/// A source of the estimator API key.
pub trait CredentialProvider: Send + Sync {
    /// Human-readable provider name, used in logs and errors.
    fn name(&self) -> &'static str;

    /// Fetch the API key from this provider.
    fn api_key(&self) -> Result<String, CredentialError>;
}

// =============================================================================
// DOTENV FILE PROVIDER
// =============================================================================

/// Reads the key from a `.env` file without touching the process
/// environment.
pub struct DotenvFileProvider {
    path: PathBuf,
}

impl DotenvFileProvider {
    /// Provider over `.env` in the current working directory.
    #[must_use]
    pub fn new() -> Self {
        Self::at_path(".env")
    }

    /// Provider over an explicit dotenv file path.
    #[must_use]
    pub fn at_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Default for DotenvFileProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialProvider for DotenvFileProvider {
    fn name(&self) -> &'static str {
        ".env file"
    }

    fn api_key(&self) -> Result<String, CredentialError> {
        let miss = CredentialError::NotFound {
            secret: SECRET_NAME,
            provider: self.name(),
        };

        let iter = dotenv::from_path_iter(&self.path).map_err(|_| miss.clone())?;
        for item in iter {
            let Ok((key, value)) = item else { continue };
            if key == SECRET_NAME && !value.is_empty() {
                return Ok(value);
            }
        }
        Err(miss)
    }
}

// =============================================================================
// PROCESS ENVIRONMENT PROVIDER
// =============================================================================

/// Reads the key from the process environment.
pub struct EnvProvider;

impl CredentialProvider for EnvProvider {
    fn name(&self) -> &'static str {
        "process environment"
    }

    fn api_key(&self) -> Result<String, CredentialError> {
        match std::env::var(SECRET_NAME) {
            Ok(value) if !value.is_empty() => Ok(value),
            _ => Err(CredentialError::NotFound {
                secret: SECRET_NAME,
                provider: self.name(),
            }),
        }
    }
}

// =============================================================================
// PROVIDER CHAIN
// =============================================================================

/// Tries a list of providers in priority order and takes the first hit.
pub struct CredentialChain {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl CredentialChain {
    /// An empty chain; add providers with [`CredentialChain::with`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Append a provider to the end of the chain.
    #[must_use]
    pub fn with(mut self, provider: impl CredentialProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }
}

impl Default for CredentialChain {
    /// The standard resolution order: `.env` file, then process
    /// environment.
    fn default() -> Self {
        Self::new().with(DotenvFileProvider::new()).with(EnvProvider)
    }
}

impl CredentialProvider for CredentialChain {
    fn name(&self) -> &'static str {
        "credential chain"
    }

    fn api_key(&self) -> Result<String, CredentialError> {
        for provider in &self.providers {
            match provider.api_key() {
                Ok(key) => {
                    info!(provider = provider.name(), "API key loaded");
                    return Ok(key);
                }
                Err(err) => {
                    debug!(provider = provider.name(), %err, "credential miss");
                }
            }
        }
        Err(CredentialError::Exhausted(SECRET_NAME))
    }
}
