use crate::error::{ArmError, ArmResult};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;

/// Source of bearer tokens for Azure Resource Manager requests.
///
/// Implement this to plug in an external credential flow (managed
/// identity, client secret, CLI login). Token acquisition and caching
/// are the provider's concern; the client only asks for a token when
/// it sends a request.
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    /// Produce a bearer token for the ARM audience.
    async fn token(&self) -> ArmResult<String>;
}

/// Credential types supported by the ARM client.
#[derive(Clone)]
pub enum ArmCredential {
    /// A pre-acquired bearer token used as-is.
    BearerToken(SecretString),

    /// An external token source, asked for a fresh token per request.
    Provider(Arc<dyn TokenProvider>),
}

impl ArmCredential {
    /// Create a credential from the `AZURE_ARM_ACCESS_TOKEN` environment variable.
    pub fn from_env() -> ArmResult<Self> {
        match std::env::var("AZURE_ARM_ACCESS_TOKEN") {
            Ok(token) if !token.is_empty() => Ok(Self::BearerToken(SecretString::from(token))),
            _ => Err(ArmError::MissingConfig(
                "credential is required. Set it via builder or AZURE_ARM_ACCESS_TOKEN env var."
                    .into(),
            )),
        }
    }

    /// Create a credential from a pre-acquired bearer token.
    pub fn bearer_token(token: impl Into<String>) -> Self {
        Self::BearerToken(SecretString::from(token.into()))
    }

    /// Create a credential backed by an external [`TokenProvider`].
    pub fn provider(provider: Arc<dyn TokenProvider>) -> Self {
        Self::Provider(provider)
    }

    /// Resolve the credential to an `Authorization` header value.
    pub async fn resolve(&self) -> ArmResult<String> {
        match self {
            Self::BearerToken(token) => Ok(format!("Bearer {}", token.expose_secret())),
            Self::Provider(provider) => {
                let token = provider.token().await?;
                Ok(format!("Bearer {token}"))
            }
        }
    }
}

impl std::fmt::Debug for ArmCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BearerToken(_) => write!(f, "ArmCredential::BearerToken(****)"),
            Self::Provider(_) => write!(f, "ArmCredential::Provider(..)"),
        }
    }
}
