use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{IdentityError, IdentityResult};

/// Opaque credential supplied by the transport for one invocation.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallerToken(String);

impl CallerToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Build the token a transport would present for `identity`.
    pub fn for_identity(identity: &str) -> Self {
        Self(STANDARD.encode(identity.as_bytes()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens may embed certificate subjects; keep them out of logs.
impl fmt::Debug for CallerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallerToken({} bytes)", self.0.len())
    }
}

/// Decodes caller tokens into stable identifiers.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, token: &CallerToken) -> IdentityResult<String>;
}

/// Resolver for transports that present the identity as standard base64.
#[derive(Clone, Copy, Debug, Default)]
pub struct Base64IdentityResolver;

impl IdentityResolver for Base64IdentityResolver {
    fn resolve(&self, token: &CallerToken) -> IdentityResult<String> {
        let bytes = STANDARD
            .decode(token.as_str().trim())
            .map_err(|e| IdentityError::InvalidEncoding(e.to_string()))?;
        let identity = String::from_utf8(bytes).map_err(|_| IdentityError::NotUtf8)?;
        if identity.is_empty() {
            return Err(IdentityError::Empty);
        }
        trace!(identity = %identity, "resolved caller");
        Ok(identity)
    }
}
