// Identity seam
//
// The workflow engine only ever needs a stable actor identifier string; how
// it was obtained (anonymous sign-in, custom token) is the provider's
// business. The portal login itself is a fixed-literal simulation and is
// explicitly not a security boundary.

pub mod session;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::watch;
use uuid::Uuid;

use crate::errors::PortalError;

pub use session::{reduce, Role, SessionAction, SessionState, View};

/// Stable identifier for the signed-in actor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub String);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// External identity collaborator. Auth state changes are observed through
/// a `watch` channel carrying `Some(actor)` on sign-in and `None` otherwise.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_anonymously(&self) -> Result<ActorId, PortalError>;

    async fn sign_in_with_token(&self, token: &str) -> Result<ActorId, PortalError>;

    fn auth_state(&self) -> watch::Receiver<Option<ActorId>>;
}

/// In-process identity provider used by tests and the demo binary.
pub struct LocalIdentity {
    state: watch::Sender<Option<ActorId>>,
}

impl Default for LocalIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalIdentity {
    pub fn new() -> Self {
        let (state, _) = watch::channel(None);
        Self { state }
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    async fn sign_in_anonymously(&self) -> Result<ActorId, PortalError> {
        let actor = ActorId(Uuid::new_v4().to_string());
        let _ = self.state.send(Some(actor.clone()));
        tracing::info!(actor = %actor, "Signed in anonymously");
        Ok(actor)
    }

    async fn sign_in_with_token(&self, token: &str) -> Result<ActorId, PortalError> {
        if token.trim().is_empty() {
            return Err(PortalError::validation("Auth token must not be empty"));
        }
        // Stable: the same token always maps to the same actor.
        let actor = ActorId(format!("tok-{token}"));
        let _ = self.state.send(Some(actor.clone()));
        tracing::info!(actor = %actor, "Signed in with token");
        Ok(actor)
    }

    fn auth_state(&self) -> watch::Receiver<Option<ActorId>> {
        self.state.subscribe()
    }
}

/// Simulated portal login. Credentials are fixed literals checked locally
/// with no server round-trip; failures come back as form-level error
/// strings, not notifications.
pub fn verify_credentials(mobile: &str, password: &str, role: Role) -> Result<(), String> {
    if mobile.len() != 10 || !mobile.chars().all(|c| c.is_ascii_digit()) {
        return Err(
            "Mobile number must be 10 digits only. Please check the digits!".to_string(),
        );
    }

    match role {
        Role::Customer => {
            if password == "password" {
                Ok(())
            } else {
                Err("Wrong password, bhai. Just type 'password'.".to_string())
            }
        }
        Role::Engineer => {
            if mobile == "8888888888" && password == "engineer" {
                Ok(())
            } else {
                Err(
                    "Engineer credentials invalid. Check mobile (8888888888) and password (engineer)."
                        .to_string(),
                )
            }
        }
    }
}
