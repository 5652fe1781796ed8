//! Identity collaborator seam.

/// The signed-in player's credentials, as seen by the turn engine.
pub trait IdentityProvider: Send + Sync {
    /// Whether the caller currently holds a usable credential.
    fn is_authorized(&self) -> bool;

    /// Bearer token to attach to backend requests, if any.
    fn bearer_token(&self) -> Option<String>;

    /// Drops the credential and forces the player to sign in again.
    fn invalidate_session(&self);
}
