//! Test identity — a credential that can be revoked and inspected.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use urbansoccer_core::identity::IdentityProvider;

/// Identity with a fixed token that records invalidations.
#[derive(Debug)]
pub struct StaticIdentity {
    authorized: AtomicBool,
    invalidations: AtomicUsize,
}

impl StaticIdentity {
    /// A signed-in player.
    #[must_use]
    pub fn signed_in() -> Self {
        Self {
            authorized: AtomicBool::new(true),
            invalidations: AtomicUsize::new(0),
        }
    }

    /// A player without a usable credential.
    #[must_use]
    pub fn signed_out() -> Self {
        Self {
            authorized: AtomicBool::new(false),
            invalidations: AtomicUsize::new(0),
        }
    }

    /// How many times `invalidate_session` was called.
    pub fn invalidations(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }
}

impl IdentityProvider for StaticIdentity {
    fn is_authorized(&self) -> bool {
        self.authorized.load(Ordering::SeqCst)
    }

    fn bearer_token(&self) -> Option<String> {
        self.is_authorized().then(|| "test-token".to_owned())
    }

    fn invalidate_session(&self) {
        self.authorized.store(false, Ordering::SeqCst);
        self.invalidations.fetch_add(1, Ordering::SeqCst);
    }
}
