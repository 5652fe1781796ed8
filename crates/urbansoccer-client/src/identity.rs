//! Bearer-token identity with JWT expiry checking.

use std::sync::{Arc, Mutex, PoisonError};

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use tracing::{debug, info};
use urbansoccer_core::clock::Clock;
use urbansoccer_core::identity::IdentityProvider;

#[derive(Deserialize)]
struct Claims {
    exp: Option<f64>,
}

/// Identity backed by a single bearer token.
///
/// The token counts as authorized until the second named by its JWT `exp`
/// claim has passed. Tokens without an `exp` claim never expire; tokens whose payload
/// cannot be decoded are never authorized.
pub struct TokenIdentity {
    token: Mutex<Option<String>>,
    clock: Arc<dyn Clock>,
}

impl TokenIdentity {
    /// Creates an identity holding `token`, if any.
    #[must_use]
    pub fn new(token: Option<String>, clock: Arc<dyn Clock>) -> Self {
        let token = token.filter(|t| !t.trim().is_empty());
        Self {
            token: Mutex::new(token),
            clock,
        }
    }

    fn current(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Reads the `exp` claim of a JWT.
///
/// Returns `Err(())` when the token is not a decodable JWT and `Ok(None)`
/// when it decodes but carries no expiry.
#[allow(clippy::cast_possible_truncation)]
fn expiry(token: &str) -> Result<Option<i64>, ()> {
    let payload = token.split('.').nth(1).ok_or(())?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|_| ())?;
    let claims: Claims = serde_json::from_slice(&bytes).map_err(|_| ())?;
    Ok(claims.exp.map(|exp| exp.floor() as i64))
}

impl IdentityProvider for TokenIdentity {
    fn is_authorized(&self) -> bool {
        let Some(token) = self.current() else {
            return false;
        };
        match expiry(&token) {
            Ok(Some(exp)) => {
                let now = self.clock.unix_timestamp();
                if exp < now {
                    debug!(exp, now, "bearer token expired");
                    return false;
                }
                true
            }
            Ok(None) => true,
            Err(()) => {
                debug!("bearer token is not a decodable JWT");
                false
            }
        }
    }

    fn bearer_token(&self) -> Option<String> {
        self.current()
    }

    fn invalidate_session(&self) {
        let previous = self
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if previous.is_some() {
            info!("bearer token discarded; sign-in required");
        }
    }
}

impl std::fmt::Debug for TokenIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIdentity")
            .field("has_token", &self.current().is_some())
            .finish_non_exhaustive()
    }
}
