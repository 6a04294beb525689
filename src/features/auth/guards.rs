//! Capability guards for the review pages.
//!
//! Reporting a concern is open to everyone; listing, inspecting and resolving
//! concerns requires the `concerns:change` permission (or the super admin
//! role). Callers without it are sent to the login page instead of getting an
//! error, the same way a browser session would be.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
};

use crate::features::auth::model::AuthenticatedUser;
use crate::shared::constants::PERMISSION_CHANGE_CONCERNS;

/// Decides who may see and change reported concerns
#[derive(Debug, Clone)]
pub struct AccessGate {
    login_url: String,
}

impl AccessGate {
    pub fn new(login_url: impl Into<String>) -> Self {
        Self {
            login_url: login_url.into(),
        }
    }

    /// Anonymous callers are always denied; signed-in callers need the
    /// manage-concerns capability.
    pub fn authorize(&self, identity: Option<&AuthenticatedUser>) -> bool {
        identity.is_some_and(|user| user.has_permission(PERMISSION_CHANGE_CONCERNS))
    }

    /// Redirect to the login page, remembering where the caller wanted to go
    pub fn deny(&self, next: &str) -> LoginRedirect {
        let separator = if self.login_url.contains('?') { '&' } else { '?' };
        LoginRedirect {
            location: format!(
                "{}{}next={}",
                self.login_url,
                separator,
                urlencoding::encode(next)
            ),
        }
    }
}

/// `302 Found` pointing at the login page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRedirect {
    pub location: String,
}

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        (StatusCode::FOUND, [(header::LOCATION, self.location)]).into_response()
    }
}

/// Guard for the concern review endpoints.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireConcernManager(user): RequireConcernManager) { ... }
/// ```
pub struct RequireConcernManager(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireConcernManager
where
    Arc<AccessGate>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = LoginRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let gate = Arc::<AccessGate>::from_ref(state);

        match parts.extensions.get::<AuthenticatedUser>() {
            Some(user) if gate.authorize(Some(user)) => Ok(RequireConcernManager(user.clone())),
            user => {
                tracing::debug!(
                    "Concern access denied for {}",
                    user.map(|u| u.account_id.as_str()).unwrap_or("anonymous")
                );
                let next = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or("/");
                Err(gate.deny(next))
            }
        }
    }
}
