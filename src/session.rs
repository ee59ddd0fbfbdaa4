//! Session and authorization store.
//!
//! A [`Session`] is an explicitly constructed value holding the bearer token
//! pair and the role set decoded from the access token's `user_type` claim.
//! Construction has two entry points with different failure behavior:
//! [`Session::login`] is used right after the backend issues a token pair and
//! surfaces decode failures, while [`Session::restore`] is the startup path
//! that treats an undecodable or expired token as simply logged out.
//!
//! Decoding only unpacks the JWT payload; no signature validation is
//! performed here, matching the backend's contract that the token is opaque
//! proof of authentication and the client merely reads its claims.

use crate::{
    errors::{Error, Result},
    models::{Role, ROLE_PRECEDENCE, StudentInfo, TokenPayload, UserInfo},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use tracing::{debug, warn};

/// Decodes the payload segment of a JWT access token without verifying the
/// signature.
///
/// # Errors
/// Returns [`Error::InvalidToken`] when the token is not three dot-separated
/// segments, the payload is not valid base64url, or the claims do not match
/// [`TokenPayload`].
pub fn decode_token(token: &str) -> Result<TokenPayload> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(Error::InvalidToken {
            message: "token is not a three-segment JWT".to_string(),
        });
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| Error::InvalidToken {
            message: format!("payload is not valid base64url: {e}"),
        })?;

    serde_json::from_slice(&bytes).map_err(|e| Error::InvalidToken {
        message: format!("claims did not parse: {e}"),
    })
}

/// Outcome of consulting the session for a protected view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// The caller may see the view.
    Granted,
    /// The caller is authenticated but lacks the required role; send them to
    /// the dashboard of their highest held role.
    RedirectTo(Role),
    /// Unauthenticated, or no recognized role; send to the entry point.
    Login,
}

/// The current caller's authentication and authorization state.
#[derive(Debug, Clone)]
pub struct Session {
    access_token: Option<String>,
    refresh_token: Option<String>,
    payload: Option<TokenPayload>,
    roles: Vec<Role>,
}

impl Session {
    /// A session with no tokens and no roles.
    #[must_use]
    pub const fn logged_out() -> Self {
        Session {
            access_token: None,
            refresh_token: None,
            payload: None,
            roles: Vec::new(),
        }
    }

    /// Builds an authenticated session from a freshly issued token pair.
    ///
    /// # Errors
    /// Returns [`Error::InvalidToken`] when the access token fails to decode;
    /// no session state is established in that case.
    pub fn login(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Result<Self> {
        let access_token = access_token.into();
        let payload = decode_token(&access_token)?;
        let roles = roles_from_payload(&payload);
        debug!(user_id = payload.user_id, ?roles, "session established");
        Ok(Session {
            access_token: Some(access_token),
            refresh_token: Some(refresh_token.into()),
            payload: Some(payload),
            roles,
        })
    }

    /// Startup path: rebuilds the session from persisted tokens.
    ///
    /// An undecodable or expired access token yields a logged-out session
    /// rather than an error; the caller sees `is_authenticated() == false`
    /// and an empty role set.
    #[must_use]
    pub fn restore(access_token: Option<String>, refresh_token: Option<String>) -> Self {
        let Some(access_token) = access_token else {
            return Session::logged_out();
        };
        match decode_token(&access_token) {
            Ok(payload) if payload.is_fresh(Utc::now()) => {
                let roles = roles_from_payload(&payload);
                Session {
                    access_token: Some(access_token),
                    refresh_token,
                    payload: Some(payload),
                    roles,
                }
            }
            Ok(_) => {
                debug!("persisted access token has expired; starting logged out");
                Session::logged_out()
            }
            Err(e) => {
                warn!(error = %e, "persisted access token failed to decode; starting logged out");
                Session::logged_out()
            }
        }
    }

    /// Clears both tokens and all derived role state. Navigation back to the
    /// entry point is the caller's responsibility.
    pub fn logout(&mut self) {
        self.access_token = None;
        self.refresh_token = None;
        self.payload = None;
        self.roles.clear();
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// The bearer token for backend calls.
    ///
    /// # Errors
    /// Returns [`Error::MissingToken`] when logged out, so callers refuse the
    /// action before any network IO.
    pub fn access_token(&self) -> Result<&str> {
        self.access_token.as_deref().ok_or(Error::MissingToken)
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// The roles decoded from the access token, unknown tags dropped.
    #[must_use]
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    #[must_use]
    pub fn user(&self) -> Option<&UserInfo> {
        self.payload.as_ref().map(|p| &p.user)
    }

    #[must_use]
    pub fn student(&self) -> Option<&StudentInfo> {
        self.payload.as_ref().and_then(|p| p.student.as_ref())
    }

    /// True iff the caller may act in `target`'s area: holding a higher role
    /// grants access to every lower role's area (NSFT ⊇ BP ⊇ CR ⊇ Student).
    #[must_use]
    pub fn can_access(&self, target: Role) -> bool {
        self.roles.iter().any(|&held| held >= target)
    }

    /// String entry point for access checks. An unrecognized target tag is a
    /// policy denial, not a crash: it logs a warning and returns `false`.
    #[must_use]
    pub fn can_access_group(&self, target: &str) -> bool {
        match Role::from_group(target) {
            Some(role) => self.can_access(role),
            None => {
                warn!(target = %target, "unknown target role in access check");
                false
            }
        }
    }

    /// The highest-privilege role the caller holds, per [`ROLE_PRECEDENCE`].
    #[must_use]
    pub fn highest_role(&self) -> Option<Role> {
        ROLE_PRECEDENCE
            .into_iter()
            .find(|role| self.roles.contains(role))
    }

    /// Route-guard contract: a protected view declares the single role it
    /// requires; mismatches redirect to the caller's highest held role, or to
    /// the entry point when unauthenticated or role-less.
    #[must_use]
    pub fn route_decision(&self, required: Role) -> RouteDecision {
        if !self.is_authenticated() {
            return RouteDecision::Login;
        }
        if self.can_access(required) {
            return RouteDecision::Granted;
        }
        match self.highest_role() {
            Some(role) => RouteDecision::RedirectTo(role),
            None => RouteDecision::Login,
        }
    }
}

fn roles_from_payload(payload: &TokenPayload) -> Vec<Role> {
    payload
        .user_type
        .iter()
        .filter_map(|tag| {
            let role = Role::from_group(tag);
            if role.is_none() {
                warn!(group = %tag, "unknown role tag in token; ignoring");
            }
            role
        })
        .collect()
}
