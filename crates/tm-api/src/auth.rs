//! # Authentication & Authorization
//!
//! Session-token verification and the project-manager guard for mutating
//! license endpoints.
//!
//! ## Token Format
//!
//! ```text
//! Authorization: Bearer {role}:{user_id}:{secret}
//! Authorization: Token  {role}:{user_id}:{secret}
//! Authorization: Bearer {secret}         (legacy, treated as Admin)
//! ```
//!
//! `user_id` may be empty. Verification sits behind the [`AuthVerifier`]
//! trait so a real session service can replace [`StaticTokenVerifier`]
//! without touching the handlers.
//!
//! ## Guard
//!
//! Handlers that mutate licenses take a [`ProjectManager`] argument. It is a
//! `FromRequestParts` extractor, so axum resolves it before the JSON body
//! extractor: an unauthorized request is rejected before its body is parsed.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::header;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::error::{AppError, SubCode};
use crate::state::AppState;

// ── Role ────────────────────────────────────────────────────────────────────

/// Caller roles, ordered by privilege level.
///
/// The `Ord` derivation follows declaration order:
/// `ReadOnly < Mapper < ProjectManager < Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May browse but not map.
    ReadOnly,
    /// Regular contributor.
    Mapper,
    /// Manages projects and their imagery licenses.
    ProjectManager,
    /// Full access.
    Admin,
}

impl Role {
    /// Return the string representation of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadOnly => "read_only",
            Self::Mapper => "mapper",
            Self::ProjectManager => "project_manager",
            Self::Admin => "admin",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "read_only" => Some(Self::ReadOnly),
            "mapper" => Some(Self::Mapper),
            "project_manager" => Some(Self::ProjectManager),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

// ── CallerIdentity ──────────────────────────────────────────────────────────

/// Identity of an authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// The caller's role.
    pub role: Role,
    /// The caller's user id, when the token carries one.
    pub user_id: Option<i64>,
}

impl CallerIdentity {
    /// Check if the caller has at least the given minimum role.
    pub fn has_role(&self, minimum: Role) -> bool {
        self.role >= minimum
    }

    fn admin() -> Self {
        Self {
            role: Role::Admin,
            user_id: None,
        }
    }
}

// ── Verifier ────────────────────────────────────────────────────────────────

/// Session-token verification collaborator.
#[async_trait]
pub trait AuthVerifier: Send + Sync + std::fmt::Debug {
    /// Resolve a token to an identity. `None` for the token means the request
    /// carried no `Authorization` header. Returns `None` when the caller is
    /// not authenticated.
    async fn verify_token(&self, token: Option<&str>) -> Option<CallerIdentity>;

    /// Whether the identity holds project-manager privilege.
    async fn is_project_manager(&self, identity: &CallerIdentity) -> bool;
}

/// Verifier backed by a single shared secret.
///
/// With no secret configured authentication is disabled and every caller,
/// with or without a token, is treated as an admin.
///
/// Custom `Debug` redacts the secret.
#[derive(Clone)]
pub struct StaticTokenVerifier {
    secret: Option<String>,
}

impl StaticTokenVerifier {
    /// Create a verifier. `None` disables authentication.
    pub fn new(secret: Option<String>) -> Self {
        Self { secret }
    }

    /// A verifier that accepts every caller as an admin.
    pub fn disabled() -> Self {
        Self { secret: None }
    }

    /// Whether tokens are actually checked.
    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }
}

impl std::fmt::Debug for StaticTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenVerifier")
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[async_trait]
impl AuthVerifier for StaticTokenVerifier {
    async fn verify_token(&self, token: Option<&str>) -> Option<CallerIdentity> {
        let Some(expected) = &self.secret else {
            return Some(CallerIdentity::admin());
        };
        let Some(token) = token else {
            tracing::warn!("authentication failed: missing authorization header");
            return None;
        };
        match parse_session_token(token, expected) {
            Ok(identity) => Some(identity),
            Err(reason) => {
                tracing::warn!(%reason, "authentication failed: invalid session token");
                None
            }
        }
    }

    async fn is_project_manager(&self, identity: &CallerIdentity) -> bool {
        identity.has_role(Role::ProjectManager)
    }
}

// ── Token Parsing ───────────────────────────────────────────────────────────

/// Constant-time comparison of secrets.
///
/// When lengths differ a dummy comparison still runs so timing does not
/// reveal the expected length.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Parse a session token in format `{role}:{user_id}:{secret}` or `{secret}`.
pub fn parse_session_token(provided: &str, expected_secret: &str) -> Result<CallerIdentity, String> {
    let parts: Vec<&str> = provided.splitn(3, ':').collect();

    match parts.as_slice() {
        [secret] => {
            if constant_time_token_eq(secret, expected_secret) {
                Ok(CallerIdentity::admin())
            } else {
                Err("invalid session token".into())
            }
        }
        [role, user, secret] => {
            if !constant_time_token_eq(secret, expected_secret) {
                return Err("invalid session token".into());
            }
            let role = Role::parse(role).ok_or_else(|| format!("unknown role: {role}"))?;
            let user_id = if user.is_empty() {
                None
            } else {
                Some(
                    user.parse::<i64>()
                        .map_err(|e| format!("invalid user_id: {e}"))?,
                )
            };
            Ok(CallerIdentity { role, user_id })
        }
        _ => Err("invalid token format, expected {role}:{user_id}:{secret} or {secret}".into()),
    }
}

/// Strip the `Bearer ` or `Token ` scheme from an `Authorization` value.
fn strip_scheme(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .or_else(|| header_value.strip_prefix("Token "))
}

// ── Guard ───────────────────────────────────────────────────────────────────

/// An authenticated caller with project-manager privilege.
#[derive(Debug, Clone)]
pub struct ProjectManager(pub CallerIdentity);

#[axum::async_trait]
impl axum::extract::FromRequestParts<AppState> for ProjectManager {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = match parts.headers.get(header::AUTHORIZATION) {
            None => None,
            Some(value) => {
                let token = value.to_str().ok().and_then(strip_scheme).ok_or_else(|| {
                    tracing::warn!("authentication failed: unsupported authorization scheme");
                    invalid_token("Authorization header must use the Bearer or Token scheme")
                })?;
                Some(token)
            }
        };

        let verifier: &Arc<dyn AuthVerifier> = &state.auth;
        let identity = verifier
            .verify_token(token)
            .await
            .ok_or_else(|| invalid_token("Token is invalid or missing"))?;

        if !verifier.is_project_manager(&identity).await {
            tracing::warn!(
                user_id = ?identity.user_id,
                role = identity.role.as_str(),
                "authorization failed: project manager role required"
            );
            return Err(AppError::Unauthorized {
                sub_code: SubCode::UserNotPermitted,
                message: "User is not a project manager".to_string(),
            });
        }

        Ok(Self(identity))
    }
}

fn invalid_token(message: &str) -> AppError {
    AppError::Unauthorized {
        sub_code: SubCode::InvalidToken,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ordering_is_correct() {
        assert!(Role::ReadOnly < Role::Mapper);
        assert!(Role::Mapper < Role::ProjectManager);
        assert!(Role::ProjectManager < Role::Admin);
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::ReadOnly, Role::Mapper, Role::ProjectManager, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn constant_time_eq_cases() {
        assert!(constant_time_token_eq("secret-token", "secret-token"));
        assert!(!constant_time_token_eq("wrong-token!", "secret-token"));
        assert!(!constant_time_token_eq("secret", "secret-token"));
        assert!(!constant_time_token_eq("", "secret-token"));
    }

    #[test]
    fn legacy_secret_is_admin() {
        let identity = parse_session_token("my-secret", "my-secret").unwrap();
        assert_eq!(identity.role, Role::Admin);
        assert!(identity.user_id.is_none());
    }

    #[test]
    fn role_format_with_user_id() {
        let identity = parse_session_token("project_manager:42:my-secret", "my-secret").unwrap();
        assert_eq!(identity.role, Role::ProjectManager);
        assert_eq!(identity.user_id, Some(42));
    }

    #[test]
    fn role_format_without_user_id() {
        let identity = parse_session_token("mapper::my-secret", "my-secret").unwrap();
        assert_eq!(identity.role, Role::Mapper);
        assert!(identity.user_id.is_none());
    }

    #[test]
    fn wrong_secret_rejected() {
        assert!(parse_session_token("admin::wrong", "my-secret").is_err());
        assert!(parse_session_token("wrong", "my-secret").is_err());
    }

    #[test]
    fn unknown_role_rejected() {
        let err = parse_session_token("superadmin::my-secret", "my-secret").unwrap_err();
        assert!(err.contains("unknown role"));
    }

    #[test]
    fn non_numeric_user_id_rejected() {
        let err = parse_session_token("mapper:bob:my-secret", "my-secret").unwrap_err();
        assert!(err.contains("invalid user_id"));
    }

    #[test]
    fn two_part_token_rejected() {
        assert!(parse_session_token("admin:my-secret", "my-secret").is_err());
    }

    #[test]
    fn strip_scheme_accepts_bearer_and_token() {
        assert_eq!(strip_scheme("Bearer abc"), Some("abc"));
        assert_eq!(strip_scheme("Token abc"), Some("abc"));
        assert_eq!(strip_scheme("Basic dXNlcjpwYXNz"), None);
    }

    #[tokio::test]
    async fn enabled_verifier_requires_token() {
        let verifier = StaticTokenVerifier::new(Some("s3cret".into()));
        assert!(verifier.is_enabled());
        assert!(verifier.verify_token(None).await.is_none());
        assert!(verifier.verify_token(Some("nope")).await.is_none());
        let identity = verifier
            .verify_token(Some("project_manager:7:s3cret"))
            .await
            .unwrap();
        assert!(verifier.is_project_manager(&identity).await);
    }

    #[tokio::test]
    async fn mapper_is_not_project_manager() {
        let verifier = StaticTokenVerifier::new(Some("s3cret".into()));
        let identity = verifier.verify_token(Some("mapper:7:s3cret")).await.unwrap();
        assert!(!verifier.is_project_manager(&identity).await);
    }

    #[tokio::test]
    async fn disabled_verifier_admits_everyone_as_admin() {
        let verifier = StaticTokenVerifier::disabled();
        assert!(!verifier.is_enabled());
        let identity = verifier.verify_token(None).await.unwrap();
        assert_eq!(identity.role, Role::Admin);
        assert!(verifier.is_project_manager(&identity).await);
    }

    #[test]
    fn debug_redacts_secret() {
        let verifier = StaticTokenVerifier::new(Some("top-secret".into()));
        let debug = format!("{verifier:?}");
        assert!(!debug.contains("top-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
