//! Bearer-token verification and the permission gate placed in front of
//! the drink write routes.
//!
//! The gate runs as route middleware: it verifies the token, checks the
//! route's permission, and stores the verified [`Claims`] in the request
//! extensions where handlers pick them up with `Extension<Claims>`.

use std::path::Path;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;

use crate::config::{AuthConfig, ConfigError, JwtAlgorithm};
use crate::errors::ServerError;

#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub sub: Option<String>,
    pub permissions: Option<Vec<String>>,
}

impl Claims {
    pub fn require(&self, permission: &str) -> Result<(), AuthError> {
        let permissions = self
            .permissions
            .as_ref()
            .ok_or(AuthError::PermissionsMissing)?;
        if !permissions.iter().any(|p| p == permission) {
            return Err(AuthError::Forbidden);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authorization header is expected.")]
    HeaderMissing,
    #[error("Authorization header must be in the format 'Bearer <token>'.")]
    MalformedHeader,
    #[error("Unable to parse authentication token.")]
    InvalidToken,
    #[error("Unable to find the appropriate key.")]
    UnknownKey,
    #[error("Token expired.")]
    Expired,
    #[error("Incorrect claims. Please, check the audience and issuer.")]
    InvalidClaims,
    #[error("Permissions not included in JWT.")]
    PermissionsMissing,
    #[error("Permission not found.")]
    Forbidden,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::PermissionsMissing => StatusCode::BAD_REQUEST,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthError::HeaderMissing => "authorization_header_missing",
            AuthError::MalformedHeader | AuthError::InvalidToken | AuthError::UnknownKey => {
                "invalid_header"
            }
            AuthError::Expired => "token_expired",
            AuthError::InvalidClaims | AuthError::PermissionsMissing => "invalid_claims",
            AuthError::Forbidden => "unauthorized",
        }
    }
}

impl From<AuthError> for ServerError {
    fn from(err: AuthError) -> Self {
        tracing::debug!(code = err.code(), "authorization failed");
        ServerError::new(err.status(), err.to_string()).with_code(err.code())
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(AuthError::HeaderMissing)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}

enum Keys {
    Shared(DecodingKey),
    KeySet(JwkSet),
}

/// Checks signature, expiry, audience and issuer of incoming tokens.
pub struct TokenVerifier {
    keys: Keys,
    validation: Validation,
}

impl TokenVerifier {
    pub fn hs256(secret: &[u8], audience: &str, issuer: &str, leeway_seconds: u64) -> Self {
        Self {
            keys: Keys::Shared(DecodingKey::from_secret(secret)),
            validation: validation(Algorithm::HS256, audience, issuer, leeway_seconds),
        }
    }

    pub fn rs256(jwks: JwkSet, audience: &str, issuer: &str, leeway_seconds: u64) -> Self {
        Self {
            keys: Keys::KeySet(jwks),
            validation: validation(Algorithm::RS256, audience, issuer, leeway_seconds),
        }
    }

    pub async fn from_config(config: &AuthConfig, base_dir: &Path) -> Result<Self, ConfigError> {
        match config.algorithm {
            JwtAlgorithm::HS256 => {
                let secret = config
                    .secret
                    .as_deref()
                    .ok_or_else(|| ConfigError::Invalid("auth.secret missing".into()))?;
                Ok(Self::hs256(
                    secret.as_bytes(),
                    &config.audience,
                    &config.issuer,
                    config.leeway_seconds,
                ))
            }
            JwtAlgorithm::RS256 => {
                let jwks = load_jwks(config, base_dir).await?;
                tracing::info!(keys = jwks.keys.len(), "json web key set loaded");
                Ok(Self::rs256(
                    jwks,
                    &config.audience,
                    &config.issuer,
                    config.leeway_seconds,
                ))
            }
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = match &self.keys {
            Keys::Shared(key) => decode::<Claims>(token, key, &self.validation),
            Keys::KeySet(jwks) => {
                let header = decode_header(token).map_err(|_| AuthError::InvalidToken)?;
                let kid = header.kid.ok_or(AuthError::UnknownKey)?;
                let jwk = jwks.find(&kid).ok_or(AuthError::UnknownKey)?;
                let key = DecodingKey::from_jwk(jwk).map_err(|_| AuthError::UnknownKey)?;
                decode::<Claims>(token, &key, &self.validation)
            }
        }
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::InvalidAudience | ErrorKind::InvalidIssuer | ErrorKind::MissingRequiredClaim(_) => {
                AuthError::InvalidClaims
            }
            _ => AuthError::InvalidToken,
        })?;
        Ok(data.claims)
    }
}

fn validation(algorithm: Algorithm, audience: &str, issuer: &str, leeway_seconds: u64) -> Validation {
    let mut validation = Validation::new(algorithm);
    validation.set_audience(&[audience]);
    validation.set_issuer(&[issuer]);
    validation.leeway = leeway_seconds;
    validation
}

async fn load_jwks(config: &AuthConfig, base_dir: &Path) -> Result<JwkSet, ConfigError> {
    if let Some(path) = &config.jwks_path {
        let content = tokio::fs::read_to_string(base_dir.join(path)).await?;
        return serde_json::from_str(&content)
            .map_err(|e| ConfigError::Invalid(format!("jwks parse error: {e}")));
    }
    let url = config
        .jwks_url
        .as_deref()
        .ok_or_else(|| ConfigError::Invalid("auth.jwks_url missing".into()))?;
    reqwest::get(url)
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| ConfigError::Invalid(format!("jwks fetch failed: {e}")))?
        .json::<JwkSet>()
        .await
        .map_err(|e| ConfigError::Invalid(format!("jwks parse error: {e}")))
}

/// Route-level state for [`require_permission`].
#[derive(Clone)]
pub struct PermissionGate {
    verifier: Arc<TokenVerifier>,
    permission: &'static str,
}

impl PermissionGate {
    pub fn new(verifier: Arc<TokenVerifier>, permission: &'static str) -> Self {
        Self {
            verifier,
            permission,
        }
    }
}

pub async fn require_permission(
    State(gate): State<PermissionGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let claims = {
        let token = bearer_token(request.headers())?;
        gate.verifier.verify(token)?
    };
    claims.require(gate.permission)?;
    tracing::debug!(
        subject = claims.sub.as_deref().unwrap_or("-"),
        permission = gate.permission,
        "permission granted"
    );
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
