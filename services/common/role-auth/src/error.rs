use std::path::PathBuf;

use thiserror::Error;

pub type BuildResult<T> = Result<T, BuildError>;
pub type TokenResult<T> = Result<T, TokenError>;

/// Failures while constructing a [`crate::RoleResolver`]. These are fatal: a
/// server must not start with a verifier it could not build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to read public key '{}': {source}", path.display())]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("'{}' does not contain a PEM encoded public key", .0.display())]
    KeyNotPublic(PathBuf),
    #[error("failed to decode RSA public key '{}': {message}", path.display())]
    KeyDecode { path: PathBuf, message: String },
    #[error("unsupported token signing algorithm '{0}'")]
    UnsupportedAlgorithm(String),
    #[error("invalid role configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Per-request token failures. Never surfaced to clients; the resolver turns
/// every one of them into [`crate::Role::Viewer`].
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(&'static str),
    #[error("token {0} segment is not valid base64url")]
    Encoding(&'static str),
    #[error("token payload is not a JSON object: {0}")]
    Json(String),
    #[error("token verification failed: {0}")]
    Verification(#[from] jsonwebtoken::errors::Error),
    #[error("token is missing the '{0}' claim")]
    MissingClaim(&'static str),
    #[error("token issuer does not match")]
    IssuerMismatch,
    #[error("token audience does not match")]
    AudienceMismatch,
}
