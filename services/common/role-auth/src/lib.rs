pub mod claims;
pub mod config;
pub mod error;
pub mod extractors;
pub mod guards;
pub mod keys;
pub mod resolver;
pub mod roles;
pub mod verifier;

pub use claims::{ClaimPath, ClaimSet, ClaimValue};
pub use config::RoleAuthConfig;
pub use error::{BuildError, BuildResult, TokenError, TokenResult};
pub use extractors::bearer_token;
pub use guards::{ensure_operator, require_operator, resolve_role, GuardError};
pub use keys::load_public_key;
pub use resolver::RoleResolver;
pub use roles::{OperatorSentinel, Role};
pub use verifier::{AssertionChecks, ClaimsParser, TokenParser, TrustingParser, VerifyingParser};
