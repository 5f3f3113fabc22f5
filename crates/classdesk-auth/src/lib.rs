//! # Classdesk Auth
//!
//! Bearer token types and JWT utilities for the Classdesk API.
//!
//! - [`claims`]: JWT claim structure for access tokens
//! - [`jwt`]: Token creation and verification utilities
//!
//! Access tokens identify a user and nothing more. Roles and permissions are
//! resolved from the store on every protected request, so a token never
//! carries a grant that could outlive its revocation.
//!
//! # Example
//!
//! ```ignore
//! use classdesk_auth::{create_access_token, verify_token};
//! use classdesk_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(user_id, "teacher@test.com", &config)?;
//!
//! let claims = verify_token(&token, &config)?;
//! assert_eq!(claims.user_id()?, user_id);
//! ```

pub mod claims;
pub mod jwt;

// Re-export commonly used types at crate root
pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
