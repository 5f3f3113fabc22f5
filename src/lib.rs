//! # Classdesk API
//!
//! Role and permission administration for a school management system, built
//! with Axum and PostgreSQL.
//!
//! ## Overview
//!
//! Every protected operation declares one [`Permission`](classdesk_core::Permission).
//! A request is allowed when any role held by the caller grants it. Roles and
//! their permission sets live in the database and can be changed at runtime by
//! administrators; the change applies to the very next request.
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── middleware/       # Identity providers, authorization gate, extractors
//! ├── modules/          # Feature modules
//! │   ├── admin/       # Roles, role permissions, user memberships
//! │   └── permissions/ # Catalog, resolver, "my permissions"
//! ├── docs.rs           # OpenAPI document
//! ├── logging.rs        # Request logging and subscriber setup
//! ├── router.rs         # Main application router
//! ├── state.rs          # Shared application state
//! └── validator.rs      # Validated JSON extractor
//! ```
//!
//! Each feature module follows the same layout:
//!
//! - `controller.rs`: HTTP handlers
//! - `service.rs`: Business logic
//! - `model.rs`: DTOs and response bodies
//! - `router.rs`: Axum router configuration
//!
//! ## Default Roles
//!
//! | Role | Grants |
//! |------|--------|
//! | Admin | User, role and permission management, every teacher permission |
//! | Teacher | Create, edit, delete and grade assignments; view submissions |
//! | Student | View assignments, submit work, view grades |
//!
//! ## Authentication
//!
//! Access tokens are HS256 JWTs that identify a user (`sub`, `email`) and carry
//! no roles or permissions. Tokens are issued with the CLI:
//!
//! ```bash
//! cargo run --bin classdesk-cli -- issue-token --email admin@test.com
//! ```
//!
//! ## API Documentation
//!
//! - Swagger UI: `http://localhost:3000/swagger-ui`

pub mod docs;
pub mod logging;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod validator;

// Re-export workspace crates for convenience
pub use classdesk_auth;
pub use classdesk_config;
pub use classdesk_core;
pub use classdesk_db;
