//! HTTP endpoints for administering roles, role permissions and user memberships.
//!
//! The validation and writes live in [`classdesk_db::admin`].

pub mod controller;
pub mod model;
pub mod router;
