//! Permission catalog and permission resolution.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
