pub mod admin;
pub mod permissions;
