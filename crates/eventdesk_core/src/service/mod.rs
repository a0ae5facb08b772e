//! Use-case services built on the repositories.

pub mod credential_service;
pub mod lifecycle;
