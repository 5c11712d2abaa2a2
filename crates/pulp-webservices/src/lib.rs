//! Pulp REST API: auth decorators over swappable collaborators, and the
//! event-listener and status views.

pub mod collaborators;
pub mod decorators;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod http;
pub mod infra;
pub mod managers;
pub mod router;
pub mod state;
pub mod usecase;
