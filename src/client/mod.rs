//! Remote project API client and authentication.
//!
//! This module provides the [`ProjectClient`] for talking to the testing
//! service, the [`ProjectApi`] trait the sync engines are written against,
//! and authentication types ([`Auth`], [`AuthType`]).

mod api;
mod auth;
mod node;
mod project;

pub use api::{
    EMPTY_FILE_PLACEHOLDER, Envelope, FILE_ALREADY_EXISTS, ProjectApi, RemoteError,
    is_already_exists, overwrite_flag,
};
pub use auth::{Auth, AuthType};
pub use node::{NodeType, RemoteNode};
pub use project::ProjectClient;
