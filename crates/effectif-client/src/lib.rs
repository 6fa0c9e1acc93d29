//! Effectif backend client
//!
//! One service per backend resource, all sharing an [`ApiClient`]. Services translate
//! domain intents into REST calls and normalize every response through the
//! `WireMapping` implementations of `effectif-proto`.

pub mod client;
pub mod config;
pub mod error;
pub mod groupements;
pub mod personnes;
pub mod teams;
pub mod users;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use groupements::GroupementService;
pub use personnes::PersonneService;
pub use teams::TeamService;
pub use users::UserService;

pub use effectif_proto as proto;
