//! Identifier-based authentication for Effectif
//!
//! Authentication resolves a matricule into its authorization record. The result is a
//! [`Session`] value handed back to the caller: it is created by
//! [`AuthService::authenticate`], persisted through a [`SessionStorage`], read-only while it
//! lives, and consumed by [`AuthService::logout`].

pub mod directory;
pub mod error;
pub mod service;
pub mod session;
pub mod storage;

pub use directory::UserDirectory;
pub use error::{AuthError, SessionStoreError};
pub use service::AuthService;
pub use session::Session;
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage};

// Re-export async_trait for implementors of UserDirectory
pub use async_trait::async_trait;
