//! Authentication module for managing the user session and credentials.
//!
//! This module provides:
//! - `SessionStore`: the single source of truth for the current bearer token,
//!   persisted to disk so a login survives restarts
//! - `CredentialStore`: secure OS-level credential storage via keyring
//!
//! The token is cleared on explicit logout or when any request comes back 401.

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::SessionStore;
