//! # topic7-session
//!
//! Client-side session layer for a front-end backed by a hosted
//! backend-as-a-service. Initializes the backend app from configuration,
//! hands out opaque auth and document-database handles, and keeps a small
//! login session mirrored into persistent key-value storage.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | Backend configuration record, parsed from the environment |
//! | [`backend`] | App initialization and the auth / document-database handles |
//! | [`storage`] | Key-value storage trait plus memory, file, and browser stores |
//! | [`session`] | Session state holder: `login`, `logout`, `check_auth` |

pub mod backend;
pub mod config;
pub mod session;
pub mod storage;
