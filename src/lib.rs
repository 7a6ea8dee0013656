//! Client library for the Pandora JSON API.
//!
//! The API is session based: a two-phase handshake (partner, then user)
//! yields an immutable [`Session`](session::Session) value that is passed
//! into every subsequent call. Request bodies are Blowfish-ECB encrypted and
//! hex encoded on the wire; all outbound traffic goes through a shared token
//! bucket so the service's request ceiling is never exceeded.
//!
//! Network exchanges can be recorded to a fixture file and replayed
//! deterministically, which is how the integration tests run without
//! touching the network. See [`transport::Mode`].

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[macro_use]
extern crate log;

pub mod client;
pub mod config;
pub mod crypt;
pub mod error;
pub mod http;
pub mod protocol;
pub mod rate;
pub mod session;
pub mod transport;
pub mod util;
