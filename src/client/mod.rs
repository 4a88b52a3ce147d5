//! Seqera Platform API client and authentication.
//!
//! This module provides the [`SeqeraClient`] for querying the Seqera (Tower)
//! REST API, along with the [`Auth`] credentials it sends.

mod auth;
mod seqera;

pub use auth::Auth;
pub use seqera::SeqeraClient;
