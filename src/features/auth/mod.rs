//! Google sign-in and session handling.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/auth/google` | Redirect to the provider consent screen |
//! | GET | `/auth/google/callback` | Finish the handshake, establish a session |

pub mod clients;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod services;

pub use services::{AuthService, SessionStore};
