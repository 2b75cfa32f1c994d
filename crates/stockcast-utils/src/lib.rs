//! Shared utilities for stockcast
//!
//! Tracing setup and `.env` loading used by the stockcast binary and tests.

pub mod env;
pub mod logging;

pub use env::load_dotenv;
pub use logging::{LogFormat, init_tracing};
