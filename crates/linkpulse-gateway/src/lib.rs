//! HTTP boundary for Linkpulse.
//!
//! Handlers only translate between HTTP and the shortener, resolver and
//! analytics services held in [`AppState`]; all rules live in those crates.

pub mod app;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use error::{AppError, Result};
pub use state::{AppState, GatewayConfig};
