//! API server for the Pushdeck deployment dashboard.
//!
//! Exposes job lifecycle operations and the dashboard board over HTTP.

pub mod envelope;
pub mod error;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;

#[cfg(test)]
mod testing;

pub use envelope::Envelope;
pub use state::AppState;
