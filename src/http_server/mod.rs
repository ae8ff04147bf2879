//! HTTP boundary layer: maps the primary's and secondary's wire protocol
//! onto the Log, Quorum Gate, and Replicator.

mod errors;
mod master_routes;
mod slave_routes;
mod state;

pub mod server;

pub use errors::BoundaryError;
pub use server::HttpServer;
pub use state::AppState;
