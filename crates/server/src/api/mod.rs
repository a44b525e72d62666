pub mod auth_handlers;
pub mod errors;
pub mod server;
pub mod topics;

pub use server::{AppState, build_api_router, run_api};
