//! CLI command implementations.

mod config;
mod digest;
mod doctor;
mod serve;

pub use config::run_config;
pub use digest::run_digest;
pub use doctor::run_doctor;
pub use serve::{build_router, run_serve};
