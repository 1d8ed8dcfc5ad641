mod types;
mod commands;
mod handlers;
mod error;
mod state;
mod keyboard;

pub mod bank;
pub mod catalog;
pub mod config;
pub mod diagnosis;
pub mod engine;
pub mod report;
pub mod scores;
pub mod storage;
pub mod writing;

pub use types::*;
pub use commands::*;
pub use handlers::*;
pub use error::*;
pub use state::*;
pub use keyboard::*;
