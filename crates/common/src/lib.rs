pub mod config;
pub mod error;
pub mod exchange;
pub mod handler;
pub mod types;

pub use config::{Config, SignalRoute};
pub use error::{Error, Result};
pub use exchange::ExchangeApi;
pub use handler::SignalHandler;
pub use types::*;
