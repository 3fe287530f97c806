mod health;
mod webhook;

pub use health::health_router;
pub use webhook::webhook_router;
