mod rest;
mod trader;

pub use rest::BinanceClient;
pub use trader::Trader;
