use async_trait::async_trait;

use crate::{Result, TradingSignal};

/// Consumer of verified, parsed trading signals.
///
/// The webhook endpoint holds a `dyn SignalHandler` and invokes it once per
/// accepted request. An error from the handler becomes a 500 response; the
/// endpoint does not retry.
#[async_trait]
pub trait SignalHandler: Send + Sync {
    async fn handle(&self, signal: &TradingSignal) -> Result<()>;
}
