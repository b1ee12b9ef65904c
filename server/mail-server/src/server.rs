use std::sync::Arc;

use email_service::DispatchEngine;
use events_bus::NatsBroker;

/// Shared state behind every request handler
#[derive(Clone)]
pub struct MailServer {
    pub engine: Arc<DispatchEngine>,
    /// Present when pub/sub ingress is connected
    pub broker: Option<Arc<NatsBroker>>,
}

impl MailServer {
    pub fn new(engine: Arc<DispatchEngine>, broker: Option<Arc<NatsBroker>>) -> Self {
        Self { engine, broker }
    }
}
