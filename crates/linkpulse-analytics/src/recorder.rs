use linkpulse_core::store::Result;
use linkpulse_core::{
    ClickEvent, Clock, EventLog, LinkId, NewClickEvent, RequestMetadata, SystemClock,
};
use std::sync::Arc;
use tracing::trace;

/// Turns request metadata into classified click events and appends them.
///
/// The append is awaited, so once [`record`](Self::record) returns the event
/// is part of the log every later aggregation reads.
pub struct EventRecorder<L: ?Sized> {
    log: Arc<L>,
    clock: Arc<dyn Clock>,
}

impl<L: ?Sized> Clone for EventRecorder<L> {
    fn clone(&self) -> Self {
        Self {
            log: Arc::clone(&self.log),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<L: EventLog + ?Sized> EventRecorder<L> {
    pub fn new(log: Arc<L>) -> Self {
        Self {
            log,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn record(&self, link: LinkId, metadata: &RequestMetadata) -> Result<ClickEvent> {
        let event = NewClickEvent::from_request(link, metadata, self.clock.now());
        let event = self.log.append(event).await?;
        trace!(
            link = %link,
            event = event.id.0,
            os = %event.os_type,
            device = %event.device_type,
            browser = %event.browser,
            "Recorded click event"
        );
        Ok(event)
    }
}
