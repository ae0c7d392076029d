use serde::Serialize;

/// Counters for debugging frame delivery.
///
/// Every descriptor the engine hands over ends up in exactly one of
/// `frames_delivered` or one of the `dropped_*` counters, unless a renderer
/// failed mid fan-out (`draw_failures`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryDiagnostics {
    pub batches: u64,
    pub frames_received: u64,
    pub frames_delivered: u64,
    pub draw_calls: u64,
    pub dropped_missing_buffer: u64,
    pub dropped_unresolved_slot: u64,
    pub dropped_no_renderer: u64,
    pub dropped_malformed: u64,
    pub draw_failures: u64,
    pub unbind_failures: u64,
}

impl DeliveryDiagnostics {
    pub fn frames_dropped(&self) -> u64 {
        self.dropped_missing_buffer
            + self.dropped_unresolved_slot
            + self.dropped_no_renderer
            + self.dropped_malformed
    }
}
