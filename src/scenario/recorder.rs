use tracing::info;

use super::context::RunContext;
use crate::net::{Delivery, DeliveryHandler};
use crate::report::ReceivedRecord;
use crate::sim::SimTime;

/// Receive handler registered on every endpoint: counts each packet,
/// attributes it to a sender through the registry and appends a record.
pub struct ReceiveRecorder<'a> {
    ctx: &'a mut RunContext,
}

impl<'a> ReceiveRecorder<'a> {
    pub fn new(ctx: &'a mut RunContext) -> Self {
        Self { ctx }
    }
}

impl DeliveryHandler for ReceiveRecorder<'_> {
    fn on_packet(&mut self, now: SimTime, delivery: Delivery<'_>) {
        let bytes = u32::try_from(delivery.payload.len()).unwrap_or(u32::MAX);
        let totals = &mut self.ctx.totals;
        totals.bytes_total += u64::from(bytes);
        totals.packets_received += 1;

        let sender = delivery
            .sender
            .and_then(|addr| self.ctx.registry.resolve_sender(*addr.ip()));
        if sender.is_none() {
            self.ctx.totals.unattributed += 1;
        }

        let record = ReceivedRecord {
            time: now,
            receiver: delivery.receiver,
            sender,
            bytes,
            payload: payload_text(delivery.payload),
        };
        info!("{}", record.to_element());
        if let Err(err) = self.ctx.results.record(&record) {
            self.ctx.note_write_error(err);
        }
    }
}

/// Message text: everything before the first NUL.
pub fn payload_text(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}
