use std::io::Write;

use serde::Serialize;
use tracing::error;

use super::registry::AddressRegistry;
use crate::report::{ReportError, ResultWriter};

/// Where the results document goes.
pub type ResultSink = Box<dyn Write + Send>;

/// Receive-side totals for one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RxTotals {
    pub bytes_total: u64,
    pub packets_received: u64,
    /// Packets whose sender could not be resolved.
    pub unattributed: u64,
}

/// State shared by every component of one run: the address registry, the
/// receive totals and the results writer.
pub struct RunContext {
    pub registry: AddressRegistry,
    pub totals: RxTotals,
    pub results: ResultWriter<ResultSink>,
    write_error: Option<ReportError>,
}

impl RunContext {
    pub fn new(sink: ResultSink) -> Self {
        Self {
            registry: AddressRegistry::default(),
            totals: RxTotals::default(),
            results: ResultWriter::new(sink),
            write_error: None,
        }
    }

    /// Remember the first failure to write results; the run keeps going and
    /// the error is reported once it ends.
    pub(crate) fn note_write_error(&mut self, err: ReportError) {
        error!(error = %err, "writing results failed");
        if self.write_error.is_none() {
            self.write_error = Some(err);
        }
    }

    pub fn take_write_error(&mut self) -> Option<ReportError> {
        self.write_error.take()
    }

    /// Close the results document unless that already happened.
    pub fn finish_results(&mut self) {
        if self.results.is_closed() {
            return;
        }
        if let Err(err) = self.results.close() {
            self.note_write_error(err);
        }
    }
}
