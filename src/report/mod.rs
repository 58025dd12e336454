//! Results document.
//!
//! The report is an XML stream written as the run progresses: the root
//! `simbeenet` element is opened up front, one `<p>` element is appended per
//! received packet, and the root is closed exactly once at shutdown.

mod record;
mod writer;

pub use record::ReceivedRecord;
pub use writer::{ReportError, ResultWriter, escape_attr};
