use std::io::{self, Write};

use tracing::{debug, warn};

use super::record::ReceivedRecord;

pub const ROOT_OPEN: &str = r#"<simbeenet ver="1.0" fileType="results">"#;
pub const ROOT_CLOSE: &str = "</simbeenet>";

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write results: {0}")]
    Io(#[from] io::Error),
    #[error("results document is already open")]
    AlreadyOpen,
    #[error("results document is not open")]
    NotOpen,
    #[error("results document is already closed")]
    AlreadyClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Fresh,
    Open,
    Closed,
}

/// Incremental writer for the results document.
///
/// Every element is flushed as soon as it is written so that a crash leaves a
/// usable prefix on disk. `close` writes the root closing tag exactly once; a
/// second call is rejected with [`ReportError::AlreadyClosed`] and writes
/// nothing.
#[derive(Debug)]
pub struct ResultWriter<W: Write> {
    out: W,
    state: State,
    records: u64,
}

impl<W: Write> ResultWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            state: State::Fresh,
            records: 0,
        }
    }

    /// Write the root opening element.
    pub fn open(&mut self) -> Result<(), ReportError> {
        if self.state != State::Fresh {
            return Err(ReportError::AlreadyOpen);
        }
        self.state = State::Open;
        writeln!(self.out, "{ROOT_OPEN}")?;
        self.out.flush()?;
        Ok(())
    }

    pub fn record(&mut self, rec: &ReceivedRecord) -> Result<(), ReportError> {
        match self.state {
            State::Fresh => return Err(ReportError::NotOpen),
            State::Closed => return Err(ReportError::AlreadyClosed),
            State::Open => {}
        }
        writeln!(self.out, "{}", rec.to_element())?;
        self.out.flush()?;
        self.records += 1;
        Ok(())
    }

    /// Write the root closing element. A document that was never opened gets
    /// its opening tag first so the output is always well formed.
    pub fn close(&mut self) -> Result<(), ReportError> {
        match self.state {
            State::Closed => {
                warn!("results document closed twice; ignoring");
                return Err(ReportError::AlreadyClosed);
            }
            State::Fresh => self.open()?,
            State::Open => {}
        }
        self.state = State::Closed;
        writeln!(self.out, "{ROOT_CLOSE}")?;
        self.out.flush()?;
        debug!(records = self.records, "results document closed");
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.state == State::Open
    }

    pub fn is_closed(&self) -> bool {
        self.state == State::Closed
    }

    pub fn records_written(&self) -> u64 {
        self.records
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Escape a string for use inside a double-quoted XML attribute.
pub fn escape_attr(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}
