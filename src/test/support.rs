use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use crate::scenario::RunContext;

/// In-memory sink that stays readable after being boxed into a writer.
#[derive(Clone, Default)]
pub(crate) struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8(self.0.lock().expect("buf lock").clone()).expect("utf8 output")
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("buf lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writer that fails every write.
pub(crate) struct BrokenSink;

impl Write for BrokenSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("disk full"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A run context whose results land in the returned buffer, already opened.
pub(crate) fn open_context() -> (RunContext, SharedBuf) {
    let buf = SharedBuf::default();
    let mut ctx = RunContext::new(Box::new(buf.clone()));
    ctx.results.open().expect("open results");
    (ctx, buf)
}

pub(crate) const TWO_NODES: &str = "2\n0 0 0 0\n1 500 0 0\n1\n0 1 hello\n";

pub(crate) const AODV_SETTINGS: &str =
    "protocol:AODV,\ndataRate:2Mbps,\ndelay:2ms,\nbaseIP:10.1.1.0,\nsubnetMask:255.255.255.0\n";
