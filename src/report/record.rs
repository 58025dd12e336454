use crate::net::NodeId;
use crate::sim::SimTime;

use super::writer::escape_attr;

/// One packet seen by a receiving node.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedRecord {
    pub time: SimTime,
    pub receiver: NodeId,
    /// `None` when the sender could not be attributed; rendered as `-1`.
    pub sender: Option<NodeId>,
    pub bytes: u32,
    pub payload: String,
}

impl ReceivedRecord {
    /// `<p Time=".." Rcvr=".." Sndr=".." bytes=".." payload=".." />`
    pub fn to_element(&self) -> String {
        let sender = self
            .sender
            .map_or_else(|| "-1".to_string(), |id| id.0.to_string());
        format!(
            r#"<p Time="{}" Rcvr="{}" Sndr="{}" bytes="{}" payload="{}" />"#,
            self.time.secs_string(),
            self.receiver.0,
            sender,
            self.bytes,
            escape_attr(&self.payload)
        )
    }
}
