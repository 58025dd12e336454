//! Topology/state loading.
//!
//! The state file is whitespace separated:
//!
//! ```text
//! <nodeCount>
//! <id> <x> <y> <z>          (nodeCount times)
//! <communicationCount>
//! <from> <to> <payload...>  (communicationCount times, to = -1 is broadcast)
//! ```
//!
//! The payload is everything after `to` up to the end of its line.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, info, warn};

use super::error::StateError;
use crate::net::{NodeId, Position};

/// Destination value that means "every reachable endpoint".
pub const BROADCAST: i64 = -1;

const PREALLOC_LIMIT: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Node(NodeId),
    Broadcast,
}

/// A node as listed in the state file.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeState {
    /// Identifier as written; the position in the list is the node identity.
    pub id: i64,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunicationEvent {
    /// Sending node as written; checked against the registry when scheduled.
    pub from: i64,
    pub to: Destination,
    /// Message text without terminator.
    pub payload: Vec<u8>,
}

impl CommunicationEvent {
    /// Bytes that go on the wire: the text followed by a NUL terminator.
    pub fn framed(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.payload.len() + 1);
        out.extend_from_slice(&self.payload);
        out.push(0);
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopologyState {
    pub node_count: usize,
    pub nodes: Vec<NodeState>,
    /// In file order, which is also execution order.
    pub communications: Vec<CommunicationEvent>,
}

/// Read and parse a state file.
pub fn load_state(path: &Path) -> Result<TopologyState, StateError> {
    info!(path = %path.display(), "reading state");
    let text = fs::read_to_string(path).map_err(|source| StateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_state(&text)
}

pub fn parse_state(text: &str) -> Result<TopologyState, StateError> {
    let mut cur = Cursor::new(text);

    let node_count: usize = cur.parse("node count")?;
    // Counts come from the file; a short file fails on the missing tokens.
    let mut nodes = Vec::with_capacity(node_count.min(PREALLOC_LIMIT));
    for idx in 0..node_count {
        let id: i64 = cur.parse("node id")?;
        let x: f64 = cur.parse("x coordinate")?;
        let y: f64 = cur.parse("y coordinate")?;
        let z: f64 = cur.parse("z coordinate")?;
        if id != idx as i64 {
            warn!(
                line = cur.line(),
                listed = id,
                index = idx,
                "node id does not match its position in the list"
            );
        }
        let position = Position::new(x, y, z);
        info!(node = id, x, y, z, "node position");
        nodes.push(NodeState { id, position });
    }

    if cur.at_end() {
        debug!("state has no communication section");
        return Ok(TopologyState {
            node_count,
            nodes,
            communications: Vec::new(),
        });
    }

    let comm_count: usize = cur.parse("communication count")?;
    let mut communications = Vec::with_capacity(comm_count.min(PREALLOC_LIMIT));
    for _ in 0..comm_count {
        let from: i64 = cur.parse("sender id")?;
        let to_raw: i64 = cur.parse("receiver id")?;
        let to = match to_raw {
            BROADCAST => Destination::Broadcast,
            n if n >= 0 => Destination::Node(NodeId(n as usize)),
            n => return Err(cur.error(format!("receiver id {n} is neither a node nor -1"))),
        };
        let payload = cur.rest_of_line();
        debug!(from, to = ?to, payload, "communication");
        communications.push(CommunicationEvent {
            from,
            to,
            payload: payload.as_bytes().to_vec(),
        });
    }

    info!(nodes = node_count, communications = comm_count, "state loaded");
    Ok(TopologyState {
        node_count,
        nodes,
        communications,
    })
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn line(&self) -> usize {
        self.text[..self.pos].matches('\n').count() + 1
    }

    fn error(&self, reason: String) -> StateError {
        StateError::Parse {
            line: self.line(),
            reason,
        }
    }

    fn skip_ws(&mut self) {
        let rest = &self.text[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn at_end(&mut self) -> bool {
        self.skip_ws();
        self.pos == self.text.len()
    }

    fn token(&mut self) -> Option<&'a str> {
        self.skip_ws();
        let rest = &self.text[self.pos..];
        let len = rest.find(char::is_whitespace).unwrap_or(rest.len());
        if len == 0 {
            return None;
        }
        self.pos += len;
        Some(&rest[..len])
    }

    fn parse<T: FromStr>(&mut self, what: &str) -> Result<T, StateError> {
        let Some(tok) = self.token() else {
            return Err(self.error(format!("expected {what}, found end of file")));
        };
        tok.parse()
            .map_err(|_| self.error(format!("expected {what}, found `{tok}`")))
    }

    /// Remainder of the current line without the separating blanks in front
    /// or the line terminator.
    fn rest_of_line(&mut self) -> &'a str {
        let rest = &self.text[self.pos..];
        let (line, consumed) = match rest.find('\n') {
            Some(nl) => (&rest[..nl], nl + 1),
            None => (rest, rest.len()),
        };
        self.pos += consumed;
        line.trim_start_matches([' ', '\t']).trim_end_matches('\r')
    }
}
