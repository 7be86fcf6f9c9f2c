//! sway/i3 backend: the length-prefixed binary i3-IPC protocol.
//!
//! Spec.md §4.4.1. Framing matches i3's own `ipc.h`: a 6-byte magic, a u32
//! payload length, and a u32 message type, all native-endian — the same
//! shape this crate's msgpack/Wayland clients use their own bespoke framing
//! for, just simpler.

use super::{Direction, EnvSource, WindowManager};
use crate::error::{Error, Result};
use crate::sockio;
use crate::types::ProcessId;
use serde::Deserialize;
use std::io::Write;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

const MAGIC: &[u8; 6] = b"i3-ipc";
const RUN_COMMAND: u32 = 0;
const GET_TREE: u32 = 4;
const MAX_REPLY: usize = 8192;

pub struct Sway {
    socket_path: PathBuf,
}

impl Sway {
    pub fn new(env: &dyn EnvSource) -> Result<Self> {
        let path = env
            .get("SWAYSOCK")
            .or_else(|| env.get("I3SOCK"))
            .ok_or(Error::NoSocketPath)?;
        Ok(Self {
            socket_path: PathBuf::from(path),
        })
    }

    fn connect(&self, timeout_ms: u64) -> Result<UnixStream> {
        sockio::connect(&self.socket_path, timeout_ms)
    }

    fn roundtrip(&self, stream: &mut UnixStream, msg_type: u32, payload: &[u8]) -> Result<Vec<u8>> {
        let mut header = Vec::with_capacity(14 + payload.len());
        header.extend_from_slice(MAGIC);
        header.extend_from_slice(&(payload.len() as u32).to_ne_bytes());
        header.extend_from_slice(&msg_type.to_ne_bytes());
        header.extend_from_slice(payload);
        stream.write_all(&header).map_err(|_| Error::WriteFailed)?;

        let mut reply_header = [0u8; 14];
        sockio::read_exact(stream, &mut reply_header)?;
        if &reply_header[0..6] != MAGIC {
            return Err(Error::ProtocolError);
        }
        let len = u32::from_ne_bytes(reply_header[6..10].try_into().unwrap()) as usize;
        if len > MAX_REPLY {
            return Err(Error::ParseFailed);
        }
        let mut body = vec![0u8; len];
        sockio::read_exact(stream, &mut body)?;
        Ok(body)
    }
}

#[derive(Deserialize)]
struct TreeNode {
    focused: bool,
    #[serde(default)]
    pid: Option<i64>,
    #[serde(default)]
    nodes: Vec<TreeNode>,
    #[serde(default)]
    floating_nodes: Vec<TreeNode>,
}

fn find_focused_pid(node: &TreeNode) -> Option<ProcessId> {
    if node.focused {
        if let Some(pid) = node.pid {
            if pid > 0 {
                return Some(ProcessId(pid as i32));
            }
        }
    }
    node.nodes
        .iter()
        .chain(node.floating_nodes.iter())
        .find_map(find_focused_pid)
}

fn direction_word(dir: Direction) -> &'static str {
    match dir {
        Direction::Left => "left",
        Direction::Right => "right",
        Direction::Up => "up",
        Direction::Down => "down",
    }
}

impl WindowManager for Sway {
    fn focused_pid(&mut self, timeout_ms: u64) -> Result<Option<ProcessId>> {
        let mut stream = self.connect(timeout_ms)?;
        let body = self.roundtrip(&mut stream, GET_TREE, b"")?;
        let tree: TreeNode = serde_json::from_slice(&body)?;
        Ok(find_focused_pid(&tree))
    }

    fn move_focus(&mut self, dir: Direction, timeout_ms: u64) -> Result<()> {
        let mut stream = self.connect(timeout_ms)?;
        let cmd = format!("focus {}", direction_word(dir));
        self.roundtrip(&mut stream, RUN_COMMAND, cmd.as_bytes())?;
        Ok(())
    }

    fn disconnect(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_focused_pid_descends_into_child_nodes() {
        let tree = TreeNode {
            focused: false,
            pid: None,
            nodes: vec![TreeNode {
                focused: true,
                pid: Some(4321),
                nodes: vec![],
                floating_nodes: vec![],
            }],
            floating_nodes: vec![],
        };
        assert_eq!(find_focused_pid(&tree), Some(ProcessId(4321)));
    }

    #[test]
    fn find_focused_pid_ignores_non_positive_pid() {
        let tree = TreeNode {
            focused: true,
            pid: Some(0),
            nodes: vec![],
            floating_nodes: vec![],
        };
        assert_eq!(find_focused_pid(&tree), None);
    }

    #[test]
    fn find_focused_pid_checks_floating_nodes_too() {
        let tree = TreeNode {
            focused: false,
            pid: None,
            nodes: vec![],
            floating_nodes: vec![TreeNode {
                focused: true,
                pid: Some(99),
                nodes: vec![],
                floating_nodes: vec![],
            }],
        };
        assert_eq!(find_focused_pid(&tree), Some(ProcessId(99)));
    }

    #[test]
    fn direction_word_matches_sway_vocabulary() {
        assert_eq!(direction_word(Direction::Left), "left");
        assert_eq!(direction_word(Direction::Up), "up");
    }

    #[test]
    fn header_layout_is_magic_len_type() {
        let payload = b"get_tree";
        let mut header = Vec::new();
        header.extend_from_slice(MAGIC);
        header.extend_from_slice(&(payload.len() as u32).to_ne_bytes());
        header.extend_from_slice(&GET_TREE.to_ne_bytes());
        assert_eq!(header.len(), 14);
        assert_eq!(&header[0..6], b"i3-ipc");
    }
}
