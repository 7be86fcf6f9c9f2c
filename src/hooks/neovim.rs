//! neovim hook: a msgpack-RPC client talking directly to nvim's own Unix
//! socket.
//!
//! Spec.md §4.3.1. The socket path is read from the target process's
//! `NVIM=<path>` environment variable — no fallback scan of
//! `$XDG_RUNTIME_DIR` is performed, by design (env-derived only).

use super::Hook;
use crate::debug_log;
use crate::direction::Direction;
use crate::error::{Answer, Error};
use crate::msgpack::{self, MsgpackError, Value};
use crate::proc::read_environ_var;
use crate::sockio;
use crate::types::{Path256, ProcessId};
use std::io::Read;
use std::path::Path;

pub struct Neovim;

pub static NEOVIM: &Neovim = &Neovim;

/// Upper bound on an accumulated RPC response; an exchange that never
/// completes within this many bytes is treated as a parse failure rather
/// than read forever.
const RESPONSE_CAP: usize = 8192;

fn socket_path(pid: ProcessId) -> Option<String> {
    read_environ_var(pid, "NVIM")
}

fn call(pid: ProcessId, method: &str, args: &[Value], timeout_ms: u64) -> Result<Value, Error> {
    let path = socket_path(pid).ok_or(Error::NoSocketPath)?;
    let mut stream = sockio::connect(Path::new(&path), timeout_ms)?;
    // Each hook call opens its own connection (lifecycle: afresh per call),
    // so there is never more than one request in flight: a constant msgid
    // is safe.
    let msgid = 1;
    let request = msgpack::encode_request(msgid, method, args);
    sockio::write_all(&mut stream, &request)?;

    let mut buf = Vec::with_capacity(256);
    let mut chunk = [0u8; 512];
    loop {
        let n = stream.read(&mut chunk).map_err(|_| Error::ReadFailed)?;
        if n == 0 {
            return Err(Error::ReadFailed);
        }
        buf.extend_from_slice(&chunk[..n]);
        match msgpack::decode_response(&buf, msgid) {
            Ok(value) => return Ok(value),
            Err(MsgpackError::InvalidFormat) => {
                if buf.len() >= RESPONSE_CAP {
                    return Err(Error::ParseFailed);
                }
                continue;
            }
            Err(other) => return Err(other.into()),
        }
    }
}

fn eval_winnr(pid: ProcessId, expr: &str, timeout_ms: u64) -> Result<u64, Error> {
    match call(pid, "nvim_eval", &[Value::str(expr)], timeout_ms)? {
        Value::Int(n) if n >= 0 => Ok(n as u64),
        _ => Err(Error::ParseFailed),
    }
}

fn wincmd(pid: ProcessId, key: char, timeout_ms: u64) {
    let _ = call(
        pid,
        "nvim_command",
        &[Value::str(format!("wincmd {key}"))],
        timeout_ms,
    );
}

impl Hook for Neovim {
    fn name(&self) -> &'static str {
        "nvim"
    }

    fn detect(
        &self,
        child_pid: ProcessId,
        _comm: &Path256,
        exe_basename: &Path256,
        argv0: &Path256,
    ) -> Option<ProcessId> {
        let candidates = [exe_basename.as_str(), argv0.as_str()];
        let matches = candidates
            .iter()
            .any(|c| c.contains("nvim") && !c.contains("helper"));
        matches.then_some(child_pid)
    }

    fn can_move(&self, pid: ProcessId, dir: Direction, timeout_ms: u64) -> Answer {
        let key = dir.to_vim_key();
        let current = eval_winnr(pid, "winnr()", timeout_ms);
        let target = eval_winnr(pid, &format!("winnr('{key}')"), timeout_ms);
        match (current, target) {
            (Ok(c), Ok(t)) => {
                if c == t {
                    Answer::No
                } else {
                    Answer::Yes
                }
            }
            _ => {
                debug_log!("nvim: can_move query failed for pid {pid}");
                Answer::Unknown
            }
        }
    }

    fn move_focus(&self, pid: ProcessId, dir: Direction, timeout_ms: u64) {
        wincmd(pid, dir.to_vim_key(), timeout_ms);
    }

    fn move_to_edge(&self, pid: ProcessId, dir: Direction, timeout_ms: u64) {
        for _ in 0..super::MOVE_TO_EDGE_CAP {
            if self.can_move(pid, dir, timeout_ms) != Answer::Yes {
                break;
            }
            self.move_focus(pid, dir, timeout_ms);
        }
    }
}
