//! tmux hook: shells out to the `tmux` CLI against the pane's own server
//! socket.
//!
//! Spec.md §4.3.2 allows either a working implementation or a stub that
//! truthfully returns `absent`; this is the working variant, resolving the
//! server socket from the client's own `TMUX` environment variable
//! (`socket_path,pid,session_id`) the way a real tmux client would.

use super::Hook;
use crate::debug_log;
use crate::direction::Direction;
use crate::error::Answer;
use crate::proc::read_environ_var;
use crate::types::{Path256, ProcessId};
use std::process::Command;

pub struct Tmux;

pub static TMUX: &Tmux = &Tmux;

fn socket_path(pid: ProcessId) -> Option<String> {
    let tmux_env = read_environ_var(pid, "TMUX")?;
    let path = tmux_env.split(',').next()?;
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}

fn run_tmux(socket: &str, args: &[&str]) -> Option<String> {
    let output = Command::new("tmux").arg("-S").arg(socket).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout).ok().map(|s| s.trim().to_string())
}

fn edge_variable(dir: Direction) -> &'static str {
    match dir {
        Direction::Left => "#{pane_at_left}",
        Direction::Right => "#{pane_at_right}",
        Direction::Up => "#{pane_at_top}",
        Direction::Down => "#{pane_at_bottom}",
    }
}

fn select_flag(dir: Direction) -> &'static str {
    match dir {
        Direction::Left => "-L",
        Direction::Right => "-R",
        Direction::Up => "-U",
        Direction::Down => "-D",
    }
}

impl Hook for Tmux {
    fn name(&self) -> &'static str {
        "tmux"
    }

    fn detect(
        &self,
        child_pid: ProcessId,
        comm: &Path256,
        exe_basename: &Path256,
        argv0: &Path256,
    ) -> Option<ProcessId> {
        let candidates = [comm.as_str(), exe_basename.as_str(), argv0.as_str()];
        candidates
            .iter()
            .any(|c| c.contains("tmux"))
            .then_some(child_pid)
    }

    fn can_move(&self, pid: ProcessId, dir: Direction, _timeout_ms: u64) -> Answer {
        let Some(socket) = socket_path(pid) else {
            debug_log!("tmux: no socket path for pid {pid}");
            return Answer::Unknown;
        };
        match run_tmux(&socket, &["display-message", "-p", edge_variable(dir)]) {
            Some(flag) if flag == "1" => Answer::No,
            Some(_) => Answer::Yes,
            None => Answer::Unknown,
        }
    }

    fn move_focus(&self, pid: ProcessId, dir: Direction, _timeout_ms: u64) {
        if let Some(socket) = socket_path(pid) {
            let _ = run_tmux(&socket, &["select-pane", select_flag(dir)]);
        }
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

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(s: &str) -> Path256 {
        Path256::from_slice(s.as_bytes())
    }

    #[test]
    fn detects_by_substring() {
        let pid = ProcessId(99);
        assert_eq!(
            TMUX.detect(pid, &fixed("tmux: server"), &fixed("tmux"), &fixed("tmux")),
            Some(pid)
        );
        assert_eq!(
            TMUX.detect(pid, &fixed("bash"), &fixed("bash"), &fixed("bash")),
            None
        );
    }

    #[test]
    fn edge_variable_per_direction_is_distinct() {
        let mut vals = [
            edge_variable(Direction::Left),
            edge_variable(Direction::Right),
            edge_variable(Direction::Up),
            edge_variable(Direction::Down),
        ];
        vals.sort();
        vals.dedup();
        assert_eq!(vals.len(), 4);
    }

    #[test]
    fn can_move_is_unknown_without_tmux_env() {
        // A pid with no TMUX env var set (this test process) must bubble.
        let me = ProcessId(std::process::id() as i32);
        assert_eq!(TMUX.can_move(me, Direction::Left, 50), Answer::Unknown);
    }
}
