//! Ghostty stub hook: same pattern as [super::vscode] — detect only.
//!
//! Ghostty has no public socket-level split-navigation IPC at the time of
//! writing, so this hook exists purely so the process-tree detector
//! recognises the process and the resolver bubbles cleanly past it.

use super::Hook;
use crate::direction::Direction;
use crate::error::Answer;
use crate::types::{Path256, ProcessId};

pub struct Ghostty;

pub static GHOSTTY: &Ghostty = &Ghostty;

impl Hook for Ghostty {
    fn name(&self) -> &'static str {
        "ghostty"
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
            .any(|&c| c == "ghostty")
            .then_some(child_pid)
    }

    fn can_move(&self, _pid: ProcessId, _dir: Direction, _timeout_ms: u64) -> Answer {
        Answer::Unknown
    }

    fn move_focus(&self, _pid: ProcessId, _dir: Direction, _timeout_ms: u64) {}

    fn move_to_edge(&self, _pid: ProcessId, _dir: Direction, _timeout_ms: u64) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(s: &str) -> Path256 {
        Path256::from_slice(s.as_bytes())
    }

    #[test]
    fn matches_exact_name_only() {
        let pid = ProcessId(7);
        assert_eq!(
            GHOSTTY.detect(pid, &fixed("ghostty"), &fixed("ghostty"), &fixed("ghostty")),
            Some(pid)
        );
        assert_eq!(
            GHOSTTY.detect(pid, &fixed("ghost"), &fixed("ghost"), &fixed("ghost")),
            None
        );
    }

    #[test]
    fn can_move_bubbles_up() {
        assert_eq!(
            GHOSTTY.can_move(ProcessId(7), Direction::Up, 50),
            Answer::Unknown
        );
    }
}
