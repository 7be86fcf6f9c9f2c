//! VS Code stub hook: detection only.
//!
//! Spec.md §4.3.3 calls for exact-basename matching on `code`/`code-oss`,
//! rejecting near-miss substrings like `barcode`/`encode`/`unicode`, and a
//! `can_move` that always bubbles up (`Answer::Unknown`) since there is no
//! IPC surface to query VS Code's split layout from here.

use super::Hook;
use crate::direction::Direction;
use crate::error::Answer;
use crate::types::{Path256, ProcessId};

pub struct VsCode;

pub static VSCODE: &VsCode = &VsCode;

const NAMES: [&str; 2] = ["code", "code-oss"];

impl Hook for VsCode {
    fn name(&self) -> &'static str {
        "vscode"
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
            .any(|c| NAMES.contains(c))
            .then_some(child_pid)
    }

    fn can_move(&self, _pid: ProcessId, _dir: Direction, _timeout_ms: u64) -> Answer {
        Answer::Unknown
    }

    fn move_focus(&self, _pid: ProcessId, _dir: Direction, _timeout_ms: u64) {}

    fn move_to_edge(&self, _pid: ProcessId, _dir: Direction, _timeout_ms: u64) {}
}
