//! The hook registry: one adapter per focus-aware application.
//!
//! A [Hook] is an immutable descriptor — name plus four operations — tried
//! innermost-first by [crate::resolver::navigate]. Hooks never mutate
//! themselves; any state (a socket, a CLI child process) is transient,
//! scoped to a single call. Hooks are stateless singletons: registration
//! order only affects which hook wins a tie in [crate::detector], never
//! correctness.

mod ghostty;
mod kitty;
mod neovim;
mod tmux;
mod vscode;
mod wezterm;

use crate::direction::Direction;
use crate::error::Answer;
use crate::types::{Path256, ProcessId};
use clap::ValueEnum;

/// Command-line-selectable hook identity (`--hooks a,b,c`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lower")]
pub enum HookKind {
    Nvim,
    Tmux,
    Vscode,
    Kitty,
    Wezterm,
    Ghostty,
}

/// The four operations every hook implements. See spec.md §4.3 for the
/// per-application wire details.
pub trait Hook: Sync {
    /// Stable, lowercase name (used in debug traces).
    fn name(&self) -> &'static str;

    /// Does `(comm, exe_basename, argv0)` of `child_pid` identify this
    /// application? Returns the PID the rest of the hook's operations
    /// should address (ordinarily `child_pid` itself).
    fn detect(
        &self,
        child_pid: ProcessId,
        comm: &Path256,
        exe_basename: &Path256,
        argv0: &Path256,
    ) -> Option<ProcessId>;

    /// Three-valued: is there a neighbouring split/pane in `dir`?
    fn can_move(&self, pid: ProcessId, dir: Direction, timeout_ms: u64) -> Answer;

    /// Move focus one step in `dir`. Best-effort; failures are swallowed.
    fn move_focus(&self, pid: ProcessId, dir: Direction, timeout_ms: u64);

    /// Having just arrived via a WM-level focus change, steer to the split
    /// closest to the edge in `dir` (the *entry* edge).
    fn move_to_edge(&self, pid: ProcessId, dir: Direction, timeout_ms: u64);
}

/// The full registry, in a fixed registration order. [crate::detector]
/// applies every *enabled* hook's `detect` to each descendant in this
/// order, so when two hooks would both match the same process (never
/// expected in practice) this order breaks the tie.
pub fn registry() -> [(&'static dyn Hook, HookKind); 6] {
    [
        (neovim::NEOVIM, HookKind::Nvim),
        (tmux::TMUX, HookKind::Tmux),
        (vscode::VSCODE, HookKind::Vscode),
        (kitty::KITTY, HookKind::Kitty),
        (wezterm::WEZTERM, HookKind::Wezterm),
        (ghostty::GHOSTTY, HookKind::Ghostty),
    ]
}

/// The subset of [registry] selected by `--hooks`, in registration order.
pub fn enabled(selected: &[HookKind]) -> Vec<&'static dyn Hook> {
    registry()
        .into_iter()
        .filter(|(_, kind)| selected.contains(kind))
        .map(|(hook, _)| hook)
        .collect()
}

/// Safety cap on move-to-edge's repeat loop (spec.md §4.3.4: "up to a cap
/// (50)"), shared by every hook that implements move-to-edge as a repeated
/// move_focus rather than a single jump-to-edge command.
pub(crate) const MOVE_TO_EDGE_CAP: u32 = 50;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabled_preserves_registration_order() {
        let selected = [HookKind::Wezterm, HookKind::Nvim, HookKind::Tmux];
        let hooks = enabled(&selected);
        let names: Vec<&str> = hooks.iter().map(|h| h.name()).collect();
        assert_eq!(names, vec!["nvim", "tmux", "wezterm"]);
    }

    #[test]
    fn enabled_empty_selection_is_empty() {
        assert!(enabled(&[]).is_empty());
    }
}
