//! WezTerm hook: drives `wezterm cli` against a pane id.
//!
//! Spec.md §4.3.5. `WEZTERM_PANE`/`WEZTERM_UNIX_SOCKET` are read out of the
//! target process's environ, falling back to this process's own
//! environment.

use super::Hook;
use crate::direction::Direction;
use crate::error::Answer;
use crate::proc::read_environ_var;
use crate::types::{Path256, ProcessId};
use std::process::Command;

pub struct WezTerm;

pub static WEZTERM: &WezTerm = &WezTerm;

fn wez_env(pid: ProcessId, name: &str) -> Option<String> {
    read_environ_var(pid, name).or_else(|| std::env::var(name).ok())
}

struct PaneCtx {
    socket: Option<String>,
    pane_id: String,
}

fn context(pid: ProcessId) -> Option<PaneCtx> {
    let pane_id = wez_env(pid, "WEZTERM_PANE")?;
    Some(PaneCtx {
        socket: wez_env(pid, "WEZTERM_UNIX_SOCKET"),
        pane_id,
    })
}

fn direction_name(dir: Direction) -> &'static str {
    match dir {
        Direction::Left => "Left",
        Direction::Right => "Right",
        Direction::Up => "Up",
        Direction::Down => "Down",
    }
}

fn cli(ctx: &PaneCtx, subcommand: &str, dir: Direction) -> Command {
    let mut cmd = Command::new("wezterm");
    cmd.arg("cli");
    if let Some(socket) = &ctx.socket {
        cmd.arg("--unix-socket").arg(socket);
    }
    cmd.arg(subcommand)
        .arg("--pane-id")
        .arg(&ctx.pane_id)
        .arg(direction_name(dir));
    cmd
}

/// `get-pane-direction` returns the neighbour pane id on stdout, empty
/// stdout (successful exit) if there is none, and a non-zero exit if the
/// call itself failed.
fn neighbor_pane_id(ctx: &PaneCtx, dir: Direction) -> Answer2 {
    let output = match cli(ctx, "get-pane-direction", dir).output() {
        Ok(o) => o,
        Err(_) => return Answer2::Unknown,
    };
    if !output.status.success() {
        return Answer2::Unknown;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        Answer2::No
    } else {
        Answer2::Yes(trimmed.to_string())
    }
}

enum Answer2 {
    Yes(String),
    No,
    Unknown,
}

impl From<&Answer2> for Answer {
    fn from(a: &Answer2) -> Self {
        match a {
            Answer2::Yes(_) => Answer::Yes,
            Answer2::No => Answer::No,
            Answer2::Unknown => Answer::Unknown,
        }
    }
}

impl Hook for WezTerm {
    fn name(&self) -> &'static str {
        "wezterm"
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
            .any(|c| c.contains("wezterm"))
            .then_some(child_pid)
    }

    fn can_move(&self, pid: ProcessId, dir: Direction, _timeout_ms: u64) -> Answer {
        let Some(ctx) = context(pid) else {
            return Answer::Unknown;
        };
        Answer::from(&neighbor_pane_id(&ctx, dir))
    }

    fn move_focus(&self, pid: ProcessId, dir: Direction, _timeout_ms: u64) {
        if let Some(ctx) = context(pid) {
            let _ = cli(&ctx, "activate-pane-direction", dir).status();
        }
    }

    fn move_to_edge(&self, pid: ProcessId, dir: Direction, _timeout_ms: u64) {
        let Some(mut ctx) = context(pid) else {
            return;
        };
        for _ in 0..super::MOVE_TO_EDGE_CAP {
            match neighbor_pane_id(&ctx, dir) {
                Answer2::Yes(next_pane) => {
                    let _ = cli(&ctx, "activate-pane-direction", dir).status();
                    ctx.pane_id = next_pane;
                }
                _ => break,
            }
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
        let pid = ProcessId(3);
        assert_eq!(
            WEZTERM.detect(pid, &fixed("wezterm-gui"), &fixed("wezterm-gui"), &fixed("wezterm-gui")),
            Some(pid)
        );
        assert_eq!(WEZTERM.detect(pid, &fixed("bash"), &fixed("bash"), &fixed("bash")), None);
    }

    #[test]
    fn direction_name_matches_cli_vocabulary() {
        assert_eq!(direction_name(Direction::Left), "Left");
        assert_eq!(direction_name(Direction::Down), "Down");
    }

    #[test]
    fn answer2_conversion() {
        assert_eq!(Answer::from(&Answer2::Yes("1".into())), Answer::Yes);
        assert_eq!(Answer::from(&Answer2::No), Answer::No);
        assert_eq!(Answer::from(&Answer2::Unknown), Answer::Unknown);
    }

    #[test]
    fn can_move_is_unknown_without_wezterm_env() {
        let me = ProcessId(std::process::id() as i32);
        assert_eq!(WEZTERM.can_move(me, Direction::Left, 50), Answer::Unknown);
    }
}
