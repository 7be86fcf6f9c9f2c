//! kitty hook: drives the `kitten @` remote-control CLI over kitty's own
//! control socket.
//!
//! Spec.md §4.3.4. The socket path and this window's id are read out of
//! the target process's `/proc/<pid>/environ` (`KITTY_LISTEN_ON`,
//! `KITTY_WINDOW_ID`), falling back to this process's own environment if
//! the target's environ couldn't be read (e.g. permissions).

use super::Hook;
use crate::debug_log;
use crate::direction::Direction;
use crate::error::Answer;
use crate::proc::read_environ_var;
use crate::types::{Path256, ProcessId};
use serde::Deserialize;
use std::process::Command;

pub struct Kitty;

pub static KITTY: &Kitty = &Kitty;

#[derive(Deserialize)]
struct OsWindow {
    is_focused: bool,
    tabs: Vec<Tab>,
}

#[derive(Deserialize)]
struct Tab {
    is_focused: bool,
    windows: Vec<Win>,
}

#[derive(Deserialize)]
struct Win {
    id: u64,
    at_left: bool,
    at_right: bool,
    at_top: bool,
    at_bottom: bool,
}

impl Win {
    fn at_edge(&self, dir: Direction) -> bool {
        match dir {
            Direction::Left => self.at_left,
            Direction::Right => self.at_right,
            Direction::Up => self.at_top,
            Direction::Down => self.at_bottom,
        }
    }
}

fn kitty_env(pid: ProcessId, name: &str) -> Option<String> {
    read_environ_var(pid, name).or_else(|| std::env::var(name).ok())
}

fn find_window(windows: &[OsWindow], window_id: u64) -> Option<&Win> {
    windows
        .iter()
        .find(|w| w.is_focused)?
        .tabs
        .iter()
        .find(|t| t.is_focused)?
        .windows
        .iter()
        .find(|w| w.id == window_id)
}

fn query_window(pid: ProcessId) -> Option<(String, Vec<OsWindow>, u64)> {
    let socket = kitty_env(pid, "KITTY_LISTEN_ON")?;
    let window_id: u64 = kitty_env(pid, "KITTY_WINDOW_ID")?.parse().ok()?;
    let output = Command::new("kitten")
        .args(["@", "ls", "--to", &socket])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let windows: Vec<OsWindow> = serde_json::from_slice(&output.stdout).ok()?;
    Some((socket, windows, window_id))
}

fn neighbor_name(dir: Direction) -> &'static str {
    match dir {
        Direction::Left => "left",
        Direction::Right => "right",
        Direction::Up => "top",
        Direction::Down => "bottom",
    }
}

impl Hook for Kitty {
    fn name(&self) -> &'static str {
        "kitty"
    }

    fn detect(
        &self,
        child_pid: ProcessId,
        comm: &Path256,
        exe_basename: &Path256,
        argv0: &Path256,
    ) -> Option<ProcessId> {
        let candidates = [comm.as_str(), exe_basename.as_str(), argv0.as_str()];
        let matches = candidates
            .iter()
            .any(|c| c.contains("kitty") && !c.contains("kitten"));
        matches.then_some(child_pid)
    }

    fn can_move(&self, pid: ProcessId, dir: Direction, _timeout_ms: u64) -> Answer {
        let Some((_, windows, window_id)) = query_window(pid) else {
            debug_log!("kitty: could not query window list for pid {pid}");
            return Answer::Unknown;
        };
        match find_window(&windows, window_id) {
            Some(win) if win.at_edge(dir) => Answer::No,
            Some(_) => Answer::Yes,
            None => Answer::Unknown,
        }
    }

    fn move_focus(&self, pid: ProcessId, dir: Direction, _timeout_ms: u64) {
        let Some(socket) = kitty_env(pid, "KITTY_LISTEN_ON") else {
            return;
        };
        let _ = Command::new("kitten")
            .args(["@", "action", "--to", &socket, "neighboring_window", neighbor_name(dir)])
            .status();
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
    fn detects_kitty_but_not_kitten() {
        let pid = ProcessId(5);
        assert_eq!(KITTY.detect(pid, &fixed("kitty"), &fixed("kitty"), &fixed("kitty")), Some(pid));
        assert_eq!(KITTY.detect(pid, &fixed("kitten"), &fixed("kitten"), &fixed("kitten")), None);
    }

    #[test]
    fn find_window_picks_focused_os_window_then_tab_then_id() {
        let windows = vec![
            OsWindow {
                is_focused: false,
                tabs: vec![],
            },
            OsWindow {
                is_focused: true,
                tabs: vec![
                    Tab {
                        is_focused: false,
                        windows: vec![Win {
                            id: 1,
                            at_left: true,
                            at_right: false,
                            at_top: false,
                            at_bottom: false,
                        }],
                    },
                    Tab {
                        is_focused: true,
                        windows: vec![Win {
                            id: 2,
                            at_left: false,
                            at_right: true,
                            at_top: false,
                            at_bottom: false,
                        }],
                    },
                ],
            },
        ];
        let win = find_window(&windows, 2).unwrap();
        assert!(win.at_right);
        assert!(find_window(&windows, 1).is_none());
    }

    #[test]
    fn at_edge_true_means_no_neighbour() {
        let win = Win {
            id: 1,
            at_left: true,
            at_right: false,
            at_top: false,
            at_bottom: false,
        };
        assert!(win.at_edge(Direction::Left));
        assert!(!win.at_edge(Direction::Right));
    }

    #[test]
    fn neighbor_name_maps_up_down_to_top_bottom() {
        assert_eq!(neighbor_name(Direction::Up), "top");
        assert_eq!(neighbor_name(Direction::Down), "bottom");
        assert_eq!(neighbor_name(Direction::Left), "left");
        assert_eq!(neighbor_name(Direction::Right), "right");
    }
}
