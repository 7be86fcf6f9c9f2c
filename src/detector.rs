//! Process-tree detector: walks the descendants of the WM-focused PID and
//! applies every enabled hook's `detect` probe.
//!
//! Spec.md §4.2. Depth is the number of parent hops from the tree's root;
//! results are emitted shallowest-first ([crate::proc::walk_descendants] is
//! breadth-first for exactly this reason) and bounded to 8 entries — deep
//! trees are pathological, so overflow truncates silently rather than
//! growing unbounded.

use crate::hooks::Hook;
use crate::proc::{self, TreeNode};
use crate::types::{Name, Path256, ProcessId};

/// Fixed capacity of a [DetectedList] (spec.md §3).
pub const CAPACITY: usize = 8;

/// A single hook match: which hook, at which pid, how many process-tree
/// edges below the walk's root.
#[derive(Clone, Copy)]
pub struct DetectedHook {
    pub hook: &'static dyn Hook,
    pub pid: ProcessId,
    pub depth: u32,
}

/// A shallowest-first, capacity-[CAPACITY] sequence of [DetectedHook]s.
/// Callers iterate in reverse to obtain innermost-first (spec.md §4.1).
#[derive(Default, Clone, Copy)]
pub struct DetectedList {
    items: [Option<DetectedHook>; CAPACITY],
    len: usize,
}

impl DetectedList {
    pub fn new() -> Self {
        Self {
            items: [None; CAPACITY],
            len: 0,
        }
    }

    /// Append `item`. A full list silently drops the append, preserving
    /// everything already appended (spec.md §3 invariant).
    pub fn append(&mut self, item: DetectedHook) {
        if self.len < CAPACITY {
            self.items[self.len] = Some(item);
            self.len += 1;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &DetectedHook> {
        self.items[..self.len].iter().filter_map(|o| o.as_ref())
    }

    /// The innermost (deepest) entry — the last one appended, since entries
    /// are shallowest-first.
    pub fn deepest(&self) -> Option<&DetectedHook> {
        self.iter().next_back()
    }
}

struct ProcInfo {
    comm: Name,
    exe_basename: Path256,
    argv0: Path256,
}

fn read_proc_info(pid: ProcessId) -> ProcInfo {
    ProcInfo {
        comm: proc::read_comm(pid).unwrap_or_default(),
        exe_basename: proc::read_exe_basename(pid).unwrap_or_default(),
        argv0: proc::read_cmdline_arg0(pid).unwrap_or_default(),
    }
}

/// Walk the descendants of `root_pid` and apply every hook in `hooks`
/// (tried in registration order; the first hook to match a given process
/// wins that slot), yielding a shallowest-first [DetectedList].
pub fn detect_all(root_pid: ProcessId, hooks: &[&'static dyn Hook]) -> DetectedList {
    detect_from_nodes(&proc::walk_descendants(root_pid), hooks, read_proc_info)
}

fn detect_from_nodes(
    nodes: &[TreeNode],
    hooks: &[&'static dyn Hook],
    info_of: impl Fn(ProcessId) -> ProcInfo,
) -> DetectedList {
    let mut list = DetectedList::new();
    for node in nodes {
        let info = info_of(node.pid);
        for hook in hooks {
            if let Some(pid) = hook.detect(node.pid, &info.comm, &info.exe_basename, &info.argv0) {
                list.append(DetectedHook {
                    hook: *hook,
                    pid,
                    depth: node.depth,
                });
                break;
            }
        }
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Direction;
    use crate::error::Answer;

    struct AlwaysMatch(&'static str);

    impl Hook for AlwaysMatch {
        fn name(&self) -> &'static str {
            self.0
        }
        fn detect(
            &self,
            child_pid: ProcessId,
            _comm: &Path256,
            _exe_basename: &Path256,
            _argv0: &Path256,
        ) -> Option<ProcessId> {
            Some(child_pid)
        }
        fn can_move(&self, _pid: ProcessId, _dir: Direction, _timeout_ms: u64) -> Answer {
            Answer::Unknown
        }
        fn move_focus(&self, _pid: ProcessId, _dir: Direction, _timeout_ms: u64) {}
        fn move_to_edge(&self, _pid: ProcessId, _dir: Direction, _timeout_ms: u64) {}
    }

    static MATCH_ALL: AlwaysMatch = AlwaysMatch("match-all");

    fn blank_info(_pid: ProcessId) -> ProcInfo {
        ProcInfo {
            comm: Name::default(),
            exe_basename: Path256::default(),
            argv0: Path256::default(),
        }
    }

    #[test]
    fn detected_list_capacity_truncates_silently() {
        let mut list = DetectedList::new();
        for i in 0..CAPACITY + 5 {
            list.append(DetectedHook {
                hook: &MATCH_ALL,
                pid: ProcessId(i as i32 + 1),
                depth: i as u32,
            });
        }
        assert_eq!(list.len(), CAPACITY);
        // The first CAPACITY entries survive; later appends are dropped.
        let pids: Vec<i32> = list.iter().map(|d| d.pid.0).collect();
        assert_eq!(pids, (1..=CAPACITY as i32).collect::<Vec<_>>());
    }

    #[test]
    fn deepest_is_last_appended() {
        let mut list = DetectedList::new();
        list.append(DetectedHook {
            hook: &MATCH_ALL,
            pid: ProcessId(1),
            depth: 1,
        });
        list.append(DetectedHook {
            hook: &MATCH_ALL,
            pid: ProcessId(2),
            depth: 2,
        });
        assert_eq!(list.deepest().unwrap().pid, ProcessId(2));
    }

    #[test]
    fn detect_from_nodes_applies_hooks_in_order_and_stops_at_first_match() {
        let nodes = vec![
            TreeNode {
                pid: ProcessId(10),
                depth: 1,
            },
            TreeNode {
                pid: ProcessId(11),
                depth: 2,
            },
        ];
        let hooks: Vec<&'static dyn Hook> = vec![&MATCH_ALL];
        let list = detect_from_nodes(&nodes, &hooks, blank_info);
        assert_eq!(list.len(), 2);
        let depths: Vec<u32> = list.iter().map(|d| d.depth).collect();
        assert_eq!(depths, vec![1, 2]);
    }

    #[test]
    fn detect_from_nodes_empty_tree_is_empty_list() {
        let hooks: Vec<&'static dyn Hook> = vec![&MATCH_ALL];
        let list = detect_from_nodes(&[], &hooks, blank_info);
        assert!(list.is_empty());
    }
}
