//! Process utilities: small, bounded reads of `/proc/<pid>/*`, and a
//! parent→children tree walk.
//!
//! Everything here works off fixed-size scratch buffers (spec.md §5:
//! "`/proc` scratch ≤ 8 KiB") and degrades silently — a dead PID, an
//! unreadable `exe` symlink, or a missing file all just yield `None`/empty,
//! per spec.md §4.2's edge policies.

use crate::types::{Name, Path256, ProcessId};
use std::fs;
use std::io::Read;

/// Upper bound on a single `/proc/<pid>/*` read, matching spec.md §5.
const SCRATCH_CAP: usize = 8192;

/// Bounds on the process-tree walk (spec.md §3: "Depths are monotonically
/// non-decreasing"; capacity-8 [crate::detector::DetectedList] bounds the
/// result, but the walk itself also needs its own breadth/depth caps so a
/// pathological tree can't make a single invocation hang).
pub const MAX_DEPTH: usize = 32;
pub const MAX_NODES: usize = 4096;

fn read_bounded(path: &str) -> Option<Vec<u8>> {
    let mut f = fs::File::open(path).ok()?;
    let mut buf = vec![0u8; SCRATCH_CAP];
    let n = f.read(&mut buf).ok()?;
    buf.truncate(n);
    Some(buf)
}

/// `/proc/<pid>/comm`, trimmed of its trailing newline.
pub fn read_comm(pid: ProcessId) -> Option<Name> {
    let data = read_bounded(&format!("/proc/{}/comm", pid.0))?;
    let trimmed = trim_trailing_newline(&data);
    Some(Name::from_slice(trimmed))
}

/// The first NUL-terminated slice of `/proc/<pid>/cmdline` — argv[0].
pub fn read_cmdline_arg0(pid: ProcessId) -> Option<Path256> {
    let data = read_bounded(&format!("/proc/{}/cmdline", pid.0))?;
    let arg0 = data.split(|&b| b == 0).next().unwrap_or(&[]);
    if arg0.is_empty() {
        return None;
    }
    Some(Path256::from_slice(arg0))
}

/// `/proc/<pid>/exe`'s target, or `None` if the symlink is unreadable
/// (permissions, or the process has already exited).
pub fn read_exe(pid: ProcessId) -> Option<Path256> {
    let target = fs::read_link(format!("/proc/{}/exe", pid.0)).ok()?;
    let bytes = target.as_os_str().as_encoded_bytes();
    Some(Path256::from_slice(bytes))
}

/// The basename of [read_exe], i.e. the component after the last `/`.
pub fn read_exe_basename(pid: ProcessId) -> Option<Path256> {
    let exe = read_exe(pid)?;
    let bytes = exe.as_bytes();
    let base = bytes
        .iter()
        .rposition(|&b| b == b'/')
        .map(|i| &bytes[i + 1..])
        .unwrap_or(bytes);
    Some(Path256::from_slice(base))
}

/// Parse the `PPid:` line out of `/proc/<pid>/status`.
pub fn read_ppid(pid: ProcessId) -> Option<ProcessId> {
    let data = read_bounded(&format!("/proc/{}/status", pid.0))?;
    let text = std::str::from_utf8(&data).ok()?;
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("PPid:") {
            let ppid: i32 = rest.trim().parse().ok()?;
            return Some(ProcessId(ppid));
        }
    }
    None
}

/// Read `NAME=value` out of `/proc/<pid>/environ` (NUL-separated), returning
/// the value for the first matching `name`.
pub fn read_environ_var(pid: ProcessId, name: &str) -> Option<String> {
    let data = read_bounded(&format!("/proc/{}/environ", pid.0))?;
    for entry in data.split(|&b| b == 0) {
        if entry.is_empty() {
            continue;
        }
        let text = std::str::from_utf8(entry).ok()?;
        if let Some(value) = text.strip_prefix(name).and_then(|r| r.strip_prefix('=')) {
            return Some(value.to_string());
        }
    }
    None
}

fn trim_trailing_newline(data: &[u8]) -> &[u8] {
    if data.last() == Some(&b'\n') {
        &data[..data.len() - 1]
    } else {
        data
    }
}

/// List every live PID under `/proc` whose parent is `parent`.
///
/// Scans `/proc`, reads each entry's `status` for `PPid:`, and keeps those
/// equal to `parent`. A dead/racing PID (file vanished mid-scan) is skipped
/// silently, per spec.md §4.2.
pub fn children_of(parent: ProcessId) -> Vec<ProcessId> {
    let mut out = Vec::new();
    let Ok(entries) = fs::read_dir("/proc") else {
        return out;
    };
    for entry in entries.flatten() {
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        let Ok(pid) = name.parse::<i32>() else {
            continue;
        };
        let pid = ProcessId(pid);
        if read_ppid(pid) == Some(parent) {
            out.push(pid);
        }
        if out.len() >= MAX_NODES {
            break;
        }
    }
    out
}

/// One entry in a process-tree walk: the PID and its depth (parent hops)
/// from the walk's root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeNode {
    pub pid: ProcessId,
    pub depth: u32,
}

/// Breadth-first walk of every descendant of `root` (the root itself is not
/// included — spec.md §8: "the process itself is *not* included as
/// depth-0"). Bounded by [MAX_DEPTH] and [MAX_NODES]; overflow truncates
/// silently rather than erroring. Breadth-first, rather than depth-first,
/// so the emitted order is shallowest-first with non-decreasing depths —
/// the ordering [crate::detector::DetectedList] relies on.
pub fn walk_descendants(root: ProcessId) -> Vec<TreeNode> {
    use std::collections::VecDeque;

    let mut out = Vec::new();
    let mut queue: VecDeque<(ProcessId, u32)> = VecDeque::new();
    queue.push_back((root, 0));
    while let Some((pid, depth)) = queue.pop_front() {
        if out.len() >= MAX_NODES {
            break;
        }
        if depth as usize >= MAX_DEPTH {
            continue;
        }
        for child in children_of(pid) {
            out.push(TreeNode {
                pid: child,
                depth: depth + 1,
            });
            queue.push_back((child, depth + 1));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_trailing_newline_strips_one() {
        assert_eq!(trim_trailing_newline(b"nvim\n"), b"nvim");
        assert_eq!(trim_trailing_newline(b"nvim"), b"nvim");
        assert_eq!(trim_trailing_newline(b""), b"");
    }

    #[test]
    fn read_ppid_parses_status_line() {
        let data = b"Name:\tbash\nState:\tS\nPPid:\t1234\nUid:\t0\n";
        let text = std::str::from_utf8(data).unwrap();
        let mut found = None;
        for line in text.lines() {
            if let Some(rest) = line.strip_prefix("PPid:") {
                found = rest.trim().parse::<i32>().ok();
            }
        }
        assert_eq!(found, Some(1234));
    }

    #[test]
    fn walk_descendants_of_dead_pid_is_empty() {
        // PID 999999999 should never exist.
        let nodes = walk_descendants(ProcessId(999_999_999));
        assert!(nodes.is_empty());
    }

    #[test]
    fn read_comm_and_ppid_of_self() {
        let me = ProcessId(std::process::id() as i32);
        assert!(read_comm(me).is_some());
        // init/systemd is always PID 1's ancestor chain; our own ppid must
        // at least be a positive number.
        if let Some(ppid) = read_ppid(me) {
            assert!(ppid.is_present());
        }
    }
}
