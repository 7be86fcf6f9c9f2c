//! The focus resolver: the decision core that ties backend, detector, and
//! hooks together into one navigate-one-step action.
//!
//! Spec.md §4.1. This module never touches a real socket itself — it only
//! calls through the [crate::backend::WindowManager] and
//! [crate::hooks::Hook] traits, which is what makes the algorithm testable
//! with fakes instead of a live compositor.

use crate::backend::WindowManager;
use crate::detector::DetectedList;
use crate::direction::Direction;
use crate::error::Answer;
use crate::hooks::Hook;
use crate::types::ProcessId;

/// `detectAll` as the resolver sees it: given the WM-focused pid and the
/// enabled hooks, produce a shallowest-first [DetectedList]. Production
/// wires this to [crate::detector::detect_all]; tests supply a closure over
/// a synthetic tree.
pub type DetectAll = dyn Fn(ProcessId, &[&'static dyn Hook]) -> DetectedList;

/// Perform exactly one focus action and return. See spec.md §4.1 for the
/// five-step algorithm this implements step-for-step.
pub fn navigate(
    wm: &mut dyn WindowManager,
    dir: Direction,
    timeout_ms: u64,
    hooks: &[&'static dyn Hook],
    detect_all: &DetectAll,
) {
    let Ok(Some(pid)) = wm.focused_pid(timeout_ms) else {
        wm_move_and_land(wm, dir, timeout_ms, hooks, detect_all);
        return;
    };

    let detected = detect_all(pid, hooks);
    if detected.is_empty() {
        wm_move_and_land(wm, dir, timeout_ms, hooks, detect_all);
        return;
    }

    for entry in detected.iter().rev() {
        match entry.hook.can_move(entry.pid, dir, timeout_ms) {
            Answer::Yes => {
                entry.hook.move_focus(entry.pid, dir, timeout_ms);
                return;
            }
            Answer::No | Answer::Unknown => continue,
        }
    }

    wm_move_and_land(wm, dir, timeout_ms, hooks, detect_all);
}

fn wm_move_and_land(
    wm: &mut dyn WindowManager,
    dir: Direction,
    timeout_ms: u64,
    hooks: &[&'static dyn Hook],
    detect_all: &DetectAll,
) {
    if wm.move_focus(dir, timeout_ms).is_err() {
        return;
    }

    let Ok(Some(pid)) = wm.focused_pid(timeout_ms) else {
        return;
    };

    let detected = detect_all(pid, hooks);
    let Some(inner) = detected.deepest() else {
        return;
    };

    inner.hook.move_to_edge(inner.pid, dir.opposite(), timeout_ms);
}
