//! Window-manager backends: five native protocol clients behind one
//! capability.
//!
//! Spec.md §4.4-4.5. Each backend opens a fresh connection per call unless
//! its module says otherwise. [Backend] is a tagged union over the
//! concrete clients rather than a `Box<dyn WindowManager>` — there are
//! exactly five variants, known at compile time, and a match arm is cheaper
//! and easier to exhaustively test than an indirection.

mod dwm;
mod hyprland;
mod niri;
mod river;
mod sway;

use crate::error::{Error, Result};
use crate::types::ProcessId;
use clap::ValueEnum;

/// Direction as the backends see it — identical to [crate::direction::Direction],
/// re-exported here so backend modules don't need to reach across the crate.
pub use crate::direction::Direction;

/// `--wm` / auto-detected WM identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum WmKind {
    Sway,
    I3,
    Hyprland,
    Niri,
    River,
    Dwm,
}

/// The uniform capability every backend exposes (spec.md §3: "Polymorphic
/// over {getFocusedPid, moveFocus, disconnect}").
pub trait WindowManager {
    /// The PID of the process owning the currently focused window, if any.
    fn focused_pid(&mut self, timeout_ms: u64) -> Result<Option<ProcessId>>;

    /// Move WM-level focus one step. Best-effort: failures are swallowed by
    /// the caller, not by the backend, so they surface through `Result`.
    fn move_focus(&mut self, dir: Direction, timeout_ms: u64) -> Result<()>;

    /// Release any held resources. A no-op for backends that always
    /// reconnect per call; meaningful for River, which keeps registry
    /// bindings alive across a single invocation.
    fn disconnect(&mut self);
}

/// Tagged union over the five concrete backends.
pub enum Backend {
    Sway(sway::Sway),
    Hyprland(hyprland::Hyprland),
    Niri(niri::Niri),
    River(river::River),
    Dwm(dwm::Dwm),
}

impl WindowManager for Backend {
    fn focused_pid(&mut self, timeout_ms: u64) -> Result<Option<ProcessId>> {
        match self {
            Backend::Sway(b) => b.focused_pid(timeout_ms),
            Backend::Hyprland(b) => b.focused_pid(timeout_ms),
            Backend::Niri(b) => b.focused_pid(timeout_ms),
            Backend::River(b) => b.focused_pid(timeout_ms),
            Backend::Dwm(b) => b.focused_pid(timeout_ms),
        }
    }

    fn move_focus(&mut self, dir: Direction, timeout_ms: u64) -> Result<()> {
        match self {
            Backend::Sway(b) => b.move_focus(dir, timeout_ms),
            Backend::Hyprland(b) => b.move_focus(dir, timeout_ms),
            Backend::Niri(b) => b.move_focus(dir, timeout_ms),
            Backend::River(b) => b.move_focus(dir, timeout_ms),
            Backend::Dwm(b) => b.move_focus(dir, timeout_ms),
        }
    }

    fn disconnect(&mut self) {
        match self {
            Backend::Sway(b) => b.disconnect(),
            Backend::Hyprland(b) => b.disconnect(),
            Backend::Niri(b) => b.disconnect(),
            Backend::River(b) => b.disconnect(),
            Backend::Dwm(b) => b.disconnect(),
        }
    }
}

/// Build the backend named by an explicit `--wm`, or fall back to probing
/// the environment (spec.md §4.5). `"i3"` maps onto the sway client — same
/// wire protocol.
pub fn build(explicit: Option<WmKind>, env: &dyn EnvSource) -> Result<Backend> {
    let kind = explicit.or_else(|| detect_backend(env)).ok_or(Error::NoWmDetected)?;
    Ok(match kind {
        WmKind::Sway | WmKind::I3 => Backend::Sway(sway::Sway::new(env)?),
        WmKind::Hyprland => Backend::Hyprland(hyprland::Hyprland::new(env)?),
        WmKind::Niri => Backend::Niri(niri::Niri::new(env)?),
        WmKind::River => Backend::River(river::River::new(env)?),
        WmKind::Dwm => Backend::Dwm(dwm::Dwm::new(env)?),
    })
}

/// Indirection over environment-variable lookup, so backend selection and
/// each backend's socket-path resolution are testable without mutating the
/// real process environment.
pub trait EnvSource {
    fn get(&self, name: &str) -> Option<String>;
}

/// [EnvSource] backed by the real process environment.
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

fn detect_backend(env: &dyn EnvSource) -> Option<WmKind> {
    if env.get("SWAYSOCK").is_some() {
        return Some(WmKind::Sway);
    }
    if env.get("I3SOCK").is_some() {
        return Some(WmKind::Sway);
    }
    if env.get("HYPRLAND_INSTANCE_SIGNATURE").is_some() {
        return Some(WmKind::Hyprland);
    }
    if env.get("NIRI_SOCKET").is_some() {
        return Some(WmKind::Niri);
    }
    if env.get("XDG_CURRENT_DESKTOP").as_deref() == Some("river") && env.get("WAYLAND_DISPLAY").is_some()
    {
        return Some(WmKind::River);
    }
    if env.get("DWM_FIFO").is_some() {
        return Some(WmKind::Dwm);
    }
    None
}
