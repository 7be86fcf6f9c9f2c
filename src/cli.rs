//! Command-line surface: argument parsing and the top-level `run` dispatch.
//!
//! Spec.md §6. Argument parsing itself is explicitly out of scope for the
//! core (a "thin CLI shell" per spec.md §1), so this module stays a thin
//! translation from [clap]'s derive output to the resolver's inputs.

use crate::backend::{self, ProcessEnv, WmKind};
use crate::debug_log;
use crate::direction::Direction;
use crate::hooks::{self, HookKind};
use crate::resolver;
use clap::Parser;

/// Default round-trip timeout, used when `--timeout` is not given
/// (spec.md §5: "default 100 ms").
const DEFAULT_TIMEOUT_MS: u64 = 100;

const ALL_HOOKS: [HookKind; 6] = [
    HookKind::Nvim,
    HookKind::Tmux,
    HookKind::Vscode,
    HookKind::Kitty,
    HookKind::Wezterm,
    HookKind::Ghostty,
];

/// `nvg <left|right|up|down> [-t|--timeout MS] [--hooks a,b,c] [--wm NAME]`
#[derive(Parser, Debug)]
#[command(
    author = "Yury Shvedov (github:ein-shved)",
    version,
    about = "Directional focus navigation: move focus inside the app or between windows"
)]
pub struct Cli {
    /// Direction to navigate in.
    #[arg(value_enum)]
    direction: Direction,

    /// Round-trip timeout for every IPC call, in milliseconds. 0 disables it.
    #[arg(short = 't', long = "timeout", default_value_t = DEFAULT_TIMEOUT_MS)]
    timeout: u64,

    /// Comma-separated subset of the hook registry to enable.
    #[arg(long = "hooks", value_enum, value_delimiter = ',')]
    hooks: Option<Vec<HookKind>>,

    /// Force a specific window manager instead of auto-detecting one.
    #[arg(long = "wm", value_enum)]
    wm: Option<WmKind>,
}

impl Cli {
    /// Resolve `--hooks` into the enabled [HookKind]s, enforcing spec.md §6's
    /// usage-error policy for an explicitly-empty list; unknown names are
    /// already rejected by clap at parse time. Omitting `--hooks` entirely
    /// enables every hook.
    fn resolve_hooks(&self) -> Result<Vec<HookKind>, String> {
        match &self.hooks {
            None => Ok(ALL_HOOKS.to_vec()),
            Some(hooks) if hooks.is_empty() => Err("--hooks requires at least one name".to_string()),
            Some(hooks) => Ok(hooks.clone()),
        }
    }

    /// Run the parsed command to completion. Returns the process exit code
    /// (spec.md §6: 0 on success or no-op, 1 on argument/connection error).
    pub fn run(self) -> i32 {
        let selected = match self.resolve_hooks() {
            Ok(h) => h,
            Err(msg) => {
                eprintln!("nvg: {msg}");
                return 1;
            }
        };
        let enabled_hooks = hooks::enabled(&selected);

        let mut wm = match backend::build(self.wm, &ProcessEnv) {
            Ok(wm) => wm,
            Err(e) => {
                eprintln!("nvg: {e}");
                return 1;
            }
        };

        debug_log!("navigating {} with timeout {}ms", self.direction, self.timeout);
        resolver::navigate(&mut wm, self.direction, self.timeout, &enabled_hooks, &|pid, hooks| {
            crate::detector::detect_all(pid, hooks)
        });
        wm.disconnect();
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_hooks_defaults_to_all_six() {
        let cli = Cli {
            direction: Direction::Left,
            timeout: DEFAULT_TIMEOUT_MS,
            hooks: None,
            wm: None,
        };
        assert_eq!(cli.resolve_hooks().unwrap().len(), 6);
    }

    #[test]
    fn resolve_hooks_rejects_empty_list() {
        let cli = Cli {
            direction: Direction::Left,
            timeout: DEFAULT_TIMEOUT_MS,
            hooks: Some(vec![]),
            wm: None,
        };
        assert!(cli.resolve_hooks().is_err());
    }

    #[test]
    fn resolve_hooks_accepts_known_subset() {
        let cli = Cli {
            direction: Direction::Left,
            timeout: DEFAULT_TIMEOUT_MS,
            hooks: Some(vec![HookKind::Tmux, HookKind::Kitty]),
            wm: None,
        };
        assert_eq!(
            cli.resolve_hooks().unwrap(),
            vec![HookKind::Tmux, HookKind::Kitty]
        );
    }
}
