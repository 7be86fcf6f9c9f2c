//! Diagnostic trace sink.
//!
//! A single function, gated on `NVG_DEBUG=1`, writing one line to stderr.
//! Deliberately outside the core: no levels, no targets, no formatting
//! layer — this is the thin logging sink spec.md §1 scopes out of the core.

use std::sync::OnceLock;

fn enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| std::env::var("NVG_DEBUG").as_deref() == Ok("1"))
}

/// Write `msg` to stderr if `NVG_DEBUG=1` is set in the environment.
pub fn trace(msg: &str) {
    if enabled() {
        eprintln!("[nvg] {msg}");
    }
}

/// Like [trace] but takes a closure, so callers can avoid formatting costs
/// when tracing is disabled.
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        $crate::debug::trace(&format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_does_not_panic_either_way() {
        trace("unit test trace line");
    }
}
