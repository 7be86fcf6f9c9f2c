//! Hyprland backend: a plain-text line protocol over Hyprland's control
//! socket.
//!
//! Spec.md §4.4.2. Unlike sway's length-prefixed frames, Hyprland's socket
//! has no reply framing at all — the server signals "done" by closing its
//! write half, so every request is: connect, write, shutdown our write
//! half, read to EOF.

use super::{Direction, EnvSource, WindowManager};
use crate::error::{Error, Result};
use crate::sockio;
use crate::types::ProcessId;
use serde::Deserialize;
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

const REPLY_CAP: usize = 8192;

pub struct Hyprland {
    socket_path: PathBuf,
}

impl Hyprland {
    pub fn new(env: &dyn EnvSource) -> Result<Self> {
        let runtime_dir = env.get("XDG_RUNTIME_DIR").ok_or(Error::NoSocketPath)?;
        let signature = env
            .get("HYPRLAND_INSTANCE_SIGNATURE")
            .ok_or(Error::NoSocketPath)?;
        Ok(Self {
            socket_path: PathBuf::from(format!("{runtime_dir}/hypr/{signature}/.socket.sock")),
        })
    }

    fn request(&self, command: &str, timeout_ms: u64) -> Result<Vec<u8>> {
        let mut stream = sockio::connect(&self.socket_path, timeout_ms)?;
        write_and_half_close(&mut stream, command.as_bytes())?;
        let mut buf = vec![0u8; REPLY_CAP];
        let data = sockio::read_to_end_bounded(&mut stream, &mut buf)?;
        Ok(data.to_vec())
    }
}

fn write_and_half_close(stream: &mut UnixStream, data: &[u8]) -> Result<()> {
    sockio::write_all(stream, data)?;
    stream.shutdown(Shutdown::Write).map_err(|_| Error::WriteFailed)
}

#[derive(Deserialize)]
struct ActiveWindow {
    pid: i64,
}

fn dispatch_letter(dir: Direction) -> &'static str {
    match dir {
        Direction::Left => "l",
        Direction::Right => "r",
        Direction::Up => "u",
        Direction::Down => "d",
    }
}

fn parse_active_window_pid(body: &[u8]) -> Result<Option<ProcessId>> {
    let window: ActiveWindow = serde_json::from_slice(body)?;
    if window.pid > 0 {
        Ok(Some(ProcessId(window.pid as i32)))
    } else {
        Ok(None)
    }
}

impl WindowManager for Hyprland {
    fn focused_pid(&mut self, timeout_ms: u64) -> Result<Option<ProcessId>> {
        let body = self.request("j/activewindow", timeout_ms)?;
        parse_active_window_pid(&body)
    }

    fn move_focus(&mut self, dir: Direction, timeout_ms: u64) -> Result<()> {
        let cmd = format!("dispatch movefocus {}", dispatch_letter(dir));
        self.request(&cmd, timeout_ms)?;
        Ok(())
    }

    fn disconnect(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_active_window_pid_zero_means_none() {
        assert_eq!(parse_active_window_pid(br#"{"pid":0}"#).unwrap(), None);
    }

    #[test]
    fn parse_active_window_pid_positive_is_present() {
        assert_eq!(
            parse_active_window_pid(br#"{"pid":4242}"#).unwrap(),
            Some(ProcessId(4242))
        );
    }

    #[test]
    fn dispatch_letter_matches_hyprland_vocabulary() {
        assert_eq!(dispatch_letter(Direction::Left), "l");
        assert_eq!(dispatch_letter(Direction::Right), "r");
        assert_eq!(dispatch_letter(Direction::Up), "u");
        assert_eq!(dispatch_letter(Direction::Down), "d");
    }

    #[test]
    fn request_writes_then_half_closes_then_reads_eof() {
        use std::io::{Read, Write};
        use std::thread;

        let (mut a, mut b) = UnixStream::pair().unwrap();
        let server = thread::spawn(move || {
            let mut request = Vec::new();
            a.read_to_end(&mut request).unwrap();
            assert_eq!(request, b"j/activewindow");
            a.write_all(br#"{"pid":7}"#).unwrap();
        });
        write_and_half_close(&mut b, b"j/activewindow").unwrap();
        let mut buf = [0u8; 256];
        let data = sockio::read_to_end_bounded(&mut b, &mut buf).unwrap();
        assert_eq!(parse_active_window_pid(data).unwrap(), Some(ProcessId(7)));
        server.join().unwrap();
    }
}
