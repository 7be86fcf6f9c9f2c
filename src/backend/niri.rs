//! Niri backend: newline-terminated JSON over niri's own IPC socket.
//!
//! Spec.md §4.4.3. Every request and reply is a single JSON value on its
//! own line; replies are wrapped `{"Ok": ...}` / `{"Err": "..."}`.

use super::{Direction, EnvSource, WindowManager};
use crate::error::{Error, Result};
use crate::sockio;
use crate::types::ProcessId;
use serde_json::Value;
use std::path::PathBuf;

const LINE_CAP: usize = 8192;

pub struct Niri {
    socket_path: PathBuf,
}

impl Niri {
    pub fn new(env: &dyn EnvSource) -> Result<Self> {
        let path = env.get("NIRI_SOCKET").ok_or(Error::NoSocketPath)?;
        Ok(Self {
            socket_path: PathBuf::from(path),
        })
    }

    fn request(&self, request: &Value, timeout_ms: u64) -> Result<Value> {
        let mut stream = sockio::connect(&self.socket_path, timeout_ms)?;
        let mut line = serde_json::to_vec(request)?;
        line.push(b'\n');
        sockio::write_all(&mut stream, &line)?;

        let mut buf = vec![0u8; LINE_CAP];
        let reply = sockio::read_line_bounded(&mut stream, &mut buf)?;
        let wrapped: Value = serde_json::from_slice(reply)?;
        match wrapped {
            Value::Object(ref map) if map.contains_key("Ok") => Ok(map["Ok"].clone()),
            Value::Object(ref map) if map.contains_key("Err") => {
                Err(Error::Str(map["Err"].to_string()))
            }
            _ => Err(Error::ProtocolError),
        }
    }
}

fn action_for(dir: Direction) -> Value {
    let name = match dir {
        Direction::Left => "FocusColumnOrMonitorLeft",
        Direction::Right => "FocusColumnOrMonitorRight",
        Direction::Up => "FocusWindowOrMonitorUp",
        Direction::Down => "FocusWindowOrMonitorDown",
    };
    serde_json::json!({ "Action": { name: {} } })
}

fn parse_focused_pid(ok: &Value) -> Option<ProcessId> {
    let pid = ok.get("FocusedWindow")?.get("pid")?.as_i64()?;
    if pid > 0 {
        Some(ProcessId(pid as i32))
    } else {
        None
    }
}

impl WindowManager for Niri {
    fn focused_pid(&mut self, timeout_ms: u64) -> Result<Option<ProcessId>> {
        let ok = self.request(&Value::String("FocusedWindow".to_string()), timeout_ms)?;
        Ok(parse_focused_pid(&ok))
    }

    fn move_focus(&mut self, dir: Direction, timeout_ms: u64) -> Result<()> {
        self.request(&action_for(dir), timeout_ms)?;
        Ok(())
    }

    fn disconnect(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_focused_pid_null_is_none() {
        let ok: Value = serde_json::from_str(r#"{"FocusedWindow":null}"#).unwrap();
        assert_eq!(parse_focused_pid(&ok), None);
    }

    #[test]
    fn parse_focused_pid_zero_is_none() {
        let ok: Value = serde_json::from_str(r#"{"FocusedWindow":{"pid":0}}"#).unwrap();
        assert_eq!(parse_focused_pid(&ok), None);
    }

    #[test]
    fn parse_focused_pid_positive_is_present() {
        let ok: Value = serde_json::from_str(r#"{"FocusedWindow":{"pid":55}}"#).unwrap();
        assert_eq!(parse_focused_pid(&ok), Some(ProcessId(55)));
    }

    #[test]
    fn action_for_emits_expected_shape_per_direction() {
        assert_eq!(
            action_for(Direction::Left),
            serde_json::json!({"Action": {"FocusColumnOrMonitorLeft": {}}})
        );
        assert_eq!(
            action_for(Direction::Down),
            serde_json::json!({"Action": {"FocusWindowOrMonitorDown": {}}})
        );
    }

    #[test]
    fn request_roundtrips_ok_and_err_wrappers() {
        use std::io::{BufRead, BufReader, Write};
        use std::os::unix::net::UnixStream;
        use std::thread;

        let (mut a, b) = UnixStream::pair().unwrap();
        let server = thread::spawn(move || {
            let mut reader = BufReader::new(&a);
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            assert_eq!(line.trim_end(), "\"FocusedWindow\"");
            a.write_all(b"{\"Ok\":{\"FocusedWindow\":{\"pid\":9}}}\n").unwrap();
        });

        let mut stream = b;
        let req = serde_json::Value::String("FocusedWindow".to_string());
        let mut line = serde_json::to_vec(&req).unwrap();
        line.push(b'\n');
        sockio::write_all(&mut stream, &line).unwrap();
        let mut buf = vec![0u8; LINE_CAP];
        let reply = sockio::read_line_bounded(&mut stream, &mut buf).unwrap();
        let wrapped: Value = serde_json::from_slice(reply).unwrap();
        assert_eq!(parse_focused_pid(&wrapped["Ok"]), Some(ProcessId(9)));
        server.join().unwrap();
    }
}
