//! dwm backend: raw X11 protocol for reading focus, the *dwmfifo* patch's
//! named pipe for moving it.
//!
//! Spec.md §4.4.5. dwm ships no IPC of its own; the dwmfifo patch adds a
//! FIFO that accepts `focusstack-`/`focusstack+` lines, and the only way to
//! learn which window (and PID) is active is to speak X11 directly and read
//! `_NET_ACTIVE_WINDOW`/`_NET_WM_PID` off the root window.

use super::{Direction, EnvSource, WindowManager};
use crate::error::{Error, Result};
use crate::types::ProcessId;
use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::time::Duration;

const SETUP_REPLY_CAP: usize = 64 * 1024;
const OP_INTERN_ATOM: u8 = 16;
const OP_GET_PROPERTY: u8 = 20;
const ATOM_TYPE_ANY: u32 = 0;

pub struct Dwm {
    display_path: PathBuf,
    xauth_path: Option<PathBuf>,
    display_number: u16,
    fifo_path: PathBuf,
}

impl Dwm {
    pub fn new(env: &dyn EnvSource) -> Result<Self> {
        let display = env.get("DISPLAY").ok_or(Error::NoSocketPath)?;
        let (_host, display_number) = parse_display(&display).ok_or(Error::ParseFailed)?;
        let xauth_path = env
            .get("XAUTHORITY")
            .map(PathBuf::from)
            .or_else(|| env.get("HOME").map(|h| PathBuf::from(h).join(".Xauthority")));
        let fifo_path = env
            .get("DWM_FIFO")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/tmp/dwm.fifo"));
        Ok(Self {
            display_path: PathBuf::from(format!("/tmp/.X11-unix/X{display_number}")),
            xauth_path,
            display_number,
            fifo_path,
        })
    }
}

/// Parse `[host]:display[.screen]` (spec.md §4.4.5 step 1); only the
/// display number matters here.
fn parse_display(display: &str) -> Option<(String, u16)> {
    let (host, rest) = display.split_once(':')?;
    let display_part = rest.split('.').next()?;
    let number: u16 = display_part.parse().ok()?;
    Some((host.to_string(), number))
}

struct XAuth {
    name: Vec<u8>,
    data: Vec<u8>,
}

/// Parse big-endian `Xauthority` records: `family:u16 | len:u16 addr |
/// len:u16 number | len:u16 name | len:u16 data`, repeated. `family == 256`
/// (FamilyLocal) matching this host and display, or `family == 0`, wins.
fn read_xauth(path: &std::path::Path, hostname: &str, display_number: u16) -> Option<XAuth> {
    let data = std::fs::read(path).ok()?;
    let mut pos = 0;
    let read_u16 = |buf: &[u8], p: usize| -> Option<u16> {
        buf.get(p..p + 2).map(|s| u16::from_be_bytes([s[0], s[1]]))
    };
    let read_field = |buf: &[u8], p: &mut usize| -> Option<Vec<u8>> {
        let len = read_u16(buf, *p)? as usize;
        *p += 2;
        let field = buf.get(*p..*p + len)?.to_vec();
        *p += len;
        Some(field)
    };
    while pos + 2 <= data.len() {
        let family = read_u16(&data, pos)?;
        pos += 2;
        let addr = read_field(&data, &mut pos)?;
        let number = read_field(&data, &mut pos)?;
        let name = read_field(&data, &mut pos)?;
        let auth_data = read_field(&data, &mut pos)?;
        let number_matches = std::str::from_utf8(&number)
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            == Some(display_number);
        let addr_matches = std::str::from_utf8(&addr).ok() == Some(hostname);
        if family == 0 || (family == 256 && addr_matches && number_matches) {
            return Some(XAuth {
                name,
                data: auth_data,
            });
        }
    }
    None
}

fn pad_to_4(n: usize) -> usize {
    (4 - n % 4) % 4
}

/// Perform the connection setup handshake, returning the stream and the
/// root window id of screen 0.
fn connect_x11(
    socket_path: &std::path::Path,
    auth: Option<&XAuth>,
    timeout_ms: u64,
) -> Result<(UnixStream, u32)> {
    let mut stream = UnixStream::connect(socket_path)
        .map_err(|_| Error::ConnectFailed(socket_path.display().to_string()))?;
    let dur = (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms));
    stream.set_read_timeout(dur).map_err(Error::Io)?;
    stream.set_write_timeout(dur).map_err(Error::Io)?;

    let (auth_name, auth_data): (&[u8], &[u8]) = match auth {
        Some(a) => (&a.name, &a.data),
        None => (&[], &[]),
    };

    let mut req = Vec::with_capacity(12 + auth_name.len() + auth_data.len());
    req.push(b'l'); // little-endian
    req.push(0);
    req.extend_from_slice(&11u16.to_le_bytes());
    req.extend_from_slice(&0u16.to_le_bytes());
    req.extend_from_slice(&(auth_name.len() as u16).to_le_bytes());
    req.extend_from_slice(&(auth_data.len() as u16).to_le_bytes());
    req.extend_from_slice(&0u16.to_le_bytes());
    req.extend_from_slice(auth_name);
    req.resize(req.len() + pad_to_4(auth_name.len()), 0);
    req.extend_from_slice(auth_data);
    req.resize(req.len() + pad_to_4(auth_data.len()), 0);
    stream.write_all(&req).map_err(|_| Error::WriteFailed)?;

    let mut header = [0u8; 8];
    stream.read_exact(&mut header).map_err(|_| Error::ReadFailed)?;
    if header[0] != 1 {
        return Err(Error::ProtocolError);
    }
    let additional_len = u16::from_le_bytes([header[6], header[7]]) as usize * 4;
    if additional_len > SETUP_REPLY_CAP {
        return Err(Error::ParseFailed);
    }
    let mut body = vec![0u8; additional_len];
    stream.read_exact(&mut body).map_err(|_| Error::ReadFailed)?;

    // body: 8 fixed words (32 bytes) then vendor string then pixmap-formats
    // then a sequence of SCREEN structures.
    if body.len() < 32 {
        return Err(Error::ParseFailed);
    }
    let vendor_len = u16::from_le_bytes([body[16], body[17]]) as usize;
    let num_formats = body[21] as usize;
    let mut p = 32 + vendor_len + pad_to_4(vendor_len);
    p += num_formats * 8;
    let root = body.get(p..p + 4).ok_or(Error::ParseFailed)?;
    let root_window = u32::from_le_bytes(root.try_into().unwrap());
    Ok((stream, root_window))
}

fn intern_atom(stream: &mut UnixStream, name: &str) -> Result<u32> {
    let mut req = Vec::with_capacity(8 + name.len() + pad_to_4(name.len()));
    req.push(OP_INTERN_ATOM);
    req.push(0); // only-if-exists = false
    let words = (2 + (name.len() + pad_to_4(name.len())) / 4) as u16;
    req.extend_from_slice(&words.to_le_bytes());
    req.extend_from_slice(&(name.len() as u16).to_le_bytes());
    req.extend_from_slice(&0u16.to_le_bytes());
    req.extend_from_slice(name.as_bytes());
    req.resize(req.len() + pad_to_4(name.len()), 0);
    stream.write_all(&req).map_err(|_| Error::WriteFailed)?;

    let mut reply = [0u8; 32];
    stream.read_exact(&mut reply).map_err(|_| Error::ReadFailed)?;
    Ok(u32::from_le_bytes(reply[8..12].try_into().unwrap()))
}

fn get_property_u32(stream: &mut UnixStream, window: u32, property: u32) -> Result<Option<u32>> {
    let mut req = [0u8; 24];
    req[0] = OP_GET_PROPERTY;
    req[1] = 0; // delete = false
    req[2..4].copy_from_slice(&6u16.to_le_bytes());
    req[4..8].copy_from_slice(&window.to_le_bytes());
    req[8..12].copy_from_slice(&property.to_le_bytes());
    req[12..16].copy_from_slice(&ATOM_TYPE_ANY.to_le_bytes());
    req[16..20].copy_from_slice(&0u32.to_le_bytes());
    req[20..24].copy_from_slice(&1u32.to_le_bytes());
    stream.write_all(&req).map_err(|_| Error::WriteFailed)?;

    let mut reply = [0u8; 32];
    stream.read_exact(&mut reply).map_err(|_| Error::ReadFailed)?;
    let format = reply[1];
    let value_len = u32::from_le_bytes(reply[16..20].try_into().unwrap());
    let reply_len_units = u32::from_le_bytes(reply[4..8].try_into().unwrap()) as usize;
    let mut trailing = vec![0u8; reply_len_units * 4];
    if !trailing.is_empty() {
        stream.read_exact(&mut trailing).map_err(|_| Error::ReadFailed)?;
    }
    if format != 32 || value_len < 1 || trailing.len() < 4 {
        return Ok(None);
    }
    Ok(Some(u32::from_le_bytes(trailing[0..4].try_into().unwrap())))
}

fn fifo_command(dir: Direction) -> &'static [u8] {
    match dir {
        Direction::Left | Direction::Up => b"focusstack-\n",
        Direction::Right | Direction::Down => b"focusstack+\n",
    }
}

impl WindowManager for Dwm {
    fn focused_pid(&mut self, timeout_ms: u64) -> Result<Option<ProcessId>> {
        let hostname = nix::unistd::gethostname()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_default();
        let auth = self
            .xauth_path
            .as_deref()
            .and_then(|p| read_xauth(p, &hostname, self.display_number));
        let (mut stream, root) = connect_x11(&self.display_path, auth.as_ref(), timeout_ms)?;

        let active_window_atom = intern_atom(&mut stream, "_NET_ACTIVE_WINDOW")?;
        let wm_pid_atom = intern_atom(&mut stream, "_NET_WM_PID")?;

        let Some(active_window) = get_property_u32(&mut stream, root, active_window_atom)? else {
            return Ok(None);
        };
        if active_window == 0 {
            return Ok(None);
        }
        let pid = get_property_u32(&mut stream, active_window, wm_pid_atom)?;
        Ok(pid.filter(|&p| p > 0).map(|p| ProcessId(p as i32)))
    }

    fn move_focus(&mut self, dir: Direction, _timeout_ms: u64) -> Result<()> {
        let mut fifo = OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&self.fifo_path)
            .map_err(|_| Error::ConnectFailed(self.fifo_path.display().to_string()))?;
        fifo.write_all(fifo_command(dir)).map_err(|_| Error::WriteFailed)
    }

    fn disconnect(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_display_extracts_number_and_drops_screen() {
        assert_eq!(parse_display(":0").unwrap(), (String::new(), 0));
        assert_eq!(parse_display(":1.0").unwrap(), (String::new(), 1));
        assert_eq!(parse_display("host:2").unwrap(), ("host".to_string(), 2));
    }

    #[test]
    fn parse_display_rejects_missing_colon() {
        assert!(parse_display("nodisplay").is_none());
    }

    #[test]
    fn fifo_command_maps_left_up_to_minus_and_right_down_to_plus() {
        assert_eq!(fifo_command(Direction::Left), b"focusstack-\n");
        assert_eq!(fifo_command(Direction::Up), b"focusstack-\n");
        assert_eq!(fifo_command(Direction::Right), b"focusstack+\n");
        assert_eq!(fifo_command(Direction::Down), b"focusstack+\n");
    }

    #[test]
    fn pad_to_4_rounds_up_to_next_multiple() {
        assert_eq!(pad_to_4(0), 0);
        assert_eq!(pad_to_4(1), 3);
        assert_eq!(pad_to_4(4), 0);
        assert_eq!(pad_to_4(5), 3);
    }

    #[test]
    fn read_xauth_matches_family_local_on_host_and_display() {
        // family=256 (FamilyLocal), addr="myhost", number="1", name="MIT-MAGIC-COOKIE-1", data=[0xAB;16]
        let mut buf = Vec::new();
        let push_field = |buf: &mut Vec<u8>, field: &[u8]| {
            buf.extend_from_slice(&(field.len() as u16).to_be_bytes());
            buf.extend_from_slice(field);
        };
        buf.extend_from_slice(&256u16.to_be_bytes());
        push_field(&mut buf, b"myhost");
        push_field(&mut buf, b"1");
        push_field(&mut buf, b"MIT-MAGIC-COOKIE-1");
        push_field(&mut buf, &[0xABu8; 16]);

        let dir = std::env::temp_dir();
        let path = dir.join(format!("nvg-test-xauth-{}", std::process::id()));
        std::fs::write(&path, &buf).unwrap();
        let auth = read_xauth(&path, "myhost", 1).unwrap();
        assert_eq!(auth.name, b"MIT-MAGIC-COOKIE-1");
        assert_eq!(auth.data, vec![0xABu8; 16]);
        let _ = std::fs::remove_file(&path);
    }
}
