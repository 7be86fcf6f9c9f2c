//! River backend: a minimal Wayland wire client.
//!
//! Spec.md §4.4.4. No `wayland-client` dependency — River's focus-navigation
//! surface needs exactly three globals and two roundtrips, so this speaks
//! the wire format directly: `object_id:u32 | (size:u16 << 16 | opcode:u16)
//! | args…`, little-endian throughout, every string/array padded to a
//! 4-byte boundary.

use super::{Direction, EnvSource, WindowManager};
use crate::error::{Error, Result};
use crate::proc;
use crate::types::{AppId, ProcessId};
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::time::Duration;

const WL_DISPLAY_ID: u32 = 1;
const WL_DISPLAY_GET_REGISTRY: u16 = 1;
const WL_DISPLAY_SYNC: u16 = 0;
const WL_DISPLAY_EVENT_ERROR: u16 = 0;

const WL_REGISTRY_BIND: u16 = 0;
const WL_REGISTRY_EVENT_GLOBAL: u16 = 0;

const WL_CALLBACK_EVENT_DONE: u16 = 0;

const ZWLR_TOPLEVEL_MANAGER_EVENT_TOPLEVEL: u16 = 0;
const ZWLR_TOPLEVEL_EVENT_APP_ID: u16 = 3;
const ZWLR_TOPLEVEL_EVENT_STATE: u16 = 5;
const ZWLR_TOPLEVEL_EVENT_DONE: u16 = 6;
const ZWLR_TOPLEVEL_EVENT_CLOSED: u16 = 7;
const ZWLR_TOPLEVEL_STATE_ACTIVATED: u32 = 2;

const ZRIVER_CONTROL_ADD_ARGUMENT: u16 = 0;
const ZRIVER_CONTROL_RUN_COMMAND: u16 = 1;

const MESSAGE_CAP: usize = 16 * 1024;

/// Next client-allocated object id. River's compositor owns ids 0xff000000+;
/// clients start from 2 (1 is always `wl_display`).
struct IdAllocator(u32);

impl IdAllocator {
    fn new() -> Self {
        Self(2)
    }
    fn next(&mut self) -> u32 {
        let id = self.0;
        self.0 += 1;
        id
    }
}

struct MessageWriter {
    body: Vec<u8>,
}

impl MessageWriter {
    fn new() -> Self {
        Self { body: Vec::new() }
    }
    fn uint(&mut self, v: u32) -> &mut Self {
        self.body.extend_from_slice(&v.to_le_bytes());
        self
    }
    fn string(&mut self, s: &str) -> &mut Self {
        let with_nul_len = s.len() as u32 + 1;
        self.body.extend_from_slice(&with_nul_len.to_le_bytes());
        self.body.extend_from_slice(s.as_bytes());
        self.body.push(0);
        pad_to_4(&mut self.body);
        self
    }
    fn finish(self, object_id: u32, opcode: u16) -> Vec<u8> {
        let size = (8 + self.body.len()) as u16;
        let mut out = Vec::with_capacity(8 + self.body.len());
        out.extend_from_slice(&object_id.to_le_bytes());
        out.extend_from_slice(&(((size as u32) << 16) | opcode as u32).to_le_bytes());
        out.extend_from_slice(&self.body);
        out
    }
}

fn pad_to_4(buf: &mut Vec<u8>) {
    while buf.len() % 4 != 0 {
        buf.push(0);
    }
}

struct WaylandEvent {
    object_id: u32,
    opcode: u16,
    args: Vec<u8>,
}

fn read_event(stream: &mut UnixStream) -> Result<WaylandEvent> {
    let mut header = [0u8; 8];
    stream.read_exact(&mut header).map_err(|_| Error::ReadFailed)?;
    let object_id = u32::from_le_bytes(header[0..4].try_into().unwrap());
    let word = u32::from_le_bytes(header[4..8].try_into().unwrap());
    let opcode = (word & 0xffff) as u16;
    let size = (word >> 16) as usize;
    if size < 8 || size > MESSAGE_CAP {
        return Err(Error::ParseFailed);
    }
    let mut args = vec![0u8; size - 8];
    stream.read_exact(&mut args).map_err(|_| Error::ReadFailed)?;
    Ok(WaylandEvent {
        object_id,
        opcode,
        args,
    })
}

fn read_u32_at(args: &[u8], offset: usize) -> Option<u32> {
    args.get(offset..offset + 4)
        .map(|s| u32::from_le_bytes(s.try_into().unwrap()))
}

/// A length-prefixed, NUL-terminated, 4-byte-padded string argument
/// starting at `offset`. Returns the string and the offset just past it.
fn read_string_at(args: &[u8], offset: usize) -> Option<(&str, usize)> {
    let len = read_u32_at(args, offset)? as usize;
    if len == 0 {
        return None;
    }
    let start = offset + 4;
    let end = start + len;
    let bytes = args.get(start..end)?;
    let text = std::str::from_utf8(&bytes[..len.saturating_sub(1)]).ok()?;
    let mut next = end;
    while next % 4 != 0 {
        next += 1;
    }
    Some((text, next))
}

struct Toplevel {
    app_id: AppId,
    activated: bool,
    closed: bool,
}

pub struct River {
    socket_path: PathBuf,
}

impl River {
    pub fn new(env: &dyn EnvSource) -> Result<Self> {
        let runtime_dir = env.get("XDG_RUNTIME_DIR").ok_or(Error::NoSocketPath)?;
        let display = env.get("WAYLAND_DISPLAY").ok_or(Error::NoSocketPath)?;
        Ok(Self {
            socket_path: PathBuf::from(format!("{runtime_dir}/{display}")),
        })
    }

    fn connect(&self, timeout_ms: u64) -> Result<UnixStream> {
        let stream = UnixStream::connect(&self.socket_path)
            .map_err(|_| Error::ConnectFailed(self.socket_path.display().to_string()))?;
        let dur = (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms));
        stream.set_read_timeout(dur).map_err(Error::Io)?;
        stream.set_write_timeout(dur).map_err(Error::Io)?;
        Ok(stream)
    }

    /// Discover the registry names of `wl_seat`, the foreign-toplevel
    /// manager, and `zriver_control_v1`, then bind them.
    fn discover(&self, stream: &mut UnixStream, ids: &mut IdAllocator) -> Result<Globals> {
        let registry_id = ids.next();
        let registry = MessageWriter::new().uint(registry_id).finish(WL_DISPLAY_ID, WL_DISPLAY_GET_REGISTRY);
        stream.write_all(&registry).map_err(|_| Error::WriteFailed)?;

        let callback_id = ids.next();
        let sync = MessageWriter::new().uint(callback_id).finish(WL_DISPLAY_ID, WL_DISPLAY_SYNC);
        stream.write_all(&sync).map_err(|_| Error::WriteFailed)?;

        let mut names: Globals = Globals::default();
        loop {
            let event = read_event(stream)?;
            if event.object_id == WL_DISPLAY_ID && event.opcode == WL_DISPLAY_EVENT_ERROR {
                return Err(Error::ProtocolError);
            }
            if event.object_id == registry_id && event.opcode == WL_REGISTRY_EVENT_GLOBAL {
                if let Some(name) = read_u32_at(&event.args, 0) {
                    if let Some((interface, _)) = read_string_at(&event.args, 4) {
                        match interface {
                            "wl_seat" => names.seat = Some(name),
                            "zwlr_foreign_toplevel_manager_v1" => names.toplevel_manager = Some(name),
                            "zriver_control_v1" => names.control = Some(name),
                            _ => {}
                        }
                    }
                }
                continue;
            }
            if event.object_id == callback_id && event.opcode == WL_CALLBACK_EVENT_DONE {
                break;
            }
            // Unknown object events are ignored per spec.md §4.4.4.
        }

        names.registry_id = registry_id;
        Ok(names)
    }

    fn bind(
        &self,
        stream: &mut UnixStream,
        ids: &mut IdAllocator,
        registry_id: u32,
        name: u32,
        interface: &str,
    ) -> Result<u32> {
        let id = ids.next();
        let msg = MessageWriter::new()
            .uint(name)
            .string(interface)
            .uint(1)
            .uint(id)
            .finish(registry_id, WL_REGISTRY_BIND);
        stream.write_all(&msg).map_err(|_| Error::WriteFailed)?;
        Ok(id)
    }

    fn list_toplevels(
        &self,
        stream: &mut UnixStream,
        ids: &mut IdAllocator,
        manager_id: u32,
    ) -> Result<Vec<Toplevel>> {
        let callback_id = ids.next();
        let sync = MessageWriter::new().uint(callback_id).finish(WL_DISPLAY_ID, WL_DISPLAY_SYNC);
        stream.write_all(&sync).map_err(|_| Error::WriteFailed)?;

        let mut toplevels: Vec<(u32, Toplevel)> = Vec::new();
        loop {
            let event = read_event(stream)?;
            if event.object_id == WL_DISPLAY_ID && event.opcode == WL_DISPLAY_EVENT_ERROR {
                return Err(Error::ProtocolError);
            }
            if event.object_id == manager_id && event.opcode == ZWLR_TOPLEVEL_MANAGER_EVENT_TOPLEVEL {
                if let Some(handle) = read_u32_at(&event.args, 0) {
                    toplevels.push((
                        handle,
                        Toplevel {
                            app_id: AppId::new(),
                            activated: false,
                            closed: false,
                        },
                    ));
                }
                continue;
            }
            if let Some((_, toplevel)) = toplevels.iter_mut().find(|(id, _)| *id == event.object_id) {
                match event.opcode {
                    ZWLR_TOPLEVEL_EVENT_APP_ID => {
                        if let Some((app_id, _)) = read_string_at(&event.args, 0) {
                            toplevel.app_id = AppId::from_slice(app_id.as_bytes());
                        }
                    }
                    ZWLR_TOPLEVEL_EVENT_STATE => {
                        let len = read_u32_at(&event.args, 0).unwrap_or(0) as usize;
                        let states = &event.args[4..4 + len.min(event.args.len().saturating_sub(4))];
                        toplevel.activated = states
                            .chunks_exact(4)
                            .any(|c| u32::from_le_bytes(c.try_into().unwrap()) == ZWLR_TOPLEVEL_STATE_ACTIVATED);
                    }
                    ZWLR_TOPLEVEL_EVENT_CLOSED => toplevel.closed = true,
                    _ => {}
                }
                continue;
            }
            if event.object_id == callback_id && event.opcode == WL_CALLBACK_EVENT_DONE {
                break;
            }
        }
        Ok(toplevels.into_iter().map(|(_, t)| t).collect())
    }
}

#[derive(Default)]
struct Globals {
    registry_id: u32,
    seat: Option<u32>,
    toplevel_manager: Option<u32>,
    control: Option<u32>,
}

/// Scan `/proc/*/comm` and argv[0] for a case-insensitive match against
/// `app_id`, returning the first matching PID (spec.md §4.4.4).
fn pid_for_app_id(app_id: &str) -> Option<ProcessId> {
    let wanted = app_id.to_lowercase();
    let entries = std::fs::read_dir("/proc").ok()?;
    for entry in entries.flatten() {
        let Ok(pid) = entry.file_name().to_string_lossy().parse::<i32>() else {
            continue;
        };
        let pid = ProcessId(pid);
        if let Some(comm) = proc::read_comm(pid) {
            if comm.as_str().to_lowercase() == wanted {
                return Some(pid);
            }
        }
        if let Some(argv0) = proc::read_cmdline_arg0(pid) {
            let base = argv0
                .as_str()
                .rsplit('/')
                .next()
                .unwrap_or(argv0.as_str())
                .to_lowercase();
            if base == wanted {
                return Some(pid);
            }
        }
    }
    None
}

fn direction_name(dir: Direction) -> &'static str {
    match dir {
        Direction::Left => "left",
        Direction::Right => "right",
        Direction::Up => "up",
        Direction::Down => "down",
    }
}

impl WindowManager for River {
    fn focused_pid(&mut self, timeout_ms: u64) -> Result<Option<ProcessId>> {
        let mut stream = self.connect(timeout_ms)?;
        let mut ids = IdAllocator::new();
        let globals = self.discover(&mut stream, &mut ids)?;
        let Some(name) = globals.toplevel_manager else {
            return Ok(None);
        };
        let manager_id = self.bind(&mut stream, &mut ids, globals.registry_id, name, "zwlr_foreign_toplevel_manager_v1")?;
        let toplevels = self.list_toplevels(&mut stream, &mut ids, manager_id)?;
        let active = toplevels.iter().find(|t| t.activated && !t.closed);
        Ok(active.and_then(|t| pid_for_app_id(t.app_id.as_str())))
    }

    fn move_focus(&mut self, dir: Direction, timeout_ms: u64) -> Result<()> {
        let mut stream = self.connect(timeout_ms)?;
        let mut ids = IdAllocator::new();
        let globals = self.discover(&mut stream, &mut ids)?;
        let (Some(seat_name), Some(control_name)) = (globals.seat, globals.control) else {
            return Ok(());
        };
        let seat_id = self.bind(&mut stream, &mut ids, globals.registry_id, seat_name, "wl_seat")?;
        let control_id = self.bind(&mut stream, &mut ids, globals.registry_id, control_name, "zriver_control_v1")?;

        for arg in ["focus-view", direction_name(dir)] {
            let msg = MessageWriter::new().string(arg).finish(control_id, ZRIVER_CONTROL_ADD_ARGUMENT);
            stream.write_all(&msg).map_err(|_| Error::WriteFailed)?;
        }
        let callback_id = ids.next();
        let msg = MessageWriter::new()
            .uint(seat_id)
            .uint(callback_id)
            .finish(control_id, ZRIVER_CONTROL_RUN_COMMAND);
        stream.write_all(&msg).map_err(|_| Error::WriteFailed)?;

        loop {
            let event = read_event(&mut stream)?;
            if event.object_id == WL_DISPLAY_ID && event.opcode == WL_DISPLAY_EVENT_ERROR {
                break;
            }
            if event.object_id == callback_id {
                break;
            }
        }
        Ok(())
    }

    fn disconnect(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_writer_string_pads_to_four_bytes() {
        let msg = MessageWriter::new().string("ab").finish(1, 0);
        // header(8) + len(4) + "ab\0"(3) padded to 4 = 4
        assert_eq!(msg.len(), 8 + 4 + 4);
        assert_eq!(&msg[8..12], &3u32.to_le_bytes());
        assert_eq!(&msg[12..14], b"ab");
        assert_eq!(msg[14], 0);
        assert_eq!(msg[15], 0);
    }

    #[test]
    fn header_encodes_size_and_opcode_in_one_word() {
        let msg = MessageWriter::new().uint(42).finish(7, 3);
        assert_eq!(&msg[0..4], &7u32.to_le_bytes());
        let size = msg.len() as u32;
        let word = u32::from_le_bytes(msg[4..8].try_into().unwrap());
        assert_eq!(word & 0xffff, 3);
        assert_eq!(word >> 16, size);
    }

    #[test]
    fn read_string_at_strips_nul_and_skips_padding() {
        let msg = MessageWriter::new().string("wl_seat").finish(1, 0);
        let (text, next) = read_string_at(&msg[8..], 0).unwrap();
        assert_eq!(text, "wl_seat");
        assert_eq!(next % 4, 0);
    }

    #[test]
    fn read_string_at_rejects_empty_length() {
        let args = 0u32.to_le_bytes();
        assert!(read_string_at(&args, 0).is_none());
    }

    #[test]
    fn direction_name_is_lowercase() {
        assert_eq!(direction_name(Direction::Up), "up");
        assert_eq!(direction_name(Direction::Left), "left");
    }

    #[test]
    fn id_allocator_starts_at_two_and_increments() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.next(), 2);
        assert_eq!(ids.next(), 3);
    }
}
