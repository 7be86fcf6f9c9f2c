//! Socket I/O utilities shared by every WM backend and hook transport.
//!
//! Thin wrappers around [std::os::unix::net::UnixStream]: bounded
//! write-all/read-exact loops and timeout setup. No buffering layer —
//! callers own fixed-size buffers, per spec.md §9's fixed-buffer discipline.

use crate::error::{Error, Result};
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

/// Connect to a Unix domain socket at `path`, applying `timeout_ms` (0 =
/// no timeout) to both halves of the connection.
pub fn connect(path: &Path, timeout_ms: u64) -> Result<UnixStream> {
    let stream = UnixStream::connect(path)
        .map_err(|_| Error::ConnectFailed(path.display().to_string()))?;
    set_timeouts(&stream, timeout_ms)?;
    Ok(stream)
}

/// Apply `timeout_ms` (0 disables the timeout) as both SO_RCVTIMEO and
/// SO_SNDTIMEO on `stream`.
pub fn set_timeouts(stream: &UnixStream, timeout_ms: u64) -> Result<()> {
    let dur = if timeout_ms == 0 {
        None
    } else {
        Some(Duration::from_millis(timeout_ms))
    };
    stream.set_read_timeout(dur)?;
    stream.set_write_timeout(dur)?;
    Ok(())
}

/// Write the entirety of `buf` to `stream`, retrying short writes.
pub fn write_all(stream: &mut UnixStream, buf: &[u8]) -> Result<()> {
    stream.write_all(buf).map_err(|_| Error::WriteFailed)
}

/// Read exactly `buf.len()` bytes from `stream`, retrying short reads.
pub fn read_exact(stream: &mut UnixStream, buf: &mut [u8]) -> Result<()> {
    stream.read_exact(buf).map_err(|_| Error::ReadFailed)
}

/// Read until EOF into a fixed-capacity buffer, returning the slice that was
/// actually filled. Used by backends (Hyprland) whose server signals
/// end-of-reply by closing its write half rather than by framing.
///
/// An overrun (more data than `buf` can hold) is a parse error, not a
/// truncated success — see spec.md §5's buffer-overrun policy.
pub fn read_to_end_bounded<'a>(
    stream: &mut UnixStream,
    buf: &'a mut [u8],
) -> Result<&'a [u8]> {
    let mut filled = 0;
    loop {
        if filled == buf.len() {
            // One more byte of unread data means the reply overran the buffer.
            let mut probe = [0u8; 1];
            match stream.read(&mut probe) {
                Ok(0) => break,
                Ok(_) => return Err(Error::ParseFailed),
                Err(_) => break,
            }
        }
        match stream.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(_) => return Err(Error::ReadFailed),
        }
    }
    Ok(&buf[..filled])
}

/// Read a single newline-terminated line into a fixed-capacity buffer
/// (used by the text-line protocols: Niri's JSON lines, kitty/wezterm CLI
/// output is read via `Command` instead). Returns the line without its
/// trailing `\n`.
pub fn read_line_bounded<'a>(
    stream: &mut UnixStream,
    buf: &'a mut [u8],
) -> Result<&'a [u8]> {
    let mut filled = 0;
    let mut byte = [0u8; 1];
    loop {
        match stream.read(&mut byte) {
            Ok(0) => break,
            Ok(_) => {
                if byte[0] == b'\n' {
                    break;
                }
                if filled == buf.len() {
                    return Err(Error::ParseFailed);
                }
                buf[filled] = byte[0];
                filled += 1;
            }
            Err(_) => return Err(Error::ReadFailed),
        }
    }
    Ok(&buf[..filled])
}
