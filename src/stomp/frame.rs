//! STOMP 1.2 frame codec.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io;
use tokio_util::codec::{Decoder, Encoder};

/// Largest frame accepted from the broker, headers and NUL terminator included.
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

/// A single STOMP frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub command: String,
    /// Headers in wire order. Repeated names are allowed, the first one wins.
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Frame {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Body decoded as UTF-8, invalid sequences replaced.
    pub fn body_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    // Header values of CONNECT and CONNECTED frames are never escaped
    fn escapes_headers(&self) -> bool {
        !matches!(self.command.as_str(), "CONNECT" | "CONNECTED")
    }
}

/// Item read from or written to a STOMP connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StompItem {
    /// A bare end-of-line keeping the connection alive.
    Heartbeat,
    Frame(Frame),
}

/// Encoder and decoder of [`StompItem`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct StompCodec;

fn invalid(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

fn too_large() -> io::Error {
    invalid(format!("frame exceeds {} bytes", MAX_FRAME_SIZE))
}

// Bytes still missing, unless the buffer is already past the frame limit
fn incomplete(src: &BytesMut) -> io::Result<Option<StompItem>> {
    if src.len() > MAX_FRAME_SIZE {
        return Err(too_large());
    }
    Ok(None)
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ':' => out.push_str("\\c"),
            c => out.push(c),
        }
    }
    out
}

fn unescape(value: &str) -> io::Result<String> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('c') => out.push(':'),
            other => return Err(invalid(format!("undefined header escape: \\{:?}", other))),
        }
    }
    Ok(out)
}

impl Decoder for StompCodec {
    type Item = StompItem;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<StompItem>, io::Error> {
        match src.first() {
            None => return Ok(None),
            Some(b'\n') => {
                src.advance(1);
                return Ok(Some(StompItem::Heartbeat));
            }
            Some(b'\r') => {
                return match src.get(1) {
                    None => Ok(None),
                    Some(b'\n') => {
                        src.advance(2);
                        Ok(Some(StompItem::Heartbeat))
                    }
                    Some(_) => Err(invalid("stray carriage return")),
                };
            }
            Some(_) => {}
        }

        // Command and header lines, up to the first empty line
        let mut lines = Vec::new();
        let mut pos = 0;
        let body_start = loop {
            let newline = match src[pos..].iter().position(|b| *b == b'\n') {
                Some(offset) => pos + offset,
                None => return incomplete(src),
            };
            let line = &src[pos..newline];
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line.is_empty() {
                break newline + 1;
            }
            lines.push(
                std::str::from_utf8(line)
                    .map_err(|_| invalid("frame header is not UTF-8"))?
                    .to_string(),
            );
            pos = newline + 1;
        };

        let mut lines = lines.into_iter();
        let command = lines.next().ok_or_else(|| invalid("missing command"))?;
        let mut frame = Frame::new(command);
        let escaped = frame.escapes_headers();
        for line in lines {
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| invalid(format!("malformed header line `{}`", line)))?;
            let (name, value) = if escaped {
                (unescape(name)?, unescape(value)?)
            } else {
                (name.to_string(), value.to_string())
            };
            frame.headers.push((name, value));
        }

        let body_end = match frame.header("content-length") {
            Some(length) => {
                let length: usize = length
                    .trim()
                    .parse()
                    .map_err(|_| invalid(format!("invalid content-length `{}`", length)))?;
                let end = body_start
                    .checked_add(length)
                    .filter(|end| *end < MAX_FRAME_SIZE)
                    .ok_or_else(too_large)?;
                match src.get(end) {
                    None => return Ok(None),
                    Some(0) => end,
                    Some(_) => return Err(invalid("frame body is not NUL terminated")),
                }
            }
            None => match src[body_start..].iter().position(|b| *b == 0) {
                Some(offset) => body_start + offset,
                None => return incomplete(src),
            },
        };
        if body_end >= MAX_FRAME_SIZE {
            return Err(too_large());
        }

        let mut raw = src.split_to(body_end + 1);
        raw.advance(body_start);
        raw.truncate(body_end - body_start);
        frame.body = raw.freeze();

        Ok(Some(StompItem::Frame(frame)))
    }
}

impl Encoder<StompItem> for StompCodec {
    type Error = io::Error;

    fn encode(&mut self, item: StompItem, dst: &mut BytesMut) -> Result<(), io::Error> {
        let frame = match item {
            StompItem::Heartbeat => {
                dst.put_u8(b'\n');
                return Ok(());
            }
            StompItem::Frame(frame) => frame,
        };

        let escaped = frame.escapes_headers();
        dst.put_slice(frame.command.as_bytes());
        dst.put_u8(b'\n');
        for (name, value) in &frame.headers {
            if escaped {
                dst.put_slice(escape(name).as_bytes());
                dst.put_u8(b':');
                dst.put_slice(escape(value).as_bytes());
            } else {
                dst.put_slice(name.as_bytes());
                dst.put_u8(b':');
                dst.put_slice(value.as_bytes());
            }
            dst.put_u8(b'\n');
        }
        if !frame.body.is_empty() && frame.header("content-length").is_none() {
            dst.put_slice(format!("content-length:{}\n", frame.body.len()).as_bytes());
        }
        dst.put_u8(b'\n');
        dst.put_slice(&frame.body);
        dst.put_u8(0);

        Ok(())
    }
}
