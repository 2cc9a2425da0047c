//! Content-Length framed transport: `Key: value` header lines, a blank
//! line, then a JSON body of exactly the declared byte length.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Upper bound on a declared body size. Larger declarations are treated
/// as framing faults and the declared bytes are drained so the stream
/// stays aligned on the next header block.
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("stream i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed header: {0}")]
    Header(String),
    #[error("undecodable message body: {0}")]
    Json(#[from] serde_json::Error),
}

/// Outcome of one read attempt.
#[derive(Debug)]
pub enum Frame<T> {
    /// A complete decoded body.
    Message(T),
    /// A header block with a missing or zero `Content-Length`; no body
    /// bytes were consumed. Callers skip these and keep reading.
    Empty,
    /// Input closed cleanly before a new header block started.
    Eof,
}

/// Read one frame. Header lines are consumed until a bare `\r\n` or
/// `\n`; the `Content-Length` key is matched case-sensitively.
pub async fn read_frame<R, T>(reader: &mut R) -> Result<Frame<T>, FrameError>
where
    R: AsyncBufRead + Unpin,
    T: DeserializeOwned,
{
    let mut declared_length: Option<String> = None;
    let mut line = String::new();
    let mut in_header_block = false;

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            if in_header_block {
                return Err(FrameError::Header("stream closed mid-header".into()));
            }
            return Ok(Frame::Eof);
        }
        if line == "\r\n" || line == "\n" {
            break;
        }
        in_header_block = true;
        if let Some((key, value)) = line.split_once(':') {
            if key.trim() == "Content-Length" {
                declared_length = Some(value.trim().to_string());
            }
        }
    }

    let length = match declared_length {
        None => return Ok(Frame::Empty),
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| FrameError::Header(format!("unreadable Content-Length {raw:?}")))?,
    };
    if length == 0 {
        return Ok(Frame::Empty);
    }
    if length > MAX_FRAME_SIZE {
        let mut oversized = (&mut *reader).take(length as u64);
        tokio::io::copy(&mut oversized, &mut tokio::io::sink()).await?;
        return Err(FrameError::Header(format!(
            "declared body of {length} bytes exceeds the {MAX_FRAME_SIZE} byte limit"
        )));
    }

    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).await?;
    Ok(Frame::Message(serde_json::from_slice(&body)?))
}

/// Serialize `message` and emit it as a single frame, flushing so the
/// peer sees it immediately.
pub async fn write_frame<W, T>(writer: &mut W, message: &T) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let body = serde_json::to_vec(message)?;
    let header = format!("Content-Length: {}\r\n\r\n", body.len());
    writer.write_all(header.as_bytes()).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}
