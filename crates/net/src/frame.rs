//! Push channel framing
//!
//! Each event travels as `[u32 big-endian length][JSON body]`. Bodies are
//! capped at 1 MiB; a history page larger than that must be paged by the
//! server.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

use crate::error::{Error, Result};
use crate::protocol::PushEvent;

/// Largest accepted frame body in bytes
pub const MAX_FRAME_SIZE: u32 = 1024 * 1024;

fn closed_on_eof(e: io::Error) -> Error {
    match e.kind() {
        io::ErrorKind::UnexpectedEof => Error::ConnectionClosed,
        _ => Error::Io(e),
    }
}

fn check_len(len: usize) -> Result<u32> {
    match u32::try_from(len) {
        Ok(0) => Err(Error::Protocol("Empty frame".into())),
        Ok(n) if n <= MAX_FRAME_SIZE => Ok(n),
        _ => Err(Error::Protocol(format!(
            "Frame of {} bytes exceeds limit of {}",
            len, MAX_FRAME_SIZE
        ))),
    }
}

/// Read one event from the stream
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<PushEvent> {
    let declared = reader.read_u32().await.map_err(closed_on_eof)?;
    let len = check_len(declared as usize)?;

    let mut body = vec![0u8; len as usize];
    reader.read_exact(&mut body).await.map_err(closed_on_eof)?;
    trace!(len, "Frame read");

    PushEvent::from_bytes(&body).map_err(|e| Error::Protocol(format!("Invalid event: {}", e)))
}

/// Write one event to the stream and flush it
pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, event: &PushEvent) -> Result<()> {
    let body = event
        .to_bytes()
        .map_err(|e| Error::Protocol(format!("Cannot encode event: {}", e)))?;
    let len = check_len(body.len())?;

    writer.write_u32(len).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    trace!(len, "Frame written");
    Ok(())
}
