//! Low-level send/receive primitives shared by every higher-level driver
//! operation (startup, query, pipeline). Everything above this layer reads
//! and writes `FrontendMessage`/`BackendMessage` values or raw bytes through
//! the methods here; nothing else touches `self.stream` directly except the
//! handful of ultra-fast pipeline paths that skip message parsing entirely.

use super::{PgConnection, PgError, PgResult};
use crate::protocol::{BackendMessage, FrontendMessage};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Grow the read buffer by this much whenever headroom drops below it, so a
/// large result set doesn't force a `reserve` call per `read_buf`.
const READ_LOW_WATER: usize = 65536;
const READ_GROW: usize = 131072;

impl PgConnection {
    /// Encode and send one frontend message immediately.
    pub async fn send(&mut self, msg: FrontendMessage) -> PgResult<()> {
        let bytes = msg.encode();
        self.stream
            .write_all(&bytes)
            .await
            .map_err(PgError::WriteFailed)?;
        Ok(())
    }

    /// Receive and fully decode the next backend message, blocking until a
    /// complete frame is buffered.
    pub async fn recv(&mut self) -> PgResult<BackendMessage> {
        loop {
            if let Some(msg_len) = self.buffered_msg_len() {
                if self.buffer.len() > msg_len {
                    let msg_bytes = self.buffer.split_to(msg_len + 1);
                    let (msg, _) =
                        BackendMessage::decode(&msg_bytes).map_err(PgError::InvalidMessage)?;
                    return Ok(msg);
                }
            }
            self.fill_buffer().await?;
        }
    }

    /// Write raw already-encoded bytes and flush immediately. Used on the
    /// AST-native fast paths that build their own wire bytes without going
    /// through `FrontendMessage`.
    pub async fn send_bytes(&mut self, bytes: &[u8]) -> PgResult<()> {
        self.stream
            .write_all(bytes)
            .await
            .map_err(PgError::WriteFailed)?;
        self.stream.flush().await.map_err(PgError::WriteFailed)?;
        Ok(())
    }

    /// Append bytes to the write buffer without a syscall; pairs with
    /// `flush_write_buf` to coalesce several messages into one `write_all`.
    #[inline]
    pub fn buffer_bytes(&mut self, bytes: &[u8]) {
        self.write_buf.extend_from_slice(bytes);
    }

    /// Flush any bytes queued by `buffer_bytes`.
    pub async fn flush_write_buf(&mut self) -> PgResult<()> {
        if !self.write_buf.is_empty() {
            self.stream
                .write_all(&self.write_buf)
                .await
                .map_err(PgError::WriteFailed)?;
            self.write_buf.clear();
        }
        Ok(())
    }

    /// Receive the next message but return only its type byte, discarding
    /// the payload without decoding it. Used by pipelining when the caller
    /// only needs to count/confirm responses (e.g. `ParseComplete`,
    /// `BindComplete`) rather than inspect their contents.
    #[inline]
    pub(crate) async fn recv_msg_type_fast(&mut self) -> PgResult<u8> {
        loop {
            if let Some(msg_len) = self.buffered_msg_len() {
                if self.buffer.len() > msg_len {
                    let msg_type = self.buffer[0];
                    if msg_type == b'E' {
                        return Err(self.take_error_response(msg_len));
                    }
                    let _ = self.buffer.split_to(msg_len + 1);
                    return Ok(msg_type);
                }
            }
            self.fill_buffer().await?;
        }
    }

    /// Receive the next message, parsing `DataRow` columns inline and
    /// skipping everything else. Avoids constructing a `BackendMessage` for
    /// the common row-streaming case.
    #[inline]
    pub(crate) async fn recv_with_data_fast(
        &mut self,
    ) -> PgResult<(u8, Option<Vec<Option<Vec<u8>>>>)> {
        loop {
            if let Some(msg_len) = self.buffered_msg_len() {
                if self.buffer.len() > msg_len {
                    let msg_type = self.buffer[0];
                    if msg_type == b'E' {
                        return Err(self.take_error_response(msg_len));
                    }

                    if msg_type == b'D' {
                        let payload = &self.buffer[5..msg_len + 1];
                        if payload.len() >= 2 {
                            let column_count =
                                u16::from_be_bytes([payload[0], payload[1]]) as usize;
                            let mut columns = Vec::with_capacity(column_count);
                            let mut pos = 2;

                            for _ in 0..column_count {
                                if pos + 4 > payload.len() {
                                    break;
                                }
                                let len = i32::from_be_bytes([
                                    payload[pos],
                                    payload[pos + 1],
                                    payload[pos + 2],
                                    payload[pos + 3],
                                ]);
                                pos += 4;

                                if len == -1 {
                                    columns.push(None);
                                } else {
                                    let len = len as usize;
                                    if pos + len <= payload.len() {
                                        columns.push(Some(payload[pos..pos + len].to_vec()));
                                        pos += len;
                                    }
                                }
                            }

                            let _ = self.buffer.split_to(msg_len + 1);
                            return Ok((msg_type, Some(columns)));
                        }
                    }

                    let _ = self.buffer.split_to(msg_len + 1);
                    return Ok((msg_type, None));
                }
            }
            self.fill_buffer().await?;
        }
    }

    /// Receive the next message, slicing `DataRow` columns as reference
    /// counted `Bytes` instead of copying into owned `Vec`s.
    #[inline]
    pub(crate) async fn recv_data_zerocopy(
        &mut self,
    ) -> PgResult<(u8, Option<Vec<Option<bytes::Bytes>>>)> {
        use bytes::Buf;

        loop {
            if let Some(msg_len) = self.buffered_msg_len() {
                if self.buffer.len() > msg_len {
                    let msg_type = self.buffer[0];
                    if msg_type == b'E' {
                        return Err(self.take_error_response(msg_len));
                    }

                    if msg_type == b'D' {
                        let mut msg_bytes = self.buffer.split_to(msg_len + 1);
                        msg_bytes.advance(5);

                        if msg_bytes.len() >= 2 {
                            let column_count = msg_bytes.get_u16() as usize;
                            let mut columns = Vec::with_capacity(column_count);

                            for _ in 0..column_count {
                                if msg_bytes.remaining() < 4 {
                                    break;
                                }
                                let len = msg_bytes.get_i32();
                                if len == -1 {
                                    columns.push(None);
                                } else {
                                    let len = len as usize;
                                    if msg_bytes.remaining() >= len {
                                        columns.push(Some(msg_bytes.split_to(len).freeze()));
                                    }
                                }
                            }

                            return Ok((msg_type, Some(columns)));
                        }
                        return Ok((msg_type, None));
                    }

                    let _ = self.buffer.split_to(msg_len + 1);
                    return Ok((msg_type, None));
                }
            }
            self.fill_buffer().await?;
        }
    }

    /// Receive the next message, specialized for a two-column `DataRow`
    /// shape (the common `id, name`-style projection) to avoid a `Vec`
    /// allocation per row.
    #[inline(always)]
    pub(crate) async fn recv_data_ultra(
        &mut self,
    ) -> PgResult<(u8, Option<(bytes::Bytes, bytes::Bytes)>)> {
        use bytes::Buf;

        loop {
            if let Some(msg_len) = self.buffered_msg_len() {
                if self.buffer.len() > msg_len {
                    let msg_type = self.buffer[0];
                    if msg_type == b'E' {
                        return Err(self.take_error_response(msg_len));
                    }

                    if msg_type == b'D' {
                        let mut msg_bytes = self.buffer.split_to(msg_len + 1);
                        msg_bytes.advance(5);

                        let _col_count = msg_bytes.get_u16();

                        let len0 = msg_bytes.get_i32();
                        let col0 = if len0 > 0 {
                            msg_bytes.split_to(len0 as usize).freeze()
                        } else {
                            bytes::Bytes::new()
                        };

                        let len1 = msg_bytes.get_i32();
                        let col1 = if len1 > 0 {
                            msg_bytes.split_to(len1 as usize).freeze()
                        } else {
                            bytes::Bytes::new()
                        };

                        return Ok((msg_type, Some((col0, col1))));
                    }

                    let _ = self.buffer.split_to(msg_len + 1);
                    return Ok((msg_type, None));
                }
            }
            self.fill_buffer().await?;
        }
    }

    /// Length of the message at the front of the buffer (excluding the type
    /// byte), if the 5-byte header has arrived yet.
    #[inline]
    fn buffered_msg_len(&self) -> Option<usize> {
        if self.buffer.len() < 5 {
            return None;
        }
        Some(u32::from_be_bytes([
            self.buffer[1],
            self.buffer[2],
            self.buffer[3],
            self.buffer[4],
        ]) as usize)
    }

    /// Decode and consume a complete `ErrorResponse` already known to be
    /// sitting at the front of the buffer, returning it as a `PgError`.
    fn take_error_response(&mut self, msg_len: usize) -> PgError {
        let msg_bytes = self.buffer.split_to(msg_len + 1);
        match BackendMessage::decode(&msg_bytes) {
            Ok((BackendMessage::ErrorResponse(err), _)) => PgError::from_error_response(err),
            Ok(_) => PgError::InvalidMessage("expected ErrorResponse".to_string()),
            Err(e) => PgError::InvalidMessage(e),
        }
    }

    /// Top up the read buffer with at least one more `read` syscall's worth
    /// of bytes, growing capacity first if headroom is low. Returns an error
    /// if the peer closed the connection.
    async fn fill_buffer(&mut self) -> PgResult<()> {
        if self.buffer.capacity() - self.buffer.len() < READ_LOW_WATER {
            self.buffer.reserve(READ_GROW);
        }
        let n = self
            .stream
            .read_buf(&mut self.buffer)
            .await
            .map_err(PgError::ReadFailed)?;
        if n == 0 {
            return Err(PgError::ConnectionClosed);
        }
        Ok(())
    }
}
