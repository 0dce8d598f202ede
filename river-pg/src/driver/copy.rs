//! COPY protocol support for bulk load/export.
//!
//! All paths here speak COPY text format directly; the AST-native query
//! paths in `mod.rs` build the `COPY ... FROM/TO STDIN/STDOUT` command text
//! and hand the body to these helpers.

use super::{PgConnection, PgError, PgResult, parse_affected_rows};
use crate::protocol::{BackendMessage, PgEncoder};
use bytes::BytesMut;

impl PgConnection {
    /// Bulk insert via COPY, encoding `rows` with the zero-allocation COPY
    /// value encoder and writing the whole batch in one syscall.
    pub(crate) async fn copy_in_fast(
        &mut self,
        table: &str,
        columns: &[String],
        rows: &[Vec<qail_core::ast::Value>],
    ) -> PgResult<u64> {
        use crate::protocol::encode_copy_batch;

        let cols = columns.join(", ");
        let sql = format!("COPY {} ({}) FROM STDIN", table, cols);
        self.send_bytes(&PgEncoder::encode_query_string(&sql)).await?;

        loop {
            match self.recv().await? {
                BackendMessage::CopyInResponse { .. } => break,
                BackendMessage::ErrorResponse(err) => {
                    return Err(PgError::from_error_response(err));
                }
                _ => {}
            }
        }

        let batch_data = encode_copy_batch(rows);
        self.send_copy_data(&batch_data).await?;
        self.send_copy_done().await?;

        let mut affected = 0u64;
        loop {
            match self.recv().await? {
                BackendMessage::CommandComplete(tag) => {
                    affected = parse_affected_rows(&tag);
                }
                BackendMessage::ReadyForQuery(_) => return Ok(affected),
                BackendMessage::ErrorResponse(err) => {
                    return Err(PgError::from_error_response(err));
                }
                _ => {}
            }
        }
    }

    /// Bulk insert via COPY using already-encoded COPY text format bytes.
    pub(crate) async fn copy_in_raw(
        &mut self,
        table: &str,
        columns: &[String],
        data: &[u8],
    ) -> PgResult<u64> {
        let cols = columns.join(", ");
        let sql = format!("COPY {} ({}) FROM STDIN", table, cols);
        self.send_bytes(&PgEncoder::encode_query_string(&sql)).await?;

        loop {
            match self.recv().await? {
                BackendMessage::CopyInResponse { .. } => break,
                BackendMessage::ErrorResponse(err) => {
                    return Err(PgError::from_error_response(err));
                }
                _ => {}
            }
        }

        self.send_copy_data(data).await?;
        self.send_copy_done().await?;

        let mut affected = 0u64;
        loop {
            match self.recv().await? {
                BackendMessage::CommandComplete(tag) => {
                    affected = parse_affected_rows(&tag);
                }
                BackendMessage::ReadyForQuery(_) => return Ok(affected),
                BackendMessage::ErrorResponse(err) => {
                    return Err(PgError::from_error_response(err));
                }
                _ => {}
            }
        }
    }

    /// Export via `COPY ... TO STDOUT`, concatenating the raw COPY text
    /// format bytes the server streams back (no row parsing). The result can
    /// be fed straight into `copy_in_raw`/`copy_bulk_bytes` for table-to-table
    /// transfer without touching individual values.
    pub(crate) async fn copy_out_raw(&mut self, sql: &str) -> PgResult<Vec<u8>> {
        self.send_bytes(&PgEncoder::encode_query_string(sql)).await?;

        loop {
            match self.recv().await? {
                BackendMessage::CopyOutResponse { .. } => break,
                BackendMessage::ErrorResponse(err) => {
                    return Err(PgError::from_error_response(err));
                }
                _ => {}
            }
        }

        let mut out = Vec::new();
        loop {
            match self.recv().await? {
                BackendMessage::CopyData(data) => out.extend_from_slice(&data),
                BackendMessage::CopyDone => {}
                BackendMessage::CommandComplete(_) => {}
                BackendMessage::ReadyForQuery(_) => return Ok(out),
                BackendMessage::ErrorResponse(err) => {
                    return Err(PgError::from_error_response(err));
                }
                _ => {}
            }
        }
    }

    /// Send a `CopyData` message carrying already-formatted COPY text bytes.
    async fn send_copy_data(&mut self, data: &[u8]) -> PgResult<()> {
        let len = (data.len() + 4) as i32;
        let mut buf = BytesMut::with_capacity(1 + 4 + data.len());
        buf.extend_from_slice(b"d");
        buf.extend_from_slice(&len.to_be_bytes());
        buf.extend_from_slice(data);
        self.send_bytes(&buf).await
    }

    /// Send `CopyDone`, ending the COPY-in stream.
    async fn send_copy_done(&mut self) -> PgResult<()> {
        self.send_bytes(&[b'c', 0, 0, 0, 4]).await
    }
}
