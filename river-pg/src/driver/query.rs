//! Query execution methods shared by the cursor, transaction-control, and
//! AST pipeline paths: raw binary-parameter queries and the hashed
//! prepared-statement cache that backs `query_cached`.

use super::{PgConnection, PgError, PgResult};
use crate::protocol::{BackendMessage, PgEncoder};
use bytes::BytesMut;

impl PgConnection {
    /// Execute a query with binary parameters via the Extended Query
    /// Protocol (Parse/Bind/Execute/Sync), unnamed statement.
    pub(crate) async fn query(
        &mut self,
        sql: &str,
        params: &[Option<Vec<u8>>],
    ) -> PgResult<Vec<Vec<Option<Vec<u8>>>>> {
        let bytes = PgEncoder::encode_extended_query(sql, params).map_err(PgError::Encode)?;
        self.send_bytes(&bytes).await?;

        let mut rows = Vec::new();
        loop {
            match self.recv().await? {
                BackendMessage::ParseComplete => {}
                BackendMessage::BindComplete => {}
                BackendMessage::RowDescription(_) => {}
                BackendMessage::DataRow(data) => rows.push(data),
                BackendMessage::CommandComplete(_) => {}
                BackendMessage::NoData => {}
                BackendMessage::ReadyForQuery(_) => return Ok(rows),
                BackendMessage::ErrorResponse(err) => {
                    return Err(PgError::from_error_response(err));
                }
                _ => {}
            }
        }
    }

    /// Execute a query reusing a prepared statement named by a hash of the
    /// SQL text, parsing it once and binding on every subsequent call.
    pub async fn query_cached(
        &mut self,
        sql: &str,
        params: &[Option<Vec<u8>>],
    ) -> PgResult<Vec<Vec<Option<Vec<u8>>>>> {
        let stmt_name = Self::sql_to_stmt_name(sql);
        let is_new = !self.prepared_statements.contains_key(&stmt_name);

        let params_size: usize = params
            .iter()
            .map(|p| 4 + p.as_ref().map_or(0, |v| v.len()))
            .sum();
        let estimated_size = if is_new {
            50 + sql.len() + stmt_name.len() * 2 + params_size
        } else {
            30 + stmt_name.len() + params_size
        };

        let mut buf = BytesMut::with_capacity(estimated_size);

        if is_new {
            buf.extend(PgEncoder::encode_parse(&stmt_name, sql, &[]));
            self.prepared_statements
                .insert(stmt_name.clone(), sql.to_string());
        }

        PgEncoder::encode_bind_to(&mut buf, &stmt_name, params).map_err(PgError::Encode)?;
        PgEncoder::encode_execute_to(&mut buf);
        PgEncoder::encode_sync_to(&mut buf);

        self.send_bytes(&buf).await?;

        let mut rows = Vec::new();
        loop {
            match self.recv().await? {
                BackendMessage::ParseComplete => {}
                BackendMessage::BindComplete => {}
                BackendMessage::RowDescription(_) => {}
                BackendMessage::DataRow(data) => rows.push(data),
                BackendMessage::CommandComplete(_) => {}
                BackendMessage::NoData => {}
                BackendMessage::ReadyForQuery(_) => return Ok(rows),
                BackendMessage::ErrorResponse(err) => {
                    return Err(PgError::from_error_response(err));
                }
                _ => {}
            }
        }
    }

    /// Derive a deterministic statement name from a hash of the SQL text,
    /// so byte-identical SQL always maps to the same cached statement.
    pub(crate) fn sql_to_stmt_name(sql: &str) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        sql.hash(&mut hasher);
        format!("s{:016x}", hasher.finish())
    }
}
