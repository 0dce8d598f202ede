//! AST-Native Encoder
//!
//! Direct AST → Wire Protocol Bytes conversion.
//! NO INTERMEDIATE SQL STRING!
//!
//! This is the TRUE AST-native path:
//! Qail → BytesMut (no to_sql() call)
//!
//! ## Module Structure
//!
//! - `helpers` - Zero-allocation lookup tables and write functions
//! - `ddl` - CREATE, DROP, ALTER statements
//! - `dml` - SELECT, INSERT, UPDATE, DELETE, EXPORT
//! - `values` - Expression, operator, and value encoding
//! - `batch` - Batch and wire protocol encoding

mod batch;
mod ddl;
pub(crate) mod dml;
mod helpers;
mod simple;
mod values;

use bytes::BytesMut;
use qail_core::ast::{Action, Qail};

/// Command kinds that never bind parameters and always travel as a single
/// Simple Query ('Q') message: pub/sub, raw SQL fallback, TRUNCATE, LOCK,
/// EXPLAIN, and materialized-view DDL (spec.md ss4.2).
pub(super) fn is_simple_query_action(action: Action) -> bool {
    matches!(
        action,
        Action::Raw
            | Action::Listen
            | Action::Notify
            | Action::Unlisten
            | Action::Truncate
            | Action::Lock
            | Action::Explain
            | Action::ExplainAnalyze
            | Action::CreateMaterializedView
            | Action::RefreshMaterializedView
            | Action::DropMaterializedView
    )
}

/// Render the SQL text for a Simple-Query-only command kind. Returns
/// `false` (leaving `buf` as-is) for anything `is_simple_query_action`
/// doesn't recognize, so callers can fall through to a different path.
pub(super) fn encode_simple_query_sql(cmd: &Qail, buf: &mut BytesMut) -> bool {
    match cmd.action {
        Action::Raw => simple::encode_raw(cmd, buf),
        Action::Listen => simple::encode_listen(cmd, buf),
        Action::Notify => simple::encode_notify(cmd, buf),
        Action::Unlisten => simple::encode_unlisten(cmd, buf),
        Action::Truncate => simple::encode_truncate(cmd, buf),
        Action::Lock => simple::encode_lock(cmd, buf),
        Action::Explain => { simple::encode_explain(cmd, false, buf).ok(); }
        Action::ExplainAnalyze => { simple::encode_explain(cmd, true, buf).ok(); }
        Action::CreateMaterializedView => { simple::encode_create_materialized_view(cmd, buf).ok(); }
        Action::RefreshMaterializedView => simple::encode_refresh_materialized_view(cmd, buf),
        Action::DropMaterializedView => simple::encode_drop_materialized_view(cmd, buf),
        _ => return false,
    }
    true
}

/// AST-native encoder that skips SQL string generation.
pub struct AstEncoder;

impl AstEncoder {
    /// Encode a Qail directly to Extended Query protocol bytes.
    ///
    /// Returns (wire_bytes, extracted_params_as_bytes)
    pub fn encode_cmd(cmd: &Qail) -> (BytesMut, Vec<Option<Vec<u8>>>) {
        let mut sql_buf = BytesMut::with_capacity(256);
        let mut params: Vec<Option<Vec<u8>>> = Vec::new();

        if is_simple_query_action(cmd.action) {
            encode_simple_query_sql(cmd, &mut sql_buf);
            return (batch::build_simple_query(&sql_buf), params);
        }

        match cmd.action {
            Action::Get | Action::With => { dml::encode_select(cmd, &mut sql_buf, &mut params).ok(); }
            Action::Add | Action::Put => { dml::encode_insert(cmd, &mut sql_buf, &mut params).ok(); }
            Action::Set => { dml::encode_update(cmd, &mut sql_buf, &mut params).ok(); }
            Action::Del => { dml::encode_delete(cmd, &mut sql_buf, &mut params).ok(); }
            Action::Export => { dml::encode_export(cmd, &mut sql_buf, &mut params).ok(); }
            Action::Make => ddl::encode_make(cmd, &mut sql_buf),
            Action::Index => ddl::encode_index(cmd, &mut sql_buf),
            Action::Drop => ddl::encode_drop_table(cmd, &mut sql_buf),
            Action::DropIndex => ddl::encode_drop_index(cmd, &mut sql_buf),
            Action::Alter => ddl::encode_alter_add_column(cmd, &mut sql_buf),
            Action::AlterDrop => ddl::encode_alter_drop_column(cmd, &mut sql_buf),
            Action::AlterType => ddl::encode_alter_column_type(cmd, &mut sql_buf),
            Action::Mod => ddl::encode_rename_column(cmd, &mut sql_buf),
            Action::CreateView => ddl::encode_create_view(cmd, &mut sql_buf, &mut params),
            Action::DropView => ddl::encode_drop_view(cmd, &mut sql_buf),
            _ => panic!(
                "Unsupported action {:?} in AST-native encoder. Use legacy encoder for DDL.",
                cmd.action
            ),
        }

        let sql_bytes = sql_buf.freeze();
        let wire = batch::build_extended_query(&sql_bytes, &params).unwrap_or_else(|_| BytesMut::new());

        (wire, params)
    }

    /// Encode a Qail directly to Extended Query protocol bytes, reusing
    /// caller-provided scratch buffers instead of allocating fresh ones.
    /// `sql_buf`/`params_buf` are cleared on entry; the returned `BytesMut`
    /// is the wire-ready Parse+Bind+Describe+Execute+Sync sequence, and
    /// `params_buf` is left holding the extracted bind parameters.
    ///
    /// Simple-Query-only command kinds (pub/sub, raw SQL, TRUNCATE, LOCK,
    /// EXPLAIN, materialized views) instead return a single 'Q' message
    /// and leave `params_buf` empty.
    pub fn encode_cmd_reuse(
        cmd: &Qail,
        sql_buf: &mut BytesMut,
        params_buf: &mut Vec<Option<Vec<u8>>>,
    ) -> BytesMut {
        sql_buf.clear();
        params_buf.clear();

        if is_simple_query_action(cmd.action) {
            encode_simple_query_sql(cmd, sql_buf);
            return batch::build_simple_query(sql_buf);
        }

        match cmd.action {
            Action::Get | Action::With => { dml::encode_select(cmd, sql_buf, params_buf).ok(); }
            Action::Add | Action::Put => { dml::encode_insert(cmd, sql_buf, params_buf).ok(); }
            Action::Set => { dml::encode_update(cmd, sql_buf, params_buf).ok(); }
            Action::Del => { dml::encode_delete(cmd, sql_buf, params_buf).ok(); }
            Action::Export => { dml::encode_export(cmd, sql_buf, params_buf).ok(); }
            Action::Make => ddl::encode_make(cmd, sql_buf),
            Action::Index => ddl::encode_index(cmd, sql_buf),
            Action::Drop => ddl::encode_drop_table(cmd, sql_buf),
            Action::DropIndex => ddl::encode_drop_index(cmd, sql_buf),
            Action::Alter => ddl::encode_alter_add_column(cmd, sql_buf),
            Action::AlterDrop => ddl::encode_alter_drop_column(cmd, sql_buf),
            Action::AlterType => ddl::encode_alter_column_type(cmd, sql_buf),
            Action::Mod => ddl::encode_rename_column(cmd, sql_buf),
            Action::CreateView => ddl::encode_create_view(cmd, sql_buf, params_buf),
            Action::DropView => ddl::encode_drop_view(cmd, sql_buf),
            _ => panic!(
                "Unsupported action {:?} in AST-native encoder. Use legacy encoder for DDL.",
                cmd.action
            ),
        }

        batch::build_extended_query(sql_buf, params_buf).unwrap_or_else(|_| BytesMut::new())
    }

    /// Encode a Qail to SQL string + params (for prepared statement caching).
    pub fn encode_cmd_sql(cmd: &Qail) -> (String, Vec<Option<Vec<u8>>>) {
        let mut sql_buf = BytesMut::with_capacity(256);
        let mut params: Vec<Option<Vec<u8>>> = Vec::new();

        if is_simple_query_action(cmd.action) {
            encode_simple_query_sql(cmd, &mut sql_buf);
            return (String::from_utf8_lossy(&sql_buf).to_string(), params);
        }

        match cmd.action {
            Action::Get | Action::With => { dml::encode_select(cmd, &mut sql_buf, &mut params).ok(); }
            Action::Add | Action::Put => { dml::encode_insert(cmd, &mut sql_buf, &mut params).ok(); }
            Action::Set => { dml::encode_update(cmd, &mut sql_buf, &mut params).ok(); }
            Action::Del => { dml::encode_delete(cmd, &mut sql_buf, &mut params).ok(); }
            Action::Export => { dml::encode_export(cmd, &mut sql_buf, &mut params).ok(); }
            Action::Make => ddl::encode_make(cmd, &mut sql_buf),
            Action::Index => ddl::encode_index(cmd, &mut sql_buf),
            _ => panic!("Unsupported action {:?} in AST-native encoder.", cmd.action),
        }

        let sql = String::from_utf8_lossy(&sql_buf).to_string();
        (sql, params)
    }

    /// Extract ONLY params from a Qail (for reusing cached SQL template).
    #[inline]
    pub fn encode_cmd_params_only(cmd: &Qail) -> Vec<Option<Vec<u8>>> {
        let mut sql_buf = BytesMut::with_capacity(256);
        let mut params: Vec<Option<Vec<u8>>> = Vec::new();

        match cmd.action {
            Action::Get => { dml::encode_select(cmd, &mut sql_buf, &mut params).ok(); }
            Action::Add | Action::Put => { dml::encode_insert(cmd, &mut sql_buf, &mut params).ok(); }
            Action::Set => { dml::encode_update(cmd, &mut sql_buf, &mut params).ok(); }
            Action::Del => { dml::encode_delete(cmd, &mut sql_buf, &mut params).ok(); }
            _ => {}
        }

        params
    }

    /// Generate just SQL bytes for a SELECT statement.
    pub fn encode_select_sql(
        cmd: &Qail,
        buf: &mut BytesMut,
        params: &mut Vec<Option<Vec<u8>>>,
    ) {
        dml::encode_select(cmd, buf, params).ok();
    }

    /// Encode multiple Qails as a pipeline batch.
    pub fn encode_batch(cmds: &[Qail]) -> BytesMut {
        batch::encode_batch(cmds)
    }

    /// Encode multiple Qails using Simple Query Protocol.
    #[inline]
    pub fn encode_batch_simple(cmds: &[Qail]) -> BytesMut {
        batch::encode_batch_simple(cmds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_select() {
        let cmd = Qail::get("users").columns(["id", "name"]);

        let (wire, params) = AstEncoder::encode_cmd(&cmd);

        let wire_str = String::from_utf8_lossy(&wire);
        assert!(wire_str.contains("SELECT"));
        assert!(wire_str.contains("users"));
        assert!(params.is_empty());
    }

    #[test]
    fn test_encode_select_with_filter() {
        use qail_core::ast::Operator;

        let cmd = Qail::get("users")
            .columns(["id", "name"])
            .filter("active", Operator::Eq, true);

        let (wire, params) = AstEncoder::encode_cmd(&cmd);

        let wire_str = String::from_utf8_lossy(&wire);
        assert!(wire_str.contains("WHERE"));
        assert!(wire_str.contains("$1"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_encode_export() {
        let cmd = Qail::export("users").columns(["id", "name"]);

        let (sql, _params) = AstEncoder::encode_cmd_sql(&cmd);

        assert!(sql.starts_with("COPY (SELECT"));
        assert!(sql.contains("FROM users"));
        assert!(sql.ends_with(") TO STDOUT"));
    }

    #[test]
    fn test_encode_export_with_filter() {
        use qail_core::ast::Operator;

        let cmd = Qail::export("users")
            .columns(["id", "name"])
            .filter("active", Operator::Eq, true);

        let (sql, params) = AstEncoder::encode_cmd_sql(&cmd);

        assert!(sql.contains("COPY (SELECT"));
        assert!(sql.contains("WHERE"));
        assert!(sql.contains("$1"));
        assert!(sql.ends_with(") TO STDOUT"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_encode_cte_single() {
        use qail_core::ast::Operator;

        let users_query = Qail::get("users")
            .columns(["id", "name"])
            .filter("active", Operator::Eq, true);

        let cmd = Qail::get("active_users").with("active_users", users_query);

        let (sql, params) = AstEncoder::encode_cmd_sql(&cmd);

        assert!(sql.starts_with("WITH active_users"), "SQL should start with WITH: {}", sql);
        assert!(sql.contains("AS (SELECT id, name FROM users"), "CTE should have subquery: {}", sql);
        assert!(sql.contains("FROM active_users"), "SQL should select from CTE: {}", sql);
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_encode_cte_multiple() {
        let users = Qail::get("users").columns(["id", "name"]);
        let orders = Qail::get("orders").columns(["id", "user_id", "total"]);

        let cmd = Qail::get("summary")
            .with("active_users", users)
            .with("recent_orders", orders);

        let (sql, _) = AstEncoder::encode_cmd_sql(&cmd);

        assert!(sql.contains("active_users"), "SQL should have first CTE: {}", sql);
        assert!(sql.contains("recent_orders"), "SQL should have second CTE: {}", sql);
        assert!(sql.starts_with("WITH"), "SQL should start with WITH: {}", sql);
    }

    #[test]
    fn test_encode_raw_sql_dispatches_as_simple_query() {
        let cmd = Qail::raw_sql("VACUUM users");
        let (wire, params) = AstEncoder::encode_cmd(&cmd);

        assert_eq!(wire[0], b'Q');
        assert!(params.is_empty());
        let body = String::from_utf8_lossy(&wire[5..]);
        assert!(body.starts_with("VACUUM users"));
    }

    #[test]
    fn test_encode_truncate_dispatches_as_simple_query() {
        let cmd = Qail::truncate("sessions");
        let (wire, _) = AstEncoder::encode_cmd(&cmd);

        assert_eq!(wire[0], b'Q');
        let body = String::from_utf8_lossy(&wire[5..]);
        assert!(body.starts_with("TRUNCATE TABLE sessions"));
    }

    #[test]
    fn test_encode_notify_dispatches_as_simple_query() {
        let cmd = Qail::notify("orders", "42");
        let (wire, _) = AstEncoder::encode_cmd(&cmd);

        assert_eq!(wire[0], b'Q');
        let body = String::from_utf8_lossy(&wire[5..]);
        assert!(body.starts_with("NOTIFY orders, '42'"));
    }

    #[test]
    fn test_encode_cmd_reuse_handles_simple_query_actions() {
        let mut sql_buf = BytesMut::new();
        let mut params_buf = Vec::new();
        let cmd = Qail::unlisten("orders");

        let wire = AstEncoder::encode_cmd_reuse(&cmd, &mut sql_buf, &mut params_buf);

        assert_eq!(wire[0], b'Q');
        assert!(params_buf.is_empty());
        assert_eq!(&sql_buf[..], b"UNLISTEN orders");
    }

    #[test]
    fn test_encode_put_dispatches_as_upsert_insert() {
        let cmd = Qail::put("users")
            .set_value("id", 1)
            .set_value("name", "Alice")
            .on_conflict_update(&["id"], &[("name", qail_core::ast::Expr::Named("EXCLUDED.name".to_string()))]);

        let (wire, params) = AstEncoder::encode_cmd(&cmd);

        assert_eq!(wire[0], b'P', "PUT should use Extended Query, not Simple Query");
        let wire_str = String::from_utf8_lossy(&wire);
        assert!(wire_str.contains("INSERT INTO users"));
        assert!(wire_str.contains("ON CONFLICT"));
        assert_eq!(params.len(), 2);
    }
}
