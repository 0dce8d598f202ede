//! Simple-Query-mode rendering for command kinds that never carry bind
//! parameters: raw SQL fallback, pub/sub, TRUNCATE, EXPLAIN, LOCK, and
//! materialized-view DDL. These always render literals inline (there is
//! no Bind message in Simple Query) and are dispatched as a single 'Q'
//! frontend message rather than Parse+Bind+Describe+Execute+Sync.

use bytes::BytesMut;
use qail_core::ast::Qail;

/// Double every single quote, matching the Extended-query escaping rule
/// (spec.md ss8: `"it's"` -> `'it''s'`).
fn write_quoted(buf: &mut BytesMut, s: &str) {
    buf.extend_from_slice(b"'");
    for ch in s.chars() {
        if ch == '\'' {
            buf.extend_from_slice(b"''");
        } else {
            let mut tmp = [0u8; 4];
            buf.extend_from_slice(ch.encode_utf8(&mut tmp).as_bytes());
        }
    }
    buf.extend_from_slice(b"'");
}

pub fn encode_raw(cmd: &Qail, buf: &mut BytesMut) {
    buf.extend_from_slice(cmd.raw_sql.as_deref().unwrap_or("").as_bytes());
}

pub fn encode_listen(cmd: &Qail, buf: &mut BytesMut) {
    buf.extend_from_slice(b"LISTEN ");
    buf.extend_from_slice(cmd.channel.as_deref().unwrap_or("").as_bytes());
}

pub fn encode_notify(cmd: &Qail, buf: &mut BytesMut) {
    buf.extend_from_slice(b"NOTIFY ");
    buf.extend_from_slice(cmd.channel.as_deref().unwrap_or("").as_bytes());
    if let Some(payload) = &cmd.payload {
        buf.extend_from_slice(b", ");
        write_quoted(buf, payload);
    }
}

pub fn encode_unlisten(cmd: &Qail, buf: &mut BytesMut) {
    buf.extend_from_slice(b"UNLISTEN ");
    buf.extend_from_slice(cmd.channel.as_deref().unwrap_or("*").as_bytes());
}

pub fn encode_truncate(cmd: &Qail, buf: &mut BytesMut) {
    buf.extend_from_slice(b"TRUNCATE TABLE ");
    if cmd.only_table {
        buf.extend_from_slice(b"ONLY ");
    }
    buf.extend_from_slice(cmd.table.as_bytes());
}

pub fn encode_lock(cmd: &Qail, buf: &mut BytesMut) {
    use qail_core::ast::LockMode;

    buf.extend_from_slice(b"LOCK TABLE ");
    buf.extend_from_slice(cmd.table.as_bytes());
    buf.extend_from_slice(b" IN ");
    buf.extend_from_slice(match cmd.lock_mode {
        Some(LockMode::Update) => b"ROW EXCLUSIVE".as_slice(),
        Some(LockMode::NoKeyUpdate) => b"ROW SHARE".as_slice(),
        Some(LockMode::Share) => b"SHARE".as_slice(),
        Some(LockMode::KeyShare) => b"ACCESS SHARE".as_slice(),
        None => b"ACCESS EXCLUSIVE".as_slice(),
    });
    buf.extend_from_slice(b" MODE");
}

/// Renders `EXPLAIN [ANALYZE] <select>` by reusing the same `cmd` as a
/// SELECT body (table/columns/cages apply exactly as in a plain GET).
pub fn encode_explain(
    cmd: &Qail,
    analyze: bool,
    buf: &mut BytesMut,
) -> Result<(), crate::protocol::EncodeError> {
    use qail_core::ast::Action;

    buf.extend_from_slice(if analyze {
        b"EXPLAIN ANALYZE "
    } else {
        b"EXPLAIN "
    });

    let mut inner = cmd.clone();
    inner.action = Action::Get;
    let mut discard_params = Vec::new();
    super::dml::encode_select(&inner, buf, &mut discard_params)
}

pub fn encode_create_materialized_view(
    cmd: &Qail,
    buf: &mut BytesMut,
) -> Result<(), crate::protocol::EncodeError> {
    use qail_core::ast::Action;

    buf.extend_from_slice(b"CREATE MATERIALIZED VIEW ");
    buf.extend_from_slice(cmd.table.as_bytes());
    buf.extend_from_slice(b" AS ");

    let Some(source) = &cmd.source_query else {
        return Err(crate::protocol::EncodeError::MissingSourceQuery);
    };
    let mut inner = (**source).clone();
    inner.action = Action::Get;
    let mut discard_params = Vec::new();
    super::dml::encode_select(&inner, buf, &mut discard_params)
}

pub fn encode_refresh_materialized_view(cmd: &Qail, buf: &mut BytesMut) {
    buf.extend_from_slice(b"REFRESH MATERIALIZED VIEW ");
    buf.extend_from_slice(cmd.table.as_bytes());
}

pub fn encode_drop_materialized_view(cmd: &Qail, buf: &mut BytesMut) {
    buf.extend_from_slice(b"DROP MATERIALIZED VIEW ");
    buf.extend_from_slice(cmd.table.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use qail_core::ast::Qail;

    #[test]
    fn raw_passes_through_verbatim() {
        let cmd = Qail::raw_sql("VACUUM ANALYZE users");
        let mut buf = BytesMut::new();
        encode_raw(&cmd, &mut buf);
        assert_eq!(&buf[..], b"VACUUM ANALYZE users");
    }

    #[test]
    fn notify_escapes_payload_quotes() {
        let cmd = Qail::notify("updates", "it's ready");
        let mut buf = BytesMut::new();
        encode_notify(&cmd, &mut buf);
        assert_eq!(&buf[..], b"NOTIFY updates, 'it''s ready'");
    }

    #[test]
    fn listen_renders_channel() {
        let cmd = Qail::listen("updates");
        let mut buf = BytesMut::new();
        encode_listen(&cmd, &mut buf);
        assert_eq!(&buf[..], b"LISTEN updates");
    }

    #[test]
    fn unlisten_defaults_to_star() {
        let cmd = Qail {
            action: qail_core::ast::Action::Unlisten,
            ..Default::default()
        };
        let mut buf = BytesMut::new();
        encode_unlisten(&cmd, &mut buf);
        assert_eq!(&buf[..], b"UNLISTEN *");
    }

    #[test]
    fn truncate_renders_table() {
        let cmd = Qail::truncate("events");
        let mut buf = BytesMut::new();
        encode_truncate(&cmd, &mut buf);
        assert_eq!(&buf[..], b"TRUNCATE TABLE events");
    }

    #[test]
    fn explain_wraps_select() {
        let cmd = Qail::get("users").columns(["id"]);
        let mut buf = BytesMut::new();
        encode_explain(&cmd, false, &mut buf).unwrap();
        let sql = String::from_utf8_lossy(&buf);
        assert!(sql.starts_with("EXPLAIN SELECT"));
        assert!(sql.contains("FROM users"));
    }
}
