use kbrow::core::binary;
use kbrow::core::broker::{self, DbBroker};
use kbrow::core::catalog::{self, AMPMOD_KBCIT, BOX_SMOOTH, NNSA_AMP_DESCRIPT, TABDESCRIPT};
use kbrow::core::db;
use kbrow::core::error::KbError;
use kbrow::core::files;
use kbrow::core::row::Row;
use kbrow::core::sql::{self, Dialect};
use kbrow::core::text::{self, Delimiter, TextOptions};
use kbrow::core::time;
use kbrow::core::value::Value;
use rusqlite::Connection;
use std::fs;
use tempfile::tempdir;

fn kbcit(descript: &str) -> Row {
    let mut row = Row::new(&AMPMOD_KBCIT);
    row.set_int("ampmodid", 5)
        .unwrap()
        .set_int("kbcitid", 12)
        .unwrap()
        .set_text("krigsetname", "lg_q0_set")
        .unwrap()
        .set_text("descript", descript)
        .unwrap()
        .set_float("gtfilter_km", 25.0)
        .unwrap();
    row
}

#[test]
fn full_width_row_survives_every_form() {
    let descript = "d".repeat(1024);
    let row = kbcit(&descript);
    let opts = TextOptions::default();
    let order = AMPMOD_KBCIT.default_order();

    let line = text::render_line(&row, &order, &opts);
    assert!(line.contains("2.500000000000000e+01"), "{line}");
    assert_eq!(text::parse_line(&AMPMOD_KBCIT, &order, &line, &opts).unwrap(), row);

    let bytes = binary::encode(&row);
    assert_eq!(binary::decode(&AMPMOD_KBCIT, &mut bytes.as_slice()).unwrap(), row);

    let conn = db::db_connect(":memory:").unwrap();
    db::create_table(&conn, &AMPMOD_KBCIT, "ampmod_kbcit", true, true).unwrap();
    db::write_rows(&conn, "ampmod_kbcit", &[row.clone()], time::lddate_now(), true).unwrap();
    let back = db::read_rows(
        &conn,
        &AMPMOD_KBCIT,
        &sql::select_all(&AMPMOD_KBCIT, "ampmod_kbcit"),
        0,
    )
    .unwrap();
    assert_eq!(back, vec![row.clone()]);
    assert_eq!(back[0].content_hash(), row.content_hash());

    assert!(row.clone().set_text("descript", "d".repeat(1025)).is_err());
}

#[test]
fn header_order_does_not_leak_into_later_reads() {
    let dir = tempdir().unwrap();
    let reordered = dir.path().join("reordered.txt");
    fs::write(&reordered, "#hwide auth smooid midtype\n1.5 kb 3 mean\n").unwrap();
    let plain = dir.path().join("plain.txt");
    fs::write(&plain, "4 mode 0.25 kb 11\n").unwrap();

    let opts = TextOptions::default();
    let first = files::read_file(&reordered, &BOX_SMOOTH, None, &opts).unwrap();
    assert_eq!(first[0].get_int("smooid").unwrap(), 3);
    assert_eq!(first[0].get_float("hwide").unwrap(), 1.5);

    let second = files::read_file(&plain, &BOX_SMOOTH, None, &opts).unwrap();
    assert_eq!(second[0].get_int("smooid").unwrap(), 4);
    assert_eq!(second[0].get_int("commid").unwrap(), 11);
}

#[test]
fn text_file_write_then_read_with_tab_delimiter() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out/descript.txt");
    let mut row = Row::new(&TABDESCRIPT);
    row.set_text("table_name", "box_smooth")
        .unwrap()
        .set_text("descript", "Boxcar smoothing, per station")
        .unwrap()
        .set_text("schema_name", catalog::SCHEMA_NAME)
        .unwrap()
        .set_text("auth", "kb")
        .unwrap();
    let opts = TextOptions {
        delimiter: Delimiter::Char('\t'),
        exact_floats: false,
    };
    let order = TABDESCRIPT.default_order();
    files::write_file(&path, &TABDESCRIPT, &[row.clone(), row.clone()], &order, &opts, true).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("#table_name\tdescript\tschema_name\tauth\n"));

    let rows = files::read_file(&path, &TABDESCRIPT, None, &opts).unwrap();
    assert_eq!(rows, vec![row.clone(), row]);
}

#[test]
fn binary_file_round_trip_and_truncation() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("amp.bin");
    let mut a = Row::new(&NNSA_AMP_DESCRIPT);
    a.set_int("windowid", 1)
        .unwrap()
        .set_text("sta", "ABKT")
        .unwrap()
        .set_text("chan", "BHZ")
        .unwrap()
        .set_text("phase", "Lg")
        .unwrap()
        .set_float("start_time", 1_234_567_890.12345)
        .unwrap();
    let mut b = a.clone();
    b.set_int("windowid", 2).unwrap();
    files::write_binary_file(&path, &[a.clone(), b.clone()]).unwrap();
    assert_eq!(files::read_binary_file(&path, &NNSA_AMP_DESCRIPT).unwrap(), vec![a, b]);

    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() - 1]).unwrap();
    assert!(matches!(
        files::read_binary_file(&path, &NNSA_AMP_DESCRIPT),
        Err(KbError::ParseError(_))
    ));
}

#[test]
fn reads_honor_a_column_offset() {
    let conn = Connection::open_in_memory().unwrap();
    db::create_table(&conn, &BOX_SMOOTH, "box_smooth", true, true).unwrap();
    let mut row = Row::new(&BOX_SMOOTH);
    row.set_int("smooid", 9)
        .unwrap()
        .set_text("midtype", "mean")
        .unwrap()
        .set_float("hwide", 0.75)
        .unwrap();
    db::write_rows(&conn, "box_smooth", &[row.clone()], time::lddate_now(), true).unwrap();

    let select = format!(
        "SELECT 'extra', 42, {} FROM box_smooth",
        BOX_SMOOTH.column_names().join(", ")
    );
    let rows = db::read_rows(&conn, &BOX_SMOOTH, &select, 2).unwrap();
    assert_eq!(rows, vec![row]);
}

#[test]
fn uncommitted_writes_join_the_callers_transaction() {
    let conn = Connection::open_in_memory().unwrap();
    db::create_table(&conn, &BOX_SMOOTH, "box_smooth", true, false).unwrap();
    let mut row = Row::new(&BOX_SMOOTH);
    row.set_int("smooid", 1).unwrap();

    let tx = conn.unchecked_transaction().unwrap();
    db::write_rows(&conn, "box_smooth", &[row], time::lddate_now(), false).unwrap();
    tx.rollback().unwrap();

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM box_smooth", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn database_errors_carry_the_statement() {
    let conn = Connection::open_in_memory().unwrap();
    let mut row = Row::new(&BOX_SMOOTH);
    row.set_int("smooid", 1).unwrap();
    let err = db::write_rows(&conn, "no_such_table", &[row], time::lddate_now(), true).unwrap_err();
    match err {
        KbError::DatabaseError { statement, .. } => {
            assert!(statement.contains("INSERT INTO no_such_table"), "{statement}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn generic_ddl_names_constraints_after_the_bare_table() {
    let script = sql::create_table_script(&AMPMOD_KBCIT, "kbowner.ampmod_kbcit", Dialect::Generic, true, true);
    assert!(script.iter().any(|s| s.contains("CONSTRAINT ampmod_kbcit_pk PRIMARY KEY (ampmodid, kbcitid)")));
    assert!(!script.iter().any(|s| s.contains("_uk")));
    assert_eq!(script.last().unwrap(), "GRANT SELECT ON kbowner.ampmod_kbcit TO PUBLIC");
}

#[test]
fn broker_audits_database_operations() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("kb.db");
    let log = dir.path().join("kbrow.events.jsonl");
    let broker = DbBroker::new(Some(log.clone()), "integration");

    let rows = vec![kbcit("first"), {
        let mut r = kbcit("second");
        r.set_int("kbcitid", 13).unwrap();
        r
    }];
    let written = broker
        .with_conn(&db_path, "load", "ampmod_kbcit", |conn| {
            db::create_table(conn, &AMPMOD_KBCIT, "ampmod_kbcit", true, true)?;
            db::write_rows(conn, "ampmod_kbcit", &rows, time::lddate_now(), true)
        })
        .unwrap();
    assert_eq!(written, 2);

    let select = sql::select_all(&AMPMOD_KBCIT, "ampmod_kbcit");
    let back = broker
        .with_conn(&db_path, "dump", "ampmod_kbcit", |conn| {
            db::read_rows(conn, &AMPMOD_KBCIT, &select, 0)
        })
        .unwrap();
    assert_eq!(back, rows);

    let events = broker::read_events(&log).unwrap();
    let summary: Vec<(&str, usize, &str)> = events
        .iter()
        .map(|e| (e.op.as_str(), e.rows, e.status.as_str()))
        .collect();
    assert_eq!(summary, vec![("load", 2, "success"), ("dump", 2, "success")]);
    assert!(events.iter().all(|e| e.table == "ampmod_kbcit" && e.actor == "integration"));
}

#[test]
fn positional_values_include_lddate() {
    let row = kbcit("x");
    let lddate = time::lddate_now();
    let values = row.values_with_lddate(lddate);
    assert_eq!(values[0], Value::Integer(5));
    assert_eq!(values.last(), Some(&Value::Timestamp(lddate)));
    assert_eq!(values.len(), AMPMOD_KBCIT.len() + 1);
}

#[test]
fn every_catalog_table_accepts_its_own_na_row() {
    for schema in catalog::all() {
        let row = Row::new(schema);
        let bytes = binary::encode(&row);
        assert!(bytes.len() <= schema.max_bytes(), "{}", schema.name);
        assert_eq!(binary::decode(schema, &mut bytes.as_slice()).unwrap(), row);

        let order = schema.default_order();
        let line = text::render_line(&row, &order, &TextOptions::default());
        let back = text::parse_line(schema, &order, &line, &TextOptions::default()).unwrap();
        assert_eq!(back, row, "{}", schema.name);
    }
}
