//! Command tests against a store, screen, and audit log in a temp directory.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tempfile::TempDir;

use listview_cli::audit::FileAuditLog;
use listview_cli::commands::{ExportRequest, Reported, run_delete, run_export, run_query};
use listview_cli::flags::QueryArgs;
use listview_export::{ExportError, UTF8_BOM};
use listview_model::RecordId;

const STORE: &str = r#"[
  {"id": 1, "name": "Ada", "status": "New", "amount": 120, "createdAt": "2024-01-05"},
  {"id": 2, "name": "Hopper, Grace", "status": "Won", "amount": 80, "createdAt": "2024-02-10"},
  {"id": 3, "name": "Linus", "status": "Won", "amount": 300, "createdAt": "2024-03-15"},
  {"id": 4, "name": "Barbara", "status": "Lost", "amount": 50, "createdAt": "2024-04-20"}
]"#;

const SCREEN: &str = r#"
module = "leads"
searchable = ["name"]
timestamp_field = "createdAt"
page_size = 2

[fields]
amount = "number"

[[columns]]
key = "id"
label = "ID"

[[columns]]
key = "name"
label = "Name"

[[columns]]
key = "status"
label = "Status"

[[columns]]
key = "amount"
label = "Amount"
"#;

struct Fixture {
    dir: TempDir,
    store: PathBuf,
    screen: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let store = dir.path().join("leads.json");
        let screen = dir.path().join("leads.toml");
        fs::write(&store, STORE).expect("write store");
        fs::write(&screen, SCREEN).expect("write screen");
        Self { dir, store, screen }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn export_request<'a>(&'a self, query: &'a QueryArgs, reason: &'a str) -> ExportRequest<'a> {
        ExportRequest {
            store: &self.store,
            screen: &self.screen,
            query,
            reason,
            output_dir: self.path("out"),
            audit_log: self.path("audit.jsonl"),
            today: NaiveDate::from_ymd_opt(2024, 5, 17).expect("date"),
        }
    }
}

fn filter(arg: &str) -> listview_cli::flags::FilterArg {
    arg.parse().expect("filter")
}

#[tokio::test(flavor = "current_thread")]
async fn query_reports_the_requested_page() {
    let fixture = Fixture::new();
    let query = QueryArgs {
        filters: vec![filter("status=Won,New")],
        sort: Some("amount:desc".parse().expect("sort")),
        select: vec![RecordId::Int(3)],
        page: 1,
        ..QueryArgs::default()
    };

    let (_session, report) = run_query(&fixture.store, &fixture.screen, &query)
        .await
        .expect("query");

    insta::assert_json_snapshot!(report, @r#"
    {
      "module": "leads",
      "pageIndex": 1,
      "pageCount": 2,
      "total": 3,
      "rows": [
        {
          "id": 3,
          "selected": true
        },
        {
          "id": 1,
          "selected": false
        }
      ],
      "selected": [
        3
      ],
      "pageCheckbox": "partial"
    }
    "#);
}

#[tokio::test(flavor = "current_thread")]
async fn query_date_range_is_inclusive() {
    let fixture = Fixture::new();
    let query = QueryArgs {
        from: NaiveDate::from_ymd_opt(2024, 2, 10),
        to: NaiveDate::from_ymd_opt(2024, 3, 15),
        page: 1,
        ..QueryArgs::default()
    };

    let (_session, report) = run_query(&fixture.store, &fixture.screen, &query)
        .await
        .expect("query");

    assert_eq!(report.total, 2);
    let ids: Vec<RecordId> = report.rows.iter().map(|row| row.id.clone()).collect();
    assert_eq!(ids, vec![RecordId::Int(2), RecordId::Int(3)]);
}

#[tokio::test(flavor = "current_thread")]
async fn export_records_reason_then_writes_csv() {
    let fixture = Fixture::new();
    let query = QueryArgs {
        filters: vec![filter("status=Won")],
        page: 1,
        ..QueryArgs::default()
    };

    let file = run_export(fixture.export_request(&query, "quarterly pipeline review"))
        .await
        .expect("export")
        .expect("rows to export");

    assert_eq!(file.file_name, "leads_export_2024-05-17.csv");
    assert_eq!(file.row_count, 2);

    let written = fs::read(fixture.path("out").join(&file.file_name)).expect("csv on disk");
    assert_eq!(written, file.bytes);
    let text = std::str::from_utf8(&written[UTF8_BOM.len()..]).expect("utf-8");
    assert_eq!(
        text,
        "ID,Name,Status,Amount\n2,\"Hopper, Grace\",Won,80\n3,Linus,Won,300\n"
    );

    let entries = FileAuditLog::new(fixture.path("audit.jsonl"))
        .entries()
        .expect("audit log");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].submission.reason, "quarterly pipeline review");
    assert_eq!(entries[0].submission.module_name, "leads");
    assert_eq!(entries[0].submission.file_name, file.file_name);
}

#[tokio::test(flavor = "current_thread")]
async fn export_with_short_reason_touches_nothing() {
    let fixture = Fixture::new();
    let query = QueryArgs {
        page: 1,
        ..QueryArgs::default()
    };

    let err = run_export(fixture.export_request(&query, "short"))
        .await
        .expect_err("validation");

    assert!(matches!(
        err.downcast_ref::<ExportError>(),
        Some(ExportError::ReasonTooShort { .. })
    ));
    assert!(!fixture.path("audit.jsonl").exists());
    assert!(!fixture.path("out").exists());
}

#[tokio::test(flavor = "current_thread")]
async fn export_with_no_matches_is_a_no_op() {
    let fixture = Fixture::new();
    let query = QueryArgs {
        search: Some("nobody".to_string()),
        page: 1,
        ..QueryArgs::default()
    };

    let file = run_export(fixture.export_request(&query, "quarterly pipeline review"))
        .await
        .expect("export");

    assert!(file.is_none());
    assert!(!fixture.path("audit.jsonl").exists());
}

#[tokio::test(flavor = "current_thread")]
async fn delete_refreshes_from_the_store() {
    let fixture = Fixture::new();
    let query = QueryArgs {
        page: 2,
        ..QueryArgs::default()
    };

    let (session, report, page) = run_delete(
        &fixture.store,
        &fixture.screen,
        &query,
        &[RecordId::Int(4), RecordId::Int(9)],
    )
    .await
    .expect("delete");

    assert_eq!(report.deleted, vec![RecordId::Int(4)]);
    assert_eq!(report.failed, vec![RecordId::Int(9)]);
    assert!(session.notifier().has_errors());
    let texts: Vec<String> = session
        .notifier()
        .notifications()
        .into_iter()
        .map(|notification| notification.text)
        .collect();
    assert_eq!(texts, vec!["Record 9 not found", "Deleted 1 record"]);
    assert_eq!(page.total, 3);
    assert_eq!(page.page_index, 2);
    assert!(page.selected.is_empty());
    assert_eq!(stored_ids(&fixture.store), vec![1, 2, 3]);
}

#[tokio::test(flavor = "current_thread")]
async fn missing_store_is_an_error() {
    let fixture = Fixture::new();
    let query = QueryArgs::default();
    let err = run_query(&fixture.path("absent.json"), &fixture.screen, &query)
        .await
        .expect_err("missing store");
    assert!(err.is::<Reported>());
}

#[tokio::test(flavor = "current_thread")]
async fn unparsable_screen_is_not_marked_reported() {
    let fixture = Fixture::new();
    fs::write(&fixture.screen, "module = ").expect("write screen");
    let err = run_query(&fixture.store, &fixture.screen, &QueryArgs::default())
        .await
        .expect_err("bad screen");
    assert!(!err.is::<Reported>());
}

#[tokio::test(flavor = "current_thread")]
async fn audit_failure_is_marked_reported() {
    let fixture = Fixture::new();
    let query = QueryArgs {
        page: 1,
        ..QueryArgs::default()
    };
    let request = ExportRequest {
        // A directory cannot be opened for appending.
        audit_log: fixture.dir.path().to_path_buf(),
        ..fixture.export_request(&query, "quarterly pipeline review")
    };

    let err = run_export(request).await.expect_err("audit failed");

    assert!(err.is::<Reported>());
    assert!(!fixture.path("out").exists());
}

fn stored_ids(path: &Path) -> Vec<i64> {
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(path).expect("read store")).expect("json");
    json.as_array()
        .expect("array")
        .iter()
        .filter_map(|record| record["id"].as_i64())
        .collect()
}
