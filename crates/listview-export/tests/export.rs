//! End-to-end tests for the reason-gated export flow.

use std::cell::{Cell, RefCell};
use std::io;

use chrono::NaiveDate;
use listview_export::{
    AuditError, AuditLog, ExportColumn, ExportError, ExportFile, ExportPhase, ExportSession,
    FileSaver, ReasonSubmission, RequestOutcome, UTF8_BOM, write_csv,
};
use listview_model::{DynRecord, Notification, NotificationKind, Notifier};
use listview_query::{ListConfig, ListView};

#[derive(Default)]
struct Events(RefCell<Vec<String>>);

impl Events {
    fn push(&self, event: impl Into<String>) {
        self.0.borrow_mut().push(event.into());
    }

    fn list(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

struct FakeAudit<'a> {
    events: &'a Events,
    reject_with: Option<AuditError>,
    submissions: RefCell<Vec<ReasonSubmission>>,
}

impl<'a> FakeAudit<'a> {
    fn accepting(events: &'a Events) -> Self {
        Self {
            events,
            reject_with: None,
            submissions: RefCell::default(),
        }
    }

    fn rejecting(events: &'a Events, error: AuditError) -> Self {
        Self {
            reject_with: Some(error),
            ..Self::accepting(events)
        }
    }
}

impl AuditLog for FakeAudit<'_> {
    async fn submit_reason(&self, submission: &ReasonSubmission) -> Result<(), AuditError> {
        self.events.push("audit");
        self.submissions.borrow_mut().push(submission.clone());
        match &self.reject_with {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

struct MemorySaver<'a> {
    events: &'a Events,
    fail: Cell<bool>,
    saved: RefCell<Vec<ExportFile>>,
}

impl<'a> MemorySaver<'a> {
    fn new(events: &'a Events) -> Self {
        Self {
            events,
            fail: Cell::new(false),
            saved: RefCell::default(),
        }
    }
}

impl FileSaver for MemorySaver<'_> {
    fn save(&self, file: &ExportFile) -> io::Result<()> {
        self.events.push("save");
        if self.fail.get() {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
        }
        self.saved.borrow_mut().push(file.clone());
        Ok(())
    }
}

#[derive(Default)]
struct RecordingNotifier(RefCell<Vec<Notification>>);

impl RecordingNotifier {
    fn kinds(&self) -> Vec<NotificationKind> {
        self.0.borrow().iter().map(|n| n.kind).collect()
    }

    fn texts(&self) -> Vec<String> {
        self.0.borrow().iter().map(|n| n.text.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.0.borrow_mut().push(notification);
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 17).expect("valid date")
}

fn columns() -> Vec<ExportColumn> {
    vec![
        ExportColumn::new("id", "ID"),
        ExportColumn::new("name", "Name"),
        ExportColumn::new("note", "Note"),
    ]
}

fn customers() -> Vec<DynRecord> {
    vec![
        DynRecord::new(1)
            .with("name", "Acme, Inc.")
            .with("note", "plain"),
        DynRecord::new(2)
            .with("name", "Globex")
            .with("note", "said \"no\""),
        DynRecord::new(3)
            .with("name", "Initech")
            .with("note", "line one\nline two"),
    ]
}

fn pending_session(notifier: &RecordingNotifier) -> ExportSession<DynRecord> {
    let mut session = ExportSession::new();
    let outcome = session
        .request(customers(), "customers", columns(), today(), notifier)
        .expect("request");
    assert_eq!(outcome, RequestOutcome::AwaitingReason);
    session
}

#[tokio::test(flavor = "current_thread")]
async fn short_reason_is_rejected_before_any_audit_call() {
    let events = Events::default();
    let audit = FakeAudit::accepting(&events);
    let saver = MemorySaver::new(&events);
    let notifier = RecordingNotifier::default();
    let mut session = pending_session(&notifier);

    let err = session
        .submit("short", &audit, &saver, &notifier)
        .await
        .expect_err("too short");

    assert!(matches!(err, ExportError::ReasonTooShort { actual: 5, .. }));
    assert!(err.is_validation());
    assert!(events.list().is_empty());
    assert!(notifier.kinds().is_empty());
    assert_eq!(session.pending_reason(), Some("short"));
    assert!(session.pending_error().is_some());
}

#[tokio::test(flavor = "current_thread")]
async fn audit_is_recorded_before_the_file_is_saved() {
    let events = Events::default();
    let audit = FakeAudit::accepting(&events);
    let saver = MemorySaver::new(&events);
    let notifier = RecordingNotifier::default();
    let mut session = pending_session(&notifier);

    let file = session
        .submit("  quarterly compliance review ", &audit, &saver, &notifier)
        .await
        .expect("export");

    assert_eq!(events.list(), vec!["audit", "save"]);
    assert_eq!(
        audit.submissions.borrow().as_slice(),
        &[ReasonSubmission {
            reason: "quarterly compliance review".to_string(),
            module_name: "customers".to_string(),
            file_name: "customers_export_2024-05-17.csv".to_string(),
        }]
    );
    assert_eq!(file.file_name, "customers_export_2024-05-17.csv");
    assert_eq!(file.row_count, 3);
    assert_eq!(saver.saved.borrow().as_slice(), &[file.clone()]);
    assert_eq!(notifier.kinds(), vec![NotificationKind::Success]);
    assert_eq!(
        notifier.texts(),
        vec!["Exported 3 records to customers_export_2024-05-17.csv".to_string()]
    );
    assert!(session.is_idle());
}

#[tokio::test(flavor = "current_thread")]
async fn audit_failure_keeps_reason_and_saves_nothing() {
    let events = Events::default();
    let audit = FakeAudit::rejecting(
        &events,
        AuditError::Rejected {
            message: "audit service unavailable".to_string(),
        },
    );
    let saver = MemorySaver::new(&events);
    let notifier = RecordingNotifier::default();
    let mut session = pending_session(&notifier);

    let err = session
        .submit("monthly revenue reconciliation", &audit, &saver, &notifier)
        .await
        .expect_err("audit rejected");

    assert!(matches!(err, ExportError::Audit(AuditError::Rejected { .. })));
    assert_eq!(events.list(), vec!["audit"]);
    assert!(saver.saved.borrow().is_empty());
    assert_eq!(notifier.kinds(), vec![NotificationKind::Error]);
    assert_eq!(
        session.pending_reason(),
        Some("monthly revenue reconciliation")
    );

    // The same job can be retried from the reason prompt.
    let audit = FakeAudit::accepting(&events);
    session
        .submit("monthly revenue reconciliation", &audit, &saver, &notifier)
        .await
        .expect("retry");
    assert_eq!(events.list(), vec!["audit", "audit", "save"]);
}

#[tokio::test(flavor = "current_thread")]
async fn save_failure_notifies_once_and_drops_the_job() {
    let events = Events::default();
    let audit = FakeAudit::accepting(&events);
    let saver = MemorySaver::new(&events);
    saver.fail.set(true);
    let notifier = RecordingNotifier::default();
    let mut session = pending_session(&notifier);

    let err = session
        .submit("board meeting preparation", &audit, &saver, &notifier)
        .await
        .expect_err("save failed");

    assert!(matches!(err, ExportError::Save { .. }));
    assert_eq!(notifier.kinds(), vec![NotificationKind::Error]);
    assert!(session.is_idle());
}

/// Audit log whose call never completes, like a request the user walks away from.
struct HangingAudit;

impl AuditLog for HangingAudit {
    async fn submit_reason(&self, _submission: &ReasonSubmission) -> Result<(), AuditError> {
        std::future::pending().await
    }
}

#[tokio::test(flavor = "current_thread")]
async fn dropping_an_in_flight_submit_returns_to_idle() {
    let events = Events::default();
    let saver = MemorySaver::new(&events);
    let notifier = RecordingNotifier::default();
    let mut session = pending_session(&notifier);

    let finished = tokio::select! {
        biased;
        _ = session.submit("closing the dialog mid-audit", &HangingAudit, &saver, &notifier) => true,
        () = std::future::ready(()) => false,
    };

    assert!(!finished);
    assert!(session.is_idle());
    assert!(saver.saved.borrow().is_empty());
    assert!(notifier.kinds().is_empty());

    // A fresh request works after the abandoned one.
    let audit = FakeAudit::accepting(&events);
    session
        .request(customers(), "customers", columns(), today(), &notifier)
        .expect("request");
    session
        .submit("closing the dialog mid-audit", &audit, &saver, &notifier)
        .await
        .expect("export");
    assert_eq!(events.list(), vec!["audit", "save"]);
}

#[tokio::test(flavor = "current_thread")]
async fn submit_without_request_is_refused() {
    let events = Events::default();
    let audit = FakeAudit::accepting(&events);
    let saver = MemorySaver::new(&events);
    let notifier = RecordingNotifier::default();
    let mut session = ExportSession::<DynRecord>::new();

    let err = session
        .submit("a perfectly valid reason", &audit, &saver, &notifier)
        .await
        .expect_err("idle");
    assert!(matches!(err, ExportError::NotAwaitingReason));
    assert!(events.list().is_empty());
}

#[test]
fn empty_result_set_has_nothing_to_export() {
    let notifier = RecordingNotifier::default();
    let mut session = ExportSession::<DynRecord>::new();

    let outcome = session
        .request(Vec::new(), "customers", columns(), today(), &notifier)
        .expect("request");

    assert_eq!(outcome, RequestOutcome::NothingToExport);
    assert!(session.is_idle());
    assert_eq!(notifier.kinds(), vec![NotificationKind::Info]);
    assert_eq!(notifier.texts(), vec!["Nothing to export".to_string()]);
}

#[test]
fn request_without_columns_is_an_error() {
    let notifier = RecordingNotifier::default();
    let mut session = ExportSession::new();
    let err = session
        .request(customers(), "customers", Vec::new(), today(), &notifier)
        .expect_err("no columns");
    assert!(matches!(err, ExportError::NoColumns));
}

#[test]
fn cancel_discards_the_pending_job() {
    let notifier = RecordingNotifier::default();
    let mut session = pending_session(&notifier);
    assert!(matches!(session.phase(), ExportPhase::ReasonPending { .. }));

    session.cancel();

    assert!(session.is_idle());
    assert!(session.pending_job().is_none());
}

#[test]
fn export_takes_the_whole_filtered_set() {
    let config = ListConfig::new()
        .with_searchable_fields(["name"])
        .with_default_page_size(1);
    let mut view = ListView::with_records(config, customers());
    view.set_search_text("i");
    assert_eq!(view.page().len(), 1);

    let notifier = RecordingNotifier::default();
    let mut session = ExportSession::new();
    session
        .request(
            view.all_filtered_and_sorted().to_vec(),
            "customers",
            columns(),
            today(),
            &notifier,
        )
        .expect("request");

    let job = session.pending_job().expect("pending");
    assert_eq!(job.rows.len(), view.total());
    assert!(job.rows.len() > view.page().len());
}

#[test]
fn csv_survives_a_reader_round_trip() {
    let bytes = write_csv(&customers(), &columns()).expect("csv");
    assert!(bytes.starts_with(UTF8_BOM));

    let mut reader = csv::Reader::from_reader(&bytes[UTF8_BOM.len()..]);
    let headers = reader.headers().expect("headers").clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["ID", "Name", "Note"]);

    let rows: Vec<Vec<String>> = reader
        .records()
        .map(|record| {
            record
                .expect("record")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect();
    assert_eq!(
        rows,
        vec![
            vec!["1", "Acme, Inc.", "plain"],
            vec!["2", "Globex", "said \"no\""],
            vec!["3", "Initech", "line one\nline two"],
        ]
    );
}

#[test]
fn csv_snapshot() {
    let bytes = write_csv(&customers(), &columns()).expect("csv");
    let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).expect("utf-8");
    insta::assert_snapshot!(text, @r#"
    ID,Name,Note
    1,"Acme, Inc.",plain
    2,Globex,"said ""no"""
    3,Initech,"line one
    line two"
    "#);
}
