//! Subcommand implementations, independent of argument parsing.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use listview_export::{ExportColumn, ExportFile, ExportSession, RequestOutcome};
use listview_model::{DynRecord, Record, RecordId};
use listview_query::{ListView, VisibleSelection};
use listview_refresh::{BulkDelete, RefreshCoordinator};

use crate::audit::FileAuditLog;
use crate::console::ConsoleNotifier;
use crate::flags::QueryArgs;
use crate::saver::DirectorySaver;
use crate::screen::ScreenConfig;
use crate::store::JsonFileStore;

/// A failure the console notifier has already shown to the user.
///
/// `main` logs these instead of printing them a second time.
#[derive(Debug, Error)]
#[error("{context}: {source}")]
pub struct Reported {
    context: String,
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl Reported {
    fn new(
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            context: context.into(),
            source: source.into(),
        }
    }
}

/// One mounted screen: its configuration, view, and coordinator.
#[derive(Debug)]
pub struct Session {
    pub screen: ScreenConfig,
    pub view: RefCell<ListView<DynRecord>>,
    pub coordinator: RefreshCoordinator<JsonFileStore, ConsoleNotifier>,
}

impl Session {
    /// Load the screen config, fetch the records, and apply the query flags.
    pub async fn open(store: &Path, screen: &Path, query: &QueryArgs) -> Result<Self> {
        let screen = ScreenConfig::load(screen)?;
        let view = RefCell::new(ListView::new(screen.list_config()?));
        let coordinator =
            RefreshCoordinator::new(JsonFileStore::new(store), ConsoleNotifier::new());
        coordinator
            .reload(&view)
            .await
            .map_err(|err| Reported::new(format!("load records from {}", store.display()), err))?;
        query.apply(&mut *view.borrow_mut());
        Ok(Self {
            screen,
            view,
            coordinator,
        })
    }

    pub fn notifier(&self) -> &ConsoleNotifier {
        self.coordinator.notifier()
    }

    /// Configured columns, or every field present in the records.
    pub fn columns(&self) -> Vec<ExportColumn> {
        let view = self.view.borrow();
        let fields: BTreeSet<&str> = view
            .records()
            .iter()
            .flat_map(|record| record.fields().keys().map(String::as_str))
            .collect();
        self.screen.export_columns(fields)
    }

    pub fn page_report(&self) -> PageReport {
        let view = self.view.borrow();
        PageReport {
            module: self.screen.module.clone(),
            page_index: view.query().page_index(),
            page_count: view.page_count(),
            total: view.total(),
            rows: view
                .page()
                .iter()
                .map(|record| PageRow {
                    id: record.id(),
                    selected: view.is_selected(&record.id()),
                    record: record.clone(),
                })
                .collect(),
            selected: view.selection().iter().cloned().collect(),
            page_checkbox: match view.visible_selection() {
                VisibleSelection::None => "none",
                VisibleSelection::Partial => "partial",
                VisibleSelection::All => "all",
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRow {
    pub id: RecordId,
    pub selected: bool,
    #[serde(skip)]
    pub record: DynRecord,
}

/// What the `query` command shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageReport {
    pub module: String,
    pub page_index: usize,
    pub page_count: usize,
    pub total: usize,
    pub rows: Vec<PageRow>,
    pub selected: Vec<RecordId>,
    /// State of the "select page" checkbox.
    pub page_checkbox: &'static str,
}

pub async fn run_query(store: &Path, screen: &Path, query: &QueryArgs) -> Result<(Session, PageReport)> {
    let session = Session::open(store, screen, query).await?;
    let report = session.page_report();
    Ok((session, report))
}

pub struct ExportRequest<'a> {
    pub store: &'a Path,
    pub screen: &'a Path,
    pub query: &'a QueryArgs,
    pub reason: &'a str,
    pub output_dir: PathBuf,
    pub audit_log: PathBuf,
    pub today: NaiveDate,
}

/// Export the filtered set. `Ok(None)` when there was nothing to export.
pub async fn run_export(request: ExportRequest<'_>) -> Result<Option<ExportFile>> {
    let session = Session::open(request.store, request.screen, request.query).await?;
    let rows = session.view.borrow().all_filtered_and_sorted().to_vec();
    let mut export = ExportSession::new();
    let outcome = export.request(
        rows,
        &session.screen.module,
        session.columns(),
        request.today,
        session.notifier(),
    )?;
    if outcome == RequestOutcome::NothingToExport {
        return Ok(None);
    }

    let audit = FileAuditLog::new(request.audit_log);
    let saver = DirectorySaver::new(request.output_dir);
    let file = export
        .submit(request.reason, &audit, &saver, session.notifier())
        .await
        .map_err(|err| -> anyhow::Error {
            if err.was_notified() {
                Reported::new("export", err).into()
            } else {
                err.into()
            }
        })?;
    info!(
        module = %session.screen.module,
        path = %saver.target(&file.file_name).display(),
        "export saved"
    );
    Ok(Some(file))
}

/// Delete `ids` through the coordinator and return the refreshed page.
pub async fn run_delete(
    store: &Path,
    screen: &Path,
    query: &QueryArgs,
    ids: &[RecordId],
) -> Result<(Session, BulkDelete, PageReport)> {
    if ids.is_empty() {
        bail!("no ids given");
    }
    let session = Session::open(store, screen, query).await?;
    {
        let mut view = session.view.borrow_mut();
        view.clear_selection();
        for id in ids {
            view.toggle_row(id.clone(), true);
        }
    }
    let report = session.coordinator.delete_selected(&session.view).await;
    let page = session.page_report();
    Ok((session, report, page))
}
