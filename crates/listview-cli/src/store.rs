//! JSON file record store.
//!
//! The store is a single JSON array of objects, each with an `id` member.
//! Every call re-reads the file, so edits made by other processes between
//! commands are always picked up.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use listview_model::{DynRecord, Record, RecordId};
use listview_refresh::{Listing, MutationOutcome, RecordSource, SourceError};

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> Result<Vec<DynRecord>, SourceError> {
        let contents = fs::read_to_string(&self.path).map_err(|err| transport(&self.path, &err))?;
        serde_json::from_str(&contents).map_err(|err| SourceError::Malformed {
            message: format!("{}: {err}", self.path.display()),
        })
    }

    fn write(&self, records: &[DynRecord]) -> io::Result<()> {
        let json = serde_json::to_vec_pretty(records).map_err(io::Error::other)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)
    }

    /// Read, modify, and write back the collection.
    fn mutate<F>(&self, action: &str, change: F) -> MutationOutcome
    where
        F: FnOnce(&mut Vec<DynRecord>) -> MutationOutcome,
    {
        let mut records = match self.read() {
            Ok(records) => records,
            Err(err) => {
                return MutationOutcome::TransportError {
                    message: Some(err.to_string()),
                };
            }
        };
        let outcome = change(&mut records);
        if !outcome.is_success() {
            return outcome;
        }
        if let Err(err) = self.write(&records) {
            warn!(path = %self.path.display(), error = %err, action, "store write failed");
            return MutationOutcome::transport_error(err.to_string());
        }
        debug!(path = %self.path.display(), action, records = records.len(), "store updated");
        outcome
    }
}

fn transport(path: &Path, err: &io::Error) -> SourceError {
    SourceError::Transport {
        message: format!("{}: {err}", path.display()),
    }
}

/// Next integer identity: one past the largest integer id in use.
fn next_int_id(records: &[DynRecord]) -> i64 {
    records
        .iter()
        .filter_map(|record| match record.id() {
            RecordId::Int(value) => Some(value),
            RecordId::Text(_) => None,
        })
        .max()
        .map_or(1, |max| max + 1)
}

impl RecordSource for JsonFileStore {
    type Record = DynRecord;
    /// A record to create or replace. For `create`, an integer id of `0`
    /// asks the store to assign one.
    type Payload = DynRecord;

    async fn list(&self) -> Result<Listing<DynRecord>, SourceError> {
        let records = self.read()?;
        let total = records.len();
        Ok(Listing::new(records).with_total(total))
    }

    async fn create(&self, payload: DynRecord) -> MutationOutcome {
        self.mutate("create", |records| {
            let requested = payload.id();
            let id = if requested == RecordId::Int(0) {
                RecordId::Int(next_int_id(records))
            } else {
                requested
            };
            if records.iter().any(|record| record.id() == id) {
                return MutationOutcome::business_error("Duplicate entry");
            }
            let mut record = DynRecord::new(id.clone());
            for (name, value) in payload.fields() {
                record.set(name, value.clone());
            }
            records.push(record);
            MutationOutcome::success(id)
        })
    }

    async fn update(&self, payload: DynRecord) -> MutationOutcome {
        self.mutate("update", |records| {
            let id = payload.id();
            match records.iter_mut().find(|record| record.id() == id) {
                Some(record) => {
                    *record = payload;
                    MutationOutcome::success(id)
                }
                None => MutationOutcome::business_error(format!("Record {id} not found")),
            }
        })
    }

    async fn delete(&self, id: RecordId) -> MutationOutcome {
        self.mutate("delete", |records| {
            let before = records.len();
            records.retain(|record| record.id() != id);
            if records.len() == before {
                MutationOutcome::business_error(format!("Record {id} not found"))
            } else {
                MutationOutcome::success(id)
            }
        })
    }
}
