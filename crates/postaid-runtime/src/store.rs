#![forbid(unsafe_code)]

//! Resident record stores.
//!
//! A [`RecordStore`] is the source of truth for resident records. Writers call
//! [`RecordStore::append`] or [`RecordStore::update`]; readers register a
//! listener with [`RecordStore::subscribe`] and receive the full record set
//! after every change (and once immediately on subscription).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        RecordStore                           │
//! │   - MemoryStore: in-memory (tests, ephemeral sessions)       │
//! │   - FileStore: JSON file (requires file-store)               │
//! └──────────────────────────────────────────────────────────────┘
//!                              │ snapshot after each change
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Listeners                             │
//! │   Fn(&[Resident]) callbacks, e.g. forwarding to a Program    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Invariants
//!
//! 1. **All or nothing**: a failed write leaves the records and the id
//!    counter exactly as they were, and no listener is called.
//! 2. **No id reuse**: ids come from a high-water mark that only grows.
//! 3. **Atomic writes**: the file store writes a temp file and renames it.
//! 4. **Listeners see whole snapshots**: never diffs.
//! 5. **Delivery follows commit order**: concurrent writers are serialized
//!    through delivery, so the last snapshot a listener sees is the store's
//!    current one. A new listener gets the snapshot and every later change,
//!    with nothing missed in between.
//!
//! Listeners run on the writer's thread and must not write to the store,
//! subscribe, or unsubscribe from inside the callback.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use postaid_core::{Resident, ResidentDraft, ResidentId, next_id};

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors from record store operations.
#[derive(Debug)]
pub enum StoreError {
    /// I/O error during file operations.
    Io(std::io::Error),
    /// Encoding or decoding the store file failed.
    #[cfg(feature = "file-store")]
    Serialization(String),
    /// The store file is not in a format this version understands.
    Corruption(String),
    /// No record with this id.
    NotFound(ResidentId),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "file-store")]
            StoreError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            StoreError::Corruption(msg) => write!(f, "store corruption: {msg}"),
            StoreError::NotFound(id) => write!(f, "no resident with id {id}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// ─────────────────────────────────────────────────────────────────────────────
// Store Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Identifier of a registered listener.
pub type SubscriptionId = u64;

/// Callback receiving the full record set.
pub type Listener = Box<dyn Fn(&[Resident]) + Send + Sync>;

/// A push-based source and sink of resident records.
pub trait RecordStore: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Current records in insertion order.
    fn snapshot(&self) -> Vec<Resident>;

    /// Store a new record and return its id.
    fn append(&self, draft: ResidentDraft) -> StoreResult<ResidentId>;

    /// Replace the fields of an existing record.
    fn update(&self, id: ResidentId, draft: ResidentDraft) -> StoreResult<()>;

    /// Register a listener. It is called once right away with the current
    /// snapshot and again after every successful write.
    fn subscribe(&self, listener: Listener) -> SubscriptionId;

    /// Remove a listener. Returns `false` if the id was unknown.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared bookkeeping
// ─────────────────────────────────────────────────────────────────────────────

/// Records plus the highest id ever issued.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Ledger {
    high_water: u64,
    records: Vec<Resident>,
}

impl Ledger {
    fn from_records(records: Vec<Resident>) -> Self {
        let high_water = records.iter().map(|r| r.id.0).max().unwrap_or(0);
        Self {
            high_water,
            records,
        }
    }

    fn issue_id(&mut self) -> ResidentId {
        let by_records = next_id(&self.records);
        let by_mark = ResidentId(self.high_water).next();
        let id = by_records.max(by_mark);
        self.high_water = id.0;
        id
    }

    fn append(&mut self, draft: ResidentDraft) -> ResidentId {
        let id = self.issue_id();
        self.records.push(Resident::from_draft(id, draft));
        id
    }

    fn update(&mut self, id: ResidentId, draft: ResidentDraft) -> StoreResult<()> {
        let slot = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;
        *slot = slot.replaced_by(draft);
        Ok(())
    }
}

#[derive(Default)]
struct Listeners {
    next_id: AtomicU64,
    entries: RwLock<Vec<(SubscriptionId, Listener)>>,
}

impl Listeners {
    fn add(&self, listener: Listener) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    fn remove(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|(sub, _)| *sub != id);
        entries.len() != before
    }

    fn notify(&self, records: &[Resident]) {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        for (_, listener) in entries.iter() {
            listener(records);
        }
    }

    fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }
}

/// State shared by every store flavor: the ledger behind a lock and the
/// listener list. `persist` decides where a new ledger goes before it becomes
/// visible.
///
/// Lock order is `delivery`, then `ledger`. `delivery` is held from the
/// start of a write until its listeners have returned.
struct Core {
    ledger: RwLock<Ledger>,
    listeners: Listeners,
    delivery: Mutex<()>,
}

impl Core {
    fn new(ledger: Ledger) -> Self {
        Self {
            ledger: RwLock::new(ledger),
            listeners: Listeners::default(),
            delivery: Mutex::new(()),
        }
    }

    fn snapshot(&self) -> Vec<Resident> {
        self.ledger
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .clone()
    }

    /// Apply `change` to a copy of the ledger, hand the copy to `persist`, and
    /// only then publish it.
    fn commit<T>(
        &self,
        change: impl FnOnce(&mut Ledger) -> StoreResult<T>,
        persist: impl FnOnce(&Ledger) -> StoreResult<()>,
    ) -> StoreResult<T> {
        let _delivery = self.delivery.lock().unwrap_or_else(PoisonError::into_inner);
        let (out, records) = {
            let mut guard = self.ledger.write().unwrap_or_else(PoisonError::into_inner);
            let mut next = guard.clone();
            let out = change(&mut next)?;
            persist(&next)?;
            *guard = next;
            (out, guard.records.clone())
        };
        // readers see the new ledger while listeners run
        self.listeners.notify(&records);
        Ok(out)
    }

    fn subscribe(&self, listener: Listener) -> SubscriptionId {
        let _delivery = self.delivery.lock().unwrap_or_else(PoisonError::into_inner);
        listener(&self.snapshot());
        self.listeners.add(listener)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Store
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory record store. Records are lost when the process exits.
pub struct MemoryStore {
    core: Core,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            core: Core::new(Ledger::default()),
        }
    }

    /// Create a store pre-populated with records.
    #[must_use]
    pub fn with_records(records: Vec<Resident>) -> Self {
        Self {
            core: Core::new(Ledger::from_records(records)),
        }
    }
}

impl RecordStore for MemoryStore {
    fn name(&self) -> &str {
        "MemoryStore"
    }

    fn snapshot(&self) -> Vec<Resident> {
        self.core.snapshot()
    }

    fn append(&self, draft: ResidentDraft) -> StoreResult<ResidentId> {
        let id = self.core.commit(|l| Ok(l.append(draft)), |_| Ok(()))?;
        tracing::debug!(store = self.name(), %id, "resident appended");
        Ok(id)
    }

    fn update(&self, id: ResidentId, draft: ResidentDraft) -> StoreResult<()> {
        self.core.commit(|l| l.update(id, draft), |_| Ok(()))?;
        tracing::debug!(store = self.name(), %id, "resident updated");
        Ok(())
    }

    fn subscribe(&self, listener: Listener) -> SubscriptionId {
        self.core.subscribe(listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.core.listeners.remove(id)
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.core.ledger.read().map(|l| l.records.len()).unwrap_or(0);
        f.debug_struct("MemoryStore")
            .field("records", &count)
            .field("listeners", &self.core.listeners.len())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Store (requires file-store feature)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "file-store")]
mod file_store {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::fs::{self, File};
    use std::io::{BufReader, BufWriter, Write};
    use std::path::{Path, PathBuf};

    /// On-disk layout.
    #[derive(Serialize, Deserialize)]
    struct StoreFile {
        format_version: u32,
        high_water: u64,
        /// Kept as raw values so one bad record does not sink the load.
        records: Vec<serde_json::Value>,
    }

    impl StoreFile {
        const FORMAT_VERSION: u32 = 1;
    }

    /// JSON file record store.
    ///
    /// The whole ledger is loaded at [`FileStore::open`] and rewritten on every
    /// change.
    ///
    /// # File Format
    ///
    /// ```json
    /// {
    ///   "format_version": 1,
    ///   "high_water": 2,
    ///   "records": [
    ///     { "id": 1, "buildingName": "A동 (1번지)", "unitNumber": "101", "tenant": "김철수" }
    ///   ]
    /// }
    /// ```
    ///
    /// # Atomic Writes
    ///
    /// 1. Write to `{path}.tmp`
    /// 2. Flush and sync
    /// 3. Rename `{path}.tmp` -> `{path}`
    pub struct FileStore {
        path: PathBuf,
        core: Core,
    }

    impl FileStore {
        /// Open (or prepare to create) a store file.
        ///
        /// A missing file is an empty store. Records that fail to decode or
        /// have a blank field are skipped with a warning.
        pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
            let path = path.as_ref().to_path_buf();
            let ledger = load(&path)?;
            tracing::debug!(path = %path.display(), records = ledger.records.len(), "opened record file");
            Ok(Self {
                path,
                core: Core::new(ledger),
            })
        }

        /// Open a store file, seeding it with `records` if it does not exist.
        pub fn open_or_seed(path: impl AsRef<Path>, records: Vec<Resident>) -> StoreResult<Self> {
            let path = path.as_ref();
            if path.exists() {
                return Self::open(path);
            }
            let ledger = Ledger::from_records(records);
            save(path, &ledger)?;
            Ok(Self {
                path: path.to_path_buf(),
                core: Core::new(ledger),
            })
        }

        #[must_use]
        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    fn temp_path(path: &Path) -> PathBuf {
        let mut tmp = path.to_path_buf();
        tmp.set_extension("json.tmp");
        tmp
    }

    fn load(path: &Path) -> StoreResult<Ledger> {
        if !path.exists() {
            return Ok(Ledger::default());
        }
        let reader = BufReader::new(File::open(path)?);
        let file: StoreFile = serde_json::from_reader(reader)
            .map_err(|e| StoreError::Serialization(format!("failed to parse record file: {e}")))?;

        if file.format_version != StoreFile::FORMAT_VERSION {
            return Err(StoreError::Corruption(format!(
                "record file format {} (expected {})",
                file.format_version,
                StoreFile::FORMAT_VERSION
            )));
        }

        let mut records = Vec::with_capacity(file.records.len());
        for (index, value) in file.records.into_iter().enumerate() {
            let record: Resident = match serde_json::from_value(value) {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(index, error = %e, "failed to decode record, skipping");
                    continue;
                }
            };
            if ResidentDraft::new(&record.building_name, &record.unit_number, &record.tenant).is_err() {
                tracing::warn!(id = %record.id, "record has a blank field, skipping");
                continue;
            }
            records.push(record);
        }

        let mut ledger = Ledger::from_records(records);
        ledger.high_water = ledger.high_water.max(file.high_water);
        Ok(ledger)
    }

    fn save(path: &Path, ledger: &Ledger) -> StoreResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let records = ledger
            .records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Serialization(format!("failed to serialize record: {e}")))?;
        let file = StoreFile {
            format_version: StoreFile::FORMAT_VERSION,
            high_water: ledger.high_water,
            records,
        };

        let tmp_path = temp_path(path);
        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            serde_json::to_writer_pretty(&mut writer, &file)
                .map_err(|e| StoreError::Serialization(format!("failed to serialize records: {e}")))?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp_path, path)?;

        tracing::debug!(
            path = %path.display(),
            records = ledger.records.len(),
            "saved record file"
        );
        Ok(())
    }

    impl RecordStore for FileStore {
        fn name(&self) -> &str {
            "FileStore"
        }

        fn snapshot(&self) -> Vec<Resident> {
            self.core.snapshot()
        }

        fn append(&self, draft: ResidentDraft) -> StoreResult<ResidentId> {
            let id = self
                .core
                .commit(|l| Ok(l.append(draft)), |l| save(&self.path, l))?;
            tracing::debug!(store = self.name(), %id, "resident appended");
            Ok(id)
        }

        fn update(&self, id: ResidentId, draft: ResidentDraft) -> StoreResult<()> {
            self.core.commit(|l| l.update(id, draft), |l| save(&self.path, l))?;
            tracing::debug!(store = self.name(), %id, "resident updated");
            Ok(())
        }

        fn subscribe(&self, listener: Listener) -> SubscriptionId {
            self.core.subscribe(listener)
        }

        fn unsubscribe(&self, id: SubscriptionId) -> bool {
            self.core.listeners.remove(id)
        }
    }

    impl fmt::Debug for FileStore {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("FileStore").field("path", &self.path).finish()
        }
    }
}

#[cfg(feature = "file-store")]
pub use file_store::FileStore;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn draft(b: &str, u: &str, t: &str) -> ResidentDraft {
        ResidentDraft::new(b, u, t).unwrap()
    }

    #[test]
    fn append_assigns_increasing_ids() {
        let store = MemoryStore::new();
        let a = store.append(draft("A동", "101", "김철수")).unwrap();
        let b = store.append(draft("B동", "202", "이영희")).unwrap();
        assert_eq!(a, ResidentId(1));
        assert_eq!(b, ResidentId(2));
        assert_eq!(store.snapshot().len(), 2);
    }

    #[test]
    fn seeded_store_continues_after_max() {
        let store = MemoryStore::with_records(vec![
            Resident::new(4, "A동", "1", "가"),
            Resident::new(9, "A동", "2", "나"),
        ]);
        assert_eq!(store.append(draft("B동", "1", "다")).unwrap(), ResidentId(10));
    }

    #[test]
    fn update_replaces_fields_and_keeps_id() {
        let store = MemoryStore::new();
        let id = store.append(draft("A동", "101", "김철수")).unwrap();
        store.update(id, draft("A동", "102", "김철수")).unwrap();
        let records = store.snapshot();
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].unit_number, "102");
    }

    #[test]
    fn update_unknown_id_fails_without_notifying() {
        let store = MemoryStore::new();
        let calls = Arc::new(Mutex::new(0));
        let seen = calls.clone();
        store.subscribe(Box::new(move |_| *seen.lock().unwrap() += 1));
        let err = store.update(ResidentId(7), draft("A동", "1", "x")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(ResidentId(7))));
        // only the initial delivery
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn listeners_receive_full_snapshots() {
        let store = MemoryStore::new();
        let sizes = Arc::new(Mutex::new(Vec::new()));
        let sink = sizes.clone();
        let sub = store.subscribe(Box::new(move |records| sink.lock().unwrap().push(records.len())));
        store.append(draft("A동", "1", "가")).unwrap();
        store.append(draft("A동", "2", "나")).unwrap();
        assert!(store.unsubscribe(sub));
        store.append(draft("A동", "3", "다")).unwrap();
        assert_eq!(*sizes.lock().unwrap(), vec![0, 1, 2]);
        assert!(!store.unsubscribe(sub));
    }

    #[test]
    fn concurrent_writers_leave_listeners_on_latest_snapshot() {
        for _ in 0..50 {
            let store = Arc::new(MemoryStore::new());
            let last = Arc::new(Mutex::new(Vec::new()));
            let sink = last.clone();
            store.subscribe(Box::new(move |records| {
                *sink.lock().unwrap() = records.to_vec();
            }));

            let writers: Vec<_> = (0..4)
                .map(|w| {
                    let store = Arc::clone(&store);
                    std::thread::spawn(move || {
                        for i in 0..25 {
                            store.append(draft("A동", &format!("{w}-{i}"), "가")).unwrap();
                        }
                    })
                })
                .collect();
            for writer in writers {
                writer.join().unwrap();
            }

            assert_eq!(store.snapshot().len(), 100);
            assert_eq!(*last.lock().unwrap(), store.snapshot());
        }
    }

    #[test]
    fn subscribe_during_writes_misses_nothing() {
        let store = Arc::new(MemoryStore::new());
        let writer = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for i in 0..100 {
                    store.append(draft("B동", &i.to_string(), "나")).unwrap();
                }
            })
        };
        let last = Arc::new(Mutex::new(Vec::new()));
        let sink = last.clone();
        store.subscribe(Box::new(move |records| {
            *sink.lock().unwrap() = records.to_vec();
        }));
        writer.join().unwrap();

        assert_eq!(*last.lock().unwrap(), store.snapshot());
    }

    #[test]
    fn ids_not_reused_after_high_water() {
        let mut ledger = Ledger::from_records(vec![Resident::new(3, "A동", "1", "가")]);
        ledger.records.clear();
        assert_eq!(ledger.issue_id(), ResidentId(4));
    }

    #[test]
    fn failed_persist_leaves_state_untouched() {
        let core = Core::new(Ledger::default());
        let result = core.commit(
            |l| Ok(l.append(draft("A동", "1", "가"))),
            |_| Err(StoreError::Corruption("disk full".into())),
        );
        assert!(result.is_err());
        assert!(core.snapshot().is_empty());
        assert_eq!(core.ledger.read().unwrap().high_water, 0);
    }

    #[test]
    fn store_error_display() {
        let io_err = StoreError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        assert!(io_err.to_string().contains("I/O error"));
        assert!(StoreError::NotFound(ResidentId(3)).to_string().contains("#3"));
    }
}
