#![forbid(unsafe_code)]

//! Both store backends trace writes the same way.

use std::sync::{Arc, Mutex};

use postaid_core::ResidentDraft;
use postaid_runtime::{MemoryStore, RecordStore};
use tracing_subscriber::layer::SubscriberExt;

// ============================================================================
// Test Infrastructure
// ============================================================================

/// `(message, store, id)` of each captured event.
type Captured = Vec<(String, String, String)>;

struct EventCapture {
    events: Arc<Mutex<Captured>>,
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    store: String,
    id: String,
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        let value = format!("{value:?}");
        match field.name() {
            "message" => self.message = value,
            "id" => self.id = value,
            _ => {}
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "store" {
            self.store = value.to_owned();
        }
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        if !visitor.store.is_empty() {
            self.events
                .lock()
                .unwrap()
                .push((visitor.message, visitor.store, visitor.id));
        }
    }
}

fn capture<F: FnOnce()>(f: F) -> Captured {
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = EventCapture {
        events: events.clone(),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().unwrap().clone();
    captured
}

fn draft(tenant: &str) -> ResidentDraft {
    ResidentDraft::new("A동", "101", tenant).unwrap()
}

fn exercise(store: &dyn RecordStore) -> Captured {
    capture(|| {
        let id = store.append(draft("김철수")).unwrap();
        store.update(id, draft("김영수")).unwrap();
    })
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn memory_store_traces_ids() {
    let events = exercise(&MemoryStore::new());
    assert_eq!(
        events,
        vec![
            ("resident appended".into(), "MemoryStore".into(), "#1".into()),
            ("resident updated".into(), "MemoryStore".into(), "#1".into()),
        ]
    );
}

#[cfg(feature = "file-store")]
#[test]
fn file_store_traces_ids_like_memory_store() {
    let tmp = tempfile::TempDir::new().unwrap();
    let store = postaid_runtime::FileStore::open(tmp.path().join("residents.json")).unwrap();
    let events = exercise(&store);
    assert_eq!(
        events,
        vec![
            ("resident appended".into(), "FileStore".into(), "#1".into()),
            ("resident updated".into(), "FileStore".into(), "#1".into()),
        ]
    );
}
