//! A store listener forwarding snapshots into a running program.

use std::sync::Arc;
use std::time::Duration;

use postaid_core::{Resident, ResidentDraft};
use postaid_runtime::{Cmd, MemoryStore, Model, Program, ProgramConfig, RecordStore};

#[derive(Default)]
struct Mirror {
    records: Vec<Resident>,
    updates: usize,
}

enum Msg {
    Snapshot(Vec<Resident>),
    Add(&'static str),
}

struct App {
    mirror: Mirror,
    store: Arc<MemoryStore>,
}

impl Model for App {
    type Message = Msg;

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        match msg {
            Msg::Snapshot(records) => {
                self.mirror.records = records;
                self.mirror.updates += 1;
                Cmd::none()
            }
            Msg::Add(tenant) => {
                // the local list is not touched here; the listener delivers it
                let draft = match ResidentDraft::new("A동", "101", tenant) {
                    Ok(d) => d,
                    Err(e) => return Cmd::log(e.to_string()),
                };
                match self.store.append(draft) {
                    Ok(_) => Cmd::none(),
                    Err(e) => Cmd::log(e.to_string()),
                }
            }
        }
    }

    fn view(&self, out: &mut String) {
        for r in &self.mirror.records {
            out.push_str(&r.tenant);
            out.push('\n');
        }
    }
}

#[test]
fn appended_records_reach_model_through_listener() {
    let store = Arc::new(MemoryStore::new());
    let app = App {
        mirror: Mirror::default(),
        store: store.clone(),
    };
    let mut program = Program::new(app, ProgramConfig::threaded());
    let sender = program.sender();
    store.subscribe(Box::new(move |records| {
        sender.send(Msg::Snapshot(records.to_vec()));
    }));

    program.send(Msg::Add("김철수"));
    assert!(program.model().mirror.records.is_empty());

    program.pump_timeout(Duration::from_secs(1));
    assert_eq!(program.model().mirror.updates, 2);
    assert_eq!(program.render(), "김철수\n");
}

#[test]
fn blank_tenant_is_rejected_before_the_store() {
    let store = Arc::new(MemoryStore::new());
    let app = App {
        mirror: Mirror::default(),
        store: store.clone(),
    };
    let mut program = Program::new(app, ProgramConfig::inline());
    program.send(Msg::Add("   "));
    assert!(store.snapshot().is_empty());
    assert_eq!(program.logs(), ["tenant name is empty"]);
}
