//! End-to-end scenarios for the rotation engine.
//!
//! Each test runs against a scratch directory holding a real catalog and
//! state file, with a recording transport standing in for the chat.

// Integration tests use unwrap extensively for clarity -- panicking on
// failure is the correct behavior in test code.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::panic,
    clippy::missing_panics_doc
)]

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::TimeDelta;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rollcall_core::config::RollcallConfig;
use rollcall_core::{
    Catalog, Cooldown, Engine, EngineError, Orchestrator, OrchestratorError, ParticipantId,
    StateStore, Transport, TransportError,
};

/// Records every delivery instead of sending it anywhere.
#[derive(Debug, Default)]
struct Recorder {
    sent: Mutex<Vec<(String, bool)>>,
}

impl Recorder {
    fn sent(&self) -> Vec<(String, bool)> {
        self.sent.lock().unwrap().clone()
    }
}

impl Transport for Recorder {
    async fn deliver(&self, text: &str, rich_formatting: bool) -> Result<(), TransportError> {
        self.sent
            .lock()
            .unwrap()
            .push((text.to_owned(), rich_formatting));
        Ok(())
    }
}

/// Refuses every delivery.
#[derive(Debug)]
struct Refuser;

impl Transport for Refuser {
    async fn deliver(&self, _text: &str, _rich_formatting: bool) -> Result<(), TransportError> {
        Err(TransportError::Rejected {
            message: "chat not found".to_owned(),
        })
    }
}

struct Scratch {
    dir: PathBuf,
}

impl Scratch {
    fn new(label: &str) -> Self {
        let dir = std::env::temp_dir().join(format!(
            "rollcall_scenario_{label}_{}_{:?}",
            std::process::id(),
            std::thread::current().id(),
        ));
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(dir.join("messages_lists")).unwrap();
        Self { dir }
    }

    fn write_category(&self, name: &str, templates: &[&str]) {
        let path = self
            .dir
            .join("messages_lists")
            .join(format!("messages_{name}.json"));
        std::fs::write(path, serde_json::to_string(templates).unwrap()).unwrap();
    }

    fn state_file(&self) -> PathBuf {
        self.dir.join("state.json")
    }

    fn messages_dir(&self) -> PathBuf {
        self.dir.join("messages_lists")
    }

    async fn engine(&self, cooldown: TimeDelta, seed: u64) -> Engine {
        let catalog = Catalog::load_dir(&self.messages_dir()).await.unwrap();
        Engine::restore(
            catalog,
            StateStore::new(self.state_file()),
            Cooldown::new(cooldown),
            StdRng::seed_from_u64(seed),
        )
        .await
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.dir).ok();
    }
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn greet_scenario_delivers_rich_text_and_persists() {
    let scratch = Scratch::new("greet");
    scratch.write_category("greet", &["Hi {name}!"]);
    let engine = Arc::new(scratch.engine(TimeDelta::minutes(30), 1).await);

    engine
        .observe_identity(&ParticipantId::from("u1"), "Alice")
        .await;
    let orchestrator = Orchestrator::new(Arc::clone(&engine), Recorder::default());
    let emission = orchestrator.post(Some("greet")).await.unwrap();

    assert_eq!(emission.text, "Hi Alice!");
    assert_eq!(
        orchestrator.transport().sent(),
        vec![("Hi Alice!".to_owned(), true)]
    );

    let state = read_json(&scratch.state_file());
    assert_eq!(state["participants"]["u1"], "Alice");
    assert_eq!(state["shuffled_participants"], serde_json::json!([]));
    assert_eq!(state["shuffled_messages"]["greet"], serde_json::json!([]));
}

#[tokio::test]
async fn second_request_inside_cooldown_is_refused() {
    let scratch = Scratch::new("cooldown");
    scratch.write_category("greet", &["Hi {name}!"]);
    let engine = Arc::new(scratch.engine(TimeDelta::minutes(30), 2).await);
    engine
        .observe_identity(&ParticipantId::from("u1"), "Alice")
        .await;
    let orchestrator = Orchestrator::new(Arc::clone(&engine), Recorder::default());

    orchestrator.post(None).await.unwrap();
    let err = orchestrator.post(None).await.unwrap_err();
    assert!(matches!(
        err,
        OrchestratorError::Engine(EngineError::RateLimited { .. })
    ));
    assert_eq!(orchestrator.transport().sent().len(), 1);
    assert!(engine.cooldown_remaining().await.is_some());
}

#[tokio::test]
async fn progress_survives_a_restart() {
    let scratch = Scratch::new("restart");
    scratch.write_category("greet", &["A {name}", "B {name}", "C {name}"]);

    let mut named = BTreeSet::new();
    let mut used = BTreeSet::new();
    {
        let engine = scratch.engine(TimeDelta::zero(), 3).await;
        for (id, label) in [("u1", "Alice"), ("u2", "Bob"), ("u3", "Carol")] {
            engine.observe_identity(&ParticipantId::from(id), label).await;
        }
        let emission = engine.request_emission(Some("greet")).await.unwrap();
        named.insert(emission.participant.label);
        used.insert(emission.template);
    }

    let engine = scratch.engine(TimeDelta::zero(), 99).await;
    let restored = engine.snapshot().await;
    assert_eq!(restored.participants.len(), 3);
    assert_eq!(restored.participant_queue.len(), 2);

    for _ in 0..2 {
        let emission = engine.request_emission(Some("greet")).await.unwrap();
        named.insert(emission.participant.label);
        used.insert(emission.template);
    }
    assert_eq!(named.len(), 3, "every participant named once per pass");
    assert_eq!(used.len(), 3, "every template used once per pass");
}

#[tokio::test]
async fn restart_drops_templates_removed_from_the_catalog() {
    let scratch = Scratch::new("stale");
    scratch.write_category("greet", &["A {name}", "B {name}", "C {name}"]);
    scratch.write_category("cheer", &["Go {name}"]);
    {
        let engine = scratch.engine(TimeDelta::zero(), 4).await;
        engine
            .observe_identity(&ParticipantId::from("u1"), "Alice")
            .await;
        engine.emit("greet").await.unwrap();
        engine.emit("cheer").await.unwrap();
    }

    scratch.write_category("greet", &["A {name}"]);
    std::fs::remove_file(scratch.messages_dir().join("messages_cheer.json")).unwrap();

    let engine = scratch.engine(TimeDelta::zero(), 5).await;
    let snapshot = engine.snapshot().await;
    assert!(!snapshot.message_queues.contains_key("cheer"));
    assert!(
        snapshot.message_queues["greet"]
            .iter()
            .all(|template| template == "A {name}")
    );
    assert!(matches!(
        engine.emit("cheer").await,
        Err(EngineError::NotFound { .. })
    ));

    let on_disk = read_json(&scratch.state_file());
    assert!(on_disk["shuffled_messages"].get("cheer").is_none());
}

#[tokio::test]
async fn unwritable_state_file_keeps_memory_authoritative() {
    let scratch = Scratch::new("unwritable");
    scratch.write_category("greet", &["Hi {name}!", "Yo {name}"]);
    std::fs::create_dir_all(scratch.state_file().join("blocker")).unwrap();
    let engine = scratch.engine(TimeDelta::minutes(30), 9).await;

    assert!(
        engine
            .observe_identity(&ParticipantId::from("u1"), "Alice")
            .await
    );
    let emission = engine.request_emission(Some("greet")).await.unwrap();
    assert_eq!(emission.participant.label, "Alice");

    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.participants.len(), 1);
    assert_eq!(snapshot.message_queues["greet"].len(), 1);
    assert!(engine.cooldown_remaining().await.is_some());

    assert!(matches!(
        engine.flush().await,
        Err(EngineError::Persistence(_))
    ));
    assert!(scratch.state_file().is_dir());
}

#[tokio::test]
async fn failed_delivery_still_spends_the_turn() {
    let scratch = Scratch::new("refused");
    scratch.write_category("greet", &["Hi {name}!"]);
    let engine = Arc::new(scratch.engine(TimeDelta::minutes(30), 6).await);
    engine
        .observe_identity(&ParticipantId::from("u1"), "Alice")
        .await;
    let orchestrator = Orchestrator::new(Arc::clone(&engine), Refuser);

    let err = orchestrator.post(Some("greet")).await.unwrap_err();
    assert!(matches!(err, OrchestratorError::Delivery { ref category, .. } if category == "greet"));
    assert!(engine.cooldown_remaining().await.is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_pass_the_gate_once() {
    let scratch = Scratch::new("race");
    scratch.write_category("greet", &["Hi {name}!", "Hey {name}!"]);
    let engine = Arc::new(scratch.engine(TimeDelta::minutes(30), 7).await);
    engine
        .observe_identity(&ParticipantId::from("u1"), "Alice")
        .await;

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.request_emission(Some("greet")).await })
        })
        .collect();

    let mut granted = 0_u32;
    let mut limited = 0_u32;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => granted += 1,
            Err(EngineError::RateLimited { .. }) => limited += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(granted, 1);
    assert_eq!(limited, 15);
}

#[tokio::test]
async fn missing_state_file_is_created_from_defaults() {
    let scratch = Scratch::new("fresh");
    scratch.write_category("greet", &["Hi {name}!"]);
    let mut config = RollcallConfig::default();
    config.storage.state_file = scratch.state_file();
    config.storage.messages_dir = scratch.messages_dir();

    let engine = Engine::open(&config).await.unwrap();
    assert_eq!(engine.list_categories(), vec!["greet"]);
    assert!(engine.snapshot().await.participants.is_empty());
    assert!(scratch.state_file().exists());
}

#[tokio::test]
async fn corrupt_state_file_is_left_alone() {
    let scratch = Scratch::new("corrupt");
    scratch.write_category("greet", &["Hi {name}!"]);
    std::fs::write(scratch.state_file(), "{ not json").unwrap();

    let engine = scratch.engine(TimeDelta::zero(), 8).await;
    assert!(engine.snapshot().await.participants.is_empty());
    assert_eq!(
        std::fs::read_to_string(scratch.state_file()).unwrap(),
        "{ not json"
    );
}
