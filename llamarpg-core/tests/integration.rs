//! Integration tests: end-to-end world flows
//!
//! These tests drive the public API only: config loading, world
//! construction, ticks against scripted decision sources, and the
//! read-only queries an operator console relies on.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use llamarpg_core::config::SimConfig;
use llamarpg_core::decision::{DecisionRequest, DecisionSource};
use llamarpg_core::npc::{Npc, Specialization};
use llamarpg_core::roster::NpcDefinition;
use llamarpg_core::tick::UpdateOutcome;
use llamarpg_core::{Location, RawDecision, World, WorldContext};
use tokio::time::Instant;

fn npc(id: &str, name: &str, x: f64, y: f64) -> Npc {
    let def = NpcDefinition::new(id, name, "Tester", "plain");
    Npc::new(&def, Location::new(x, y), Specialization::uniform(0.5), 10, Instant::now())
}

fn eager() -> SimConfig {
    let mut config = SimConfig::default();
    config.world.decision_interval_ms = 0;
    config.world.action_cooldown_ms = 0;
    config
}

/// Everyone trades with the next NPC in a ring.
struct RingTrader {
    ids: Vec<String>,
}

impl DecisionSource for RingTrader {
    type Error = String;

    async fn decide(&self, request: DecisionRequest) -> Result<RawDecision, String> {
        let pos = self
            .ids
            .iter()
            .position(|id| id == request.id.as_str())
            .ok_or_else(|| format!("unknown npc {}", request.id))?;
        let partner = &self.ids[(pos + 1) % self.ids.len()];
        Ok(RawDecision::new("trade", partner, "ring trade"))
    }
}

// ---------------------------------------------------------------------------
// Config → world
// ---------------------------------------------------------------------------

#[test]
fn config_file_roster_drives_world() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(
        file,
        r#"
[world]
perception_radius = 15.0

[[npcs]]
id = "smith"
name = "Smith"
role = "Blacksmith"
personality = "Gruff but fair."

[[npcs]]
id = "scout"
name = "Scout"
role = "Explorer"
personality = "Restless."
"#
    )
    .expect("write");

    let config = SimConfig::from_file(file.path()).expect("config loads");
    assert!((config.world.perception_radius - 15.0).abs() < f64::EPSILON);
    let world = World::new(config, Some(99)).expect("world");
    assert_eq!(world.len(), 2);
    assert_eq!(world.name_of("scout"), Some("Scout"));

    for status in world.status() {
        assert!(status.location.x >= 0.0 && status.location.x < 100.0);
        assert!(status.location.y >= 0.0 && status.location.y < 100.0);
        assert!(status.inventory.is_empty());
        assert!(status.current_task.is_none());
    }
}

#[test]
fn same_seed_same_spawn() {
    let a = World::new(SimConfig::default(), Some(7)).expect("world");
    let b = World::new(SimConfig::default(), Some(7)).expect("world");
    let la: Vec<_> = a.status().into_iter().map(|s| s.location).collect();
    let lb: Vec<_> = b.status().into_iter().map(|s| s.location).collect();
    assert_eq!(la, lb);
}

// ---------------------------------------------------------------------------
// Ticks
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_ring_trades_conserve_items() {
    let ids: Vec<String> = (0..8).map(|i| format!("npc{i}")).collect();
    let npcs = ids
        .iter()
        .enumerate()
        .map(|(i, id)| {
            #[allow(clippy::cast_precision_loss)]
            let mut n = npc(id, id, 50.0 + (i % 2) as f64, 50.0);
            n.inventory.add(if i % 2 == 0 { "copper_ore" } else { "oak_wood" }, 20);
            n
        })
        .collect();
    let world = Arc::new(World::from_npcs(eager(), npcs, 5).expect("world"));
    let source = Arc::new(RingTrader { ids: ids.clone() });

    for _ in 0..10 {
        let report = world.tick(&source, WorldContext::default()).await;
        assert_eq!(report.crashed, 0);
    }

    let total: u32 = world
        .npcs()
        .iter()
        .map(|n| n.inventory.iter().map(|(_, q)| q).sum::<u32>())
        .sum();
    assert_eq!(total, 160);
    let traded = world.recent_events(100).iter().filter(|e| e.contains(" traded ")).count();
    assert!(traded > 0);
    for n in world.npcs() {
        for (_, score) in n.relationships.iter() {
            assert!(score <= 100);
        }
    }
}

#[tokio::test(start_paused = true)]
async fn default_cadence_waits_three_seconds() {
    let world = Arc::new(World::from_npcs(SimConfig::default(), vec![npc("a", "A", 5.0, 5.0)], 1).expect("world"));
    let calls = Arc::new(Counter(AtomicUsize::new(0)));

    world.tick(&calls, WorldContext::default()).await;
    assert_eq!(calls.0.load(Ordering::SeqCst), 0);

    tokio::time::advance(std::time::Duration::from_millis(3000)).await;
    world.tick(&calls, WorldContext::default()).await;
    assert_eq!(calls.0.load(Ordering::SeqCst), 1);

    tokio::time::advance(std::time::Duration::from_millis(1000)).await;
    world.tick(&calls, WorldContext::default()).await;
    assert_eq!(calls.0.load(Ordering::SeqCst), 1);
}

struct Counter(AtomicUsize);

impl DecisionSource for Counter {
    type Error = String;

    async fn decide(&self, _request: DecisionRequest) -> Result<RawDecision, String> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(RawDecision::new("mine", "iron_ore", "need iron"))
    }
}

#[tokio::test(start_paused = true)]
async fn single_update_sets_current_task() {
    let world = World::from_npcs(eager(), vec![npc("a", "A", 5.0, 5.0)], 1).expect("world");
    let source = Counter(AtomicUsize::new(0));
    let outcome = world
        .update_npc("a", &source, WorldContext::default(), Instant::now())
        .await;
    assert!(matches!(outcome, Some(UpdateOutcome::Decided(_))));
    assert_eq!(world.npc("a").expect("a").current_task.as_deref(), Some("mine iron_ore"));
    assert!(world.update_npc("nobody", &source, WorldContext::default(), Instant::now()).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn context_reaches_the_source() {
    struct Night(AtomicUsize);
    impl DecisionSource for Night {
        type Error = String;
        async fn decide(&self, request: DecisionRequest) -> Result<RawDecision, String> {
            if request.context.time_of_day == llamarpg_core::TimeOfDay::Night {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
            Ok(RawDecision::new("woodcut", "oak_wood", "night shift"))
        }
    }
    let world = Arc::new(World::from_npcs(eager(), vec![npc("a", "A", 5.0, 5.0)], 1).expect("world"));
    let source = Arc::new(Night(AtomicUsize::new(0)));
    let ctx = WorldContext {
        time_of_day: llamarpg_core::TimeOfDay::Night,
    };
    world.tick(&source, ctx).await;
    assert_eq!(source.0.load(Ordering::SeqCst), 1);
}
