//! Deterministic-random fallback used whenever a decision is unavailable or invalid.
//!
//! Picks uniformly among mine, woodcut and move. Gathering picks one of the
//! three valid resources; moving nudges the NPC away from map edges and
//! otherwise wanders by up to `margin` per axis. The output always
//! validates, so the fallback never needs a fallback of its own.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::action::{Action, ActionKind, Decision};
use crate::roster::{ORES, WOODS};
use crate::types::{Location, MAP_SIZE, MAX_COORD};

const FALLBACK_KINDS: [ActionKind; 3] = [ActionKind::Mine, ActionKind::Woodcut, ActionKind::Move];

/// Produce a structurally valid decision for an NPC standing at `location`.
pub fn default_decision(location: &Location, margin: f64, rng: &mut impl Rng) -> Decision {
    let kind = *FALLBACK_KINDS.choose(rng).unwrap_or(&ActionKind::Move);
    let action = match kind {
        ActionKind::Mine => Action::Mine {
            resource: pick_name(&ORES.map(|r| r.name), rng),
        },
        ActionKind::Woodcut => Action::Woodcut {
            resource: pick_name(&WOODS.map(|r| r.name), rng),
        },
        _ => {
            let (x, y) = wander_target(location, margin, rng);
            Action::Move { x, y }
        }
    };
    Decision {
        action,
        reason: format!("Falling back to default {kind} behavior"),
    }
}

fn pick_name(names: &[&'static str], rng: &mut impl Rng) -> String {
    names.choose(rng).copied().unwrap_or_default().to_string()
}

/// Integer move target: pushed `margin` inward near an edge, otherwise a
/// random offset in `[-margin, +margin]`, clamped to `[0, 99]`.
#[allow(clippy::cast_possible_truncation)]
fn wander_target(location: &Location, margin: f64, rng: &mut impl Rng) -> (f64, f64) {
    let spread = margin.floor().max(0.0) as i64;
    let mut axis = |v: f64| -> f64 {
        let next = if v < margin {
            v + margin
        } else if v > MAP_SIZE - margin {
            v - margin
        } else {
            #[allow(clippy::cast_precision_loss)]
            let offset = rng.gen_range(-spread..=spread) as f64;
            v + offset
        };
        next.floor().clamp(0.0, MAX_COORD)
    };
    let x = axis(location.x);
    let y = axis(location.y);
    (x, y)
}
