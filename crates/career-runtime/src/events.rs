//! Year-end world events and the deck that deals them.

use career_core::{EventMode, StatDelta};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldEvent {
    pub id: String,
    pub title: String,
    pub effect: StatDelta,
}

fn event(id: &str, title: &str, effect: StatDelta) -> WorldEvent {
    WorldEvent {
        id: id.to_string(),
        title: title.to_string(),
        effect,
    }
}

/// The fixed event list, in rotation order.
pub fn standard_events() -> Vec<WorldEvent> {
    vec![
        event(
            "market-boom",
            "Tech hiring boom",
            StatDelta {
                money: Some(3_000),
                reputation: Some(10),
                ..StatDelta::default()
            },
        ),
        event(
            "layoff-rumors",
            "Layoff rumors sweep the industry",
            StatDelta {
                stress: Some(10),
                ..StatDelta::default()
            },
        ),
        event(
            "conference-talk",
            "Invited to speak at a conference",
            StatDelta {
                reputation: Some(25),
                energy: Some(-10),
                ..StatDelta::default()
            },
        ),
        event(
            "medical-bill",
            "Unexpected medical bill",
            StatDelta {
                money: Some(-2_500),
                stress: Some(5),
                ..StatDelta::default()
            },
        ),
        event(
            "open-source-hit",
            "Your side project goes viral",
            StatDelta {
                coding: Some(20),
                reputation: Some(15),
                ..StatDelta::default()
            },
        ),
        event(
            "holiday",
            "A long holiday with family",
            StatDelta {
                energy: Some(20),
                stress: Some(-15),
                money: Some(-1_500),
                ..StatDelta::default()
            },
        ),
        event("quiet-year", "A quiet year", StatDelta::default()),
    ]
}

/// Deals one event per settlement. The cursor is explicit state so a
/// session can be saved and replayed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDeck {
    pub mode: EventMode,
    /// Events dealt so far.
    pub cursor: u64,
}

impl EventDeck {
    pub fn new(mode: EventMode) -> Self {
        Self { mode, cursor: 0 }
    }

    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> WorldEvent {
        let mut events = standard_events();
        let idx = match self.mode {
            EventMode::Rotating => (self.cursor % events.len() as u64) as usize,
            EventMode::Random => rng.gen_range(0..events.len()),
        };
        self.cursor += 1;
        events.swap_remove(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn rotating_deck_walks_in_order() {
        let mut deck = EventDeck::new(EventMode::Rotating);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let all = standard_events();
        let ids: Vec<String> = (0..all.len() + 1).map(|_| deck.draw(&mut rng).id).collect();
        assert_eq!(ids[0], "market-boom");
        assert_eq!(ids[all.len() - 1], "quiet-year");
        assert_eq!(ids[all.len()], "market-boom");
        assert_eq!(deck.cursor, all.len() as u64 + 1);
    }

    #[test]
    fn random_deck_replays_with_seed() {
        let draw = |seed| {
            let mut deck = EventDeck::new(EventMode::Random);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            (0..10).map(|_| deck.draw(&mut rng).id).collect::<Vec<_>>()
        };
        assert_eq!(draw(8), draw(8));
    }

    #[test]
    fn independent_decks_do_not_share_state() {
        let mut a = EventDeck::new(EventMode::Rotating);
        let b = EventDeck::new(EventMode::Rotating);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        a.draw(&mut rng);
        assert_eq!(a.cursor, 1);
        assert_eq!(b.cursor, 0);
    }
}
