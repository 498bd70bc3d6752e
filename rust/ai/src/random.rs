//! Seeded random bot. Reproducible for a given seed and call sequence.

use crate::Bot;
use partydeck_engine::cards::{Card, CardId};
use partydeck_engine::player::PlayerId;
use partydeck_engine::round::Submission;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::sync::Mutex;

#[derive(Debug)]
pub struct RandomBot {
    rng: Mutex<ChaCha20Rng>,
}

impl RandomBot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha20Rng::seed_from_u64(seed)),
        }
    }

    fn pick<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        // a poisoned rng is still a usable rng
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        items.choose(&mut *rng)
    }
}

impl Bot for RandomBot {
    fn choose_card(&self, _question: &str, hand: &[Card]) -> Option<CardId> {
        self.pick(hand).map(|card| card.id)
    }

    fn choose_winner(&self, _question: &str, picks: &[Submission]) -> Option<PlayerId> {
        self.pick(picks).map(|pick| pick.player_id.clone())
    }

    fn name(&self) -> &str {
        "RandomBot"
    }
}
