//! # partydeck-ai: Bot Players
//!
//! Strategies for playing an answer card and for judging a round, so a match
//! can run without humans (simulations, load tests, filling empty seats).
//!
//! ## Core Components
//!
//! - [`Bot`] - Trait for choosing a card and choosing a winner
//! - [`baseline`] - Deterministic bot for tests and reproducible runs
//! - [`random`] - Seeded random bot
//! - [`create_bot`] - Factory by name
//!
//! ## Quick Start
//!
//! ```rust
//! use partydeck_ai::create_bot;
//! use partydeck_engine::cards::{Card, CardId};
//!
//! let bot = create_bot("baseline", 42).expect("known bot");
//! let hand = vec![Card::new(CardId(1), "a pickle"), Card::new(CardId(2), "a duck")];
//! assert_eq!(bot.choose_card("What do I fear?", &hand), Some(CardId(1)));
//! ```

use partydeck_engine::cards::{Card, CardId};
use partydeck_engine::player::PlayerId;
use partydeck_engine::round::Submission;

pub mod baseline;
pub mod random;

/// Decision-making for an automated player.
pub trait Bot: Send + Sync {
    /// Pick the answer card to play for `question`, or `None` to sit the round out.
    fn choose_card(&self, question: &str, hand: &[Card]) -> Option<CardId>;

    /// As judge, pick the winning submission's player, or `None` for no winner.
    fn choose_winner(&self, question: &str, picks: &[Submission]) -> Option<PlayerId>;

    fn name(&self) -> &str;
}

/// Names accepted by [`create_bot`].
pub const BOT_NAMES: &[&str] = &["baseline", "random"];

/// Build a bot by name. `seed` only matters for randomized bots.
pub fn create_bot(name: &str, seed: u64) -> Option<Box<dyn Bot>> {
    match name {
        "baseline" => Some(Box::new(baseline::BaselineBot::new())),
        "random" => Some(Box::new(random::RandomBot::new(seed))),
        _ => None,
    }
}
