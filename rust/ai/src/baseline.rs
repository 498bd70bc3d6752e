//! Baseline bot: always plays its first card and always crowns the first pick.

use crate::Bot;
use partydeck_engine::cards::{Card, CardId};
use partydeck_engine::player::PlayerId;
use partydeck_engine::round::Submission;

#[derive(Debug, Clone, Default)]
pub struct BaselineBot;

impl BaselineBot {
    pub fn new() -> Self {
        Self
    }
}

impl Bot for BaselineBot {
    fn choose_card(&self, _question: &str, hand: &[Card]) -> Option<CardId> {
        hand.first().map(|card| card.id)
    }

    fn choose_winner(&self, _question: &str, picks: &[Submission]) -> Option<PlayerId> {
        picks.first().map(|pick| pick.player_id.clone())
    }

    fn name(&self) -> &str {
        "BaselineBot"
    }
}
