use crate::cards::{Card, CardId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Cards dealt to a player on joining; submissions keep the hand at this size.
pub const HAND_SIZE: usize = 4;

/// A match needs at least this many live players to start or keep running.
pub const MIN_PLAYERS: usize = 3;

#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A seated player: identity, admin flag, hand and the question cards won so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub nickname: String,
    pub is_admin: bool,
    pub cards_won: BTreeSet<CardId>,
    pub hand: Vec<Card>,
}

impl Player {
    pub fn new(id: PlayerId, nickname: impl Into<String>, hand: Vec<Card>) -> Self {
        Self {
            id,
            nickname: nickname.into(),
            is_admin: false,
            cards_won: BTreeSet::new(),
            hand,
        }
    }

    pub fn wins(&self) -> usize {
        self.cards_won.len()
    }

    /// Record a won question card. Returns false if it was already counted.
    pub fn award(&mut self, question: CardId) -> bool {
        self.cards_won.insert(question)
    }

    pub fn holds(&self, card: CardId) -> bool {
        self.hand.iter().any(|c| c.id == card)
    }

    /// Remove a card from the hand, if held.
    pub fn take_card(&mut self, card: CardId) -> Option<Card> {
        let position = self.hand.iter().position(|c| c.id == card)?;
        Some(self.hand.remove(position))
    }
}

/// Final tally for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub player_id: PlayerId,
    pub nickname: String,
    pub wins: usize,
    pub cards_won: Vec<CardId>,
}

impl From<&Player> for Score {
    fn from(player: &Player) -> Self {
        Self {
            player_id: player.id.clone(),
            nickname: player.nickname.clone(),
            wins: player.wins(),
            cards_won: player.cards_won.iter().copied().collect(),
        }
    }
}

/// Scores ordered by wins, highest first. Ties keep the order they came in.
pub fn standings<'a>(players: impl IntoIterator<Item = &'a Player>) -> Vec<Score> {
    let mut scores: Vec<Score> = players.into_iter().map(Score::from).collect();
    scores.sort_by(|a, b| b.wins.cmp(&a.wins));
    scores
}
