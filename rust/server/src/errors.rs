//! Error types for match orchestration and player connections.
//!
//! - [`MatchError`] - everything a caller of `MatchHandle`/`PlayerHandle` can get back
//! - [`ConnectionError`] - delivery or release failures reported by a `Connection`
use partydeck_engine::cards::CardId;
use partydeck_engine::errors::GameError;
use partydeck_engine::player::PlayerId;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// The decks cannot support the requested match; detected at construction.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// Not enough answer cards left to deal a starting hand.
    #[error("Join rejected: need {needed} answer cards, {available} available")]
    JoinRejected { needed: usize, available: usize },
    #[error("Match already started")]
    AlreadyStarted,
    #[error("Unknown player: {0}")]
    UnknownPlayer(PlayerId),
    #[error("Card {0} is not in the player's hand")]
    CardNotInHand(CardId),
    #[error("Answer deck exhausted")]
    DeckExhausted,
    #[error(transparent)]
    Game(#[from] GameError),
    /// The match task is gone (ended or dropped).
    #[error("Match is closed")]
    Closed,
}

impl MatchError {
    /// Machine-readable code for logs and client replies.
    pub fn code(&self) -> &'static str {
        match self {
            MatchError::Configuration(_) => "configuration",
            MatchError::JoinRejected { .. } => "join_rejected",
            MatchError::AlreadyStarted => "already_started",
            MatchError::UnknownPlayer(_) => "unknown_player",
            MatchError::CardNotInHand(_) => "card_not_in_hand",
            MatchError::DeckExhausted => "deck_exhausted",
            MatchError::Game(GameError::UnknownCard(_)) => "unknown_card",
            MatchError::Game(GameError::CardNotOutstanding(_)) => "card_not_outstanding",
            MatchError::Game(GameError::DuplicateId(_)) => "duplicate_id",
            MatchError::Game(GameError::JudgeCannotSubmit(_)) => "judge_cannot_submit",
            MatchError::Game(GameError::AlreadySubmitted(_)) => "already_submitted",
            MatchError::Closed => "closed",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("Connection closed")]
    Closed,
    #[error("Transport error: {0}")]
    Transport(String),
}
