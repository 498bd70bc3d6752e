use crate::cards::CardId;
use crate::player::PlayerId;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Card {0} was never part of this sequence")]
    UnknownCard(CardId),
    #[error("Card {0} is already in the sequence")]
    CardNotOutstanding(CardId),
    #[error("Player id already present: {0}")]
    DuplicateId(PlayerId),
    #[error("The judge ({0}) cannot submit a card")]
    JudgeCannotSubmit(PlayerId),
    #[error("Player {0} already submitted this round")]
    AlreadySubmitted(PlayerId),
}
