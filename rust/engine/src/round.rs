use crate::cards::{Card, CardId};
use crate::errors::GameError;
use crate::player::PlayerId;
use serde::{Deserialize, Serialize};

/// An answer card played into the current round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub card_id: CardId,
    pub player_id: PlayerId,
    pub value: String,
}

/// One round: who judges, what was asked, and what came back.
#[derive(Debug, Clone)]
pub struct Round {
    index: usize,
    judge: PlayerId,
    question: Card,
    submissions: Vec<Submission>,
    winner: Option<PlayerId>,
}

impl Round {
    pub fn new(index: usize, judge: PlayerId, question: Card) -> Self {
        Self {
            index,
            judge,
            question,
            submissions: Vec::new(),
            winner: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn judge(&self) -> &PlayerId {
        &self.judge
    }

    pub fn question(&self) -> &Card {
        &self.question
    }

    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    pub fn winner(&self) -> Option<&PlayerId> {
        self.winner.as_ref()
    }

    /// Whether `player` may still play a card this round.
    pub fn check_submitter(&self, player: &PlayerId) -> Result<(), GameError> {
        if *player == self.judge {
            return Err(GameError::JudgeCannotSubmit(player.clone()));
        }
        if self.submissions.iter().any(|s| s.player_id == *player) {
            return Err(GameError::AlreadySubmitted(player.clone()));
        }
        Ok(())
    }

    pub fn accept(&mut self, submission: Submission) -> Result<(), GameError> {
        self.check_submitter(&submission.player_id)?;
        self.submissions.push(submission);
        Ok(())
    }

    /// Everyone but the judge has played, given the current live player count.
    pub fn is_complete(&self, live_players: usize) -> bool {
        self.submissions.len() + 1 >= live_players
    }

    pub fn set_winner(&mut self, winner: Option<PlayerId>) {
        self.winner = winner;
    }
}
