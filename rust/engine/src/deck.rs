use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::cards::{Card, CardId};
use crate::errors::GameError;

/// Ordered card pile. Cards leave from the front and come back at the back.
///
/// The sequence remembers every card it was built with, so the set of ids in
/// the pile plus the ids currently drawn out of it never changes.
#[derive(Debug)]
pub struct CardSequence {
    cards: VecDeque<Card>,
    values: HashMap<CardId, String>,
    outstanding: HashSet<CardId>,
    rng: ChaCha20Rng,
}

impl CardSequence {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_seed(values, rand::random())
    }

    pub fn with_seed<I, S>(values: I, seed: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut ids = HashMap::new();
        let mut cards = VecDeque::new();
        for value in values {
            let value = value.into();
            let id = loop {
                let candidate = CardId(rng.random());
                if !ids.contains_key(&candidate) {
                    break candidate;
                }
            };
            ids.insert(id, value.clone());
            cards.push_back(Card { id, value });
        }
        Self {
            cards,
            values: ids,
            outstanding: HashSet::new(),
            rng,
        }
    }

    pub fn draw_top(&mut self) -> Option<Card> {
        let card = self.cards.pop_front()?;
        self.outstanding.insert(card.id);
        Some(card)
    }

    /// Put a previously drawn card at the back of the sequence.
    pub fn recycle(&mut self, id: CardId) -> Result<(), GameError> {
        let value = self.values.get(&id).ok_or(GameError::UnknownCard(id))?;
        if !self.outstanding.remove(&id) {
            return Err(GameError::CardNotOutstanding(id));
        }
        self.cards.push_back(Card {
            id,
            value: value.clone(),
        });
        Ok(())
    }

    pub fn value_of(&self, id: CardId) -> Result<&str, GameError> {
        self.values
            .get(&id)
            .map(String::as_str)
            .ok_or(GameError::UnknownCard(id))
    }

    pub fn shuffle(&mut self) {
        self.cards.make_contiguous().shuffle(&mut self.rng);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Number of cards drawn and not yet recycled.
    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    /// Every id this sequence was built with, in no particular order.
    pub fn card_ids(&self) -> impl Iterator<Item = CardId> + '_ {
        self.values.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }
}
