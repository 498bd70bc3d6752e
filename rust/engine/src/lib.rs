//! # partydeck-engine: Round Game Core
//!
//! Synchronous building blocks for a judge-picks-the-winner party card game.
//! Everything here is plain data plus the invariants that keep a match honest;
//! timing, broadcasting and connection churn live in `partydeck-server`.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card identity and text
//! - [`deck`] - `CardSequence`: draw from the front, recycle to the back
//! - [`ring`] - `PlayerRing`: round-robin judge rotation with live membership
//! - [`player`] - Player state, scores and standings
//! - [`round`] - One round's judge, question and submissions
//! - [`errors`] - Error types for deck, ring and round operations
//!
//! ## Quick Start
//!
//! ```rust
//! use partydeck_engine::deck::CardSequence;
//!
//! let mut answers = CardSequence::with_seed(["a1", "a2", "a3"], 7);
//! let card = answers.draw_top().expect("three cards");
//! assert_eq!(card.value, "a1");
//!
//! // Played cards go to the back of the sequence
//! answers.recycle(card.id).expect("card was drawn from this sequence");
//! assert_eq!(answers.len(), 3);
//! ```
//!
//! ## Judge Rotation
//!
//! ```rust
//! use partydeck_engine::player::PlayerId;
//! use partydeck_engine::ring::PlayerRing;
//!
//! let mut ring = PlayerRing::new();
//! ring.add_entry(PlayerId::from("p1"), "Ada").unwrap();
//! ring.add_entry(PlayerId::from("p2"), "Bo").unwrap();
//!
//! assert_eq!(ring.advance().map(|(_, name)| *name), Some("Ada"));
//! assert_eq!(ring.advance().map(|(_, name)| *name), Some("Bo"));
//! assert_eq!(ring.advance().map(|(_, name)| *name), Some("Ada"));
//! ```

pub mod cards;
pub mod deck;
pub mod errors;
pub mod player;
pub mod ring;
pub mod round;
