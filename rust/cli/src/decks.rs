//! Card decks for simulated matches: the built-in sample game or plain-text
//! files with one card per line.

use crate::error::CliError;
use std::fs;
use std::path::Path;

pub const SAMPLE_QUESTIONS: &[&str] = &[
    "What's the secret ingredient in grandma's famous soup?",
    "The new museum exhibit is entirely dedicated to ____.",
    "What ruined the company picnic?",
];

pub const SAMPLE_ANSWERS: &[&str] = &[
    "A suspiciously friendly goose",
    "Tax fraud",
    "Interpretive dance",
    "A single wet sock",
    "The entire cast of a musical",
    "Expired yogurt",
    "An unsolicited TED talk",
    "Three raccoons in a trench coat",
    "Competitive napping",
    "A haunted spreadsheet",
    "Too much glitter",
    "A dramatic reading of the terms and conditions",
    "Uncle Steve's new podcast",
    "A motivational llama",
    "Mild disappointment",
    "The group chat",
    "Pineapple on everything",
    "An accidental reply-all",
    "A sentient vending machine",
    "Bagpipes at dawn",
    "Socks with sandals",
    "A very long voicemail",
    "The last slice of pizza",
    "A pigeon with a grudge",
    "Decaf coffee",
    "Someone's cryptocurrency pitch",
    "A surprise karaoke session",
    "A lukewarm bath",
    "Overconfident assembly instructions",
    "An inflatable dinosaur costume",
    "The printer, as usual",
    "A pop quiz",
    "Aggressive mime",
    "Forty-seven cats",
    "The wrong kind of cheese",
    "A motivational poster",
    "Gravity",
];

/// Read a deck file: one card per line, blank lines and `#` comments skipped.
pub fn load_deck(path: &Path) -> Result<Vec<String>, CliError> {
    let text = fs::read_to_string(path)?;
    let cards: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect();
    if cards.is_empty() {
        return Err(CliError::InvalidInput(format!(
            "deck file {} has no cards",
            path.display()
        )));
    }
    Ok(cards)
}

pub fn sample_questions() -> Vec<String> {
    SAMPLE_QUESTIONS.iter().map(|q| q.to_string()).collect()
}

pub fn sample_answers() -> Vec<String> {
    SAMPLE_ANSWERS.iter().map(|a| a.to_string()).collect()
}
