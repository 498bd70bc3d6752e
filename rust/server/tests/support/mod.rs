#![allow(dead_code)]

use async_trait::async_trait;
use partydeck_engine::deck::CardSequence;
use partydeck_engine::player::{Player, Score};
use partydeck_server::{
    ChannelConnection, Connection, ConnectionError, ConnectionReceiver, Envelope, MatchHandle,
    MatchHandlers, MatchSettings, PlayerHandle, RoundEngine, ServerMessage,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

pub const SEED: u64 = 7;

pub fn answers(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("answer {}", i)).collect()
}

pub fn settings(rounds: Option<usize>) -> MatchSettings {
    MatchSettings {
        rounds,
        seed: Some(SEED),
        ..MatchSettings::default()
    }
}

/// The question deck the engine builds from `questions` under [`SEED`].
pub fn question_deck(questions: &[&str]) -> CardSequence {
    CardSequence::with_seed(questions.iter().copied(), SEED)
}

/// The answer deck the engine builds from `answers` under [`SEED`].
pub fn answer_deck(answers: &[String]) -> CardSequence {
    CardSequence::with_seed(answers.iter().cloned(), SEED.wrapping_add(1))
}

pub fn spawn(
    questions: &[&str],
    answers: Vec<String>,
    settings: MatchSettings,
    handlers: MatchHandlers,
) -> (MatchHandle, JoinHandle<Vec<Score>>) {
    RoundEngine::spawn(
        "test-match",
        questions.iter().copied(),
        answers,
        settings,
        handlers,
    )
    .expect("valid match")
}

/// Judge callback that always picks the player with `nickname`.
pub fn pick_nickname(handlers: MatchHandlers, nickname: &'static str) -> MatchHandlers {
    handlers.with_pick_winner(move |_picks, _judge, roster: Vec<Player>| async move {
        roster
            .into_iter()
            .find(|player| player.nickname == nickname)
            .map(|player| player.id)
    })
}

/// End callback that counts how often it fired.
pub fn count_ends(handlers: MatchHandlers) -> (MatchHandlers, Arc<AtomicUsize>) {
    let ends = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&ends);
    let handlers = handlers.with_on_end(move || {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });
    (handlers, ends)
}

pub struct TestSeat {
    pub player: PlayerHandle,
    pub rx: ConnectionReceiver,
}

pub async fn join(handle: &MatchHandle, nickname: &str) -> TestSeat {
    let (connection, rx) = ChannelConnection::new();
    let player = handle
        .add_player(nickname, Arc::new(connection))
        .await
        .expect("join accepted");
    TestSeat { player, rx }
}

/// Receive messages up to and including the first one matching `pred`.
pub async fn until(
    rx: &mut ConnectionReceiver,
    pred: impl Fn(&ServerMessage) -> bool,
) -> Vec<Envelope> {
    let mut seen = Vec::new();
    loop {
        let envelope = rx.recv().await.expect("connection still open");
        let done = pred(&envelope.message);
        seen.push(envelope);
        if done {
            return seen;
        }
    }
}

/// Everything already delivered, without waiting.
pub fn drain(rx: &mut ConnectionReceiver) -> Vec<Envelope> {
    let mut seen = Vec::new();
    while let Ok(envelope) = rx.try_recv() {
        seen.push(envelope);
    }
    seen
}

/// Everything until the match releases the connection.
pub async fn until_released(rx: &mut ConnectionReceiver) -> Vec<Envelope> {
    let mut seen = Vec::new();
    while let Some(envelope) = rx.recv().await {
        seen.push(envelope);
    }
    seen
}

pub fn is_round_start(message: &ServerMessage) -> bool {
    matches!(message, ServerMessage::RoundStarted { .. })
}

pub fn is_picks(message: &ServerMessage) -> bool {
    matches!(message, ServerMessage::Picks { .. })
}

pub fn is_outcome(message: &ServerMessage) -> bool {
    matches!(message, ServerMessage::Outcome { .. })
}

pub fn kinds(envelopes: &[Envelope]) -> Vec<&'static str> {
    envelopes
        .iter()
        .map(|envelope| match envelope.message {
            ServerMessage::PlayerCount { .. } => "player_count",
            ServerMessage::Started => "started",
            ServerMessage::RoundStarted { .. } => "round_started",
            ServerMessage::Picks { .. } => "picks",
            ServerMessage::Outcome { .. } => "outcome",
            ServerMessage::Promoted => "promoted",
        })
        .collect()
}

/// A connection whose every delivery fails.
#[derive(Debug, Default)]
pub struct UnreachableConnection {
    pub attempts: AtomicUsize,
    pub fail_release: bool,
}

#[async_trait]
impl Connection for UnreachableConnection {
    async fn send(&self, _envelope: &Envelope) -> Result<(), ConnectionError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(ConnectionError::Transport("peer unreachable".into()))
    }

    async fn release(&self) -> Result<(), ConnectionError> {
        if self.fail_release {
            Err(ConnectionError::Transport("peer unreachable".into()))
        } else {
            Ok(())
        }
    }
}
