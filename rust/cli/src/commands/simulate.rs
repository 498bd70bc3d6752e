//! `simulate`: run a complete match locally with bot players.
//!
//! The match is created through a [`MatchRegistry`] like any hosted match.
//! Each seat is a bot behind an in-process [`ChannelConnection`], and the
//! judge's pick comes from a bot of the same kind. The report is built from
//! the broadcasts the first seat received, so it shows exactly what a player
//! would have seen.

use crate::cli::BotKind;
use crate::config;
use crate::decks;
use crate::error::CliError;
use crate::output;
use partydeck_ai::{Bot, create_bot};
use partydeck_engine::player::{HAND_SIZE, MIN_PLAYERS, Score};
use partydeck_engine::round::Submission;
use partydeck_server::{
    ChannelConnection, ConnectionReceiver, Envelope, MatchHandlers, MatchRegistry, MatchSettings,
    NOBODY, PlayerHandle, ServerMessage,
};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

const MAX_PLAYERS: usize = 16;

#[derive(Debug, Clone, Default)]
pub struct SimulateArgs {
    pub players: usize,
    pub rounds: Option<usize>,
    pub bot: Option<BotKind>,
    pub seed: Option<u64>,
    pub pick_timeout: Option<u64>,
    pub round_delay: Option<u64>,
    pub shuffle: bool,
    pub questions: Option<PathBuf>,
    pub answers: Option<PathBuf>,
    pub json: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RoundReport {
    pub round: usize,
    pub question: String,
    pub judge: String,
    pub picks: usize,
    pub winner: String,
    pub answer: Option<String>,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    code: &'a str,
    bot: &'a str,
    seed: u64,
    rounds: &'a [RoundReport],
    standings: &'a [Score],
}

struct Played {
    code: String,
    rounds: Vec<RoundReport>,
    standings: Vec<Score>,
}

pub fn handle_simulate_command(
    args: SimulateArgs,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let mut cfg = match config::load_with_sources() {
        Ok(resolved) => resolved.config,
        Err(e) => {
            output::error(err, &format!("Invalid configuration: {}", e))?;
            return Err(CliError::Config(e.to_string()));
        }
    };
    if let Some(bot) = args.bot {
        cfg.bot = bot.as_str().to_string();
    }
    if let Some(seed) = args.seed {
        cfg.seed = Some(seed);
    }
    if let Some(secs) = args.pick_timeout {
        cfg.pick_timeout_secs = secs;
    }
    if let Some(secs) = args.round_delay {
        cfg.round_delay_secs = secs;
    }
    if args.shuffle {
        cfg.shuffle = true;
    }
    config::validate(&cfg).map_err(|e| CliError::InvalidInput(e.to_string()))?;

    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&args.players) {
        return Err(CliError::InvalidInput(format!(
            "--players must be between {} and {}",
            MIN_PLAYERS, MAX_PLAYERS
        )));
    }

    let questions = match &args.questions {
        Some(path) => decks::load_deck(path)?,
        None => decks::sample_questions(),
    };
    let answers = match &args.answers {
        Some(path) => decks::load_deck(path)?,
        None => decks::sample_answers(),
    };
    let needed = args.players * HAND_SIZE;
    if answers.len() < needed {
        return Err(CliError::InvalidInput(format!(
            "{} players need at least {} answer cards, deck has {}",
            args.players,
            needed,
            answers.len()
        )));
    }
    if let Some(rounds) = args.rounds
        && (rounds == 0 || rounds > questions.len())
    {
        return Err(CliError::InvalidInput(format!(
            "--rounds must be between 1 and {} (one per question card)",
            questions.len()
        )));
    }
    if answers.len() == needed {
        output::warning(
            err,
            "answer deck has no spare cards; submissions will be dealt back the played cards",
        )?;
    }

    let seed = cfg.seed.unwrap_or_else(rand::random);
    let settings = MatchSettings {
        seed: Some(seed),
        ..cfg.match_settings(args.rounds)
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let played = runtime.block_on(play_match(
        &cfg.bot,
        args.players,
        seed,
        settings,
        questions,
        answers,
    ))?;

    if args.json {
        let report = Report {
            code: &played.code,
            bot: &cfg.bot,
            seed,
            rounds: &played.rounds,
            standings: &played.standings,
        };
        let json = serde_json::to_string_pretty(&report).map_err(std::io::Error::other)?;
        writeln!(out, "{}", json)?;
    } else {
        write_report(out, &played, &cfg.bot, seed, args.players)?;
    }
    Ok(())
}

async fn play_match(
    bot_name: &str,
    players: usize,
    seed: u64,
    settings: MatchSettings,
    questions: Vec<String>,
    answers: Vec<String>,
) -> Result<Played, CliError> {
    let registry = MatchRegistry::new(settings);
    let current_question = Arc::new(Mutex::new(String::new()));

    let judge_bot = bot(bot_name, seed)?;
    let question = Arc::clone(&current_question);
    let handlers = MatchHandlers::new().with_pick_winner(move |picks, judge, _roster| {
        let bot = Arc::clone(&judge_bot);
        let question = question
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        async move {
            let winner = bot.choose_winner(&question, &picks);
            debug!(judge = %judge.nickname, ?winner, "bot judged the round");
            winner
        }
    });

    let (code, handle) = registry.create_match(questions, answers, handlers)?;
    info!(code = %code, players, bot = bot_name, "simulating match");

    let mut seats = Vec::with_capacity(players);
    for index in 0..players {
        let (connection, rx) = ChannelConnection::new();
        let player = registry
            .join(&code, format!("bot-{}", index + 1), Arc::new(connection))
            .await?;
        let seat_bot = bot(bot_name, seed.wrapping_add(index as u64 + 1))?;
        seats.push(tokio::spawn(play_seat(
            player,
            rx,
            seat_bot,
            Arc::clone(&current_question),
        )));
    }

    let standings = handle.start().await?;

    let mut logs = Vec::with_capacity(seats.len());
    for seat in seats {
        logs.push(
            seat.await
                .map_err(|e| CliError::Match(format!("bot seat failed: {}", e)))?,
        );
    }
    let rounds = logs.first().map(|log| summarize(log)).unwrap_or_default();
    Ok(Played {
        code,
        rounds,
        standings,
    })
}

/// Play one seat until the match releases it. Returns every envelope received.
async fn play_seat(
    player: PlayerHandle,
    mut rx: ConnectionReceiver,
    bot: Arc<dyn Bot>,
    current_question: Arc<Mutex<String>>,
) -> Vec<Envelope> {
    let mut seen = Vec::new();
    while let Some(envelope) = rx.recv().await {
        if let ServerMessage::RoundStarted { question, .. } = &envelope.message {
            *current_question
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = question.clone();
            if envelope.is_judge == Some(false) {
                let hand = envelope.hand.as_deref().unwrap_or_default();
                if let Some(card) = bot.choose_card(question, hand)
                    && let Err(e) = player.submit(card).await
                {
                    warn!(player = %player.nickname(), error = %e, "bot submission rejected");
                }
            }
        }
        seen.push(envelope);
    }
    seen
}

fn bot(name: &str, seed: u64) -> Result<Arc<dyn Bot>, CliError> {
    create_bot(name, seed)
        .map(Arc::from)
        .ok_or_else(|| CliError::InvalidInput(format!("unknown bot '{}'", name)))
}

fn summarize(log: &[Envelope]) -> Vec<RoundReport> {
    let mut reports: Vec<RoundReport> = Vec::new();
    let mut picks: Vec<Submission> = Vec::new();
    for envelope in log {
        match &envelope.message {
            ServerMessage::RoundStarted { question, judge } => reports.push(RoundReport {
                round: envelope.round,
                question: question.clone(),
                judge: judge.clone(),
                picks: 0,
                winner: NOBODY.to_string(),
                answer: None,
            }),
            ServerMessage::Picks { picks: current } => {
                picks = current.clone();
                if let Some(report) = reports.last_mut() {
                    report.picks = picks.len();
                }
            }
            ServerMessage::Outcome { winner, winner_id } => {
                if let Some(report) = reports.last_mut() {
                    report.winner = winner.clone();
                    report.answer = winner_id
                        .as_ref()
                        .and_then(|id| picks.iter().find(|pick| &pick.player_id == id))
                        .map(|pick| pick.value.clone());
                }
            }
            _ => {}
        }
    }
    reports
}

fn write_report(
    out: &mut dyn Write,
    played: &Played,
    bot: &str,
    seed: u64,
    players: usize,
) -> std::io::Result<()> {
    writeln!(
        out,
        "Match {}: {} {} bots, seed {}",
        played.code, players, bot, seed
    )?;
    for round in &played.rounds {
        writeln!(out, "Round {}: {}", round.round, round.question)?;
        match &round.answer {
            Some(answer) => writeln!(
                out,
                "  judge {}, {} picks, winner {}: \"{}\"",
                round.judge, round.picks, round.winner, answer
            )?,
            None => writeln!(
                out,
                "  judge {}, {} picks, winner {}",
                round.judge, round.picks, round.winner
            )?,
        }
    }
    writeln!(out, "Standings:")?;
    for (place, score) in played.standings.iter().enumerate() {
        writeln!(
            out,
            "  {}. {} - {} win{}",
            place + 1,
            score.nickname,
            score.wins,
            if score.wins == 1 { "" } else { "s" }
        )?;
    }
    Ok(())
}
