use crate::connection::Connection;
use crate::errors::MatchError;
use crate::events::{Envelope, ServerMessage, NOBODY};
use crate::handlers::MatchHandlers;
use crate::settings::MatchSettings;
use partydeck_engine::cards::{Card, CardId};
use partydeck_engine::deck::CardSequence;
use partydeck_engine::player::{standings, Player, PlayerId, Score, HAND_SIZE, MIN_PLAYERS};
use partydeck_engine::ring::PlayerRing;
use partydeck_engine::round::{Round, Submission};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

// Senders wait when the match falls this far behind.
const COMMAND_BUFFER: usize = 256;

pub type MatchId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Pending,
    Active,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchStatus {
    pub phase: Phase,
    pub players: usize,
    /// 1-based index of the current (or last) round, 0 before the first one
    pub round: usize,
    pub stop_requested: bool,
}

struct Seat {
    player: Player,
    connection: Arc<dyn Connection>,
}

struct Joined {
    id: PlayerId,
    nickname: String,
    is_admin: bool,
    hand: Vec<Card>,
}

enum Command {
    Join {
        nickname: String,
        connection: Arc<dyn Connection>,
        reply: oneshot::Sender<Result<Joined, MatchError>>,
    },
    Player {
        id: PlayerId,
        event: PlayerEvent,
    },
    Start {
        reply: Option<oneshot::Sender<Vec<Score>>>,
    },
    Stop,
    Status {
        reply: oneshot::Sender<MatchStatus>,
    },
}

enum PlayerEvent {
    Submit {
        card: CardId,
        reply: oneshot::Sender<Result<Card, MatchError>>,
    },
    Disconnect,
    RequestStart,
    RequestStop,
}

type Delivery = (PlayerId, Arc<dyn Connection>, Envelope);

/// One match: lobby, round loop and teardown.
///
/// The engine owns all match state. Joins, submissions, disconnects and
/// start/stop requests reach it as commands on a single channel, and the round
/// loop keeps draining that channel whenever it is waiting (broadcasts, the
/// submission window, pacing delays, callbacks). Player events therefore
/// interleave with the loop only at those points and never race it.
pub struct RoundEngine {
    id: MatchId,
    phase: Phase,
    players: PlayerRing<Seat>,
    questions: CardSequence,
    answers: CardSequence,
    round: Option<Round>,
    rounds: usize,
    stop_requested: bool,
    end_fired: bool,
    settings: MatchSettings,
    handlers: MatchHandlers,
    inbox: mpsc::Receiver<Command>,
}

impl fmt::Debug for RoundEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoundEngine")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("players", &self.players.len())
            .field("questions", &self.questions.len())
            .field("answers", &self.answers.len())
            .field("rounds", &self.rounds)
            .field("stop_requested", &self.stop_requested)
            .finish()
    }
}

impl RoundEngine {
    /// Build a pending match. Fails if the settings are invalid or there are
    /// fewer questions than rounds to play.
    pub fn new(
        id: impl Into<MatchId>,
        questions: impl IntoIterator<Item = impl Into<String>>,
        answers: impl IntoIterator<Item = impl Into<String>>,
        settings: MatchSettings,
        handlers: MatchHandlers,
    ) -> Result<(Self, MatchHandle), MatchError> {
        settings
            .validate()
            .map_err(|err| MatchError::Configuration(err.to_string()))?;

        let seed = settings.seed.unwrap_or_else(rand::random);
        let mut questions = CardSequence::with_seed(questions, seed);
        let mut answers = CardSequence::with_seed(answers, seed.wrapping_add(1));
        if settings.shuffle_decks {
            questions.shuffle();
            answers.shuffle();
        }

        let rounds = settings.rounds.unwrap_or(questions.len());
        if rounds > questions.len() {
            return Err(MatchError::Configuration(format!(
                "{} rounds need {} question cards, deck has {}",
                rounds,
                rounds,
                questions.len()
            )));
        }

        let id = id.into();
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let engine = Self {
            id: id.clone(),
            phase: Phase::Pending,
            players: PlayerRing::new(),
            questions,
            answers,
            round: None,
            rounds,
            stop_requested: false,
            end_fired: false,
            settings,
            handlers,
            inbox: rx,
        };
        Ok((engine, MatchHandle { id, commands: tx }))
    }

    /// Build a match and run it on the tokio runtime.
    pub fn spawn(
        id: impl Into<MatchId>,
        questions: impl IntoIterator<Item = impl Into<String>>,
        answers: impl IntoIterator<Item = impl Into<String>>,
        settings: MatchSettings,
        handlers: MatchHandlers,
    ) -> Result<(MatchHandle, JoinHandle<Vec<Score>>), MatchError> {
        let (engine, handle) = Self::new(id, questions, answers, settings, handlers)?;
        Ok((handle, tokio::spawn(engine.run())))
    }

    /// Serve the lobby until the match starts, play it, and return the final
    /// standings. Returns an empty list if the match never got going.
    pub async fn run(self) -> Vec<Score> {
        let span = tracing::info_span!("match", match_id = %self.id);
        self.serve().instrument(span).await
    }

    async fn serve(mut self) -> Vec<Score> {
        debug!(
            questions = self.questions.len(),
            answers = self.answers.len(),
            rounds = self.rounds,
            "match created"
        );
        while let Some(command) = self.inbox.recv().await {
            match command {
                Command::Start { reply } => {
                    let scores = self.try_start().await;
                    if let Some(reply) = reply {
                        let _ = reply.send(scores.clone().unwrap_or_default());
                    }
                    if let Some(scores) = scores {
                        return scores;
                    }
                }
                Command::Player {
                    id,
                    event: PlayerEvent::RequestStart,
                } => {
                    debug!(player_id = %id, "start requested by player");
                    if let Some(scores) = self.try_start().await {
                        return scores;
                    }
                }
                other => self.apply(other).await,
            }
            if self.phase == Phase::Ended {
                return Vec::new();
            }
        }

        debug!("every handle dropped before the match started");
        self.close().await;
        Vec::new()
    }

    async fn try_start(&mut self) -> Option<Vec<Score>> {
        if self.players.len() < MIN_PLAYERS {
            warn!(
                players = self.players.len(),
                required = MIN_PLAYERS,
                "start ignored: not enough players"
            );
            return None;
        }
        Some(self.play().await)
    }

    async fn play(&mut self) -> Vec<Score> {
        self.phase = Phase::Active;
        info!(
            players = self.players.len(),
            rounds = self.rounds,
            "match started"
        );

        let on_start = (self.handlers.on_start)(self.roster());
        self.drive(on_start).await;
        let started = self.envelopes(ServerMessage::Started, Some(0), None);
        self.drive(deliver(started)).await;
        let delay = sleep(self.settings.round_delay());
        self.drive(delay).await;

        for index in 0..self.rounds {
            if self.stop_requested {
                info!(round = index + 1, "stop honored, ending match early");
                break;
            }
            if !self.play_round(index).await {
                break;
            }
            let delay = sleep(self.settings.round_delay());
            self.drive(delay).await;
        }

        self.finish().await
    }

    /// Run a single round. Returns false if the round could not be played.
    async fn play_round(&mut self, index: usize) -> bool {
        let Some(judge) = self.players.advance().map(|(_, seat)| seat.player.clone()) else {
            warn!(round = index + 1, "no players left to judge");
            return false;
        };
        let Some(question) = self.questions.draw_top() else {
            error!(round = index + 1, "question deck exhausted");
            return false;
        };
        self.round = Some(Round::new(index, judge.id.clone(), question.clone()));
        info!(round = index + 1, judge = %judge.nickname, "round started");

        let announce = self.envelopes(
            ServerMessage::RoundStarted {
                question: question.value.clone(),
                judge: judge.nickname.clone(),
            },
            Some(index),
            Some(&judge.id),
        );
        self.drive(deliver(announce)).await;

        self.collect_submissions().await;

        let picks: Vec<Submission> = self
            .round
            .as_ref()
            .map(|round| round.submissions().to_vec())
            .unwrap_or_default();
        debug!(round = index + 1, picks = picks.len(), "submissions collected");
        let reveal = self.envelopes(
            ServerMessage::Picks {
                picks: picks.clone(),
            },
            Some(index),
            None,
        );
        self.drive(deliver(reveal)).await;

        let pick = (self.handlers.pick_winner)(picks, judge, self.roster());
        let chosen = self.drive(pick).await;

        let winner = chosen.and_then(|id| {
            let seat = self.players.get_mut(&id)?;
            seat.player.award(question.id);
            Some((id, seat.player.nickname.clone()))
        });
        if let Some(round) = self.round.as_mut() {
            round.set_winner(winner.as_ref().map(|(id, _)| id.clone()));
        }

        let outcome = match winner {
            Some((id, nickname)) => {
                info!(round = index + 1, winner = %nickname, "round won");
                ServerMessage::Outcome {
                    winner: nickname,
                    winner_id: Some(id),
                }
            }
            None => {
                info!(round = index + 1, "round ended without a winner");
                ServerMessage::Outcome {
                    winner: NOBODY.to_string(),
                    winner_id: None,
                }
            }
        };
        let outcome = self.envelopes(outcome, Some(index), None);
        self.drive(deliver(outcome)).await;
        true
    }

    /// Wait until everyone but the judge has played or the pick timeout runs out.
    async fn collect_submissions(&mut self) {
        let timeout = sleep_until(Instant::now() + self.settings.pick_timeout());
        tokio::pin!(timeout);
        loop {
            if self.round_complete() {
                debug!("all submissions in");
                return;
            }
            let command = tokio::select! {
                biased;
                _ = &mut timeout => {
                    debug!("pick timeout elapsed");
                    return;
                }
                Some(command) = self.inbox.recv() => command,
            };
            self.apply(command).await;
        }
    }

    /// Await `work` while still serving incoming commands.
    async fn drive<F: Future>(&mut self, work: F) -> F::Output {
        tokio::pin!(work);
        loop {
            let command = tokio::select! {
                biased;
                output = &mut work => return output,
                Some(command) = self.inbox.recv() => command,
            };
            self.apply(command).await;
        }
    }

    async fn finish(&mut self) -> Vec<Score> {
        let scores = standings(self.players.values().map(|seat| &seat.player));
        self.close().await;
        info!(players = scores.len(), "match ended");
        scores
    }

    /// Release every connection (best effort) and fire the end callback.
    async fn close(&mut self) {
        self.phase = Phase::Ended;
        let connections: Vec<(PlayerId, Arc<dyn Connection>)> = self
            .players
            .iter()
            .map(|(id, seat)| (id.clone(), Arc::clone(&seat.connection)))
            .collect();
        for (id, connection) in connections {
            if let Err(err) = connection.release().await {
                warn!(player_id = %id, error = %err, "failed to release connection");
            }
        }
        self.fire_end().await;
    }

    async fn fire_end(&mut self) {
        if self.end_fired {
            return;
        }
        self.end_fired = true;
        (self.handlers.on_end)().await;
    }

    async fn apply(&mut self, command: Command) {
        match command {
            Command::Join {
                nickname,
                connection,
                reply,
            } => {
                let result = self.join(nickname, connection).await;
                let _ = reply.send(result);
            }
            Command::Player { id, event } => self.player_event(id, event).await,
            Command::Start { reply } => {
                debug!(phase = ?self.phase, "start ignored: match already running");
                if let Some(reply) = reply {
                    let _ = reply.send(Vec::new());
                }
            }
            Command::Stop => self.stop(),
            Command::Status { reply } => {
                let _ = reply.send(self.status());
            }
        }
    }

    async fn player_event(&mut self, id: PlayerId, event: PlayerEvent) {
        match event {
            PlayerEvent::Submit { card, reply } => {
                let result = self.submit(&id, card);
                if let Err(err) = &result {
                    debug!(player_id = %id, card = %card, error = %err, "submission rejected");
                }
                let _ = reply.send(result);
            }
            PlayerEvent::Disconnect => self.disconnect(&id).await,
            PlayerEvent::RequestStart => {
                debug!(player_id = %id, "start request ignored: match already running");
            }
            PlayerEvent::RequestStop => {
                info!(player_id = %id, "stop requested by player");
                self.stop();
            }
        }
    }

    async fn join(
        &mut self,
        nickname: String,
        connection: Arc<dyn Connection>,
    ) -> Result<Joined, MatchError> {
        if self.phase != Phase::Pending {
            return Err(MatchError::AlreadyStarted);
        }

        let mut hand = Vec::with_capacity(HAND_SIZE);
        while hand.len() < HAND_SIZE {
            let Some(card) = self.answers.draw_top() else {
                break;
            };
            hand.push(card);
        }
        if hand.len() < HAND_SIZE {
            let available = hand.len();
            for card in hand {
                self.answers.recycle(card.id)?;
            }
            warn!(nickname = %nickname, available, "join rejected: answer deck too short");
            return Err(MatchError::JoinRejected {
                needed: HAND_SIZE,
                available,
            });
        }

        let id = loop {
            let candidate = PlayerId::new(Uuid::new_v4().to_string());
            if !self.players.contains(&candidate) {
                break candidate;
            }
            debug!(player_id = %candidate, "player id collision, regenerating");
        };

        let mut player = Player::new(id.clone(), nickname, hand);
        player.is_admin = self.players.is_empty();
        let joined = Joined {
            id: id.clone(),
            nickname: player.nickname.clone(),
            is_admin: player.is_admin,
            hand: player.hand.clone(),
        };
        self.players
            .add_entry(id.clone(), Seat { player, connection })?;
        info!(
            player_id = %id,
            nickname = %joined.nickname,
            admin = joined.is_admin,
            players = self.players.len(),
            "player joined"
        );

        if joined.is_admin {
            self.send_to(&id, Envelope::new(ServerMessage::Promoted, 0))
                .await;
        }
        let count = self.envelopes(
            ServerMessage::PlayerCount {
                count: self.players.len(),
            },
            None,
            None,
        );
        deliver(count).await;
        Ok(joined)
    }

    /// Swap a card from the player's hand into the round: the card goes to the
    /// back of the answer deck and a replacement comes off the top.
    fn submit(&mut self, id: &PlayerId, card: CardId) -> Result<Card, MatchError> {
        let seat = self
            .players
            .get_mut(id)
            .ok_or_else(|| MatchError::UnknownPlayer(id.clone()))?;
        if let Some(round) = &self.round {
            round.check_submitter(id)?;
        }
        if !seat.player.holds(card) {
            return Err(MatchError::CardNotInHand(card));
        }

        self.answers.recycle(card)?;
        let played = seat
            .player
            .take_card(card)
            .ok_or(MatchError::CardNotInHand(card))?;
        let submission = Submission {
            card_id: played.id,
            player_id: id.clone(),
            value: played.value,
        };
        match self.round.as_mut() {
            Some(round) => round.accept(submission)?,
            None => debug!(player_id = %id, "card played outside a round"),
        }

        let replacement = self.answers.draw_top().ok_or(MatchError::DeckExhausted)?;
        seat.player.hand.push(replacement.clone());
        debug!(player_id = %id, card = %card, "card submitted");
        Ok(replacement)
    }

    async fn disconnect(&mut self, id: &PlayerId) {
        let Some(seat) = self.players.remove_entry(id) else {
            debug!(player_id = %id, "disconnect from unknown player");
            return;
        };
        for card in &seat.player.hand {
            if let Err(err) = self.answers.recycle(card.id) {
                error!(player_id = %id, card = %card.id, error = %err, "failed to return card to deck");
            }
        }
        info!(player_id = %id, players = self.players.len(), "player disconnected");

        let count = self.envelopes(
            ServerMessage::PlayerCount {
                count: self.players.len(),
            },
            None,
            None,
        );
        deliver(count).await;

        if seat.player.is_admin {
            let successor = self.players.peek().map(|(next, _)| next.clone());
            match successor {
                Some(next) => self.promote(&next).await,
                None if self.phase == Phase::Pending => {
                    info!("last player left the lobby");
                    self.phase = Phase::Ended;
                    self.fire_end().await;
                }
                None => {}
            }
        }

        if self.phase == Phase::Active && self.players.len() < MIN_PLAYERS {
            info!(
                players = self.players.len(),
                required = MIN_PLAYERS,
                "too few players left"
            );
            self.stop();
        }
    }

    async fn promote(&mut self, id: &PlayerId) {
        if let Some(seat) = self.players.get_mut(id) {
            seat.player.is_admin = true;
        }
        info!(player_id = %id, "admin handed over");
        self.send_to(id, Envelope::new(ServerMessage::Promoted, 0))
            .await;
    }

    fn stop(&mut self) {
        if !self.stop_requested {
            info!("stop requested");
        }
        self.stop_requested = true;
    }

    fn status(&self) -> MatchStatus {
        MatchStatus {
            phase: self.phase,
            players: self.players.len(),
            round: self.round.as_ref().map_or(0, |round| round.index() + 1),
            stop_requested: self.stop_requested,
        }
    }

    fn round_complete(&self) -> bool {
        self.round
            .as_ref()
            .is_some_and(|round| round.is_complete(self.players.len()))
    }

    fn roster(&self) -> Vec<Player> {
        self.players
            .values()
            .map(|seat| seat.player.clone())
            .collect()
    }

    /// Address `message` to every player. `round` is the 0-based round index
    /// (`None` for lobby notices); with a `judge`, each copy says whether the
    /// recipient is judging, and question messages carry non-judges' hands.
    fn envelopes(
        &self,
        message: ServerMessage,
        round: Option<usize>,
        judge: Option<&PlayerId>,
    ) -> Vec<Delivery> {
        let round = round.map_or(0, |index| index + 1);
        let with_hand = message.carries_question();
        self.players
            .iter()
            .map(|(id, seat)| {
                let is_judge = judge.map(|judge| judge == id);
                let hand = (with_hand && is_judge != Some(true)).then(|| seat.player.hand.clone());
                let envelope = Envelope {
                    message: message.clone(),
                    round,
                    is_judge,
                    hand,
                };
                (id.clone(), Arc::clone(&seat.connection), envelope)
            })
            .collect()
    }

    async fn send_to(&self, id: &PlayerId, envelope: Envelope) {
        let Some(connection) = self.players.get(id).map(|seat| Arc::clone(&seat.connection)) else {
            return;
        };
        deliver(vec![(id.clone(), connection, envelope)]).await;
    }
}

/// Send each envelope in turn. A failed recipient is logged and skipped.
async fn deliver(deliveries: Vec<Delivery>) {
    for (id, connection, envelope) in deliveries {
        if let Err(err) = connection.send(&envelope).await {
            warn!(player_id = %id, error = %err, "failed to deliver message");
        }
    }
}

/// Cloneable handle for driving a match from the outside.
#[derive(Clone)]
pub struct MatchHandle {
    id: MatchId,
    commands: mpsc::Sender<Command>,
}

impl fmt::Debug for MatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchHandle")
            .field("id", &self.id)
            .field("closed", &self.commands.is_closed())
            .finish()
    }
}

impl MatchHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Seat a player and deal their starting hand. Only allowed before the start.
    pub async fn add_player(
        &self,
        nickname: impl Into<String>,
        connection: Arc<dyn Connection>,
    ) -> Result<PlayerHandle, MatchError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Join {
            nickname: nickname.into(),
            connection,
            reply,
        })
        .await?;
        let joined = rx.await.map_err(|_| MatchError::Closed)??;
        Ok(PlayerHandle {
            id: joined.id,
            nickname: joined.nickname,
            is_admin: joined.is_admin,
            hand: joined.hand,
            commands: self.commands.clone(),
        })
    }

    /// Start the match and wait for it to finish. Resolves to the final
    /// standings, or to an empty list when there are too few players or the
    /// match is already running.
    pub async fn start(&self) -> Result<Vec<Score>, MatchError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Start { reply: Some(reply) }).await?;
        rx.await.map_err(|_| MatchError::Closed)
    }

    /// Ask the match to end after the round in progress.
    pub async fn stop(&self) -> Result<(), MatchError> {
        self.send(Command::Stop).await
    }

    pub async fn status(&self) -> Result<MatchStatus, MatchError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Status { reply }).await?;
        rx.await.map_err(|_| MatchError::Closed)
    }

    /// True once the match task has gone away.
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    async fn send(&self, command: Command) -> Result<(), MatchError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| MatchError::Closed)
    }
}

/// A seated player's side of the match.
#[derive(Clone)]
pub struct PlayerHandle {
    id: PlayerId,
    nickname: String,
    is_admin: bool,
    hand: Vec<Card>,
    commands: mpsc::Sender<Command>,
}

impl fmt::Debug for PlayerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerHandle")
            .field("id", &self.id)
            .field("nickname", &self.nickname)
            .field("is_admin", &self.is_admin)
            .finish_non_exhaustive()
    }
}

impl PlayerHandle {
    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    /// Admin status at the time of joining.
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// The hand dealt on joining.
    pub fn hand(&self) -> &[Card] {
        &self.hand
    }

    /// Play `card` into the current round and get the replacement card.
    pub async fn submit(&self, card: CardId) -> Result<Card, MatchError> {
        let (reply, rx) = oneshot::channel();
        self.raise(PlayerEvent::Submit { card, reply }).await?;
        rx.await.map_err(|_| MatchError::Closed)?
    }

    pub async fn disconnect(&self) -> Result<(), MatchError> {
        self.raise(PlayerEvent::Disconnect).await
    }

    pub async fn request_start(&self) -> Result<(), MatchError> {
        self.raise(PlayerEvent::RequestStart).await
    }

    pub async fn request_stop(&self) -> Result<(), MatchError> {
        self.raise(PlayerEvent::RequestStop).await
    }

    async fn raise(&self, event: PlayerEvent) -> Result<(), MatchError> {
        self.commands
            .send(Command::Player {
                id: self.id.clone(),
                event,
            })
            .await
            .map_err(|_| MatchError::Closed)
    }
}
