use futures::future::BoxFuture;
use partydeck_engine::player::{Player, PlayerId};
use partydeck_engine::round::Submission;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Chooses the winning player from the round's picks: `(picks, judge, roster)`.
pub type PickWinnerFn =
    Arc<dyn Fn(Vec<Submission>, Player, Vec<Player>) -> BoxFuture<'static, Option<PlayerId>> + Send + Sync>;
/// Fired once when the match leaves the lobby, with the full roster.
pub type StartFn = Arc<dyn Fn(Vec<Player>) -> BoxFuture<'static, ()> + Send + Sync>;
/// Fired exactly once when the match terminates.
pub type EndFn = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Callbacks the match invokes, supplied at construction.
#[derive(Clone)]
pub struct MatchHandlers {
    pub pick_winner: PickWinnerFn,
    pub on_start: StartFn,
    pub on_end: EndFn,
}

impl Default for MatchHandlers {
    fn default() -> Self {
        Self {
            pick_winner: Arc::new(|_, _, _| Box::pin(async { None })),
            on_start: Arc::new(|_| Box::pin(async {})),
            on_end: Arc::new(|| Box::pin(async {})),
        }
    }
}

impl fmt::Debug for MatchHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchHandlers").finish_non_exhaustive()
    }
}

impl MatchHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pick_winner<F, Fut>(mut self, pick: F) -> Self
    where
        F: Fn(Vec<Submission>, Player, Vec<Player>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<PlayerId>> + Send + 'static,
    {
        self.pick_winner = Arc::new(move |picks, judge, roster| Box::pin(pick(picks, judge, roster)));
        self
    }

    pub fn with_on_start<F, Fut>(mut self, on_start: F) -> Self
    where
        F: Fn(Vec<Player>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_start = Arc::new(move |roster| Box::pin(on_start(roster)));
        self
    }

    pub fn with_on_end<F, Fut>(mut self, on_end: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_end = Arc::new(move || Box::pin(on_end()));
        self
    }
}
