use crate::connection::Connection;
use crate::engine::{MatchHandle, PlayerHandle, RoundEngine};
use crate::errors::MatchError;
use crate::handlers::MatchHandlers;
use crate::settings::MatchSettings;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, Weak};
use thiserror::Error;
use tracing::{error, info, warn};

/// Six-digit code players type in to find a match.
pub type JoinCode = String;

const CODE_SPACE: u32 = 1_000_000;
const MAX_CODE_ATTEMPTS: usize = 64;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unknown join code: {0}")]
    UnknownCode(JoinCode),
    #[error("No free join code after {0} attempts")]
    CodesExhausted(usize),
    #[error("Registry storage poisoned")]
    StoragePoisoned,
    #[error(transparent)]
    Match(#[from] MatchError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingState {
    Pending,
    Active,
}

/// Snapshot of one registered match.
#[derive(Debug, Clone)]
pub struct MatchListing {
    pub code: JoinCode,
    pub state: ListingState,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
struct MatchEntry {
    handle: MatchHandle,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
}

/// Matches indexed by join code.
///
/// A match is listed as pending until its start callback fires, then as
/// active until its end callback fires, at which point it is dropped from
/// the registry. Only pending matches accept new players.
#[derive(Debug, Clone)]
pub struct MatchRegistry {
    inner: Arc<RegistryInner>,
}

#[derive(Debug)]
struct RegistryInner {
    settings: MatchSettings,
    // Lock order: pending, then active.
    pending: RwLock<HashMap<JoinCode, MatchEntry>>,
    active: RwLock<HashMap<JoinCode, MatchEntry>>,
}

impl Default for MatchRegistry {
    fn default() -> Self {
        Self::new(MatchSettings::default())
    }
}

impl MatchRegistry {
    pub fn new(settings: MatchSettings) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                settings,
                pending: RwLock::new(HashMap::new()),
                active: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.inner.settings
    }

    /// Spawn a new match under a fresh join code. Must be called from within a
    /// tokio runtime.
    pub fn create_match(
        &self,
        questions: Vec<String>,
        answers: Vec<String>,
        handlers: MatchHandlers,
    ) -> Result<(JoinCode, MatchHandle), RegistryError> {
        let mut pending = self
            .inner
            .pending
            .write()
            .map_err(|_| RegistryError::StoragePoisoned)?;
        let code = {
            let active = self
                .inner
                .active
                .read()
                .map_err(|_| RegistryError::StoragePoisoned)?;
            let mut rng = rand::rng();
            let mut attempts = 0;
            loop {
                if attempts == MAX_CODE_ATTEMPTS {
                    return Err(RegistryError::CodesExhausted(attempts));
                }
                attempts += 1;
                let candidate = format!("{:06}", rng.random_range(0..CODE_SPACE));
                if !pending.contains_key(&candidate) && !active.contains_key(&candidate) {
                    break candidate;
                }
            }
        };

        let handlers = self.track(&code, handlers);
        let (handle, _task) = RoundEngine::spawn(
            code.clone(),
            questions,
            answers,
            self.inner.settings.clone(),
            handlers,
        )?;
        pending.insert(
            code.clone(),
            MatchEntry {
                handle: handle.clone(),
                created_at: Utc::now(),
                started_at: None,
            },
        );
        info!(code = %code, "match registered");
        Ok((code, handle))
    }

    /// Seat a player in the pending match behind `code`.
    pub async fn join(
        &self,
        code: &str,
        nickname: impl Into<String>,
        connection: Arc<dyn Connection>,
    ) -> Result<PlayerHandle, RegistryError> {
        let handle = self
            .inner
            .pending
            .read()
            .map_err(|_| RegistryError::StoragePoisoned)?
            .get(code)
            .map(|entry| entry.handle.clone())
            .ok_or_else(|| RegistryError::UnknownCode(code.to_string()))?;
        Ok(handle.add_player(nickname, connection).await?)
    }

    /// True if `code` names a match that is still taking players.
    pub fn exists(&self, code: &str) -> bool {
        self.inner
            .pending
            .read()
            .map(|pending| pending.contains_key(code))
            .unwrap_or(false)
    }

    pub fn is_active(&self, code: &str) -> bool {
        self.inner
            .active
            .read()
            .map(|active| active.contains_key(code))
            .unwrap_or(false)
    }

    pub fn get(&self, code: &str) -> Option<MatchHandle> {
        let pending = self.inner.pending.read().ok()?;
        if let Some(entry) = pending.get(code) {
            return Some(entry.handle.clone());
        }
        let active = self.inner.active.read().ok()?;
        active.get(code).map(|entry| entry.handle.clone())
    }

    pub fn len(&self) -> usize {
        let pending = self.inner.pending.read().map(|m| m.len()).unwrap_or(0);
        let active = self.inner.active.read().map(|m| m.len()).unwrap_or(0);
        pending + active
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All registered matches, oldest first.
    pub fn listings(&self) -> Result<Vec<MatchListing>, RegistryError> {
        let pending = self
            .inner
            .pending
            .read()
            .map_err(|_| RegistryError::StoragePoisoned)?;
        let active = self
            .inner
            .active
            .read()
            .map_err(|_| RegistryError::StoragePoisoned)?;
        let mut listings: Vec<MatchListing> = pending
            .iter()
            .map(|(code, entry)| (code, entry, ListingState::Pending))
            .chain(
                active
                    .iter()
                    .map(|(code, entry)| (code, entry, ListingState::Active)),
            )
            .map(|(code, entry, state)| MatchListing {
                code: code.clone(),
                state,
                created_at: entry.created_at,
                started_at: entry.started_at,
            })
            .collect();
        listings.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.code.cmp(&b.code)));
        Ok(listings)
    }

    /// Drop entries whose match task is gone without having reported its end.
    /// Returns how many were removed.
    pub fn prune_closed(&self) -> Result<usize, RegistryError> {
        let mut pending = self
            .inner
            .pending
            .write()
            .map_err(|_| RegistryError::StoragePoisoned)?;
        let mut active = self
            .inner
            .active
            .write()
            .map_err(|_| RegistryError::StoragePoisoned)?;
        let before = pending.len() + active.len();
        pending.retain(|_, entry| !entry.handle.is_closed());
        active.retain(|_, entry| !entry.handle.is_closed());
        let removed = before - pending.len() - active.len();
        if removed > 0 {
            warn!(removed, "pruned closed matches");
        }
        Ok(removed)
    }

    /// Wrap the start and end callbacks so the registry follows the match.
    fn track(&self, code: &str, handlers: MatchHandlers) -> MatchHandlers {
        let weak = Arc::downgrade(&self.inner);
        let on_start = handlers.on_start.clone();
        let on_end = handlers.on_end.clone();

        let start_code = code.to_string();
        let start_registry = Weak::clone(&weak);
        let end_code = code.to_string();
        let end_registry = weak;

        MatchHandlers {
            pick_winner: handlers.pick_winner,
            on_start: Arc::new(move |roster| {
                if let Some(inner) = start_registry.upgrade() {
                    inner.activate(&start_code);
                }
                on_start(roster)
            }),
            on_end: Arc::new(move || {
                if let Some(inner) = end_registry.upgrade() {
                    inner.remove(&end_code);
                }
                on_end()
            }),
        }
    }
}

impl RegistryInner {
    fn activate(&self, code: &str) {
        let (Ok(mut pending), Ok(mut active)) = (self.pending.write(), self.active.write()) else {
            error!(code = %code, "registry storage poisoned, cannot activate match");
            return;
        };
        if let Some(mut entry) = pending.remove(code) {
            entry.started_at = Some(Utc::now());
            active.insert(code.to_string(), entry);
            info!(code = %code, "match active");
        }
    }

    fn remove(&self, code: &str) {
        let (Ok(mut pending), Ok(mut active)) = (self.pending.write(), self.active.write()) else {
            error!(code = %code, "registry storage poisoned, cannot remove match");
            return;
        };
        if pending.remove(code).or_else(|| active.remove(code)).is_some() {
            info!(code = %code, "match unregistered");
        }
    }
}
