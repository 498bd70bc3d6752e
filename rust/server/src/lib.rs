//! Round orchestration for partydeck matches.
//!
//! A match is a [`RoundEngine`] task. Callers talk to it through a
//! [`MatchHandle`] (seat players, start, stop, status) and one
//! [`PlayerHandle`] per seated player (submit, disconnect, start/stop
//! requests). Every message the match sends goes out through the player's
//! [`Connection`]. [`MatchRegistry`] indexes live matches by join code.
pub mod connection;
pub mod engine;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod logging;
pub mod registry;
pub mod settings;

pub use connection::{ChannelConnection, Connection, ConnectionReceiver};
pub use engine::{MatchHandle, MatchId, MatchStatus, Phase, PlayerHandle, RoundEngine};
pub use errors::{ConnectionError, MatchError};
pub use events::{Envelope, ServerMessage, NOBODY};
pub use handlers::{EndFn, MatchHandlers, PickWinnerFn, StartFn};
pub use logging::{init_logging, LogEntry, LogFormat, TestLogSubscriber};
pub use registry::{JoinCode, ListingState, MatchListing, MatchRegistry, RegistryError};
pub use settings::{MatchSettings, SettingsError};
