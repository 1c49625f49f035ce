//! rogsh: a roguelike that teaches Unix commands against a simulated filesystem.

pub mod commands;
pub mod config;
pub mod fs;
pub mod game;
pub mod i18n;
pub mod logging;
pub mod save;
pub mod tutorial;

pub use config::GameConfig;
pub use game::{Game, GameEvent, GamePhase, GameState, TurnOutcome};
pub use i18n::{Catalog, Locale};
