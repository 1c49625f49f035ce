use crate::commands::CommandResult;
use crate::fs::Zone;

use super::state::GamePhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    SystemPanic,
    DiskFull,
    ThreatCritical,
}

impl GameOverReason {
    pub fn message_key(self) -> &'static str {
        match self {
            GameOverReason::SystemPanic => "game.system_panic",
            GameOverReason::DiskFull => "game.disk_full",
            GameOverReason::ThreatCritical => "game.threat_critical",
        }
    }
}

/// Something the front-end may want to announce after a turn.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    ZoneUnlocked(Zone),
    /// Emitted once per zone, the turn its hostile set is cleared.
    ZoneCompleted(Zone),
    PhaseChanged { from: GamePhase, to: GamePhase },
    /// Zone2 has no automatic hints; this points the player at `help`.
    HelpNotification,
    ForkSpawned { pid: u32, threat: u32 },
    GameOver(GameOverReason),
}

/// Everything one call to [`Game::process_command`](super::Game::process_command) produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub result: CommandResult,
    pub events: Vec<GameEvent>,
}

impl TurnOutcome {
    pub fn game_over(&self) -> Option<GameOverReason> {
        self.events.iter().find_map(|event| match event {
            GameEvent::GameOver(reason) => Some(*reason),
            _ => None,
        })
    }
}
