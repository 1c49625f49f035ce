use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::VitalsConfig;

/// Vitals and counters for one session. Owned by [`Game`](super::Game).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameState {
    pub hp: i32,
    pub max_hp: i32,
    pub energy: u32,
    pub max_energy: u32,
    pub disk_usage: u32,
    pub max_disk_usage: u32,
    pub threat_level: f64,
    pub knowledge: u32,
    pub current_depth: usize,
    pub current_path: String,
    pub turn_count: u32,
    #[serde(skip)]
    pub is_game_over: bool,
    #[serde(skip)]
    pub is_paused: bool,
}

impl GameState {
    pub fn new(vitals: &VitalsConfig) -> Self {
        GameState {
            hp: vitals.hp,
            max_hp: vitals.max_hp,
            energy: vitals.energy,
            max_energy: vitals.max_energy,
            disk_usage: vitals.disk_usage,
            max_disk_usage: vitals.max_disk_usage,
            threat_level: vitals.threat_level,
            knowledge: 0,
            current_depth: 0,
            current_path: "/".to_string(),
            turn_count: 0,
            is_game_over: false,
            is_paused: false,
        }
    }

    pub fn spend_energy(&mut self, cost: u32) {
        self.energy = self.energy.saturating_sub(cost);
    }

    pub fn regenerate_energy(&mut self, amount: u32) {
        self.energy = (self.energy + amount).min(self.max_energy);
    }

    /// Adds `delta` to the threat level, never going below zero.
    pub fn adjust_threat(&mut self, delta: f64) {
        self.threat_level = (self.threat_level + delta).max(0.0);
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new(&VitalsConfig::default())
    }
}

/// Where the session is in the overall story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamePhase {
    Zone1Tutorial,
    Zone2Tutorial,
    FreeExploration,
    GameOver,
}

impl GamePhase {
    pub fn as_str(self) -> &'static str {
        match self {
            GamePhase::Zone1Tutorial => "zone1-tutorial",
            GamePhase::Zone2Tutorial => "zone2-tutorial",
            GamePhase::FreeExploration => "free-exploration",
            GamePhase::GameOver => "game-over",
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_a_fresh_session() {
        let state = GameState::default();
        assert_eq!((state.hp, state.max_hp), (50, 50));
        assert_eq!((state.energy, state.max_energy), (40, 40));
        assert_eq!((state.disk_usage, state.max_disk_usage), (30, 100));
        assert_eq!(state.threat_level, 7.0);
        assert_eq!(state.current_path, "/");
    }

    #[test]
    fn energy_and_threat_are_clamped() {
        let mut state = GameState::default();
        state.spend_energy(100);
        assert_eq!(state.energy, 0);
        state.regenerate_energy(100);
        assert_eq!(state.energy, state.max_energy);
        state.adjust_threat(-50.0);
        assert_eq!(state.threat_level, 0.0);
    }

    #[test]
    fn session_flags_are_not_serialized() {
        let mut state = GameState::default();
        state.is_game_over = true;
        let json = serde_json::to_value(&state).unwrap();
        assert!(json.get("isGameOver").is_none());
        assert_eq!(json["maxDiskUsage"], 100);
        let back: GameState = serde_json::from_value(json).unwrap();
        assert!(!back.is_game_over);
    }
}
