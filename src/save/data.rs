use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fs::Zone;
use crate::game::GameState;
use crate::tutorial::{Zone1Flags, Zone2Flags};

pub const SAVE_VERSION: &str = "1.0.0";

/// Progress flags as stored in the save file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFlags {
    #[serde(default)]
    pub zone1: Zone1Flags,
    #[serde(default)]
    pub zone2: Zone2Flags,
    /// Written by old versions before zone1 flags existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_entered_zone1: Option<bool>,
}

/// On-disk save record, `~/.rogsh_save.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveData {
    /// Records without a version are not treated as saves.
    #[serde(default)]
    pub version: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub game_state: GameState,
    #[serde(default)]
    pub completed_zones: Vec<Zone>,
    #[serde(default)]
    pub deleted_hostile_files: Vec<String>,
    /// Kept for older readers. Loading derives unlocks from
    /// `deleted_hostile_files` instead.
    #[serde(default)]
    pub is_zone2_unlocked: bool,
    #[serde(default)]
    pub event_flags: EventFlags,
}

impl SaveData {
    pub fn new(
        game_state: GameState,
        completed_zones: Vec<Zone>,
        deleted_hostile_files: Vec<String>,
        is_zone2_unlocked: bool,
        event_flags: EventFlags,
    ) -> Self {
        SaveData {
            version: Some(SAVE_VERSION.to_string()),
            timestamp: Utc::now(),
            game_state,
            completed_zones,
            deleted_hostile_files,
            is_zone2_unlocked,
            event_flags,
        }
    }

    pub fn is_versioned(&self) -> bool {
        self.version.as_deref().is_some_and(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_camel_case() {
        let data = SaveData::new(
            GameState::default(),
            vec![Zone::Zone1],
            vec!["virus.exe".to_string()],
            false,
            EventFlags::default(),
        );
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["version"], "1.0.0");
        assert_eq!(json["completedZones"][0], "zone1");
        assert_eq!(json["deletedHostileFiles"][0], "virus.exe");
        assert_eq!(json["gameState"]["currentPath"], "/");
        assert_eq!(json["eventFlags"]["zone1"]["removedVirus"], false);
        assert!(json["eventFlags"].get("hasEnteredZone1").is_none());
    }

    #[test]
    fn legacy_record_parses() {
        let json = r#"{
            "timestamp": "2024-05-01T12:00:00Z",
            "gameState": {
                "hp": 40, "maxHp": 50, "energy": 30, "maxEnergy": 40,
                "diskUsage": 35, "maxDiskUsage": 100, "threatLevel": 4.5,
                "knowledge": 3, "currentDepth": 1, "currentPath": "/zone1",
                "turnCount": 12
            },
            "eventFlags": { "hasEnteredZone1": true }
        }"#;
        let data: SaveData = serde_json::from_str(json).unwrap();
        assert!(!data.is_versioned());
        assert_eq!(data.game_state.turn_count, 12);
        assert_eq!(data.event_flags.has_entered_zone1, Some(true));
        assert!(data.deleted_hostile_files.is_empty());
    }
}
