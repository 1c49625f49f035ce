use serde::{Deserialize, Serialize};

/// A gated region of the filesystem with its own completion criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Zone1,
    Zone2,
    Zone3,
}

impl Zone {
    pub const ALL: [Zone; 3] = [Zone::Zone1, Zone::Zone2, Zone::Zone3];

    pub fn name(self) -> &'static str {
        match self {
            Zone::Zone1 => "zone1",
            Zone::Zone2 => "zone2",
            Zone::Zone3 => "zone3",
        }
    }

    pub fn root_path(self) -> &'static str {
        match self {
            Zone::Zone1 => "/zone1",
            Zone::Zone2 => "/zone2",
            Zone::Zone3 => "/zone3",
        }
    }

    pub fn from_name(name: &str) -> Option<Zone> {
        Zone::ALL.into_iter().find(|zone| zone.name() == name)
    }

    /// The zone unlocked once every hostile file of this one is gone.
    pub fn next(self) -> Option<Zone> {
        match self {
            Zone::Zone1 => Some(Zone::Zone2),
            Zone::Zone2 => Some(Zone::Zone3),
            Zone::Zone3 => None,
        }
    }

    /// Exact-or-descendant match; `/zone10` is not inside `/zone1`.
    pub fn contains(self, path: &str) -> bool {
        let root = self.root_path();
        path == root
            || path
                .strip_prefix(root)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// Nested zone2 puzzle layers materialized by specific deletions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PuzzleLayer {
    /// `D41a&/wQ43au/p127x` under `/zone2/2/3/5/.hidden`.
    Corrupted,
    /// `lol/Zll/lBl` under `p127x/.hidden`.
    Leech,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackEffect {
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostileEntry {
    pub name: &'static str,
    pub zone: Zone,
    pub threat: u32,
    pub effect: AttackEffect,
    /// Message id of the narrative line shown after deletion.
    pub narrative_key: &'static str,
    pub injects: Option<PuzzleLayer>,
}

pub const HOSTILE_FILES: &[HostileEntry] = &[
    HostileEntry {
        name: "virus.exe",
        zone: Zone::Zone1,
        threat: 3,
        effect: AttackEffect::Medium,
        narrative_key: "rm.zone1_hostile",
        injects: None,
    },
    HostileEntry {
        name: "malware.dat",
        zone: Zone::Zone1,
        threat: 4,
        effect: AttackEffect::Medium,
        narrative_key: "rm.zone1_hostile",
        injects: None,
    },
    HostileEntry {
        name: "quantum_virus.exe",
        zone: Zone::Zone2,
        threat: 5,
        effect: AttackEffect::Medium,
        narrative_key: "rm.quantum_virus",
        injects: Some(PuzzleLayer::Corrupted),
    },
    HostileEntry {
        name: "data_corruptor.bin",
        zone: Zone::Zone2,
        threat: 5,
        effect: AttackEffect::Medium,
        narrative_key: "rm.data_corruptor",
        injects: Some(PuzzleLayer::Leech),
    },
    HostileEntry {
        name: "system_leech.dll",
        zone: Zone::Zone2,
        threat: 6,
        effect: AttackEffect::High,
        narrative_key: "rm.system_leech",
        injects: None,
    },
];

pub fn hostile(name: &str) -> Option<&'static HostileEntry> {
    HOSTILE_FILES.iter().find(|entry| entry.name == name)
}

pub fn zone_hostiles(zone: Zone) -> impl Iterator<Item = &'static HostileEntry> {
    HOSTILE_FILES.iter().filter(move |entry| entry.zone == zone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_containment_is_segment_aware() {
        assert!(Zone::Zone1.contains("/zone1"));
        assert!(Zone::Zone1.contains("/zone1/logs/.hidden"));
        assert!(!Zone::Zone1.contains("/zone10"));
        assert!(!Zone::Zone1.contains("/"));
    }

    #[test]
    fn hostile_sets_per_zone() {
        let zone1: Vec<_> = zone_hostiles(Zone::Zone1).map(|s| s.name).collect();
        assert_eq!(zone1, vec!["virus.exe", "malware.dat"]);
        assert_eq!(zone_hostiles(Zone::Zone2).count(), 3);
        assert_eq!(zone_hostiles(Zone::Zone3).count(), 0);
    }

    #[test]
    fn lookup_is_exact() {
        assert!(hostile("virus.exe").is_some());
        assert!(hostile("./virus.exe").is_none());
        assert!(hostile("VIRUS.EXE").is_none());
    }
}
