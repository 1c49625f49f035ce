//! The orchestrator: owns the session and runs one turn per command.

mod events;
mod state;

use tracing::{debug, info, warn};

use crate::commands::{self, CommandResult, ExecContext, ProcessManager};
use crate::config::GameConfig;
use crate::fs::{build_world, Zone, VirtualFileSystem};
use crate::i18n::{Catalog, Locale};
use crate::save::{EventFlags, SaveData};
use crate::tutorial::{zone1, zone2, Hint, UpdateContext, Zone1Flags, Zone2Flags};

pub use events::{GameEvent, GameOverReason, TurnOutcome};
pub use state::{GamePhase, GameState};

/// One play session.
///
/// The filesystem, process table and progress flags are owned here and lent
/// to the command handlers for the length of a single call.
#[derive(Debug)]
pub struct Game {
    state: GameState,
    fs: VirtualFileSystem,
    processes: ProcessManager,
    zone1: Zone1Flags,
    zone2: Zone2Flags,
    completed_zones: Vec<Zone>,
    phase: GamePhase,
    game_over_reason: Option<GameOverReason>,
    config: GameConfig,
    catalog: Catalog,
    locale: Locale,
    dev_mode: bool,
}

impl Game {
    pub fn new(config: GameConfig, catalog: Catalog, locale: Locale) -> Self {
        let fs = build_world(&catalog, locale);
        let processes = ProcessManager::new(config.turn.rng_seed);
        Game {
            state: GameState::new(&config.vitals),
            fs,
            processes,
            zone1: zone1::create_initial(),
            zone2: zone2::create_initial(),
            completed_zones: Vec::new(),
            phase: GamePhase::Zone1Tutorial,
            game_over_reason: None,
            config,
            catalog,
            locale,
            dev_mode: false,
        }
    }

    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for debugging tools and tests.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn fs(&self) -> &VirtualFileSystem {
        &self.fs
    }

    pub fn processes(&self) -> &ProcessManager {
        &self.processes
    }

    pub fn zone1_flags(&self) -> &Zone1Flags {
        &self.zone1
    }

    pub fn zone2_flags(&self) -> &Zone2Flags {
        &self.zone2
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn completed_zones(&self) -> &[Zone] {
        &self.completed_zones
    }

    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        self.game_over_reason
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn message(&self, key: &str) -> String {
        self.catalog.get_message(self.locale, key)
    }

    /// The objective for the current phase, as `help` and `quest` show it.
    pub fn current_hint(&self) -> Option<Hint> {
        match self.phase {
            GamePhase::Zone1Tutorial => zone1::get_hint(&self.zone1, &self.catalog, self.locale),
            GamePhase::Zone2Tutorial => zone2::get_hint(&self.zone2, &self.catalog, self.locale),
            GamePhase::FreeExploration | GamePhase::GameOver => None,
        }
    }

    /// The hint shown without asking. Zone2 keeps its hints behind `help`.
    pub fn display_hint(&self) -> Option<Hint> {
        match self.phase {
            GamePhase::Zone1Tutorial => self.current_hint(),
            _ => None,
        }
    }

    /// Runs one command through the whole turn pipeline.
    pub fn process_command(&mut self, input: &str) -> TurnOutcome {
        if self.state.is_game_over {
            return TurnOutcome {
                result: CommandResult::fail(self.message("game.rejected"), 0),
                events: Vec::new(),
            };
        }
        let input = input.trim();
        if input.is_empty() {
            return TurnOutcome {
                result: CommandResult::ok("", 0),
                events: Vec::new(),
            };
        }

        let previous_path = self.fs.pwd().to_string();
        let unlocked_before = self.unlocked_zones();
        let hint = self.current_hint();

        let result = {
            let mut ctx = ExecContext {
                fs: &mut self.fs,
                processes: &mut self.processes,
                catalog: &self.catalog,
                locale: self.locale,
                hint: hint.as_ref(),
                phase: self.phase.as_str(),
                dev_mode: self.dev_mode,
                exit_after_final_zone: self.config.session.exit_after_final_zone,
            };
            commands::execute(input, &mut ctx)
        };
        debug!(input, success = result.success, cost = result.energy_cost, "command processed");

        self.state.spend_energy(result.energy_cost);
        self.state.turn_count += 1;
        self.state.adjust_threat(result.threat_delta);
        self.state.knowledge += result.knowledge_gain;
        self.sync_path();

        let mut events = Vec::new();
        for zone in Zone::ALL {
            if self.fs.is_zone_unlocked(zone) && !unlocked_before.contains(&zone) {
                events.push(GameEvent::ZoneUnlocked(zone));
                if zone == Zone::Zone2 {
                    self.processes.spawn_fork_sprite();
                }
            }
        }

        let update = UpdateContext::from_input(
            input,
            result.success,
            previous_path,
            self.state.current_path.clone(),
        );
        if zone1::next_hint_key(&self.zone1).is_some() {
            zone1::update(&mut self.zone1, &update);
        }
        if self.fs.is_zone_unlocked(Zone::Zone2) {
            zone2::update(&mut self.zone2, &update);
        }
        self.sync_hostile_flags();

        self.check_zone_completion(&mut events);
        self.check_help_notification(&mut events);
        self.apply_passive_effects(&mut events);
        self.check_game_over(&mut events);
        self.update_phase(&mut events);

        TurnOutcome { result, events }
    }

    fn unlocked_zones(&self) -> Vec<Zone> {
        Zone::ALL
            .into_iter()
            .filter(|zone| self.fs.is_zone_unlocked(*zone))
            .collect()
    }

    fn sync_path(&mut self) {
        self.state.current_path = self.fs.pwd().to_string();
        self.state.current_depth = self.fs.depth();
    }

    /// Removal flags follow the filesystem's record of deleted hostile files,
    /// whichever way the deletion happened.
    fn sync_hostile_flags(&mut self) {
        for name in self.fs.deleted_hostile_files() {
            match name.as_str() {
                "virus.exe" => self.zone1.removed_virus = true,
                "malware.dat" => self.zone1.removed_malware = true,
                "quantum_virus.exe" => self.zone2.removed_quantum_virus = true,
                "data_corruptor.bin" => self.zone2.removed_data_corruptor = true,
                "system_leech.dll" => self.zone2.removed_system_leech = true,
                _ => {}
            }
        }
    }

    fn check_zone_completion(&mut self, events: &mut Vec<GameEvent>) {
        for zone in [Zone::Zone1, Zone::Zone2] {
            if self.fs.is_zone_cleared(zone) && !self.completed_zones.contains(&zone) {
                info!(zone = zone.name(), "zone completed");
                self.completed_zones.push(zone);
                events.push(GameEvent::ZoneCompleted(zone));
            }
        }
    }

    fn check_help_notification(&mut self, events: &mut Vec<GameEvent>) {
        if Zone::Zone2.contains(&self.state.current_path) && !self.zone2.shown_help_notification {
            self.zone2.shown_help_notification = true;
            events.push(GameEvent::HelpNotification);
        }
    }

    fn apply_passive_effects(&mut self, events: &mut Vec<GameEvent>) {
        let turn = &self.config.turn;
        self.state.regenerate_energy(turn.energy_regen);
        self.state.adjust_threat(-turn.threat_decay);
        for child in self.processes.tick(turn.fork_spawn_chance) {
            self.state.adjust_threat(f64::from(child.threat));
            events.push(GameEvent::ForkSpawned {
                pid: child.pid,
                threat: child.threat,
            });
        }
    }

    fn check_game_over(&mut self, events: &mut Vec<GameEvent>) {
        let reason = if self.state.hp <= 0 {
            Some(GameOverReason::SystemPanic)
        } else if self.state.disk_usage >= self.state.max_disk_usage {
            Some(GameOverReason::DiskFull)
        } else if self.state.threat_level >= self.config.turn.critical_threat {
            Some(GameOverReason::ThreatCritical)
        } else {
            None
        };
        if let Some(reason) = reason {
            warn!(?reason, turn = self.state.turn_count, "game over");
            self.state.is_game_over = true;
            self.game_over_reason = Some(reason);
            events.push(GameEvent::GameOver(reason));
        }
    }

    fn derive_phase(&self) -> GamePhase {
        if self.state.is_game_over {
            GamePhase::GameOver
        } else if self.fs.is_zone_cleared(Zone::Zone2) {
            GamePhase::FreeExploration
        } else if zone1::next_hint_key(&self.zone1).is_none() {
            GamePhase::Zone2Tutorial
        } else {
            GamePhase::Zone1Tutorial
        }
    }

    fn update_phase(&mut self, events: &mut Vec<GameEvent>) {
        let next = self.derive_phase();
        if next != self.phase {
            info!(from = %self.phase, to = %next, "phase changed");
            events.push(GameEvent::PhaseChanged {
                from: self.phase,
                to: next,
            });
            self.phase = next;
        }
    }

    /// Jumps straight into `zone` with everything before it already done.
    pub fn setup_debug_zone(&mut self, zone: Zone) {
        let mut deleted = Vec::new();
        match zone {
            Zone::Zone1 => {
                self.zone1.listed_root = true;
            }
            Zone::Zone2 => {
                deleted.extend(["virus.exe", "malware.dat"]);
                self.zone1 = Zone1Flags::completed();
            }
            Zone::Zone3 => {
                deleted.extend([
                    "virus.exe",
                    "malware.dat",
                    "quantum_virus.exe",
                    "data_corruptor.bin",
                    "system_leech.dll",
                ]);
                self.zone1 = Zone1Flags::completed();
                self.zone2 = Zone2Flags::completed();
            }
        }
        let deleted: Vec<String> = deleted.into_iter().map(str::to_string).collect();
        self.fs.set_deleted_hostile_files(&deleted);
        self.sync_hostile_flags();
        self.completed_zones = [Zone::Zone1, Zone::Zone2]
            .into_iter()
            .filter(|z| self.fs.is_zone_cleared(*z))
            .collect();
        if self.fs.is_zone_unlocked(Zone::Zone2) {
            self.processes.spawn_fork_sprite();
        }

        if !self.fs.change_directory(zone.root_path()) {
            warn!(zone = zone.name(), "debug zone root missing, staying at /");
        }
        self.sync_path();
        match zone {
            Zone::Zone1 => {
                self.zone1.entered_zone1 = true;
                self.zone1.last_zone1_directory = self.state.current_path.clone();
            }
            Zone::Zone2 => {
                self.zone2.entered_zone2 = true;
                self.zone2.current_path = self.state.current_path.clone();
            }
            Zone::Zone3 => {}
        }
        self.phase = self.derive_phase();
        info!(zone = zone.name(), phase = %self.phase, "debug zone ready");
    }

    /// Like [`setup_debug_zone`](Self::setup_debug_zone) for a zone given by
    /// name. Unknown names fall back to zone1.
    pub fn setup_debug_zone_by_name(&mut self, name: &str) -> Zone {
        let zone = Zone::from_name(name).unwrap_or_else(|| {
            warn!(name, "unknown start zone, using zone1");
            Zone::Zone1
        });
        self.setup_debug_zone(zone);
        zone
    }

    /// A save record of the current session.
    pub fn snapshot(&self) -> SaveData {
        SaveData::new(
            self.state.clone(),
            self.completed_zones.clone(),
            self.fs.deleted_hostile_files().to_vec(),
            self.fs.is_zone_unlocked(Zone::Zone2),
            EventFlags {
                zone1: self.zone1.clone(),
                zone2: self.zone2.clone(),
                has_entered_zone1: None,
            },
        )
    }

    /// Restores a saved session on top of a freshly built world.
    ///
    /// Unlocks and puzzle layers are rebuilt from the deleted hostile files,
    /// not from any stored unlock flag.
    pub fn apply_save(&mut self, data: SaveData) {
        let SaveData {
            game_state,
            completed_zones,
            deleted_hostile_files,
            event_flags,
            ..
        } = data;

        self.state = game_state;
        self.state.is_game_over = false;
        self.state.is_paused = false;
        self.game_over_reason = None;

        self.fs.set_deleted_hostile_files(&deleted_hostile_files);
        self.zone1 = event_flags.zone1;
        self.zone2 = event_flags.zone2;
        if event_flags.has_entered_zone1 == Some(true) {
            self.zone1.entered_zone1 = true;
        }
        for zone in &completed_zones {
            match zone {
                Zone::Zone1 => {
                    self.zone1.removed_virus = true;
                    self.zone1.removed_malware = true;
                }
                Zone::Zone2 => {
                    self.zone2.removed_quantum_virus = true;
                    self.zone2.removed_data_corruptor = true;
                    self.zone2.removed_system_leech = true;
                }
                Zone::Zone3 => {}
            }
        }
        self.completed_zones = completed_zones;
        self.sync_hostile_flags();

        if self.fs.is_zone_unlocked(Zone::Zone2) {
            self.processes.spawn_fork_sprite();
        }
        let saved_path = self.state.current_path.clone();
        if !self.fs.change_directory(&saved_path) {
            warn!(path = %saved_path, "saved path no longer exists, starting at /");
            self.fs.change_directory("/");
        }
        self.sync_path();
        self.phase = self.derive_phase();
        info!(phase = %self.phase, turn = self.state.turn_count, "save applied");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> Game {
        let mut config = GameConfig::default();
        config.turn.rng_seed = Some(5);
        Game::new(config, Catalog::embedded().unwrap(), Locale::En)
    }

    fn play(game: &mut Game, script: &[&str]) -> Vec<GameEvent> {
        script
            .iter()
            .flat_map(|line| game.process_command(line).events)
            .collect()
    }

    #[test]
    fn turn_updates_counters() {
        let mut g = game();
        let outcome = g.process_command("cat /zone1/README.txt");
        assert!(outcome.result.success);
        let state = g.state();
        assert_eq!(state.turn_count, 1);
        assert_eq!(state.knowledge, 1);
        // 40 - 2 spent + 2 regenerated, capped at max.
        assert_eq!(state.energy, 40);
        assert_eq!(state.threat_level, 6.5);
    }

    #[test]
    fn blank_input_is_not_a_turn() {
        let mut g = game();
        g.process_command("   ");
        assert_eq!(g.state().turn_count, 0);
    }

    #[test]
    fn path_and_depth_follow_the_cursor() {
        let mut g = game();
        g.process_command("cd /zone1/logs");
        assert_eq!(g.state().current_path, "/zone1/logs");
        assert_eq!(g.state().current_depth, 2);
    }

    #[test]
    fn zone1_playthrough_moves_to_zone2_phase() {
        let mut g = game();
        let events = play(
            &mut g,
            &[
                "ls",
                "cd zone1",
                "ls",
                "cat README.txt",
                "cd tmp",
                "ls",
                "rm virus.exe",
                "cd ..",
                "cd logs",
                "ls",
                "ls -a",
                "cd .hidden",
                "ls",
                "rm malware.dat",
            ],
        );
        assert!(events.contains(&GameEvent::ZoneUnlocked(Zone::Zone2)));
        assert!(events.contains(&GameEvent::ZoneCompleted(Zone::Zone1)));
        assert_eq!(g.phase(), GamePhase::Zone1Tutorial);
        assert!(g.processes().list().iter().any(|p| p.name == "fork_sprite"));

        let events = play(&mut g, &["cd /", "cd zone2"]);
        assert!(events.contains(&GameEvent::HelpNotification));
        assert!(events.contains(&GameEvent::PhaseChanged {
            from: GamePhase::Zone1Tutorial,
            to: GamePhase::Zone2Tutorial,
        }));
        assert!(g.display_hint().is_none());
        assert_eq!(g.current_hint().map(|h| h.hint_key), Some("zone2.welcome"));

        let again = play(&mut g, &["ls"]);
        assert!(!again.contains(&GameEvent::HelpNotification));
    }

    #[test]
    fn zone_completion_is_reported_once() {
        let mut g = game();
        g.setup_debug_zone(Zone::Zone2);
        assert_eq!(g.completed_zones(), &[Zone::Zone1]);
        let events = play(&mut g, &["ls", "pwd"]);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::ZoneCompleted(_))));
    }

    #[test]
    fn game_over_is_sticky() {
        let mut g = game();
        g.state_mut().threat_level = 30.0;
        let outcome = g.process_command("pwd");
        assert_eq!(outcome.game_over(), Some(GameOverReason::ThreatCritical));
        assert_eq!(g.phase(), GamePhase::GameOver);

        let rejected = g.process_command("ls");
        assert!(!rejected.result.success);
        assert_eq!(rejected.result.output, "Game Over. Restart to play again.");
        assert!(g.state().is_game_over);
        assert_eq!(g.state().turn_count, 1);
    }

    #[test]
    fn game_over_reasons_in_order() {
        let mut g = game();
        g.state_mut().hp = 0;
        g.state_mut().disk_usage = 100;
        g.process_command("pwd");
        assert_eq!(g.game_over_reason(), Some(GameOverReason::SystemPanic));

        let mut g = game();
        g.state_mut().disk_usage = 100;
        g.process_command("pwd");
        assert_eq!(g.game_over_reason(), Some(GameOverReason::DiskFull));
    }

    #[test]
    fn debug_zones() {
        let mut g = game();
        assert_eq!(g.setup_debug_zone_by_name("nowhere"), Zone::Zone1);
        assert_eq!(g.state().current_path, "/zone1");

        let mut g = game();
        g.setup_debug_zone(Zone::Zone3);
        assert_eq!(g.state().current_path, "/zone3");
        assert_eq!(g.phase(), GamePhase::FreeExploration);
        assert_eq!(g.completed_zones(), &[Zone::Zone1, Zone::Zone2]);
        assert!(g.current_hint().is_none());
    }

    #[test]
    fn killing_processes_lowers_threat() {
        let mut g = game();
        g.process_command("kill 114");
        // 7 - 4 killed - 0.5 decay
        assert_eq!(g.state().threat_level, 2.5);
    }

    #[test]
    fn save_round_trip_replays_unlocks() {
        let mut g = game();
        g.setup_debug_zone(Zone::Zone2);
        play(&mut g, &["cd 2/3/5/.hidden", "rm quantum_virus.exe", "cd D41a&"]);
        let snapshot = g.snapshot();

        let mut restored = game();
        restored.apply_save(snapshot.clone());
        assert_eq!(restored.state().current_path, "/zone2/2/3/5/.hidden/D41a&");
        assert!(restored.zone2_flags().removed_quantum_virus);
        assert_eq!(restored.phase(), GamePhase::Zone2Tutorial);
        assert_eq!(restored.snapshot().deleted_hostile_files, snapshot.deleted_hostile_files);
    }
}
