use rogsh::fs::{ListEntry, Zone};
use rogsh::game::{GameOverReason, GamePhase};
use rogsh::{Catalog, Game, GameConfig, Locale};

fn new_game() -> Game {
    let mut config = GameConfig::default();
    config.turn.rng_seed = Some(1234);
    Game::new(config, Catalog::embedded().unwrap(), Locale::En)
}

fn root_names(game: &Game) -> Vec<String> {
    game.fs()
        .list_directory(Some(game.fs().root()))
        .iter()
        .map(ListEntry::name)
        .map(str::to_string)
        .collect()
}

#[test]
fn ls_then_cd_into_zone1() {
    let mut game = new_game();
    let ls = game.process_command("ls");
    assert!(ls.result.success);
    assert!(ls.result.output.lines().any(|line| line == "zone1/"));

    let cd = game.process_command("cd zone1");
    assert!(cd.result.success);
    assert_eq!(game.fs().pwd(), "/zone1");
    assert_eq!(game.state().current_path, "/zone1");
}

#[test]
fn removing_virus_costs_three_and_sets_flag() {
    let mut game = new_game();
    game.process_command("cd /zone1/tmp");
    let rm = game.process_command("rm virus.exe");
    assert!(rm.result.success);
    assert_eq!(rm.result.energy_cost, 3);

    let ls = game.process_command("ls");
    assert!(!ls.result.output.contains("virus.exe"));
    assert!(game.zone1_flags().removed_virus);
}

#[test]
fn clearing_zone1_reveals_zone2() {
    let mut game = new_game();
    assert!(!root_names(&game).contains(&"zone2".to_string()));

    game.process_command("cd /zone1/tmp");
    game.process_command("rm virus.exe");
    assert!(!root_names(&game).contains(&"zone2".to_string()));

    game.process_command("cd /zone1/logs/.hidden");
    game.process_command("rm malware.dat");
    assert!(root_names(&game).contains(&"zone2".to_string()));
    assert!(game.fs().is_zone_unlocked(Zone::Zone2));
}

#[test]
fn cat_missing_file_fails_and_costs_energy() {
    let mut game = new_game();
    let before = game.state().energy;
    let cat = game.process_command("cat nonexistent.txt");
    assert!(!cat.result.success);
    assert_eq!(cat.result.energy_cost, 2);
    assert!(cat.result.output.contains("No such file"));
    // Regeneration refills what was spent, but never past the cap.
    assert!(game.state().energy <= before);
}

#[test]
fn critical_threat_ends_the_game_for_good() {
    let mut config = GameConfig::default();
    config.turn.threat_decay = -2.0;
    config.turn.rng_seed = Some(9);
    let mut game = Game::new(config, Catalog::embedded().unwrap(), Locale::En);

    let mut turns = 0;
    while !game.state().is_game_over {
        game.process_command("pwd");
        turns += 1;
        assert!(turns < 20, "threat never reached the critical level");
    }
    assert_eq!(game.game_over_reason(), Some(GameOverReason::ThreatCritical));
    assert_eq!(game.phase(), GamePhase::GameOver);

    let turn_count = game.state().turn_count;
    let rejected = game.process_command("ls");
    assert!(!rejected.result.success);
    assert!(game.state().is_game_over);
    assert_eq!(game.state().turn_count, turn_count);
}

#[test]
fn full_run_reaches_free_exploration() {
    let mut game = new_game();
    let script = [
        "cd /zone1/tmp",
        "rm virus.exe",
        "cd /zone1/logs/.hidden",
        "rm malware.dat",
        "cd /",
        "cd zone2",
        "cd 2/3/5/.hidden",
        "rm quantum_virus.exe",
        "cd D41a&/wQ43au/p127x/.hidden",
        "rm data_corruptor.bin",
        "cd lol/Zll/lBl/.hidden",
        "rm system_leech.dll",
    ];
    for line in script {
        let outcome = game.process_command(line);
        assert!(outcome.result.success, "`{}` failed: {}", line, outcome.result.output);
        // Keep fork_sprite replication from ending the run early.
        game.state_mut().threat_level = 0.0;
    }
    assert_eq!(game.phase(), GamePhase::FreeExploration);
    assert_eq!(game.completed_zones(), &[Zone::Zone1, Zone::Zone2]);
    assert!(root_names(&game).contains(&"zone3".to_string()));
    assert!(game.process_command("cd /zone3").result.success);
}
