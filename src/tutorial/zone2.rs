use serde::{Deserialize, Serialize};

use super::context::{has_all_option, names_file, UpdateContext};
use super::steps::{next_step, Hint, Step};
use crate::fs::world::{CORRUPTOR_HIDDEN, LEECH_HIDDEN, QUANTUM_HIDDEN};
use crate::fs::Zone;
use crate::i18n::{Catalog, Locale};

const ZONE2: &str = "/zone2";
const DIR2: &str = "/zone2/2";
const DIR3: &str = "/zone2/2/3";
const DIR5: &str = "/zone2/2/3/5";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Zone2Flags {
    pub entered_zone2: bool,
    /// One-shot; set by the orchestrator, never by `update`.
    pub shown_help_notification: bool,
    pub listed_zone2_root: bool,
    pub read_instructions: bool,
    pub entered_prime_path: bool,
    pub entered_dir2: bool,
    pub entered_dir3: bool,
    pub entered_dir5: bool,
    pub listed_dir5: bool,
    pub revealed_quantum_hidden: bool,
    pub entered_hidden: bool,
    pub listed_hidden: bool,
    pub removed_quantum_virus: bool,
    pub explored_corrupted: bool,
    pub found_data_corruptor: bool,
    pub removed_data_corruptor: bool,
    pub found_system_leech: bool,
    pub removed_system_leech: bool,
    pub current_path: String,
}

impl Zone2Flags {
    pub fn completed() -> Self {
        Zone2Flags {
            entered_zone2: true,
            shown_help_notification: true,
            listed_zone2_root: true,
            read_instructions: true,
            entered_prime_path: true,
            entered_dir2: true,
            entered_dir3: true,
            entered_dir5: true,
            listed_dir5: true,
            revealed_quantum_hidden: true,
            entered_hidden: true,
            listed_hidden: true,
            removed_quantum_virus: true,
            explored_corrupted: true,
            found_data_corruptor: true,
            removed_data_corruptor: true,
            found_system_leech: true,
            removed_system_leech: true,
            current_path: String::new(),
        }
    }
}

pub fn create_initial() -> Zone2Flags {
    Zone2Flags::default()
}

pub fn update(flags: &mut Zone2Flags, ctx: &UpdateContext) {
    let path = ctx.current_path.as_str();
    flags.current_path = path.to_string();
    if Zone::Zone2.contains(path) {
        flags.entered_zone2 = true;
    }

    let Some(command) = ctx.successful_command() else {
        return;
    };

    match command {
        "ls" => {
            match path {
                ZONE2 => flags.listed_zone2_root = true,
                DIR5 => flags.listed_dir5 = true,
                QUANTUM_HIDDEN => flags.listed_hidden = true,
                CORRUPTOR_HIDDEN => flags.found_data_corruptor = true,
                LEECH_HIDDEN => flags.found_system_leech = true,
                _ => {}
            }
            if path == DIR5 && has_all_option(&ctx.args) {
                flags.revealed_quantum_hidden = true;
            }
            if path
                .strip_prefix(QUANTUM_HIDDEN)
                .is_some_and(|rest| rest.starts_with('/'))
            {
                flags.explored_corrupted = true;
            }
        }
        "cd" => match path {
            DIR2 => {
                flags.entered_dir2 = true;
                flags.entered_prime_path = true;
            }
            DIR3 => flags.entered_dir3 = true,
            DIR5 => flags.entered_dir5 = true,
            QUANTUM_HIDDEN => flags.entered_hidden = true,
            _ => {}
        },
        "cat" => {
            if path == ZONE2 && ctx.first_arg().is_some_and(|t| names_file(t, "README.txt")) {
                flags.read_instructions = true;
            }
        }
        "rm" => match ctx.first_arg() {
            Some("quantum_virus.exe") => flags.removed_quantum_virus = true,
            Some("data_corruptor.bin") => flags.removed_data_corruptor = true,
            Some("system_leech.dll") => flags.removed_system_leech = true,
            _ => {}
        },
        _ => {}
    }
}

const STEPS: &[Step<Zone2Flags>] = &[
    Step {
        id: "listedZone2Root",
        phase: 0,
        done: |f| f.listed_zone2_root,
        message: |_| "zone2.welcome",
    },
    Step {
        id: "readInstructions",
        phase: 0,
        done: |f| f.read_instructions,
        message: |_| "zone2.read_instructions",
    },
    Step {
        id: "enteredDir2",
        phase: 1,
        done: |f| f.entered_dir2 || f.entered_prime_path,
        message: |_| "zone2.follow_primes",
    },
    Step {
        id: "enteredDir3",
        phase: 1,
        done: |f| f.entered_dir3,
        message: |_| "zone2.next_prime_3",
    },
    Step {
        id: "enteredDir5",
        phase: 1,
        done: |f| f.entered_dir5,
        message: |_| "zone2.next_prime_5",
    },
    Step {
        id: "listedDir5",
        phase: 1,
        done: |f| f.listed_dir5,
        message: |_| "zone2.explore_prime_5",
    },
    Step {
        id: "revealedQuantumHidden",
        phase: 1,
        done: |f| f.revealed_quantum_hidden,
        message: |_| "zone2.find_hidden",
    },
    Step {
        id: "enteredHidden",
        phase: 1,
        done: |f| f.entered_hidden,
        message: |_| "zone2.enter_hidden",
    },
    Step {
        id: "listedHidden",
        phase: 1,
        done: |f| f.listed_hidden,
        message: |_| "zone2.explore_hidden",
    },
    Step {
        id: "removedQuantumVirus",
        phase: 1,
        done: |f| f.removed_quantum_virus,
        message: |_| "zone2.eliminate_target",
    },
    Step {
        id: "exploredCorrupted",
        phase: 2,
        done: |f| f.explored_corrupted,
        message: |_| "zone2.explore_corrupted",
    },
    Step {
        id: "foundDataCorruptor",
        phase: 2,
        done: |f| f.found_data_corruptor,
        message: |_| "zone2.find_more_threats",
    },
    Step {
        id: "removedDataCorruptor",
        phase: 2,
        done: |f| f.removed_data_corruptor,
        message: |_| "zone2.eliminate_data_corruptor",
    },
    Step {
        id: "foundSystemLeech",
        phase: 3,
        done: |f| f.found_system_leech,
        message: |_| "zone2.final_threat",
    },
    Step {
        id: "removedSystemLeech",
        phase: 3,
        done: |f| f.removed_system_leech,
        message: |_| "zone2.eliminate_system_leech",
    },
];

/// Message id of the next zone2 step. `None` before the player reaches zone2
/// and after the leech is gone.
pub fn next_hint_key(flags: &Zone2Flags) -> Option<&'static str> {
    if !flags.entered_zone2 {
        return None;
    }
    next_step(STEPS, flags).map(|step| (step.message)(flags))
}

pub fn next_step_id(flags: &Zone2Flags) -> Option<&'static str> {
    if !flags.entered_zone2 {
        return None;
    }
    next_step(STEPS, flags).map(|step| step.id)
}

pub fn get_hint(flags: &Zone2Flags, catalog: &Catalog, locale: Locale) -> Option<Hint> {
    next_hint_key(flags).map(|key| Hint::resolve(key, catalog, locale))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(flags: &mut Zone2Flags, input: &str, success: bool, path: &str) {
        let ctx = UpdateContext::from_input(input, success, "", path);
        update(flags, &ctx);
    }

    #[test]
    fn silent_until_zone2_is_entered() {
        let mut f = create_initial();
        assert_eq!(next_hint_key(&f), None);
        run(&mut f, "cd /zone2", true, "/zone2");
        assert_eq!(next_hint_key(&f), Some("zone2.welcome"));
    }

    #[test]
    fn prime_path_walkthrough() {
        let mut f = create_initial();
        let script = [
            ("cd /zone2", "/zone2", "zone2.welcome"),
            ("ls", "/zone2", "zone2.read_instructions"),
            ("cat README.txt", "/zone2", "zone2.follow_primes"),
            ("cd 2", "/zone2/2", "zone2.next_prime_3"),
            ("cd 3", "/zone2/2/3", "zone2.next_prime_5"),
            ("cd 5", "/zone2/2/3/5", "zone2.explore_prime_5"),
            ("ls", "/zone2/2/3/5", "zone2.find_hidden"),
            ("ls -a", "/zone2/2/3/5", "zone2.enter_hidden"),
            ("cd .hidden", QUANTUM_HIDDEN, "zone2.explore_hidden"),
            ("ls", QUANTUM_HIDDEN, "zone2.eliminate_target"),
            ("rm quantum_virus.exe", QUANTUM_HIDDEN, "zone2.explore_corrupted"),
            ("cd D41a&", "/zone2/2/3/5/.hidden/D41a&", "zone2.explore_corrupted"),
            ("ls", "/zone2/2/3/5/.hidden/D41a&", "zone2.find_more_threats"),
            ("ls -a", CORRUPTOR_HIDDEN, "zone2.eliminate_data_corruptor"),
            ("rm data_corruptor.bin", CORRUPTOR_HIDDEN, "zone2.final_threat"),
            ("ls", LEECH_HIDDEN, "zone2.eliminate_system_leech"),
        ];
        for (input, path, expected) in script {
            run(&mut f, input, true, path);
            assert_eq!(next_hint_key(&f), Some(expected), "after `{}`", input);
        }
        run(&mut f, "rm system_leech.dll", true, LEECH_HIDDEN);
        assert_eq!(next_hint_key(&f), None);
    }

    #[test]
    fn absolute_jump_skips_earlier_prime_steps() {
        let mut f = create_initial();
        run(&mut f, "ls", true, "/zone2");
        run(&mut f, "cat README.txt", true, "/zone2");
        run(&mut f, "cd /zone2/2/3/5", true, DIR5);
        assert_eq!(next_hint_key(&f), Some("zone2.explore_prime_5"));
    }

    #[test]
    fn listing_the_hidden_root_is_not_exploring_the_corruption() {
        let mut f = create_initial();
        run(&mut f, "ls", true, QUANTUM_HIDDEN);
        assert!(f.listed_hidden);
        assert!(!f.explored_corrupted);
        run(&mut f, "ls", true, "/zone2/2/3/5/.hidden/D40b");
        assert!(f.explored_corrupted);
    }

    #[test]
    fn failed_commands_only_track_location() {
        let mut f = create_initial();
        run(&mut f, "cd 7", false, "/zone2");
        assert!(f.entered_zone2);
        assert_eq!(f.current_path, "/zone2");
        run(&mut f, "rm quantum_virus.exe", false, QUANTUM_HIDDEN);
        assert!(!f.removed_quantum_virus);
    }

    #[test]
    fn readme_outside_zone2_root_does_not_count() {
        let mut f = create_initial();
        run(&mut f, "cat /zone2/README.txt", true, "/");
        assert!(!f.read_instructions);
    }

    #[test]
    fn completed_flags_have_no_hint() {
        assert_eq!(next_hint_key(&Zone2Flags::completed()), None);
    }
}
