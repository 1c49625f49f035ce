use serde::{Deserialize, Serialize};

use super::context::{has_all_option, names_file, UpdateContext};
use super::steps::{next_step, Hint, Step};
use crate::fs::Zone;
use crate::i18n::{Catalog, Locale};

const ZONE1: &str = "/zone1";
const TMP: &str = "/zone1/tmp";
const LOGS: &str = "/zone1/logs";
const HIDDEN: &str = "/zone1/logs/.hidden";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Zone1Flags {
    pub listed_root: bool,
    pub entered_zone1: bool,
    pub listed_zone1: bool,
    pub read_readme: bool,
    pub entered_tmp: bool,
    pub listed_tmp: bool,
    pub removed_virus: bool,
    pub entered_logs: bool,
    pub listed_logs: bool,
    pub revealed_hidden: bool,
    pub entered_hidden: bool,
    pub listed_hidden: bool,
    pub removed_malware: bool,
    pub returned_root: bool,
    pub entered_zone2: bool,
    /// Last zone1 directory (or root, after a `cd`) the player stood in.
    pub last_zone1_directory: String,
}

impl Zone1Flags {
    /// Every step satisfied, as if the tutorial had been played through.
    pub fn completed() -> Self {
        Zone1Flags {
            listed_root: true,
            entered_zone1: true,
            listed_zone1: true,
            read_readme: true,
            entered_tmp: true,
            listed_tmp: true,
            removed_virus: true,
            entered_logs: true,
            listed_logs: true,
            revealed_hidden: true,
            entered_hidden: true,
            listed_hidden: true,
            removed_malware: true,
            returned_root: true,
            entered_zone2: true,
            last_zone1_directory: String::new(),
        }
    }
}

pub fn create_initial() -> Zone1Flags {
    Zone1Flags::default()
}

pub fn update(flags: &mut Zone1Flags, ctx: &UpdateContext) {
    let path = ctx.current_path.as_str();

    // Location flags update even when the command failed.
    if Zone::Zone1.contains(path) {
        flags.entered_zone1 = true;
        flags.last_zone1_directory = path.to_string();
    }
    if Zone::Zone2.contains(path) {
        flags.entered_zone2 = true;
    }
    if path == "/" && flags.removed_malware {
        flags.returned_root = true;
    }

    let Some(command) = ctx.successful_command() else {
        return;
    };

    match command {
        "cd" => {
            flags.last_zone1_directory = path.to_string();
            match path {
                TMP => flags.entered_tmp = true,
                LOGS => flags.entered_logs = true,
                HIDDEN => flags.entered_hidden = true,
                _ => {}
            }
        }
        "ls" => match path {
            "/" => flags.listed_root = true,
            ZONE1 => flags.listed_zone1 = true,
            TMP => flags.listed_tmp = true,
            LOGS => {
                flags.listed_logs = true;
                if has_all_option(&ctx.args) {
                    flags.revealed_hidden = true;
                }
            }
            HIDDEN => flags.listed_hidden = true,
            _ => {}
        },
        "cat" => {
            if let Some(target) = ctx.first_arg() {
                if Zone::Zone1.contains(path) && names_file(target, "README.txt") {
                    flags.read_readme = true;
                }
            }
        }
        "rm" => match ctx.first_arg() {
            Some("virus.exe") => flags.removed_virus = true,
            Some("malware.dat") => flags.removed_malware = true,
            _ => {}
        },
        _ => {}
    }
}

fn at(flags: &Zone1Flags, path: &str) -> bool {
    flags.last_zone1_directory == path
}

const STEPS: &[Step<Zone1Flags>] = &[
    Step {
        id: "listedRoot",
        phase: 0,
        done: |f| f.listed_root,
        message: |_| "zone1.ls_at_root",
    },
    Step {
        id: "enteredZone1",
        phase: 0,
        done: |f| f.entered_zone1,
        message: |_| "zone1.cd_zone1_from_root",
    },
    Step {
        id: "listedZone1",
        phase: 1,
        done: |f| f.listed_zone1,
        message: |f| {
            if at(f, ZONE1) {
                "zone1.ls_at_zone1"
            } else {
                "zone1.cd_zone1"
            }
        },
    },
    Step {
        id: "readReadme",
        phase: 1,
        done: |f| f.read_readme,
        message: |f| {
            if at(f, ZONE1) {
                "zone1.cat_readme"
            } else {
                "zone1.cd_zone1_and_cat_readme"
            }
        },
    },
    Step {
        id: "enteredTmp",
        phase: 2,
        done: |f| f.entered_tmp,
        message: |f| {
            if at(f, ZONE1) {
                "zone1.cd_tmp_from_zone1"
            } else {
                "zone1.cd_tmp"
            }
        },
    },
    Step {
        id: "listedTmp",
        phase: 2,
        done: |f| f.listed_tmp,
        message: |f| if at(f, TMP) { "zone1.ls_at_tmp" } else { "zone1.cd_tmp" },
    },
    Step {
        id: "removedVirus",
        phase: 2,
        done: |f| f.removed_virus,
        message: |f| if at(f, TMP) { "zone1.rm_virus" } else { "zone1.cd_tmp" },
    },
    Step {
        id: "enteredLogs",
        phase: 3,
        done: |f| f.entered_logs,
        message: |f| {
            if at(f, TMP) {
                "zone1.cd_zone1_after_virus_removed"
            } else if at(f, ZONE1) {
                "zone1.cd_logs_from_zone1"
            } else {
                "zone1.cd_logs"
            }
        },
    },
    Step {
        id: "listedLogs",
        phase: 3,
        done: |f| f.listed_logs,
        message: |f| if at(f, LOGS) { "zone1.ls_at_logs" } else { "zone1.cd_logs" },
    },
    Step {
        id: "revealedHidden",
        phase: 3,
        done: |f| f.revealed_hidden,
        message: |f| if at(f, LOGS) { "zone1.ls_all_at_logs" } else { "zone1.cd_logs" },
    },
    Step {
        id: "enteredHidden",
        phase: 3,
        done: |f| f.entered_hidden,
        message: |f| {
            if at(f, LOGS) {
                "zone1.cd_hidden_from_logs"
            } else {
                "zone1.cd_hidden"
            }
        },
    },
    Step {
        id: "listedHidden",
        phase: 3,
        done: |f| f.listed_hidden,
        message: |f| if at(f, HIDDEN) { "zone1.ls_at_hidden" } else { "zone1.cd_hidden" },
    },
    Step {
        id: "removedMalware",
        phase: 3,
        done: |f| f.removed_malware,
        message: |f| if at(f, HIDDEN) { "zone1.rm_malware" } else { "zone1.cd_hidden" },
    },
    Step {
        id: "returnedRoot",
        phase: 4,
        done: |f| f.returned_root,
        message: |_| "zone1.cd_root_after_malware_removed",
    },
    Step {
        id: "enteredZone2",
        phase: 4,
        done: |f| f.entered_zone2,
        message: |f| {
            if at(f, "/") {
                "zone1.cd_zone2"
            } else {
                "zone1.cd_root_after_malware_removed"
            }
        },
    },
];

/// Message id of the next zone1 step, `None` once the zone is done.
pub fn next_hint_key(flags: &Zone1Flags) -> Option<&'static str> {
    next_step(STEPS, flags).map(|step| (step.message)(flags))
}

/// Id of the next unmet step, for debugging.
pub fn next_step_id(flags: &Zone1Flags) -> Option<&'static str> {
    next_step(STEPS, flags).map(|step| step.id)
}

pub fn get_hint(flags: &Zone1Flags, catalog: &Catalog, locale: Locale) -> Option<Hint> {
    next_hint_key(flags).map(|key| Hint::resolve(key, catalog, locale))
}
