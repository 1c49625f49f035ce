//! Command dispatch: a closed table from command name to handler.
//!
//! Handlers get an [`ExecContext`] borrowed from the game for the duration
//! of one call, so they can touch the filesystem and process table without
//! holding onto the game itself.

mod handlers;
pub mod processes;
mod result;

use tracing::{debug, warn};

use crate::fs::VirtualFileSystem;
use crate::i18n::{Catalog, Locale};
use crate::tutorial::Hint;

pub use handlers::CLEAR_SCREEN;
pub use processes::{KillError, Process, ProcessKind, ProcessManager};
pub use result::{CommandError, CommandResult};

const UNKNOWN_COST: u32 = 1;

/// Everything a handler may read or mutate during one call.
pub struct ExecContext<'a> {
    pub fs: &'a mut VirtualFileSystem,
    pub processes: &'a mut ProcessManager,
    pub catalog: &'a Catalog,
    pub locale: Locale,
    /// Current tutorial objective, shown by `help` and `quest`.
    pub hint: Option<&'a Hint>,
    /// Name of the orchestrator's current phase, shown by `debug`.
    pub phase: &'a str,
    pub dev_mode: bool,
    /// Set `should_exit` when a deletion clears the last zone.
    pub exit_after_final_zone: bool,
}

impl ExecContext<'_> {
    pub(crate) fn msg(&self, key: &str) -> String {
        self.catalog.get_message(self.locale, key)
    }

    pub(crate) fn fmt(&self, key: &str, args: &[(&str, &dyn std::fmt::Display)]) -> String {
        self.catalog.format(self.locale, key, args)
    }
}

type Handler = fn(&mut ExecContext<'_>, &[&str]) -> Result<CommandResult, CommandError>;

const COMMANDS: &[(&str, Handler)] = &[
    ("ls", handlers::ls),
    ("cd", handlers::cd),
    ("pwd", handlers::pwd),
    ("cat", handlers::cat),
    ("rm", handlers::rm),
    ("help", handlers::help),
    ("clear", handlers::clear),
    ("ps", handlers::ps),
    ("kill", handlers::kill),
    ("find", handlers::find),
    ("grep", handlers::grep),
    ("head", handlers::head),
    ("chmod", handlers::chmod),
    ("man", handlers::man),
    ("quest", handlers::quest),
    ("debug", handlers::debug),
];

/// Recognized names that have no handler yet.
const RESERVED: &[&str] = &["cp", "mv", "touch", "mkdir", "echo", "vim"];

/// Names accepted by [`execute`], in table order.
pub fn command_names() -> impl Iterator<Item = &'static str> {
    COMMANDS.iter().map(|(name, _)| *name)
}

pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

/// Runs one input line. Never fails: every problem becomes a failed result.
pub fn execute(input: &str, ctx: &mut ExecContext<'_>) -> CommandResult {
    let mut parts = input.split_whitespace();
    let Some(name) = parts.next() else {
        return CommandResult::ok("", 0);
    };
    let args: Vec<&str> = parts.collect();

    let handler = COMMANDS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, handler)| *handler)
        .filter(|_| name != "debug" || ctx.dev_mode);

    let Some(handler) = handler else {
        let key = if is_reserved(name) {
            "commands.not_implemented"
        } else {
            "commands.not_found"
        };
        debug!(command = name, "unrecognized command");
        return CommandResult::fail(ctx.fmt(key, &[("command", &name)]), UNKNOWN_COST);
    };

    match handler(ctx, &args) {
        Ok(result) => result,
        Err(err) => {
            warn!(command = name, error = %err, "command failed internally");
            CommandResult::fail(
                ctx.fmt("commands.error", &[("command", &name), ("error", &err)]),
                UNKNOWN_COST,
            )
        }
    }
}
