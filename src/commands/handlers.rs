use std::fmt::Write as _;

use glob::Pattern;

use super::processes::KillError;
use super::{CommandError, CommandResult, ExecContext};
use crate::fs::{Access, ListEntry, Permissions, PermissionsPatch, PuzzleLayer, Zone};
use crate::i18n::Locale;
use crate::tutorial::has_all_option;

/// Output of `clear`; the front-end wipes its scrollback when it sees this.
pub const CLEAR_SCREEN: &str = "\x1Bc";

const DEFAULT_HEAD_LINES: usize = 10;

type HandlerResult = Result<CommandResult, CommandError>;

fn split_flags<'a>(args: &[&'a str]) -> (Vec<&'a str>, Vec<&'a str>) {
    args.iter()
        .copied()
        .partition(|arg| arg.starts_with('-') && arg.len() > 1)
}

pub fn ls(ctx: &mut ExecContext<'_>, args: &[&str]) -> HandlerResult {
    let (flags, operands) = split_flags(args);
    let flags: Vec<String> = flags.into_iter().map(str::to_string).collect();
    let show_all = has_all_option(&flags);
    let long = flags
        .iter()
        .any(|f| !f.starts_with("--") && f.contains('l'));

    let dir = match operands.first() {
        Some(path) => match ctx.fs.resolve_dir(path) {
            Some(dir) => dir,
            None => {
                let message = ctx.fmt("commands.no_such_file", &[("command", &"ls"), ("path", path)]);
                return Ok(CommandResult::fail(message, 1));
            }
        },
        None => ctx.fs.current_id(),
    };

    let entries: Vec<ListEntry<'_>> = ctx
        .fs
        .list_directory(Some(dir))
        .into_iter()
        .filter(|entry| show_all || !entry.is_hidden())
        .collect();
    if entries.is_empty() {
        return Ok(CommandResult::ok(ctx.msg("commands.directory_empty"), 2));
    }

    let mut out = String::new();
    for entry in &entries {
        if long {
            let _ = writeln!(out, "{}", long_line(entry));
        } else if entry.is_dir() {
            let _ = writeln!(out, "{}/", entry.name());
        } else {
            let _ = writeln!(out, "{}", entry.name());
        }
    }
    Ok(CommandResult::ok(out.trim_end(), 2))
}

fn long_line(entry: &ListEntry<'_>) -> String {
    match entry {
        ListEntry::Directory(dir) => {
            format!("drwxr-xr-x agent cluster {:>6} {}/", 0, dir.name)
        }
        ListEntry::File(file) => {
            let mut line = format!(
                "{} {} {} {:>6} {}",
                file.permissions.symbolic(),
                file.owner,
                file.group,
                file.size,
                file.name
            );
            if file.corrupted {
                let _ = write!(line, "  [THREAT {}]", file.threat_level);
            }
            line
        }
    }
}

pub fn cd(ctx: &mut ExecContext<'_>, args: &[&str]) -> HandlerResult {
    let target = args.first().copied().unwrap_or("/");
    if ctx.fs.change_directory(target) {
        Ok(CommandResult::ok("", 1))
    } else {
        let message = ctx.fmt("commands.no_such_directory", &[("path", &target)]);
        Ok(CommandResult::fail(message, 1))
    }
}

pub fn pwd(ctx: &mut ExecContext<'_>, _args: &[&str]) -> HandlerResult {
    Ok(CommandResult::ok(ctx.fs.pwd(), 1))
}

/// Shared "missing operand / is a directory / no such file" handling for
/// commands that read one file.
fn missing_file(ctx: &ExecContext<'_>, command: &str, path: &str) -> CommandResult {
    if ctx.fs.resolve_dir(path).is_some() {
        let message = ctx.fmt("commands.is_directory", &[("command", &command), ("path", &path)]);
        CommandResult::fail(message, 1)
    } else {
        let message = ctx.fmt("commands.no_such_file", &[("command", &command), ("path", &path)]);
        CommandResult::fail(message, 2)
    }
}

fn missing_operand(ctx: &ExecContext<'_>, command: &str) -> CommandResult {
    CommandResult::fail(
        ctx.fmt("commands.missing_operand", &[("command", &command)]),
        1,
    )
}

pub fn cat(ctx: &mut ExecContext<'_>, args: &[&str]) -> HandlerResult {
    let Some(path) = args.first().copied() else {
        return Ok(missing_operand(ctx, "cat"));
    };
    let Some(file) = ctx.fs.get_file(path) else {
        return Ok(missing_file(ctx, "cat", path));
    };

    let output = if file.corrupted {
        let banner = ctx.fmt("commands.corrupted_banner", &[("threat", &file.threat_level)]);
        format!("{}\n{}", banner, file.content)
    } else {
        file.content.clone()
    };
    Ok(CommandResult::ok(output, 2).with_knowledge(1))
}

pub fn rm(ctx: &mut ExecContext<'_>, args: &[&str]) -> HandlerResult {
    let Some(target) = args.first().copied() else {
        return Ok(missing_operand(ctx, "rm"));
    };
    if ctx.fs.resolve_dir(target).is_some() {
        return Ok(CommandResult::fail(ctx.fmt("rm.is_directory", &[("path", &target)]), 1));
    }

    let Some(removal) = ctx.fs.remove_file(target) else {
        // Only the current directory is writable; a file elsewhere exists but is out of reach.
        let key = if ctx.fs.get_file(target).is_some() {
            "rm.denied"
        } else {
            "rm.not_found"
        };
        return Ok(CommandResult::fail(ctx.fmt(key, &[("path", &target)]), 2));
    };

    let mut lines = Vec::new();
    if removal.hostile.is_some() {
        lines.push(ctx.msg("rm.progress"));
    }
    lines.push(ctx.fmt("rm.removed", &[("name", &removal.file.name)]));

    let mut result = CommandResult::ok("", 3);
    if let Some(entry) = removal.hostile {
        lines.push(ctx.msg(entry.narrative_key));
        lines.push(ctx.fmt("rm.threat_reduced", &[("threat", &entry.threat)]));
        result = result
            .with_threat_delta(-f64::from(entry.threat))
            .with_attack(Some(entry.effect));
    }
    match removal.injected {
        Some(PuzzleLayer::Corrupted) => lines.push(ctx.msg("rm.layer_corrupted")),
        Some(PuzzleLayer::Leech) => lines.push(ctx.msg("rm.layer_leech")),
        None => {}
    }
    match removal.unlocked {
        Some(Zone::Zone2) => lines.push(ctx.msg("rm.zone2_unlocked")),
        Some(Zone::Zone3) => lines.push(ctx.msg("rm.zone3_unlocked")),
        _ => {}
    }
    result.should_exit =
        ctx.exit_after_final_zone && removal.unlocked.is_some_and(|zone| zone.next().is_none());
    result.output = lines.join("\n");
    Ok(result)
}

pub fn help(ctx: &mut ExecContext<'_>, _args: &[&str]) -> HandlerResult {
    let sections: [(&str, &[&str]); 4] = [
        ("help.navigation", &["ls", "cd", "pwd"]),
        ("help.file_operations", &["cat", "head", "rm", "find", "grep", "chmod"]),
        ("help.process_management", &["ps", "kill"]),
        ("help.help_section", &["help", "man", "quest", "clear"]),
    ];

    let mut out = ctx.msg("help.title");
    for (title, commands) in sections {
        let _ = write!(out, "\n\n{}", ctx.msg(title));
        for command in commands {
            let description = ctx.msg(&format!("help.commands.{}", command));
            let _ = write!(out, "\n  {:<8}{}", command, description);
        }
    }
    if let Some(hint) = ctx.hint {
        let _ = write!(out, "\n\n{}\n{}", ctx.msg("help.current_objective"), hint.description);
    }
    Ok(CommandResult::ok(out, 0))
}

pub fn clear(_ctx: &mut ExecContext<'_>, _args: &[&str]) -> HandlerResult {
    Ok(CommandResult::ok(CLEAR_SCREEN, 0))
}

pub fn ps(ctx: &mut ExecContext<'_>, _args: &[&str]) -> HandlerResult {
    let mut out = format!("{:>5}  {:<16} {:<8} {}", "PID", "NAME", "TYPE", "THREAT");
    for process in ctx.processes.list() {
        let _ = write!(
            out,
            "\n{:>5}  {:<16} {:<8} {}",
            process.pid, process.name, process.kind, process.threat
        );
    }
    Ok(CommandResult::ok(out, 1))
}

pub fn kill(ctx: &mut ExecContext<'_>, args: &[&str]) -> HandlerResult {
    let Some(raw) = args.first().copied() else {
        return Ok(missing_operand(ctx, "kill"));
    };
    let Ok(pid) = raw.parse::<u32>() else {
        return Ok(CommandResult::fail(ctx.fmt("commands.invalid_pid", &[("pid", &raw)]), 1));
    };

    match ctx.processes.kill(pid) {
        Ok(process) => {
            let message = ctx.fmt(
                "commands.process_terminated",
                &[("pid", &pid), ("name", &process.name), ("threat", &process.threat)],
            );
            Ok(CommandResult::ok(message, 2).with_threat_delta(-f64::from(process.threat)))
        }
        Err(KillError::NoSuchProcess(_)) => Ok(CommandResult::fail(
            ctx.fmt("commands.no_such_process", &[("pid", &pid)]),
            2,
        )),
        Err(KillError::Protected(_)) => Ok(CommandResult::fail(
            ctx.fmt("commands.protected_process", &[("pid", &pid)]),
            2,
        )),
    }
}

pub fn find(ctx: &mut ExecContext<'_>, args: &[&str]) -> HandlerResult {
    let operands: Vec<&str> = args.iter().copied().filter(|arg| *arg != "-name").collect();
    let (start, pattern) = match operands.as_slice() {
        [] => return Ok(missing_operand(ctx, "find")),
        [pattern] => (None, *pattern),
        [dir, pattern, ..] => (Some(*dir), *pattern),
    };

    let dir = match start {
        Some(path) => match ctx.fs.resolve_dir(path) {
            Some(dir) => Some(dir),
            None => {
                let message = ctx.fmt("commands.no_such_directory", &[("path", &path)]);
                return Ok(CommandResult::fail(message, 1));
            }
        },
        None => None,
    };

    let found = if pattern.contains(['*', '?', '[']) {
        let glob = Pattern::new(pattern).map_err(|source| CommandError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        ctx.fs.find_matching(dir, |name| glob.matches(name))
    } else {
        ctx.fs.find_files(pattern, dir)
    };

    if found.is_empty() {
        return Ok(CommandResult::ok(
            ctx.fmt("commands.no_matches", &[("pattern", &pattern)]),
            2,
        ));
    }
    let paths: Vec<String> = found.into_iter().map(|hit| hit.path).collect();
    Ok(CommandResult::ok(paths.join("\n"), 2))
}

pub fn grep(ctx: &mut ExecContext<'_>, args: &[&str]) -> HandlerResult {
    let [pattern, path, ..] = args else {
        return Ok(missing_operand(ctx, "grep"));
    };
    let Some(file) = ctx.fs.get_file(path) else {
        return Ok(missing_file(ctx, "grep", path));
    };

    let matches: Vec<&str> = file
        .content
        .lines()
        .filter(|line| line.contains(pattern))
        .collect();
    if matches.is_empty() {
        let message = ctx.fmt("commands.grep_no_match", &[("pattern", pattern), ("path", path)]);
        return Ok(CommandResult::fail(message, 2));
    }
    Ok(CommandResult::ok(matches.join("\n"), 2))
}

pub fn head(ctx: &mut ExecContext<'_>, args: &[&str]) -> HandlerResult {
    let mut count = DEFAULT_HEAD_LINES;
    let mut path = None;
    let mut iter = args.iter().copied();
    while let Some(arg) = iter.next() {
        let raw_count = match arg {
            "-n" => iter.next().unwrap_or_default(),
            _ if arg.starts_with("-n") => &arg[2..],
            _ if arg.starts_with('-') && arg.len() > 1 => &arg[1..],
            _ => {
                path = Some(arg);
                continue;
            }
        };
        match raw_count.parse::<usize>() {
            Ok(n) => count = n,
            Err(_) => {
                let message = ctx.fmt("commands.invalid_count", &[("count", &raw_count)]);
                return Ok(CommandResult::fail(message, 1));
            }
        }
    }

    let Some(path) = path else {
        return Ok(missing_operand(ctx, "head"));
    };
    let Some(file) = ctx.fs.get_file(path) else {
        return Ok(missing_file(ctx, "head", path));
    };
    let lines: Vec<&str> = file.content.lines().take(count).collect();
    Ok(CommandResult::ok(lines.join("\n"), 1))
}

/// `+x`, `-w` and friends, applied to all three classes.
fn symbolic_mode(mode: &str, current: Permissions) -> Option<Permissions> {
    let (grant, bit) = match mode.as_bytes() {
        [b'+', bit] => (true, *bit),
        [b'-', bit] => (false, *bit),
        _ => return None,
    };
    let update = |access: Access| -> Option<Access> {
        let mut access = access;
        match bit {
            b'r' => access.read = grant,
            b'w' => access.write = grant,
            b'x' => access.execute = grant,
            _ => return None,
        }
        Some(access)
    };
    Some(Permissions {
        owner: update(current.owner)?,
        group: update(current.group)?,
        other: update(current.other)?,
    })
}

pub fn chmod(ctx: &mut ExecContext<'_>, args: &[&str]) -> HandlerResult {
    let [mode, name, ..] = args else {
        return Ok(missing_operand(ctx, "chmod"));
    };
    let Some(current) = ctx.fs.current().files.get(*name).map(|f| f.permissions) else {
        return Ok(missing_file(ctx, "chmod", name));
    };
    let Some(permissions) = Permissions::from_octal(mode).or_else(|| symbolic_mode(mode, current))
    else {
        return Ok(CommandResult::fail(ctx.fmt("commands.invalid_mode", &[("mode", mode)]), 1));
    };

    ctx.fs
        .update_file_permissions(name, &PermissionsPatch::all(permissions));
    let message = ctx.fmt(
        "commands.mode_changed",
        &[("name", name), ("mode", &permissions.symbolic())],
    );
    Ok(CommandResult::ok(message, 2))
}

pub fn man(ctx: &mut ExecContext<'_>, args: &[&str]) -> HandlerResult {
    let Some(command) = args.first().copied() else {
        return Ok(CommandResult::fail(ctx.msg("man.usage"), 0));
    };
    let key = format!("man.{}", command);
    if matches!(command, "unknown" | "usage") || !ctx.catalog.contains(Locale::En, &key) {
        return Ok(CommandResult::fail(
            ctx.fmt("man.unknown", &[("command", &command)]),
            0,
        ));
    }
    Ok(CommandResult::ok(ctx.msg(&key), 0).with_knowledge(1))
}

pub fn quest(ctx: &mut ExecContext<'_>, _args: &[&str]) -> HandlerResult {
    let output = match ctx.hint {
        Some(hint) => format!("{}\n{}", ctx.msg("quest.title"), hint.description),
        None => ctx.msg("quest.complete"),
    };
    Ok(CommandResult::ok(output, 0))
}

pub fn debug(ctx: &mut ExecContext<'_>, _args: &[&str]) -> HandlerResult {
    let deleted = ctx.fs.deleted_hostile_files().join(", ");
    let unlocked: Vec<&str> = Zone::ALL
        .iter()
        .filter(|zone| ctx.fs.is_zone_unlocked(**zone))
        .map(|zone| zone.name())
        .collect();
    let output = format!(
        "phase: {}\nhint: {}\ncwd: {}\nunlocked: {}\ndeleted hostile files: [{}]",
        ctx.phase,
        ctx.hint.map(|hint| hint.hint_key).unwrap_or("-"),
        ctx.fs.pwd(),
        unlocked.join(", "),
        deleted
    );
    Ok(CommandResult::ok(output, 0))
}

#[cfg(test)]
mod tests {
    use super::super::{execute, ProcessManager};
    use super::*;
    use crate::fs::{build_world, AttackEffect, VirtualFileSystem};
    use crate::i18n::Catalog;
    use crate::tutorial::Hint;

    struct Shell {
        fs: VirtualFileSystem,
        processes: ProcessManager,
        catalog: Catalog,
        hint: Option<Hint>,
        exit_after_final_zone: bool,
    }

    impl Shell {
        fn new() -> Self {
            let catalog = Catalog::embedded().unwrap();
            Shell {
                fs: build_world(&catalog, Locale::En),
                processes: ProcessManager::new(Some(11)),
                catalog,
                hint: None,
                exit_after_final_zone: false,
            }
        }

        fn run(&mut self, input: &str) -> CommandResult {
            let mut ctx = ExecContext {
                fs: &mut self.fs,
                processes: &mut self.processes,
                catalog: &self.catalog,
                locale: Locale::En,
                hint: self.hint.as_ref(),
                phase: "test",
                dev_mode: false,
                exit_after_final_zone: self.exit_after_final_zone,
            };
            execute(input, &mut ctx)
        }
    }

    #[test]
    fn ls_hides_dotfiles_unless_asked() {
        let mut sh = Shell::new();
        sh.run("cd /zone1/logs");
        let plain = sh.run("ls");
        assert!(plain.success);
        assert_eq!(plain.energy_cost, 2);
        assert!(!plain.output.contains(".hidden"));
        assert!(sh.run("ls -a").output.contains(".hidden/"));
    }

    #[test]
    fn ls_lists_directories_first() {
        let mut sh = Shell::new();
        let out = sh.run("ls /zone1").output;
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, vec!["auth/", "bin/", "logs/", "tmp/", "README.txt"]);
    }

    #[test]
    fn ls_long_shows_threat() {
        let mut sh = Shell::new();
        let out = sh.run("ls -l /zone1/tmp").output;
        assert!(out.contains("virus.exe  [THREAT 3]"));
        assert!(out.contains("-rw-r--r-- agent cluster"));
    }

    #[test]
    fn cd_costs_and_failures() {
        let mut sh = Shell::new();
        let ok = sh.run("cd zone1");
        assert!(ok.success);
        assert_eq!(ok.energy_cost, 1);
        let bad = sh.run("cd nowhere");
        assert!(!bad.success);
        assert_eq!(sh.fs.pwd(), "/zone1");
        sh.run("cd");
        assert_eq!(sh.fs.pwd(), "/");
    }

    #[test]
    fn cat_outcomes() {
        let mut sh = Shell::new();
        assert_eq!(sh.run("cat").energy_cost, 1);
        let dir = sh.run("cat zone1");
        assert!(dir.output.contains("Is a directory"));
        assert_eq!(dir.energy_cost, 1);

        let read = sh.run("cat /zone1/README.txt");
        assert!(read.success);
        assert_eq!(read.knowledge_gain, 1);

        let corrupted = sh.run("cat /zone1/tmp/virus.exe");
        assert!(corrupted.output.starts_with("[CORRUPTED FILE - THREAT LEVEL 3]"));
    }

    #[test]
    fn rm_only_reaches_current_directory() {
        let mut sh = Shell::new();
        let denied = sh.run("rm /zone1/tmp/virus.exe");
        assert!(!denied.success);
        assert!(denied.output.contains("Permission denied"));
        assert_eq!(denied.energy_cost, 2);

        let missing = sh.run("rm ghost.txt");
        assert!(missing.output.contains("No such file"));
        assert_eq!(sh.run("rm zone1").energy_cost, 1);
        assert_eq!(sh.run("rm").energy_cost, 1);
    }

    #[test]
    fn rm_hostile_reports_threat_and_effect() {
        let mut sh = Shell::new();
        sh.run("cd /zone1/tmp");
        let result = sh.run("rm virus.exe");
        assert!(result.success);
        assert_eq!(result.energy_cost, 3);
        assert_eq!(result.threat_delta, -3.0);
        assert_eq!(result.attack_effect, Some(AttackEffect::Medium));
        assert!(result.output.contains("Threat level reduced by 3"));

        let plain = sh.run("rm cache.tmp");
        assert!(plain.success);
        assert_eq!(plain.attack_effect, None);
        assert_eq!(plain.threat_delta, 0.0);
    }

    #[test]
    fn clearing_zone1_announces_zone2() {
        let mut sh = Shell::new();
        sh.run("cd /zone1/tmp");
        sh.run("rm virus.exe");
        sh.run("cd /zone1/logs/.hidden");
        let result = sh.run("rm malware.dat");
        assert!(result.output.contains("Zone 2 gateway activated"));
        assert!(!result.should_exit);
    }

    #[test]
    fn final_zone_can_request_exit() {
        let mut sh = Shell::new();
        sh.exit_after_final_zone = true;
        sh.fs.set_deleted_hostile_files(&[
            "virus.exe".to_string(),
            "malware.dat".to_string(),
            "quantum_virus.exe".to_string(),
            "data_corruptor.bin".to_string(),
        ]);
        assert!(sh.fs.change_directory(crate::fs::world::LEECH_HIDDEN));
        let result = sh.run("rm system_leech.dll");
        assert_eq!(result.attack_effect, Some(AttackEffect::High));
        assert!(result.should_exit);
    }

    #[test]
    fn kill_rules() {
        let mut sh = Shell::new();
        assert!(sh.run("kill 1").output.contains("Operation not permitted"));
        assert!(sh.run("kill abc").output.contains("invalid process id"));
        let killed = sh.run("kill 203");
        assert!(killed.success);
        assert_eq!(killed.threat_delta, -3.0);
        assert!(!sh.run("ps").output.contains("log_monitor"));
        assert!(sh.run("kill 203").output.contains("No such process"));
    }

    #[test]
    fn find_substring_and_glob() {
        let mut sh = Shell::new();
        let sub = sh.run("find zone1 -name .log");
        assert_eq!(sub.output, "/zone1/logs/error.log\n/zone1/logs/system.log");
        let glob = sh.run("find /zone1 *.exe");
        assert_eq!(glob.output, "/zone1/tmp/virus.exe");
        assert!(sh.run("find nothing_like_this").output.contains("no matches"));
    }

    #[test]
    fn grep_and_head() {
        let mut sh = Shell::new();
        assert!(sh.run("grep Cleanup /zone1/bin/cleanup.sh").success);
        assert!(!sh.run("grep zzz /zone1/bin/cleanup.sh").success);
        let head = sh.run("head -n 2 /zone1/bin/cleanup.sh");
        assert_eq!(head.output.lines().count(), 2);
        assert!(!sh.run("head -n x /zone1/bin/cleanup.sh").success);
    }

    #[test]
    fn chmod_modes() {
        let mut sh = Shell::new();
        sh.run("cd /zone1/bin");
        let plus_x = sh.run("chmod +x cleanup.sh");
        assert!(plus_x.output.contains("-rwxr-x--x"));
        let octal = sh.run("chmod 644 cleanup.sh");
        assert!(octal.output.contains("-rw-r--r--"));
        assert!(!sh.run("chmod +q cleanup.sh").success);
        assert!(!sh.run("chmod 755 nothing").success);
    }

    #[test]
    fn help_appends_objective() {
        let mut sh = Shell::new();
        assert!(!sh.run("help").output.contains("Current objective"));
        sh.hint = Some(Hint {
            description: "Do the thing".to_string(),
            hint_key: "zone2.welcome",
        });
        let out = sh.run("help").output;
        assert!(out.ends_with("Current objective:\nDo the thing"));
        assert!(sh.run("quest").output.contains("Do the thing"));
    }

    #[test]
    fn man_pages() {
        let mut sh = Shell::new();
        let page = sh.run("man rm");
        assert!(page.success);
        assert_eq!(page.knowledge_gain, 1);
        assert!(!sh.run("man usage").success);
        assert!(!sh.run("man frobnicate").success);
    }
}
