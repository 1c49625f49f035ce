/// What the trackers see of one processed command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateContext {
    /// Lowercased command name, `None` for blank input.
    pub command: Option<String>,
    pub args: Vec<String>,
    pub success: bool,
    pub previous_path: String,
    pub current_path: String,
}

impl UpdateContext {
    pub fn from_input(
        input: &str,
        success: bool,
        previous_path: impl Into<String>,
        current_path: impl Into<String>,
    ) -> Self {
        let mut parts = input.split_whitespace();
        let command = parts.next().map(str::to_lowercase);
        UpdateContext {
            command,
            args: parts.map(str::to_string).collect(),
            success,
            previous_path: previous_path.into(),
            current_path: current_path.into(),
        }
    }

    /// The command name, only if it succeeded.
    pub(crate) fn successful_command(&self) -> Option<&str> {
        if self.success {
            self.command.as_deref()
        } else {
            None
        }
    }

    pub(crate) fn first_arg(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

/// `-a`, `--all`, or any short flag cluster containing `a` (`-la`, `-al`).
pub fn has_all_option(args: &[String]) -> bool {
    args.iter().any(|arg| {
        arg == "-a" || arg == "--all" || (arg.starts_with('-') && !arg.starts_with("--") && arg.contains('a'))
    })
}

/// Matches `expected` or `<anything>/expected` after stripping a leading `./`.
pub fn names_file(target: &str, expected: &str) -> bool {
    let normalized = target.strip_prefix("./").unwrap_or(target);
    normalized == expected
        || normalized
            .strip_suffix(expected)
            .is_some_and(|prefix| prefix.ends_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn input_is_split_and_lowercased() {
        let ctx = UpdateContext::from_input("  LS   -a  logs ", true, "/", "/");
        assert_eq!(ctx.command.as_deref(), Some("ls"));
        assert_eq!(ctx.args, args(&["-a", "logs"]));

        let blank = UpdateContext::from_input("   ", false, "/", "/");
        assert_eq!(blank.command, None);
        assert!(blank.args.is_empty());
    }

    #[test]
    fn all_option_variants() {
        assert!(has_all_option(&args(&["-a"])));
        assert!(has_all_option(&args(&["--all"])));
        assert!(has_all_option(&args(&["-la"])));
        assert!(has_all_option(&args(&["-l", "-al"])));
        assert!(!has_all_option(&args(&["-l"])));
        assert!(!has_all_option(&args(&["a"])));
    }

    #[test]
    fn file_targets() {
        assert!(names_file("README.txt", "README.txt"));
        assert!(names_file("./README.txt", "README.txt"));
        assert!(names_file("/zone1/README.txt", "README.txt"));
        assert!(!names_file("NOT_README.txt", "README.txt"));
        assert!(!names_file("readme.txt", "README.txt"));
    }
}
