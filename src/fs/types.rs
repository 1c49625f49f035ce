use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileKind {
    #[default]
    Regular,
    Directory,
    Symlink,
    Archive,
}

/// One read/write/execute triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    pub read: bool,
    pub write: bool,
    pub execute: bool,
}

impl Access {
    pub const fn new(read: bool, write: bool, execute: bool) -> Self {
        Access { read, write, execute }
    }

    fn from_octal_digit(digit: u32) -> Self {
        Access::new(digit & 4 != 0, digit & 2 != 0, digit & 1 != 0)
    }

    fn symbolic(&self) -> String {
        format!(
            "{}{}{}",
            if self.read { 'r' } else { '-' },
            if self.write { 'w' } else { '-' },
            if self.execute { 'x' } else { '-' }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    pub owner: Access,
    pub group: Access,
    pub other: Access,
}

impl Default for Permissions {
    fn default() -> Self {
        Permissions {
            owner: Access::new(true, true, false),
            group: Access::new(true, false, false),
            other: Access::new(true, false, false),
        }
    }
}

impl Permissions {
    /// Parses a three digit octal mode such as `755`.
    pub fn from_octal(mode: &str) -> Option<Self> {
        if mode.len() != 3 {
            return None;
        }
        let digits: Vec<u32> = mode.chars().map(|c| c.to_digit(8)).collect::<Option<_>>()?;
        Some(Permissions {
            owner: Access::from_octal_digit(digits[0]),
            group: Access::from_octal_digit(digits[1]),
            other: Access::from_octal_digit(digits[2]),
        })
    }

    /// `ls -l` style rendering, e.g. `-rw-r--r--`.
    pub fn symbolic(&self) -> String {
        format!(
            "-{}{}{}",
            self.owner.symbolic(),
            self.group.symbolic(),
            self.other.symbolic()
        )
    }

    /// Shallow merge: each triple present in the patch replaces the current one.
    pub fn apply(&mut self, patch: &PermissionsPatch) {
        if let Some(owner) = patch.owner {
            self.owner = owner;
        }
        if let Some(group) = patch.group {
            self.group = group;
        }
        if let Some(other) = patch.other {
            self.other = other;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PermissionsPatch {
    pub owner: Option<Access>,
    pub group: Option<Access>,
    pub other: Option<Access>,
}

impl PermissionsPatch {
    pub fn all(permissions: Permissions) -> Self {
        PermissionsPatch {
            owner: Some(permissions.owner),
            group: Some(permissions.group),
            other: Some(permissions.other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VirtualFile {
    pub name: String,
    pub kind: FileKind,
    pub content: String,
    /// Fixed at creation; content is never edited afterwards.
    pub size: usize,
    pub permissions: Permissions,
    pub owner: String,
    pub group: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub corrupted: bool,
    pub threat_level: u32,
    pub link_target: Option<String>,
}

impl VirtualFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let now = Utc::now();
        VirtualFile {
            name: name.into(),
            kind: FileKind::Regular,
            size: content.len(),
            content,
            permissions: Permissions::default(),
            owner: "agent".to_string(),
            group: "cluster".to_string(),
            created: now,
            modified: now,
            corrupted: false,
            threat_level: 0,
            link_target: None,
        }
    }

    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = permissions;
        self
    }

    /// Marks the file as corrupted with the given threat level.
    pub fn corrupted(mut self, threat_level: u32) -> Self {
        self.corrupted = true;
        self.threat_level = threat_level;
        self
    }

    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_is_taken_from_content() {
        let file = VirtualFile::new("notes.txt", "hello");
        assert_eq!(file.size, 5);
        assert_eq!(file.owner, "agent");
        assert_eq!(file.group, "cluster");
        assert_eq!(file.threat_level, 0);
        assert!(!file.corrupted);
    }

    #[test]
    fn hidden_follows_leading_dot() {
        assert!(VirtualFile::new(".creds.enc", "").is_hidden());
        assert!(!VirtualFile::new("creds.enc", "").is_hidden());
    }

    #[test]
    fn octal_modes_parse() {
        let perms = Permissions::from_octal("751").unwrap();
        assert_eq!(perms.symbolic(), "-rwxr-x--x");
        assert!(Permissions::from_octal("79").is_none());
        assert!(Permissions::from_octal("778").is_none());
    }

    #[test]
    fn patch_merges_only_present_triples() {
        let mut perms = Permissions::default();
        perms.apply(&PermissionsPatch {
            owner: Some(Access::new(true, true, true)),
            ..PermissionsPatch::default()
        });
        assert_eq!(perms.symbolic(), "-rwxr--r--");
    }
}
