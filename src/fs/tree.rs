use std::collections::HashMap;

use tracing::{debug, info, warn};

use super::hostile::{self, HostileEntry, PuzzleLayer, Zone};
use super::types::{PermissionsPatch, VirtualFile};

/// Index of a directory node inside the filesystem arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DirId(usize);

/// Event that promotes a pending subtree into the live tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unlock {
    Zone(Zone),
    Layer(PuzzleLayer),
}

#[derive(Debug)]
pub struct Directory {
    pub name: String,
    pub path: String,
    pub files: HashMap<String, VirtualFile>,
    subdirectories: HashMap<String, DirId>,
    parent: Option<DirId>,
    pub explored: bool,
}

impl Directory {
    fn new(name: &str, path: String, parent: Option<DirId>) -> Self {
        Directory {
            name: name.to_string(),
            path,
            files: HashMap::new(),
            subdirectories: HashMap::new(),
            parent,
            explored: false,
        }
    }

    pub fn parent(&self) -> Option<DirId> {
        self.parent
    }

    pub fn subdirectory(&self, name: &str) -> Option<DirId> {
        self.subdirectories.get(name).copied()
    }

    pub fn has_subdirectory(&self, name: &str) -> bool {
        self.subdirectories.contains_key(name)
    }
}

#[derive(Debug)]
struct PendingSubtree {
    trigger: Unlock,
    parent: DirId,
    child: DirId,
    attached: bool,
}

#[derive(Debug, Clone, Copy)]
pub enum ListEntry<'a> {
    Directory(&'a Directory),
    File(&'a VirtualFile),
}

impl<'a> ListEntry<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            ListEntry::Directory(dir) => &dir.name,
            ListEntry::File(file) => &file.name,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, ListEntry::Directory(_))
    }

    pub fn is_hidden(&self) -> bool {
        self.name().starts_with('.')
    }
}

#[derive(Debug)]
pub struct FoundFile<'a> {
    pub path: String,
    pub file: &'a VirtualFile,
}

/// What a successful deletion did to the world.
#[derive(Debug)]
pub struct Removal {
    pub file: VirtualFile,
    pub hostile: Option<&'static HostileEntry>,
    pub unlocked: Option<Zone>,
    pub injected: Option<PuzzleLayer>,
}

/// In-memory directory tree with a navigation cursor.
///
/// Directories live in an arena and are never freed. Gated regions are
/// built up front as detached nodes and linked into their parent's child
/// map when the matching [`Unlock`] fires.
#[derive(Debug)]
pub struct VirtualFileSystem {
    dirs: Vec<Directory>,
    root: DirId,
    cwd: DirId,
    pending: Vec<PendingSubtree>,
    deleted_hostile: Vec<String>,
}

fn child_path(parent: &str, name: &str) -> String {
    if parent == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", parent, name)
    }
}

impl VirtualFileSystem {
    /// A filesystem holding only `/`.
    pub fn empty() -> Self {
        let root = DirId(0);
        VirtualFileSystem {
            dirs: vec![Directory::new("/", "/".to_string(), None)],
            root,
            cwd: root,
            pending: Vec::new(),
            deleted_hostile: Vec::new(),
        }
    }

    pub fn root(&self) -> DirId {
        self.root
    }

    pub fn current_id(&self) -> DirId {
        self.cwd
    }

    pub fn current(&self) -> &Directory {
        self.directory(self.cwd)
    }

    pub fn directory(&self, id: DirId) -> &Directory {
        &self.dirs[id.0]
    }

    /// Creates a directory and links it under `parent`.
    pub fn add_dir(&mut self, parent: DirId, name: &str) -> DirId {
        let id = self.push_dir(parent, name);
        self.dirs[parent.0]
            .subdirectories
            .insert(name.to_string(), id);
        id
    }

    /// Creates a directory that stays invisible until `trigger` fires.
    pub fn add_pending_dir(&mut self, parent: DirId, name: &str, trigger: Unlock) -> DirId {
        let child = self.push_dir(parent, name);
        self.pending.push(PendingSubtree {
            trigger,
            parent,
            child,
            attached: false,
        });
        child
    }

    fn push_dir(&mut self, parent: DirId, name: &str) -> DirId {
        let path = child_path(&self.dirs[parent.0].path, name);
        let id = DirId(self.dirs.len());
        self.dirs.push(Directory::new(name, path, Some(parent)));
        id
    }

    pub fn add_file(&mut self, dir: DirId, file: VirtualFile) {
        self.dirs[dir.0].files.insert(file.name.clone(), file);
    }

    pub fn pwd(&self) -> &str {
        &self.current().path
    }

    /// Number of path segments below `/` at the cursor.
    pub fn depth(&self) -> usize {
        self.pwd().split('/').filter(|p| !p.is_empty()).count()
    }

    pub fn change_directory(&mut self, path: &str) -> bool {
        let target = match path {
            "/" => Some(self.root),
            ".." => self.current().parent,
            "." => return true,
            _ => self.resolve_dir(path),
        };

        match target {
            Some(id) => {
                self.cwd = id;
                self.dirs[id.0].explored = true;
                true
            }
            None => false,
        }
    }

    /// Resolves an absolute or relative directory path without moving the cursor.
    pub fn resolve_dir(&self, path: &str) -> Option<DirId> {
        if path.is_empty() {
            return None;
        }
        let mut current = if path.starts_with('/') {
            self.root
        } else {
            self.cwd
        };

        for part in path.split('/').filter(|p| !p.is_empty()) {
            let dir = &self.dirs[current.0];
            current = match part {
                "." => current,
                ".." => dir.parent?,
                name => dir.subdirectory(name)?,
            };
        }
        Some(current)
    }

    /// Directories first, then files, each group sorted by name.
    pub fn list_directory(&self, dir: Option<DirId>) -> Vec<ListEntry<'_>> {
        let dir = self.directory(dir.unwrap_or(self.cwd));
        let mut entries: Vec<ListEntry<'_>> = dir
            .subdirectories
            .values()
            .map(|id| ListEntry::Directory(&self.dirs[id.0]))
            .chain(dir.files.values().map(ListEntry::File))
            .collect();

        entries.sort_by(|a, b| {
            b.is_dir()
                .cmp(&a.is_dir())
                .then_with(|| a.name().cmp(b.name()))
        });
        entries
    }

    pub fn get_file(&self, path: &str) -> Option<&VirtualFile> {
        let (dir, name) = match path.rsplit_once('/') {
            None => (self.cwd, path),
            Some(("", name)) => (self.root, name),
            Some((dir_path, name)) => (self.resolve_dir(dir_path)?, name),
        };
        if name.is_empty() {
            return None;
        }
        self.dirs[dir.0].files.get(name)
    }

    /// Removes `name` from the current directory only. Returns false if absent.
    pub fn delete_file(&mut self, name: &str) -> bool {
        self.remove_file(name).is_some()
    }

    /// Like [`delete_file`](Self::delete_file) but reports milestone side effects.
    pub fn remove_file(&mut self, name: &str) -> Option<Removal> {
        let file = self.dirs[self.cwd.0].files.remove(name)?;
        debug!(path = %child_path(self.pwd(), name), "file removed");

        let mut removal = Removal {
            file,
            hostile: None,
            unlocked: None,
            injected: None,
        };
        if let Some(entry) = hostile::hostile(name) {
            let (unlocked, injected) = self.record_hostile_deletion(entry);
            removal.hostile = Some(entry);
            removal.unlocked = unlocked;
            removal.injected = injected;
        }
        Some(removal)
    }

    fn record_hostile_deletion(
        &mut self,
        entry: &'static HostileEntry,
    ) -> (Option<Zone>, Option<PuzzleLayer>) {
        if !self.deleted_hostile.iter().any(|name| name == entry.name) {
            self.deleted_hostile.push(entry.name.to_string());
            info!(file = entry.name, zone = entry.zone.name(), "hostile file eliminated");
        }

        let injected = entry
            .injects
            .filter(|layer| self.attach(Unlock::Layer(*layer)));
        if let Some(layer) = injected {
            info!(?layer, "puzzle layer injected");
        }

        let unlocked = match entry.zone.next() {
            Some(next) if self.is_zone_cleared(entry.zone) && self.attach(Unlock::Zone(next)) => {
                info!(zone = next.name(), "zone unlocked");
                Some(next)
            }
            _ => None,
        };
        (unlocked, injected)
    }

    /// Links every pending subtree for `trigger`. Returns true if anything new appeared.
    fn attach(&mut self, trigger: Unlock) -> bool {
        let mut attached_any = false;
        for pending in self.pending.iter_mut() {
            if pending.trigger != trigger || pending.attached {
                continue;
            }
            let name = self.dirs[pending.child.0].name.clone();
            self.dirs[pending.parent.0]
                .subdirectories
                .entry(name)
                .or_insert(pending.child);
            pending.attached = true;
            attached_any = true;
        }
        attached_any
    }

    pub fn unlock_zone(&mut self, zone: Zone) -> bool {
        self.attach(Unlock::Zone(zone))
    }

    pub fn is_zone_unlocked(&self, zone: Zone) -> bool {
        self.directory(self.root).has_subdirectory(zone.name())
    }

    /// True once every hostile file belonging to `zone` has been deleted.
    pub fn is_zone_cleared(&self, zone: Zone) -> bool {
        hostile::zone_hostiles(zone)
            .all(|entry| self.deleted_hostile.iter().any(|name| name == entry.name))
    }

    pub fn deleted_hostile_files(&self) -> &[String] {
        &self.deleted_hostile
    }

    /// Replays recorded deletions so unlocks and injections match a saved session.
    pub fn set_deleted_hostile_files(&mut self, names: &[String]) {
        for name in names {
            let Some(entry) = hostile::hostile(name) else {
                warn!(file = %name, "ignoring unknown hostile file in replay");
                continue;
            };
            for dir in self.dirs.iter_mut() {
                dir.files.remove(entry.name);
            }
            self.record_hostile_deletion(entry);
        }
    }

    pub fn update_file_permissions(&mut self, name: &str, patch: &PermissionsPatch) -> bool {
        match self.dirs[self.cwd.0].files.get_mut(name) {
            Some(file) => {
                file.permissions.apply(patch);
                true
            }
            None => false,
        }
    }

    /// Recursive substring search over the live subtree at `dir` (or the cursor).
    pub fn find_files(&self, pattern: &str, dir: Option<DirId>) -> Vec<FoundFile<'_>> {
        self.find_matching(dir, |name| name.contains(pattern))
    }

    pub fn find_matching(
        &self,
        dir: Option<DirId>,
        matches: impl Fn(&str) -> bool,
    ) -> Vec<FoundFile<'_>> {
        let mut results = Vec::new();
        let mut stack = vec![dir.unwrap_or(self.cwd)];

        while let Some(id) = stack.pop() {
            let dir = &self.dirs[id.0];
            let mut files: Vec<&VirtualFile> =
                dir.files.values().filter(|f| matches(&f.name)).collect();
            files.sort_by(|a, b| a.name.cmp(&b.name));
            results.extend(files.into_iter().map(|file| FoundFile {
                path: child_path(&dir.path, &file.name),
                file,
            }));

            let mut subdirs: Vec<(&String, &DirId)> = dir.subdirectories.iter().collect();
            subdirs.sort_by(|a, b| b.0.cmp(a.0));
            stack.extend(subdirs.into_iter().map(|(_, id)| *id));
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::types::{Access, Permissions};

    fn sample() -> VirtualFileSystem {
        let mut fs = VirtualFileSystem::empty();
        let root = fs.root();
        let a = fs.add_dir(root, "a");
        let b = fs.add_dir(a, "b");
        fs.add_file(a, VirtualFile::new("zeta.txt", "z"));
        fs.add_file(a, VirtualFile::new("alpha.txt", "a"));
        fs.add_dir(a, "m");
        fs.add_file(b, VirtualFile::new("deep.log", "deep"));
        fs
    }

    #[test]
    fn absolute_cd_then_pwd_round_trips() {
        let mut fs = sample();
        for path in ["/a", "/a/b", "/a/m", "/"] {
            assert!(fs.change_directory(path));
            assert_eq!(fs.pwd(), path);
        }
    }

    #[test]
    fn failed_cd_leaves_cursor() {
        let mut fs = sample();
        assert!(fs.change_directory("/a"));
        assert!(!fs.change_directory("b/missing"));
        assert!(!fs.change_directory("/a/b/missing"));
        assert!(!fs.change_directory("../../.."));
        assert_eq!(fs.pwd(), "/a");
    }

    #[test]
    fn dot_and_parent_navigation() {
        let mut fs = sample();
        assert!(!fs.change_directory(".."));
        assert!(fs.change_directory("."));
        assert_eq!(fs.pwd(), "/");
        assert!(fs.change_directory("a/b"));
        assert!(fs.change_directory("../m"));
        assert_eq!(fs.pwd(), "/a/m");
        assert!(fs.current().explored);
    }

    #[test]
    fn listing_puts_directories_first() {
        let mut fs = sample();
        fs.change_directory("/a");
        let names: Vec<_> = fs.list_directory(None).iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["b", "m", "alpha.txt", "zeta.txt"]);
    }

    #[test]
    fn get_file_resolves_without_moving() {
        let mut fs = sample();
        fs.change_directory("/a");
        assert!(fs.get_file("b/deep.log").is_some());
        assert!(fs.get_file("/a/b/deep.log").is_some());
        assert!(fs.get_file("../a/alpha.txt").is_some());
        assert!(fs.get_file("b/").is_none());
        assert!(fs.get_file("nope/deep.log").is_none());
        assert_eq!(fs.pwd(), "/a");
    }

    #[test]
    fn deleted_files_stay_gone() {
        let mut fs = sample();
        fs.change_directory("/a");
        assert!(fs.delete_file("alpha.txt"));
        assert!(!fs.delete_file("alpha.txt"));
        assert!(fs.get_file("alpha.txt").is_none());
        assert!(!fs.delete_file("deep.log"));
    }

    #[test]
    fn pending_subtree_attaches_once() {
        let mut fs = sample();
        let root = fs.root();
        let hidden = fs.add_pending_dir(root, "zone2", Unlock::Zone(Zone::Zone2));
        fs.add_dir(hidden, "inner");
        assert!(!fs.change_directory("/zone2"));
        assert!(!fs.is_zone_unlocked(Zone::Zone2));

        assert!(fs.unlock_zone(Zone::Zone2));
        assert!(!fs.unlock_zone(Zone::Zone2));
        assert!(fs.change_directory("/zone2/inner"));
        assert_eq!(fs.pwd(), "/zone2/inner");
    }

    #[test]
    fn find_walks_subtree_in_name_order() {
        let fs = sample();
        let found: Vec<_> = fs.find_files(".", None).into_iter().map(|f| f.path).collect();
        assert_eq!(found, vec!["/a/alpha.txt", "/a/zeta.txt", "/a/b/deep.log"]);
        assert!(fs.find_files("missing", None).is_empty());
    }

    #[test]
    fn permissions_update_in_current_dir() {
        let mut fs = sample();
        fs.change_directory("/a");
        let patch = PermissionsPatch {
            owner: Some(Access::new(true, true, true)),
            ..PermissionsPatch::default()
        };
        assert!(fs.update_file_permissions("alpha.txt", &patch));
        assert!(!fs.update_file_permissions("deep.log", &patch));
        let perms = fs.get_file("alpha.txt").unwrap().permissions;
        assert_eq!(perms.owner, Access::new(true, true, true));
        assert_eq!(perms.group, Permissions::default().group);
    }
}
