pub mod hostile;
pub mod tree;
pub mod types;
pub mod world;

pub use hostile::{hostile, zone_hostiles, AttackEffect, HostileEntry, PuzzleLayer, Zone, HOSTILE_FILES};
pub use tree::{DirId, Directory, FoundFile, ListEntry, Removal, Unlock, VirtualFileSystem};
pub use types::{Access, FileKind, Permissions, PermissionsPatch, VirtualFile};
pub use world::build_world;
