//! The fixed world: zone1 tutorial tree, the gated zone2 prime-path puzzle
//! with its two injected layers, and the zone3 gateway.

use super::hostile::{hostile, PuzzleLayer, Zone};
use super::tree::{DirId, Unlock, VirtualFileSystem};
use super::types::{Access, Permissions, VirtualFile};
use crate::i18n::{Catalog, Locale};

/// Path under which the first puzzle layer is injected.
pub const QUANTUM_HIDDEN: &str = "/zone2/2/3/5/.hidden";
/// Path under which the second puzzle layer is injected.
pub const CORRUPTOR_HIDDEN: &str = "/zone2/2/3/5/.hidden/D41a&/wQ43au/p127x/.hidden";
pub const LEECH_HIDDEN: &str = "/zone2/2/3/5/.hidden/D41a&/wQ43au/p127x/.hidden/lol/Zll/lBl/.hidden";

pub fn build_world(catalog: &Catalog, locale: Locale) -> VirtualFileSystem {
    let mut fs = VirtualFileSystem::empty();
    let root = fs.root();
    build_zone1(&mut fs, root, catalog, locale);
    build_zone2(&mut fs, root, catalog, locale);
    build_zone3(&mut fs, root, catalog, locale);
    fs
}

fn hostile_file(name: &str, content: &str) -> VirtualFile {
    let threat = hostile(name).map(|entry| entry.threat).unwrap_or(1);
    VirtualFile::new(name, content).corrupted(threat)
}

fn dead_end(fs: &mut VirtualFileSystem, parent: DirId, name: &str) -> DirId {
    let dir = fs.add_dir(parent, name);
    fs.add_file(
        dir,
        VirtualFile::new("dead_end.txt", "Nothing here. The sequence does not pass through this node."),
    );
    dir
}

fn build_zone1(fs: &mut VirtualFileSystem, root: DirId, catalog: &Catalog, locale: Locale) {
    let zone1 = fs.add_dir(root, "zone1");
    fs.add_file(
        zone1,
        VirtualFile::new("README.txt", catalog.get_message(locale, "world.zone1_readme")),
    );

    let bin = fs.add_dir(zone1, "bin");
    fs.add_file(
        bin,
        VirtualFile::new(
            "cleanup.sh",
            "#!/bin/bash\n# Cleanup script for zone maintenance\necho \"Cleaning temporary files...\"\nrm -f /zone1/tmp/*.tmp\necho \"Cleanup complete!\"",
        )
        .with_permissions(Permissions {
            owner: Access::new(true, true, false),
            group: Access::new(true, false, false),
            other: Access::new(false, false, false),
        }),
    );

    let auth = fs.add_dir(zone1, "auth");
    fs.add_file(
        auth,
        VirtualFile::new(
            ".creds.enc",
            "-----BEGIN PGP MESSAGE-----\n[Encrypted credentials]\n-----END PGP MESSAGE-----",
        ),
    );

    let tmp = fs.add_dir(zone1, "tmp");
    fs.add_file(
        tmp,
        hostile_file("virus.exe", "MZ\u{90}\u{0}@#$%^&* self-replicating payload *&^%$#@"),
    );
    fs.add_file(
        tmp,
        VirtualFile::new("cache.tmp", "session cache: 42 entries, 0 stale"),
    );

    let logs = fs.add_dir(zone1, "logs");
    fs.add_file(
        logs,
        VirtualFile::new(
            "system.log",
            "[INFO] System startup initiated\n[WARN] Unusual process activity detected\n[ERROR] Zombie process spawned - PID 114\n[INFO] Authentication module loaded\n[WARN] Disk usage increasing",
        ),
    );
    fs.add_file(
        logs,
        VirtualFile::new(
            "error.log",
            "[ERROR] Failed to cleanup temporary files\n[ERROR] Process 114 not responding\n[ERROR] Executable payload detected in tmp/virus.exe\n[WARN] Unindexed writes under logs/.hidden",
        ),
    );

    let hidden = fs.add_dir(logs, ".hidden");
    fs.add_file(
        hidden,
        hostile_file("malware.dat", "<<encrypted exfiltration buffer>> 0xDEADBEEF 0xBADC0DE"),
    );
}

fn build_zone2(fs: &mut VirtualFileSystem, root: DirId, catalog: &Catalog, locale: Locale) {
    let zone2 = fs.add_pending_dir(root, "zone2", Unlock::Zone(Zone::Zone2));
    fs.add_file(
        zone2,
        VirtualFile::new("README.txt", catalog.get_message(locale, "world.zone2_readme")),
    );

    dead_end(fs, zone2, "1");
    dead_end(fs, zone2, "4");
    dead_end(fs, zone2, "6");
    let two = fs.add_dir(zone2, "2");
    dead_end(fs, two, "1");
    dead_end(fs, two, "4");
    let three = fs.add_dir(two, "3");
    dead_end(fs, three, "6");
    dead_end(fs, three, "9");
    let five = fs.add_dir(three, "5");
    fs.add_file(
        five,
        VirtualFile::new(
            "trace.log",
            "[TRACE] quantum signature stable at 2 -> 3 -> 5\n[TRACE] payload concealed one level below, name starts with '.'",
        ),
    );

    let quantum_hidden = fs.add_dir(five, ".hidden");
    fs.add_file(
        quantum_hidden,
        hostile_file("quantum_virus.exe", "|0> + |1> :: entangled payload :: do not observe"),
    );

    build_corrupted_layer(fs, quantum_hidden, catalog, locale);
}

/// `D41a&/wQ43au/p127x/.hidden/data_corruptor.bin`, then the leech layer inside it.
fn build_corrupted_layer(
    fs: &mut VirtualFileSystem,
    quantum_hidden: DirId,
    catalog: &Catalog,
    locale: Locale,
) {
    let trigger = Unlock::Layer(PuzzleLayer::Corrupted);
    let d41 = fs.add_pending_dir(quantum_hidden, "D41a&", trigger);
    let decoy = fs.add_pending_dir(quantum_hidden, "D40b", trigger);
    fs.add_file(decoy, VirtualFile::new("static.noise", "~~~~~~~~~~~~~~~~"));
    fs.add_file(
        d41,
        VirtualFile::new("fragment.txt", catalog.get_message(locale, "world.corrupted_fragment")),
    );

    let wq43 = fs.add_dir(d41, "wQ43au");
    dead_end(fs, d41, "wQ42e");
    let p127 = fs.add_dir(wq43, "p127x");
    dead_end(fs, wq43, "p125z");
    let corruptor_hidden = fs.add_dir(p127, ".hidden");
    fs.add_file(
        corruptor_hidden,
        hostile_file("data_corruptor.bin", "\u{0}\u{0}\u{FF} bit-rot engine \u{FF}\u{0}\u{0}"),
    );

    let trigger = Unlock::Layer(PuzzleLayer::Leech);
    let lol = fs.add_pending_dir(corruptor_hidden, "lol", trigger);
    let decoy = fs.add_pending_dir(corruptor_hidden, "loo", trigger);
    fs.add_file(decoy, VirtualFile::new("static.noise", "~~~~~~~~~~~~~~~~"));
    fs.add_file(
        lol,
        VirtualFile::new("fragment.txt", catalog.get_message(locale, "world.leech_fragment")),
    );
    let zll = fs.add_dir(lol, "Zll");
    dead_end(fs, lol, "Zlo");
    let lbl = fs.add_dir(zll, "lBl");
    dead_end(fs, zll, "lBB");
    let leech_hidden = fs.add_dir(lbl, ".hidden");
    fs.add_file(
        leech_hidden,
        hostile_file("system_leech.dll", "DllMain -> siphon(cpu, memory, hope)"),
    );
}

fn build_zone3(fs: &mut VirtualFileSystem, root: DirId, catalog: &Catalog, locale: Locale) {
    let zone3 = fs.add_pending_dir(root, "zone3", Unlock::Zone(Zone::Zone3));
    fs.add_file(
        zone3,
        VirtualFile::new("README.txt", catalog.get_message(locale, "world.zone3_readme")),
    );
}
