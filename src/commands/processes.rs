use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessKind {
    System,
    ZombieProcess,
    LogLeech,
    ForkSprite,
}

impl fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProcessKind::System => "system",
            ProcessKind::ZombieProcess => "zombie",
            ProcessKind::LogLeech => "leech",
            ProcessKind::ForkSprite => "fork",
        };
        f.pad(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub pid: u32,
    pub name: String,
    pub kind: ProcessKind,
    pub threat: u32,
}

impl Process {
    fn new(pid: u32, name: &str, kind: ProcessKind, threat: u32) -> Self {
        Process {
            pid,
            name: name.to_string(),
            kind,
            threat,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KillError {
    #[error("no such process {0}")]
    NoSuchProcess(u32),
    #[error("process {0} is protected")]
    Protected(u32),
}

const FORK_SPRITE_THREAT: u32 = 2;
const FIRST_SPAWNED_PID: u32 = 300;

/// The simulated process table behind `ps` and `kill`.
#[derive(Debug)]
pub struct ProcessManager {
    processes: Vec<Process>,
    next_pid: u32,
    rng: StdRng,
}

impl ProcessManager {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        ProcessManager {
            processes: vec![
                Process::new(1, "init", ProcessKind::System, 0),
                Process::new(114, "zombie_handler", ProcessKind::ZombieProcess, 4),
                Process::new(203, "log_monitor", ProcessKind::LogLeech, 3),
            ],
            next_pid: FIRST_SPAWNED_PID,
            rng,
        }
    }

    pub fn list(&self) -> &[Process] {
        &self.processes
    }

    pub fn get(&self, pid: u32) -> Option<&Process> {
        self.processes.iter().find(|p| p.pid == pid)
    }

    pub fn kill(&mut self, pid: u32) -> Result<Process, KillError> {
        let index = self
            .processes
            .iter()
            .position(|p| p.pid == pid)
            .ok_or(KillError::NoSuchProcess(pid))?;
        if self.processes[index].kind == ProcessKind::System {
            return Err(KillError::Protected(pid));
        }
        let killed = self.processes.remove(index);
        info!(pid, name = %killed.name, "process killed");
        Ok(killed)
    }

    fn allocate_pid(&mut self) -> u32 {
        let pid = self.next_pid;
        self.next_pid += 1;
        pid
    }

    /// Adds a fork_sprite unless one is already running.
    pub fn spawn_fork_sprite(&mut self) -> Option<&Process> {
        if self.processes.iter().any(|p| p.kind == ProcessKind::ForkSprite) {
            return None;
        }
        let pid = self.allocate_pid();
        self.processes.push(Process::new(
            pid,
            "fork_sprite",
            ProcessKind::ForkSprite,
            FORK_SPRITE_THREAT,
        ));
        info!(pid, "fork_sprite appeared");
        self.processes.last()
    }

    /// Each running fork_sprite replicates with probability `chance`.
    /// Returns the newly spawned children.
    pub fn tick(&mut self, chance: f64) -> Vec<Process> {
        let chance = chance.clamp(0.0, 1.0);
        let parents = self
            .processes
            .iter()
            .filter(|p| p.kind == ProcessKind::ForkSprite)
            .count();

        let mut spawned = Vec::new();
        for _ in 0..parents {
            if !self.rng.gen_bool(chance) {
                continue;
            }
            let pid = self.allocate_pid();
            let child = Process::new(pid, "fork_sprite", ProcessKind::ForkSprite, FORK_SPRITE_THREAT);
            debug!(pid, "fork_sprite replicated");
            self.processes.push(child.clone());
            spawned.push(child);
        }
        spawned
    }
}
