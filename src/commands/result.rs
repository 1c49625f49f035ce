use crate::fs::AttackEffect;

/// Outcome of one dispatched command.
///
/// `should_exit` and `attack_effect` are advisory: the dispatcher never acts
/// on them, the orchestrator and front-end do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandResult {
    pub output: String,
    pub success: bool,
    pub energy_cost: u32,
    pub should_exit: bool,
    pub attack_effect: Option<AttackEffect>,
    /// Change applied to the game's threat level (negative lowers it).
    pub threat_delta: f64,
    pub knowledge_gain: u32,
}

impl CommandResult {
    pub fn ok(output: impl Into<String>, energy_cost: u32) -> Self {
        CommandResult {
            output: output.into(),
            success: true,
            energy_cost,
            ..Default::default()
        }
    }

    pub fn fail(output: impl Into<String>, energy_cost: u32) -> Self {
        CommandResult {
            output: output.into(),
            success: false,
            energy_cost,
            ..Default::default()
        }
    }

    pub fn with_threat_delta(mut self, delta: f64) -> Self {
        self.threat_delta = delta;
        self
    }

    pub fn with_knowledge(mut self, gain: u32) -> Self {
        self.knowledge_gain = gain;
        self
    }

    pub fn with_attack(mut self, effect: Option<AttackEffect>) -> Self {
        self.attack_effect = effect;
        self
    }
}

/// Internal failure inside a handler. Never escapes the dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}
