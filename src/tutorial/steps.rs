use crate::i18n::{Catalog, Locale};

/// One prerequisite in a zone's tutorial.
///
/// Steps sharing a `phase` are alternative routes to the same milestone:
/// once any later step of the phase is done, earlier unmet ones are skipped.
pub struct Step<F> {
    pub id: &'static str,
    pub phase: u8,
    pub done: fn(&F) -> bool,
    /// Message id to show while this step is the next one.
    pub message: fn(&F) -> &'static str,
}

/// First unmet step that no later step of its phase has superseded.
pub fn next_step<'s, F>(steps: &'s [Step<F>], flags: &F) -> Option<&'s Step<F>> {
    steps.iter().enumerate().find_map(|(index, step)| {
        if (step.done)(flags) {
            return None;
        }
        let superseded = steps[index + 1..]
            .iter()
            .take_while(|later| later.phase == step.phase)
            .any(|later| (later.done)(flags));
        (!superseded).then_some(step)
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint {
    pub description: String,
    pub hint_key: &'static str,
}

impl Hint {
    pub fn resolve(key: &'static str, catalog: &Catalog, locale: Locale) -> Self {
        Hint {
            description: catalog.get_message(locale, key),
            hint_key: key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Flags {
        a: bool,
        b: bool,
        c: bool,
    }

    const STEPS: &[Step<Flags>] = &[
        Step { id: "a", phase: 0, done: |f| f.a, message: |_| "hint.a" },
        Step { id: "b", phase: 0, done: |f| f.b, message: |_| "hint.b" },
        Step { id: "c", phase: 1, done: |f| f.c, message: |_| "hint.c" },
    ];

    fn key(flags: &Flags) -> Option<&'static str> {
        next_step(STEPS, flags).map(|step| (step.message)(flags))
    }

    #[test]
    fn walks_in_order() {
        assert_eq!(key(&Flags::default()), Some("hint.a"));
        assert_eq!(key(&Flags { a: true, ..Flags::default() }), Some("hint.b"));
        assert_eq!(key(&Flags { a: true, b: true, c: true }), None);
    }

    #[test]
    fn later_step_in_phase_skips_earlier() {
        assert_eq!(key(&Flags { b: true, ..Flags::default() }), Some("hint.c"));
    }

    #[test]
    fn phases_do_not_skip_each_other() {
        assert_eq!(key(&Flags { c: true, ..Flags::default() }), Some("hint.a"));
    }
}
