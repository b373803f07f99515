use crate::runes::classifier::ClassificationResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const UNKNOWN_RUNE_LABEL: &str = "Unknown rune";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spell {
    Fireball,
    Push,
    Teleport,
    Shield,
}

impl std::fmt::Display for Spell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Spell::Fireball => write!(f, "Fireball"),
            Spell::Push => write!(f, "Push"),
            Spell::Teleport => write!(f, "Teleport"),
            Spell::Shield => write!(f, "Shield"),
        }
    }
}

pub trait SpellCaster {
    fn cast(&mut self, spell: Spell, result: &ClassificationResult);
}

/// Caster that only reports the effect in the log.
#[derive(Debug, Default)]
pub struct LoggingCaster;

impl SpellCaster for LoggingCaster {
    fn cast(&mut self, spell: Spell, result: &ClassificationResult) {
        tracing::info!(
            spell = %spell,
            rune = %result.class_name,
            score = result.score,
            "{} spell cast!",
            spell
        );
    }
}

impl<F> SpellCaster for F
where
    F: FnMut(Spell, &ClassificationResult),
{
    fn cast(&mut self, spell: Spell, result: &ClassificationResult) {
        self(spell, result)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Cast {
        class_name: String,
        spell: Spell,
        score: f32,
    },
    Unbound {
        class_name: String,
        score: f32,
    },
    Unknown {
        score: f32,
    },
}

impl DispatchOutcome {
    /// Text shown to the player for this outcome.
    pub fn display_name(&self) -> &str {
        match self {
            DispatchOutcome::Cast { class_name, .. } | DispatchOutcome::Unbound { class_name, .. } => {
                class_name
            }
            DispatchOutcome::Unknown { .. } => UNKNOWN_RUNE_LABEL,
        }
    }
}

pub fn default_spell_bindings() -> HashMap<String, Spell> {
    HashMap::from([
        ("Line".to_string(), Spell::Fireball),
        ("Circle".to_string(), Spell::Push),
        ("Triangle".to_string(), Spell::Teleport),
        ("Fireball".to_string(), Spell::Fireball),
        ("Shield".to_string(), Spell::Shield),
    ])
}

#[derive(Debug, Clone)]
pub struct SpellDispatcher {
    bindings: HashMap<String, Spell>,
}

impl Default for SpellDispatcher {
    fn default() -> Self {
        Self::new(default_spell_bindings())
    }
}

impl SpellDispatcher {
    pub fn new(bindings: HashMap<String, Spell>) -> Self {
        Self { bindings }
    }

    pub fn bind(&mut self, class_name: impl Into<String>, spell: Spell) {
        self.bindings.insert(class_name.into(), spell);
    }

    pub fn spell_for(&self, class_name: &str) -> Option<Spell> {
        self.bindings.get(class_name).copied()
    }

    pub fn dispatch(
        &self,
        result: &ClassificationResult,
        threshold: f32,
        caster: &mut dyn SpellCaster,
    ) -> DispatchOutcome {
        if !result.is_recognized(threshold) {
            tracing::info!(
                rune = %result.class_name,
                score = result.score,
                threshold,
                "unknown rune"
            );
            return DispatchOutcome::Unknown {
                score: result.score,
            };
        }
        match self.spell_for(&result.class_name) {
            Some(spell) => {
                caster.cast(spell, result);
                DispatchOutcome::Cast {
                    class_name: result.class_name.clone(),
                    spell,
                    score: result.score,
                }
            }
            None => {
                tracing::info!(rune = %result.class_name, "no spell bound to rune");
                DispatchOutcome::Unbound {
                    class_name: result.class_name.clone(),
                    score: result.score,
                }
            }
        }
    }
}
