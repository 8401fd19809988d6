//! # Market Classifier
//! Maps (barrier, opportunity, timing) to a gap type. The policy is an
//! ordered decision table: rows are evaluated top-down and the first match
//! wins, so every branch is directly enumerable by tests.

use crate::model::GapType;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierInputs {
    pub barrier: f64,
    pub opportunity: f64,
    pub timing_bonus: f64,
}

pub struct ClassifierRule {
    pub name: &'static str,
    pub outcome: GapType,
    pub reasoning: &'static str,
    predicate: fn(&ClassifierInputs) -> bool,
}

impl ClassifierRule {
    pub fn matches(&self, inputs: &ClassifierInputs) -> bool {
        (self.predicate)(inputs)
    }
}

/// The full ordered table, ending with an always-true fallback row.
pub const RULES: &[ClassifierRule] = &[
    ClassifierRule {
        name: "hard_barrier",
        outcome: GapType::Saturated,
        reasoning: "Entrenched channels dominate this combination; a newcomer would struggle to surface.",
        predicate: |i| i.barrier > 60.0,
    },
    ClassifierRule {
        name: "barrier_outweighs_upside",
        outcome: GapType::Saturated,
        reasoning: "Competition is strong and the remaining upside is thin.",
        predicate: |i| i.barrier > 40.0 && i.opportunity < 40.0,
    },
    ClassifierRule {
        name: "riding_momentum",
        outcome: GapType::Emerging,
        reasoning: "Interest is accelerating right now; early uploads can still define the space.",
        predicate: |i| i.opportunity > 60.0 && i.timing_bonus >= 15.0,
    },
    ClassifierRule {
        name: "open_market",
        outcome: GapType::Underserved,
        reasoning: "Proven demand with a manageable barrier; supply has not caught up.",
        predicate: |i| i.barrier < 40.0 && i.opportunity > 50.0,
    },
    ClassifierRule {
        name: "quiet_niche",
        outcome: GapType::Underserved,
        reasoning: "A quiet niche: modest audience, but almost nobody is covering it.",
        predicate: |i| i.barrier < 30.0 && i.opportunity >= 30.0,
    },
    ClassifierRule {
        name: "balanced_default",
        outcome: GapType::Balanced,
        reasoning: "Supply and demand look balanced; differentiation will matter more than timing.",
        predicate: |_| true,
    },
];

/// First matching row wins.
pub fn classify(inputs: &ClassifierInputs) -> &'static ClassifierRule {
    RULES
        .iter()
        .find(|r| r.matches(inputs))
        .expect("classifier table ends with a fallback row")
}
