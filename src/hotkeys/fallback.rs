use tracing::{debug, warn};

use super::BindingRegistry;
use crate::actions::Action;
use crate::shortcuts::Shortcut;

/// One logical action and the combos it may be reached by, primary first.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackChain {
    pub action: Action,
    pub candidates: Vec<Shortcut>,
}

impl FallbackChain {
    pub fn new(action: Action, candidates: Vec<Shortcut>) -> Self {
        Self { action, candidates }
    }

    pub fn primary(&self) -> Option<&Shortcut> {
        self.candidates.first()
    }
}

/// Bind the first candidate of `chain` that registers, in declared order.
///
/// Stops at the first success, so at most one candidate ends up bound.
/// Returns `None` when every candidate fails; there is no retry.
pub fn resolve(registry: &mut BindingRegistry, chain: &FallbackChain) -> Option<Shortcut> {
    for (attempt, candidate) in chain.candidates.iter().enumerate() {
        if registry.register(candidate, chain.action) {
            if attempt > 0 {
                debug!(
                    action = %chain.action,
                    shortcut = %candidate.display(),
                    attempt,
                    "Bound fallback shortcut"
                );
            }
            return Some(candidate.clone());
        }
    }

    let tried: Vec<String> = chain.candidates.iter().map(|s| s.display()).collect();
    warn!(action = %chain.action, tried = ?tried, "No shortcut could be bound for action");
    None
}
