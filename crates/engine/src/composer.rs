//! The protocol composer.
//!
//! Merges the instruction text of every active experiment into one directive
//! string, space-joined in the active set's insertion order. No validation,
//! no conflict detection: contradictory protocols collide in the prompt, and
//! that collision is often the point.

use menagerie_core::Experiment;

/// Compose the directive from the active set.
///
/// Ids without a matching experiment are ignored.
pub fn directive(experiments: &[Experiment], active: &[String]) -> String {
    active
        .iter()
        .filter_map(|id| experiments.iter().find(|e| &e.id == id))
        .map(|e| e.instruction.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether any active experiment carries the scarcity flag.
pub fn scarcity_active(experiments: &[Experiment], active: &[String]) -> bool {
    active
        .iter()
        .filter_map(|id| experiments.iter().find(|e| &e.id == id))
        .any(|e| e.scarcity)
}
