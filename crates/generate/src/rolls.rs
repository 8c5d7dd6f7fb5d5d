//! Client-side dice for persona creation.
//!
//! Traits are rolled locally and the community role is derived from them
//! deterministically, then both are handed to the model as hard constraints.
//! Rolling client-side keeps the distribution uniform instead of whatever the
//! model feels like, and makes the role assignment reproducible in tests.

use rand::Rng;

use menagerie_core::TraitVector;

/// Roll a fresh trait vector, optionally biased by the active directive.
///
/// The "Creative Singularity" protocol forces manic artist builds: creativity
/// and chaos pinned high, analysis low.
pub fn roll_traits(directive: &str) -> TraitVector {
    let mut rng = rand::rng();

    if directive.contains("Creative Singularity") {
        return TraitVector {
            analytical: rng.random_range(0..40),
            creative: rng.random_range(80..100),
            social: rng.random_range(0..100),
            chaotic: rng.random_range(80..100),
        };
    }

    TraitVector {
        analytical: rng.random_range(0..100),
        creative: rng.random_range(0..100),
        social: rng.random_range(0..100),
        chaotic: rng.random_range(0..100),
    }
}

/// Derive the community role from a trait vector.
///
/// Specific archetypes first, then dominant-axis fallbacks. Order matters:
/// an agent matching several rules gets the first.
pub fn derive_role(traits: &TraitVector) -> &'static str {
    let TraitVector {
        analytical,
        creative,
        social,
        chaotic,
    } = *traits;

    if chaotic > 70 && creative > 60 {
        return "Provocateur";
    }
    if analytical > 75 && social < 40 {
        return "Observer";
    }
    if social > 75 && chaotic < 35 {
        return "Mediator";
    }
    if social > 65 && analytical > 60 && chaotic < 40 {
        return "Moderator";
    }
    if creative > 75 {
        return "Creator";
    }
    if analytical > 70 && chaotic > 60 {
        return "Skeptic";
    }
    if analytical > 60 && creative < 50 {
        return "Historian";
    }

    if social >= analytical && social >= creative && social >= chaotic {
        return "Mediator";
    }
    if creative >= analytical && creative >= social && creative >= chaotic {
        return "Creator";
    }

    "Observer"
}

/// Render a trait vector the way prompts expect it.
pub fn format_traits(traits: &TraitVector) -> String {
    format!(
        "[Traits: Analytical {}%, Creative {}%, Social {}%, Chaotic {}%]",
        traits.analytical, traits.creative, traits.social, traits.chaotic
    )
}
