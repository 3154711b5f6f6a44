//! Complex names, drawn from an isolated phase stream.

use crate::context::GenerationContext;
use crate::seed::phase_seed;

use super::params::Theme;

const NAMING_PHASE: &str = "naming";

pub(super) fn complex_name(seed: i64, theme: Theme) -> String {
    let mut context = GenerationContext::from_seed(phase_seed(seed, NAMING_PHASE));
    let (adjectives, nouns): (&[&str], &[&str]) = match theme {
        Theme::Classic => {
            (&["Forgotten", "Sunken", "Ancient", "Silent"], &["Halls", "Keep", "Vaults", "Catacombs"])
        }
        Theme::Horror => {
            (&["Weeping", "Hollow", "Blighted", "Screaming"], &["Crypts", "Ossuary", "Warrens", "Pits"])
        }
        Theme::Magical => (
            &["Arcane", "Shimmering", "Astral", "Runebound"],
            &["Sanctum", "Spire", "Archive", "Labyrinth"],
        ),
        Theme::Mechanical => {
            (&["Clockwork", "Rusted", "Humming", "Brass"], &["Foundry", "Works", "Engine", "Shafts"])
        }
        Theme::Natural => (
            &["Overgrown", "Mossy", "Dripping", "Rootbound"],
            &["Caverns", "Grotto", "Burrows", "Hollows"],
        ),
    };
    let adjective = context.random_choice(adjectives).copied().unwrap_or("Nameless");
    let noun = context.random_choice(nouns).copied().unwrap_or("Depths");
    format!("The {adjective} {noun}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_a_pure_function_of_seed_and_theme() {
        assert_eq!(complex_name(12_345, Theme::Horror), complex_name(12_345, Theme::Horror));
        assert!(complex_name(12_345, Theme::Natural).starts_with("The "));
    }
}
