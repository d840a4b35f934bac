//! Prompt rendering for hybrid and battle requests.
//!
//! Everything here is pure: identical inputs always give identical prompts,
//! and every subject name appears verbatim in the output.

/// Splices two animal names into a chimera name.
///
/// Takes the first half of `a` (rounded up) and the second half of `b`
/// (rounded down), so `("Lion", "Eagle")` gives `"Ligle"`.
pub fn chimera_name(a: &str, b: &str) -> String {
    let a_len = a.chars().count();
    let b_len = b.chars().count();
    let head = a.chars().take(a_len.div_ceil(2));
    let tail = b.chars().skip(b_len / 2);
    head.chain(tail).collect()
}

/// Renders the prompt for a single hybrid creature.
pub fn build_hybrid_prompt(animal_a: &str, animal_b: &str) -> String {
    let name = chimera_name(animal_a, animal_b);
    format!(
        "A highly detailed digital painting of a mythical hybrid creature that is half \
         {animal_a} and half {animal_b}, called \"{name}\". The creature combines physical \
         features of both animals seamlessly. Epic fantasy style, dramatic lighting, full \
         body portrait on a dark atmospheric background."
    )
}

/// Renders the prompt for a battle between two hybrids.
pub fn build_battle_prompt(
    hybrid_a: &str,
    hybrid_b: &str,
    pair_a: [&str; 2],
    pair_b: [&str; 2],
) -> String {
    format!(
        "An epic battle scene between two mythical hybrid creatures. On the left: \
         \"{hybrid_a}\", a hybrid of {} and {}. On the right: \"{hybrid_b}\", a hybrid of {} \
         and {}. They are fighting each other in a dramatic arena with fire and lightning. \
         Highly detailed digital art, cinematic lighting, action pose, fantasy illustration \
         style.",
        pair_a[0], pair_a[1], pair_b[0], pair_b[1],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chimera_name() {
        assert_eq!(chimera_name("Lion", "Eagle"), "Ligle");
        assert_eq!(chimera_name("Shark", "Wolf"), "Shalf");
        assert_eq!(chimera_name("Komodo Dragon", "Owl"), "Komodo wl");
        assert_eq!(chimera_name("", "Ram"), "am");
    }

    #[test]
    fn test_chimera_name_counts_characters() {
        assert_eq!(chimera_name("Äffchen", "Löwe"), "Äffcwe");
    }

    #[test]
    fn test_hybrid_prompt_contains_subjects() {
        let pairs = [("Lion", "Eagle"), ("Komodo Dragon", "Owl"), ("Wasp", "Bull")];
        for (a, b) in pairs {
            let prompt = build_hybrid_prompt(a, b);
            assert!(prompt.contains(a), "{prompt}");
            assert!(prompt.contains(b), "{prompt}");
            assert!(prompt.contains(&format!("\"{}\"", chimera_name(a, b))));
        }
    }

    #[test]
    fn test_hybrid_prompt_is_deterministic() {
        assert_eq!(
            build_hybrid_prompt("Tiger", "Octopus"),
            build_hybrid_prompt("Tiger", "Octopus")
        );
        assert_ne!(
            build_hybrid_prompt("Tiger", "Octopus"),
            build_hybrid_prompt("Octopus", "Tiger")
        );
    }

    #[test]
    fn test_battle_prompt_contains_all_names() {
        let prompt = build_battle_prompt("Lioneagle", "Sharkwolf", ["Lion", "Eagle"], ["Shark", "Wolf"]);
        for name in ["Lioneagle", "Sharkwolf", "Lion", "Eagle", "Shark", "Wolf"] {
            assert!(prompt.contains(name), "missing {name}");
        }
        assert!(prompt.contains("On the left: \"Lioneagle\", a hybrid of Lion and Eagle"));
        assert!(prompt.contains("On the right: \"Sharkwolf\", a hybrid of Shark and Wolf"));
    }

    #[test]
    fn test_battle_prompt_is_deterministic() {
        let a = build_battle_prompt("Ligle", "Shalf", ["Lion", "Eagle"], ["Shark", "Wolf"]);
        let b = build_battle_prompt("Ligle", "Shalf", ["Lion", "Eagle"], ["Shark", "Wolf"]);
        assert_eq!(a, b);
    }
}
