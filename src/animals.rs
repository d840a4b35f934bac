//! Selectable animals.

/// Every animal a user can pick, in menu order.
pub const ANIMALS: [&str; 30] = [
    "Lion",
    "Eagle",
    "Shark",
    "Wolf",
    "Bear",
    "Tiger",
    "Dragon",
    "Phoenix",
    "Cobra",
    "Gorilla",
    "Elephant",
    "Hawk",
    "Crocodile",
    "Panther",
    "Scorpion",
    "Octopus",
    "Rhino",
    "Falcon",
    "Mantis",
    "Chameleon",
    "Stag",
    "Ram",
    "Wasp",
    "Barracuda",
    "Komodo Dragon",
    "Wolverine",
    "Hyena",
    "Owl",
    "Piranha",
    "Bull",
];

/// Returns the canonical spelling of `name` if it is on the roster.
///
/// Matching ignores ASCII case.
pub fn lookup(name: &str) -> Option<&'static str> {
    let name = name.trim();
    ANIMALS.iter().copied().find(|a| a.eq_ignore_ascii_case(name))
}

/// The preselected pairs for the first and second chimera.
pub fn default_pairs() -> [[&'static str; 2]; 2] {
    [[ANIMALS[0], ANIMALS[1]], [ANIMALS[2], ANIMALS[3]]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_roster_has_no_duplicates() {
        let unique: HashSet<_> = ANIMALS.iter().collect();
        assert_eq!(unique.len(), ANIMALS.len());
    }

    #[test]
    fn test_lookup_ignores_case() {
        assert_eq!(lookup("komodo dragon"), Some("Komodo Dragon"));
        assert_eq!(lookup(" OWL "), Some("Owl"));
        assert_eq!(lookup("Unicorn"), None);
        assert_eq!(lookup(""), None);
    }

    #[test]
    fn test_default_pairs() {
        assert_eq!(default_pairs(), [["Lion", "Eagle"], ["Shark", "Wolf"]]);
    }
}
