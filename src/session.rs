//! Caller-owned state for the two chimera slots and the battle between them.

use crate::error::{ChimeraError, Result};
use crate::image::GeneratedImage;
use crate::orchestrator::Orchestrator;
use crate::prompt::chimera_name;

/// Identity of a chimera slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Left-hand chimera.
    First,
    /// Right-hand chimera.
    Second,
}

impl Slot {
    fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }
}

/// A generated hybrid held in a slot.
#[derive(Debug, Clone)]
pub struct Chimera {
    /// Spliced name, e.g. "Ligle".
    pub name: String,
    /// The two source animals, in order.
    pub animals: [String; 2],
    /// The generated image.
    pub image: GeneratedImage,
}

/// Two chimera slots plus the orchestrator that fills them.
pub struct Session {
    orchestrator: Orchestrator,
    slots: [Option<Chimera>; 2],
}

impl Session {
    /// Creates a session with empty slots.
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            slots: [None, None],
        }
    }

    /// Returns the orchestrator.
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Returns the chimera in `slot`, if generated.
    pub fn chimera(&self, slot: Slot) -> Option<&Chimera> {
        self.slots[slot.index()].as_ref()
    }

    /// True once both slots hold a chimera.
    pub fn battle_ready(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Generates a chimera into `slot`.
    ///
    /// On success the slot is overwritten; on failure it keeps its previous value.
    pub async fn generate(&mut self, slot: Slot, animal_a: &str, animal_b: &str) -> Result<&Chimera> {
        let image = self
            .orchestrator
            .generate_chimera_image(animal_a, animal_b)
            .await?;

        let chimera = Chimera {
            name: chimera_name(animal_a, animal_b),
            animals: [animal_a.to_string(), animal_b.to_string()],
            image,
        };
        tracing::debug!(?slot, name = %chimera.name, "chimera slot filled");

        Ok(self.slots[slot.index()].insert(chimera))
    }

    /// Generates the battle scene between the two slots.
    pub async fn battle(&self) -> Result<GeneratedImage> {
        let (Some(first), Some(second)) = (&self.slots[0], &self.slots[1]) else {
            return Err(ChimeraError::InvalidRequest(
                "Generate both chimeras first!".into(),
            ));
        };

        self.orchestrator
            .generate_battle_image(
                &first.name,
                &second.name,
                [&first.animals[0], &first.animals[1]],
                [&second.animals[0], &second.animals[1]],
            )
            .await
    }

    /// Empties a slot.
    pub fn clear(&mut self, slot: Slot) {
        self.slots[slot.index()] = None;
    }
}
