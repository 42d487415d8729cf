//! Command cards: catalog, hand draws and activation constraints

use crate::board::Section;
use crate::rng::{shuffle, RandomSource};
use serde::{Deserialize, Serialize};

/// Cards held per side
pub const HAND_SIZE: usize = 5;

/// Which units a card may activate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardSection {
    Left,
    Center,
    Right,
    /// Left or right
    Flanks,
    Any,
}

impl CardSection {
    pub fn permits(self, section: Section) -> bool {
        match self {
            CardSection::Any => true,
            CardSection::Flanks => matches!(section, Section::Left | Section::Right),
            CardSection::Left => section == Section::Left,
            CardSection::Center => section == Section::Center,
            CardSection::Right => section == Section::Right,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandCard {
    pub name: String,
    pub description: String,
    pub activation_count: u8,
    pub allowed_section: CardSection,
}

/// Card template in the static catalog
#[derive(Clone, Debug)]
pub struct CardTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub activation_count: u8,
    pub section: CardSection,
}

impl CardTemplate {
    const fn new(
        name: &'static str,
        description: &'static str,
        activation_count: u8,
        section: CardSection,
    ) -> Self {
        Self {
            name,
            description,
            activation_count,
            section,
        }
    }

    pub fn to_card(&self) -> CommandCard {
        CommandCard {
            name: self.name.to_string(),
            description: self.description.to_string(),
            activation_count: self.activation_count,
            allowed_section: self.section,
        }
    }
}

pub static CARD_CATALOG: [CardTemplate; 7] = [
    CardTemplate::new("Probe Left", "Activate 1 unit on left flank", 1, CardSection::Left),
    CardTemplate::new("Attack Center", "Activate 2 units in center", 2, CardSection::Center),
    CardTemplate::new("Assault Right", "Activate 3 units on right flank", 3, CardSection::Right),
    CardTemplate::new(
        "Pincer Movement",
        "Activate 2 units on left or right",
        2,
        CardSection::Flanks,
    ),
    CardTemplate::new("General Advance", "Activate 1 unit in any section", 1, CardSection::Any),
    CardTemplate::new("Concentrated Fire", "Activate 3 units in center", 3, CardSection::Center),
    CardTemplate::new("Recon", "Activate 2 units in any section", 2, CardSection::Any),
];

/// Look up a catalog card by name
pub fn card_by_name(name: &str) -> Option<CommandCard> {
    CARD_CATALOG
        .iter()
        .find(|t| t.name == name)
        .map(CardTemplate::to_card)
}

/// Draw a fresh hand: a uniform permutation of the catalog, first five cards
pub fn draw_hand<S: RandomSource + ?Sized>(source: &mut S) -> Vec<CommandCard> {
    let mut order: Vec<usize> = (0..CARD_CATALOG.len()).collect();
    shuffle(&mut order, source);
    order
        .into_iter()
        .take(HAND_SIZE)
        .map(|i| CARD_CATALOG[i].to_card())
        .collect()
}

/// Whether `card` may activate a unit standing in `section`
pub fn is_legal_activation(card: &CommandCard, section: Section) -> bool {
    card.allowed_section.permits(section)
}
