#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Detail overlay system describing the selected record.
//!
//! The overlay is drawn purely from already loaded data; opening or closing it
//! never touches the network.

use std::fmt::Write as _;

use pokedex_core::{Command, Pokemon, StatField};

/// Message shown when a record has no evolutions.
pub const NO_EVOLUTIONS: &str = "No further evolutions";

/// Derives a display label from a stat field name.
///
/// A space is inserted at every lower-to-upper case boundary and the first
/// letter is capitalised, so `specialAttack` becomes `Special Attack` while
/// `HP` stays `HP`. Runs of capitals are deliberately not split, so acronyms
/// never render as `H P`.
#[must_use]
pub fn stat_label(field_name: &str) -> String {
    let mut label = String::with_capacity(field_name.len() + 4);
    let mut previous: Option<char> = None;
    for character in field_name.chars() {
        match previous {
            None => label.extend(character.to_uppercase()),
            Some(before) if before.is_lowercase() && character.is_uppercase() => {
                label.push(' ');
                label.push(character);
            }
            Some(_) => label.push(character),
        }
        previous = Some(character);
    }
    label
}

/// Label and value of a single stat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatRow {
    /// Display label.
    pub label: String,
    /// Value copied from the record.
    pub value: u32,
}

/// Type badge drawn in the overlay header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeBadge {
    /// Type name.
    pub name: String,
    /// Icon URL.
    pub image: String,
}

/// One entry of the evolution section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvolutionEntry {
    /// Display name.
    pub name: String,
    /// Pokédex number label, e.g. `#2`.
    pub number: String,
}

/// Contents of the evolution section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvolutionSection {
    /// Evolutions in record order.
    Entries(Vec<EvolutionEntry>),
    /// Placeholder shown when the record lists no evolutions.
    Placeholder(&'static str),
}

/// Everything the overlay shows for a selected record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlayView {
    /// Artwork URL.
    pub image: String,
    /// Display name.
    pub name: String,
    /// Pokédex number label, e.g. `#4`.
    pub number: String,
    /// Type badges in record order.
    pub types: Vec<TypeBadge>,
    /// The six stats in wire order.
    pub stats: Vec<StatRow>,
    /// Evolution line or placeholder.
    pub evolutions: EvolutionSection,
}

impl OverlayView {
    /// Describes the overlay for the current selection; `None` renders nothing.
    #[must_use]
    pub fn from_selection(selected: Option<&Pokemon>) -> Option<Self> {
        selected.map(Self::from_record)
    }

    /// Describes the overlay for a record.
    #[must_use]
    pub fn from_record(pokemon: &Pokemon) -> Self {
        let stats = StatField::ALL
            .iter()
            .map(|field| StatRow {
                label: stat_label(field.field_name()),
                value: pokemon.stats.get(*field),
            })
            .collect();

        let evolutions = if pokemon.evolutions.is_empty() {
            EvolutionSection::Placeholder(NO_EVOLUTIONS)
        } else {
            EvolutionSection::Entries(
                pokemon
                    .evolutions
                    .iter()
                    .map(|evolution| EvolutionEntry {
                        name: evolution.name.clone(),
                        number: format!("#{}", evolution.pokedex_id),
                    })
                    .collect(),
            )
        };

        Self {
            image: pokemon.image.clone(),
            name: pokemon.name.clone(),
            number: format!("#{}", pokemon.pokedex_id),
            types: pokemon
                .types
                .iter()
                .map(|kind| TypeBadge {
                    name: kind.name.clone(),
                    image: kind.image.clone(),
                })
                .collect(),
            stats,
            evolutions,
        }
    }

    /// Renders the overlay as plain text for terminal output.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut text = String::new();
        let _ = writeln!(text, "{} {}", self.name, self.number);
        if !self.types.is_empty() {
            let names: Vec<&str> = self.types.iter().map(|badge| badge.name.as_str()).collect();
            let _ = writeln!(text, "Types: {}", names.join(", "));
        }
        if !self.image.is_empty() {
            let _ = writeln!(text, "Image: {}", self.image);
        }

        let _ = writeln!(text, "\nStats");
        let width = self
            .stats
            .iter()
            .map(|row| row.label.chars().count())
            .max()
            .unwrap_or(0);
        for row in &self.stats {
            let _ = writeln!(text, "  {:<width$}  {:>3}", row.label, row.value);
        }

        let _ = writeln!(text, "\nEvolutions");
        match &self.evolutions {
            EvolutionSection::Entries(entries) => {
                for entry in entries {
                    let _ = writeln!(text, "  {} {}", entry.name, entry.number);
                }
            }
            EvolutionSection::Placeholder(message) => {
                let _ = writeln!(text, "  {message}");
            }
        }
        text
    }
}

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DetailInput {
    /// Whether the overlay close control was pressed.
    pub close_pressed: bool,
    /// Whether the dismissal key was pressed.
    pub escape_pressed: bool,
    /// Whether a click landed outside the overlay panel.
    pub clicked_outside: bool,
}

impl DetailInput {
    /// Reports whether any dismissal gesture happened this frame.
    #[must_use]
    pub const fn wants_dismiss(&self) -> bool {
        self.close_pressed || self.escape_pressed || self.clicked_outside
    }
}

/// Detail system translating dismissal gestures into commands.
#[derive(Debug, Default)]
pub struct Detail;

impl Detail {
    /// Creates a new detail system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Emits a dismissal when the overlay is open and the user asked to close it.
    pub fn handle(
        &self,
        input: DetailInput,
        overlay: Option<&OverlayView>,
        out: &mut Vec<Command>,
    ) {
        if overlay.is_some() && input.wants_dismiss() {
            out.push(Command::Dismiss);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::stat_label;

    #[test]
    fn camel_case_fields_are_split() {
        assert_eq!(stat_label("specialAttack"), "Special Attack");
        assert_eq!(stat_label("specialDefense"), "Special Defense");
    }

    #[test]
    fn acronyms_and_single_words_stay_whole() {
        assert_eq!(stat_label("HP"), "HP");
        assert_eq!(stat_label("speed"), "Speed");
        assert_eq!(stat_label(""), "");
    }
}
