#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure catalog system: text filtering, the derived grid view, and card activation.
//!
//! Filtering never mutates the loaded collection. The filtered view is a list
//! of indices into the collection, recomputed from scratch on every frame, and
//! the sentinel target is derived explicitly from its last entry.

use pokedex_core::{Command, Pokemon, PokemonId, SentinelTarget};

/// Lower-cases and trims a raw search term.
#[must_use]
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Reports whether a record matches an already normalized search term.
///
/// An empty term matches everything. Otherwise the term must be a substring of
/// the record name or of at least one type name, ignoring case.
#[must_use]
pub fn matches_normalized(pokemon: &Pokemon, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    pokemon.name.to_lowercase().contains(term)
        || pokemon
            .types
            .iter()
            .any(|kind| kind.name.to_lowercase().contains(term))
}

/// Reports whether a record matches a raw search term.
#[must_use]
pub fn matches(pokemon: &Pokemon, term: &str) -> bool {
    matches_normalized(pokemon, &normalize_term(term))
}

/// Ordered subset of the loaded collection that matches a search term.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilteredView {
    indices: Vec<usize>,
}

impl FilteredView {
    /// Indices into the loaded collection, in collection order.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Number of matching records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Reports whether no record matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Resolves the matching records against the collection they were computed from.
    pub fn resolve<'a>(&'a self, collection: &'a [Pokemon]) -> impl Iterator<Item = &'a Pokemon> {
        self.indices
            .iter()
            .filter_map(move |index| collection.get(*index))
    }

    /// Last rendered record, which the scroll sentinel observes.
    #[must_use]
    pub fn sentinel_target(&self, collection: &[Pokemon]) -> Option<SentinelTarget> {
        let index = *self.indices.last()?;
        collection
            .get(index)
            .map(|pokemon| SentinelTarget::new(index, pokemon.id))
    }
}

/// Filters the collection by a raw search term, preserving order.
#[must_use]
pub fn filter(collection: &[Pokemon], term: &str) -> FilteredView {
    let term = normalize_term(term);
    let indices = collection
        .iter()
        .enumerate()
        .filter(|(_, pokemon)| matches_normalized(pokemon, &term))
        .map(|(index, _)| index)
        .collect();
    FilteredView { indices }
}

/// Type chip drawn on a card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeChip {
    /// Type name, also used to pick the chip colour.
    pub name: String,
    /// Icon URL.
    pub image: String,
}

/// Card summarising one record in the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardView {
    /// Index of the record in the loaded collection.
    pub index: usize,
    /// Record identifier.
    pub id: PokemonId,
    /// Display name.
    pub name: String,
    /// Pokédex number label, e.g. `#25`.
    pub number: String,
    /// Artwork URL.
    pub image: String,
    /// Type chips in record order.
    pub types: Vec<TypeChip>,
}

impl CardView {
    fn from_record(index: usize, pokemon: &Pokemon) -> Self {
        Self {
            index,
            id: pokemon.id,
            name: pokemon.name.clone(),
            number: format!("#{}", pokemon.pokedex_id),
            image: pokemon.image.clone(),
            types: pokemon
                .types
                .iter()
                .map(|kind| TypeChip {
                    name: kind.name.clone(),
                    image: kind.image.clone(),
                })
                .collect(),
        }
    }
}

/// Loading flags the grid derivation depends on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadingState {
    /// Whether the first page is being fetched.
    pub initial_loading: bool,
    /// Whether a page after the first is being fetched.
    pub loading_more: bool,
}

/// What the grid area shows for the current state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridView {
    /// The first page is loading; no grid is drawn.
    Loading,
    /// The filtered grid.
    Grid {
        /// Cards in rendered order.
        cards: Vec<CardView>,
        /// Whether to show the trailing "loading more" indicator.
        loading_more: bool,
        /// Card the scroll sentinel should observe.
        sentinel: Option<SentinelTarget>,
    },
}

impl GridView {
    /// Derives the grid for a collection, search term and loading state.
    #[must_use]
    pub fn derive(collection: &[Pokemon], term: &str, loading: LoadingState) -> Self {
        if loading.initial_loading {
            return Self::Loading;
        }

        let filtered = filter(collection, term);
        let cards = filtered
            .indices()
            .iter()
            .filter_map(|index| {
                collection
                    .get(*index)
                    .map(|pokemon| CardView::from_record(*index, pokemon))
            })
            .collect();

        Self::Grid {
            cards,
            loading_more: loading.loading_more,
            sentinel: filtered.sentinel_target(collection),
        }
    }

    /// Cards drawn in the grid, empty while loading.
    #[must_use]
    pub fn cards(&self) -> &[CardView] {
        match self {
            Self::Loading => &[],
            Self::Grid { cards, .. } => cards,
        }
    }

    /// Card the scroll sentinel should observe.
    #[must_use]
    pub fn sentinel(&self) -> Option<SentinelTarget> {
        match self {
            Self::Loading => None,
            Self::Grid { sentinel, .. } => *sentinel,
        }
    }
}

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogInput {
    /// Full contents of the search field when it was edited this frame.
    pub search_edit: Option<String>,
    /// Rendered position of the card activated this frame.
    pub activated_card: Option<usize>,
}

/// Catalog system translating search edits and card clicks into commands.
#[derive(Debug, Default)]
pub struct Catalog;

impl Catalog {
    /// Creates a new catalog system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Emits the commands for this frame's catalog input against the rendered grid.
    pub fn handle(&self, input: CatalogInput, view: &GridView, out: &mut Vec<Command>) {
        if let Some(term) = input.search_edit {
            out.push(Command::SetSearchTerm { term });
        }

        if let Some(position) = input.activated_card {
            if let Some(card) = view.cards().get(position) {
                out.push(Command::Select { index: card.index });
            }
        }
    }
}
