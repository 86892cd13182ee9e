#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Pokédex viewer.
//!
//! This crate defines the catalog model and the message surface that connects
//! adapters, the authoritative world, and pure systems. Adapters submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::{error::Error, fmt};

use serde::{Deserialize, Serialize};

/// Number of records requested per page.
///
/// A page shorter than this is the only end-of-data signal the API provides.
pub const PAGE_SIZE: usize = 50;

/// One-based index of a catalog page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageCursor(u32);

impl PageCursor {
    /// The first page of the catalog.
    pub const FIRST: Self = Self(1);

    /// Creates a cursor for the provided page, treating zero as the first page.
    #[must_use]
    pub const fn new(page: u32) -> Self {
        if page == 0 {
            Self::FIRST
        } else {
            Self(page)
        }
    }

    /// Retrieves the one-based page number.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Cursor addressing the page that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Reports whether the cursor addresses the first page.
    #[must_use]
    pub const fn is_first(&self) -> bool {
        self.0 == 1
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generation counter bumped every time the catalog view mounts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewSession(u64);

impl ViewSession {
    /// Creates a session wrapper around the provided generation.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric generation.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Session that supersedes this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// A single page fetch issued under a specific view session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PageRequest {
    /// Session the request belongs to.
    pub session: ViewSession,
    /// Page being fetched.
    pub page: PageCursor,
}

impl PageRequest {
    /// Creates a new page request descriptor.
    #[must_use]
    pub const fn new(session: ViewSession, page: PageCursor) -> Self {
        Self { session, page }
    }

    /// Reports whether the request fetches the first page.
    #[must_use]
    pub const fn is_initial(&self) -> bool {
        self.page.is_first()
    }
}

/// Record identifier assigned by the catalog API.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PokemonId(u32);

impl PokemonId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Card observed by the scroll sentinel: the last card of the rendered sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SentinelTarget {
    /// Index of the record in the loaded collection.
    pub index: usize,
    /// Identifier of the record.
    pub id: PokemonId,
}

impl SentinelTarget {
    /// Creates a new sentinel target descriptor.
    #[must_use]
    pub const fn new(index: usize, id: PokemonId) -> Self {
        Self { index, id }
    }
}

/// The six base stats carried by every record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawStats", rename_all = "camelCase")]
pub struct Stats {
    /// Hit points.
    #[serde(rename = "HP")]
    pub hp: u32,
    /// Speed.
    pub speed: u32,
    /// Physical attack.
    pub attack: u32,
    /// Physical defense.
    pub defense: u32,
    /// Special attack.
    pub special_attack: u32,
    /// Special defense.
    pub special_defense: u32,
}

// The API has shipped both camelCase and snake_case spellings of the special
// stats, sometimes in the same object.
#[derive(Deserialize)]
struct RawStats {
    #[serde(rename = "HP", alias = "hp", default)]
    hp: u32,
    #[serde(default)]
    speed: u32,
    #[serde(default)]
    attack: u32,
    #[serde(default)]
    defense: u32,
    #[serde(rename = "specialAttack", default)]
    special_attack_camel: Option<u32>,
    #[serde(rename = "special_attack", default)]
    special_attack_snake: Option<u32>,
    #[serde(rename = "specialDefense", default)]
    special_defense_camel: Option<u32>,
    #[serde(rename = "special_defense", default)]
    special_defense_snake: Option<u32>,
}

impl From<RawStats> for Stats {
    fn from(raw: RawStats) -> Self {
        Self {
            hp: raw.hp,
            speed: raw.speed,
            attack: raw.attack,
            defense: raw.defense,
            special_attack: raw
                .special_attack_camel
                .or(raw.special_attack_snake)
                .unwrap_or(0),
            special_defense: raw
                .special_defense_camel
                .or(raw.special_defense_snake)
                .unwrap_or(0),
        }
    }
}

impl Stats {
    /// Reads the value of a single stat.
    #[must_use]
    pub const fn get(&self, field: StatField) -> u32 {
        match field {
            StatField::Hp => self.hp,
            StatField::Speed => self.speed,
            StatField::Attack => self.attack,
            StatField::Defense => self.defense,
            StatField::SpecialAttack => self.special_attack,
            StatField::SpecialDefense => self.special_defense,
        }
    }
}

/// Names one of the six base stats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatField {
    /// Hit points.
    Hp,
    /// Speed.
    Speed,
    /// Physical attack.
    Attack,
    /// Physical defense.
    Defense,
    /// Special attack.
    SpecialAttack,
    /// Special defense.
    SpecialDefense,
}

impl StatField {
    /// Every stat in the order the catalog API lists them.
    pub const ALL: [Self; 6] = [
        Self::Hp,
        Self::Speed,
        Self::Attack,
        Self::Defense,
        Self::SpecialAttack,
        Self::SpecialDefense,
    ];

    /// Field name used by the wire format.
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Hp => "HP",
            Self::Speed => "speed",
            Self::Attack => "attack",
            Self::Defense => "defense",
            Self::SpecialAttack => "specialAttack",
            Self::SpecialDefense => "specialDefense",
        }
    }
}

/// Reference to another record in the same evolution line.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evolution {
    /// Display name of the evolution.
    pub name: String,
    /// Pokédex number of the evolution.
    pub pokedex_id: u32,
}

/// Category tag attached to a record.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PokemonType {
    /// Identifier of the type.
    pub id: u32,
    /// Display name of the type.
    pub name: String,
    /// Icon URL for the type.
    #[serde(default)]
    pub image: String,
}

/// One catalog record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pokemon {
    /// Record identifier, unique within a single page.
    pub id: PokemonId,
    /// Pokédex number shown as `#N`.
    pub pokedex_id: u32,
    /// Display name.
    pub name: String,
    /// Artwork URL.
    #[serde(default)]
    pub image: String,
    /// Sprite URL.
    #[serde(default)]
    pub sprite: String,
    /// Base stats.
    #[serde(default)]
    pub stats: Stats,
    /// Generation the record was introduced in.
    #[serde(default)]
    pub generation: u32,
    /// Evolution line, in order.
    #[serde(default)]
    pub evolutions: Vec<Evolution>,
    /// Category tags, in order.
    #[serde(default)]
    pub types: Vec<PokemonType>,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Mounts the catalog view, discarding any previously loaded records.
    Mount,
    /// Tears the catalog view down.
    Unmount,
    /// Requests that the next page be loaded.
    AdvanceCursor,
    /// Marks the fetch of a page as started.
    BeginPageLoad {
        /// Page whose fetch is starting.
        page: PageCursor,
    },
    /// Delivers the records returned for a page request.
    CompletePageLoad {
        /// Request the records answer.
        request: PageRequest,
        /// Records in the order the API returned them.
        pokemon: Vec<Pokemon>,
    },
    /// Reports that a page request failed.
    FailPageLoad {
        /// Request that failed.
        request: PageRequest,
        /// Failure reported by the fetch adapter.
        failure: FetchFailure,
    },
    /// Replaces the search term.
    SetSearchTerm {
        /// New search term, exactly as typed.
        term: String,
    },
    /// Selects the record at the provided index of the loaded collection.
    Select {
        /// Index into the loaded collection.
        index: usize,
    },
    /// Clears the current selection.
    Dismiss,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that the catalog view mounted under a new session.
    Mounted {
        /// Session created by the mount.
        session: ViewSession,
    },
    /// Announces that the catalog view was torn down.
    Unmounted {
        /// Session that ended.
        session: ViewSession,
    },
    /// Confirms that the next page may be fetched.
    CursorAdvanceRequested {
        /// Page that should be fetched next.
        page: PageCursor,
    },
    /// Reports that a cursor advance was refused.
    CursorAdvanceRejected {
        /// Reason the advance was refused.
        reason: AdvanceRejection,
    },
    /// Announces that a page request is now in flight.
    PageLoadStarted {
        /// Request that started.
        request: PageRequest,
    },
    /// Confirms that a page was merged into the loaded collection.
    PageLoaded {
        /// Request that completed.
        request: PageRequest,
        /// Number of records the page contained.
        count: usize,
        /// Size of the loaded collection after the merge.
        total: usize,
        /// Whether further pages may exist.
        has_more: bool,
    },
    /// Reports that a page request failed and loading stopped.
    PageLoadFailed {
        /// Request that failed.
        request: PageRequest,
        /// Failure reported by the fetch adapter.
        failure: FetchFailure,
    },
    /// Reports that a response for a request that is no longer current was dropped.
    StaleResponseDiscarded {
        /// Request the response belonged to.
        request: PageRequest,
    },
    /// Confirms that the search term changed.
    SearchTermChanged {
        /// New search term.
        term: String,
    },
    /// Confirms that a record was selected.
    SelectionChanged {
        /// Index of the selected record in the loaded collection.
        index: usize,
    },
    /// Confirms that the selection was cleared.
    SelectionCleared,
}

/// Reasons a cursor advance may be refused by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AdvanceRejection {
    /// The catalog view is not mounted.
    NotMounted,
    /// A page request is already outstanding.
    LoadInFlight,
    /// The last page was shorter than [`PAGE_SIZE`].
    Exhausted,
}

/// Categories of page fetch failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FetchFailureKind {
    /// The request could not be sent or the connection failed.
    Transport,
    /// The server answered with a non-success status code.
    Status {
        /// HTTP status code returned by the server.
        code: u16,
    },
    /// The response body could not be decoded into records.
    Decode,
    /// The background loader is no longer running.
    LoaderGone,
}

/// Any network or deserialization error raised while fetching a page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchFailure {
    kind: FetchFailureKind,
    message: String,
}

impl FetchFailure {
    /// Creates a new failure descriptor.
    #[must_use]
    pub fn new(kind: FetchFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Category of the failure.
    #[must_use]
    pub const fn kind(&self) -> FetchFailureKind {
        self.kind
    }

    /// Human readable description of the failure.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FetchFailureKind::Transport => write!(f, "transport error: {}", self.message),
            FetchFailureKind::Status { code } => {
                write!(f, "server returned status {code}: {}", self.message)
            }
            FetchFailureKind::Decode => write!(f, "could not decode page: {}", self.message),
            FetchFailureKind::LoaderGone => write!(f, "page loader stopped: {}", self.message),
        }
    }
}

impl Error for FetchFailure {}
