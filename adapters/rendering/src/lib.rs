#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Pokédex viewer adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use pokedex_core::SentinelTarget;
use pokedex_system_catalog::GridView;
use pokedex_system_detail::OverlayView;
use std::{error::Error, fmt, ops::Range, time::Duration};

/// Viewport width at which the grid switches to two columns.
pub const BREAKPOINT_SMALL: f32 = 640.0;
/// Viewport width at which the grid switches to three columns.
pub const BREAKPOINT_MEDIUM: f32 = 768.0;
/// Viewport width at which the grid switches to four columns.
pub const BREAKPOINT_LARGE: f32 = 1024.0;
/// Viewport width at which the grid switches to eight columns.
pub const BREAKPOINT_EXTRA_LARGE: f32 = 1280.0;

const GRID_GUTTER: f32 = 16.0;
const GRID_PADDING: f32 = 16.0;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Chip colour for a type name; unknown names fall back to grey.
///
/// Both the English and French names served by the catalog are recognised.
#[must_use]
pub fn type_color(name: &str) -> Color {
    match name.trim().to_lowercase().as_str() {
        "normal" => Color::from_rgb_u8(168, 167, 122),
        "fire" | "feu" => Color::from_rgb_u8(238, 129, 48),
        "water" | "eau" => Color::from_rgb_u8(99, 144, 240),
        "electric" | "électrik" => Color::from_rgb_u8(247, 208, 44),
        "grass" | "plante" => Color::from_rgb_u8(122, 199, 76),
        "ice" | "glace" => Color::from_rgb_u8(150, 217, 214),
        "fighting" | "combat" => Color::from_rgb_u8(194, 46, 40),
        "poison" => Color::from_rgb_u8(163, 62, 161),
        "ground" | "sol" => Color::from_rgb_u8(226, 191, 101),
        "flying" | "vol" => Color::from_rgb_u8(169, 143, 243),
        "psychic" | "psy" => Color::from_rgb_u8(249, 85, 135),
        "bug" | "insecte" => Color::from_rgb_u8(166, 185, 26),
        "rock" | "roche" => Color::from_rgb_u8(182, 161, 54),
        "ghost" | "spectre" => Color::from_rgb_u8(115, 87, 151),
        "dragon" => Color::from_rgb_u8(111, 53, 252),
        "dark" | "ténèbres" => Color::from_rgb_u8(112, 87, 70),
        "steel" | "acier" => Color::from_rgb_u8(183, 183, 206),
        "fairy" | "fée" => Color::from_rgb_u8(214, 133, 173),
        _ => Color::from_rgb_u8(140, 140, 140),
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Full contents of the search field when it was edited on this frame.
    pub search_edit: Option<String>,
    /// Rendered position of the card clicked on this frame.
    pub activated_card: Option<usize>,
    /// Whether the overlay close control was pressed.
    pub close_pressed: bool,
    /// Whether the dismissal key was pressed.
    pub escape_pressed: bool,
    /// Whether a click landed outside the overlay panel.
    pub clicked_outside: bool,
    /// Whether the user asked to reload the catalog from the first page.
    pub reload_requested: bool,
    /// Collection indices of the cards that intersected the viewport on the
    /// previous frame, or `None` when no grid was drawn.
    pub visible_records: Option<Vec<usize>>,
}

impl FrameInput {
    /// Reports whether the sentinel card intersected the viewport.
    ///
    /// Returns `None` when the adapter did not measure card visibility.
    #[must_use]
    pub fn sentinel_visibility(&self, target: SentinelTarget) -> Option<bool> {
        self.visible_records
            .as_ref()
            .map(|visible| visible.contains(&target.index))
    }
}

/// Axis-aligned rectangle in grid content coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardRect {
    /// Top-left corner.
    pub origin: Vec2,
    /// Width and height.
    pub size: Vec2,
}

impl CardRect {
    /// Returns `true` when the point lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.origin.x
            && point.y >= self.origin.y
            && point.x < self.origin.x + self.size.x
            && point.y < self.origin.y + self.size.y
    }
}

/// Responsive card grid geometry for a given viewport width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardLayout {
    columns: usize,
    card_width: f32,
    card_height: f32,
}

impl CardLayout {
    /// Creates a layout for the viewport width and card height.
    pub fn new(viewport_width: f32, card_height: f32) -> Result<Self, RenderingError> {
        if !viewport_width.is_finite() || viewport_width <= 0.0 {
            return Err(RenderingError::InvalidViewportWidth {
                width: viewport_width,
            });
        }
        if !card_height.is_finite() || card_height <= 0.0 {
            return Err(RenderingError::InvalidCardHeight {
                height: card_height,
            });
        }

        let columns = Self::columns_for_width(viewport_width);
        let gutters = GRID_GUTTER * (columns - 1) as f32;
        let card_width = ((viewport_width - 2.0 * GRID_PADDING - gutters) / columns as f32).max(1.0);

        Ok(Self {
            columns,
            card_width,
            card_height,
        })
    }

    /// Number of grid columns used at the provided viewport width.
    #[must_use]
    pub fn columns_for_width(viewport_width: f32) -> usize {
        if viewport_width >= BREAKPOINT_EXTRA_LARGE {
            8
        } else if viewport_width >= BREAKPOINT_LARGE {
            4
        } else if viewport_width >= BREAKPOINT_MEDIUM {
            3
        } else if viewport_width >= BREAKPOINT_SMALL {
            2
        } else {
            1
        }
    }

    /// Number of grid columns.
    #[must_use]
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// Width of a single card.
    #[must_use]
    pub const fn card_width(&self) -> f32 {
        self.card_width
    }

    /// Height of a single card.
    #[must_use]
    pub const fn card_height(&self) -> f32 {
        self.card_height
    }

    fn row_step(&self) -> f32 {
        self.card_height + GRID_GUTTER
    }

    fn column_step(&self) -> f32 {
        self.card_width + GRID_GUTTER
    }

    /// Rectangle occupied by the card at the rendered position.
    #[must_use]
    pub fn card_rect(&self, position: usize) -> CardRect {
        let row = position / self.columns;
        let column = position % self.columns;

        CardRect {
            origin: Vec2::new(
                GRID_PADDING + column as f32 * self.column_step(),
                GRID_PADDING + row as f32 * self.row_step(),
            ),
            size: Vec2::new(self.card_width, self.card_height),
        }
    }

    /// Total height of a grid holding `card_count` cards, padding included.
    #[must_use]
    pub fn content_height(&self, card_count: usize) -> f32 {
        let rows = card_count.div_ceil(self.columns);
        if rows == 0 {
            return 2.0 * GRID_PADDING;
        }
        2.0 * GRID_PADDING + rows as f32 * self.card_height + (rows - 1) as f32 * GRID_GUTTER
    }

    /// Largest scroll offset that keeps the viewport inside the content.
    #[must_use]
    pub fn max_scroll(&self, content_height: f32, viewport_height: f32) -> f32 {
        (content_height - viewport_height).max(0.0)
    }

    /// Rendered positions of the cards intersecting the viewport.
    ///
    /// `scroll` is the content offset at the top edge of the viewport.
    #[must_use]
    pub fn visible_range(
        &self,
        card_count: usize,
        scroll: f32,
        viewport_height: f32,
    ) -> Range<usize> {
        if card_count == 0 || viewport_height <= 0.0 {
            return 0..0;
        }

        let step = self.row_step();
        let first_row = ((scroll - GRID_PADDING - self.card_height) / step).floor() + 1.0;
        let end_row = ((scroll + viewport_height - GRID_PADDING) / step).ceil();
        let first_row = first_row.max(0.0) as usize;
        let end_row = end_row.max(0.0) as usize;

        let start = first_row.saturating_mul(self.columns).min(card_count);
        let end = end_row.saturating_mul(self.columns).min(card_count).max(start);
        start..end
    }

    /// Rendered position of the card under a point in content coordinates.
    #[must_use]
    pub fn card_at(&self, card_count: usize, point: Vec2) -> Option<usize> {
        if point.x < GRID_PADDING || point.y < GRID_PADDING {
            return None;
        }

        let column = ((point.x - GRID_PADDING) / self.column_step()).floor() as usize;
        let row = ((point.y - GRID_PADDING) / self.row_step()).floor() as usize;
        if column >= self.columns {
            return None;
        }

        let position = row.checked_mul(self.columns)?.checked_add(column)?;
        if position >= card_count {
            return None;
        }
        self.card_rect(position)
            .contains(point)
            .then_some(position)
    }
}

/// Declarative description of a frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scene {
    /// Current contents of the search field.
    pub search_term: String,
    /// Grid area contents.
    pub grid: GridView,
    /// Detail overlay, drawn above the grid when present.
    pub overlay: Option<OverlayView>,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(search_term: String, grid: GridView, overlay: Option<OverlayView>) -> Self {
        Self {
            search_term,
            grid,
            overlay,
        }
    }

    /// Reports whether the trailing "loading more" indicator is shown.
    #[must_use]
    pub fn shows_loading_more(&self) -> bool {
        matches!(
            self.grid,
            GridView::Grid {
                loading_more: true,
                ..
            }
        )
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting the catalog.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// per-frame input captured by the adapter, and replaces the scene before
    /// it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The viewport must have a positive, finite width.
    InvalidViewportWidth {
        /// Provided width that failed validation.
        width: f32,
    },
    /// Cards must have a positive, finite height.
    InvalidCardHeight {
        /// Provided height that failed validation.
        height: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidViewportWidth { width } => {
                write!(f, "viewport width must be positive (received {width})")
            }
            Self::InvalidCardHeight { height } => {
                write!(f, "card height must be positive (received {height})")
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;
    use pokedex_core::PokemonId;

    fn layout(width: f32) -> CardLayout {
        CardLayout::new(width, 100.0).expect("valid layout")
    }

    #[test]
    fn columns_follow_breakpoints() {
        assert_eq!(CardLayout::columns_for_width(320.0), 1);
        assert_eq!(CardLayout::columns_for_width(639.0), 1);
        assert_eq!(CardLayout::columns_for_width(640.0), 2);
        assert_eq!(CardLayout::columns_for_width(767.0), 2);
        assert_eq!(CardLayout::columns_for_width(768.0), 3);
        assert_eq!(CardLayout::columns_for_width(1024.0), 4);
        assert_eq!(CardLayout::columns_for_width(1279.0), 4);
        assert_eq!(CardLayout::columns_for_width(1280.0), 8);
        assert_eq!(CardLayout::columns_for_width(2560.0), 8);
    }

    #[test]
    fn layout_rejects_degenerate_dimensions() {
        assert_eq!(
            CardLayout::new(0.0, 100.0),
            Err(RenderingError::InvalidViewportWidth { width: 0.0 })
        );
        assert_eq!(
            CardLayout::new(800.0, -1.0),
            Err(RenderingError::InvalidCardHeight { height: -1.0 })
        );
        assert!(CardLayout::new(f32::NAN, 100.0).is_err());
    }

    #[test]
    fn cards_fill_rows_left_to_right() {
        let layout = layout(800.0);
        assert_eq!(layout.columns(), 3);

        let first = layout.card_rect(0);
        let second = layout.card_rect(1);
        let fourth = layout.card_rect(3);

        assert_eq!(first.origin, Vec2::new(16.0, 16.0));
        assert!(second.origin.x > first.origin.x);
        assert_eq!(second.origin.y, first.origin.y);
        assert_eq!(fourth.origin.x, first.origin.x);
        assert_eq!(fourth.origin.y, 16.0 + 116.0);
    }

    #[test]
    fn content_height_counts_partial_rows() {
        let layout = layout(500.0);
        assert_eq!(layout.content_height(0), 32.0);
        assert_eq!(layout.content_height(1), 132.0);
        assert_eq!(layout.content_height(3), 32.0 + 300.0 + 32.0);
    }

    #[test]
    fn visible_range_tracks_scroll() {
        let layout = layout(500.0);

        assert_eq!(layout.visible_range(10, 0.0, 300.0), 0..3);
        assert_eq!(layout.visible_range(10, 120.0, 300.0), 1..4);
        assert_eq!(layout.visible_range(10, 10_000.0, 300.0), 10..10);
        assert_eq!(layout.visible_range(2, 0.0, 300.0), 0..2);
        assert_eq!(layout.visible_range(0, 0.0, 300.0), 0..0);
    }

    #[test]
    fn visible_range_covers_whole_rows() {
        let layout = layout(1300.0);
        assert_eq!(layout.columns(), 8);
        assert_eq!(layout.visible_range(50, 0.0, 200.0), 0..16);
    }

    #[test]
    fn card_at_maps_points_to_positions() {
        let layout = layout(500.0);

        assert_eq!(layout.card_at(5, Vec2::new(20.0, 20.0)), Some(0));
        assert_eq!(layout.card_at(5, Vec2::new(20.0, 140.0)), Some(1));
        assert_eq!(layout.card_at(5, Vec2::new(20.0, 120.0)), None);
        assert_eq!(layout.card_at(1, Vec2::new(20.0, 140.0)), None);
        assert_eq!(layout.card_at(5, Vec2::new(4.0, 20.0)), None);
    }

    #[test]
    fn sentinel_visibility_requires_a_measurement() {
        let target = SentinelTarget::new(4, PokemonId::new(5));

        assert_eq!(FrameInput::default().sentinel_visibility(target), None);

        let measured = FrameInput {
            visible_records: Some(vec![2, 3, 4]),
            ..FrameInput::default()
        };
        assert_eq!(measured.sentinel_visibility(target), Some(true));

        let scrolled_away = FrameInput {
            visible_records: Some(vec![0, 1]),
            ..FrameInput::default()
        };
        assert_eq!(scrolled_away.sentinel_visibility(target), Some(false));
    }

    #[test]
    fn unknown_types_fall_back_to_grey() {
        assert_eq!(type_color("Grass"), type_color("plante"));
        assert_eq!(type_color("???"), Color::from_rgb_u8(140, 140, 140));
    }

    #[test]
    fn lighten_moves_towards_white() {
        let color = Color::new(0.0, 0.5, 1.0, 0.25).lighten(0.5);
        assert_eq!(color, Color::new(0.5, 0.75, 1.0, 0.25));
    }
}
