//! Detail overlay drawing and hit geometry.

use glam::Vec2;
use macroquad::{
    color::{Color, BLACK, DARKGRAY, WHITE},
    shapes::{draw_rectangle, draw_rectangle_lines},
};
use pokedex_rendering::{type_color, CardRect};
use pokedex_system_detail::{EvolutionSection, OverlayView};

use crate::{draw_label, text_width, to_macroquad_color};

const PANEL_MAX_WIDTH: f32 = 520.0;
const PANEL_MAX_HEIGHT: f32 = 600.0;
const PANEL_MARGIN: f32 = 16.0;
const CLOSE_SIZE: f32 = 32.0;
const INSET: f32 = 24.0;
const MAX_STAT: f32 = 255.0;
const BAR_TRACK: Color = Color::new(0.9, 0.9, 0.9, 1.0);
const BAR_FILL: Color = Color::new(0.2, 0.6, 0.9, 1.0);

/// Screen-space rectangles of the overlay panel and its close button.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct OverlayGeometry {
    pub(crate) panel: CardRect,
    pub(crate) close: CardRect,
}

impl OverlayGeometry {
    pub(crate) fn for_screen(screen_width: f32, screen_height: f32) -> Self {
        let width = (screen_width - 2.0 * PANEL_MARGIN).clamp(1.0, PANEL_MAX_WIDTH);
        let height = (screen_height - 2.0 * PANEL_MARGIN).clamp(1.0, PANEL_MAX_HEIGHT);
        let origin = Vec2::new(
            ((screen_width - width) / 2.0).max(0.0),
            ((screen_height - height) / 2.0).max(0.0),
        );
        let panel = CardRect {
            origin,
            size: Vec2::new(width, height),
        };
        let close = CardRect {
            origin: Vec2::new(origin.x + width - CLOSE_SIZE - 12.0, origin.y + 12.0),
            size: Vec2::splat(CLOSE_SIZE),
        };

        Self { panel, close }
    }
}

pub(crate) fn draw_overlay(overlay: &OverlayView, screen_width: f32, screen_height: f32) {
    let geometry = OverlayGeometry::for_screen(screen_width, screen_height);
    let CardRect { origin, size } = geometry.panel;

    draw_rectangle(
        0.0,
        0.0,
        screen_width,
        screen_height,
        Color::new(0.0, 0.0, 0.0, 0.55),
    );
    draw_rectangle(origin.x, origin.y, size.x, size.y, WHITE);

    let close = geometry.close;
    draw_rectangle_lines(
        close.origin.x,
        close.origin.y,
        close.size.x,
        close.size.y,
        2.0,
        DARKGRAY,
    );
    draw_label("X", close.origin.x + 10.0, close.origin.y + 23.0, 24.0, DARKGRAY);

    let left = origin.x + INSET;
    let mut baseline = origin.y + INSET + 24.0;
    draw_label(&overlay.name, left, baseline, 32.0, BLACK);
    let name_width = text_width(&overlay.name, 32.0);
    draw_label(&overlay.number, left + name_width + 12.0, baseline, 24.0, DARKGRAY);

    baseline += 20.0;
    let mut chip_left = left;
    for badge in &overlay.types {
        let width = text_width(&badge.name, 18.0) + 16.0;
        draw_rectangle(
            chip_left,
            baseline,
            width,
            24.0,
            to_macroquad_color(type_color(&badge.name)),
        );
        draw_label(&badge.name, chip_left + 8.0, baseline + 17.0, 18.0, WHITE);
        chip_left += width + 8.0;
    }

    baseline += 56.0;
    draw_label("Stats", left, baseline, 24.0, BLACK);
    let label_width = overlay
        .stats
        .iter()
        .map(|row| text_width(&row.label, 20.0))
        .fold(0.0_f32, f32::max);
    let bar_left = left + label_width + 64.0;
    let bar_width = (origin.x + size.x - INSET - bar_left).max(0.0);
    for row in &overlay.stats {
        baseline += 26.0;
        draw_label(&row.label, left, baseline, 20.0, DARKGRAY);
        draw_label(
            &row.value.to_string(),
            left + label_width + 16.0,
            baseline,
            20.0,
            BLACK,
        );
        let filled = (row.value as f32 / MAX_STAT).min(1.0) * bar_width;
        draw_rectangle(bar_left, baseline - 12.0, bar_width, 10.0, BAR_TRACK);
        draw_rectangle(bar_left, baseline - 12.0, filled, 10.0, BAR_FILL);
    }

    baseline += 44.0;
    draw_label("Evolutions", left, baseline, 24.0, BLACK);
    match &overlay.evolutions {
        EvolutionSection::Entries(entries) => {
            for entry in entries {
                baseline += 26.0;
                draw_label(&entry.name, left, baseline, 20.0, BLACK);
                let width = text_width(&entry.name, 20.0);
                draw_label(&entry.number, left + width + 8.0, baseline, 20.0, DARKGRAY);
            }
        }
        EvolutionSection::Placeholder(message) => {
            baseline += 26.0;
            draw_label(message, left, baseline, 20.0, DARKGRAY);
        }
    }
}
