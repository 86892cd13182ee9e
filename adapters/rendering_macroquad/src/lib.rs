#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for the Pokédex viewer.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! Card artwork is not downloaded; cards are drawn as coloured panels keyed by
//! their first type.

mod overlay;

use self::overlay::{draw_overlay, OverlayGeometry};
use anyhow::Result;
use glam::Vec2;
use macroquad::{
    color::{Color as MacroquadColor, BLACK, DARKGRAY, GRAY, WHITE},
    input::{
        get_char_pressed, is_key_down, is_key_pressed, is_mouse_button_pressed, mouse_position,
        mouse_wheel, KeyCode, MouseButton,
    },
    shapes::{draw_rectangle, draw_rectangle_lines},
};
use pokedex_rendering::{
    type_color, CardLayout, Color, FrameInput, Presentation, RenderingBackend, Scene,
};
use pokedex_system_catalog::{CardView, GridView};
use std::time::Duration;

const HEADER_HEIGHT: f32 = 72.0;
const FOOTER_HEIGHT: f32 = 48.0;
const CARD_HEIGHT: f32 = 132.0;
const WHEEL_STEP: f32 = 64.0;
const KEY_SCROLL_SPEED: f32 = 720.0;
const SEARCH_PLACEHOLDER: &str = "Search by name or type";
const KEY_REPEAT_DELAY: f32 = 0.5;
const KEY_REPEAT_INTERVAL: f32 = 0.05;

/// Holds the card visibility measured while drawing until the next frame reports it.
#[doc(hidden)]
#[derive(Clone, Debug, Default)]
pub struct VisibilityLatch {
    visible_records: Option<Vec<usize>>,
}

impl VisibilityLatch {
    /// Returns the latched measurement and clears it so each frame reports
    /// only what the previous frame drew.
    pub fn take(&mut self) -> Option<Vec<usize>> {
        self.visible_records.take()
    }

    /// Records the collection indices of the cards drawn inside the viewport.
    pub fn register(&mut self, visible_records: Vec<usize>) {
        self.visible_records = Some(visible_records);
    }
}

/// Applies one frame of keyboard editing to the search field contents.
///
/// Backspaces are applied before the typed characters; control characters are
/// ignored. Returns the new contents only when they differ.
#[doc(hidden)]
#[must_use]
pub fn edit_search(current: &str, typed: &[char], backspaces: usize) -> Option<String> {
    let mut edited = current.to_owned();
    for _ in 0..backspaces {
        if edited.pop().is_none() {
            break;
        }
    }
    edited.extend(typed.iter().filter(|character| !character.is_control()));

    (edited != current).then_some(edited)
}

/// Turns a held key into repeated presses after an initial delay.
#[derive(Clone, Copy, Debug, Default)]
struct KeyRepeat {
    held_for: Option<f32>,
}

impl KeyRepeat {
    /// Returns how many presses the key produced during a frame of `dt_seconds`.
    fn advance(&mut self, down: bool, dt_seconds: f32) -> usize {
        if !down {
            self.held_for = None;
            return 0;
        }
        let Some(before) = self.held_for else {
            self.held_for = Some(0.0);
            return 1;
        };

        let after = before + dt_seconds.max(0.0);
        self.held_for = Some(after);
        repeats_until(after) - repeats_until(before)
    }
}

fn repeats_until(held_for: f32) -> usize {
    if held_for < KEY_REPEAT_DELAY {
        return 0;
    }
    ((held_for - KEY_REPEAT_DELAY) / KEY_REPEAT_INTERVAL) as usize + 1
}

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Escape` dismisses the overlay, or quits when none is open.
    escape: bool,
    /// `F5` reloads the catalog from the first page.
    reload: bool,
    /// Characters to delete: one on press, then repeats while `Backspace` is held.
    backspaces: usize,
    /// `Up`/`Down` held, as a signed direction.
    scroll_direction: f32,
    /// `PageUp`/`PageDown` pressed, as a signed direction.
    page_direction: f32,
}

impl KeyboardShortcuts {
    fn poll(backspace: &mut KeyRepeat, dt_seconds: f32) -> Self {
        let held = |key| if is_key_down(key) { 1.0 } else { 0.0 };
        let pressed = |key| if is_key_pressed(key) { 1.0 } else { 0.0 };

        Self {
            escape: is_key_pressed(KeyCode::Escape),
            reload: is_key_pressed(KeyCode::F5),
            backspaces: backspace.advance(is_key_down(KeyCode::Backspace), dt_seconds),
            scroll_direction: held(KeyCode::Down) - held(KeyCode::Up),
            page_direction: pressed(KeyCode::PageDown) - pressed(KeyCode::PageUp),
        }
    }
}

fn poll_typed_characters() -> Vec<char> {
    let mut typed = Vec::new();
    while let Some(character) = get_char_pressed() {
        typed.push(character);
    }
    typed
}

/// Grid geometry for the current window size and scroll offset.
#[derive(Clone, Copy, Debug)]
struct GridGeometry {
    layout: CardLayout,
    scroll: f32,
    viewport_height: f32,
}

impl GridGeometry {
    fn to_content(&self, screen: Vec2) -> Option<Vec2> {
        if screen.y < HEADER_HEIGHT {
            return None;
        }
        Some(Vec2::new(screen.x, screen.y - HEADER_HEIGHT + self.scroll))
    }

    fn to_screen_y(&self, content_y: f32) -> f32 {
        content_y - self.scroll + HEADER_HEIGHT
    }
}

fn content_height(scene: &Scene, layout: &CardLayout) -> f32 {
    let footer = if scene.shows_loading_more() {
        FOOTER_HEIGHT
    } else {
        0.0
    };
    layout.content_height(scene.grid.cards().len()) + footer
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    window_width: i32,
    window_height: i32,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            window_width: 1280,
            window_height: 800,
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures the initial window size in logical pixels.
    #[must_use]
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = i32::try_from(width).unwrap_or(i32::MAX);
        self.window_height = i32::try_from(height).unwrap_or(i32::MAX);
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            window_width,
            window_height,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width,
            window_height,
            window_resizable: true,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut visibility = VisibilityLatch::default();
            let mut scroll = 0.0_f32;
            let mut backspace = KeyRepeat::default();

            loop {
                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();
                let Ok(layout) = CardLayout::new(screen_width, CARD_HEIGHT) else {
                    macroquad::window::next_frame().await;
                    continue;
                };

                let dt_seconds = macroquad::time::get_frame_time();
                let keyboard = KeyboardShortcuts::poll(&mut backspace, dt_seconds);
                if keyboard.escape && scene.overlay.is_none() {
                    break;
                }

                let viewport_height = (screen_height - HEADER_HEIGHT).max(0.0);
                let geometry = GridGeometry {
                    layout,
                    scroll,
                    viewport_height,
                };
                let click = is_mouse_button_pressed(MouseButton::Left).then(|| {
                    let (x, y) = mouse_position();
                    Vec2::new(x, y)
                });
                let typed = poll_typed_characters();
                let frame_input = gather_frame_input(
                    &scene,
                    &geometry,
                    Vec2::new(screen_width, screen_height),
                    click,
                    keyboard,
                    &typed,
                    visibility.take(),
                );
                let overlay_open = scene.overlay.is_some();
                let reload = frame_input.reload_requested;

                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                update_scene(frame_dt, frame_input, &mut scene);

                if reload || matches!(scene.grid, GridView::Loading) {
                    scroll = 0.0;
                } else if !overlay_open {
                    let (_, wheel) = mouse_wheel();
                    let mut delta = keyboard.scroll_direction * KEY_SCROLL_SPEED * dt_seconds
                        + keyboard.page_direction * viewport_height;
                    if wheel.abs() > f32::EPSILON {
                        delta -= wheel.signum() * WHEEL_STEP;
                    }
                    scroll += delta;
                }
                let max_scroll = layout.max_scroll(content_height(&scene, &layout), viewport_height);
                scroll = scroll.clamp(0.0, max_scroll);

                macroquad::window::clear_background(background);
                let geometry = GridGeometry {
                    layout,
                    scroll,
                    viewport_height,
                };
                if let Some(visible) = draw_grid(&scene, &geometry, screen_width) {
                    visibility.register(visible);
                }
                draw_header(&scene, screen_width);
                if let Some(overlay) = &scene.overlay {
                    draw_overlay(overlay, screen_width, screen_height);
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn gather_frame_input(
    scene: &Scene,
    geometry: &GridGeometry,
    screen: Vec2,
    click: Option<Vec2>,
    keyboard: KeyboardShortcuts,
    typed: &[char],
    visible_records: Option<Vec<usize>>,
) -> FrameInput {
    let mut input = FrameInput {
        reload_requested: keyboard.reload,
        visible_records,
        ..FrameInput::default()
    };

    if scene.overlay.is_some() {
        input.escape_pressed = keyboard.escape;
        if let Some(point) = click {
            let overlay = OverlayGeometry::for_screen(screen.x, screen.y);
            if overlay.close.contains(point) {
                input.close_pressed = true;
            } else if !overlay.panel.contains(point) {
                input.clicked_outside = true;
            }
        }
        return input;
    }

    input.search_edit = edit_search(&scene.search_term, typed, keyboard.backspaces);
    input.activated_card = click
        .and_then(|point| geometry.to_content(point))
        .and_then(|point| geometry.layout.card_at(scene.grid.cards().len(), point));
    input
}

fn draw_header(scene: &Scene, screen_width: f32) {
    draw_rectangle(0.0, 0.0, screen_width, HEADER_HEIGHT, WHITE);
    draw_rectangle(0.0, HEADER_HEIGHT - 1.0, screen_width, 1.0, GRAY);
    draw_label("Pokedex", 16.0, 46.0, 36.0, BLACK);

    let box_left = 176.0;
    let box_width = (screen_width - box_left - 16.0).clamp(120.0, 480.0);
    draw_rectangle_lines(box_left, 16.0, box_width, 40.0, 2.0, GRAY);
    if scene.search_term.is_empty() {
        draw_label(SEARCH_PLACEHOLDER, box_left + 12.0, 43.0, 22.0, GRAY);
    } else {
        draw_label(&scene.search_term, box_left + 12.0, 43.0, 22.0, BLACK);
    }
    let caret = box_left + 12.0 + text_width(&scene.search_term, 22.0) + 2.0;
    draw_rectangle(caret, 24.0, 2.0, 24.0, DARKGRAY);
}

/// Draws the grid area and returns the collection indices of the cards inside
/// the viewport, or `None` while the first page loads.
fn draw_grid(scene: &Scene, geometry: &GridGeometry, screen_width: f32) -> Option<Vec<usize>> {
    let GridView::Grid {
        cards,
        loading_more,
        ..
    } = &scene.grid
    else {
        let message = "Loading...";
        let x = (screen_width - text_width(message, 32.0)) / 2.0;
        draw_label(message, x, HEADER_HEIGHT + 96.0, 32.0, DARKGRAY);
        return None;
    };

    let layout = &geometry.layout;
    let range = layout.visible_range(cards.len(), geometry.scroll, geometry.viewport_height);
    let mut visible = Vec::with_capacity(range.len());
    for position in range {
        let Some(card) = cards.get(position) else {
            continue;
        };
        let rect = layout.card_rect(position);
        draw_card(
            card,
            rect.origin.x,
            geometry.to_screen_y(rect.origin.y),
            layout,
        );
        visible.push(card.index);
    }

    if cards.is_empty() && !*loading_more {
        draw_label("No Pokemon found", 16.0, HEADER_HEIGHT + 48.0, 24.0, DARKGRAY);
    }

    if *loading_more {
        let message = "Loading more...";
        let y = geometry.to_screen_y(layout.content_height(cards.len()) + 28.0);
        let x = (screen_width - text_width(message, 24.0)) / 2.0;
        draw_label(message, x, y, 24.0, DARKGRAY);
    }

    Some(visible)
}

fn draw_card(card: &CardView, x: f32, y: f32, layout: &CardLayout) {
    let width = layout.card_width();
    let height = layout.card_height();
    let accent = card
        .types
        .first()
        .map_or_else(|| Color::from_rgb_u8(200, 200, 200), |chip| type_color(&chip.name));

    draw_rectangle(x, y, width, height, to_macroquad_color(accent.lighten(0.7)));
    draw_rectangle_lines(x, y, width, height, 2.0, to_macroquad_color(accent));
    draw_label(&card.number, x + 12.0, y + 24.0, 20.0, DARKGRAY);

    let name_x = x + ((width - text_width(&card.name, 26.0)) / 2.0).max(12.0);
    draw_label(&card.name, name_x, y + 64.0, 26.0, BLACK);

    let mut chip_left = x + 12.0;
    for chip in &card.types {
        let chip_width = text_width(&chip.name, 16.0) + 14.0;
        if chip_left + chip_width > x + width {
            break;
        }
        draw_rectangle(
            chip_left,
            y + height - 36.0,
            chip_width,
            22.0,
            to_macroquad_color(type_color(&chip.name)),
        );
        draw_label(&chip.name, chip_left + 7.0, y + height - 20.0, 16.0, WHITE);
        chip_left += chip_width + 6.0;
    }
}

fn draw_label(text: &str, x: f32, y: f32, font_size: f32, color: MacroquadColor) {
    let _ = macroquad::text::draw_text(text, x, y, font_size, color);
}

fn text_width(text: &str, font_size: f32) -> f32 {
    macroquad::text::measure_text(text, None, font_size as u16, 1.0).width
}

fn to_macroquad_color(color: Color) -> MacroquadColor {
    MacroquadColor::new(color.red, color.green, color.blue, color.alpha)
}
