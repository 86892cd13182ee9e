//! Terminal subcommands that run the viewer without a window.
//!
//! The sentinel is simulated by reporting every rendered card as visible, so
//! pages load the same way they do when the user scrolls to the bottom.

use std::{fmt::Write as _, time::Duration};

use anyhow::{bail, Result};
use pokedex_rendering::FrameInput;
use pokedex_system_catalog::CardView;
use pokedex_world::query;
use tracing::{debug, warn};

use crate::viewer::Viewer;

/// Loads pages until the catalog is exhausted, `max_pages` pages are merged,
/// `stop` is satisfied, or a fetch fails.
pub(crate) fn load_pages<P>(
    viewer: &mut Viewer,
    max_pages: Option<u32>,
    timeout: Duration,
    mut stop: P,
) -> Result<()>
where
    P: FnMut(&Viewer) -> bool,
{
    viewer.mount();
    loop {
        if viewer.pagination().in_flight().is_none() {
            let failed = viewer.last_failure().is_some();
            let limit_reached =
                max_pages.is_some_and(|limit| viewer.pagination().pages_loaded() >= limit);
            if failed || limit_reached || stop(&*viewer) {
                break;
            }

            viewer.frame(all_cards_visible(viewer));
            if viewer.pagination().in_flight().is_none() {
                debug!("sentinel requested no further pages");
                break;
            }
        }

        if !viewer.wait_for_response(timeout) {
            bail!("no page response within {} s", timeout.as_secs());
        }
    }

    match viewer.last_failure() {
        Some(failure) if viewer.pagination().pages_loaded() == 0 => {
            bail!("failed to load the first page: {failure}")
        }
        Some(failure) => warn!(%failure, "stopped loading after a failed page"),
        None => {}
    }
    Ok(())
}

fn all_cards_visible(viewer: &Viewer) -> FrameInput {
    FrameInput {
        visible_records: Some(viewer.grid().cards().iter().map(|card| card.index).collect()),
        ..FrameInput::default()
    }
}

/// Loads the catalog, applies the search term, and renders the grid as text.
pub(crate) fn list(
    viewer: &mut Viewer,
    search: Option<String>,
    max_pages: Option<u32>,
    timeout: Duration,
) -> Result<String> {
    load_pages(viewer, max_pages, timeout, |_| false)?;
    if let Some(term) = search {
        viewer.frame(FrameInput {
            search_edit: Some(term),
            ..FrameInput::default()
        });
    }

    Ok(render_grid(viewer))
}

fn render_grid(viewer: &Viewer) -> String {
    let cards = viewer.grid().cards();
    let number_width = cards
        .iter()
        .map(|card| card.number.len())
        .max()
        .unwrap_or(0);

    let mut text = String::new();
    for card in cards {
        let _ = writeln!(
            text,
            "{:>number_width$}  {}{}",
            card.number,
            card.name,
            type_suffix(card)
        );
    }
    let _ = writeln!(
        text,
        "{} shown, {} loaded, {} page(s)",
        cards.len(),
        query::pokemon(viewer.world()).len(),
        viewer.pagination().pages_loaded()
    );
    text
}

fn type_suffix(card: &CardView) -> String {
    if card.types.is_empty() {
        return String::new();
    }
    let names: Vec<&str> = card.types.iter().map(|chip| chip.name.as_str()).collect();
    format!("  [{}]", names.join(", "))
}

/// Loads pages until the record is found and renders its detail overlay.
pub(crate) fn show(
    viewer: &mut Viewer,
    pokedex_id: u32,
    max_pages: Option<u32>,
    timeout: Duration,
) -> Result<String> {
    let find = |viewer: &Viewer| {
        query::pokemon(viewer.world())
            .iter()
            .position(|pokemon| pokemon.pokedex_id == pokedex_id)
    };

    load_pages(viewer, max_pages, timeout, |viewer| find(viewer).is_some())?;
    let Some(index) = find(viewer) else {
        bail!(
            "no Pokémon with Pokédex number {pokedex_id} in {} loaded page(s)",
            viewer.pagination().pages_loaded()
        );
    };

    viewer.select(index);
    match viewer.overlay() {
        Some(overlay) => Ok(overlay.render_text()),
        None => bail!("record {index} could not be selected"),
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, time::Duration};

    use pokedex_api::{FetchError, PageLoader, PageSource};
    use pokedex_core::{Evolution, PageCursor, Pokemon, PokemonId, PokemonType, Stats, PAGE_SIZE};

    use super::{list, show};
    use crate::viewer::Viewer;

    const WAIT: Duration = Duration::from_secs(5);

    struct ScriptedSource {
        pages: HashMap<u32, Vec<Pokemon>>,
    }

    impl PageSource for ScriptedSource {
        fn fetch_page(&self, page: PageCursor) -> Result<Vec<Pokemon>, FetchError> {
            self.pages
                .get(&page.get())
                .cloned()
                .ok_or_else(|| FetchError::Status {
                    status: 503,
                    message: "Service Unavailable".to_owned(),
                })
        }
    }

    fn record(id: u32) -> Pokemon {
        let type_name = if id % 3 == 0 { "Electric" } else { "Normal" };
        Pokemon {
            id: PokemonId::new(id),
            pokedex_id: id,
            name: format!("Mon{id}"),
            image: String::new(),
            sprite: String::new(),
            stats: Stats {
                hp: 10 + id,
                speed: 90,
                attack: 55,
                defense: 40,
                special_attack: 50,
                special_defense: 50,
            },
            generation: 1,
            evolutions: Vec::new(),
            types: vec![PokemonType {
                id: 1,
                name: type_name.to_owned(),
                image: String::new(),
            }],
        }
    }

    fn page(first: u32, count: usize) -> Vec<Pokemon> {
        (first..first + count as u32).map(record).collect()
    }

    fn viewer(pages: HashMap<u32, Vec<Pokemon>>) -> Viewer {
        Viewer::new(PageLoader::spawn(ScriptedSource { pages }).expect("loader spawns"))
    }

    fn three_pages() -> HashMap<u32, Vec<Pokemon>> {
        HashMap::from([
            (1, page(1, PAGE_SIZE)),
            (2, page(51, PAGE_SIZE)),
            (3, page(101, 5)),
        ])
    }

    #[test]
    fn list_loads_until_a_short_page() {
        let mut viewer = viewer(three_pages());

        let text = list(&mut viewer, None, None, WAIT).expect("catalog listed");

        assert!(text.ends_with("105 shown, 105 loaded, 3 page(s)\n"));
        assert!(text.starts_with("  #1  Mon1  [Normal]\n"));
    }

    #[test]
    fn list_respects_the_page_limit_and_search() {
        let mut viewer = viewer(three_pages());

        let text = list(&mut viewer, Some("electric".to_owned()), Some(1), WAIT)
            .expect("catalog listed");

        assert!(text.ends_with("16 shown, 50 loaded, 1 page(s)\n"));
        assert!(text.lines().all(|line| !line.contains("Normal")));
    }

    #[test]
    fn failed_later_page_keeps_what_was_loaded() {
        let mut viewer = viewer(HashMap::from([(1, page(1, PAGE_SIZE))]));

        let text = list(&mut viewer, None, None, WAIT).expect("first page listed");

        assert!(text.ends_with("50 shown, 50 loaded, 1 page(s)\n"));
    }

    #[test]
    fn failed_first_page_is_an_error() {
        let mut viewer = viewer(HashMap::new());

        let error = list(&mut viewer, None, None, WAIT).expect_err("nothing loaded");

        assert!(error.to_string().contains("Service Unavailable"));
    }

    #[test]
    fn show_stops_once_the_record_is_loaded() {
        let mut pages = three_pages();
        if let Some(first) = pages.get_mut(&1) {
            first[24].evolutions = vec![Evolution {
                name: "Mon26".to_owned(),
                pokedex_id: 26,
            }];
        }
        let mut viewer = viewer(pages);

        let text = show(&mut viewer, 25, None, WAIT).expect("record shown");

        assert!(text.starts_with("Mon25 #25\n"));
        assert!(text.contains(&format!("  {:<15}  {:>3}\n", "HP", 35)));
        assert!(text.contains("Evolutions\n  Mon26 #26\n"));
        assert_eq!(viewer.pagination().pages_loaded(), 1);
    }

    #[test]
    fn show_reports_missing_records() {
        let mut viewer = viewer(three_pages());

        let error = show(&mut viewer, 999, None, WAIT).expect_err("unknown record");

        assert!(error.to_string().contains("999"));
    }
}
