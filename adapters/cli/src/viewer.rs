//! Drives the world and systems for one catalog view.
//!
//! Every frame the viewer applies finished page responses, turns adapter input
//! into commands through the catalog and detail systems, lets the sentinel
//! react to the resulting state, and hands page requests to the loader.

use std::time::Duration;

use pokedex_api::PageLoader;
use pokedex_core::{Command, Event, FetchFailure};
use pokedex_rendering::{FrameInput, Scene};
use pokedex_system_catalog::{Catalog, CatalogInput, GridView, LoadingState};
use pokedex_system_detail::{Detail, DetailInput, OverlayView};
use pokedex_system_pagination::Pagination;
use pokedex_system_sentinel::{Sentinel, SentinelInput};
use pokedex_world::{self as world, query, PaginationState, World};

pub(crate) struct Viewer {
    world: World,
    pagination: Pagination,
    sentinel: Sentinel,
    catalog: Catalog,
    detail: Detail,
    loader: PageLoader,
    grid: GridView,
    overlay: Option<OverlayView>,
    last_failure: Option<FetchFailure>,
}

impl Viewer {
    pub(crate) fn new(loader: PageLoader) -> Self {
        Self {
            world: World::new(),
            pagination: Pagination::new(),
            sentinel: Sentinel::new(),
            catalog: Catalog::new(),
            detail: Detail::new(),
            loader,
            grid: GridView::Loading,
            overlay: None,
            last_failure: None,
        }
    }

    /// Mounts the view, issuing the first page request.
    pub(crate) fn mount(&mut self) {
        let mut events = Vec::new();
        self.dispatch(vec![Command::Mount], &mut events);
        self.react(&events);
    }

    /// Runs one frame of input through the systems.
    pub(crate) fn frame(&mut self, input: FrameInput) {
        let mut events = Vec::new();
        let responses = self
            .loader
            .drain()
            .into_iter()
            .map(|response| response.into_command())
            .collect();
        self.dispatch(responses, &mut events);

        let mut commands = Vec::new();
        if input.reload_requested {
            commands.push(Command::Unmount);
            commands.push(Command::Mount);
        }
        self.catalog.handle(
            CatalogInput {
                search_edit: input.search_edit.clone(),
                activated_card: input.activated_card,
            },
            &self.grid,
            &mut commands,
        );
        self.detail.handle(
            DetailInput {
                close_pressed: input.close_pressed,
                escape_pressed: input.escape_pressed,
                clicked_outside: input.clicked_outside,
            },
            self.overlay.as_ref(),
            &mut commands,
        );
        self.dispatch(commands, &mut events);
        self.refresh();

        let mut advances = Vec::new();
        let sentinel_input = self.sentinel_input();
        self.sentinel.handle(
            &events,
            sentinel_input,
            |target| input.sentinel_visibility(target),
            &mut advances,
        );
        self.dispatch(advances, &mut events);
        self.react(&events);
    }

    /// Blocks until the next page response arrives and applies it.
    ///
    /// Returns `false` when nothing arrived within `timeout`.
    pub(crate) fn wait_for_response(&mut self, timeout: Duration) -> bool {
        let Some(response) = self.loader.recv_timeout(timeout) else {
            return false;
        };
        let mut events = Vec::new();
        self.dispatch(vec![response.into_command()], &mut events);
        self.react(&events);
        true
    }

    /// Opens the detail overlay for a record of the loaded collection.
    pub(crate) fn select(&mut self, index: usize) {
        let mut events = Vec::new();
        self.dispatch(vec![Command::Select { index }], &mut events);
        self.react(&events);
    }

    pub(crate) fn scene(&self) -> Scene {
        Scene::new(
            query::search_term(&self.world).to_owned(),
            self.grid.clone(),
            self.overlay.clone(),
        )
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn pagination(&self) -> &PaginationState {
        query::pagination(&self.world)
    }

    pub(crate) fn grid(&self) -> &GridView {
        &self.grid
    }

    pub(crate) fn overlay(&self) -> Option<&OverlayView> {
        self.overlay.as_ref()
    }

    /// Failure reported by the most recent failed page load, if any.
    pub(crate) fn last_failure(&self) -> Option<&FetchFailure> {
        self.last_failure.as_ref()
    }

    fn sentinel_input(&self) -> SentinelInput {
        let pagination = query::pagination(&self.world);
        SentinelInput::new(
            self.grid.sentinel(),
            pagination.is_loading_more(),
            pagination.has_more(),
        )
    }

    fn loading_state(&self) -> LoadingState {
        let pagination = query::pagination(&self.world);
        LoadingState {
            initial_loading: pagination.is_initial_loading(),
            loading_more: pagination.is_loading_more(),
        }
    }

    /// Applies commands and every follow-up command the pagination system
    /// derives from the resulting events.
    fn dispatch(&mut self, commands: Vec<Command>, log: &mut Vec<Event>) {
        let mut pending = commands;
        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }

            let mut follow_up = Vec::new();
            let mut requests = Vec::new();
            self.pagination.handle(&events, &mut follow_up, &mut requests);
            for request in requests {
                self.loader.submit(request);
            }

            log.extend(events);
            pending = follow_up;
        }
    }

    fn react(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::PageLoadFailed { failure, .. } => {
                    self.last_failure = Some(failure.clone());
                }
                Event::Mounted { .. } => self.last_failure = None,
                _ => {}
            }
        }
        self.refresh();
    }

    fn refresh(&mut self) {
        self.grid = GridView::derive(
            query::pokemon(&self.world),
            query::search_term(&self.world),
            self.loading_state(),
        );
        self.overlay = OverlayView::from_selection(query::selected(&self.world));
    }
}
