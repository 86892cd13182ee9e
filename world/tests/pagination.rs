use pokedex_core::{
    AdvanceRejection, Command, Event, FetchFailure, FetchFailureKind, PageCursor, PageRequest,
    Pokemon, PokemonId, Stats, PAGE_SIZE,
};
use pokedex_world::{self as world, query, World};

fn record(id: u32) -> Pokemon {
    Pokemon {
        id: PokemonId::new(id),
        pokedex_id: id,
        name: format!("Pokemon {id}"),
        image: format!("https://example.test/{id}.png"),
        sprite: String::new(),
        stats: Stats::default(),
        generation: 1,
        evolutions: Vec::new(),
        types: Vec::new(),
    }
}

fn page_of(start: u32, len: usize) -> Vec<Pokemon> {
    (0..len as u32).map(|offset| record(start + offset)).collect()
}

/// Mounts the world and starts the first page, returning the in-flight request.
fn mount(world: &mut World, events: &mut Vec<Event>) -> PageRequest {
    world::apply(world, Command::Mount, events);
    world::apply(
        world,
        Command::BeginPageLoad {
            page: PageCursor::FIRST,
        },
        events,
    );
    query::pagination(world)
        .in_flight()
        .expect("first page should be in flight after mount")
}

/// Advances the cursor and starts the requested page, returning the in-flight request.
fn advance(world: &mut World, events: &mut Vec<Event>) -> PageRequest {
    events.clear();
    world::apply(world, Command::AdvanceCursor, events);
    let page = match events.as_slice() {
        [Event::CursorAdvanceRequested { page }] => *page,
        other => panic!("expected an advance request, got {other:?}"),
    };
    world::apply(world, Command::BeginPageLoad { page }, events);
    query::pagination(world)
        .in_flight()
        .expect("page should be in flight after advance")
}

fn load_pages(sizes: &[usize]) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    let mut next_id = 1;
    for (position, size) in sizes.iter().enumerate() {
        let request = if position == 0 {
            mount(&mut world, &mut events)
        } else {
            advance(&mut world, &mut events)
        };
        world::apply(
            &mut world,
            Command::CompletePageLoad {
                request,
                pokemon: page_of(next_id, *size),
            },
            &mut events,
        );
        next_id += *size as u32;
    }
    world
}

#[test]
fn collection_length_is_sum_of_page_sizes() {
    let sizes = [PAGE_SIZE, PAGE_SIZE, PAGE_SIZE, 12];
    let world = load_pages(&sizes);

    assert_eq!(query::pokemon(&world).len(), sizes.iter().sum::<usize>());
    assert_eq!(query::pagination(&world).cursor(), PageCursor::new(4));
    assert!(!query::pagination(&world).has_more());
}

#[test]
fn has_more_tracks_only_the_last_page() {
    for sizes in [
        vec![PAGE_SIZE],
        vec![PAGE_SIZE, PAGE_SIZE],
        vec![PAGE_SIZE, PAGE_SIZE - 1],
        vec![0],
    ] {
        let world = load_pages(&sizes);
        let last = *sizes.last().expect("non-empty");
        assert_eq!(
            query::pagination(&world).has_more(),
            last == PAGE_SIZE,
            "sizes {sizes:?}"
        );
    }
}

#[test]
fn full_first_page_leaves_more_data_available() {
    let mut world = World::new();
    let mut events = Vec::new();
    let request = mount(&mut world, &mut events);

    world::apply(
        &mut world,
        Command::CompletePageLoad {
            request,
            pokemon: page_of(1, PAGE_SIZE),
        },
        &mut events,
    );

    let pagination = query::pagination(&world);
    assert!(pagination.has_more());
    assert!(!pagination.is_initial_loading());
    assert_eq!(pagination.next_page(), PageCursor::new(2));
    assert!(events.contains(&Event::PageLoaded {
        request,
        count: PAGE_SIZE,
        total: PAGE_SIZE,
        has_more: true,
    }));
}

#[test]
fn short_page_exhausts_and_rejects_further_advances() {
    let mut world = load_pages(&[PAGE_SIZE, 37]);
    let mut events = Vec::new();

    world::apply(&mut world, Command::AdvanceCursor, &mut events);

    assert_eq!(
        events,
        vec![Event::CursorAdvanceRejected {
            reason: AdvanceRejection::Exhausted,
        }]
    );
    assert_eq!(query::pokemon(&world).len(), PAGE_SIZE + 37);
}

#[test]
fn appended_pages_preserve_arrival_order() {
    let world = load_pages(&[PAGE_SIZE, 3]);
    let ids: Vec<u32> = query::pokemon(&world)
        .iter()
        .skip(PAGE_SIZE - 1)
        .map(|pokemon| pokemon.id.get())
        .collect();

    assert_eq!(ids, vec![50, 51, 52, 53]);
}

#[test]
fn incremental_load_sets_loading_more_only() {
    let mut world = load_pages(&[PAGE_SIZE]);
    let mut events = Vec::new();

    let request = advance(&mut world, &mut events);

    let pagination = query::pagination(&world);
    assert_eq!(request.page, PageCursor::new(2));
    assert!(pagination.is_loading_more());
    assert!(!pagination.is_initial_loading());
}

#[test]
fn advance_is_rejected_while_a_page_is_in_flight() {
    let mut world = load_pages(&[PAGE_SIZE]);
    let mut events = Vec::new();
    let _ = advance(&mut world, &mut events);
    events.clear();

    world::apply(&mut world, Command::AdvanceCursor, &mut events);

    assert_eq!(
        events,
        vec![Event::CursorAdvanceRejected {
            reason: AdvanceRejection::LoadInFlight,
        }]
    );
}

#[test]
fn failed_fetch_leaves_collection_and_cursor_untouched() {
    let mut world = load_pages(&[PAGE_SIZE]);
    let mut events = Vec::new();
    let before: Vec<Pokemon> = query::pokemon(&world).to_vec();
    let cursor_before = query::pagination(&world).cursor();

    let request = advance(&mut world, &mut events);
    world::apply(
        &mut world,
        Command::FailPageLoad {
            request,
            failure: FetchFailure::new(FetchFailureKind::Transport, "network unreachable"),
        },
        &mut events,
    );

    let pagination = query::pagination(&world);
    assert_eq!(query::pokemon(&world), before.as_slice());
    assert_eq!(pagination.cursor(), cursor_before);
    assert!(!pagination.is_loading_more());
    assert!(pagination.in_flight().is_none());

    let retry = advance(&mut world, &mut events);
    assert_eq!(retry.page, request.page, "the failed page is requested again");
}

#[test]
fn response_for_superseded_session_is_discarded() {
    let mut world = World::new();
    let mut events = Vec::new();
    let stale = mount(&mut world, &mut events);
    let current = mount(&mut world, &mut events);
    assert_ne!(stale.session, current.session);

    events.clear();
    world::apply(
        &mut world,
        Command::CompletePageLoad {
            request: stale,
            pokemon: page_of(1, PAGE_SIZE),
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![Event::StaleResponseDiscarded { request: stale }]
    );
    assert!(query::pokemon(&world).is_empty());
    assert!(query::pagination(&world).is_initial_loading());
}

#[test]
fn remount_replaces_the_collection() {
    let mut world = load_pages(&[PAGE_SIZE, PAGE_SIZE]);
    let mut events = Vec::new();

    let request = mount(&mut world, &mut events);
    assert!(query::pokemon(&world).is_empty());
    world::apply(
        &mut world,
        Command::CompletePageLoad {
            request,
            pokemon: page_of(900, 4),
        },
        &mut events,
    );

    let ids: Vec<u32> = query::pokemon(&world).iter().map(|p| p.id.get()).collect();
    assert_eq!(ids, vec![900, 901, 902, 903]);
    assert_eq!(query::pagination(&world).cursor(), PageCursor::FIRST);
}

#[test]
fn duplicate_identifiers_across_pages_are_kept() {
    let mut world = load_pages(&[PAGE_SIZE]);
    let mut events = Vec::new();
    let request = advance(&mut world, &mut events);

    world::apply(
        &mut world,
        Command::CompletePageLoad {
            request,
            pokemon: page_of(49, 2),
        },
        &mut events,
    );

    assert_eq!(query::pokemon(&world).len(), PAGE_SIZE + 2);
}

#[test]
fn selection_shows_source_record_and_dismissal_is_idempotent() {
    let mut world = World::new();
    let mut events = Vec::new();
    let request = mount(&mut world, &mut events);
    let mut pokemon = page_of(1, 3);
    pokemon[1].stats = Stats {
        hp: 39,
        speed: 65,
        attack: 52,
        defense: 43,
        special_attack: 60,
        special_defense: 50,
    };
    let expected = pokemon[1].clone();
    world::apply(
        &mut world,
        Command::CompletePageLoad { request, pokemon },
        &mut events,
    );

    events.clear();
    world::apply(&mut world, Command::Select { index: 1 }, &mut events);
    assert_eq!(events, vec![Event::SelectionChanged { index: 1 }]);
    assert_eq!(query::selected(&world), Some(&expected));
    assert!(query::pagination(&world).in_flight().is_none());

    events.clear();
    world::apply(&mut world, Command::Dismiss, &mut events);
    world::apply(&mut world, Command::Dismiss, &mut events);
    assert_eq!(events, vec![Event::SelectionCleared]);
    assert!(query::selected(&world).is_none());
}
