//! Integration Tests for Fields, Conditions and Grids
//!
//! These tests verify that the reactive primitives and grids work together
//! correctly through the public API only.

use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tessera_core::grid::{Grid, GridShape, GridWorldConfig, GridWorldPosition, Vec2Int, Vec3};
use tessera_core::reactive::{
    ConditionMode, ReactiveCondition, ReactiveField, ReactiveFieldWrapper, ReadOnlyRx,
};
use tessera_core::{GridError, RxError};

fn positive(v: &i32) -> bool {
    *v > 0
}

fn call_counter(condition: &ReactiveCondition<i32>) -> Arc<AtomicUsize> {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = calls.clone();
    condition.subscribe(move |_: &bool| {
        calls_clone.fetch_add(1, Ordering::SeqCst);
    });
    calls
}

/// Test that setting an equal value fires no notification.
#[test]
fn equal_set_is_silent() {
    let field = ReactiveField::new(7);
    let calls = Arc::new(AtomicI32::new(0));
    let calls_clone = calls.clone();
    field.subscribe(move |_: &i32| {
        calls_clone.fetch_add(1, Ordering::SeqCst);
    });

    assert!(!field.set(7));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

/// Test that a change reaches every subscriber exactly once, in order.
#[test]
fn change_fires_each_subscriber_once_in_order() {
    let field = ReactiveField::new(1);
    let log = Arc::new(Mutex::new(Vec::new()));

    for name in ["first", "second", "third"] {
        let log_clone = log.clone();
        field.subscribe(move |value: &i32| log_clone.lock().push((name, *value)));
    }

    assert!(field.set(2));
    assert_eq!(
        *log.lock(),
        vec![("first", 2), ("second", 2), ("third", 2)]
    );
}

/// Test that force_invoke re-delivers without touching the value.
#[test]
fn force_invoke_keeps_state() {
    let field = ReactiveField::new(String::from("ready"));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    field.subscribe(move |value: &String| seen_clone.lock().push(value.clone()));

    field.force_invoke();
    field.force_invoke();

    assert_eq!(field.get(), "ready");
    assert_eq!(*seen.lock(), vec!["ready".to_string(), "ready".to_string()]);
}

/// Test aggregate correctness over every combination of three sources.
#[test]
fn condition_matches_aggregate_for_every_combination() {
    let sources: Vec<ReactiveField<i32>> = (0..3).map(|_| ReactiveField::new(0)).collect();
    let all = ReactiveCondition::new(sources.clone(), positive, ConditionMode::All);
    let any = ReactiveCondition::new(sources.clone(), positive, ConditionMode::Any);

    // Gray code order so each step changes exactly one source
    for step in [0b000, 0b001, 0b011, 0b010, 0b110, 0b111, 0b101, 0b100, 0b000] {
        for (bit, source) in sources.iter().enumerate() {
            source.set(if step & (1 << bit) != 0 { 1 } else { 0 });
        }

        let results: Vec<bool> = sources.iter().map(|s| positive(&s.get())).collect();
        assert_eq!(all.value(), results.iter().all(|r| *r), "all at {step:03b}");
        assert_eq!(any.value(), results.iter().any(|r| *r), "any at {step:03b}");
    }
}

/// Test that changes which keep a source's result do not notify.
#[test]
fn unchanged_source_result_short_circuits() {
    let sources = vec![ReactiveField::new(1), ReactiveField::new(2)];
    let condition = ReactiveCondition::new(sources.clone(), positive, ConditionMode::All);
    let calls = call_counter(&condition);

    sources[0].set(5);
    sources[1].set(9);
    sources[1].set(3);

    assert!(condition.value());
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    sources[0].set(-1);
    assert!(!condition.value());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// Test the vacuous aggregate of a condition without sources.
#[test]
fn empty_condition_is_vacuous() {
    let none: Vec<ReactiveField<i32>> = Vec::new();
    let all = ReactiveCondition::new(none.clone(), positive, ConditionMode::All);
    let any = ReactiveCondition::new(none, positive, ConditionMode::Any);

    assert!(all.value());
    assert!(!any.value());
    assert_eq!(all.source_count(), 0);
}

/// Test that an unknown raw mode fails before the condition exists.
#[test]
fn unknown_raw_mode_fails_fast() {
    let sources = vec![ReactiveField::new(1)];
    let result = ReactiveCondition::from_raw_mode(sources.clone(), positive, 3);
    assert_eq!(result.err(), Some(RxError::UnknownConditionMode(3)));

    let any = ReactiveCondition::from_raw_mode(sources, positive, 2).unwrap();
    assert_eq!(any.mode(), ConditionMode::Any);
    assert_eq!("ALL".parse::<ConditionMode>(), Ok(ConditionMode::All));
}

/// Test that conditions compose: a condition can observe other conditions.
#[test]
fn nested_conditions_propagate() {
    let red = vec![ReactiveField::new(0), ReactiveField::new(0)];
    let blue = vec![ReactiveField::new(0)];

    let red_done = ReactiveCondition::new(red.clone(), positive, ConditionMode::All);
    let blue_done = ReactiveCondition::new(blue.clone(), positive, ConditionMode::Any);
    let level_done = ReactiveCondition::new(
        vec![red_done.clone(), blue_done.clone()],
        |done: &bool| *done,
        ConditionMode::All,
    );

    let flips = Arc::new(Mutex::new(Vec::new()));
    let flips_clone = flips.clone();
    level_done.subscribe(move |met: &bool| flips_clone.lock().push(*met));

    red[0].set(1);
    blue[0].set(1);
    assert!(!level_done.value());

    red[1].set(1);
    assert!(level_done.value());

    blue[0].set(0);
    assert!(!level_done.value());
    assert_eq!(*flips.lock(), vec![true, false]);
}

/// Test that one callback can tell wrapped sources apart.
#[test]
fn wrappers_identify_the_firing_source() {
    let health = ReactiveField::new(100);
    let mana = ReactiveField::new(50);
    let wrappers = [
        ReactiveFieldWrapper::new(health.clone()),
        ReactiveFieldWrapper::new(mana.clone()),
    ];
    let health_token = wrappers[0].token();

    let fired = Arc::new(Mutex::new(Vec::new()));
    for wrapper in &wrappers {
        let fired_clone = fired.clone();
        wrapper.subscribe(move |source| {
            fired_clone.lock().push((source.token() == health_token, source.value()));
        });
    }

    mana.set(40);
    health.set(90);
    health.set(90);

    assert_eq!(*fired.lock(), vec![(false, 40), (true, 90)]);
}

/// Test that a dropped condition stops listening to its sources.
#[test]
fn dropped_condition_detaches() {
    let source = ReactiveField::new(0);
    let condition = ReactiveCondition::new([source.clone()], positive, ConditionMode::Any);
    assert_eq!(source.subscriber_count(), 1);

    drop(condition);
    assert_eq!(source.subscriber_count(), 0);
    assert!(source.set(1));
}

/// Test a grid driving fields that feed a condition.
#[test]
fn grid_writes_drive_a_condition() {
    let mut board: Grid<i32> = Grid::new(Vec2Int::new(2, 2)).unwrap();
    let tiles: Vec<ReactiveField<i32>> = board.iter().map(|(_, v)| ReactiveField::new(*v)).collect();
    let cleared = ReactiveCondition::new(tiles.clone(), positive, ConditionMode::All);

    let shape = *board.shape();
    let wired = tiles.clone();
    board.subscribe(move |coord: Vec2Int, value: &i32| {
        let index = (coord.x * shape.height() + coord.y) as usize;
        wired[index].set(*value);
    });

    let mut remaining = 4;
    board.traverse_cells(|_, _| remaining -= 1);
    assert_eq!(remaining, 0);

    for coord in shape.coordinates().collect::<Vec<_>>() {
        assert!(!cleared.value());
        board.set_cell(coord, 1);
    }
    assert!(cleared.value());

    // Out-of-bounds writes never reach the fields
    assert!(!board.set_cell(Vec2Int::new(2, 0), -1));
    assert!(cleared.value());

    board.set_cell(Vec2Int::new(1, 1), 0);
    assert!(!cleared.value());
}

/// Test grid bounds behavior at every edge.
#[test]
fn grid_bounds_degrade_silently() {
    let mut grid = Grid::with_factory(Vec2Int::new(3, 2), |_: &GridShape, c: Vec2Int| c.x + c.y + 1).unwrap();
    let before = grid.cells().to_vec();
    let events = Arc::new(AtomicUsize::new(0));
    let events_clone = events.clone();
    grid.subscribe(move |_: Vec2Int, _: &i32| {
        events_clone.fetch_add(1, Ordering::SeqCst);
    });

    for coord in [Vec2Int::new(-1, 0), Vec2Int::new(3, 0), Vec2Int::new(0, 2)] {
        assert_eq!(grid.get_cell(coord), 0);
        assert!(!grid.set_cell(coord, 42));
        assert!(!grid.set_dirty_cell(coord));
    }

    assert_eq!(grid.cells(), before.as_slice());
    assert_eq!(events.load(Ordering::SeqCst), 0);
}

/// Test that a failing traversal visits exactly three cells.
#[test]
fn traversal_early_exit_visits_three_cells() {
    for size in [Vec2Int::new(3, 1), Vec2Int::new(10, 10), Vec2Int::new(200, 3)] {
        let grid: Grid<()> = Grid::new(size).unwrap();
        let mut visited = Vec::new();

        let completed = grid.try_traverse_cells(|coord, _| {
            visited.push(coord);
            visited.len() < 3
        });

        assert!(!completed);
        assert_eq!(visited.len(), 3);
    }
}

/// Test the world-position round trip and floor semantics.
#[test]
fn world_position_round_trip() {
    let world: GridWorldPosition<u8> =
        GridWorldPosition::new(2.0, Vec3::ZERO, Vec2Int::new(8, 8)).unwrap();

    let corner = world.cell_world_position(Vec2Int::new(3, 4));
    assert_eq!(world.cell_coordinate(corner), Vec2Int::new(3, 4));
    assert_eq!(world.cell_coordinate(Vec3::new(-0.5, -0.5, 0.0)), Vec2Int::new(-1, -1));
}

/// Test building a world grid from JSON configuration.
#[test]
fn world_grid_from_json_config() {
    let config = GridWorldConfig::from_json(
        r#"{ "size": { "x": 4, "y": 4 }, "cell_size": 0.5, "anchor": { "x": -1.0, "y": -1.0, "z": 0.0 } }"#,
    )
    .unwrap();
    let mut world: GridWorldPosition<bool> = GridWorldPosition::from_config(&config).unwrap();

    assert!(world.set_cell_at(Vec3::new(-0.9, 0.9, 0.0), true));
    assert!(world.grid().get_cell(Vec2Int::new(0, 3)));
    assert!(world.get_cell_at(Vec3::new(-0.6, 0.6, 2.0)));

    let bad = GridWorldConfig::from_json(r#"{ "size": { "x": 4, "y": 4 }, "cell_size": -2.0 }"#);
    assert!(matches!(bad, Err(GridError::InvalidCellSize(_))));
}

/// Test that read-only handles observe without owning a setter.
#[test]
fn read_only_handles_observe_sources() {
    let score = ReactiveField::new(0);
    let view: Box<dyn ReadOnlyRx<i32>> = Box::new(score.clone());

    let seen = Arc::new(AtomicI32::new(-1));
    let seen_clone = seen.clone();
    let id = view.add_listener(Arc::new(move |v: &i32| seen_clone.store(*v, Ordering::SeqCst)));

    score.set(12);
    assert_eq!(view.value(), 12);
    assert_eq!(seen.load(Ordering::SeqCst), 12);

    assert!(view.remove_listener(id));
    assert!(!view.remove_listener(id));
}
