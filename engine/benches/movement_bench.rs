use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use snake_arcade_engine::games::SessionRng;
use snake_arcade_engine::games::snake::{
    Direction, FieldSize, GameMode, GamePhase, GameStateMachine, MatchSettings,
};

fn started_machine(mode: GameMode, size: usize) -> GameStateMachine {
    let mut settings = MatchSettings::for_mode(mode);
    settings.field_size = FieldSize::new(size, size);
    settings.time_limit_secs = None;

    let player = Some("bench".to_string().into());
    let mut machine = GameStateMachine::new(mode, settings, player, SessionRng::new(1));
    machine.begin_setup(None);
    machine.enter_in_progress();
    machine
}

/// Walks the snake in a tight loop back and forth across the top rows until it dies.
fn bench_serpentine_match(mode: GameMode) -> u64 {
    let mut machine = started_machine(mode, 40);
    let mut turn = [Direction::Down, Direction::Left, Direction::Down, Direction::Right]
        .into_iter()
        .cycle();

    while machine.phase() != GamePhase::GameOver && machine.tick_count() < 5_000 {
        let head = machine.gameboard().snake.head();
        let heading = machine.gameboard().snake.direction;
        let blocked = match heading {
            Direction::Right => head.col + 2 >= 40,
            Direction::Left => head.col <= 1,
            _ => true,
        };
        if blocked && let Some(key) = turn.next().and_then(|d| d.key()) {
            machine.handle_direction_key(key);
        }
        black_box(machine.movement_tick());
    }
    machine.tick_count()
}

fn bench_spawn_on_crowded_board() {
    let mut machine = started_machine(GameMode::Blitz, 12);
    for _ in 0..200 {
        machine.handle_direction_key("ArrowUp");
        black_box(machine.movement_tick());
        machine.handle_direction_key("ArrowRight");
        black_box(machine.movement_tick());
        if machine.phase() == GamePhase::GameOver {
            machine.begin_setup(None);
            machine.enter_in_progress();
        }
    }
}

fn movement_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("movement");

    group.bench_function("blitz_serpentine", |b| {
        b.iter(|| bench_serpentine_match(GameMode::Blitz))
    });

    group.bench_function("delivery_serpentine", |b| {
        b.iter(|| bench_serpentine_match(GameMode::Delivery))
    });

    group.bench_function("restart_cycles", |b| {
        b.iter(bench_spawn_on_crowded_board)
    });

    group.finish();
}

criterion_group!(benches, movement_bench);
criterion_main!(benches);
