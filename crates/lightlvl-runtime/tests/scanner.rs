use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use lightlvl_config::SharedSettings;
use lightlvl_geom::{BlockPos, ScanShape};
use lightlvl_rules::{Classifier, FixedBands, LightChannel, Rgba};
use lightlvl_runtime::{
    HIGHLIGHT_OWNER, HighlightRenderer, HighlightTask, MainThreadQueue, Scanner, ScannerState,
    task_queue,
};
use lightlvl_scan::ScanSettings;
use lightlvl_world::{Block, BlockQuery, QueryError, SharedPlayer, VoxelGrid};

const PERIOD: Duration = Duration::from_millis(5);
const WAIT: Duration = Duration::from_secs(5);

fn floor_world() -> VoxelGrid {
    let mut g = VoxelGrid::new(BlockPos::new(-16, 0, -16), BlockPos::new(16, 0, 16));
    g.fill(BlockPos::new(-16, 9, -16), BlockPos::new(16, 9, 16), Block::Solid);
    g
}

fn settings(radius: u32) -> SharedSettings {
    SharedSettings::new(ScanSettings::new(
        radius,
        ScanShape::Cube,
        Classifier::Fixed(FixedBands::default()),
    ))
}

fn player() -> Arc<SharedPlayer> {
    Arc::new(SharedPlayer::new(0.5, 10.0, 0.5))
}

fn next_apply(queue: &MainThreadQueue) -> Option<Vec<BlockPos>> {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if let Some(HighlightTask::Apply(set)) = queue.recv_timeout(Duration::from_millis(50)) {
            return Some(set.positions().to_vec());
        }
    }
    None
}

/// Fails every query while `failing` is positive, counting down per pass-start query.
struct Flaky {
    inner: VoxelGrid,
    failing: AtomicUsize,
    panics: AtomicUsize,
}

impl BlockQuery for Flaky {
    fn is_air(&self, pos: BlockPos) -> Result<bool, QueryError> {
        if self
            .panics
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            panic!("host blew up");
        }
        if self
            .failing
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(QueryError::Unavailable("chunk reloading".into()));
        }
        self.inner.is_air(pos)
    }

    fn is_solid(&self, pos: BlockPos) -> Result<bool, QueryError> {
        self.inner.is_solid(pos)
    }

    fn light_level(&self, pos: BlockPos, channel: LightChannel) -> Result<u8, QueryError> {
        self.inner.light_level(pos, channel)
    }
}

#[test]
fn activation_publishes_and_deactivation_clears() {
    let (tx, queue) = task_queue();
    let mut scanner =
        Scanner::new(Arc::new(floor_world()), player(), settings(2), tx).with_period(PERIOD);
    assert_eq!(scanner.state(), ScannerState::Idle);
    assert!(scanner.activate().unwrap());
    assert!(!scanner.activate().unwrap());
    assert_eq!(scanner.state(), ScannerState::Scanning);

    let positions = next_apply(&queue).expect("a pass result");
    // cube r=2 around y=10 covers y 8..12; the floor at y=9 gives 5x5 tiles
    assert_eq!(positions.len(), 25);
    assert!(positions.iter().all(|p| p.y == 9));

    assert!(scanner.deactivate());
    assert_eq!(scanner.state(), ScannerState::Idle);
    let tasks: Vec<HighlightTask> = std::iter::from_fn(|| queue.try_next()).collect();
    assert_eq!(tasks.last(), Some(&HighlightTask::Clear));
    assert_eq!(
        tasks.iter().filter(|t| **t == HighlightTask::Clear).count(),
        1
    );
    assert!(scanner.stats().passes >= 1);
}

#[test]
fn deactivating_idle_scanner_is_a_no_op() {
    let (tx, queue) = task_queue();
    let mut scanner = Scanner::new(Arc::new(floor_world()), player(), settings(2), tx);
    assert!(!scanner.deactivate());
    assert_eq!(queue.pending(), 0);
    assert!(!scanner.abort());
    assert_eq!(queue.try_next(), Some(HighlightTask::Clear));
}

#[test]
fn toggle_flips_state_and_reactivation_starts_fresh() {
    let (tx, queue) = task_queue();
    let mut scanner =
        Scanner::new(Arc::new(floor_world()), player(), settings(1), tx).with_period(PERIOD);
    assert_eq!(scanner.toggle().unwrap(), ScannerState::Scanning);
    assert!(next_apply(&queue).is_some());
    assert_eq!(scanner.toggle().unwrap(), ScannerState::Idle);
    while queue.try_next().is_some() {}

    assert_eq!(scanner.toggle().unwrap(), ScannerState::Scanning);
    assert!(next_apply(&queue).is_some());
    drop(scanner);
    let tail: Vec<HighlightTask> = std::iter::from_fn(|| queue.try_next()).collect();
    assert_eq!(tail.last(), Some(&HighlightTask::Clear));
}

#[test]
fn failed_passes_are_skipped_and_the_loop_continues() {
    let world = Arc::new(Flaky {
        inner: floor_world(),
        failing: AtomicUsize::new(3),
        panics: AtomicUsize::new(2),
    });
    let (tx, queue) = task_queue();
    let mut scanner = Scanner::new(world, player(), settings(1), tx).with_period(PERIOD);
    scanner.activate().unwrap();
    let positions = next_apply(&queue).expect("loop survives failures");
    assert_eq!(positions.len(), 9);
    assert!(scanner.stats().skipped >= 5);
    assert!(scanner.is_active());
    scanner.deactivate();
}

#[test]
fn unloaded_player_area_keeps_previous_overlay() {
    let (tx, queue) = task_queue();
    let p = player();
    let mut scanner =
        Scanner::new(Arc::new(floor_world()), p.clone(), settings(1), tx).with_period(PERIOD);
    scanner.activate().unwrap();
    assert!(next_apply(&queue).is_some());

    p.set_feet(1000.0, 10.0, 0.0);
    while queue.try_next().is_some() {}
    let skipped_before = scanner.stats().skipped;
    let deadline = Instant::now() + WAIT;
    while scanner.stats().skipped < skipped_before + 3 && Instant::now() < deadline {
        std::thread::sleep(PERIOD);
    }
    assert!(scanner.stats().skipped >= skipped_before + 3);
    // passes at the far position fail, so nothing new replaces the overlay
    assert!(
        std::iter::from_fn(|| queue.try_next())
            .all(|t| !matches!(t, HighlightTask::Clear))
    );
    scanner.deactivate();
}

#[test]
fn settings_changes_apply_on_a_later_pass() {
    let shared = settings(1);
    let (tx, queue) = task_queue();
    let mut scanner =
        Scanner::new(Arc::new(floor_world()), player(), shared.clone(), tx).with_period(PERIOD);
    scanner.activate().unwrap();
    assert_eq!(next_apply(&queue).map(|p| p.len()), Some(9));

    shared.publish(ScanSettings::new(
        3,
        ScanShape::Cube,
        Classifier::Fixed(FixedBands::default()),
    ));
    let deadline = Instant::now() + WAIT;
    let mut saw_new = false;
    while Instant::now() < deadline {
        if next_apply(&queue).map(|p| p.len()) == Some(49) {
            saw_new = true;
            break;
        }
    }
    assert!(saw_new);
    scanner.deactivate();
}

#[derive(Default)]
struct Overlay {
    owner: Option<u32>,
    shown: Vec<(BlockPos, Rgba)>,
    calls: usize,
}

impl HighlightRenderer for Overlay {
    fn set_highlights(&mut self, owner: u32, positions: &[BlockPos], colors: &[Rgba]) {
        self.owner = Some(owner);
        self.shown = positions.iter().copied().zip(colors.iter().copied()).collect();
        self.calls += 1;
    }
}

#[test]
fn renderer_ends_empty_after_deactivation() {
    let (tx, queue) = task_queue();
    let mut scanner =
        Scanner::new(Arc::new(floor_world()), player(), settings(2), tx).with_period(PERIOD);
    scanner.activate().unwrap();
    let mut overlay = Overlay::default();
    let deadline = Instant::now() + WAIT;
    while overlay.shown.is_empty() && Instant::now() < deadline {
        queue.drain(&mut overlay);
        std::thread::sleep(PERIOD);
    }
    assert_eq!(overlay.owner, Some(HIGHLIGHT_OWNER));
    assert_eq!(overlay.shown.len(), 25);

    scanner.deactivate();
    queue.drain(&mut overlay);
    assert!(overlay.shown.is_empty());
    assert!(overlay.calls >= 2);
}
