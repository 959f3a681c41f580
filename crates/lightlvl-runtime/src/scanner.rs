use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use lightlvl_config::SharedSettings;
use lightlvl_scan::{CancelToken, HighlightSet, ScanError, box_volume, scan_region};
use lightlvl_world::{BlockQuery, PlayerSource};

use crate::queue::TaskSender;

pub const DEFAULT_PERIOD: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScannerState {
    Idle,
    Scanning,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScannerStats {
    pub passes: u64,
    pub skipped: u64,
    pub last_count: u64,
    pub last_pass_us: u64,
}

#[derive(Default)]
struct StatsCounters {
    passes: AtomicU64,
    skipped: AtomicU64,
    last_count: AtomicU64,
    last_pass_us: AtomicU64,
}

impl StatsCounters {
    fn snapshot(&self) -> ScannerStats {
        ScannerStats {
            passes: self.passes.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            last_count: self.last_count.load(Ordering::Relaxed),
            last_pass_us: self.last_pass_us.load(Ordering::Relaxed),
        }
    }
}

struct ScanTask {
    cancel: CancelToken,
    // Dropping the sender wakes the loop out of its wait.
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

struct LoopCtx {
    world: Arc<dyn BlockQuery>,
    player: Arc<dyn PlayerSource>,
    settings: SharedSettings,
    tasks: TaskSender,
    period: Duration,
    cancel: CancelToken,
    stop_rx: Receiver<()>,
    stats: Arc<StatsCounters>,
}

/// Owns the periodic scan thread.
///
/// Every activation gets a fresh thread and cancel token. Deactivation is
/// cooperative: it signals, joins, then enqueues exactly one clear.
pub struct Scanner {
    world: Arc<dyn BlockQuery>,
    player: Arc<dyn PlayerSource>,
    settings: SharedSettings,
    tasks: TaskSender,
    period: Duration,
    stats: Arc<StatsCounters>,
    active: Option<ScanTask>,
}

impl Scanner {
    pub fn new(
        world: Arc<dyn BlockQuery>,
        player: Arc<dyn PlayerSource>,
        settings: SharedSettings,
        tasks: TaskSender,
    ) -> Self {
        Self {
            world,
            player,
            settings,
            tasks,
            period: DEFAULT_PERIOD,
            stats: Arc::new(StatsCounters::default()),
            active: None,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn state(&self) -> ScannerState {
        match &self.active {
            Some(task) if !task.handle.is_finished() => ScannerState::Scanning,
            _ => ScannerState::Idle,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state() == ScannerState::Scanning
    }

    pub fn stats(&self) -> ScannerStats {
        self.stats.snapshot()
    }

    /// Starts scanning. Returns `Ok(false)` if already scanning.
    pub fn activate(&mut self) -> io::Result<bool> {
        if self.is_active() {
            return Ok(false);
        }
        // A loop that exited on its own still owes its clear.
        self.deactivate();

        let cancel = CancelToken::new();
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let ctx = LoopCtx {
            world: Arc::clone(&self.world),
            player: Arc::clone(&self.player),
            settings: self.settings.clone(),
            tasks: self.tasks.clone(),
            period: self.period,
            cancel: cancel.clone(),
            stop_rx,
            stats: Arc::clone(&self.stats),
        };
        let handle = thread::Builder::new()
            .name("lightlvl-scan".into())
            .spawn(move || scan_loop(ctx))?;
        self.active = Some(ScanTask {
            cancel,
            stop_tx,
            handle,
        });
        let settings = self.settings.load();
        log::info!(
            "light level scanning on (period {:?}, radius {} {}, {} blocks per pass)",
            self.period,
            settings.radius,
            settings.shape,
            box_volume(&settings)
        );
        Ok(true)
    }

    /// Stops scanning and clears the overlay. Returns `false` if nothing was running.
    pub fn deactivate(&mut self) -> bool {
        let Some(task) = self.active.take() else {
            return false;
        };
        task.cancel.cancel();
        drop(task.stop_tx);
        if task.handle.join().is_err() {
            log::warn!("scan thread terminated abnormally");
        }
        self.tasks.clear();
        log::info!("light level scanning off");
        true
    }

    pub fn toggle(&mut self) -> io::Result<ScannerState> {
        if self.is_active() {
            self.deactivate();
        } else {
            self.activate()?;
        }
        Ok(self.state())
    }

    /// Stops if running and always clears, for overlays that refuse to go away.
    pub fn abort(&mut self) -> bool {
        let was_running = self.deactivate();
        if !was_running {
            self.tasks.clear();
        }
        was_running
    }
}

impl Drop for Scanner {
    fn drop(&mut self) {
        self.deactivate();
    }
}

fn run_pass(ctx: &LoopCtx) -> Result<HighlightSet, ScanError> {
    let settings = ctx.settings.load();
    let center = ctx.player.feet_block_pos()?;
    scan_region(ctx.world.as_ref(), center, &settings, &ctx.cancel)
}

fn scan_loop(ctx: LoopCtx) {
    loop {
        match ctx.stop_rx.recv_timeout(ctx.period) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
        if ctx.cancel.is_cancelled() {
            break;
        }

        let t0 = Instant::now();
        match panic::catch_unwind(AssertUnwindSafe(|| run_pass(&ctx))) {
            Ok(Ok(set)) => {
                let us = t0.elapsed().as_micros().min(u128::from(u64::MAX)) as u64;
                ctx.stats.passes.fetch_add(1, Ordering::Relaxed);
                ctx.stats.last_count.store(set.len() as u64, Ordering::Relaxed);
                ctx.stats.last_pass_us.store(us, Ordering::Relaxed);
                ctx.tasks.apply(set);
            }
            Ok(Err(ScanError::Cancelled)) => break,
            Ok(Err(ScanError::Query(e))) => {
                ctx.stats.skipped.fetch_add(1, Ordering::Relaxed);
                log::debug!(target: "scan", "pass skipped: {}", e);
            }
            Err(_) => {
                ctx.stats.skipped.fetch_add(1, Ordering::Relaxed);
                log::warn!(target: "scan", "scan pass panicked; skipping");
            }
        }
    }
    log::debug!(target: "scan", "scan loop exited");
}
