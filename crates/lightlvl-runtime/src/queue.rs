use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};
use lightlvl_geom::BlockPos;
use lightlvl_rules::Rgba;
use lightlvl_scan::HighlightSet;

/// Owner tag the overlay is registered under on the host renderer.
pub const HIGHLIGHT_OWNER: u32 = 5229;

/// Host highlight primitive. Main thread only; each call replaces the owner's previous set.
pub trait HighlightRenderer {
    fn set_highlights(&mut self, owner: u32, positions: &[BlockPos], colors: &[Rgba]);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighlightTask {
    Apply(HighlightSet),
    Clear,
}

impl HighlightTask {
    pub fn run(&self, renderer: &mut dyn HighlightRenderer) {
        match self {
            HighlightTask::Apply(set) => {
                renderer.set_highlights(HIGHLIGHT_OWNER, set.positions(), set.colors())
            }
            HighlightTask::Clear => renderer.set_highlights(HIGHLIGHT_OWNER, &[], &[]),
        }
    }
}

/// Producer half, held by the scan thread and the scanner owner. Never blocks.
#[derive(Clone, Debug)]
pub struct TaskSender {
    tx: Sender<HighlightTask>,
}

impl TaskSender {
    pub fn enqueue(&self, task: HighlightTask) {
        // A dropped consumer means the host is shutting down.
        let _ = self.tx.send(task);
    }

    pub fn apply(&self, set: HighlightSet) {
        self.enqueue(HighlightTask::Apply(set));
    }

    pub fn clear(&self) {
        self.enqueue(HighlightTask::Clear);
    }
}

/// Single-consumer half, drained on the host's main thread.
#[derive(Debug)]
pub struct MainThreadQueue {
    rx: Receiver<HighlightTask>,
}

pub fn task_queue() -> (TaskSender, MainThreadQueue) {
    let (tx, rx) = unbounded();
    (TaskSender { tx }, MainThreadQueue { rx })
}

impl MainThreadQueue {
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    pub fn try_next(&self) -> Option<HighlightTask> {
        self.rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<HighlightTask> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Runs only the newest pending task; older ones would be overwritten anyway.
    /// Returns how many tasks were taken off the queue.
    pub fn drain(&self, renderer: &mut dyn HighlightRenderer) -> usize {
        let mut taken = 0usize;
        let mut last = None;
        for task in self.rx.try_iter() {
            taken += 1;
            last = Some(task);
        }
        if let Some(task) = last {
            task.run(renderer);
        }
        taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(u32, Vec<BlockPos>, Vec<Rgba>)>,
    }

    impl HighlightRenderer for Recorder {
        fn set_highlights(&mut self, owner: u32, positions: &[BlockPos], colors: &[Rgba]) {
            self.calls.push((owner, positions.to_vec(), colors.to_vec()));
        }
    }

    fn one(pos: BlockPos) -> HighlightSet {
        [(pos, Rgba::new(255, 0, 0, 32))].into_iter().collect()
    }

    #[test]
    fn drain_applies_only_the_latest_task() {
        let (tx, q) = task_queue();
        tx.apply(one(BlockPos::new(1, 0, 0)));
        tx.apply(one(BlockPos::new(2, 0, 0)));
        let mut r = Recorder::default();
        assert_eq!(q.drain(&mut r), 2);
        assert_eq!(r.calls.len(), 1);
        assert_eq!(r.calls[0].0, HIGHLIGHT_OWNER);
        assert_eq!(r.calls[0].1, vec![BlockPos::new(2, 0, 0)]);
        assert_eq!(q.drain(&mut r), 0);
        assert_eq!(r.calls.len(), 1);
    }

    #[test]
    fn clear_after_apply_wins() {
        let (tx, q) = task_queue();
        tx.apply(one(BlockPos::ORIGIN));
        tx.clear();
        let mut r = Recorder::default();
        q.drain(&mut r);
        assert_eq!(r.calls, vec![(HIGHLIGHT_OWNER, vec![], vec![])]);
    }

    #[test]
    fn enqueue_after_consumer_drop_is_silent() {
        let (tx, q) = task_queue();
        drop(q);
        tx.clear();
    }
}
