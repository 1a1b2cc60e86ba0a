use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use resumeai_core::{Msg, WorkflowKind, PROGRESS_TICK_INTERVAL};

use super::app::AppMsg;

/// Drives the simulated progress display: one thread per running
/// workflow, ticking on a fixed interval until stopped. A tick already
/// queued when the stop lands is dropped by the state machine.
pub(crate) struct ProgressTicker {
    tx: mpsc::Sender<AppMsg>,
    interval: Duration,
    running: HashMap<WorkflowKind, Arc<AtomicBool>>,
}

impl ProgressTicker {
    pub(crate) fn new(tx: mpsc::Sender<AppMsg>) -> Self {
        Self::with_interval(tx, PROGRESS_TICK_INTERVAL)
    }

    fn with_interval(tx: mpsc::Sender<AppMsg>, interval: Duration) -> Self {
        Self {
            tx,
            interval,
            running: HashMap::new(),
        }
    }

    /// Starts ticking for the workflow, replacing any earlier ticker.
    pub(crate) fn start(&mut self, kind: WorkflowKind) {
        self.stop(kind);
        let flag = Arc::new(AtomicBool::new(true));
        let tx = self.tx.clone();
        let interval = self.interval;
        let keep_going = flag.clone();
        thread::spawn(move || loop {
            thread::sleep(interval);
            if !keep_going.load(Ordering::Relaxed) {
                break;
            }
            if tx.send(AppMsg::Core(Msg::ProgressTicked { kind })).is_err() {
                break;
            }
        });
        self.running.insert(kind, flag);
    }

    pub(crate) fn stop(&mut self, kind: WorkflowKind) {
        if let Some(flag) = self.running.remove(&kind) {
            flag.store(false, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_tick(msg: &AppMsg, expected: WorkflowKind) -> bool {
        matches!(msg, AppMsg::Core(Msg::ProgressTicked { kind }) if *kind == expected)
    }

    #[test]
    fn ticks_flow_until_stopped() {
        let (tx, rx) = mpsc::channel();
        let mut ticker = ProgressTicker::with_interval(tx, Duration::from_millis(20));

        ticker.start(WorkflowKind::Analysis);
        let first = rx
            .recv_timeout(Duration::from_secs(2))
            .expect("first tick");
        assert!(is_tick(&first, WorkflowKind::Analysis));

        ticker.stop(WorkflowKind::Analysis);
        // Drain anything sent before the stop was observed.
        thread::sleep(Duration::from_millis(80));
        while rx.try_recv().is_ok() {}
        thread::sleep(Duration::from_millis(80));
        assert!(rx.try_recv().is_err(), "ticker kept running after stop");
    }

    #[test]
    fn restart_replaces_the_previous_ticker() {
        let (tx, rx) = mpsc::channel();
        let mut ticker = ProgressTicker::with_interval(tx, Duration::from_millis(20));

        ticker.start(WorkflowKind::Generation);
        ticker.start(WorkflowKind::Generation);
        let first = rx
            .recv_timeout(Duration::from_secs(2))
            .expect("tick after restart");
        assert!(is_tick(&first, WorkflowKind::Generation));
        ticker.stop(WorkflowKind::Generation);
    }
}
