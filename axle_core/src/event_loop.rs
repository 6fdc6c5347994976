//! Single-threaded event loop with a thread-safe work queue.
//!
//! All control state lives on the loop thread. Other threads (signal
//! handlers, radio callbacks) only get a [`WorkHandle`] and post
//! closures; the loop runs them between ticks, so posted work observes
//! and mutates state without locks.

use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::scheduler::Scheduler;

type Work = Box<dyn FnOnce(&mut Scheduler) + Send>;

enum Message {
    Work(Work),
    Shutdown,
}

/// Cloneable, `Send` handle for posting work to the loop.
#[derive(Clone)]
pub struct WorkHandle {
    tx: Sender<Message>,
}

impl WorkHandle {
    /// Queue a closure to run on the loop thread before its next tick.
    /// Posting after the loop has shut down is a silent no-op.
    pub fn post<F>(&self, work: F)
    where
        F: FnOnce(&mut Scheduler) + Send + 'static,
    {
        let _ = self.tx.send(Message::Work(Box::new(work)));
    }

    /// Ask the loop to exit after draining already-posted work.
    pub fn shutdown(&self) {
        let _ = self.tx.send(Message::Shutdown);
    }
}

pub struct EventLoop {
    rx: Receiver<Message>,
    scheduler: Scheduler,
}

impl EventLoop {
    pub fn new() -> (Self, WorkHandle) {
        let (tx, rx) = unbounded();
        (
            Self {
                rx,
                scheduler: Scheduler::new(),
            },
            WorkHandle { tx },
        )
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    /// Drain posted work, then tick the scheduler once. Returns false
    /// once a shutdown request has been drained.
    pub fn step(&mut self, now: u32) -> bool {
        let mut keep_running = true;
        while let Ok(message) = self.rx.try_recv() {
            match message {
                Message::Work(work) => work(&mut self.scheduler),
                Message::Shutdown => keep_running = false,
            }
        }
        self.scheduler.tick(now);
        keep_running
    }

    /// Run at a fixed period until shutdown is requested. `on_tick`
    /// runs after each scheduler pass and may itself request shutdown
    /// by returning false.
    pub fn run(
        &mut self,
        clock: &dyn axle_traits::Clock,
        period: Duration,
        mut on_tick: impl FnMut(&mut Scheduler, u32) -> bool,
    ) {
        let start = clock.now();
        loop {
            let now = clock.ms_since(start) as u32;
            if !self.step(now) || !on_tick(&mut self.scheduler, now) {
                self.scheduler.stop_all();
                return;
            }
            clock.sleep(period);
        }
    }
}
