//! Registry of periodically polled items.
//!
//! Light animations, status blinkers and similar background chores all
//! share the event loop. Each one is registered here with its own due
//! time; `tick` runs every item that is due and reschedules it at the
//! interval the item reports. Slots are a plain arena with stable
//! handles, so items can be stopped from any context without touching
//! their neighbors.

/// An item the scheduler polls; returns the interval in milliseconds
/// until it wants to run again.
pub trait Tickable {
    fn tick(&mut self, now: u32) -> u32;
}

/// Stable handle to a registered item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handle(usize);

struct Entry {
    item: Box<dyn Tickable>,
    next_due: u32,
}

#[derive(Default)]
pub struct Scheduler {
    slots: Vec<Option<Entry>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an item; it first runs at the next `tick` at or after
    /// `now`. Freed slots are reused before the arena grows.
    pub fn start(&mut self, item: Box<dyn Tickable>, now: u32) -> Handle {
        let entry = Entry {
            item,
            next_due: now,
        };
        if let Some(idx) = self.slots.iter().position(Option::is_none) {
            self.slots[idx] = Some(entry);
            Handle(idx)
        } else {
            self.slots.push(Some(entry));
            Handle(self.slots.len() - 1)
        }
    }

    /// Deregister; a stopped handle never ticks again. Stopping an
    /// already-stopped handle is a no-op.
    pub fn stop(&mut self, handle: Handle) {
        if let Some(slot) = self.slots.get_mut(handle.0) {
            *slot = None;
        }
    }

    /// Stop everything, e.g. when a user program is interrupted and
    /// individual stop calls will no longer happen.
    pub fn stop_all(&mut self) {
        self.slots.clear();
    }

    pub fn is_started(&self, handle: Handle) -> bool {
        matches!(self.slots.get(handle.0), Some(Some(_)))
    }

    /// Number of live items.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every item whose due time has arrived. `now` must come from
    /// the same monotonic tick source for all calls; comparisons wrap.
    pub fn tick(&mut self, now: u32) {
        for slot in &mut self.slots {
            if let Some(entry) = slot
                && now.wrapping_sub(entry.next_due) < u32::MAX / 2
            {
                let interval = entry.item.tick(now);
                entry.next_due = now.wrapping_add(interval.max(1));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Counter {
        hits: Rc<Cell<u32>>,
        interval: u32,
    }

    impl Tickable for Counter {
        fn tick(&mut self, _now: u32) -> u32 {
            self.hits.set(self.hits.get() + 1);
            self.interval
        }
    }

    fn counter(interval: u32) -> (Box<Counter>, Rc<Cell<u32>>) {
        let hits = Rc::new(Cell::new(0));
        (
            Box::new(Counter {
                hits: hits.clone(),
                interval,
            }),
            hits,
        )
    }

    #[test]
    fn items_run_at_their_own_interval() {
        let mut sched = Scheduler::new();
        let (fast, fast_hits) = counter(10);
        let (slow, slow_hits) = counter(30);
        sched.start(fast, 0);
        sched.start(slow, 0);

        for now in 0..=60 {
            sched.tick(now);
        }
        assert_eq!(fast_hits.get(), 7); // 0,10,..,60
        assert_eq!(slow_hits.get(), 3); // 0,30,60
    }

    #[test]
    fn stopped_items_never_tick_again() {
        let mut sched = Scheduler::new();
        let (item, hits) = counter(1);
        let handle = sched.start(item, 0);
        sched.tick(0);
        assert!(sched.is_started(handle));
        sched.stop(handle);
        assert!(!sched.is_started(handle));
        for now in 1..100 {
            sched.tick(now);
        }
        assert_eq!(hits.get(), 1);
        // Stopping again is harmless.
        sched.stop(handle);
    }

    #[test]
    fn slots_are_reused_and_handles_stay_valid() {
        let mut sched = Scheduler::new();
        let (a, _) = counter(1);
        let (b, b_hits) = counter(1);
        let (c, _) = counter(1);
        let ha = sched.start(a, 0);
        let hb = sched.start(b, 0);
        sched.stop(ha);
        let hc = sched.start(c, 0);
        // The freed slot was reused; b is untouched.
        assert_eq!(hc, ha);
        assert!(sched.is_started(hb));
        sched.tick(0);
        assert_eq!(b_hits.get(), 1);
    }

    #[test]
    fn stop_all_empties_the_registry() {
        let mut sched = Scheduler::new();
        let (a, a_hits) = counter(1);
        let (b, b_hits) = counter(1);
        sched.start(a, 0);
        sched.start(b, 0);
        sched.stop_all();
        assert!(sched.is_empty());
        sched.tick(0);
        assert_eq!(a_hits.get() + b_hits.get(), 0);
    }
}
