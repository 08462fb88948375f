// Host events and the debounce that collapses bursts of resize/orientation
// changes into a single reinitialization.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HostEvent {
    /// Container size changed (canvas-space pixels).
    Resize { width: f32, height: f32 },
    /// Portrait <-> landscape flip.
    OrientationChange,
    /// Pointer / touch moved, canvas-local coordinates.
    PointerMove { x: f32, y: f32 },
    /// Pointer left the canvas or the touch ended.
    PointerLeave,
}

/// FIFO of events waiting for the next frame.
#[derive(Default)]
pub struct EventQueue {
    events: VecDeque<HostEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: HostEvent) {
        // Consecutive pointer moves only matter for their last position.
        let coalesce = matches!(event, HostEvent::PointerMove { .. })
            && matches!(self.events.back(), Some(HostEvent::PointerMove { .. }));
        if coalesce {
            self.events.pop_back();
        }
        self.events.push_back(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = HostEvent> + '_ {
        self.events.drain(..)
    }
}

/// Trailing-edge debounce with a single deadline.
#[derive(Debug, Default)]
pub struct Debouncer {
    deadline: Option<Instant>,
}

impl Debouncer {
    /// (Re)arm: the action fires `delay` after the latest trigger.
    pub fn trigger(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// True exactly once, on the first call at or after the deadline.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(d) if now >= d => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn burst_of_triggers_fires_once_after_quiet_period() {
        let t0 = Instant::now();
        let mut d = Debouncer::default();
        for i in 0..10 {
            d.trigger(t0 + MS * (i * 50), MS * 250);
        }
        // Last trigger at 450ms -> fires at 700ms.
        assert!(!d.fire(t0 + MS * 699));
        assert!(d.fire(t0 + MS * 700));
        assert!(!d.fire(t0 + MS * 2000));
        assert!(!d.is_pending());
    }

    #[test]
    fn cancel_drops_pending_action() {
        let t0 = Instant::now();
        let mut d = Debouncer::default();
        d.trigger(t0, MS * 10);
        d.cancel();
        assert!(!d.fire(t0 + MS * 100));
    }

    #[test]
    fn queue_coalesces_consecutive_pointer_moves() {
        let mut q = EventQueue::new();
        q.push(HostEvent::PointerMove { x: 1.0, y: 1.0 });
        q.push(HostEvent::PointerMove { x: 2.0, y: 2.0 });
        q.push(HostEvent::PointerLeave);
        q.push(HostEvent::PointerMove { x: 3.0, y: 3.0 });
        let events: Vec<_> = q.drain().collect();
        assert_eq!(
            events,
            vec![
                HostEvent::PointerMove { x: 2.0, y: 2.0 },
                HostEvent::PointerLeave,
                HostEvent::PointerMove { x: 3.0, y: 3.0 },
            ]
        );
        assert!(q.drain().next().is_none());
    }
}
