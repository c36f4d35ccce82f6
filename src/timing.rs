//! Timers behind a small trait so behaviors can run against the browser
//! event loop or a virtual clock.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;

pub type Task = Box<dyn FnOnce()>;

pub trait Scheduler: Clone + 'static {
    /// Dropping the handle cancels the task if it has not run yet.
    type Handle: 'static;

    fn schedule(&self, wait_ms: u32, task: Task) -> Self::Handle;

    /// Lets the task run without keeping its handle around.
    fn detach(&self, handle: Self::Handle);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserTimers;

impl Scheduler for BrowserTimers {
    type Handle = Timeout;

    fn schedule(&self, wait_ms: u32, task: Task) -> Timeout {
        Timeout::new(wait_ms, task)
    }

    fn detach(&self, handle: Timeout) {
        handle.forget();
    }
}

/// Trailing-edge debounce: every call restarts the wait and only the last
/// call inside a quiet window runs `action`.
pub struct Debounce<S: Scheduler, T: 'static = ()> {
    inner: Rc<DebounceState<S, T>>,
}

struct DebounceState<S: Scheduler, T> {
    scheduler: S,
    wait_ms: u32,
    action: Rc<dyn Fn(T)>,
    pending: RefCell<Option<S::Handle>>,
}

impl<S: Scheduler, T: 'static> Debounce<S, T> {
    pub fn new(scheduler: S, wait_ms: u32, action: impl Fn(T) + 'static) -> Self {
        Self {
            inner: Rc::new(DebounceState {
                scheduler,
                wait_ms,
                action: Rc::new(action),
                pending: RefCell::new(None),
            }),
        }
    }

    pub fn call(&self, arg: T) {
        // Dropping the previous handle clears its timer.
        self.inner.pending.borrow_mut().take();

        let action = Rc::clone(&self.inner.action);
        let handle = self
            .inner
            .scheduler
            .schedule(self.inner.wait_ms, Box::new(move || action(arg)));
        *self.inner.pending.borrow_mut() = Some(handle);
    }
}

impl<S: Scheduler, T: 'static> Clone for Debounce<S, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
pub(crate) use manual::ManualScheduler;


#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn recorder() -> (Rc<RefCell<Vec<u32>>>, impl Fn(u32) + 'static) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = calls.clone();
        (calls, move |value| sink.borrow_mut().push(value))
    }

    #[test]
    fn burst_collapses_into_last_call() {
        let clock = ManualScheduler::new();
        let (calls, action) = recorder();
        let debounce = Debounce::new(clock.clone(), 100, action);

        for position in [10, 40, 80, 120] {
            debounce.call(position);
            clock.advance(30);
        }
        assert!(calls.borrow().is_empty());

        clock.advance(70);
        assert_eq!(*calls.borrow(), vec![120]);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn quiet_windows_run_separately() {
        let clock = ManualScheduler::new();
        let (calls, action) = recorder();
        let debounce = Debounce::new(clock.clone(), 100, action);

        debounce.call(1);
        clock.advance(100);
        debounce.call(2);
        clock.advance(99);
        assert_eq!(*calls.borrow(), vec![1]);
        clock.advance(1);
        assert_eq!(*calls.borrow(), vec![1, 2]);
    }

    #[test]
    fn detached_tasks_survive_their_handle() {
        let clock = ManualScheduler::new();
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();

        let handle = clock.schedule(200, Box::new(move || flag.set(true)));
        clock.detach(handle);
        clock.advance(199);
        assert!(!ran.get());
        clock.advance(1);
        assert!(ran.get());
        assert_eq!(clock.now(), 200);
    }

    #[test]
    fn dropped_handle_cancels() {
        let clock = ManualScheduler::new();
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();

        drop(clock.schedule(10, Box::new(move || flag.set(true))));
        clock.advance(50);
        assert!(!ran.get());
    }
}
