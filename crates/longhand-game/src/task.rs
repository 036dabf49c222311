use std::{
    cell::RefCell,
    future::Future,
    mem,
    pin::Pin,
    task::{Context, Waker},
};

/// Single-threaded, poll-driven queue of local futures.
///
/// The owner polls the queue once per event-loop turn. A future spawned while a turn
/// is running is first polled on the following turn, so whatever state transition
/// spawned it is observable before it starts.
pub(crate) struct TaskQueue {
    tasks: RefCell<Vec<Task>>,
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("tasks", &self.tasks.borrow().len())
            .finish()
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskQueue {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            tasks: RefCell::new(Vec::new()),
        }
    }

    /// Returns true if no task is waiting to be polled.
    #[must_use]
    pub(crate) fn is_idle(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    pub(crate) fn spawn(&self, future: impl Future<Output = ()> + 'static) {
        self.tasks.borrow_mut().push(Task {
            future: Box::pin(future),
        });
    }

    /// Polls every queued task once and drops the finished ones.
    pub(crate) fn poll(&self) {
        // Tasks may spawn more tasks; those land in the emptied queue for the next turn.
        let mut running = mem::take(&mut *self.tasks.borrow_mut());
        let mut cx = Context::from_waker(Waker::noop());
        running.retain_mut(|task| task.future.as_mut().poll(&mut cx).is_pending());

        let mut tasks = self.tasks.borrow_mut();
        let spawned = mem::replace(&mut *tasks, running);
        tasks.extend(spawned);
    }
}

struct Task {
    future: Pin<Box<dyn Future<Output = ()>>>,
}
