pub use self::clock::{Clock, TaskHandle};

mod clock {
    use std::time::Duration;

    use instant::Instant;
    use tracing::trace;

    // floor so a zero interval can't spin the host loop
    const MIN_INTERVAL: Duration = Duration::from_millis(1);

    /// Identity of one arming of the clock.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct TaskHandle(u64);

    #[derive(Debug)]
    struct Task {
        handle: TaskHandle,
        interval: Duration,
        deadline: Instant,
    }

    /// A single cancellable repeating task, driven by the host calling
    /// [`Clock::poll`] with the current time.
    ///
    /// Arming replaces whatever task was armed before. Each poll fires at most
    /// once: a host that wakes up late gets one tick, and the missed ones are
    /// dropped rather than queued.
    #[derive(Debug, Default)]
    pub struct Clock {
        next_handle: u64,
        task: Option<Task>,
    }

    impl Clock {
        pub fn new() -> Clock {
            Clock::default()
        }

        /// Arms a task that first fires at `now + interval`, cancelling the
        /// previous one.
        pub fn arm(&mut self, interval: Duration, now: Instant) -> TaskHandle {
            if let Some(previous) = self.cancel_current() {
                trace!("re-arming, cancelled {:?}", previous);
            }
            self.next_handle = self.next_handle.wrapping_add(1);
            let handle = TaskHandle(self.next_handle);
            let interval = interval.max(MIN_INTERVAL);
            self.task = Some(Task {
                handle,
                interval,
                deadline: now + interval,
            });
            trace!("armed {:?} every {:?}", handle, interval);
            handle
        }

        /// Cancels `handle` if it is the armed task. Stale or already
        /// cancelled handles are ignored.
        pub fn cancel(&mut self, handle: TaskHandle) -> bool {
            match &self.task {
                Some(task) if task.handle == handle => {
                    self.task = None;
                    trace!("cancelled {:?}", handle);
                    true
                }
                _ => false,
            }
        }

        pub fn cancel_current(&mut self) -> Option<TaskHandle> {
            self.task.take().map(|task| task.handle)
        }

        pub fn current(&self) -> Option<TaskHandle> {
            self.task.as_ref().map(|task| task.handle)
        }

        pub fn is_armed(&self) -> bool {
            self.task.is_some()
        }

        pub fn interval(&self) -> Option<Duration> {
            self.task.as_ref().map(|task| task.interval)
        }

        pub fn next_deadline(&self) -> Option<Instant> {
            self.task.as_ref().map(|task| task.deadline)
        }

        /// Returns the armed handle if a tick is due at `now`.
        pub fn poll(&mut self, now: Instant) -> Option<TaskHandle> {
            let task = self.task.as_mut()?;
            if now < task.deadline {
                return None;
            }

            let on_schedule = task.deadline + task.interval;
            task.deadline = if on_schedule > now {
                on_schedule
            } else {
                let late = now - task.deadline;
                trace!(
                    "{:?} is {:?} late, dropping {} ticks",
                    task.handle,
                    late,
                    late.as_nanos() / task.interval.as_nanos()
                );
                now + task.interval
            };
            Some(task.handle)
        }
    }

}
