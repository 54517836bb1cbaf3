//! Tick scheduler
//!
//! All recurring work shares one queue ordered by due tick. A single driver
//! advances the clock; each tick pops whatever is due, reschedules it, and
//! runs the actions outside the lock so an action may cancel tasks
//! (including itself).

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Action = Arc<dyn Fn() + Send + Sync>;

/// Cancellation handle for a recurring task
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl TaskHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

struct Task {
    interval: u64,
    action: Action,
    cancelled: Arc<AtomicBool>,
}

#[derive(Default)]
struct Queue {
    now: u64,
    next_id: u64,
    due: BinaryHeap<Reverse<(u64, u64)>>,
    tasks: HashMap<u64, Task>,
}

/// Multiplexes any number of recurring tasks onto one clock
#[derive(Default)]
pub struct TickScheduler {
    queue: Mutex<Queue>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` every `interval` ticks, starting `interval` ticks from now
    ///
    /// An interval of zero is treated as one.
    pub fn schedule_recurring<F>(&self, interval: u64, action: F) -> TaskHandle
    where
        F: Fn() + Send + Sync + 'static,
    {
        let interval = interval.max(1);
        let cancelled = Arc::new(AtomicBool::new(false));

        let mut queue = self.lock();
        let id = queue.next_id;
        queue.next_id += 1;
        let due = queue.now + interval;
        queue.due.push(Reverse((due, id)));
        queue.tasks.insert(
            id,
            Task {
                interval,
                action: Arc::new(action),
                cancelled: Arc::clone(&cancelled),
            },
        );

        tracing::trace!(task = id, interval = interval, "Scheduled recurring task");
        TaskHandle { id, cancelled }
    }

    /// Stop a task; returns false if it was already stopped
    pub fn cancel(&self, handle: &TaskHandle) -> bool {
        let removed = self.lock().tasks.remove(&handle.id);
        match removed {
            Some(task) => {
                task.cancelled.store(true, Ordering::Release);
                tracing::trace!(task = handle.id, "Cancelled recurring task");
                true
            }
            None => false,
        }
    }

    /// Advance the clock by one tick and run everything due
    ///
    /// Returns the number of actions run.
    pub fn tick(&self) -> usize {
        let actions: Vec<Action> = {
            let mut queue = self.lock();
            queue.now += 1;
            let now = queue.now;

            let mut ready = Vec::new();
            while let Some(&Reverse((due, id))) = queue.due.peek() {
                if due > now {
                    break;
                }
                queue.due.pop();

                // cancelled tasks leave stale heap entries behind
                let Some(task) = queue.tasks.get(&id) else {
                    continue;
                };
                let next = due + task.interval;
                ready.push(Arc::clone(&task.action));
                queue.due.push(Reverse((next, id)));
            }
            ready
        };

        for action in &actions {
            action();
        }
        actions.len()
    }

    /// Ticks elapsed since creation
    pub fn current_tick(&self) -> u64 {
        self.lock().now
    }

    /// Number of live tasks
    pub fn len(&self) -> usize {
        self.lock().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every task
    pub fn clear(&self) {
        let mut queue = self.lock();
        for task in queue.tasks.values() {
            task.cancelled.store(true, Ordering::Release);
        }
        queue.tasks.clear();
        queue.due.clear();
    }

    /// Spawn a task that calls [`tick`](Self::tick) every `period`
    pub fn spawn_driver(self: &Arc<Self>, period: Duration) -> tokio::task::JoinHandle<()> {
        let scheduler = Arc::clone(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // the first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                scheduler.tick();
            }
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for TickScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let queue = self.lock();
        f.debug_struct("TickScheduler")
            .field("now", &queue.now)
            .field("tasks", &queue.tasks.len())
            .finish()
    }
}
