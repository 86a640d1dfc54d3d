use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};

/// A bounded FIFO shared between the acceptor and the workers. `push` blocks while the queue is
/// full and `pop` blocks while it is empty.
pub struct ConnectionQueue<T> {
    items: Mutex<VecDeque<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

impl<T> ConnectionQueue<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);

        return Self {
            items: Mutex::new(VecDeque::with_capacity(capacity)),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        };
    }

    pub fn push(&self, item: T) {
        let mut items = self.lock();

        while items.len() >= self.capacity {
            items = match self.not_full.wait(items) {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
        }

        items.push_back(item);
        self.not_empty.notify_one();
    }

    pub fn pop(&self) -> T {
        let mut items = self.lock();

        loop {
            if let Some(item) = items.pop_front() {
                self.not_full.notify_one();
                return item;
            }

            items = match self.not_empty.wait(items) {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
        }
    }

    pub fn len(&self) -> usize {
        return self.lock().len();
    }

    pub fn capacity(&self) -> usize {
        return self.capacity;
    }

    // A worker that panicked mid-request leaves the queue itself intact.
    fn lock(&self) -> MutexGuard<VecDeque<T>> {
        return match self.items.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
    }
}
