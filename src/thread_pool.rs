use std::thread::{self, JoinHandle};

use crate::error::{AnalyzerError, Result};

struct Worker<T> {
    id: usize,
    thread: Option<JoinHandle<T>>,
}

impl<T> Drop for Worker<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

/// A named group of threads that is always joined before it goes away.
///
/// [`WorkerGroup::join`] hands back every worker's result in spawn order.
/// A group dropped without `join` (e.g. on an early `?` return) still waits
/// for all of its threads.
pub struct WorkerGroup<T> {
    name: &'static str,
    workers: Vec<Worker<T>>,
}

impl<T: Send + 'static> WorkerGroup<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            workers: Vec::new(),
        }
    }

    /// Spawns `size` workers, each running `f(id)`.
    pub fn spawn_n<F>(name: &'static str, size: usize, f: F) -> Result<Self>
    where
        F: Fn(usize) -> T + Clone + Send + 'static,
    {
        let mut group = Self::new(name);
        for _ in 0..size {
            let f = f.clone();
            group.spawn(move |id| f(id))?;
        }
        Ok(group)
    }

    pub fn spawn<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(usize) -> T + Send + 'static,
    {
        let id = self.workers.len();
        let thread = thread::Builder::new()
            .name(format!("{}-{id}", self.name))
            .spawn(move || f(id))
            .map_err(|source| AnalyzerError::Spawn {
                group: self.name,
                source,
            })?;
        self.workers.push(Worker {
            id,
            thread: Some(thread),
        });
        Ok(())
    }

    /// Waits for every worker. All threads are joined even if one of them
    /// panicked; the first panic is reported.
    pub fn join(mut self) -> Result<Vec<T>> {
        let mut results = Vec::with_capacity(self.workers.len());
        let mut panicked = None;
        for worker in &mut self.workers {
            let Some(handle) = worker.thread.take() else {
                continue;
            };
            match handle.join() {
                Ok(value) => results.push(value),
                Err(_) => {
                    tracing::error!(group = self.name, id = worker.id, "worker panicked");
                    panicked.get_or_insert(worker.id);
                }
            }
        }
        match panicked {
            Some(id) => Err(AnalyzerError::WorkerPanicked {
                group: self.name,
                id,
            }),
            None => Ok(results),
        }
    }
}
