//! # Task registry: append-only until start, frozen afterwards.
//!
//! ```text
//! register() ─► [t0, t1, t2, ...]  ──freeze()──►  read-only snapshot for start()
//!                                                 register() → Err(Frozen)
//! ```
//!
//! ## Rules
//! - Insertion order is the task identity ([`TaskId`]); no deduplication.
//! - Frozen exactly once; nothing is removed or modified.

use crate::error::RegistrationError;
use crate::tasks::{PeriodicTask, TaskId};

/// Ordered collection of periodic task definitions.
#[derive(Default, Debug)]
pub struct TaskRegistry {
    tasks: Vec<PeriodicTask>,
    frozen: bool,
}

impl TaskRegistry {
    /// Creates an empty, open registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an open registry pre-filled in the given order.
    pub(crate) fn from_tasks(tasks: Vec<PeriodicTask>) -> Self {
        Self {
            tasks,
            frozen: false,
        }
    }

    /// Appends a task and returns its position.
    pub fn register(&mut self, task: PeriodicTask) -> Result<TaskId, RegistrationError> {
        if self.frozen {
            return Err(RegistrationError::Frozen);
        }
        let id = TaskId(self.tasks.len());
        self.tasks.push(task);
        Ok(id)
    }

    /// Closes the registry and returns the tasks in registration order.
    ///
    /// Subsequent calls return the same snapshot.
    pub fn freeze(&mut self) -> Vec<(TaskId, PeriodicTask)> {
        self.frozen = true;
        self.tasks
            .iter()
            .enumerate()
            .map(|(i, t)| (TaskId(i), t.clone()))
            .collect()
    }

    /// Returns `true` once the registry is closed.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::tasks::ActionFn;
    use std::time::Duration;

    fn task(name: &'static str) -> PeriodicTask {
        PeriodicTask::builder(Duration::from_secs(1))
            .named(name)
            .build(ActionFn::arc(|| async { Ok::<_, TaskError>(()) }))
            .unwrap()
    }

    #[test]
    fn test_ids_follow_insertion_order() {
        let mut reg = TaskRegistry::new();
        assert_eq!(reg.register(task("a")).unwrap(), TaskId(0));
        assert_eq!(reg.register(task("a")).unwrap(), TaskId(1));
        assert_eq!(reg.register(task("b")).unwrap(), TaskId(2));
        assert_eq!(reg.len(), 3);

        let names: Vec<_> = reg
            .freeze()
            .into_iter()
            .map(|(id, t)| (id.index(), t.name().to_string()))
            .collect();
        assert_eq!(
            names,
            vec![(0, "a".into()), (1, "a".into()), (2, "b".into())]
        );
    }

    #[test]
    fn test_register_after_freeze_is_rejected() {
        let mut reg = TaskRegistry::new();
        reg.register(task("a")).unwrap();
        reg.freeze();

        assert!(reg.is_frozen());
        assert_eq!(reg.register(task("late")), Err(RegistrationError::Frozen));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_empty_freeze() {
        let mut reg = TaskRegistry::new();
        assert!(reg.freeze().is_empty());
        assert!(reg.is_empty());
    }
}
