use std::collections::VecDeque;

/// Work postponed until the host has finished reacting to the current event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredTask {
    /// Recompute the all-rows-hidden warning.
    RefreshWarning,
    /// Select the only visible row, if exactly one remains.
    AutoSelect,
}

/// FIFO of deferred tasks; a task already queued is not queued twice.
#[derive(Debug, Default)]
pub(crate) struct DeferredQueue {
    tasks: VecDeque<DeferredTask>,
}

impl DeferredQueue {
    pub fn push(&mut self, task: DeferredTask) {
        if !self.tasks.contains(&task) {
            self.tasks.push_back(task);
        }
    }

    pub fn pop(&mut self) -> Option<DeferredTask> {
        self.tasks.pop_front()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_are_collapsed() {
        let mut queue = DeferredQueue::default();
        queue.push(DeferredTask::RefreshWarning);
        queue.push(DeferredTask::AutoSelect);
        queue.push(DeferredTask::RefreshWarning);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop(), Some(DeferredTask::RefreshWarning));
        assert_eq!(queue.pop(), Some(DeferredTask::AutoSelect));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn popped_task_can_be_queued_again() {
        let mut queue = DeferredQueue::default();
        queue.push(DeferredTask::AutoSelect);
        queue.pop();
        queue.push(DeferredTask::AutoSelect);
        assert_eq!(queue.len(), 1);
    }
}
