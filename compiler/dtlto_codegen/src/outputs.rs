//! Task-indexed object outputs handed to the link step.

/// Receives native objects by task number.
pub trait ObjectSink {
    fn add_object(&mut self, task: usize, module: &str, buffer: Vec<u8>);
}

/// One populated task slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutput {
    pub module: String,
    pub buffer: Vec<u8>,
}

/// Per-task object buffers; `None` where a task was never populated.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskOutputs {
    slots: Vec<Option<TaskOutput>>,
}

impl TaskOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preallocate `tasks` empty slots.
    pub fn with_tasks(tasks: usize) -> Self {
        Self {
            slots: vec![None; tasks],
        }
    }

    pub fn get(&self, task: usize) -> Option<&TaskOutput> {
        self.slots.get(task).and_then(Option::as_ref)
    }

    /// Number of slots, populated or not.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Populated slots in task order.
    pub fn populated(&self) -> impl Iterator<Item = (usize, &TaskOutput)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(task, slot)| slot.as_ref().map(|out| (task, out)))
    }

    pub fn into_slots(self) -> Vec<Option<TaskOutput>> {
        self.slots
    }
}

impl ObjectSink for TaskOutputs {
    fn add_object(&mut self, task: usize, module: &str, buffer: Vec<u8>) {
        if task >= self.slots.len() {
            self.slots.resize(task + 1, None);
        }
        self.slots[task] = Some(TaskOutput {
            module: module.to_string(),
            buffer,
        });
    }
}
