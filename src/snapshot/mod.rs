// Snapshot history for stepping through a trace

use crate::interpreter::errors::SimError;
use crate::interpreter::state::ProgramState;

/// Estimate the memory a state adds to the history, in bytes
///
/// This is a rough estimate; persistent collections share most of their
/// structure between consecutive states, so the real cost is usually lower.
pub fn estimated_size(state: &ProgramState) -> usize {
    let memory = state.memory();

    // Stack: a fixed overhead per frame plus its bindings
    let stack_size: usize = memory
        .stack
        .frames()
        .map(|frame| 100 + 40 * (frame.locals.len() + frame.pending_results.len()))
        .sum();

    // Heap: a fixed overhead per object plus its fields
    let heap_size: usize = memory
        .heap
        .objects()
        .map(|(_, object)| 50 + 40 * object.fields.len())
        .sum();

    stack_size + heap_size + 16 * state.position().depth()
}

/// Manages the recorded states of a trace
#[derive(Debug)]
pub struct SnapshotManager {
    snapshots: Vec<ProgramState>,
    max_memory: usize,
    current_memory: usize,
}

impl SnapshotManager {
    pub fn new(max_memory: usize) -> Self {
        SnapshotManager {
            snapshots: Vec::new(),
            max_memory,
            current_memory: 0,
        }
    }

    /// Add a state to history
    pub fn push(&mut self, snapshot: ProgramState) -> Result<(), SimError> {
        let snapshot_size = estimated_size(&snapshot);

        if self.current_memory + snapshot_size > self.max_memory {
            return Err(SimError::SnapshotLimitExceeded {
                current: self.current_memory + snapshot_size,
                limit: self.max_memory,
            });
        }

        self.current_memory += snapshot_size;
        self.snapshots.push(snapshot);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&ProgramState> {
        self.snapshots.get(index)
    }

    pub fn last(&self) -> Option<&ProgramState> {
        self.snapshots.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProgramState> {
        self.snapshots.iter()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn memory_usage(&self) -> usize {
        self.current_memory
    }

    pub fn memory_limit(&self) -> usize {
        self.max_memory
    }
}
