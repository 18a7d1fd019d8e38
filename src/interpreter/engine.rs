// Trace driver: runs a program to completion and steps through its history

use crate::interpreter::constants::{DEFAULT_MAX_STEPS, DEFAULT_SNAPSHOT_LIMIT};
use crate::interpreter::errors::SimError;
use crate::interpreter::state::ProgramState;
use crate::snapshot::SnapshotManager;
use tracing::{debug, warn};

/// Limits applied while generating a trace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatorConfig {
    /// Upper bound on the estimated size of the recorded history, in bytes
    pub snapshot_memory_limit: usize,
    /// Number of transitions `run` performs before giving up
    pub max_steps: usize,
}

impl SimulatorConfig {
    pub fn with_snapshot_memory_limit(mut self, limit: usize) -> Self {
        self.snapshot_memory_limit = limit;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        SimulatorConfig {
            snapshot_memory_limit: DEFAULT_SNAPSHOT_LIMIT,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// Drives a [`ProgramState`] forward and keeps every state it passes through
pub struct Simulator {
    /// Recorded states; index 0 is the initial state
    snapshot_manager: SnapshotManager,

    /// Index of the state currently shown
    history_position: usize,

    config: SimulatorConfig,
}

impl Simulator {
    /// Create a simulator whose history starts with `initial`
    pub fn new(initial: ProgramState, config: SimulatorConfig) -> Result<Self, SimError> {
        let mut snapshot_manager = SnapshotManager::new(config.snapshot_memory_limit);
        snapshot_manager.push(initial)?;
        Ok(Simulator {
            snapshot_manager,
            history_position: 0,
            config,
        })
    }

    /// Advance from the last recorded state until the program finishes
    pub fn run(&mut self) -> Result<(), SimError> {
        while !self.latest().is_finished() {
            self.execute_next()?;
        }
        debug!(
            snapshots = self.total_snapshots(),
            memory = self.snapshot_manager.memory_usage(),
            "simulation finished"
        );
        Ok(())
    }

    /// Compute and record the successor of the last recorded state
    fn execute_next(&mut self) -> Result<(), SimError> {
        let transitions = self.snapshot_manager.len() - 1;
        if transitions >= self.config.max_steps {
            warn!(limit = self.config.max_steps, "step limit reached");
            return Err(SimError::StepLimitExceeded {
                limit: self.config.max_steps,
            });
        }

        let next = self.latest().advance()?;
        self.snapshot_manager.push(next)
    }

    fn latest(&self) -> &ProgramState {
        // History always holds at least the initial state
        self.snapshot_manager
            .last()
            .unwrap_or_else(|| unreachable!("snapshot history is never empty"))
    }

    /// Step backward in history
    pub fn step_backward(&mut self) -> Result<(), SimError> {
        if self.history_position == 0 {
            return Err(SimError::protocol("already at the beginning of execution"));
        }
        self.history_position -= 1;
        Ok(())
    }

    /// Step forward in history, executing the next transition when at its end
    pub fn step_forward(&mut self) -> Result<(), SimError> {
        if self.history_position + 1 >= self.snapshot_manager.len() {
            if self.latest().is_finished() {
                return Err(SimError::ProgramFinished);
            }
            self.execute_next()?;
        }
        self.history_position += 1;
        Ok(())
    }

    /// Rewind to the initial state
    pub fn rewind_to_start(&mut self) {
        self.history_position = 0;
    }

    /// The state at the current history position
    pub fn current(&self) -> &ProgramState {
        self.snapshot_manager
            .get(self.history_position)
            .unwrap_or_else(|| self.latest())
    }

    /// All recorded states, initial state first
    pub fn history(&self) -> impl Iterator<Item = &ProgramState> {
        self.snapshot_manager.iter()
    }

    pub fn history_position(&self) -> usize {
        self.history_position
    }

    pub fn total_snapshots(&self) -> usize {
        self.snapshot_manager.len()
    }

    /// Whether the last recorded state is finished
    pub fn is_finished(&self) -> bool {
        self.latest().is_finished()
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }
}
