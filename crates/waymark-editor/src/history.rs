//! Bounded undo/redo history.
//!
//! The undo stack holds at most `DEFAULT_DEPTH` commands; recording past
//! the bound silently evicts the oldest entry. Undo and redo on empty
//! stacks are defined no-ops, never errors.

use std::collections::VecDeque;

use crate::commands::EditCommand;

/// Default maximum undo depth.
pub const DEFAULT_DEPTH: usize = 50;

/// FIFO-bounded undo stack plus its redo companion.
#[derive(Debug)]
pub struct History {
    undo_stack: VecDeque<EditCommand>,
    redo_stack: Vec<EditCommand>,
    depth: usize,
    disabled: bool,
}

impl History {
    pub fn new(depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            depth: depth.max(1),
            disabled: false,
        }
    }

    /// Records a freshly applied command.
    ///
    /// Clears the redo stack; a new edit forks the timeline. When the
    /// history is disabled the command is dropped.
    pub fn record(&mut self, command: EditCommand) {
        if self.disabled {
            return;
        }
        self.redo_stack.clear();
        if self.undo_stack.len() >= self.depth {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(command);
    }

    /// Moves the most recent command to the redo stack and hands it to the
    /// caller to revert. `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<&mut EditCommand> {
        let command = self.undo_stack.pop_back()?;
        self.redo_stack.push(command);
        self.redo_stack.last_mut()
    }

    /// Moves the most recently undone command back to the undo stack and
    /// hands it to the caller to re-apply. `None` when there is nothing to
    /// redo.
    pub fn redo(&mut self) -> Option<&mut EditCommand> {
        let command = self.redo_stack.pop()?;
        if self.undo_stack.len() >= self.depth {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(command);
        self.undo_stack.back_mut()
    }

    /// Puts the command a just-made [`History::undo`] moved to the redo
    /// stack back where it was. Called when the revert failed; a failed
    /// undo must leave both stacks as they were.
    pub fn cancel_undo(&mut self) {
        if let Some(command) = self.redo_stack.pop() {
            self.undo_stack.push_back(command);
        }
    }

    /// Puts the command a just-made [`History::redo`] moved to the undo
    /// stack back where it was. Called when the re-apply failed.
    pub fn cancel_redo(&mut self) {
        if let Some(command) = self.undo_stack.pop_back() {
            self.redo_stack.push(command);
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Display name of the command `undo` would revert.
    pub fn undo_description(&self) -> Option<&'static str> {
        self.undo_stack.back().map(|c| c.describe())
    }

    /// Display name of the command `redo` would re-apply.
    pub fn redo_description(&self) -> Option<&'static str> {
        self.redo_stack.last().map(|c| c.describe())
    }

    /// Drops both stacks.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Stops recording. Existing entries are kept.
    pub fn disable(&mut self) {
        self.disabled = true;
    }

    /// Resumes recording.
    pub fn enable(&mut self) {
        self.disabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }

    /// Changes the bound, evicting oldest entries if already past it.
    pub fn trim_to_depth(&mut self, depth: usize) {
        self.depth = depth.max(1);
        while self.undo_stack.len() > self.depth {
            self.undo_stack.pop_front();
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH)
    }
}
