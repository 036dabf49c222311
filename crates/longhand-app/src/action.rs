use std::mem;

use longhand_game::{KeyEvent, LevelId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    Key(KeyEvent),
    /// Enters a digit into the focused field and moves on.
    EnterDigit(u32),
    /// Clears the focused field, or steps back if it is already empty.
    Backspace,
    SubmitProblem,
    NextProblem,
    JumpToLevel(LevelId),
    StartEditing,
    FinishEditing(Option<(u32, u32)>),
    ReplaceProblem { operand1: u32, operand2: u32 },
    Restart,
    Quit,
}

#[derive(Debug, Default)]
pub(crate) struct ActionRequestQueue {
    actions: Vec<Action>,
}

impl ActionRequestQueue {
    pub(crate) fn request(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub(crate) fn take_all(&mut self) -> Vec<Action> {
        mem::take(&mut self.actions)
    }
}
