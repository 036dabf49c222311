//! The field navigation controller.
//!
//! [`FieldNavigator`] keeps the keyboard focus on one field of the current problem.
//! Focus moves follow [`field_order`] and wrap around at both ends; the order is
//! recomputed from the problem on every move, so edits that change the shape of the
//! problem never leave a stale order behind.
//!
//! [`field_order`]: longhand_core::field_order

use longhand_core::{AnswerSet, FieldId, GameMode, Problem};

use crate::validate;

/// A key the navigator reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Left arrow.
    ArrowLeft,
    /// Right arrow.
    ArrowRight,
    /// Up arrow.
    ArrowUp,
    /// Down arrow.
    ArrowDown,
    /// Tab; with Shift it moves backwards.
    Tab,
    /// The confirm key.
    Enter,
    /// Any other key.
    Other,
}

/// A key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// The pressed key.
    pub key: Key,
    /// True if Shift was held.
    pub shift: bool,
}

impl KeyEvent {
    /// A key pressed without modifiers.
    #[must_use]
    pub const fn plain(key: Key) -> Self {
        Self { key, shift: false }
    }

    /// A key pressed with Shift held.
    #[must_use]
    pub const fn shifted(key: Key) -> Self {
        Self { key, shift: true }
    }
}

/// What the navigator did with a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum KeyResponse {
    /// The key is left to the UI, e.g. Enter on a submitted problem.
    Unhandled,
    /// The key was consumed.
    Handled,
    /// The key was consumed and the problem should be submitted.
    SubmitRequested,
}

impl KeyResponse {
    /// Returns true if the UI should suppress the key's default behavior.
    #[must_use]
    pub fn prevents_default(self) -> bool {
        !self.is_unhandled()
    }
}

/// The parts of the session state key handling depends on.
#[derive(Debug, Clone, Copy)]
pub struct NavContext<'a> {
    /// The current problem.
    pub problem: Option<&'a Problem>,
    /// The answers entered so far.
    pub answers: &'a AnswerSet,
    /// True once the problem has been submitted.
    pub is_submitted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    MoveNext,
    MovePrevious,
    Confirm,
}

struct Trigger {
    key: Key,
    /// `None` matches with and without Shift.
    shift: Option<bool>,
}

impl Trigger {
    fn matches(&self, event: KeyEvent) -> bool {
        self.key == event.key && self.shift.is_none_or(|shift| shift == event.shift)
    }
}

struct Binding {
    trigger: Trigger,
    command: Command,
}

impl Binding {
    const fn new(key: Key, shift: Option<bool>, command: Command) -> Self {
        Self {
            trigger: Trigger { key, shift },
            command,
        }
    }

    const fn any(key: Key, command: Command) -> Self {
        Self::new(key, None, command)
    }

    const fn plain(key: Key, command: Command) -> Self {
        Self::new(key, Some(false), command)
    }

    const fn shift(key: Key, command: Command) -> Self {
        Self::new(key, Some(true), command)
    }
}

const BINDINGS: [Binding; 7] = [
    Binding::any(Key::ArrowRight, Command::MoveNext),
    Binding::any(Key::ArrowDown, Command::MoveNext),
    Binding::any(Key::ArrowLeft, Command::MovePrevious),
    Binding::any(Key::ArrowUp, Command::MovePrevious),
    Binding::plain(Key::Tab, Command::MoveNext),
    Binding::shift(Key::Tab, Command::MovePrevious),
    Binding::any(Key::Enter, Command::Confirm),
];

/// Returns the field after `field` in the field order of `problem`.
///
/// Wraps to the first field after the last one. A field that is not part of the
/// order is followed by the first field. Returns `None` if the problem has no
/// fields.
#[must_use]
pub fn next_field(problem: &Problem, field: FieldId) -> Option<FieldId> {
    let fields = problem.fields();
    let index = fields.iter().position(|&f| f == field);
    match index {
        Some(i) if i + 1 < fields.len() => Some(fields[i + 1]),
        _ => fields.first().copied(),
    }
}

/// Returns the field before `field` in the field order of `problem`.
///
/// Wraps to the last field before the first one. A field that is not part of the
/// order is preceded by the last field. Returns `None` if the problem has no
/// fields.
#[must_use]
pub fn previous_field(problem: &Problem, field: FieldId) -> Option<FieldId> {
    let fields = problem.fields();
    let index = fields.iter().position(|&f| f == field);
    match index {
        Some(i) if i > 0 => Some(fields[i - 1]),
        _ => fields.last().copied(),
    }
}

/// Returns true if every field of `problem` has an answer.
///
/// Always false without a problem.
#[must_use]
pub fn are_all_fields_filled(problem: Option<&Problem>, answers: &AnswerSet) -> bool {
    problem.is_some_and(|problem| validate::all_fields_filled(&problem.fields(), answers))
}

/// Tracks the focused field of a problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNavigator {
    mode: GameMode,
    focus: FieldId,
}

impl FieldNavigator {
    /// Creates a navigator focused on the first field of a `mode` problem.
    #[must_use]
    pub const fn new(mode: GameMode) -> Self {
        Self {
            mode,
            focus: FieldId::first_of(mode),
        }
    }

    /// Returns the focused field.
    #[must_use]
    pub fn focus(&self) -> FieldId {
        self.focus
    }

    /// Focuses the first field of a freshly loaded `problem`.
    pub fn reset_focus(&mut self, problem: Option<&Problem>) {
        self.focus = problem
            .and_then(|problem| problem.fields().first().copied())
            .unwrap_or(FieldId::first_of(self.mode));
    }

    /// Moves the focus to the next field, wrapping to the first one.
    pub fn move_next(&mut self, problem: Option<&Problem>) {
        if let Some(field) = problem.and_then(|p| next_field(p, self.focus)) {
            self.focus = field;
        }
    }

    /// Moves the focus to the previous field, wrapping to the last one.
    pub fn move_previous(&mut self, problem: Option<&Problem>) {
        if let Some(field) = problem.and_then(|p| previous_field(p, self.focus)) {
            self.focus = field;
        }
    }

    /// Focuses `field` directly.
    ///
    /// Returns false and keeps the focus if there is no problem, the step is out of
    /// range, or the field belongs to the other game mode.
    pub fn jump_to_field(&mut self, problem: Option<&Problem>, field: FieldId) -> bool {
        let Some(problem) = problem else {
            return false;
        };
        if !problem.has_step(field.step) || field.kind.mode() != problem.mode() {
            return false;
        }
        self.focus = field;
        true
    }

    /// Returns true if `field` has the focus.
    #[must_use]
    pub fn is_field_focused(&self, field: FieldId) -> bool {
        self.focus == field
    }

    /// Reacts to a key press.
    ///
    /// Arrows and Tab move the focus. Enter on a submitted problem is left to the
    /// UI (which moves on to the next problem); otherwise it is consumed and requests
    /// a submission only once every field is filled. Enter never moves the focus.
    pub fn handle_key(&mut self, event: KeyEvent, cx: &NavContext<'_>) -> KeyResponse {
        let Some(binding) = BINDINGS.iter().find(|b| b.trigger.matches(event)) else {
            return KeyResponse::Unhandled;
        };

        match binding.command {
            Command::MoveNext => self.move_next(cx.problem),
            Command::MovePrevious => self.move_previous(cx.problem),
            Command::Confirm => {
                if cx.is_submitted {
                    return KeyResponse::Unhandled;
                }
                if are_all_fields_filled(cx.problem, cx.answers) {
                    return KeyResponse::SubmitRequested;
                }
            }
        }
        KeyResponse::Handled
    }
}
