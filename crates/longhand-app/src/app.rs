//! Line-driven practice game.
//!
//! Each input line is one turn: it is parsed into actions, the actions are applied,
//! queued session work (level loads) is polled once, and the focus follows the
//! problem if it changed.

use std::fmt;

use longhand_core::{Correctness, FieldId, Problem};
use longhand_game::{FieldNavigator, GameSession};

use crate::{
    action::ActionRequestQueue,
    action_handler::{self, ActionEffect},
    command::{self, ParseCommandError},
};

#[derive(Debug)]
pub struct PracticeApp {
    session: GameSession,
    navigator: FieldNavigator,
    /// The problem the focus was last reset for, with the editable flag cleared.
    shown_problem: Option<Problem>,
    effect: ActionEffect,
}

impl PracticeApp {
    #[must_use]
    pub fn new(session: GameSession) -> Self {
        let navigator = FieldNavigator::new(session.catalog().mode());
        Self {
            session,
            navigator,
            shown_problem: None,
            effect: ActionEffect::default(),
        }
    }

    /// Starts a new game and runs its first turn.
    pub fn start(&mut self) {
        self.session.spawn(self.session.initialize());
        self.turn();
    }

    /// Applies one line of input.
    pub fn handle_line(&mut self, line: &str) -> Result<(), ParseCommandError> {
        let mut action_queue = ActionRequestQueue::default();
        for action in command::parse_line(line)? {
            action_queue.request(action);
        }
        action_handler::handle_all(
            &self.session,
            &mut self.navigator,
            &mut self.effect,
            &mut action_queue,
        );
        self.turn();
        Ok(())
    }

    #[must_use]
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    #[must_use]
    pub fn focus(&self) -> FieldId {
        self.navigator.focus()
    }

    #[must_use]
    pub fn is_quit_requested(&self) -> bool {
        self.effect.quit_requested
    }

    /// Returns the text to show after a turn.
    #[must_use]
    pub fn screen(&self) -> Screen<'_> {
        Screen { app: self }
    }

    fn turn(&mut self) {
        self.session.run_pending();

        let problem = self
            .session
            .with_state(|state| state.problem().map(|p| p.with_editable(false)));
        if problem != self.shown_problem {
            self.navigator.reset_focus(problem.as_ref());
            self.shown_problem = problem;
        }
    }
}

/// The rendered state of a [`PracticeApp`].
#[derive(Debug)]
pub struct Screen<'a> {
    app: &'a PracticeApp,
}

impl fmt::Display for Screen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let session = &self.app.session;
        let status = session.load_status();

        session.with_state(|state| {
            let level = state.current_level();
            let name = session.catalog().get(level).map_or("", |l| l.name);
            writeln!(f, "Level {level}: {name}    score {}", state.score())?;

            let Some(problem) = state.problem() else {
                return if status.is_loading {
                    writeln!(f, "Loading problems...")
                } else {
                    writeln!(f, "No problem loaded.")
                };
            };

            writeln!(f)?;
            writeln!(f, "    {problem}")?;
            for field in problem.fields() {
                let marker = if self.app.navigator.is_field_focused(field) {
                    '>'
                } else {
                    ' '
                };
                let (value, verdict) = match state.answers().get(field) {
                    Some(answer) => (
                        answer.value.to_string(),
                        match answer.correctness {
                            Correctness::Correct => "ok",
                            Correctness::Incorrect if state.is_submitted() => "wrong",
                            Correctness::Incorrect => "",
                            Correctness::Pending => "?",
                        },
                    ),
                    None => ("_".to_owned(), ""),
                };
                writeln!(f, "  {marker} {:<20} {value:>2} {verdict}", field.to_string())?;
            }
            writeln!(f)?;

            if let Some(error) = &status.error {
                writeln!(f, "{error}")?;
            }
            if problem.is_editable() {
                writeln!(f, "Editing: type `edit A B` for new operands, or `done`.")
            } else if state.is_complete() {
                writeln!(f, "Correct! Press enter for the next problem.")
            } else if state.is_submitted() {
                writeln!(f, "Not quite. Fix the marked fields and press enter again.")
            } else {
                writeln!(f, "Fill every field, then press enter.")
            }
        })
    }
}
