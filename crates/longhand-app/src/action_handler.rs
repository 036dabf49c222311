use longhand_game::{
    FieldNavigator, GameSession, Key, KeyEvent, KeyResponse, SessionState, navigation,
};

use crate::action::{Action, ActionRequestQueue};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ActionEffect {
    pub(crate) quit_requested: bool,
}

#[derive(Debug)]
struct ActionContext<'a> {
    session: &'a GameSession,
    navigator: &'a mut FieldNavigator,
    effect: &'a mut ActionEffect,
}

pub(crate) fn handle_all(
    session: &GameSession,
    navigator: &mut FieldNavigator,
    effect: &mut ActionEffect,
    action_queue: &mut ActionRequestQueue,
) {
    for action in action_queue.take_all() {
        handle(session, navigator, effect, action);
    }
}

pub(crate) fn handle(
    session: &GameSession,
    navigator: &mut FieldNavigator,
    effect: &mut ActionEffect,
    action: Action,
) {
    let mut ctx = ActionContext {
        session,
        navigator,
        effect,
    };

    log::trace!("handling {action:?}");
    match action {
        Action::Key(event) => ctx.handle_key(event),
        Action::EnterDigit(digit) => ctx.enter_digit(digit),
        Action::Backspace => ctx.backspace(),
        Action::SubmitProblem => ctx.session.submit_problem(),
        Action::NextProblem => ctx.session.next_problem(),
        Action::JumpToLevel(level) => ctx.session.jump_to_level(level),
        Action::StartEditing => ctx.session.enable_editing(),
        Action::FinishEditing(operands) => ctx.session.disable_editing(operands),
        Action::ReplaceProblem { operand1, operand2 } => {
            ctx.session.update_problem(operand1, operand2);
        }
        Action::Restart => ctx.session.spawn(ctx.session.initialize()),
        Action::Quit => ctx.effect.quit_requested = true,
    }
}

impl ActionContext<'_> {
    fn handle_key(&mut self, event: KeyEvent) {
        let navigator = &mut *self.navigator;
        let response = self
            .session
            .with_state(|state| navigator.handle_key(event, &state.nav_context()));

        match response {
            KeyResponse::SubmitRequested => self.session.submit_problem(),
            // Enter on a submitted problem is the "next problem" button.
            KeyResponse::Unhandled
                if event.key == Key::Enter
                    && self.session.with_state(SessionState::is_submitted) =>
            {
                self.session.next_problem();
            }
            KeyResponse::Unhandled | KeyResponse::Handled => {}
        }
    }

    fn enter_digit(&mut self, digit: u32) {
        let focus = self.navigator.focus();
        if !self.session.with_state(|state| state.problem().is_some()) {
            return;
        }
        self.session.submit_answer(focus, digit);

        let navigator = &mut *self.navigator;
        self.session
            .with_state(|state| navigator.move_next(state.problem()));
    }

    fn backspace(&mut self) {
        let focus = self.navigator.focus();
        let navigator = &mut *self.navigator;
        let target = self.session.with_state(|state| {
            if state.answers().contains(focus) {
                return Some(focus);
            }
            let problem = state.problem()?;
            let previous = navigation::previous_field(problem, focus)?;
            navigator.jump_to_field(Some(problem), previous);
            Some(previous)
        });
        if let Some(field) = target {
            self.session.clear_answer(field);
        }
    }
}
