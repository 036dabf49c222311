//! Text commands typed at the prompt.
//!
//! | Input                      | Effect                                          |
//! |----------------------------|-------------------------------------------------|
//! | `0`-`9`, `58`              | enter digits into the focused field and move on |
//! | `tab`, `shift-tab`         | move focus forward / backward                   |
//! | `left` `right` `up` `down` | move focus like the arrow keys                  |
//! | `enter`                    | submit, or go to the next problem when done    |
//! | `clear`                    | clear the focused field, or step back if empty  |
//! | `level N`                  | jump to level `N`                               |
//! | `edit`, `done`             | start / finish editing the operands             |
//! | `edit A B`                 | replace the operands of the current problem     |
//! | `new A B`                  | start a fresh problem with the given operands   |
//! | `submit`, `next`           | submit / skip ahead without the keyboard rules  |
//! | `restart`                  | start over from level 1                         |
//! | `quit`                     | leave the game                                  |

use longhand_game::{Key, KeyEvent, LevelId};

use crate::action::Action;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseCommandError {
    #[display("unknown command `{command}`, try `tab`, a digit, `enter`, or `quit`")]
    UnknownCommand { command: String },
    #[display("`{command}` takes {expected}")]
    WrongArity {
        command: String,
        expected: &'static str,
    },
    #[display("`{argument}` is not a valid number for `{command}`")]
    InvalidNumber { command: String, argument: String },
}

pub(crate) fn parse_line(line: &str) -> Result<Vec<Action>, ParseCommandError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(Vec::new());
    };
    let args: Vec<&str> = words.collect();

    if command.bytes().all(|b| b.is_ascii_digit()) {
        if !args.is_empty() {
            return Err(wrong_arity(command, "no arguments"));
        }
        let digits = command.chars().filter_map(|c| c.to_digit(10));
        return Ok(digits.map(Action::EnterDigit).collect());
    }

    let key = |key| Ok(vec![Action::Key(KeyEvent::plain(key))]);
    let actions = match (command.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("tab", []) => return key(Key::Tab),
        ("shift-tab", []) => return Ok(vec![Action::Key(KeyEvent::shifted(Key::Tab))]),
        ("left", []) => return key(Key::ArrowLeft),
        ("right", []) => return key(Key::ArrowRight),
        ("up", []) => return key(Key::ArrowUp),
        ("down", []) => return key(Key::ArrowDown),
        ("enter", []) => return key(Key::Enter),
        ("clear" | "backspace", []) => vec![Action::Backspace],
        ("submit", []) => vec![Action::SubmitProblem],
        ("next", []) => vec![Action::NextProblem],
        ("edit", []) => vec![Action::StartEditing],
        ("done", []) => vec![Action::FinishEditing(None)],
        ("restart", []) => vec![Action::Restart],
        ("quit" | "exit", []) => vec![Action::Quit],
        ("level", [level]) => vec![Action::JumpToLevel(LevelId(number(command, level)?))],
        ("edit", [a, b]) => vec![
            Action::StartEditing,
            Action::FinishEditing(Some((number(command, a)?, number(command, b)?))),
        ],
        ("new", [a, b]) => vec![Action::ReplaceProblem {
            operand1: number(command, a)?,
            operand2: number(command, b)?,
        }],
        ("level", _) => return Err(wrong_arity(command, "one level number")),
        ("edit", _) => return Err(wrong_arity(command, "no arguments or two operands")),
        ("new", _) => return Err(wrong_arity(command, "two operands")),
        (
            "tab" | "shift-tab" | "left" | "right" | "up" | "down" | "enter" | "clear"
            | "backspace" | "submit" | "next" | "done" | "restart" | "quit" | "exit",
            _,
        ) => return Err(wrong_arity(command, "no arguments")),
        _ => {
            return Err(ParseCommandError::UnknownCommand {
                command: command.to_owned(),
            });
        }
    };
    Ok(actions)
}

fn number(command: &str, argument: &str) -> Result<u32, ParseCommandError> {
    argument
        .parse()
        .map_err(|_| ParseCommandError::InvalidNumber {
            command: command.to_owned(),
            argument: argument.to_owned(),
        })
}

fn wrong_arity(command: &str, expected: &'static str) -> ParseCommandError {
    ParseCommandError::WrongArity {
        command: command.to_owned(),
        expected,
    }
}
