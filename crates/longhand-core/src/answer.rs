//! Player answers.

use serde::{Deserialize, Serialize};

use crate::field::FieldId;

/// Validation state of an answer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant,
)]
pub enum Correctness {
    /// Validated and correct.
    Correct,
    /// Validated and wrong, or entered before the first submission.
    Incorrect,
    /// Entered after a submission and not validated again yet.
    Pending,
}

impl From<bool> for Correctness {
    fn from(correct: bool) -> Self {
        if correct {
            Correctness::Correct
        } else {
            Correctness::Incorrect
        }
    }
}

/// A value entered by the player for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// The field the value was entered into.
    pub field: FieldId,
    /// The entered value.
    pub value: u32,
    /// Validation state.
    pub correctness: Correctness,
}

impl Answer {
    /// Creates an answer that has not been validated yet.
    #[must_use]
    pub fn new(field: FieldId, value: u32) -> Self {
        Self {
            field,
            value,
            correctness: Correctness::Incorrect,
        }
    }

    /// Returns the answer with its correctness replaced.
    #[must_use]
    pub fn with_correctness(self, correctness: Correctness) -> Self {
        Self {
            correctness,
            ..self
        }
    }
}

/// The answers recorded for one problem, at most one per field.
///
/// Answers are kept in entry order; re-entering a field moves it to the end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSet {
    answers: Vec<Answer>,
}

impl AnswerSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of recorded answers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    /// Returns true if no answer is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Returns the answer recorded for `field`.
    #[must_use]
    pub fn get(&self, field: FieldId) -> Option<&Answer> {
        self.answers.iter().find(|a| a.field == field)
    }

    /// Returns true if an answer is recorded for `field`.
    #[must_use]
    pub fn contains(&self, field: FieldId) -> bool {
        self.get(field).is_some()
    }

    /// Iterates over the recorded answers in entry order.
    pub fn iter(&self) -> std::slice::Iter<'_, Answer> {
        self.answers.iter()
    }

    /// Records `answer`, replacing any answer for the same field.
    ///
    /// Returns the replaced answer.
    pub fn upsert(&mut self, answer: Answer) -> Option<Answer> {
        let replaced = self.remove(answer.field);
        self.answers.push(answer);
        replaced
    }

    /// Removes the answer for `field`.
    pub fn remove(&mut self, field: FieldId) -> Option<Answer> {
        let index = self.answers.iter().position(|a| a.field == field)?;
        Some(self.answers.remove(index))
    }

    /// Removes every answer.
    pub fn clear(&mut self) {
        self.answers.clear();
    }

    /// Keeps only the answers for which `f` returns true.
    pub fn retain(&mut self, f: impl FnMut(&Answer) -> bool) {
        self.answers.retain(f);
    }

    /// Replaces the correctness of every answer with the result of `f`.
    pub fn revalidate(&mut self, mut f: impl FnMut(&Answer) -> Correctness) {
        for answer in &mut self.answers {
            answer.correctness = f(answer);
        }
    }
}

impl FromIterator<Answer> for AnswerSet {
    fn from_iter<T: IntoIterator<Item = Answer>>(iter: T) -> Self {
        let mut set = Self::new();
        for answer in iter {
            set.upsert(answer);
        }
        set
    }
}

impl<'a> IntoIterator for &'a AnswerSet {
    type Item = &'a Answer;
    type IntoIter = std::slice::Iter<'a, Answer>;

    fn into_iter(self) -> Self::IntoIter {
        self.answers.iter()
    }
}
