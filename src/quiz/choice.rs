//! Multiple choice (one correct option) and multi-select (any number of
//! correct options) questions. Both shuffle their options per session and
//! record answers by the option's original index, so scoring never depends
//! on display order.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::ops::Deref;

use rand::Rng;

use crate::quiz::shuffle::{shuffle_tagged, tagged, Shuffled};
use crate::quiz::{Policy, QuestionId, QuizItem, Verdict};

#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub text: String,
    #[serde(default)]
    pub arabic_text: Option<String>,
    #[serde(default)]
    pub is_correct: bool,
}

impl Choice {
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            text: text.into(),
            arabic_text: None,
            is_correct,
        }
    }
}

/// How an option is marked once results are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    /// A correct option, picked or not.
    Correct,
    /// Picked but wrong.
    Incorrect,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceQuestion {
    #[serde(default)]
    pub id: QuestionId,
    pub question: String,
    #[serde(default)]
    pub arabic_text: Option<String>,
    #[serde(default)]
    pub instruction: Option<String>,
    pub options: Vec<Choice>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(skip)]
    display: Vec<Shuffled<Choice>>,
}

impl ChoiceQuestion {
    pub fn new(id: impl Into<QuestionId>, question: impl Into<String>, options: Vec<Choice>) -> Self {
        let display = tagged(&options);
        Self {
            id: id.into(),
            question: question.into(),
            arabic_text: None,
            instruction: None,
            options,
            feedback: None,
            display,
        }
    }

    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = Some(feedback.into());
        self
    }

    /// Options in display order, each tagged with its original index.
    pub fn displayed(&self) -> Cow<'_, [Shuffled<Choice>]> {
        if self.display.len() == self.options.len() {
            Cow::Borrowed(&self.display)
        } else {
            Cow::Owned(tagged(&self.options))
        }
    }

    /// Original index of the option shown at `position`.
    pub fn original_index(&self, position: usize) -> Option<usize> {
        self.displayed().get(position).map(|entry| entry.original_index)
    }

    pub fn correct_indices(&self) -> BTreeSet<usize> {
        self.options
            .iter()
            .enumerate()
            .filter(|(_, option)| option.is_correct)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn mark(&self, original_index: usize, selected: bool) -> OptionMark {
        match self.options.get(original_index) {
            Some(option) if option.is_correct => OptionMark::Correct,
            Some(_) if selected => OptionMark::Incorrect,
            _ => OptionMark::Neutral,
        }
    }

    fn with_shuffled_options<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        Self {
            display: shuffle_tagged(&self.options, rng),
            ..self.clone()
        }
    }
}

/// Exactly one option is correct; the answer is an original option index.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct MultipleChoice(pub ChoiceQuestion);

impl Deref for MultipleChoice {
    type Target = ChoiceQuestion;

    fn deref(&self) -> &ChoiceQuestion {
        &self.0
    }
}

impl QuizItem for MultipleChoice {
    type Response = usize;
    const POLICY: Policy = Policy::single_shot(true);

    fn id(&self) -> &QuestionId {
        &self.0.id
    }

    fn prepare<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        Self(self.0.with_shuffled_options(rng))
    }

    fn evaluate(&self, response: Option<&usize>) -> Verdict {
        let Some(index) = response else {
            return Verdict::Unanswered;
        };
        match self.options.get(*index) {
            Some(option) if option.is_correct => Verdict::Correct,
            _ => Verdict::Incorrect,
        }
    }
}

/// Several options may be correct; the answer must match them exactly.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct MultiSelect(pub ChoiceQuestion);

impl Deref for MultiSelect {
    type Target = ChoiceQuestion;

    fn deref(&self) -> &ChoiceQuestion {
        &self.0
    }
}

/// Flips membership of `index` in a multi-select answer.
pub fn toggle(selection: &mut BTreeSet<usize>, index: usize) {
    if !selection.remove(&index) {
        selection.insert(index);
    }
}

impl QuizItem for MultiSelect {
    type Response = BTreeSet<usize>;
    const POLICY: Policy = Policy::single_shot(false);

    fn id(&self) -> &QuestionId {
        &self.0.id
    }

    fn prepare<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        Self(self.0.with_shuffled_options(rng))
    }

    fn evaluate(&self, response: Option<&BTreeSet<usize>>) -> Verdict {
        match response {
            Some(selection) if !selection.is_empty() => {
                if *selection == self.correct_indices() {
                    Verdict::Correct
                } else {
                    Verdict::Incorrect
                }
            }
            _ => Verdict::Unanswered,
        }
    }
}
