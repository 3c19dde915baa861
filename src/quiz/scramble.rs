use std::borrow::Cow;

use rand::Rng;

use crate::quiz::shuffle::{shuffle_tagged, tagged, Shuffled};
use crate::quiz::{Navigation, Policy, QuestionId, QuizItem, Submission, Verdict};

/// Words to be put back into sentence order. The answer is the list of
/// original word indices in the order the learner placed them.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceScramble {
    #[serde(default)]
    pub id: QuestionId,
    #[serde(default)]
    pub instruction: Option<String>,
    pub words: Vec<String>,
    pub correct_answers: Vec<String>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(skip)]
    pool: Vec<Shuffled<String>>,
}

impl SentenceScramble {
    pub fn new(id: impl Into<QuestionId>, words: &[&str], correct_answers: &[&str]) -> Self {
        let words: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        Self {
            id: id.into(),
            pool: tagged(&words),
            words,
            correct_answers: correct_answers.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Word tiles in their shuffled order.
    pub fn tiles(&self) -> Cow<'_, [Shuffled<String>]> {
        if self.pool.len() == self.words.len() {
            Cow::Borrowed(&self.pool)
        } else {
            Cow::Owned(tagged(&self.words))
        }
    }

    /// Tiles not placed yet, in pool order.
    pub fn remaining(&self, arrangement: &[usize]) -> Vec<Shuffled<String>> {
        self.tiles()
            .iter()
            .filter(|tile| !arrangement.contains(&tile.original_index))
            .cloned()
            .collect()
    }

    /// The constructed sentence, words joined by single spaces.
    pub fn sentence(&self, arrangement: &[usize]) -> String {
        arrangement
            .iter()
            .filter_map(|index| self.words.get(*index))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn expected(&self) -> Option<&str> {
        self.correct_answers.first().map(String::as_str)
    }
}

/// Appends a word to the sentence unless it is already there.
pub fn place(arrangement: &mut Vec<usize>, index: usize) {
    if !arrangement.contains(&index) {
        arrangement.push(index);
    }
}

/// Sends a word back to the pool.
pub fn unplace(arrangement: &mut Vec<usize>, index: usize) {
    arrangement.retain(|placed| *placed != index);
}

impl QuizItem for SentenceScramble {
    type Response = Vec<usize>;
    const POLICY: Policy = Policy::slider(Submission::PerQuestion, Navigation::Gated);

    fn id(&self) -> &QuestionId {
        &self.id
    }

    fn prepare<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        Self {
            pool: shuffle_tagged(&self.words, rng),
            ..self.clone()
        }
    }

    /// Every tile has to leave the pool before the sentence can be checked.
    fn is_complete(&self, response: Option<&Vec<usize>>) -> bool {
        response.is_some_and(|arrangement| {
            !self.words.is_empty()
                && arrangement.len() == self.words.len()
                && (0..self.words.len()).all(|index| arrangement.contains(&index))
        })
    }

    fn evaluate(&self, response: Option<&Vec<usize>>) -> Verdict {
        match response {
            Some(arrangement) if !arrangement.is_empty() => {
                let sentence = self.sentence(arrangement);
                if self.correct_answers.iter().any(|accepted| *accepted == sentence) {
                    Verdict::Correct
                } else {
                    Verdict::Incorrect
                }
            }
            _ => Verdict::Unanswered,
        }
    }
}
