use std::borrow::Cow;
use std::collections::BTreeMap;

use rand::Rng;

use crate::quiz::shuffle::{shuffle_tagged, tagged, Shuffled};
use crate::quiz::{Navigation, Policy, QuestionId, QuizItem, Submission, Verdict};

/// One word of a harakat sentence. Question words offer vocalised variants
/// to pick from; the others are shown as they are.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarakatWord {
    pub text: String,
    #[serde(default)]
    pub is_question: bool,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(skip)]
    shuffled: Vec<Shuffled<String>>,
}

impl HarakatWord {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn question(text: impl Into<String>, options: &[&str], correct: &str) -> Self {
        let options: Vec<String> = options.iter().map(|o| o.to_string()).collect();
        Self {
            text: text.into(),
            is_question: true,
            shuffled: tagged(&options),
            options,
            correct_answer: Some(correct.to_string()),
        }
    }

    /// Options in the order they are offered.
    pub fn choices(&self) -> Cow<'_, [Shuffled<String>]> {
        if self.shuffled.len() == self.options.len() {
            Cow::Borrowed(&self.shuffled)
        } else {
            Cow::Owned(tagged(&self.options))
        }
    }

    pub fn is_right(&self, chosen: Option<&String>) -> bool {
        match (chosen, &self.correct_answer) {
            (Some(chosen), Some(correct)) => chosen == correct,
            _ => false,
        }
    }
}

/// Vowel-marking drill over one sentence. The answer maps the position of
/// each question word to the variant the learner picked.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Harakat {
    #[serde(default)]
    pub id: QuestionId,
    #[serde(default)]
    pub instruction: Option<String>,
    pub sentence: Vec<HarakatWord>,
    #[serde(default)]
    pub feedback: Option<String>,
}

impl Harakat {
    pub fn new(id: impl Into<QuestionId>, sentence: Vec<HarakatWord>) -> Self {
        Self {
            id: id.into(),
            sentence,
            ..Self::default()
        }
    }

    pub fn question_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.sentence
            .iter()
            .enumerate()
            .filter(|(_, word)| word.is_question)
            .map(|(position, _)| position)
    }

    /// Per question word: position and whether the pick was right.
    pub fn word_results(&self, marks: &BTreeMap<usize, String>) -> Vec<(usize, bool)> {
        self.question_positions()
            .map(|position| (position, self.sentence[position].is_right(marks.get(&position))))
            .collect()
    }
}

/// Records `option` for the word at `position`.
pub fn choose(marks: &mut BTreeMap<usize, String>, position: usize, option: impl Into<String>) {
    marks.insert(position, option.into());
}

impl QuizItem for Harakat {
    type Response = BTreeMap<usize, String>;
    const POLICY: Policy = Policy::slider(Submission::PerQuestion, Navigation::Gated);

    fn id(&self) -> &QuestionId {
        &self.id
    }

    fn prepare<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let mut prepared = self.clone();
        for word in prepared.sentence.iter_mut().filter(|word| word.is_question) {
            word.shuffled = shuffle_tagged(&word.options, rng);
        }
        prepared
    }

    fn is_complete(&self, response: Option<&BTreeMap<usize, String>>) -> bool {
        let Some(marks) = response else {
            return false;
        };
        self.question_positions().all(|position| marks.contains_key(&position))
    }

    fn evaluate(&self, response: Option<&BTreeMap<usize, String>>) -> Verdict {
        match response {
            Some(marks) if !marks.is_empty() => {
                if self.word_results(marks).iter().all(|(_, right)| *right) {
                    Verdict::Correct
                } else {
                    Verdict::Incorrect
                }
            }
            _ => Verdict::Unanswered,
        }
    }
}
