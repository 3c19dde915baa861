use std::collections::BTreeSet;

use crate::quiz::{Policy, QuestionId, QuizItem, Score, Verdict};

#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextPart {
    pub text: String,
    /// Separators (spaces, punctuation) are not clickable.
    #[serde(default)]
    pub is_word: bool,
}

impl TextPart {
    pub fn word(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_word: true,
        }
    }

    pub fn separator(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_word: false,
        }
    }
}

/// Outcome of a word selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tally {
    /// Selected words that are in the correct set.
    pub true_positives: usize,
    /// Selected words that are not.
    pub false_positives: usize,
    /// Correct words never selected.
    pub missed: Vec<String>,
}

impl Tally {
    pub fn compute<'a, I>(correct_words: &[String], selected: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut tally = Tally::default();
        let mut hit = BTreeSet::new();
        for token in selected {
            if correct_words.iter().any(|word| word == token) {
                tally.true_positives += 1;
                hit.insert(token);
            } else {
                tally.false_positives += 1;
            }
        }
        tally.missed = correct_words
            .iter()
            .filter(|word| !hit.contains(word.as_str()))
            .cloned()
            .collect();
        tally
    }

    /// Wrong picks cancel right ones; missed words cost nothing extra.
    pub fn points(&self) -> usize {
        self.true_positives.saturating_sub(self.false_positives)
    }
}

/// How a word is marked once results are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordMark {
    CorrectSelection,
    IncorrectSelection,
    Missed,
    Plain,
}

/// Pick every word of a given category (e.g. all isim) in a passage.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordIdentification {
    #[serde(default)]
    pub id: QuestionId,
    pub question_parts: Vec<TextPart>,
    pub correct_words: Vec<String>,
    #[serde(default)]
    pub feedback: Option<String>,
}

impl WordIdentification {
    pub fn new(id: impl Into<QuestionId>, question_parts: Vec<TextPart>, correct_words: &[&str]) -> Self {
        Self {
            id: id.into(),
            question_parts,
            correct_words: correct_words.iter().map(|w| w.to_string()).collect(),
            feedback: None,
        }
    }

    fn selected_words<'a>(&'a self, selection: &'a BTreeSet<usize>) -> impl Iterator<Item = &'a str> + 'a {
        selection
            .iter()
            .filter_map(|index| self.question_parts.get(*index))
            .filter(|part| part.is_word)
            .map(|part| part.text.as_str())
    }

    pub fn tally(&self, selection: &BTreeSet<usize>) -> Tally {
        Tally::compute(&self.correct_words, self.selected_words(selection))
    }

    pub fn is_correct_word(&self, text: &str) -> bool {
        self.correct_words.iter().any(|word| word == text)
    }

    pub fn mark(&self, index: usize, selected: bool) -> WordMark {
        let Some(part) = self.question_parts.get(index).filter(|part| part.is_word) else {
            return WordMark::Plain;
        };
        match (selected, self.is_correct_word(&part.text)) {
            (true, true) => WordMark::CorrectSelection,
            (true, false) => WordMark::IncorrectSelection,
            (false, true) => WordMark::Missed,
            (false, false) => WordMark::Plain,
        }
    }
}

impl QuizItem for WordIdentification {
    type Response = BTreeSet<usize>;
    // an empty selection may be submitted; it scores zero
    const POLICY: Policy = Policy::single_shot(false);

    fn id(&self) -> &QuestionId {
        &self.id
    }

    fn evaluate(&self, response: Option<&BTreeSet<usize>>) -> Verdict {
        let Some(selection) = response.filter(|s| !s.is_empty()) else {
            return Verdict::Unanswered;
        };
        let tally = self.tally(selection);
        if tally.false_positives == 0 && tally.missed.is_empty() {
            Verdict::Correct
        } else if tally.points() == 0 {
            Verdict::Incorrect
        } else {
            Verdict::Partial
        }
    }

    fn score(&self, response: Option<&BTreeSet<usize>>) -> Score {
        let points = response.map_or(0, |selection| self.tally(selection).points());
        Score::new(points, self.correct_words.len())
    }
}
