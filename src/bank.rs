//! Question bank: the authored quizzes, loaded from JSON once at startup.
//!
//! Each quiz names its kind in a `kind` tag. Records without an `id` get one
//! from their position, then every quiz is checked for shape problems so a
//! broken bank fails at load time instead of in the middle of a session.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::quiz::choice::{ChoiceQuestion, MultiSelect, MultipleChoice};
use crate::quiz::fill_blank::FillBlank;
use crate::quiz::harakat::Harakat;
use crate::quiz::irab::{IrabSentence, Slot};
use crate::quiz::matching::MatchingBoard;
use crate::quiz::scramble::SentenceScramble;
use crate::quiz::true_false::TrueFalse;
use crate::quiz::word_id::WordIdentification;
use crate::quiz::written_expression::WrittenExpression;
use crate::quiz::{QuestionId, QuizItem};

#[derive(Debug, thiserror::Error)]
pub enum BankError {
    #[error("Failed to read question bank {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Question bank parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Quiz '{quiz}' is malformed: {reason}")]
    Malformed { quiz: String, reason: String },
}

impl BankError {
    fn malformed(quiz: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            quiz: quiz.to_string(),
            reason: reason.into(),
        }
    }
}

/// Records of one quiz, by kind.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuizContent {
    MultipleChoice { questions: Vec<MultipleChoice> },
    MultiSelect { questions: Vec<MultiSelect> },
    TrueFalse { questions: Vec<TrueFalse> },
    FillInTheBlank { questions: Vec<FillBlank> },
    SentenceScramble { questions: Vec<SentenceScramble> },
    Harakat { questions: Vec<Harakat> },
    IrabAnalysis { sentences: Vec<IrabSentence> },
    WordIdentification { questions: Vec<WordIdentification> },
    Matching(MatchingBoard),
    WrittenExpression { questions: Vec<WrittenExpression> },
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QuizDefinition {
    pub title: String,
    #[serde(default)]
    pub shuffle_questions: bool,
    #[serde(flatten)]
    pub content: QuizContent,
}

impl QuizDefinition {
    /// Human readable kind, shown in menus.
    pub fn kind_label(&self) -> &'static str {
        match self.content {
            QuizContent::MultipleChoice { .. } => "Pilihan Ganda",
            QuizContent::MultiSelect { .. } => "Pilihan Ganda Kompleks",
            QuizContent::TrueFalse { .. } => "Benar atau Salah",
            QuizContent::FillInTheBlank { .. } => "Isian Singkat",
            QuizContent::SentenceScramble { .. } => "Susun Kalimat",
            QuizContent::Harakat { .. } => "Harakat",
            QuizContent::IrabAnalysis { .. } => "Analisis I'rab",
            QuizContent::WordIdentification { .. } => "Identifikasi Kata",
            QuizContent::Matching(_) => "Menjodohkan",
            QuizContent::WrittenExpression { .. } => "Analisis Kesalahan",
        }
    }

    fn assign_ids(&mut self) {
        match &mut self.content {
            QuizContent::MultipleChoice { questions } => {
                assign(questions.iter_mut().map(|q| &mut q.0.id))
            }
            QuizContent::MultiSelect { questions } => {
                assign(questions.iter_mut().map(|q| &mut q.0.id))
            }
            QuizContent::TrueFalse { questions } => assign(questions.iter_mut().map(|q| &mut q.id)),
            QuizContent::FillInTheBlank { questions } => {
                assign(questions.iter_mut().map(|q| &mut q.id))
            }
            QuizContent::SentenceScramble { questions } => {
                assign(questions.iter_mut().map(|q| &mut q.id))
            }
            QuizContent::Harakat { questions } => assign(questions.iter_mut().map(|q| &mut q.id)),
            QuizContent::IrabAnalysis { sentences } => {
                assign(sentences.iter_mut().map(|s| &mut s.id));
                for sentence in sentences.iter_mut() {
                    for (position, word) in sentence.words.iter_mut().enumerate() {
                        if word.key.is_empty() {
                            word.key = QuestionId::new(format!("{}-{}", sentence.id, position + 1));
                        }
                    }
                }
            }
            QuizContent::WordIdentification { questions } => {
                assign(questions.iter_mut().map(|q| &mut q.id))
            }
            QuizContent::Matching(board) => assign(std::iter::once(&mut board.id)),
            QuizContent::WrittenExpression { questions } => {
                assign(questions.iter_mut().map(|q| &mut q.id))
            }
        }
    }

    /// Checks the records for shape problems the engine cannot recover from.
    pub fn validate(&self) -> Result<(), BankError> {
        let title = self.title.as_str();
        let fail = |reason: String| Err(BankError::malformed(title, reason));
        match &self.content {
            QuizContent::MultipleChoice { questions } => {
                non_empty(title, questions)?;
                for question in questions {
                    check_choices(title, &question.0)?;
                }
                unique_ids(title, questions.iter().map(QuizItem::id))
            }
            QuizContent::MultiSelect { questions } => {
                non_empty(title, questions)?;
                for question in questions {
                    check_choices(title, &question.0)?;
                }
                unique_ids(title, questions.iter().map(QuizItem::id))
            }
            QuizContent::TrueFalse { questions } => {
                non_empty(title, questions)?;
                unique_ids(title, questions.iter().map(QuizItem::id))
            }
            QuizContent::FillInTheBlank { questions } => {
                non_empty(title, questions)?;
                for question in questions {
                    if question.correct_answers.iter().all(|a| a.trim().is_empty()) {
                        return fail(format!("question {} has no accepted answer", question.id));
                    }
                }
                unique_ids(title, questions.iter().map(QuizItem::id))
            }
            QuizContent::SentenceScramble { questions } => {
                non_empty(title, questions)?;
                for question in questions {
                    if question.words.is_empty() || question.correct_answers.is_empty() {
                        return fail(format!("question {} needs words and an answer", question.id));
                    }
                }
                unique_ids(title, questions.iter().map(QuizItem::id))
            }
            QuizContent::Harakat { questions } => {
                non_empty(title, questions)?;
                for question in questions {
                    if question.question_positions().next().is_none() {
                        return fail(format!("question {} has no question word", question.id));
                    }
                    for word in question.sentence.iter().filter(|w| w.is_question) {
                        let correct = word.correct_answer.as_ref();
                        if word.options.is_empty() || correct.map_or(true, |c| !word.options.contains(c)) {
                            return fail(format!(
                                "word '{}' of question {} needs options containing its answer",
                                word.text, question.id
                            ));
                        }
                    }
                }
                unique_ids(title, questions.iter().map(QuizItem::id))
            }
            QuizContent::IrabAnalysis { sentences } => {
                non_empty(title, sentences)?;
                for sentence in sentences {
                    if sentence.words.is_empty() {
                        return fail(format!("sentence {} has no words to analyse", sentence.id));
                    }
                    for word in &sentence.words {
                        if let Some(slot) = Slot::ALL.iter().find(|s| word.options.get(**s).is_empty()) {
                            return fail(format!("word '{}' has no options for {}", word.text, slot));
                        }
                    }
                }
                unique_ids(
                    title,
                    sentences.iter().flat_map(|s| s.words.iter()).map(QuizItem::id),
                )
            }
            QuizContent::WordIdentification { questions } => {
                non_empty(title, questions)?;
                for question in questions {
                    if !question.question_parts.iter().any(|p| p.is_word) || question.correct_words.is_empty() {
                        return fail(format!("question {} needs words and correct words", question.id));
                    }
                }
                unique_ids(title, questions.iter().map(QuizItem::id))
            }
            QuizContent::Matching(board) => {
                if board.items.is_empty() || board.targets.is_empty() {
                    return fail("matching needs items and targets".to_string());
                }
                let targets: BTreeSet<&str> = board.targets.iter().map(|t| t.id.as_str()).collect();
                if targets.len() != board.targets.len() {
                    return fail("target ids are not unique".to_string());
                }
                if let Some(item) = board.items.iter().find(|i| !targets.contains(i.match_id.as_str())) {
                    return fail(format!("item {} points at unknown target {}", item.id, item.match_id));
                }
                let items: BTreeSet<&str> = board.items.iter().map(|i| i.id.as_str()).collect();
                if items.len() != board.items.len() {
                    return fail("item ids are not unique".to_string());
                }
                Ok(())
            }
            QuizContent::WrittenExpression { questions } => {
                non_empty(title, questions)?;
                for question in questions {
                    if question.option(&question.correct_answer_key).is_none() {
                        return fail(format!(
                            "question {} has no option with key {}",
                            question.id, question.correct_answer_key
                        ));
                    }
                    if question.sentence.is_empty() && question.sentence_parts.is_none() {
                        return fail(format!("question {} has no sentence", question.id));
                    }
                }
                unique_ids(title, questions.iter().map(QuizItem::id))
            }
        }
    }
}

fn assign<'a>(ids: impl Iterator<Item = &'a mut QuestionId>) {
    for (position, id) in ids.enumerate() {
        if id.is_empty() {
            *id = QuestionId::from(position + 1);
        }
    }
}

fn non_empty<T>(quiz: &str, records: &[T]) -> Result<(), BankError> {
    if records.is_empty() {
        return Err(BankError::malformed(quiz, "no questions"));
    }
    Ok(())
}

fn check_choices(quiz: &str, question: &ChoiceQuestion) -> Result<(), BankError> {
    if question.options.is_empty() {
        return Err(BankError::malformed(quiz, format!("question {} has no options", question.id)));
    }
    if !question.options.iter().any(|o| o.is_correct) {
        return Err(BankError::malformed(
            quiz,
            format!("question {} has no correct option", question.id),
        ));
    }
    Ok(())
}

fn unique_ids<'a>(quiz: &str, ids: impl Iterator<Item = &'a QuestionId>) -> Result<(), BankError> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(BankError::malformed(quiz, format!("duplicate question id {}", id)));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bank {
    pub quizzes: Vec<QuizDefinition>,
}

impl Bank {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BankError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| BankError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let bank = Self::parse(&raw)?;
        info!("Loaded {} quizzes from {}", bank.quizzes.len(), path.display());
        Ok(bank)
    }

    pub fn parse(raw: &str) -> Result<Self, BankError> {
        let mut bank: Bank = serde_json::from_str(raw)?;
        for quiz in &mut bank.quizzes {
            quiz.assign_ids();
            quiz.validate()?;
            debug!("quiz '{}' ({}) ok", quiz.title, quiz.kind_label());
        }
        Ok(bank)
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.quizzes.iter().map(|quiz| quiz.title.as_str())
    }

    pub fn find(&self, title: &str) -> Option<&QuizDefinition> {
        self.quizzes.iter().find(|quiz| quiz.title == title)
    }
}
