pub mod choice;
pub mod fill_blank;
pub mod harakat;
pub mod irab;
pub mod ledger;
pub mod matching;
pub mod scoring;
pub mod scramble;
pub mod session;
pub mod shuffle;
pub mod true_false;
pub mod word_id;
pub mod written_expression;

use std::fmt;

use rand::Rng;

pub use ledger::Ledger;
pub use scoring::{Band, Score, Verdict};
pub use session::{Navigation, Page, Phase, Policy, Session, SessionView, Submission};
pub use shuffle::Shuffled;

/// Identifier of a scorable question, stable across shuffles.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct QuestionId(pub String);

impl QuestionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<usize> for QuestionId {
    fn from(position: usize) -> Self {
        Self(position.to_string())
    }
}

impl From<&str> for QuestionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a ledger value counts as an answer at all.
pub trait Answered {
    fn is_answered(&self) -> bool;
}

impl Answered for usize {
    fn is_answered(&self) -> bool {
        true
    }
}

impl Answered for bool {
    fn is_answered(&self) -> bool {
        true
    }
}

impl Answered for String {
    fn is_answered(&self) -> bool {
        !self.trim().is_empty()
    }
}

impl Answered for std::collections::BTreeSet<usize> {
    fn is_answered(&self) -> bool {
        !self.is_empty()
    }
}

impl Answered for std::collections::BTreeMap<usize, String> {
    fn is_answered(&self) -> bool {
        !self.is_empty()
    }
}

impl Answered for Vec<usize> {
    fn is_answered(&self) -> bool {
        !self.is_empty()
    }
}

/// One scorable unit of a quiz kind: its response shape, how it is prepared
/// for a session (option shuffling) and how a response is judged.
pub trait QuizItem: Clone + fmt::Debug {
    type Response: Answered + Clone + fmt::Debug;

    /// Submission and navigation rules sessions of this kind start from.
    const POLICY: Policy;

    fn id(&self) -> &QuestionId;

    /// Snapshot used for one session cycle. Kinds with shuffled options
    /// override this; the default keeps the record as authored.
    fn prepare<R: Rng + ?Sized>(&self, _rng: &mut R) -> Self {
        self.clone()
    }

    fn evaluate(&self, response: Option<&Self::Response>) -> Verdict;

    /// Whether the response is complete enough to be checked or submitted.
    fn is_complete(&self, response: Option<&Self::Response>) -> bool {
        response.is_some_and(Answered::is_answered)
    }

    /// Contribution to the aggregate score.
    fn score(&self, response: Option<&Self::Response>) -> Score {
        Score::unit(self.evaluate(response) == Verdict::Correct)
    }
}
