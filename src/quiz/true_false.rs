use crate::quiz::{Navigation, Policy, QuestionId, QuizItem, Submission, Verdict};

/// Statement judged as true or false. Answering locks the question at once.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrueFalse {
    #[serde(default)]
    pub id: QuestionId,
    pub question: String,
    pub correct_answer: bool,
    #[serde(default)]
    pub feedback: Option<String>,
}

impl TrueFalse {
    pub fn new(id: impl Into<QuestionId>, question: impl Into<String>, correct_answer: bool) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            correct_answer,
            feedback: None,
        }
    }
}

impl QuizItem for TrueFalse {
    type Response = bool;
    const POLICY: Policy = Policy::slider(Submission::OnAnswer, Navigation::Free);

    fn id(&self) -> &QuestionId {
        &self.id
    }

    fn evaluate(&self, response: Option<&bool>) -> Verdict {
        match response {
            None => Verdict::Unanswered,
            Some(answer) if *answer == self.correct_answer => Verdict::Correct,
            Some(_) => Verdict::Incorrect,
        }
    }
}
