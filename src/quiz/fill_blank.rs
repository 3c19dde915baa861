use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::quiz::{Policy, QuestionId, QuizItem, Verdict};

/// Script the learner is expected to type in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerType {
    #[default]
    Arabic,
    Indonesia,
}

impl AnswerType {
    pub fn is_right_to_left(self) -> bool {
        self == AnswerType::Arabic
    }
}

// hamza above/below and madda are kept so أ, إ, آ, ؤ, ئ recompose
fn is_hamza_mark(c: char) -> bool {
    matches!(c, '\u{0653}'..='\u{0655}')
}

/// Comparison form of a free-text answer: vowel marks and other combining
/// diacritics removed, `~` dropped, surrounding whitespace trimmed, lowercase.
pub fn normalize_answer(raw: &str) -> String {
    let stripped: String = raw
        .nfd()
        .filter(|c| *c != '~' && (!is_combining_mark(*c) || is_hamza_mark(*c)))
        .nfc()
        .collect();
    stripped.trim().to_lowercase()
}

/// Short answer typed by the learner, accepted against several spellings.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillBlank {
    #[serde(default)]
    pub id: QuestionId,
    pub question: String,
    #[serde(default)]
    pub arabic_text: Option<String>,
    pub correct_answers: Vec<String>,
    #[serde(default)]
    pub answer_type: AnswerType,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
}

impl FillBlank {
    pub fn new(
        id: impl Into<QuestionId>,
        question: impl Into<String>,
        correct_answers: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            correct_answers,
            ..Self::default()
        }
    }

    /// Spelling shown when the learner got it wrong.
    pub fn expected(&self) -> Option<&str> {
        self.correct_answers.first().map(String::as_str)
    }

    pub fn accepts(&self, raw: &str) -> bool {
        let answer = normalize_answer(raw);
        if answer.is_empty() {
            return false;
        }
        self.correct_answers
            .iter()
            .map(|accepted| normalize_answer(accepted))
            .any(|accepted| !accepted.is_empty() && accepted == answer)
    }
}

impl QuizItem for FillBlank {
    type Response = String;
    const POLICY: Policy = Policy::single_shot(true);

    fn id(&self) -> &QuestionId {
        &self.id
    }

    fn evaluate(&self, response: Option<&String>) -> Verdict {
        match response {
            Some(raw) if !raw.trim().is_empty() => {
                if self.accepts(raw) {
                    Verdict::Correct
                } else {
                    Verdict::Incorrect
                }
            }
            _ => Verdict::Unanswered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::{Score, Session};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn question(accepted: &[&str]) -> FillBlank {
        FillBlank::new(
            "q",
            "Ibukota Arab Saudi?",
            accepted.iter().map(|a| a.to_string()).collect(),
        )
    }

    #[test]
    fn latin_answers_fold_case_trim_and_accents() {
        assert_eq!(normalize_answer("  Allāh "), "allah");
        let q = question(&["allah"]);
        assert_eq!(q.evaluate(Some(&"Allāh ".to_string())), Verdict::Correct);
        assert_eq!(q.evaluate(Some(&"ALLAH".to_string())), Verdict::Correct);
    }

    #[test]
    fn arabic_vowel_marks_are_ignored() {
        assert_eq!(normalize_answer("مَكَّةَ"), "مكة");
        let q = question(&["مكة"]);
        assert_eq!(q.evaluate(Some(&"مَكَّةَ".to_string())), Verdict::Correct);
        assert_eq!(q.evaluate(Some(&"المدينة".to_string())), Verdict::Incorrect);
    }

    #[test]
    fn hamza_seats_survive_normalisation() {
        assert_eq!(normalize_answer("أَكَلَ"), "أكل");
        assert_ne!(normalize_answer("أكل"), normalize_answer("اكل"));
    }

    #[test]
    fn any_accepted_spelling_matches() {
        let q = question(&["الرياض", "riyadh", "Riyad"]);
        assert_eq!(q.evaluate(Some(&"RIYAD".to_string())), Verdict::Correct);
        assert_eq!(q.evaluate(Some(&"الرِّيَاض".to_string())), Verdict::Correct);
        assert_eq!(q.expected(), Some("الرياض"));
    }

    #[test]
    fn blank_answers_never_match() {
        let q = question(&["", "َ"]);
        assert_eq!(q.evaluate(Some(&"   ".to_string())), Verdict::Unanswered);
        assert_eq!(q.evaluate(None), Verdict::Unanswered);
        // only vowel marks: not blank, but normalises to nothing
        assert_eq!(q.evaluate(Some(&"ُ".to_string())), Verdict::Incorrect);
    }

    #[test]
    fn submit_waits_for_non_blank_answers() {
        let questions = vec![
            FillBlank::new(0usize, "Jamak dari كِتَاب", vec!["كتب".to_string()]),
            FillBlank::new(1usize, "Lawan kata كَبِير", vec!["صغير".to_string()]),
        ];
        let mut session = Session::new(questions, false, &mut StdRng::seed_from_u64(1));
        session.answer(&QuestionId::from(0usize), "كُتُبٌ".to_string());
        session.answer(&QuestionId::from(1usize), "  ".to_string());
        assert!(!session.can_submit());

        session.answer(&QuestionId::from(1usize), "صَغِيرٌ".to_string());
        assert!(session.submit());
        // tanwin is a vowel mark too
        assert_eq!(session.score(), Score::new(2, 2));
    }
}
