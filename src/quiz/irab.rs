//! I'rab analysis: for each marked word of a sentence the learner fills three
//! slots (syntactic position, case state, case marker). Words are checked one
//! at a time; a sentence is complete once all its words are checked.

use std::fmt;

use rand::Rng;

use crate::quiz::{
    Answered, Navigation, Page, Policy, QuestionId, QuizItem, Session, Submission, Verdict,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Kedudukan (الموقع)
    Position,
    /// Keadaan (الحالة)
    State,
    /// Alamat (العلامة)
    Marker,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::Position, Slot::State, Slot::Marker];

    pub fn label(self) -> &'static str {
        match self {
            Slot::Position => "Kedudukan (الموقع)",
            Slot::State => "Keadaan (الحالة)",
            Slot::Marker => "Alamat (العلامة)",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct SlotOptions {
    #[serde(rename = "kedudukan")]
    pub position: Vec<String>,
    #[serde(rename = "keadaan")]
    pub state: Vec<String>,
    #[serde(rename = "alamat")]
    pub marker: Vec<String>,
}

impl SlotOptions {
    pub fn get(&self, slot: Slot) -> &[String] {
        match slot {
            Slot::Position => &self.position,
            Slot::State => &self.state,
            Slot::Marker => &self.marker,
        }
    }
}

/// The correct triple for a word.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Analysis {
    #[serde(rename = "kedudukan")]
    pub position: String,
    #[serde(rename = "keadaan")]
    pub state: String,
    #[serde(rename = "alamat")]
    pub marker: String,
}

impl Analysis {
    pub fn get(&self, slot: Slot) -> &str {
        match slot {
            Slot::Position => &self.position,
            Slot::State => &self.state,
            Slot::Marker => &self.marker,
        }
    }
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.position, self.state, self.marker)
    }
}

/// The learner's analysis, filled one slot at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SlotAnswer {
    pub position: Option<String>,
    pub state: Option<String>,
    pub marker: Option<String>,
}

impl SlotAnswer {
    pub fn get(&self, slot: Slot) -> Option<&str> {
        match slot {
            Slot::Position => self.position.as_deref(),
            Slot::State => self.state.as_deref(),
            Slot::Marker => self.marker.as_deref(),
        }
    }

    /// Replaces one slot, leaving the other two as they are.
    pub fn set(&mut self, slot: Slot, value: impl Into<String>) {
        let value = Some(value.into());
        match slot {
            Slot::Position => self.position = value,
            Slot::State => self.state = value,
            Slot::Marker => self.marker = value,
        }
    }
}

impl Answered for SlotAnswer {
    fn is_answered(&self) -> bool {
        Slot::ALL.iter().all(|slot| self.get(*slot).is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrabWord {
    #[serde(default)]
    pub key: QuestionId,
    pub text: String,
    pub options: SlotOptions,
    pub correct_answer: Analysis,
}

impl IrabWord {
    pub fn slot_results(&self, answer: &SlotAnswer) -> [(Slot, bool); 3] {
        Slot::ALL.map(|slot| (slot, answer.get(slot) == Some(self.correct_answer.get(slot))))
    }

    /// Message shown after the word is checked.
    pub fn feedback(&self, verdict: Verdict) -> Option<String> {
        match verdict {
            Verdict::Correct => Some("Analisis Anda benar!".to_string()),
            Verdict::Partial | Verdict::Incorrect => {
                Some(format!("Jawaban benar: {}.", self.correct_answer))
            }
            Verdict::Unanswered => None,
        }
    }
}

impl QuizItem for IrabWord {
    type Response = SlotAnswer;
    const POLICY: Policy = Policy::slider(Submission::PerQuestion, Navigation::Gated);

    fn id(&self) -> &QuestionId {
        &self.key
    }

    fn evaluate(&self, response: Option<&SlotAnswer>) -> Verdict {
        match response {
            Some(answer) if answer.is_answered() => {
                let matches = self
                    .slot_results(answer)
                    .iter()
                    .filter(|(_, right)| *right)
                    .count();
                Verdict::from_matches(matches, Slot::ALL.len())
            }
            _ => Verdict::Unanswered,
        }
    }
}

/// A sentence and the words to analyse in it.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct IrabSentence {
    #[serde(default)]
    pub id: QuestionId,
    pub sentence: String,
    pub words: Vec<IrabWord>,
}

impl IrabSentence {
    pub fn into_page(self) -> Page<IrabWord> {
        Page::titled(self.sentence, self.words)
    }
}

/// One page per sentence, in authored order.
pub fn session<R: Rng + ?Sized>(sentences: Vec<IrabSentence>, rng: &mut R) -> Session<IrabWord> {
    let pages = sentences.into_iter().map(IrabSentence::into_page).collect();
    Session::paged(pages, IrabWord::POLICY, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::Score;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn word(key: &str, text: &str, correct: [&str; 3]) -> IrabWord {
        IrabWord {
            key: QuestionId::from(key),
            text: text.to_string(),
            options: SlotOptions {
                position: vec!["Mubtada'".into(), "Khabar".into(), "Fa'il".into()],
                state: vec!["Marfu'".into(), "Manshub".into(), "Majrur".into()],
                marker: vec!["Dhammah".into(), "Fathah".into(), "Kasrah".into()],
            },
            correct_answer: Analysis {
                position: correct[0].to_string(),
                state: correct[1].to_string(),
                marker: correct[2].to_string(),
            },
        }
    }

    fn answer(values: [&str; 3]) -> SlotAnswer {
        let mut answer = SlotAnswer::default();
        for (slot, value) in Slot::ALL.iter().zip(values) {
            answer.set(*slot, value);
        }
        answer
    }

    fn sentences() -> Vec<IrabSentence> {
        vec![
            IrabSentence {
                id: QuestionId::from("s1"),
                sentence: "الْبَيْتُ كَبِيْرٌ".to_string(),
                words: vec![
                    word("w1", "الْبَيْتُ", ["Mubtada'", "Marfu'", "Dhammah"]),
                    word("w2", "كَبِيْرٌ", ["Khabar", "Marfu'", "Dhammah"]),
                ],
            },
            IrabSentence {
                id: QuestionId::from("s2"),
                sentence: "جَاءَ زَيْدٌ".to_string(),
                words: vec![word("w3", "زَيْدٌ", ["Fa'il", "Marfu'", "Dhammah"])],
            },
        ]
    }

    #[test]
    fn three_slots_give_correct_partial_or_incorrect() {
        let w = word("w", "الْبَيْتُ", ["Mubtada'", "Marfu'", "Dhammah"]);
        assert_eq!(w.evaluate(Some(&answer(["Mubtada'", "Marfu'", "Dhammah"]))), Verdict::Correct);
        assert_eq!(w.evaluate(Some(&answer(["Khabar", "Marfu'", "Dhammah"]))), Verdict::Partial);
        assert_eq!(w.evaluate(Some(&answer(["Khabar", "Majrur", "Dhammah"]))), Verdict::Partial);
        assert_eq!(w.evaluate(Some(&answer(["Khabar", "Majrur", "Kasrah"]))), Verdict::Incorrect);
    }

    #[test]
    fn partial_and_wrong_answers_reveal_the_triple() {
        let w = word("w", "الْبَيْتُ", ["Mubtada'", "Marfu'", "Dhammah"]);
        let expected = "Jawaban benar: Mubtada', Marfu', Dhammah.";
        assert_eq!(w.feedback(Verdict::Partial).as_deref(), Some(expected));
        assert_eq!(w.feedback(Verdict::Incorrect).as_deref(), Some(expected));
        assert_eq!(w.feedback(Verdict::Correct).as_deref(), Some("Analisis Anda benar!"));
    }

    #[test]
    fn incomplete_analysis_is_unanswered() {
        let w = word("w", "الْبَيْتُ", ["Mubtada'", "Marfu'", "Dhammah"]);
        let mut partial = SlotAnswer::default();
        partial.set(Slot::Position, "Mubtada'");
        partial.set(Slot::State, "Marfu'");
        assert!(!partial.is_answered());
        assert_eq!(w.evaluate(Some(&partial)), Verdict::Unanswered);
    }

    #[test]
    fn slot_edits_merge_instead_of_replacing() {
        let mut session = session(sentences(), &mut StdRng::seed_from_u64(1));
        let w1 = QuestionId::from("w1");
        session.update(&w1, |a| a.set(Slot::Position, "Mubtada'"));
        session.update(&w1, |a| a.set(Slot::Marker, "Dhammah"));
        let recorded = session.response(&w1).unwrap();
        assert_eq!(recorded.get(Slot::Position), Some("Mubtada'"));
        assert_eq!(recorded.get(Slot::State), None);
        assert_eq!(recorded.get(Slot::Marker), Some("Dhammah"));
    }

    #[test]
    fn sentence_pages_are_gated_by_checked_words() {
        let mut session = session(sentences(), &mut StdRng::seed_from_u64(1));
        assert_eq!(session.page_count(), 2);
        assert_eq!(
            session.current_page().and_then(|p| p.title.as_deref()),
            Some("الْبَيْتُ كَبِيْرٌ")
        );

        let w1 = QuestionId::from("w1");
        let w2 = QuestionId::from("w2");
        session.answer(&w1, answer(["Mubtada'", "Marfu'", "Dhammah"]));
        assert!(session.check(&w1));
        assert!(!session.advance());

        session.answer(&w2, answer(["Khabar", "Manshub", "Fathah"]));
        assert!(session.check(&w2));
        assert!(!session.answer(&w2, answer(["Khabar", "Marfu'", "Dhammah"])));
        assert_eq!(session.view().questions[1].verdict, Some(Verdict::Partial));
        assert!(session.advance());

        let w3 = QuestionId::from("w3");
        session.answer(&w3, answer(["Fa'il", "Marfu'", "Dhammah"]));
        assert!(!session.can_submit());
        assert!(session.check(&w3));
        assert!(session.submit());
        // partial words do not count as correct
        assert_eq!(session.score(), Score::new(2, 3));
    }
}
