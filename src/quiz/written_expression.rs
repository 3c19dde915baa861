//! Written-expression error analysis: a sentence with a few underlined
//! segments, one of which is wrong. The learner clicks the faulty segment.

use std::borrow::Cow;

use crate::quiz::{Policy, QuestionId, QuizItem, Verdict};

#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct ExpressionOption {
    pub key: String,
    pub text: String,
}

impl ExpressionOption {
    pub fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
        }
    }
}

/// A run of sentence text, clickable when it is one of the options.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentencePart {
    pub text: String,
    #[serde(default)]
    pub is_option: bool,
    #[serde(default)]
    pub option_key: Option<String>,
}

impl SentencePart {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }

    fn option(option: &ExpressionOption) -> Self {
        Self {
            text: option.text.clone(),
            is_option: true,
            option_key: Some(option.key.clone()),
        }
    }
}

/// Splits `sentence` around occurrences of the option texts. At each step the
/// leftmost occurrence wins; options listed first win ties at the same
/// position.
pub fn split_sentence(sentence: &str, options: &[ExpressionOption]) -> Vec<SentencePart> {
    let mut parts = Vec::new();
    let mut rest = sentence;
    loop {
        let next = options
            .iter()
            .filter(|option| !option.text.is_empty())
            .filter_map(|option| rest.find(option.text.as_str()).map(|at| (at, option)))
            .min_by_key(|(at, _)| *at);
        let Some((at, option)) = next else {
            break;
        };
        if at > 0 {
            parts.push(SentencePart::plain(&rest[..at]));
        }
        parts.push(SentencePart::option(option));
        rest = &rest[at + option.text.len()..];
    }
    if !rest.is_empty() {
        parts.push(SentencePart::plain(rest));
    }
    parts
}

#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrittenExpression {
    #[serde(default)]
    pub id: QuestionId,
    #[serde(default)]
    pub sentence: String,
    #[serde(default)]
    pub sentence_parts: Option<Vec<SentencePart>>,
    pub options: Vec<ExpressionOption>,
    pub correct_answer_key: String,
    #[serde(default)]
    pub feedback: Option<String>,
}

impl WrittenExpression {
    pub fn new(
        id: impl Into<QuestionId>,
        sentence: impl Into<String>,
        options: Vec<ExpressionOption>,
        correct_answer_key: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            sentence: sentence.into(),
            options,
            correct_answer_key: correct_answer_key.into(),
            ..Self::default()
        }
    }

    /// Authored parts when present, otherwise the sentence split around the
    /// option texts.
    pub fn parts(&self) -> Cow<'_, [SentencePart]> {
        match &self.sentence_parts {
            Some(parts) => Cow::Borrowed(parts),
            None => Cow::Owned(split_sentence(&self.sentence, &self.options)),
        }
    }

    pub fn option(&self, key: &str) -> Option<&ExpressionOption> {
        self.options.iter().find(|option| option.key == key)
    }
}

impl QuizItem for WrittenExpression {
    type Response = String;
    const POLICY: Policy = Policy::single_shot(true);

    fn id(&self) -> &QuestionId {
        &self.id
    }

    fn evaluate(&self, response: Option<&String>) -> Verdict {
        match response {
            None => Verdict::Unanswered,
            Some(key) if *key == self.correct_answer_key => Verdict::Correct,
            Some(_) => Verdict::Incorrect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::{Score, Session};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn options() -> Vec<ExpressionOption> {
        vec![
            ExpressionOption::new("A", "ذَهَبَتْ"),
            ExpressionOption::new("B", "الطُّلَّابُ"),
            ExpressionOption::new("C", "الْمَدْرَسَةِ"),
        ]
    }

    #[test]
    fn sentence_is_split_around_options() {
        let parts = split_sentence("ذَهَبَتْ الطُّلَّابُ إِلَى الْمَدْرَسَةِ.", &options());
        let texts: Vec<(&str, Option<&str>)> = parts
            .iter()
            .map(|p| (p.text.as_str(), p.option_key.as_deref()))
            .collect();
        assert_eq!(
            texts,
            vec![
                ("ذَهَبَتْ", Some("A")),
                (" ", None),
                ("الطُّلَّابُ", Some("B")),
                (" إِلَى ", None),
                ("الْمَدْرَسَةِ", Some("C")),
                (".", None),
            ]
        );
    }

    #[test]
    fn first_listed_option_wins_a_tie() {
        let options = vec![ExpressionOption::new("long", "ab"), ExpressionOption::new("short", "a")];
        let parts = split_sentence("xab", &options);
        assert_eq!(parts[1].option_key.as_deref(), Some("long"));
        assert_eq!(parts.len(), 2);
    }

    #[test]
    fn authored_parts_take_precedence() {
        let mut question = WrittenExpression::new("q", "ignored", options(), "A");
        question.sentence_parts = Some(vec![SentencePart::plain("hanya teks")]);
        assert_eq!(question.parts().len(), 1);
        assert!(!question.parts()[0].is_option);
    }

    #[test]
    fn key_comparison_decides() {
        let question = WrittenExpression::new("q", "ذَهَبَتْ الطُّلَّابُ", options(), "A");
        assert_eq!(question.evaluate(Some(&"A".to_string())), Verdict::Correct);
        assert_eq!(question.evaluate(Some(&"B".to_string())), Verdict::Incorrect);
        assert_eq!(question.evaluate(None), Verdict::Unanswered);
    }

    #[test]
    fn submit_requires_every_sentence() {
        let questions = vec![
            WrittenExpression::new("1", "ذَهَبَتْ الطُّلَّابُ", options(), "A"),
            WrittenExpression::new("2", "الطُّلَّابُ فِي الْمَدْرَسَةِ", options(), "B"),
        ];
        let mut session = Session::new(questions, false, &mut StdRng::seed_from_u64(1));
        session.answer(&QuestionId::from("1"), "A".to_string());
        assert!(!session.can_submit());
        session.answer(&QuestionId::from("2"), "C".to_string());
        assert!(session.submit());
        assert_eq!(session.score(), Score::new(1, 2));
    }
}
