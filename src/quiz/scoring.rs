use std::fmt;
use std::ops::Add;

/// Per-question correctness classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Verdict {
    Correct,
    Incorrect,
    Partial,
    Unanswered,
}

impl Verdict {
    pub fn is_correct(self) -> bool {
        self == Verdict::Correct
    }

    /// Verdict from the number of matching parts out of `total`.
    pub fn from_matches(matches: usize, total: usize) -> Self {
        if total > 0 && matches == total {
            Verdict::Correct
        } else if matches > 0 {
            Verdict::Partial
        } else {
            Verdict::Incorrect
        }
    }
}

/// Aggregate score: points earned over scorable units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

impl Score {
    pub fn new(correct: usize, total: usize) -> Self {
        Self { correct, total }
    }

    /// One scorable unit, earned or not.
    pub fn unit(correct: bool) -> Self {
        Self {
            correct: usize::from(correct),
            total: 1,
        }
    }

    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64
    }

    /// Rounded percentage, as shown to the learner.
    pub fn percentage(&self) -> u32 {
        (self.ratio() * 100.0).round() as u32
    }

    pub fn band(&self) -> Band {
        // integer comparison keeps 4/5 and 3/5 exactly on the thresholds
        if self.total == 0 {
            Band::NeedsImprovement
        } else if self.correct * 5 >= self.total * 4 {
            Band::Excellent
        } else if self.correct * 5 >= self.total * 3 {
            Band::Good
        } else {
            Band::NeedsImprovement
        }
    }
}

impl Add for Score {
    type Output = Score;

    fn add(self, other: Score) -> Score {
        Score {
            correct: self.correct + other.correct,
            total: self.total + other.total,
        }
    }
}

impl std::iter::Sum for Score {
    fn sum<I: Iterator<Item = Score>>(iter: I) -> Score {
        iter.fold(Score::default(), Add::add)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.correct, self.total)
    }
}

/// Three-tier qualitative classification of a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Excellent,
    Good,
    NeedsImprovement,
}

impl Band {
    pub fn message(&self) -> &'static str {
        match self {
            Band::Excellent => "ممتاز! (Luar biasa!) 🎉",
            Band::Good => "جيد! (Bagus!) 👍",
            Band::NeedsImprovement => "يحتاج إلى مزيد من الدراسة (Perlu belajar lagi) 📚",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Band::Excellent => "excellent",
            Band::Good => "good",
            Band::NeedsImprovement => "needs improvement",
        };
        f.write_str(label)
    }
}
