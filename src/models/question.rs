use serde::{Deserialize, Serialize};

/// A single multiple-choice question. The correct answer is always one of the
/// listed options; `validate` is the construction-time gate for that rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl QuizQuestion {
    pub fn validate(&self) -> bool {
        self.options.len() >= 2 && self.options.iter().any(|o| o == &self.correct_answer)
    }

    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: &str) -> QuizQuestion {
        QuizQuestion {
            id: "1".into(),
            question: "What is 2 + 3?".into(),
            options: vec!["4".into(), "5".into(), "6".into(), "7".into()],
            correct_answer: correct.into(),
            explanation: None,
        }
    }

    #[test]
    fn correct_answer_must_be_among_options() {
        assert!(question("5").validate());
        assert!(!question("42").validate());
    }

    #[test]
    fn fewer_than_two_options_is_invalid() {
        let mut q = question("5");
        q.options = vec!["5".into()];
        assert!(!q.validate());
    }
}
