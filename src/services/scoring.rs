use crate::error::{Error, Result};
use crate::models::question::QuizQuestion;
use std::collections::HashMap;

/// Minimum percentage score that unlocks a reward claim. Fixed policy, not
/// configurable.
pub const REWARD_THRESHOLD: i32 = 70;

/// Percentage of questions answered correctly, rounded to the nearest
/// integer. A question with no recorded answer counts as incorrect. Scoring
/// an empty question set is a hard error; quizzes are never created without
/// questions.
pub fn score(questions: &[QuizQuestion], answers: &HashMap<String, String>) -> Result<i32> {
    if questions.is_empty() {
        return Err(Error::Internal(
            "Cannot score a quiz with no questions".to_string(),
        ));
    }
    let correct = questions
        .iter()
        .filter(|q| answers.get(&q.id).is_some_and(|a| q.is_correct(a)))
        .count();
    Ok(((correct as f64 / questions.len() as f64) * 100.0).round() as i32)
}

pub fn is_eligible(score: i32) -> bool {
    score >= REWARD_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions(n: usize) -> Vec<QuizQuestion> {
        (1..=n)
            .map(|i| QuizQuestion {
                id: i.to_string(),
                question: format!("Question {}", i),
                options: vec!["right".into(), "wrong".into()],
                correct_answer: "right".into(),
                explanation: None,
            })
            .collect()
    }

    fn answers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn four_of_five_correct_scores_eighty() {
        let qs = questions(5);
        let ans = answers(&[
            ("1", "right"),
            ("2", "right"),
            ("3", "right"),
            ("4", "right"),
            ("5", "wrong"),
        ]);
        assert_eq!(score(&qs, &ans).unwrap(), 80);
    }

    #[test]
    fn missing_answers_count_as_incorrect() {
        let qs = questions(4);
        let ans = answers(&[("1", "right")]);
        assert_eq!(score(&qs, &ans).unwrap(), 25);
    }

    #[test]
    fn rounding_is_to_nearest_integer() {
        let qs = questions(3);
        let ans = answers(&[("1", "right")]);
        // 1/3 => 33.33 rounds down
        assert_eq!(score(&qs, &ans).unwrap(), 33);
        let ans = answers(&[("1", "right"), ("2", "right")]);
        // 2/3 => 66.67 rounds up
        assert_eq!(score(&qs, &ans).unwrap(), 67);
    }

    #[test]
    fn score_is_always_within_bounds() {
        let qs = questions(7);
        assert_eq!(score(&qs, &HashMap::new()).unwrap(), 0);
        let all = answers(&[
            ("1", "right"),
            ("2", "right"),
            ("3", "right"),
            ("4", "right"),
            ("5", "right"),
            ("6", "right"),
            ("7", "right"),
        ]);
        assert_eq!(score(&qs, &all).unwrap(), 100);
    }

    #[test]
    fn scoring_an_empty_quiz_fails_fast() {
        assert!(score(&[], &HashMap::new()).is_err());
    }

    #[test]
    fn eligibility_holds_exactly_from_the_threshold() {
        for s in 0..=100 {
            assert_eq!(is_eligible(s), s >= 70, "score {}", s);
        }
    }
}
