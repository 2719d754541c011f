use crate::models::question::QuizQuestion;
use crate::models::quiz::{Difficulty, Quiz, QuizOrigin};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Question as shown to the person taking the quiz: no correct answer, no
/// explanation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
}

impl From<QuizQuestion> for PublicQuestion {
    fn from(q: QuizQuestion) -> Self {
        Self {
            id: q.id,
            question: q.question,
            options: q.options,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSummary {
    pub id: Uuid,
    pub title: String,
    pub subject: String,
    pub difficulty: Difficulty,
    pub time_limit_minutes: i32,
    pub origin: QuizOrigin,
    pub total_questions: usize,
}

impl From<&Quiz> for QuizSummary {
    fn from(quiz: &Quiz) -> Self {
        Self {
            id: quiz.id,
            title: quiz.title.clone(),
            subject: quiz.subject.clone(),
            difficulty: quiz.difficulty,
            time_limit_minutes: quiz.time_limit_minutes,
            origin: quiz.origin,
            total_questions: quiz.question_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizDetail {
    #[serde(flatten)]
    pub summary: QuizSummary,
    pub questions: Vec<PublicQuestion>,
}

impl From<&Quiz> for QuizDetail {
    fn from(quiz: &Quiz) -> Self {
        Self {
            summary: QuizSummary::from(quiz),
            questions: quiz
                .parsed_questions()
                .into_iter()
                .map(PublicQuestion::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateQuizRequest {
    #[validate(length(min = 1, message = "subject is required"))]
    pub subject: String,
    pub difficulty: Option<Difficulty>,
    #[validate(range(min = 1, max = 20))]
    pub count: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sample_quizzes;

    #[test]
    fn public_questions_never_leak_the_correct_answer() {
        let quiz = &sample_quizzes()[0];
        let detail = QuizDetail::from(quiz);
        let body = serde_json::to_string(&detail).unwrap();
        assert!(!body.contains("correct_answer"));
        assert!(!body.contains("explanation"));
        assert_eq!(detail.questions.len(), 5);
    }
}
