use crate::error::Result;
use crate::models::question::QuizQuestion;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::time::Duration;

/// Question sets coming back from the completion API must match this schema
/// exactly; anything else is rejected wholesale and the caller falls back to
/// the template set.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GeneratedQuestionSet {
    questions: Vec<GeneratedQuestion>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GeneratedQuestion {
    question: String,
    options: Vec<String>,
    correct_answer: String,
    explanation: Option<String>,
}

#[derive(Clone)]
pub struct GeneratorService {
    client: Client,
    api_key: String,
}

impl GeneratorService {
    pub fn new(api_key: String, client: Client) -> Self {
        Self { client, api_key }
    }

    /// Generate questions for a subject, falling back to the deterministic
    /// templates when the API call or its schema validation fails.
    pub async fn questions_or_fallback(&self, subject: &str, count: usize) -> Vec<QuizQuestion> {
        match self.generate_questions(subject, count).await {
            Ok(questions) => questions,
            Err(e) => {
                tracing::warn!(error = ?e, subject, "Question generation failed, using templates");
                fallback_questions(subject, count)
            }
        }
    }

    pub async fn generate_questions(
        &self,
        subject: &str,
        count: usize,
    ) -> Result<Vec<QuizQuestion>> {
        let system_prompt = r#"You are a tutor writing multiple-choice quiz questions.
Return a JSON object with a 'questions' array. Each element must have exactly
these keys: 'question' (string), 'options' (array of four strings),
'correct_answer' (one of the options, verbatim), 'explanation' (string).
Distribute the correct answer across different option positions."#;

        let user_request = serde_json::json!({
            "subject": subject,
            "required_count": count,
        });

        let payload = serde_json::json!({
            "model": "gpt-4o",
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_request.to_string()}
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.7
        });

        let response_json = self.chat_openai(payload).await?;
        parse_question_set(&response_json, count)
    }

    async fn chat_openai(&self, payload: JsonValue) -> Result<JsonValue> {
        let res = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&payload)
            .timeout(Duration::from_secs(120))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("OpenAI API Error {}: {}", status, text).into());
        }

        let body: JsonValue = res.json().await?;

        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .and_then(|s| serde_json::from_str(s).ok())
            .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response format").into())
    }
}

/// Strict schema gate: the whole payload is rejected on any shape mismatch,
/// and individual questions whose correct answer is not among their options
/// are dropped.
pub fn parse_question_set(raw: &JsonValue, count: usize) -> Result<Vec<QuizQuestion>> {
    let set: GeneratedQuestionSet = serde_json::from_value(raw.clone())
        .map_err(|e| anyhow::anyhow!("Generated questions did not match the schema: {}", e))?;

    let mut questions: Vec<QuizQuestion> = set
        .questions
        .into_iter()
        .enumerate()
        .map(|(idx, q)| QuizQuestion {
            id: format!("{}", idx + 1),
            question: q.question,
            options: q.options,
            correct_answer: q.correct_answer,
            explanation: q.explanation,
        })
        .filter(|q| q.validate())
        .collect();

    if questions.is_empty() {
        return Err(anyhow::anyhow!("Generation produced no usable questions").into());
    }
    questions.truncate(count);
    // Re-number after the validity filter so ids stay dense.
    for (idx, q) in questions.iter_mut().enumerate() {
        q.id = format!("{}", idx + 1);
    }
    Ok(questions)
}

/// Deterministic template questions, used whenever generation is unavailable.
pub fn fallback_questions(subject: &str, count: usize) -> Vec<QuizQuestion> {
    let templates: [(&str, [&str; 4], usize); 5] = [
        (
            "What is the main principle of {}?",
            [
                "The scientific method",
                "Empirical observation",
                "Theoretical modeling",
                "Historical analysis",
            ],
            0,
        ),
        (
            "Who is considered the founder of modern {}?",
            [
                "Albert Einstein",
                "Isaac Newton",
                "Marie Curie",
                "Charles Darwin",
            ],
            1,
        ),
        (
            "Which of these is NOT related to {}?",
            [
                "Quantum theory",
                "Cellular division",
                "Polynomial equations",
                "Renaissance art",
            ],
            3,
        ),
        (
            "In {}, what does the term \"paradigm shift\" refer to?",
            [
                "A fundamental change in approach",
                "A mathematical formula",
                "A laboratory technique",
                "A historical period",
            ],
            0,
        ),
        (
            "Which field is most closely related to {}?",
            ["Statistics", "Philosophy", "Engineering", "Literature"],
            0,
        ),
    ];

    templates
        .iter()
        .take(count.max(1).min(templates.len()))
        .enumerate()
        .map(|(idx, (text, options, correct))| QuizQuestion {
            id: format!("{}", idx + 1),
            question: text.replace("{}", subject),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer: options[*correct].to_string(),
            explanation: Some(format!(
                "Template question for {} used while generation is unavailable.",
                subject
            )),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn well_formed_payload_parses_into_questions() {
        let raw = json!({
            "questions": [
                {
                    "question": "What is the unit of force?",
                    "options": ["Watt", "Joule", "Newton", "Volt"],
                    "correct_answer": "Newton",
                    "explanation": "Force is measured in Newtons."
                }
            ]
        });
        let questions = parse_question_set(&raw, 5).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id, "1");
        assert!(questions[0].validate());
    }

    #[test]
    fn unknown_fields_reject_the_whole_payload() {
        let raw = json!({
            "questions": [
                {
                    "question": "Q",
                    "options": ["a", "b"],
                    "correct_answer": "a",
                    "difficulty": "easy"
                }
            ]
        });
        assert!(parse_question_set(&raw, 5).is_err());
    }

    #[test]
    fn free_text_payload_is_rejected_not_scraped() {
        let raw = json!("Here are your questions: [{\"question\": ...}]");
        assert!(parse_question_set(&raw, 5).is_err());
    }

    #[test]
    fn questions_with_answers_outside_their_options_are_dropped() {
        let raw = json!({
            "questions": [
                {
                    "question": "Good",
                    "options": ["a", "b", "c", "d"],
                    "correct_answer": "c",
                    "explanation": null
                },
                {
                    "question": "Bad",
                    "options": ["a", "b", "c", "d"],
                    "correct_answer": "e",
                    "explanation": null
                }
            ]
        });
        let questions = parse_question_set(&raw, 5).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question, "Good");
    }

    #[test]
    fn all_invalid_questions_is_an_error() {
        let raw = json!({
            "questions": [
                { "question": "Bad", "options": ["a"], "correct_answer": "a", "explanation": null }
            ]
        });
        assert!(parse_question_set(&raw, 5).is_err());
    }

    #[test]
    fn templates_always_satisfy_the_answer_invariant() {
        for q in fallback_questions("Physics", 5) {
            assert!(q.validate());
            assert!(q.question.contains("Physics"));
        }
    }

    #[test]
    fn template_count_is_clamped_to_the_template_set() {
        assert_eq!(fallback_questions("Art", 99).len(), 5);
        assert_eq!(fallback_questions("Art", 2).len(), 2);
    }
}
