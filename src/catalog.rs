//! Built-in reference data: the fixed subject and time-slot enumerations,
//! a sample tutor roster, and the starter quiz catalog. These back every
//! read path that has to keep working when the database is unreachable.

use crate::models::profile::{Profile, UserRole};
use crate::models::question::QuizQuestion;
use crate::models::quiz::{Difficulty, Quiz, QuizOrigin};
use chrono::Utc;
use uuid::Uuid;

pub const SUBJECTS: &[&str] = &[
    "Mathematics",
    "Physics",
    "Chemistry",
    "Biology",
    "Computer Science",
    "English",
    "History",
    "Geography",
    "Economics",
    "Business Studies",
    "Psychology",
    "Philosophy",
    "Art",
    "Music",
    "Physical Education",
];

pub const TIME_SLOTS: &[&str] = &[
    "Monday 9:00 AM",
    "Monday 10:00 AM",
    "Monday 11:00 AM",
    "Monday 2:00 PM",
    "Monday 3:00 PM",
    "Monday 4:00 PM",
    "Tuesday 9:00 AM",
    "Tuesday 10:00 AM",
    "Tuesday 11:00 AM",
    "Tuesday 2:00 PM",
    "Tuesday 3:00 PM",
    "Tuesday 4:00 PM",
    "Wednesday 9:00 AM",
    "Wednesday 10:00 AM",
    "Wednesday 11:00 AM",
    "Wednesday 2:00 PM",
    "Wednesday 3:00 PM",
    "Wednesday 4:00 PM",
    "Thursday 9:00 AM",
    "Thursday 10:00 AM",
    "Thursday 11:00 AM",
    "Thursday 2:00 PM",
    "Thursday 3:00 PM",
    "Thursday 4:00 PM",
    "Friday 9:00 AM",
    "Friday 10:00 AM",
    "Friday 11:00 AM",
    "Friday 2:00 PM",
    "Friday 3:00 PM",
    "Friday 4:00 PM",
];

pub fn is_known_subject(subject: &str) -> bool {
    SUBJECTS.contains(&subject)
}

pub fn is_known_slot(slot: &str) -> bool {
    TIME_SLOTS.contains(&slot)
}

fn sample_tutor(
    seq: u128,
    email: &str,
    subjects: &[&str],
    availability: &[&str],
    bio: &str,
    hourly_rate: i32,
) -> Profile {
    Profile {
        id: Uuid::from_u128(seq),
        email: email.to_string(),
        password_hash: String::new(),
        role: UserRole::Tutor,
        subjects: subjects.iter().map(|s| s.to_string()).collect(),
        availability: availability.iter().map(|s| s.to_string()).collect(),
        bio: Some(bio.to_string()),
        hourly_rate: Some(hourly_rate),
        created_at: Some(Utc::now()),
        updated_at: None,
    }
}

pub fn sample_tutors() -> Vec<Profile> {
    vec![
        sample_tutor(
            1,
            "john.doe@example.com",
            &["Mathematics", "Physics"],
            &["Monday 10:00 AM", "Tuesday 2:00 PM", "Friday 3:00 PM"],
            "Mathematics and Physics tutor with 5+ years of experience. PhD in Applied Mathematics.",
            40,
        ),
        sample_tutor(
            2,
            "jane.smith@example.com",
            &["Chemistry", "Biology"],
            &["Monday 9:00 AM", "Wednesday 2:00 PM", "Thursday 11:00 AM"],
            "Chemistry specialist with a focus on organic chemistry. I make complex concepts simple.",
            35,
        ),
        sample_tutor(
            3,
            "michael.johnson@example.com",
            &["Computer Science", "Mathematics"],
            &["Tuesday 3:00 PM", "Wednesday 4:00 PM", "Friday 10:00 AM"],
            "Software engineer teaching programming and mathematics. I focus on practical applications.",
            45,
        ),
        sample_tutor(
            4,
            "emily.wilson@example.com",
            &["English", "History"],
            &["Monday 11:00 AM", "Thursday 2:00 PM", "Friday 4:00 PM"],
            "Literature and history expert. I help students develop critical thinking and writing skills.",
            30,
        ),
        sample_tutor(
            5,
            "david.lee@example.com",
            &["Economics", "Business Studies"],
            &["Tuesday 10:00 AM", "Wednesday 9:00 AM", "Thursday 3:00 PM"],
            "Economics professor with real-world business experience. I make economics practical and understandable.",
            50,
        ),
    ]
}

/// Stable ids so attempts against the starter catalog survive restarts.
pub const MATH_QUIZ_ID: Uuid = Uuid::from_u128(0x1001);
pub const PHYSICS_QUIZ_ID: Uuid = Uuid::from_u128(0x1002);
pub const COMPUTER_SCIENCE_QUIZ_ID: Uuid = Uuid::from_u128(0x1003);

fn question(
    id: &str,
    text: &str,
    options: &[&str],
    correct: &str,
    explanation: &str,
) -> QuizQuestion {
    QuizQuestion {
        id: id.to_string(),
        question: text.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_answer: correct.to_string(),
        explanation: Some(explanation.to_string()),
    }
}

fn sample_quiz(
    id: Uuid,
    title: &str,
    subject: &str,
    difficulty: Difficulty,
    questions: Vec<QuizQuestion>,
) -> Quiz {
    Quiz {
        id,
        title: title.to_string(),
        subject: subject.to_string(),
        time_limit_minutes: difficulty.default_time_limit(),
        questions: serde_json::to_value(questions).unwrap_or_default(),
        difficulty,
        origin: QuizOrigin::Catalog,
        created_by: None,
        created_at: Some(Utc::now()),
    }
}

pub fn sample_quizzes() -> Vec<Quiz> {
    vec![
        sample_quiz(
            MATH_QUIZ_ID,
            "Basic Mathematics",
            "Mathematics",
            Difficulty::Easy,
            vec![
                question(
                    "1",
                    "What is 2 + 3?",
                    &["4", "5", "6", "7"],
                    "5",
                    "The sum of 2 and 3 is 5",
                ),
                question(
                    "2",
                    "What is 9 - 4?",
                    &["3", "4", "5", "6"],
                    "5",
                    "The difference between 9 and 4 is 5",
                ),
                question(
                    "3",
                    "What is 3 \u{d7} 4?",
                    &["7", "10", "12", "15"],
                    "12",
                    "The product of 3 and 4 is 12",
                ),
                question(
                    "4",
                    "What is 10 \u{f7} 2?",
                    &["3", "4", "5", "6"],
                    "5",
                    "The quotient of 10 divided by 2 is 5",
                ),
                question(
                    "5",
                    "What is 3\u{b2} (3 squared)?",
                    &["6", "8", "9", "12"],
                    "9",
                    "3\u{b2} = 3 \u{d7} 3 = 9",
                ),
            ],
        ),
        sample_quiz(
            PHYSICS_QUIZ_ID,
            "Introduction to Physics",
            "Physics",
            Difficulty::Medium,
            vec![
                question(
                    "1",
                    "What is the unit of force?",
                    &["Watt", "Joule", "Newton", "Volt"],
                    "Newton",
                    "The SI unit of force is the Newton (N)",
                ),
                question(
                    "2",
                    "Which law states that energy cannot be created or destroyed?",
                    &[
                        "Law of Inertia",
                        "Law of Conservation of Energy",
                        "Law of Action-Reaction",
                        "Law of Acceleration",
                    ],
                    "Law of Conservation of Energy",
                    "The Law of Conservation of Energy states that energy cannot be created or destroyed, only transformed from one form to another",
                ),
                question(
                    "3",
                    "What is the acceleration due to gravity on Earth?",
                    &["5.6 m/s\u{b2}", "7.8 m/s\u{b2}", "9.8 m/s\u{b2}", "11.2 m/s\u{b2}"],
                    "9.8 m/s\u{b2}",
                    "The acceleration due to gravity on Earth is approximately 9.8 m/s\u{b2}",
                ),
            ],
        ),
        sample_quiz(
            COMPUTER_SCIENCE_QUIZ_ID,
            "Computer Science Basics",
            "Computer Science",
            Difficulty::Easy,
            vec![
                question(
                    "1",
                    "What does CPU stand for?",
                    &[
                        "Central Processing Unit",
                        "Computer Processing Unit",
                        "Central Program Unit",
                        "Core Processing Unit",
                    ],
                    "Central Processing Unit",
                    "CPU stands for Central Processing Unit, which is the primary component of a computer that processes instructions",
                ),
                question(
                    "2",
                    "Which of these is NOT a programming language?",
                    &["Java", "Python", "HTML", "Photoshop"],
                    "Photoshop",
                    "Photoshop is image editing software, not a programming language",
                ),
                question(
                    "3",
                    "What does RAM stand for?",
                    &[
                        "Random Access Memory",
                        "Read Access Memory",
                        "Random Allocation Memory",
                        "Readily Available Memory",
                    ],
                    "Random Access Memory",
                    "RAM stands for Random Access Memory, which is a type of computer memory that can be accessed randomly",
                ),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalog_question_keeps_its_answer_among_the_options() {
        for quiz in sample_quizzes() {
            for q in quiz.parsed_questions() {
                assert!(q.validate(), "bad question {} in {}", q.id, quiz.title);
            }
        }
    }

    #[test]
    fn catalog_subjects_and_slots_are_drawn_from_the_enumerations() {
        for tutor in sample_tutors() {
            assert!(tutor.subjects.iter().all(|s| is_known_subject(s)));
            assert!(tutor.availability.iter().all(|s| is_known_slot(s)));
        }
        for quiz in sample_quizzes() {
            assert!(is_known_subject(&quiz.subject));
        }
    }
}
