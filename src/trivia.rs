//! Trivia shown during rest - question selection and single-answer rounds

use rand::seq::SliceRandom;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TriviaError {
    #[error("no trivia questions available")]
    EmptyPool,
}

/// Question as served by `GET /quizzes`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub question: String,
    #[serde(rename = "correctanswer", alias = "correctAnswer")]
    pub correct_answer: String,
    /// The backend sends these as one `", "`-joined string
    #[serde(
        rename = "incorrectanswers",
        alias = "incorrectAnswers",
        deserialize_with = "answers_list"
    )]
    pub incorrect_answers: Vec<String>,
    #[serde(default)]
    pub description: String,
}

fn answers_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Joined(String),
        List(Vec<String>),
    }

    // separator is comma-space; a bare comma belongs to the answer ("1,000")
    let answers: Vec<String> = match Raw::deserialize(deserializer)? {
        Raw::Joined(s) => s.split(", ").map(|a| a.trim().to_string()).collect(),
        Raw::List(v) => v.into_iter().map(|a| a.trim().to_string()).collect(),
    };
    Ok(answers.into_iter().filter(|a| !a.is_empty()).collect())
}

/// Uniformly pick one question
pub fn select_random(pool: &[Question]) -> Result<&Question, TriviaError> {
    pool.choose(&mut rand::thread_rng())
        .ok_or(TriviaError::EmptyPool)
}

/// Correct answer plus all incorrect ones, deduplicated and shuffled
pub fn present_options(question: &Question) -> Vec<String> {
    let mut options: Vec<String> = Vec::with_capacity(question.incorrect_answers.len() + 1);
    for answer in std::iter::once(&question.correct_answer).chain(&question.incorrect_answers) {
        if !options.contains(answer) {
            options.push(answer.clone());
        }
    }
    options.shuffle(&mut rand::thread_rng());
    options
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub chosen: String,
    pub correct: bool,
    pub correct_answer: String,
    pub description: String,
}

impl AnswerOutcome {
    pub fn feedback(&self) -> String {
        if self.correct {
            format!("Correct! {}", self.description)
        } else {
            format!(
                "Incorrect! The answer is {}. {}",
                self.correct_answer, self.description
            )
        }
    }
}

/// One question on screen; only the first answer counts
#[derive(Debug, Clone)]
pub struct TriviaRound {
    question: Question,
    options: Vec<String>,
    outcome: Option<AnswerOutcome>,
}

impl TriviaRound {
    pub fn new(question: Question) -> Self {
        let options = present_options(&question);
        Self {
            question,
            options,
            outcome: None,
        }
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Record `chosen`. Returns `None` once an answer is already recorded.
    pub fn record_answer(&mut self, chosen: &str) -> Option<&AnswerOutcome> {
        if self.outcome.is_some() {
            return None;
        }
        self.outcome = Some(AnswerOutcome {
            chosen: chosen.to_string(),
            correct: chosen == self.question.correct_answer,
            correct_answer: self.question.correct_answer.clone(),
            description: self.question.description.clone(),
        });
        self.outcome.as_ref()
    }

    /// Answer by position in [`options`](Self::options)
    pub fn record_option(&mut self, option_idx: usize) -> Option<&AnswerOutcome> {
        let chosen = self.options.get(option_idx)?.clone();
        self.record_answer(&chosen)
    }

    /// Answer from typed input: a 1-based option number or the option text
    /// (case-insensitive). Input matching no option records nothing.
    pub fn record_input(&mut self, input: &str) -> Option<&AnswerOutcome> {
        let input = input.trim();
        if let Ok(n) = input.parse::<usize>() {
            return self.record_option(n.checked_sub(1)?);
        }
        let idx = self
            .options
            .iter()
            .position(|o| o.eq_ignore_ascii_case(input))?;
        self.record_option(idx)
    }

    pub fn outcome(&self) -> Option<&AnswerOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_answered(&self) -> bool {
        self.outcome.is_some()
    }
}

/// The fetched question pool
#[derive(Debug, Clone, Default)]
pub struct TriviaDeck {
    pool: Vec<Question>,
}

impl TriviaDeck {
    pub fn new(pool: Vec<Question>) -> Self {
        Self { pool }
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    pub fn next_round(&self) -> Result<TriviaRound, TriviaError> {
        select_random(&self.pool).map(|q| TriviaRound::new(q.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn question(correct: &str, incorrect: &[&str]) -> Question {
        Question {
            question: "Which muscle does a squat mainly train?".into(),
            correct_answer: correct.into(),
            incorrect_answers: incorrect.iter().map(|s| s.to_string()).collect(),
            description: "Quads do most of the work.".into(),
        }
    }

    #[test]
    fn test_select_random_empty_pool() {
        assert_eq!(select_random(&[]), Err(TriviaError::EmptyPool));
        assert!(TriviaDeck::default().next_round().is_err());
    }

    #[test]
    fn test_select_random_returns_member() {
        let pool = vec![question("A", &["B"]), question("C", &["D"])];
        for _ in 0..20 {
            let q = select_random(&pool).unwrap();
            assert!(pool.contains(q));
        }
    }

    #[test]
    fn test_present_options_exact_set() {
        let q = question("A", &["B", "C"]);
        let options = present_options(&q);
        assert_eq!(options.len(), 3);
        let set: HashSet<_> = options.iter().map(String::as_str).collect();
        assert_eq!(set, HashSet::from(["A", "B", "C"]));
    }

    #[test]
    fn test_present_options_dedups() {
        let q = question("A", &["B", "A", "B"]);
        let mut options = present_options(&q);
        options.sort();
        assert_eq!(options, vec!["A", "B"]);
    }

    #[test]
    fn test_decode_joined_incorrect_answers() {
        let json = r#"{
            "question": "Q",
            "correctanswer": "Quads",
            "incorrectanswers": "Biceps, Triceps, Calves",
            "description": "d"
        }"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.incorrect_answers, vec!["Biceps", "Triceps", "Calves"]);
        assert_eq!(q.correct_answer, "Quads");
    }

    #[test]
    fn test_decode_list_incorrect_answers() {
        let json = r#"{"question": "Q", "correctAnswer": "A", "incorrectAnswers": ["B", "C"]}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.incorrect_answers, vec!["B", "C"]);
        assert_eq!(q.description, "");
    }

    #[test]
    fn test_first_answer_wins() {
        let mut round = TriviaRound::new(question("A", &["B", "C"]));
        let outcome = round.record_answer("B").unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.correct_answer, "A");

        assert!(round.record_answer("A").is_none());
        assert_eq!(round.outcome().unwrap().chosen, "B");
        assert!(round.is_answered());
    }

    #[test]
    fn test_record_option_by_index() {
        let mut round = TriviaRound::new(question("A", &["B", "C"]));
        let idx = round.options().iter().position(|o| o == "A").unwrap();
        assert!(round.record_option(idx).unwrap().correct);
        assert!(round.record_option(99).is_none());
    }

    #[test]
    fn test_out_of_range_option_does_not_consume_round() {
        let mut round = TriviaRound::new(question("A", &["B"]));
        assert!(round.record_option(5).is_none());
        assert!(!round.is_answered());
    }

    #[test]
    fn test_feedback_text() {
        let mut round = TriviaRound::new(question("A", &["B"]));
        let text = round.record_answer("A").unwrap().feedback();
        assert!(text.starts_with("Correct!"));
    }

    #[test]
    fn test_decode_keeps_commas_inside_answers() {
        let json = r#"{
            "question": "How many reps in a thousand-rep challenge?",
            "correctanswer": "3,500",
            "incorrectanswers": "1,000, 2,000"
        }"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.incorrect_answers, vec!["1,000", "2,000"]);

        let mut options = present_options(&q);
        options.sort();
        assert_eq!(options, vec!["1,000", "2,000", "3,500"]);
    }

    #[test]
    fn test_record_input_matches_options_only() {
        let mut round = TriviaRound::new(question("Quads", &["Biceps"]));
        assert!(round.record_input("quadz").is_none());
        assert!(round.record_input("0").is_none());
        assert!(round.record_input("7").is_none());
        assert!(!round.is_answered());

        let outcome = round.record_input(" quads ").unwrap();
        assert!(outcome.correct);
        assert_eq!(outcome.chosen, "Quads");
    }

    #[test]
    fn test_record_input_by_number() {
        let mut round = TriviaRound::new(question("Quads", &["Biceps"]));
        let pos = round.options().iter().position(|o| o == "Biceps").unwrap();
        let outcome = round.record_input(&(pos + 1).to_string()).unwrap();
        assert!(!outcome.correct);
    }
}
