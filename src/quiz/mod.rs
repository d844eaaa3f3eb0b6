pub mod controller;
pub mod error;
pub mod session;
pub mod source;

use std::time::Duration;

use rand::seq::SliceRandom;

/// Questions requested from the question bank per session.
pub const BATCH_SIZE: usize = 10;
/// Seconds the user has to answer a question.
pub const TIME_LIMIT: u64 = 30;
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);
/// Pause after the user picked an option, before the next question.
pub const REVEAL_DELAY: Duration = Duration::from_millis(1500);
/// Pause after the countdown ran out, before the next question.
pub const TIMEOUT_DELAY: Duration = Duration::from_millis(2000);

/// Recorded in place of the user's answer when the countdown ran out.
pub const TIME_OUT_ANSWER: &str = "Time Out";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    pub correct_answer: String,
    pub incorrect_answers: Vec<String>,
    pub category: String,
    pub difficulty: String,
}

impl Question {
    pub fn new(
        text: String,
        correct_answer: String,
        incorrect_answers: Vec<String>,
    ) -> Self {
        Self {
            text,
            correct_answer,
            incorrect_answers,
            ..Default::default()
        }
    }

    /// Correct and incorrect answers mixed into one option set, shuffled so
    /// the correct one isn't always in the same spot.
    pub fn shuffled_answers(&self) -> Vec<Answer> {
        let mut answers = self
            .incorrect_answers
            .iter()
            .map(|text| Answer::new(text.clone(), false))
            .collect::<Vec<_>>();
        answers.push(Answer::new(self.correct_answer.clone(), true));
        answers.shuffle(&mut rand::thread_rng());
        answers
    }
}

/// One selectable option of the question on screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub is_correct: bool,
}
impl Answer {
    pub fn new(text: String, is_correct: bool) -> Self {
        Self { text, is_correct }
    }
}

/// How a single question was resolved. Never changed after it is logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub question: String,
    pub is_correct: bool,
    pub user_answer: String,
    pub correct_answer: String,
}

impl AnswerRecord {
    pub fn timed_out(question: &Question) -> Self {
        Self {
            question: question.text.clone(),
            is_correct: false,
            user_answer: TIME_OUT_ANSWER.to_string(),
            correct_answer: question.correct_answer.clone(),
        }
    }

    pub fn is_time_out(&self) -> bool {
        !self.is_correct && self.user_answer == TIME_OUT_ANSWER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> Question {
        Question::new(
            "Which planet is known as the Red Planet?".to_string(),
            "Mars".to_string(),
            vec![
                "Venus".to_string(),
                "Jupiter".to_string(),
                "Saturn".to_string(),
            ],
        )
    }

    #[test]
    fn shuffle_keeps_every_answer_exactly_once() {
        let question = question();
        for _ in 0..50 {
            let answers = question.shuffled_answers();
            assert_eq!(answers.len(), 4);

            let mut texts = answers.iter().map(|a| a.text.as_str()).collect::<Vec<_>>();
            texts.sort_unstable();
            assert_eq!(texts, vec!["Jupiter", "Mars", "Saturn", "Venus"]);

            let correct = answers.iter().filter(|a| a.is_correct).collect::<Vec<_>>();
            assert_eq!(correct.len(), 1);
            assert_eq!(correct[0].text, "Mars");
        }
    }

    #[test]
    fn shuffle_moves_the_correct_answer_around() {
        let question = question();
        let positions = (0..200)
            .map(|_| {
                question
                    .shuffled_answers()
                    .iter()
                    .position(|a| a.is_correct)
                    .unwrap()
            })
            .collect::<std::collections::HashSet<_>>();
        // 200 draws landing on a single slot would mean the shuffle is broken
        assert!(positions.len() > 1);
    }

    #[test]
    fn timed_out_record_uses_sentinel() {
        let record = AnswerRecord::timed_out(&question());
        assert!(!record.is_correct);
        assert!(record.is_time_out());
        assert_eq!(record.user_answer, "Time Out");
        assert_eq!(record.correct_answer, "Mars");
    }
}
