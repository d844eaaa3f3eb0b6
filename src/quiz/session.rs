//! Quiz session state and its transitions.
//!
//! Nothing in here touches the terminal, the network or a clock: every
//! method takes the current state, applies one stimulus and reports what
//! happened so the controller can render it and arm the right timer.

use crate::quiz::{Answer, AnswerRecord, Question};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    NotStarted,
    AwaitingAnswer,
    Revealing,
    Complete,
}

/// Outcome of resolving the question on screen, by selection or time out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub record: AnswerRecord,
    /// Option the user picked, `None` when the countdown ran out.
    pub selected: Option<usize>,
    /// Option holding the correct answer.
    pub correct: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    questions: Vec<Question>,
    options: Vec<Answer>,
    current_index: usize,
    score: usize,
    answer_log: Vec<AnswerRecord>,
    phase: Phase,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh session over `questions`, waiting on the first one.
    pub fn begin(questions: Vec<Question>) -> Self {
        let phase = if questions.is_empty() {
            Phase::Complete
        } else {
            Phase::AwaitingAnswer
        };
        let mut state = Self {
            questions,
            phase,
            ..Default::default()
        };
        state.shuffle_options();
        state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn answer_log(&self) -> &[AnswerRecord] {
        &self.answer_log
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            Phase::AwaitingAnswer | Phase::Revealing => self.questions.get(self.current_index),
            Phase::NotStarted | Phase::Complete => None,
        }
    }

    /// Shuffled options of the question on screen.
    pub fn options(&self) -> &[Answer] {
        &self.options
    }

    /// Resolve the current question with the option at `index`.
    ///
    /// Returns `None`, leaving the state untouched, unless the session is
    /// waiting on an answer and `index` names one of the options.
    pub fn select(&mut self, index: usize) -> Option<Resolution> {
        if self.phase != Phase::AwaitingAnswer {
            return None;
        }
        let selected = self.options.get(index)?;
        let question = self.questions.get(self.current_index)?;

        let is_correct = selected.text == question.correct_answer;
        if is_correct {
            self.score += 1;
        }
        let record = AnswerRecord {
            question: question.text.clone(),
            is_correct,
            user_answer: selected.text.clone(),
            correct_answer: question.correct_answer.clone(),
        };
        Some(self.resolve(record, Some(index)))
    }

    /// Resolve the current question with the answer text the user picked.
    /// Duplicate texts resolve to the first matching option.
    pub fn select_text(&mut self, selected: &str) -> Option<Resolution> {
        let index = self.options.iter().position(|a| a.text == selected)?;
        self.select(index)
    }

    /// Resolve the current question as unanswered.
    pub fn time_out(&mut self) -> Option<Resolution> {
        if self.phase != Phase::AwaitingAnswer {
            return None;
        }
        let record = AnswerRecord::timed_out(self.questions.get(self.current_index)?);
        Some(self.resolve(record, None))
    }

    fn resolve(&mut self, record: AnswerRecord, selected: Option<usize>) -> Resolution {
        let correct = self
            .options
            .iter()
            .position(|a| a.is_correct)
            .unwrap_or_default();
        self.answer_log.push(record.clone());
        self.phase = Phase::Revealing;
        Resolution {
            record,
            selected,
            correct,
        }
    }

    /// Move past a revealed question. Returns the phase entered, or `None`
    /// if nothing was being revealed.
    pub fn advance(&mut self) -> Option<Phase> {
        if self.phase != Phase::Revealing {
            return None;
        }
        self.current_index += 1;
        if self.current_index < self.questions.len() {
            self.phase = Phase::AwaitingAnswer;
            self.shuffle_options();
        } else {
            self.phase = Phase::Complete;
            self.options.clear();
        }
        Some(self.phase)
    }

    /// Back to an empty session that has not started.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn shuffle_options(&mut self) {
        self.options = self
            .questions
            .get(self.current_index)
            .map(Question::shuffled_answers)
            .unwrap_or_default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(n: usize) -> Question {
        Question::new(
            format!("Question {n}"),
            format!("right {n}"),
            vec![
                format!("wrong {n}a"),
                format!("wrong {n}b"),
                format!("wrong {n}c"),
            ],
        )
    }

    fn batch(len: usize) -> Vec<Question> {
        (0..len).map(question).collect()
    }

    fn correct_index(state: &SessionState) -> usize {
        state.options().iter().position(|a| a.is_correct).unwrap()
    }

    fn wrong_index(state: &SessionState) -> usize {
        state.options().iter().position(|a| !a.is_correct).unwrap()
    }

    fn assert_score_matches_log(state: &SessionState) {
        let correct = state.answer_log().iter().filter(|r| r.is_correct).count();
        assert_eq!(state.score(), correct);
        for record in state.answer_log() {
            if record.is_correct {
                assert_eq!(record.user_answer, record.correct_answer);
            }
        }
    }

    #[test]
    fn new_session_has_not_started() {
        let state = SessionState::new();
        assert_eq!(state.phase(), Phase::NotStarted);
        assert_eq!(state.current_index(), 0);
        assert_eq!(state.score(), 0);
        assert!(state.answer_log().is_empty());
        assert!(state.current_question().is_none());
    }

    #[test]
    fn begin_waits_on_first_question_with_four_options() {
        let state = SessionState::begin(batch(10));
        assert_eq!(state.phase(), Phase::AwaitingAnswer);
        assert_eq!(state.total(), 10);
        assert_eq!(state.current_question().unwrap().text, "Question 0");
        assert_eq!(state.options().len(), 4);
    }

    #[test]
    fn correct_selection_scores_and_completes_single_question() {
        let mut state = SessionState::begin(batch(1));
        let index = correct_index(&state);

        let resolution = state.select(index).unwrap();
        assert!(resolution.record.is_correct);
        assert_eq!(resolution.selected, Some(index));
        assert_eq!(resolution.correct, index);
        assert_eq!(state.phase(), Phase::Revealing);
        assert_eq!(state.score(), 1);

        assert_eq!(state.advance(), Some(Phase::Complete));
        assert_eq!(state.answer_log().len(), 1);
        assert!(state.answer_log()[0].is_correct);
        assert_eq!(state.current_index(), state.answer_log().len());
    }

    #[test]
    fn wrong_selection_reports_correct_option() {
        let mut state = SessionState::begin(batch(1));
        let wrong = wrong_index(&state);
        let correct = correct_index(&state);

        let resolution = state.select(wrong).unwrap();
        assert!(!resolution.record.is_correct);
        assert_eq!(resolution.record.correct_answer, "right 0");
        assert_ne!(resolution.record.user_answer, "right 0");
        assert_eq!(resolution.correct, correct);
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn time_out_records_sentinel() {
        let mut state = SessionState::begin(batch(1));

        let resolution = state.time_out().unwrap();
        assert_eq!(resolution.selected, None);
        assert_eq!(resolution.record.user_answer, "Time Out");
        assert!(!resolution.record.is_correct);
        assert_eq!(state.score(), 0);
        assert_eq!(state.advance(), Some(Phase::Complete));
    }

    #[test]
    fn only_first_resolution_counts() {
        let mut state = SessionState::begin(batch(1));
        let index = correct_index(&state);

        assert!(state.time_out().is_some());
        assert!(state.select(index).is_none());
        assert!(state.time_out().is_none());

        assert_eq!(state.answer_log().len(), 1);
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn selection_by_unknown_text_or_index_is_ignored() {
        let mut state = SessionState::begin(batch(1));
        assert!(state.select(4).is_none());
        assert!(state.select_text("not an option").is_none());
        assert_eq!(state.phase(), Phase::AwaitingAnswer);
        assert!(state.answer_log().is_empty());
    }

    #[test]
    fn select_text_matches_by_answer() {
        let mut state = SessionState::begin(batch(1));
        let resolution = state.select_text("right 0").unwrap();
        assert!(resolution.record.is_correct);
        assert_eq!(state.score(), 1);
    }

    #[test]
    fn duplicate_option_texts_report_the_clicked_index() {
        let mut state = SessionState::begin(vec![Question::new(
            "Pick one".to_string(),
            "A".to_string(),
            vec!["B".to_string(), "B".to_string(), "C".to_string()],
        )]);
        let clicked = state
            .options()
            .iter()
            .rposition(|a| a.text == "B")
            .unwrap();

        let resolution = state.select(clicked).unwrap();
        assert_eq!(resolution.selected, Some(clicked));
        assert_eq!(resolution.record.user_answer, "B");
        assert!(!resolution.record.is_correct);
        assert_eq!(
            resolution.correct,
            state.options().iter().position(|a| a.text == "A").unwrap()
        );
    }

    #[test]
    fn advance_only_leaves_revealing() {
        let mut state = SessionState::begin(batch(2));
        assert_eq!(state.advance(), None);
        assert_eq!(state.current_index(), 0);

        state.time_out();
        assert_eq!(state.advance(), Some(Phase::AwaitingAnswer));
        assert_eq!(state.advance(), None);
        assert_eq!(state.current_question().unwrap().text, "Question 1");
    }

    #[test]
    fn log_tracks_index_through_a_full_batch() {
        let mut state = SessionState::begin(batch(10));
        for n in 0..10 {
            if n % 3 == 0 {
                state.time_out();
            } else if n % 2 == 0 {
                let index = correct_index(&state);
                state.select(index);
            } else {
                let index = wrong_index(&state);
                state.select(index);
            }
            assert_score_matches_log(&state);
            state.advance();
            assert_eq!(state.answer_log().len(), state.current_index());
            assert!(state.score() <= state.answer_log().len());
        }

        assert_eq!(state.phase(), Phase::Complete);
        let questions = state
            .answer_log()
            .iter()
            .map(|r| r.question.clone())
            .collect::<Vec<_>>();
        let expected = (0..10).map(|n| format!("Question {n}")).collect::<Vec<_>>();
        assert_eq!(questions, expected);
    }

    #[test]
    fn reset_after_complete_clears_everything() {
        let mut state = SessionState::begin(batch(1));
        let index = correct_index(&state);
        state.select(index);
        state.advance();
        assert_eq!(state.phase(), Phase::Complete);

        state.reset();
        assert_eq!(state.phase(), Phase::NotStarted);
        assert_eq!(state.current_index(), 0);
        assert_eq!(state.score(), 0);
        assert!(state.answer_log().is_empty());
        assert_eq!(state.total(), 0);
    }
}
