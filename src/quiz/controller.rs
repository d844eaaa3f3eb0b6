//! Drives a quiz session: turns input, fetch and timer events into state
//! transitions and render calls.

use std::future::Future;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time;

use crate::quiz::error::{QuizError, SourceError};
use crate::quiz::session::{Phase, Resolution, SessionState};
use crate::quiz::source::QuestionSource;
use crate::quiz::{
    Answer, AnswerRecord, Question, BATCH_SIZE, COUNTDOWN_TICK, REVEAL_DELAY, TIMEOUT_DELAY,
    TIME_LIMIT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Start,
    Quiz,
    Result,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    Correct,
    Incorrect,
}

/// Everything the controller can be told. Events posted by background tasks
/// carry the generation they were started under; anything older than the
/// current one is stale.
#[derive(Debug)]
pub enum Event {
    Start,
    BatchLoaded {
        generation: u64,
        result: Result<Vec<Question>, SourceError>,
    },
    OptionSelected(usize),
    Tick { generation: u64, remaining: u64 },
    TimeExpired { generation: u64 },
    Advance { generation: u64 },
    Restart,
    Quit,
}

pub type EventSender = UnboundedSender<Event>;

/// Render side of the quiz. Selections come back as [`Event::OptionSelected`]
/// carrying the index into the slice passed to `show_options`.
pub trait Presentation {
    fn switch_screen(&mut self, screen: Screen);
    fn show_progress(&mut self, number: usize, total: usize);
    fn show_prompt(&mut self, text: &str);
    fn show_options(&mut self, options: &[Answer]);
    fn update_countdown(&mut self, seconds_remaining: u64);
    fn mark_option(&mut self, index: usize, mark: OptionMark);
    fn disable_options(&mut self);
    fn show_results(&mut self, score: usize, total: usize);
    fn show_review(&mut self, review: &[AnswerRecord]);
    fn show_error(&mut self, error: &QuizError);
}

/// Background work of the current phase: the batch fetch, the countdown or
/// the delayed advance.
struct Tasks {
    events: EventSender,
    generation: u64,
    handles: Vec<JoinHandle<()>>,
}

impl Tasks {
    fn new(events: EventSender) -> Self {
        Self {
            events,
            generation: 0,
            handles: Vec::new(),
        }
    }

    /// Abort every pending task and invalidate messages they may already
    /// have queued.
    fn cancel(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
        self.generation += 1;
    }

    fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handles.retain(|handle| !handle.is_finished());
        self.handles.push(tokio::spawn(task));
    }

    fn fetch_batch<S>(&mut self, source: Arc<S>)
    where
        S: QuestionSource + Send + Sync + 'static,
    {
        let generation = self.generation;
        let events = self.events.clone();
        self.spawn(async move {
            let result = source.fetch_batch(BATCH_SIZE).await;
            let _ = events.send(Event::BatchLoaded { generation, result });
        });
    }

    fn start_countdown(&mut self, seconds: u64) {
        let generation = self.generation;
        let events = self.events.clone();
        self.spawn(async move {
            let mut interval = time::interval(COUNTDOWN_TICK);
            // The first tick completes immediately
            interval.tick().await;
            for remaining in (0..seconds).rev() {
                interval.tick().await;
                if events.send(Event::Tick { generation, remaining }).is_err() {
                    return;
                }
            }
            let _ = events.send(Event::TimeExpired { generation });
        });
    }

    fn schedule_advance(&mut self, delay: Duration) {
        let generation = self.generation;
        let events = self.events.clone();
        self.spawn(async move {
            time::sleep(delay).await;
            let _ = events.send(Event::Advance { generation });
        });
    }
}

pub struct Controller<S, P> {
    source: Arc<S>,
    presentation: P,
    state: SessionState,
    tasks: Tasks,
    /// A batch request is in flight.
    loading: bool,
    /// Set when the batch could not be fetched; only a restart clears it.
    halted: bool,
}

impl<S, P> Controller<S, P>
where
    S: QuestionSource + Send + Sync + 'static,
    P: Presentation,
{
    /// `events` must feed the receiver later handed to [`Controller::run`];
    /// background tasks post to it.
    pub fn new(source: S, presentation: P, events: EventSender) -> Self {
        Self {
            source: Arc::new(source),
            presentation,
            state: SessionState::new(),
            tasks: Tasks::new(events),
            loading: false,
            halted: false,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    /// Process events one at a time until a quit arrives or every sender is
    /// gone.
    pub async fn run(mut self, mut inbox: UnboundedReceiver<Event>) {
        self.presentation.switch_screen(Screen::Start);
        while let Some(event) = inbox.recv().await {
            if self.handle(event).is_break() {
                break;
            }
        }
        self.tasks.cancel();
        info!("Quiz closed");
    }

    pub fn handle(&mut self, event: Event) -> ControlFlow<()> {
        match event {
            Event::Start => self.start(),
            Event::BatchLoaded { generation, result } => {
                if self.tasks.is_current(generation) {
                    self.on_batch_loaded(result);
                } else {
                    debug!("Dropping stale batch from generation {}", generation);
                }
            }
            Event::OptionSelected(index) => self.on_option_selected(index),
            Event::Tick {
                generation,
                remaining,
            } => {
                if self.tasks.is_current(generation) {
                    self.presentation.update_countdown(remaining);
                }
            }
            Event::TimeExpired { generation } => {
                if self.tasks.is_current(generation) {
                    self.on_time_expired();
                } else {
                    debug!("Dropping stale time out from generation {}", generation);
                }
            }
            Event::Advance { generation } => {
                if self.tasks.is_current(generation) {
                    self.advance();
                } else {
                    debug!("Dropping stale advance from generation {}", generation);
                }
            }
            Event::Restart => self.restart(),
            Event::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn start(&mut self) {
        if self.state.phase() != Phase::NotStarted || self.loading || self.halted {
            debug!("Ignoring start in phase {:?}", self.state.phase());
            return;
        }

        self.presentation.switch_screen(Screen::Quiz);
        self.presentation.show_prompt("Loading questions...");

        self.loading = true;
        self.tasks.cancel();
        self.tasks.fetch_batch(Arc::clone(&self.source));
    }

    fn on_batch_loaded(&mut self, result: Result<Vec<Question>, SourceError>) {
        self.loading = false;
        self.tasks.cancel();
        match result {
            Ok(questions) => {
                info!("Starting quiz with {} questions", questions.len());
                self.state = SessionState::begin(questions);
                match self.state.phase() {
                    Phase::Complete => self.show_results(),
                    _ => self.present_current_question(),
                }
            }
            Err(err) => {
                let err = QuizError::from(err);
                error!("{}", err);
                self.halted = true;
                self.presentation.show_error(&err);
            }
        }
    }

    fn present_current_question(&mut self) {
        let Some(question) = self.state.current_question() else {
            return;
        };

        self.presentation
            .show_progress(self.state.current_index() + 1, self.state.total());
        self.presentation.show_prompt(&question.text);
        self.presentation.show_options(self.state.options());
        self.presentation.update_countdown(TIME_LIMIT);
        self.tasks.start_countdown(TIME_LIMIT);
    }

    fn on_option_selected(&mut self, index: usize) {
        let Some(resolution) = self.state.select(index) else {
            debug!(
                "Ignoring selection {} in phase {:?}",
                index,
                self.state.phase()
            );
            return;
        };
        self.tasks.cancel();
        self.reveal(&resolution);
        self.tasks.schedule_advance(REVEAL_DELAY);
    }

    fn on_time_expired(&mut self) {
        let Some(resolution) = self.state.time_out() else {
            return;
        };
        info!("Time out on question {}", self.state.current_index() + 1);
        self.tasks.cancel();
        self.reveal(&resolution);
        self.tasks.schedule_advance(TIMEOUT_DELAY);
    }

    fn reveal(&mut self, resolution: &Resolution) {
        match resolution.selected {
            Some(selected) if resolution.record.is_correct => {
                self.presentation.mark_option(selected, OptionMark::Correct);
            }
            Some(selected) => {
                self.presentation
                    .mark_option(selected, OptionMark::Incorrect);
                self.presentation
                    .mark_option(resolution.correct, OptionMark::Correct);
            }
            None => {
                self.presentation
                    .mark_option(resolution.correct, OptionMark::Correct);
            }
        }
        self.presentation.disable_options();
    }

    fn advance(&mut self) {
        let Some(phase) = self.state.advance() else {
            return;
        };
        self.tasks.cancel();
        match phase {
            Phase::AwaitingAnswer => self.present_current_question(),
            Phase::Complete => self.show_results(),
            Phase::NotStarted | Phase::Revealing => {}
        }
    }

    fn show_results(&mut self) {
        info!(
            "Quiz complete: {} of {} correct",
            self.state.score(),
            self.state.total()
        );
        self.presentation.switch_screen(Screen::Result);
        self.presentation
            .show_results(self.state.score(), self.state.total());
        self.presentation.show_review(self.state.answer_log());
    }

    fn restart(&mut self) {
        self.tasks.cancel();
        self.state.reset();
        self.loading = false;
        self.halted = false;
        self.presentation.switch_screen(Screen::Start);
    }
}
