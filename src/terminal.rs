//! Plain terminal frontend: redraws the whole screen on every change and
//! turns typed lines into controller events.

use std::fmt::Write as _;
use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Print, Stylize};
use crossterm::terminal::{Clear, ClearType};
use log::{debug, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::quiz::controller::{Event, EventSender, OptionMark, Presentation, Screen};
use crate::quiz::error::QuizError;
use crate::quiz::{Answer, AnswerRecord, BATCH_SIZE, TIME_LIMIT};

struct OptionLine {
    text: String,
    mark: Option<OptionMark>,
}

pub struct Terminal<W: Write> {
    out: W,
    screen: Screen,
    progress: Option<(usize, usize)>,
    prompt: String,
    options: Vec<OptionLine>,
    options_enabled: bool,
    countdown: Option<u64>,
    error: Option<String>,
    results: Option<(usize, usize)>,
    review: Vec<AnswerRecord>,
}

impl Terminal<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Terminal<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            screen: Screen::Start,
            progress: None,
            prompt: String::new(),
            options: Vec::new(),
            options_enabled: false,
            countdown: None,
            error: None,
            results: None,
            review: Vec::new(),
        }
    }

    fn clear_quiz(&mut self) {
        self.progress = None;
        self.prompt.clear();
        self.options.clear();
        self.options_enabled = false;
        self.countdown = None;
        self.error = None;
    }

    fn redraw(&mut self) {
        let frame = self.render();
        let written = queue!(
            self.out,
            Clear(ClearType::All),
            MoveTo(0, 0),
            Print(frame)
        )
        .and_then(|_| self.out.flush());
        if let Err(err) = written {
            warn!("Failed to draw the quiz screen: {}", err);
        }
    }

    fn render(&self) -> String {
        let mut frame = String::new();
        // Writing into a String can't fail
        let _ = match self.screen {
            Screen::Start => self.render_start(&mut frame),
            Screen::Quiz => self.render_quiz(&mut frame),
            Screen::Result => self.render_result(&mut frame),
        };
        frame
    }

    fn render_start(&self, frame: &mut String) -> std::fmt::Result {
        writeln!(frame, "{}", "Trivia Quiz".bold())?;
        writeln!(frame)?;
        writeln!(
            frame,
            "{} questions, {} seconds each.",
            BATCH_SIZE, TIME_LIMIT
        )?;
        writeln!(frame)?;
        writeln!(frame, "{} start   {} quit", "Enter".dim(), "q".dim())
    }

    fn render_quiz(&self, frame: &mut String) -> std::fmt::Result {
        if let Some(error) = &self.error {
            writeln!(frame, "{}", error.as_str().red())?;
            writeln!(frame)?;
            return writeln!(frame, "{} restart   {} quit", "r".dim(), "q".dim());
        }

        match (self.progress, self.countdown) {
            (Some((number, total)), Some(seconds)) => writeln!(
                frame,
                "Question {number}/{total}    {}",
                format!("{seconds}s").bold()
            )?,
            (Some((number, total)), None) => writeln!(frame, "Question {number}/{total}")?,
            _ => {}
        }
        writeln!(frame)?;
        writeln!(frame, "{}", self.prompt.as_str().bold())?;
        writeln!(frame)?;

        for (index, option) in self.options.iter().enumerate() {
            let line = format!("{}) {}", index + 1, option.text);
            let line = match option.mark {
                Some(OptionMark::Correct) => format!("{line} ✓").green(),
                Some(OptionMark::Incorrect) => format!("{line} ✗").red(),
                None if self.options_enabled => line.stylize(),
                None => line.dim(),
            };
            writeln!(frame, "  {line}")?;
        }

        if self.options_enabled {
            writeln!(frame)?;
            writeln!(
                frame,
                "{} answer   {} restart   {} quit",
                format!("1-{}", self.options.len()).dim(),
                "r".dim(),
                "q".dim()
            )?;
        }
        Ok(())
    }

    fn render_result(&self, frame: &mut String) -> std::fmt::Result {
        writeln!(frame, "{}", "Quiz complete!".bold())?;
        if let Some((score, total)) = self.results {
            writeln!(frame, "You scored {} out of {total}", score.to_string().bold())?;
        }
        writeln!(frame)?;

        for (index, item) in self.review.iter().enumerate() {
            writeln!(frame, "{}. {}", index + 1, item.question)?;
            let answer = item.user_answer.as_str();
            let answer = if item.is_correct {
                answer.green()
            } else {
                answer.red()
            };
            write!(frame, "   You: {answer}")?;
            if !item.is_correct {
                write!(frame, " | Correct: {}", item.correct_answer.as_str().green())?;
            }
            writeln!(frame)?;
        }

        writeln!(frame)?;
        writeln!(frame, "{} play again   {} quit", "r".dim(), "q".dim())
    }
}

impl<W: Write> Presentation for Terminal<W> {
    fn switch_screen(&mut self, screen: Screen) {
        self.screen = screen;
        match screen {
            Screen::Start => {
                self.clear_quiz();
                self.results = None;
                self.review.clear();
            }
            Screen::Quiz => self.clear_quiz(),
            Screen::Result => {}
        }
        self.redraw();
    }

    fn show_progress(&mut self, number: usize, total: usize) {
        self.progress = Some((number, total));
        self.redraw();
    }

    fn show_prompt(&mut self, text: &str) {
        self.prompt = text.to_string();
        self.redraw();
    }

    fn show_options(&mut self, options: &[Answer]) {
        self.options = options
            .iter()
            .map(|a| OptionLine {
                text: a.text.clone(),
                mark: None,
            })
            .collect();
        self.options_enabled = true;
        self.redraw();
    }

    fn update_countdown(&mut self, seconds_remaining: u64) {
        self.countdown = Some(seconds_remaining);
        self.redraw();
    }

    fn mark_option(&mut self, index: usize, mark: OptionMark) {
        if let Some(option) = self.options.get_mut(index) {
            option.mark = Some(mark);
        }
        self.redraw();
    }

    fn disable_options(&mut self) {
        self.options_enabled = false;
        self.countdown = None;
        self.redraw();
    }

    fn show_results(&mut self, score: usize, total: usize) {
        self.results = Some((score, total));
        self.redraw();
    }

    fn show_review(&mut self, review: &[AnswerRecord]) {
        self.review = review.to_vec();
        self.redraw();
    }

    fn show_error(&mut self, error: &QuizError) {
        self.clear_quiz();
        self.error = Some(format!("{}. Please restart.", error));
        self.redraw();
    }
}

/// Map one typed line to an event. Options are numbered from 1.
pub fn parse_command(line: &str) -> Option<Event> {
    match line.trim().to_lowercase().as_str() {
        "" | "s" | "start" => Some(Event::Start),
        "r" | "restart" => Some(Event::Restart),
        "q" | "quit" | "exit" => Some(Event::Quit),
        other => match other.parse::<usize>() {
            Ok(number) if number >= 1 => Some(Event::OptionSelected(number - 1)),
            _ => None,
        },
    }
}

/// Forward stdin lines to the controller until it hangs up or stdin closes.
pub async fn read_input(events: EventSender) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_command(&line) {
                // Stop reading right away; a pending stdin read would keep
                // the runtime from shutting down
                Some(Event::Quit) => break,
                Some(event) => {
                    if events.send(event).is_err() {
                        return;
                    }
                }
                None => debug!("Unrecognised input {:?}", line),
            },
            Ok(None) => break,
            Err(err) => {
                warn!("Failed to read input: {}", err);
                break;
            }
        }
    }
    let _ = events.send(Event::Quit);
}
