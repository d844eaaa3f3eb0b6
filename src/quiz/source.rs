//! Where question batches come from.

use std::future::Future;
use std::time::Duration;

use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;

use crate::quiz::error::SourceError;
use crate::quiz::Question;

/// Incorrect answers every multiple-choice question must carry.
const INCORRECT_ANSWERS: usize = 3;

pub trait QuestionSource {
    /// Fetch `amount` multiple-choice questions in one go.
    fn fetch_batch(
        &self,
        amount: usize,
    ) -> impl Future<Output = Result<Vec<Question>, SourceError>> + Send;
}

/// Open Trivia DB (`https://opentdb.com`) client.
pub struct OpenTdbSource {
    client: Client,
    api_url: String,
}

impl OpenTdbSource {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }
}

impl QuestionSource for OpenTdbSource {
    async fn fetch_batch(&self, amount: usize) -> Result<Vec<Question>, SourceError> {
        info!("Fetching {} questions from {}", amount, self.api_url);
        let response = self
            .client
            .get(&self.api_url)
            .query(&[("amount", amount.to_string().as_str()), ("type", "multiple")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::HttpStatus(status));
        }

        let body = response.text().await?;
        let questions = parse_batch(&body)?;
        debug!("Received {} questions", questions.len());
        Ok(questions)
    }
}

#[derive(Debug, Deserialize)]
struct OpenTdbResponse {
    response_code: u8,
    #[serde(default)]
    results: Vec<OpenTdbQuestion>,
}

#[derive(Debug, Deserialize)]
struct OpenTdbQuestion {
    #[serde(default)]
    category: String,
    #[serde(default)]
    difficulty: String,
    question: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
}

impl OpenTdbResponse {
    fn into_questions(self) -> Result<Vec<Question>, SourceError> {
        if self.response_code != 0 {
            return Err(SourceError::ResponseCode(self.response_code));
        }
        if self.results.is_empty() {
            return Err(SourceError::Empty);
        }
        self.results
            .into_iter()
            .map(OpenTdbQuestion::into_question)
            .collect()
    }
}

impl OpenTdbQuestion {
    fn into_question(self) -> Result<Question, SourceError> {
        if self.incorrect_answers.len() != INCORRECT_ANSWERS {
            return Err(SourceError::Malformed(format!(
                "expected {} incorrect answers, got {} for {:?}",
                INCORRECT_ANSWERS,
                self.incorrect_answers.len(),
                self.question
            )));
        }

        Ok(Question {
            text: decode_html(&self.question),
            correct_answer: decode_html(&self.correct_answer),
            incorrect_answers: self
                .incorrect_answers
                .iter()
                .map(|a| decode_html(a))
                .collect(),
            category: decode_html(&self.category),
            difficulty: self.difficulty,
        })
    }
}

/// Turns entity escapes such as `&quot;` or `&#039;` into plain text.
pub fn decode_html(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

/// Parse a raw Open Trivia DB payload.
pub fn parse_batch(payload: &str) -> Result<Vec<Question>, SourceError> {
    let response: OpenTdbResponse = serde_json::from_str(payload)
        .map_err(|e| SourceError::Malformed(e.to_string()))?;
    response.into_questions()
}
