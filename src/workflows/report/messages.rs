use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::domain::{Answer, PlaceId, Question, ResponseType, Survey};
use super::interval::ReportingInterval;

/// Every text message the report command can send back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    NoSurveyFound,
    RegisterFirst,
    NoPlaceAssigned,
    Questions,
    NumericInputRequired,
    Confirm,
    GeneralError,
}

impl MessageKind {
    pub const ALL: [MessageKind; 7] = [
        MessageKind::NoSurveyFound,
        MessageKind::RegisterFirst,
        MessageKind::NoPlaceAssigned,
        MessageKind::Questions,
        MessageKind::NumericInputRequired,
        MessageKind::Confirm,
        MessageKind::GeneralError,
    ];

    fn default_template(&self) -> &'static str {
        match self {
            MessageKind::NoSurveyFound => "No survey found for this phone number.",
            MessageKind::RegisterFirst => {
                "This phone number has not yet been registered - text the \"register\" command to sign up."
            }
            MessageKind::NoPlaceAssigned => {
                "This phone number is not yet assigned to a reporting location - please contact your supervisor."
            }
            MessageKind::Questions => "[MSF]: Please enter the following data for {place} in {interval}:",
            MessageKind::NumericInputRequired => "Error: numeric input required for {question}.",
            MessageKind::Confirm => {
                "About to submit the following data for {place} in {interval}:\n{responses} \nText \"confirm <any comments>\" to confirm and submit this data."
            }
            MessageKind::GeneralError => {
                "Sorry, there was a problem with the system.  Please try again."
            }
        }
    }
}

/// Errors raised while loading template overrides.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("unable to read message templates from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("message templates in {path} are not valid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Template lookup for outbound SMS text. Templates use `{name}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCatalog {
    templates: BTreeMap<MessageKind, String>,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        let templates = MessageKind::ALL
            .iter()
            .map(|kind| (*kind, kind.default_template().to_string()))
            .collect();
        Self { templates }
    }
}

impl MessageCatalog {
    /// Built-in templates with any kinds present in `overrides` replaced.
    pub fn with_overrides(overrides: BTreeMap<MessageKind, String>) -> Self {
        let mut catalog = Self::default();
        catalog.templates.extend(overrides);
        catalog
    }

    /// Load overrides from a JSON object keyed by snake_case message kind.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let overrides: BTreeMap<MessageKind, String> =
            serde_json::from_str(&raw).map_err(|source| CatalogError::Json {
                path: path.display().to_string(),
                source,
            })?;
        Ok(Self::with_overrides(overrides))
    }

    pub fn template(&self, kind: MessageKind) -> &str {
        self.templates
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_else(|| kind.default_template())
    }

    pub fn render(&self, kind: MessageKind, values: &[(&str, &str)]) -> String {
        values
            .iter()
            .fold(self.template(kind).to_string(), |text, (name, value)| {
                text.replace(&format!("{{{name}}}"), value)
            })
    }

    /// Heading plus one question summary per line.
    pub fn questions(
        &self,
        place: &PlaceId,
        interval: &ReportingInterval,
        survey: &Survey,
    ) -> String {
        let interval = interval.label();
        let heading = self.render(
            MessageKind::Questions,
            &[("place", place.0.as_str()), ("interval", interval.as_str())],
        );
        let summaries: Vec<&str> = survey.summaries().collect();
        format!("{heading}\n{}", summaries.join(",\n"))
    }

    pub fn numeric_input_required(
        &self,
        question: &str,
        place: &PlaceId,
        interval: &ReportingInterval,
        survey: &Survey,
    ) -> String {
        let error = self.render(MessageKind::NumericInputRequired, &[("question", question)]);
        format!("{error} {}", self.questions(place, interval, survey))
    }

    pub fn confirm(
        &self,
        place: &PlaceId,
        interval: &ReportingInterval,
        questions: &[Question],
        answers: &[Answer],
    ) -> String {
        let interval = interval.label();
        let responses = echo_answers(questions, answers);
        self.render(
            MessageKind::Confirm,
            &[
                ("place", place.0.as_str()),
                ("interval", interval.as_str()),
                ("responses", responses.as_str()),
            ],
        )
    }
}

fn echo_answers(questions: &[Question], answers: &[Answer]) -> String {
    questions
        .iter()
        .zip(answers)
        .map(|(question, answer)| {
            let value = match (question.response_type, answer.number_response) {
                (ResponseType::Number, None) => "Unknown",
                _ => answer.text_response.as_str(),
            };
            format!("{}: {}\n", question.summary_text, value)
        })
        .collect()
}
