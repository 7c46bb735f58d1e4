use serde::{Deserialize, Serialize};

use super::interval::ReportingInterval;

/// Identifier wrapper for survey definitions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurveyId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestionId(pub String);

/// Identifier wrapper for registered reporters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReporterId(pub String);

/// Health facility or district a reporter submits data for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaceId(pub String);

/// Sender number exactly as delivered by the SMS gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber(pub String);

/// Expected answer type for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    Number,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub response_type: ResponseType,
    pub summary_text: String,
}

/// Ordered question schema. Question position maps 1:1 to the position of the
/// answer token in an inbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Survey {
    pub id: SurveyId,
    pub questions: Vec<Question>,
}

impl Survey {
    pub fn summaries(&self) -> impl Iterator<Item = &str> {
        self.questions
            .iter()
            .map(|question| question.summary_text.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reporter {
    pub id: ReporterId,
    pub phone_numbers: Vec<PhoneNumber>,
    #[serde(default)]
    pub place_ids: Vec<PlaceId>,
}

impl Reporter {
    pub fn has_phone(&self, phone_number: &PhoneNumber) -> bool {
        self.phone_numbers.iter().any(|number| number == phone_number)
    }

    /// Place the reporter currently submits for. Only the first association is
    /// addressed by SMS reporting.
    pub fn primary_place(&self) -> Option<&PlaceId> {
        self.place_ids.first()
    }
}

/// A single parsed answer. `number_response` is only ever populated for numeric
/// questions; `None` on a numeric question means the reporter sent "U" (unknown).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: QuestionId,
    pub text_response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_response: Option<f64>,
}

/// Identity of the one draft that may exist per survey, reporter, place and
/// reporting interval.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DraftKey {
    pub survey_id: SurveyId,
    pub reporter_id: ReporterId,
    pub place_id: PlaceId,
    pub interval: ReportingInterval,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftResponse {
    pub key: DraftKey,
    pub phone_number: PhoneNumber,
    pub complete: bool,
    pub comment_text: String,
    pub answers: Vec<Answer>,
}

impl DraftResponse {
    pub fn new(key: DraftKey, phone_number: PhoneNumber, answers: Vec<Answer>) -> Self {
        Self {
            key,
            phone_number,
            complete: false,
            comment_text: String::new(),
            answers,
        }
    }

    /// Replace everything a submission controls, leaving only the key intact.
    pub fn overwrite(&mut self, phone_number: PhoneNumber, answers: Vec<Answer>) {
        self.phone_number = phone_number;
        self.complete = false;
        self.comment_text.clear();
        self.answers = answers;
    }
}
