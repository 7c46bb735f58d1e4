use super::domain::{Answer, Question, QuestionId, ResponseType};

/// Marker reporters send in place of a number they do not know.
const UNKNOWN_MARKER: &str = "U";

/// Reasons an inbound answer list cannot be turned into a draft.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("expected {expected} answers, received {actual}")]
    CountMismatch { expected: usize, actual: usize },
    #[error("numeric input required for {summary_text}")]
    InvalidNumber {
        question_id: QuestionId,
        summary_text: String,
    },
}

/// Match a comma separated message against the survey's ordered questions.
///
/// Validation stops at the first numeric question whose token is neither a
/// number nor the unknown marker; nothing is returned for a partially valid
/// message.
pub fn parse_answers(raw: &str, questions: &[Question]) -> Result<Vec<Answer>, ParseError> {
    let tokens: Vec<&str> = raw.split(',').collect();
    if tokens.len() != questions.len() {
        return Err(ParseError::CountMismatch {
            expected: questions.len(),
            actual: tokens.len(),
        });
    }

    tokens
        .into_iter()
        .zip(questions)
        .map(|(token, question)| parse_token(token.trim(), question))
        .collect()
}

fn parse_token(text: &str, question: &Question) -> Result<Answer, ParseError> {
    let number_response = match question.response_type {
        ResponseType::Text => None,
        ResponseType::Number if text.eq_ignore_ascii_case(UNKNOWN_MARKER) => None,
        ResponseType::Number => Some(parse_number(text).ok_or_else(|| {
            ParseError::InvalidNumber {
                question_id: question.id.clone(),
                summary_text: question.summary_text.clone(),
            }
        })?),
    };

    Ok(Answer {
        question_id: question.id.clone(),
        text_response: text.to_string(),
        number_response,
    })
}

fn parse_number(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|value| value.is_finite())
}
