use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::domain::{
    Answer, DraftKey, DraftResponse, PhoneNumber, PlaceId, QuestionId, Reporter, Survey, SurveyId,
};
use super::drafts::DraftResponseStore;
use super::interval::{IntervalResolver, ReportingInterval};
use super::messages::{MessageCatalog, MessageKind};
use super::parser::{parse_answers, ParseError};
use super::repository::{DraftResponseRepository, ReporterRepository, SurveyRepository};

/// Inbound `report` command as delivered by the SMS transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCommand {
    pub phone_number: PhoneNumber,
    pub message: String,
    pub survey_id: SurveyId,
}

/// Terminal state reached while handling one command.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    SurveyNotFound,
    ReporterNotRegistered,
    PlaceNotAssigned,
    AnswersRequested { expected: usize, received: usize },
    NumericInputRequired { question_id: QuestionId },
    DraftSaved { draft: DraftResponse },
    StorageFailure { reason: String },
}

impl ReportOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ReportOutcome::SurveyNotFound => "survey_not_found",
            ReportOutcome::ReporterNotRegistered => "reporter_not_registered",
            ReportOutcome::PlaceNotAssigned => "place_not_assigned",
            ReportOutcome::AnswersRequested { .. } => "answers_requested",
            ReportOutcome::NumericInputRequired { .. } => "numeric_input_required",
            ReportOutcome::DraftSaved { .. } => "draft_saved",
            ReportOutcome::StorageFailure { .. } => "storage_failure",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ReportOutcome::StorageFailure { .. })
    }
}

/// Outcome plus the single SMS to send back to the reporter.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportReply {
    pub outcome: ReportOutcome,
    pub message: String,
}

impl ReportReply {
    pub fn view(&self) -> ReportReplyView {
        let draft = match &self.outcome {
            ReportOutcome::DraftSaved { draft } => Some(draft.clone()),
            _ => None,
        };
        ReportReplyView {
            outcome: self.outcome.label(),
            message: self.message.clone(),
            draft,
        }
    }
}

/// Serializable representation returned to transports.
#[derive(Debug, Clone, Serialize)]
pub struct ReportReplyView {
    pub outcome: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<DraftResponse>,
}

/// Everything resolved for one invocation before the message is parsed.
#[derive(Debug, Clone)]
struct ReportContext {
    survey: Survey,
    reporter: Reporter,
    place: PlaceId,
    interval: ReportingInterval,
}

type Step<T> = Result<T, ReportReply>;

/// Service sequencing survey lookup, reporter lookup, parsing and the draft upsert.
pub struct ReportCommandService<S, R, D> {
    surveys: Arc<S>,
    reporters: Arc<R>,
    drafts: DraftResponseStore<D>,
    messages: Arc<MessageCatalog>,
    intervals: IntervalResolver,
}

impl<S, R, D> ReportCommandService<S, R, D>
where
    S: SurveyRepository + 'static,
    R: ReporterRepository + 'static,
    D: DraftResponseRepository + 'static,
{
    pub fn new(
        surveys: Arc<S>,
        reporters: Arc<R>,
        drafts: Arc<D>,
        messages: Arc<MessageCatalog>,
        intervals: IntervalResolver,
    ) -> Self {
        Self {
            surveys,
            reporters,
            drafts: DraftResponseStore::new(drafts),
            messages,
            intervals,
        }
    }

    /// Handle one `report` command. Always yields a message that is safe to
    /// send to the reporter; storage errors are logged, never echoed.
    pub fn handle(&self, command: &ReportCommand) -> ReportReply {
        match self.process(command) {
            Ok(reply) | Err(reply) => reply,
        }
    }

    fn process(&self, command: &ReportCommand) -> Step<ReportReply> {
        let survey = self.locate_survey(&command.survey_id)?;
        let reporter = self.locate_reporter(&command.phone_number)?;
        let context = self.resolve_context(survey, reporter)?;
        let answers = self.parse_input(&context, &command.message)?;
        Ok(self.persist_draft(&context, &command.phone_number, answers))
    }

    fn locate_survey(&self, survey_id: &SurveyId) -> Step<Survey> {
        match self.surveys.find_by_id(survey_id) {
            Ok(Some(survey)) => Ok(survey),
            Ok(None) => {
                debug!(survey_id = %survey_id.0, "survey not found");
                Err(self.terminal(ReportOutcome::SurveyNotFound, MessageKind::NoSurveyFound))
            }
            Err(err) => {
                warn!(survey_id = %survey_id.0, error = %err, "survey lookup failed");
                Err(self.terminal(ReportOutcome::SurveyNotFound, MessageKind::NoSurveyFound))
            }
        }
    }

    fn locate_reporter(&self, phone_number: &PhoneNumber) -> Step<Reporter> {
        match self.reporters.find_by_phone(phone_number) {
            Ok(Some(reporter)) => {
                info!(phone = %phone_number.0, reporter_id = %reporter.id.0, "found reporter");
                Ok(reporter)
            }
            Ok(None) => Err(self.terminal(
                ReportOutcome::ReporterNotRegistered,
                MessageKind::RegisterFirst,
            )),
            Err(err) => {
                warn!(phone = %phone_number.0, error = %err, "reporter lookup failed");
                Err(self.terminal(
                    ReportOutcome::ReporterNotRegistered,
                    MessageKind::RegisterFirst,
                ))
            }
        }
    }

    fn resolve_context(&self, survey: Survey, reporter: Reporter) -> Step<ReportContext> {
        let Some(place) = reporter.primary_place().cloned() else {
            warn!(reporter_id = %reporter.id.0, "reporter has no associated place");
            return Err(self.terminal(
                ReportOutcome::PlaceNotAssigned,
                MessageKind::NoPlaceAssigned,
            ));
        };

        Ok(ReportContext {
            survey,
            reporter,
            place,
            interval: self.intervals.current(),
        })
    }

    fn parse_input(&self, context: &ReportContext, message: &str) -> Step<Vec<Answer>> {
        parse_answers(message, &context.survey.questions).map_err(|err| {
            debug!(reporter_id = %context.reporter.id.0, error = %err, "answers rejected");
            match err {
                ParseError::CountMismatch { expected, actual } => ReportReply {
                    outcome: ReportOutcome::AnswersRequested {
                        expected,
                        received: actual,
                    },
                    message: self.messages.questions(
                        &context.place,
                        &context.interval,
                        &context.survey,
                    ),
                },
                ParseError::InvalidNumber {
                    question_id,
                    summary_text,
                } => ReportReply {
                    outcome: ReportOutcome::NumericInputRequired { question_id },
                    message: self.messages.numeric_input_required(
                        &summary_text,
                        &context.place,
                        &context.interval,
                        &context.survey,
                    ),
                },
            }
        })
    }

    fn persist_draft(
        &self,
        context: &ReportContext,
        phone_number: &PhoneNumber,
        answers: Vec<Answer>,
    ) -> ReportReply {
        let key = DraftKey {
            survey_id: context.survey.id.clone(),
            reporter_id: context.reporter.id.clone(),
            place_id: context.place.clone(),
            interval: context.interval,
        };

        match self.drafts.upsert(key, phone_number.clone(), answers) {
            Ok(draft) => {
                info!(
                    reporter_id = %context.reporter.id.0,
                    survey_id = %context.survey.id.0,
                    interval = %context.interval,
                    answers = draft.answers.len(),
                    "draft response saved"
                );
                let message = self.messages.confirm(
                    &context.place,
                    &context.interval,
                    &context.survey.questions,
                    &draft.answers,
                );
                ReportReply {
                    outcome: ReportOutcome::DraftSaved { draft },
                    message,
                }
            }
            Err(err) => {
                error!(
                    reporter_id = %context.reporter.id.0,
                    survey_id = %context.survey.id.0,
                    interval = %context.interval,
                    error = %err,
                    "failed to save draft response"
                );
                self.terminal(
                    ReportOutcome::StorageFailure {
                        reason: err.to_string(),
                    },
                    MessageKind::GeneralError,
                )
            }
        }
    }

    fn terminal(&self, outcome: ReportOutcome, kind: MessageKind) -> ReportReply {
        ReportReply {
            outcome,
            message: self.messages.template(kind).to_string(),
        }
    }
}
