//! SMS `report` command: match a comma separated answer list against a survey's
//! questions and keep one draft response per reporter, place and epi week.

pub mod domain;
mod drafts;
mod fixtures;
pub mod interval;
pub mod messages;
mod parser;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Answer, DraftKey, DraftResponse, PhoneNumber, PlaceId, Question, QuestionId, Reporter,
    ReporterId, ResponseType, Survey, SurveyId,
};
pub use drafts::DraftResponseStore;
pub use fixtures::{DirectoryImportError, ReportDirectory};
pub use interval::{Clock, FixedClock, IntervalResolver, ReportingInterval, SystemClock};
pub use messages::{CatalogError, MessageCatalog, MessageKind};
pub use parser::{parse_answers, ParseError};
pub use repository::{
    DraftResponseRepository, RepositoryError, ReporterRepository, SurveyRepository,
};
pub use router::report_router;
pub use service::{
    ReportCommand, ReportCommandService, ReportOutcome, ReportReply, ReportReplyView,
};
