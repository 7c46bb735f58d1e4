use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::report::domain::{
    DraftKey, DraftResponse, PhoneNumber, PlaceId, Question, QuestionId, Reporter, ReporterId,
    ResponseType, Survey, SurveyId,
};
use crate::workflows::report::interval::{FixedClock, IntervalResolver, ReportingInterval};
use crate::workflows::report::messages::MessageCatalog;
use crate::workflows::report::repository::{
    DraftResponseRepository, RepositoryError, ReporterRepository, SurveyRepository,
};
use crate::workflows::report::service::{ReportCommand, ReportCommandService};

pub(crate) const REPORTER_PHONE: &str = "+2348031234567";
pub(crate) const UNREGISTERED_PHONE: &str = "+2348039999999";
pub(crate) const SURVEY_ID: &str = "weekly-idsr";

pub(crate) fn survey() -> Survey {
    Survey {
        id: SurveyId(SURVEY_ID.to_string()),
        questions: vec![
            Question {
                id: QuestionId("cases".to_string()),
                response_type: ResponseType::Number,
                summary_text: "Cases".to_string(),
            },
            Question {
                id: QuestionId("notes".to_string()),
                response_type: ResponseType::Text,
                summary_text: "Notes".to_string(),
            },
        ],
    }
}

pub(crate) fn reporter() -> Reporter {
    Reporter {
        id: ReporterId("rep-kano-01".to_string()),
        phone_numbers: vec![
            PhoneNumber("+2348000000000".to_string()),
            PhoneNumber(REPORTER_PHONE.to_string()),
        ],
        place_ids: vec![
            PlaceId("Kano North".to_string()),
            PlaceId("Kano South".to_string()),
        ],
    }
}

/// Wednesday of epi week 14, 2025.
pub(crate) fn reporting_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 2).expect("valid date")
}

pub(crate) fn reporting_interval() -> ReportingInterval {
    ReportingInterval::new(2025, 14)
}

pub(crate) fn resolver() -> IntervalResolver {
    let offset = chrono::FixedOffset::east_opt(3600).expect("valid offset");
    IntervalResolver::new(Arc::new(FixedClock::on(reporting_date())), offset)
}

pub(crate) fn draft_key() -> DraftKey {
    DraftKey {
        survey_id: SurveyId(SURVEY_ID.to_string()),
        reporter_id: reporter().id,
        place_id: PlaceId("Kano North".to_string()),
        interval: reporting_interval(),
    }
}

pub(crate) fn command(phone: &str, message: &str) -> ReportCommand {
    ReportCommand {
        phone_number: PhoneNumber(phone.to_string()),
        message: message.to_string(),
        survey_id: SurveyId(SURVEY_ID.to_string()),
    }
}

pub(crate) type MemoryService = ReportCommandService<MemorySurveys, MemoryReporters, MemoryDrafts>;

pub(crate) fn build_service() -> (MemoryService, Arc<MemoryDrafts>) {
    let surveys = Arc::new(MemorySurveys::with(vec![survey()]));
    let reporters = Arc::new(MemoryReporters::with(vec![reporter()]));
    let drafts = Arc::new(MemoryDrafts::default());
    let service = ReportCommandService::new(
        surveys,
        reporters,
        drafts.clone(),
        Arc::new(MessageCatalog::default()),
        resolver(),
    );
    (service, drafts)
}

#[derive(Default, Clone)]
pub(crate) struct MemorySurveys {
    surveys: Arc<Mutex<HashMap<SurveyId, Survey>>>,
}

impl MemorySurveys {
    pub(crate) fn with(surveys: Vec<Survey>) -> Self {
        let map = surveys
            .into_iter()
            .map(|survey| (survey.id.clone(), survey))
            .collect();
        Self {
            surveys: Arc::new(Mutex::new(map)),
        }
    }
}

impl SurveyRepository for MemorySurveys {
    fn find_by_id(&self, id: &SurveyId) -> Result<Option<Survey>, RepositoryError> {
        let guard = self.surveys.lock().expect("survey mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct MemoryReporters {
    reporters: Arc<Mutex<Vec<Reporter>>>,
}

impl MemoryReporters {
    pub(crate) fn with(reporters: Vec<Reporter>) -> Self {
        Self {
            reporters: Arc::new(Mutex::new(reporters)),
        }
    }
}

impl ReporterRepository for MemoryReporters {
    fn find_by_phone(
        &self,
        phone_number: &PhoneNumber,
    ) -> Result<Option<Reporter>, RepositoryError> {
        let guard = self.reporters.lock().expect("reporter mutex poisoned");
        Ok(guard
            .iter()
            .find(|reporter| reporter.has_phone(phone_number))
            .cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct MemoryDrafts {
    drafts: Arc<Mutex<HashMap<DraftKey, DraftResponse>>>,
    lookups: Arc<AtomicUsize>,
    saves: Arc<AtomicUsize>,
}

impl MemoryDrafts {
    pub(crate) fn len(&self) -> usize {
        self.drafts.lock().expect("draft mutex poisoned").len()
    }

    pub(crate) fn get(&self, key: &DraftKey) -> Option<DraftResponse> {
        self.drafts
            .lock()
            .expect("draft mutex poisoned")
            .get(key)
            .cloned()
    }

    pub(crate) fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub(crate) fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl DraftResponseRepository for MemoryDrafts {
    fn find_one(&self, key: &DraftKey) -> Result<Option<DraftResponse>, RepositoryError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let guard = self.drafts.lock().expect("draft mutex poisoned");
        Ok(guard.get(key).cloned())
    }

    fn save(&self, draft: DraftResponse) -> Result<DraftResponse, RepositoryError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        let mut guard = self.drafts.lock().expect("draft mutex poisoned");
        guard.insert(draft.key.clone(), draft.clone());
        Ok(draft)
    }
}

/// Draft storage whose reads succeed but every write fails.
pub(crate) struct ReadOnlyDrafts;

impl DraftResponseRepository for ReadOnlyDrafts {
    fn find_one(&self, _key: &DraftKey) -> Result<Option<DraftResponse>, RepositoryError> {
        Ok(None)
    }

    fn save(&self, _draft: DraftResponse) -> Result<DraftResponse, RepositoryError> {
        Err(RepositoryError::Rejected(
            "write concern not satisfied on replica set rs0".to_string(),
        ))
    }
}

pub(crate) struct UnavailableDrafts;

impl DraftResponseRepository for UnavailableDrafts {
    fn find_one(&self, _key: &DraftKey) -> Result<Option<DraftResponse>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn save(&self, _draft: DraftResponse) -> Result<DraftResponse, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Survey and reporter directory that is always offline.
pub(crate) struct UnavailableDirectory;

impl SurveyRepository for UnavailableDirectory {
    fn find_by_id(&self, _id: &SurveyId) -> Result<Option<Survey>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl ReporterRepository for UnavailableDirectory {
    fn find_by_phone(
        &self,
        _phone_number: &PhoneNumber,
    ) -> Result<Option<Reporter>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
