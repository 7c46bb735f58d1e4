use chrono::NaiveDate;
use epi_sms::workflows::report::{
    DraftKey, DraftResponse, DraftResponseRepository, IntervalResolver, MessageCatalog,
    PhoneNumber, ReportCommandService, ReportDirectory, Reporter, ReporterRepository,
    RepositoryError, Survey, SurveyId, SurveyRepository,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

pub(crate) type InMemoryReportService =
    ReportCommandService<InMemoryDirectory, InMemoryDirectory, InMemoryDraftRepository>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Survey and reporter lookups backed by a directory export.
#[derive(Default, Clone)]
pub(crate) struct InMemoryDirectory {
    surveys: Arc<HashMap<SurveyId, Survey>>,
    reporters: Arc<HashMap<PhoneNumber, Reporter>>,
}

impl InMemoryDirectory {
    pub(crate) fn from_directory(directory: ReportDirectory) -> Self {
        let surveys = directory
            .surveys
            .into_iter()
            .map(|survey| (survey.id.clone(), survey))
            .collect();
        let reporters = directory
            .reporters
            .into_iter()
            .flat_map(|reporter| {
                reporter
                    .phone_numbers
                    .clone()
                    .into_iter()
                    .map(move |number| (number, reporter.clone()))
            })
            .collect();

        Self {
            surveys: Arc::new(surveys),
            reporters: Arc::new(reporters),
        }
    }
}

impl SurveyRepository for InMemoryDirectory {
    fn find_by_id(&self, id: &SurveyId) -> Result<Option<Survey>, RepositoryError> {
        Ok(self.surveys.get(id).cloned())
    }
}

impl ReporterRepository for InMemoryDirectory {
    fn find_by_phone(
        &self,
        phone_number: &PhoneNumber,
    ) -> Result<Option<Reporter>, RepositoryError> {
        Ok(self.reporters.get(phone_number).cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryDraftRepository {
    drafts: Arc<Mutex<HashMap<DraftKey, DraftResponse>>>,
}

impl DraftResponseRepository for InMemoryDraftRepository {
    fn find_one(&self, key: &DraftKey) -> Result<Option<DraftResponse>, RepositoryError> {
        let guard = self.drafts.lock().expect("draft mutex poisoned");
        Ok(guard.get(key).cloned())
    }

    fn save(&self, draft: DraftResponse) -> Result<DraftResponse, RepositoryError> {
        let mut guard = self.drafts.lock().expect("draft mutex poisoned");
        guard.insert(draft.key.clone(), draft.clone());
        Ok(draft)
    }
}

pub(crate) fn build_report_service(
    directory: ReportDirectory,
    messages: MessageCatalog,
    intervals: IntervalResolver,
) -> InMemoryReportService {
    let lookups = Arc::new(InMemoryDirectory::from_directory(directory));
    ReportCommandService::new(
        lookups.clone(),
        lookups,
        Arc::new(InMemoryDraftRepository::default()),
        Arc::new(messages),
        intervals,
    )
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
