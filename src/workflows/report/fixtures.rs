use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::domain::{Reporter, Survey};

/// Seed data for surveys and registered reporters, as exported by the
/// coordination team.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportDirectory {
    #[serde(default)]
    pub surveys: Vec<Survey>,
    #[serde(default)]
    pub reporters: Vec<Reporter>,
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryImportError {
    #[error("unable to open directory export: {0}")]
    Io(#[from] std::io::Error),
    #[error("directory export is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("survey '{0}' is defined more than once")]
    DuplicateSurvey(String),
    #[error("phone number '{0}' is registered to more than one reporter")]
    DuplicatePhone(String),
}

impl ReportDirectory {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DirectoryImportError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DirectoryImportError> {
        let directory: Self = serde_json::from_reader(reader)?;
        directory.validate()?;
        Ok(directory)
    }

    /// Survey ids and phone numbers must be unique or lookups become ambiguous.
    fn validate(&self) -> Result<(), DirectoryImportError> {
        let mut survey_ids = HashSet::new();
        for survey in &self.surveys {
            if !survey_ids.insert(&survey.id) {
                return Err(DirectoryImportError::DuplicateSurvey(survey.id.0.clone()));
            }
        }

        let mut phones = HashSet::new();
        for number in self
            .reporters
            .iter()
            .flat_map(|reporter| reporter.phone_numbers.iter())
        {
            if !phones.insert(number) {
                return Err(DirectoryImportError::DuplicatePhone(number.0.clone()));
            }
        }

        Ok(())
    }
}
