use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HomeworkStatus {
    Pending,
    Submitted,
    Graded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeworkRecord {
    pub id: String,
    pub student_id: String,
    pub subject: String,
    pub title: String,
    pub status: HomeworkStatus,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl HomeworkRecord {
    pub fn is_completed(&self) -> bool {
        matches!(
            self.status,
            HomeworkStatus::Submitted | HomeworkStatus::Graded
        )
    }
}

impl Store {
    pub fn create_homework_record(&self, record: &HomeworkRecord) -> Result<(), StoreError> {
        if record.title.trim().is_empty() {
            return Err(StoreError::Validation("title must not be empty".to_string()));
        }
        let key = keys::homework_key(
            &record.student_id,
            record.created_at.timestamp_millis(),
            &record.id,
        )?;
        self.homework_records
            .insert(key.as_bytes(), Self::serialize(record)?)?;
        Ok(())
    }

    /// Newest-first.
    pub fn get_homework_records(&self, student_id: &str) -> Result<Vec<HomeworkRecord>, StoreError> {
        let prefix = keys::student_prefix(student_id)?;
        let mut records = Vec::new();
        for item in self.homework_records.scan_prefix(prefix.as_bytes()) {
            let (_, value) = item?;
            records.push(Self::deserialize::<HomeworkRecord>(&value)?);
        }
        Ok(records)
    }
}
