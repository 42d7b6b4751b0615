use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

/// Legacy gradebooks stored the numeric result under different keys
/// depending on which screen uploaded it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreField {
    Marks,
    Score,
    UnitTest1,
    UnitTest2,
    HalfYearly,
    Final,
}

impl ScoreField {
    /// First present field wins.
    pub const PRIORITY: [ScoreField; 6] = [
        ScoreField::Marks,
        ScoreField::Score,
        ScoreField::UnitTest1,
        ScoreField::UnitTest2,
        ScoreField::HalfYearly,
        ScoreField::Final,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Marks => "marks",
            Self::Score => "score",
            Self::UnitTest1 => "unitTest1",
            Self::UnitTest2 => "unitTest2",
            Self::HalfYearly => "halfYearly",
            Self::Final => "final",
        }
    }

    fn extract(self, fields: &ScoreFields) -> Option<f64> {
        match self {
            Self::Marks => fields.marks,
            Self::Score => fields.score,
            Self::UnitTest1 => fields.unit_test1,
            Self::UnitTest2 => fields.unit_test2,
            Self::HalfYearly => fields.half_yearly,
            Self::Final => fields.final_exam,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_test1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_test2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half_yearly: Option<f64>,
    #[serde(default, rename = "final", skip_serializing_if = "Option::is_none")]
    pub final_exam: Option<f64>,
}

impl ScoreFields {
    pub fn resolve(&self) -> Option<(ScoreField, f64)> {
        ScoreField::PRIORITY
            .iter()
            .find_map(|field| field.extract(self).map(|value| (*field, value)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawScoreRecord {
    pub id: String,
    pub student_id: String,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(flatten)]
    pub scores: ScoreFields,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl RawScoreRecord {
    /// Resolved numeric score, 0 when no legacy field is present.
    pub fn resolved_score(&self) -> f64 {
        self.scores.resolve().map(|(_, value)| value).unwrap_or(0.0)
    }
}

impl Store {
    /// A record without `uploadedAt` is stamped with the write time, so its
    /// position in the newest-first scan matches the timestamp the velocity
    /// fit sees.
    pub fn create_score_record(&self, record: &RawScoreRecord) -> Result<(), StoreError> {
        if record.subject.trim().is_empty() {
            return Err(StoreError::Validation("subject must not be empty".to_string()));
        }
        if let Some((field, value)) = record.scores.resolve() {
            if !value.is_finite() || value < 0.0 {
                return Err(StoreError::Validation(format!(
                    "{} must be a non-negative number",
                    field.as_str()
                )));
            }
        }

        let uploaded_at = record.uploaded_at.unwrap_or_else(Utc::now);
        let stored = RawScoreRecord {
            uploaded_at: Some(uploaded_at),
            ..record.clone()
        };
        let key = keys::score_record_key(
            &stored.student_id,
            uploaded_at.timestamp_millis(),
            &stored.id,
        )?;
        self.score_records
            .insert(key.as_bytes(), Self::serialize(&stored)?)?;
        Ok(())
    }

    /// Every record of the student, newest-first.
    pub fn get_score_records(&self, student_id: &str) -> Result<Vec<RawScoreRecord>, StoreError> {
        let prefix = keys::student_prefix(student_id)?;
        let mut records = Vec::new();
        for item in self.score_records.scan_prefix(prefix.as_bytes()) {
            let (_, value) = item?;
            records.push(Self::deserialize::<RawScoreRecord>(&value)?);
        }
        Ok(records)
    }

    pub fn get_score_records_page(
        &self,
        student_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<RawScoreRecord>, StoreError> {
        let prefix = keys::student_prefix(student_id)?;
        let mut records = Vec::with_capacity(limit.min(128));
        for item in self
            .score_records
            .scan_prefix(prefix.as_bytes())
            .skip(offset)
            .take(limit)
        {
            let (_, value) = item?;
            records.push(Self::deserialize::<RawScoreRecord>(&value)?);
        }
        Ok(records)
    }

    pub fn count_score_records(&self, student_id: &str) -> Result<usize, StoreError> {
        let prefix = keys::student_prefix(student_id)?;
        let mut count = 0usize;
        for item in self.score_records.scan_prefix(prefix.as_bytes()) {
            let _ = item?;
            count += 1;
        }
        Ok(count)
    }

    /// Distinct students that have at least one score record, in key order.
    pub fn list_scored_student_ids(&self) -> Result<Vec<String>, StoreError> {
        let mut ids: Vec<String> = Vec::new();
        for item in self.score_records.iter() {
            let (key, _) = item?;
            let Some(student_id) = keys::parse_student_id(&key) else {
                continue;
            };
            if ids.last() != Some(&student_id) {
                ids.push(student_id);
            }
        }
        Ok(ids)
    }
}
