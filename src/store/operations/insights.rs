use chrono::{DateTime, Utc};

use crate::insights::types::{InsightsCache, LearningInsights};
use crate::insights::InsightsRepository;
use crate::store::keys;
use crate::store::operations::attendance::AttendanceRecord;
use crate::store::operations::homework::HomeworkRecord;
use crate::store::operations::score_records::RawScoreRecord;
use crate::store::{Store, StoreError};

impl Store {
    pub fn get_learning_insights(
        &self,
        student_id: &str,
    ) -> Result<Option<LearningInsights>, StoreError> {
        let key = keys::learning_insights_key(student_id)?;
        match self.learning_insights.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    /// Overwrites any previous record for the student.
    pub fn set_learning_insights(&self, insights: &LearningInsights) -> Result<(), StoreError> {
        let key = keys::learning_insights_key(&insights.student_id)?;
        self.learning_insights
            .insert(key.as_bytes(), Self::serialize(insights)?)?;
        Ok(())
    }

    pub fn get_insights_cache(&self, student_id: &str) -> Result<Option<InsightsCache>, StoreError> {
        let key = keys::insights_cache_key(student_id)?;
        match self.insights_cache.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn set_insights_cache(&self, cache: &InsightsCache) -> Result<(), StoreError> {
        let key = keys::insights_cache_key(&cache.student_id)?;
        self.insights_cache
            .insert(key.as_bytes(), Self::serialize(cache)?)?;
        Ok(())
    }

    /// Removes cache documents cached before `cutoff`, at most `limit` per call.
    /// Unreadable documents are removed as well.
    pub fn remove_insights_caches_before(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<usize, StoreError> {
        let mut removed = 0usize;
        for item in self.insights_cache.iter() {
            if removed >= limit {
                break;
            }
            let (key, value) = item?;
            let expired = match Self::deserialize::<InsightsCache>(&value) {
                Ok(cache) => cache.last_cached < cutoff,
                Err(e) => {
                    tracing::warn!(error = %e, "Dropping unreadable insights cache entry");
                    true
                }
            };
            if expired {
                self.insights_cache.remove(key)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

impl InsightsRepository for Store {
    fn fetch_score_records(&self, student_id: &str) -> Result<Vec<RawScoreRecord>, StoreError> {
        self.get_score_records(student_id)
    }

    fn fetch_homework_records(&self, student_id: &str) -> Result<Vec<HomeworkRecord>, StoreError> {
        self.get_homework_records(student_id)
    }

    fn fetch_attendance_record(
        &self,
        student_id: &str,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        self.get_attendance(student_id)
    }

    fn write_insights(&self, insights: &LearningInsights) -> Result<(), StoreError> {
        self.set_learning_insights(insights)
    }

    fn write_insights_cache(&self, cache: &InsightsCache) -> Result<(), StoreError> {
        self.set_insights_cache(cache)
    }

    fn read_insights_cache(&self, student_id: &str) -> Result<Option<InsightsCache>, StoreError> {
        self.get_insights_cache(student_id)
    }
}
