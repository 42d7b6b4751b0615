use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::insights::metrics::round2;
use crate::store::keys;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub student_id: String,
    pub present_days: u32,
    pub total_days: u32,
    pub updated_at: DateTime<Utc>,
}

impl AttendanceRecord {
    /// Percentage of attended days, 0 when no days were recorded.
    pub fn rate(&self) -> f64 {
        if self.total_days == 0 {
            return 0.0;
        }
        round2(self.present_days as f64 / self.total_days as f64 * 100.0)
    }
}

impl Store {
    pub fn get_attendance(&self, student_id: &str) -> Result<Option<AttendanceRecord>, StoreError> {
        let key = keys::attendance_key(student_id)?;
        match self.attendance.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn set_attendance(&self, record: &AttendanceRecord) -> Result<(), StoreError> {
        if record.present_days > record.total_days {
            return Err(StoreError::Validation(
                "presentDays must not exceed totalDays".to_string(),
            ));
        }
        let key = keys::attendance_key(&record.student_id)?;
        self.attendance
            .insert(key.as_bytes(), Self::serialize(record)?)?;
        Ok(())
    }
}
