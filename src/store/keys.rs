use crate::store::StoreError;

/// Key components must not contain the `:` separator, otherwise prefix scans
/// for one student would leak into another student's keyspace.
fn validate_component(name: &str, value: &str) -> Result<(), StoreError> {
    if value.is_empty() {
        return Err(StoreError::Validation(format!("{name} must not be empty")));
    }
    if value.contains(':') {
        return Err(StoreError::Validation(format!(
            "{name} must not contain ':'"
        )));
    }
    Ok(())
}

fn reverse_ts(timestamp_ms: i64) -> u64 {
    let ts = timestamp_ms.max(0) as u64;
    u64::MAX - ts
}

/// `{student_id}:{reverse_ts:020}:{record_id}`，按时间倒序扫描
pub fn score_record_key(
    student_id: &str,
    timestamp_ms: i64,
    record_id: &str,
) -> Result<String, StoreError> {
    validate_component("studentId", student_id)?;
    validate_component("recordId", record_id)?;
    Ok(format!(
        "{}:{:020}:{}",
        student_id,
        reverse_ts(timestamp_ms),
        record_id
    ))
}

pub fn homework_key(
    student_id: &str,
    timestamp_ms: i64,
    homework_id: &str,
) -> Result<String, StoreError> {
    validate_component("studentId", student_id)?;
    validate_component("homeworkId", homework_id)?;
    Ok(format!(
        "{}:{:020}:{}",
        student_id,
        reverse_ts(timestamp_ms),
        homework_id
    ))
}

pub fn student_prefix(student_id: &str) -> Result<String, StoreError> {
    validate_component("studentId", student_id)?;
    Ok(format!("{}:", student_id))
}

pub fn attendance_key(student_id: &str) -> Result<String, StoreError> {
    validate_component("studentId", student_id)?;
    Ok(student_id.to_string())
}

pub fn learning_insights_key(student_id: &str) -> Result<String, StoreError> {
    validate_component("studentId", student_id)?;
    Ok(student_id.to_string())
}

pub fn insights_cache_key(student_id: &str) -> Result<String, StoreError> {
    validate_component("studentId", student_id)?;
    Ok(student_id.to_string())
}

/// Extract the student id from a `{student_id}:...` key.
pub fn parse_student_id(key: &[u8]) -> Option<String> {
    let sep = key.iter().position(|b| *b == b':')?;
    std::str::from_utf8(&key[..sep]).ok().map(str::to_string)
}
