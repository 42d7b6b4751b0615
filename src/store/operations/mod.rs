pub mod attendance;
pub mod homework;
pub mod insights;
pub mod score_records;
