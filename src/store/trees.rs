pub const SCORE_RECORDS: &str = "score_records";
pub const HOMEWORK_RECORDS: &str = "homework_records";
pub const ATTENDANCE: &str = "attendance";
pub const LEARNING_INSIGHTS: &str = "learning_insights";
pub const INSIGHTS_CACHE: &str = "insights_cache";
pub const CONFIG_VERSIONS: &str = "config_versions";
