/// 洞察缓存有效期（秒）
pub const DEFAULT_CACHE_TTL_SECS: i64 = 3600;

/// 判定薄弱知识点所需的最少样本数
pub const DEFAULT_MIN_TOPIC_SAMPLES: usize = 1;

/// 每门学科参与计算的最近成绩数（current / previous 各一组）
pub const SCORE_WINDOW: usize = 5;

/// 趋势判定的分差阈值
pub const TREND_THRESHOLD: f64 = 5.0;

pub const STRONG_SCORE: f64 = 85.0;
pub const PASSING_SCORE: f64 = 70.0;

/// 早期预警：相对下降比例阈值
pub const EARLY_WARNING_DROP: f64 = 0.10;

pub const COLOR_STRONG: &str = "#10b981";
pub const COLOR_MODERATE: &str = "#f59e0b";
pub const COLOR_WEAK: &str = "#ef4444";

/// 每天毫秒数
pub const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// 列表接口最大分页大小
pub const MAX_PAGE_SIZE: usize = 100;

/// 默认分页大小
pub const DEFAULT_PAGE_SIZE: usize = 50;
