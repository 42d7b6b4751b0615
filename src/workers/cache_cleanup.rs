//! 洞察缓存清理（每 10 分钟）
//! 删除超过 TTL 的缓存文档，单次最多删除 10000 条

use chrono::{Duration, Utc};

use crate::store::Store;

/// 单次清理最多删除的条目数
const MAX_REMOVALS_PER_RUN: usize = 10_000;

pub async fn run(store: &Store, ttl: Duration) -> usize {
    tracing::debug!("Insights cache cleanup worker tick");

    let cutoff = Utc::now() - ttl;
    match store.remove_insights_caches_before(cutoff, MAX_REMOVALS_PER_RUN) {
        Ok(removed) => {
            if removed >= MAX_REMOVALS_PER_RUN {
                tracing::info!(
                    removed,
                    "Cache cleanup: reached single-run limit, remaining items deferred to next run"
                );
            } else if removed > 0 {
                tracing::info!(removed, "Cache cleanup: removed expired insights caches");
            }
            removed
        }
        Err(e) => {
            tracing::warn!(error = %e, "Cache cleanup: failed to scan insights caches");
            0
        }
    }
}
