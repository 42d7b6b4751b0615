use crate::insights::types::InsightsCache;
use crate::store::{Store, StoreError};

const VERSION_KEY: &str = "_meta:version";

type MigrationFn = fn(&Store) -> Result<(), StoreError>;

fn migrations() -> Vec<(&'static str, MigrationFn)> {
    vec![
        ("001_initial", m001_initial),
        ("002_purge_unreadable_caches", m002_purge_unreadable_caches),
    ]
}

/// 执行所有未应用的迁移。
///
/// - 每个迁移必须幂等：进程可能在迁移完成后、写入版本号前崩溃，重启后会重跑。
/// - 版本号在每个迁移成功后立即持久化。
/// - 仅向前，拒绝降级。
pub fn run(store: &Store) -> Result<(), StoreError> {
    let current = get_current_version(store)?;

    for (index, (name, func)) in migrations().iter().enumerate() {
        let version = (index + 1) as u32;
        if version > current {
            tracing::info!(version, name, "Running migration");
            func(store)?;
            set_version(store, version)?;
            tracing::info!(version, name, "Migration complete");
        } else {
            tracing::debug!(version, name, "Migration already applied, skipping");
        }
    }

    Ok(())
}

pub fn get_current_version(store: &Store) -> Result<u32, StoreError> {
    match store.config_versions.get(VERSION_KEY.as_bytes())? {
        Some(raw) => {
            let bytes: [u8; 4] = raw.as_ref().try_into().map_err(|_| StoreError::Migration {
                version: 0,
                message: format!("corrupt version marker ({} bytes)", raw.len()),
            })?;
            Ok(u32::from_be_bytes(bytes))
        }
        None => Ok(0),
    }
}

pub fn set_version(store: &Store, version: u32) -> Result<(), StoreError> {
    let current = get_current_version(store)?;
    if version < current {
        return Err(StoreError::Migration {
            version,
            message: format!("Refuse to downgrade from {} to {}", current, version),
        });
    }

    store
        .config_versions
        .insert(VERSION_KEY.as_bytes(), &version.to_be_bytes())?;
    Ok(())
}

fn m001_initial(_store: &Store) -> Result<(), StoreError> {
    Ok(())
}

/// Caches written before the current document shape cannot be served; drop
/// them so the next read falls through to a fresh pipeline run.
fn m002_purge_unreadable_caches(store: &Store) -> Result<(), StoreError> {
    let mut purged = 0u32;
    for item in store.insights_cache.iter() {
        let (key, value) = item?;
        if Store::deserialize::<InsightsCache>(&value).is_err() {
            store.insights_cache.remove(key)?;
            purged += 1;
        }
    }
    if purged > 0 {
        tracing::info!(purged, "Purged unreadable insights caches");
    }
    Ok(())
}
