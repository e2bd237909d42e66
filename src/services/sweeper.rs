//! 过期清理任务
//!
//! 周期性删除已过期的条目，并从缓存中驱逐相同的 token。

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::cache::UrlCache;
use crate::errors::Result;
use crate::storage::EntryStore;

/// 单次清理报告
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    /// 从存储中删除的条目数
    pub deleted: usize,
    /// 成功驱逐的缓存键数
    pub evicted: usize,
    /// 驱逐失败的缓存键数
    pub evict_failures: usize,
}

/// Background sweep over the store and cache.
pub struct ExpirationSweeper {
    store: Arc<dyn EntryStore>,
    cache: Arc<dyn UrlCache>,
    interval: Duration,
}

impl ExpirationSweeper {
    pub fn new(store: Arc<dyn EntryStore>, cache: Arc<dyn UrlCache>, interval: Duration) -> Self {
        Self {
            store,
            cache,
            // interval 不能为 0
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// One sweep: delete expired entries, then evict each deleted token.
    ///
    /// A store failure aborts the sweep and is returned. Eviction failures
    /// are counted and logged; they never stop the remaining evictions.
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        let deleted_tokens = self.store.delete_expired(now).await?;

        let mut report = SweepReport {
            deleted: deleted_tokens.len(),
            ..SweepReport::default()
        };

        for token in &deleted_tokens {
            match self.cache.evict(token).await {
                Ok(()) => report.evicted += 1,
                Err(e) => {
                    report.evict_failures += 1;
                    warn!("Failed to evict expired token '{}' from cache: {}", token, e);
                }
            }
        }

        if report.deleted > 0 {
            info!(
                "Expiration sweep completed: deleted {}, evicted {}, evict failures {}",
                report.deleted, report.evicted, report.evict_failures
            );
        } else {
            debug!("Expiration sweep completed: nothing expired");
        }

        Ok(report)
    }

    /// 启动后台清理任务
    ///
    /// The first sweep runs immediately, then once per interval. Ticks that
    /// fall behind are skipped, so at most one sweep is ever in flight.
    pub fn spawn(self: Arc<Self>) -> SweeperHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let interval = self.interval;

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.run_once(Utc::now()).await {
                            error!("Expiration sweep failed: {}", e);
                        }
                    }
                    changed = stop_rx.changed() => {
                        // 发送端被丢弃也视为停止
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            debug!("Expiration sweeper stopped");
        });

        info!(
            "Expiration sweeper started (interval: {} seconds)",
            interval.as_secs()
        );

        SweeperHandle { stop_tx, join }
    }
}

/// Handle to a running sweeper task.
pub struct SweeperHandle {
    stop_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signal the loop to stop and wait for it. An in-flight sweep finishes
    /// first.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.join.await {
            error!("Expiration sweeper task ended abnormally: {}", e);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}
