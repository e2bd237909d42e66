use std::time::Duration;

use tokio::signal;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::services::SweeperHandle;

/// 关闭超时时间（秒）
const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// 等待 Ctrl+C 信号
pub async fn listen_for_shutdown() {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, stopping background tasks...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }
}

/// 停止后台清理任务（带超时）
pub async fn stop_sweeper(sweeper: SweeperHandle) {
    match timeout(Duration::from_secs(SHUTDOWN_TIMEOUT_SECS), sweeper.stop()).await {
        Ok(()) => {
            info!("Expiration sweeper stopped");
        }
        Err(_) => {
            error!(
                "Expiration sweeper did not stop within {} seconds",
                SHUTDOWN_TIMEOUT_SECS
            );
        }
    }
}
