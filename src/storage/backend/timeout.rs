//! 单次存储调用超时
//!
//! 每个数据库操作都有独立的超时；超时与其它数据库错误一样向上报告，
//! 不在此处重试，由调用方决定是否重试整个请求。

use sea_orm::DbErr;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Run one store operation under `timeout`.
///
/// An elapsed timeout is reported as `DbErr::Custom` so callers handle it
/// through the same path as any other backend failure.
pub async fn with_timeout<T, Fut>(
    operation_name: &str,
    timeout: Duration,
    operation: Fut,
) -> Result<T, DbErr>
where
    Fut: Future<Output = Result<T, DbErr>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            debug!("Operation '{}' failed: {}", operation_name, e);
            Err(e)
        }
        Err(_elapsed) => {
            warn!(
                "Operation '{}' timed out after {}ms",
                operation_name,
                timeout.as_millis()
            );
            Err(DbErr::Custom(format!(
                "Operation '{}' timed out after {}ms",
                operation_name,
                timeout.as_millis()
            )))
        }
    }
}
