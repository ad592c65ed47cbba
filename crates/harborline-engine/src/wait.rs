//! 上限付き待機
//!
//! pull / push はタスクとして起動し、呼び出し側は上限時間まで完了を待つ。
//! 待機を打ち切ってもタスク自体は止めない。

use crate::error::Result;
use std::future::Future;
use std::time::Duration;

/// 操作をバックグラウンドタスクで開始し、`timeout` まで完了を待つ
///
/// # Returns
/// * 時間内に完了した場合は操作の結果をそのまま返す
/// * 待機が打ち切られた場合（タイムアウト、タスクの中断）はログを出して `Ok(())`
pub async fn await_bounded<F>(label: &str, operation: F, timeout: Option<Duration>) -> Result<()>
where
    F: Future<Output = Result<()>> + Send + 'static,
{
    let handle = tokio::spawn(operation);

    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, handle).await {
            Ok(joined) => joined,
            Err(_) => {
                tracing::error!(
                    "{} did not complete within {}s, no longer waiting (operation continues)",
                    label,
                    limit.as_secs()
                );
                return Ok(());
            }
        },
        None => handle.await,
    };

    match joined {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("{} wait interrupted: {}", label, e);
            Ok(())
        }
    }
}
