use crate::engine::{Advance, CancelToken, GameSession};
use crate::error::ScreeningError;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Advances `session` after its display delay unless `cancel` fires first.
///
/// `on_advance` runs with the session lock released.
pub fn schedule_advance<F, Fut>(
    session: Arc<Mutex<GameSession>>,
    cancel: CancelToken,
    on_advance: F,
) -> JoinHandle<()>
where
    F: FnOnce(Result<Advance, ScreeningError>) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let delay = session.lock().await.config().advance_delay;

        tokio::select! {
            _ = cancel.cancelled() => {
                log::debug!("Scheduled advance cancelled");
                return;
            }
            _ = sleep(delay) => {}
        }

        let result = {
            let mut session = session.lock().await;
            if cancel.is_cancelled() {
                log::debug!("Session closed before advance");
                return;
            }
            session.advance().await
        };

        on_advance(result).await;
    })
}
