use crate::core::handlers::App;
use crate::domain::ports::Compositor;
use crate::utils::backoff::Backoff;
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Duration;

/// Long-poll getUpdates and fan each update out onto its own task. Handler
/// failures are logged; only the poll itself backs off.
pub async fn run<C: Compositor + 'static>(app: Arc<App<C>>, poll_timeout_secs: u64) -> Result<()> {
    let mut offset = 0i64;
    let mut backoff = Backoff::new(Duration::from_secs(1), 2, Duration::from_secs(30));

    tracing::info!("polling for updates");
    loop {
        match app.bot.get_updates(offset, poll_timeout_secs).await {
            Ok(updates) => {
                backoff.reset();
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    let app = Arc::clone(&app);
                    tokio::spawn(async move {
                        let update_id = update.update_id;
                        if let Err(err) = app.handle_update(update).await {
                            tracing::error!("update {} failed: {}", update_id, err);
                        }
                    });
                }
            }
            Err(err) => {
                let delay = backoff.advance();
                tracing::warn!("getUpdates failed: {} (retrying in {:?})", err, delay);
                tokio::time::sleep(delay).await;
            }
        }
    }
}
