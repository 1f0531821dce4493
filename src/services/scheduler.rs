use crate::{
    config::scheduler::ToggleConfig,
    error::AppResult,
    models::SettingsModel,
    services::{SettingsEvents, SettingsService, UserService, ADMIN_USERNAME},
};
use sea_orm::DatabaseConnection;
use tokio::{sync::mpsc, task::JoinHandle};

/// Background job that flips `site_is_active` on a recurring timer.
/// The period depends on the current flag (active sites toggle slower
/// than inactive ones), so every settings write reschedules the timer.
///
/// Owns the single receiver of the settings channel and its timer
/// handle; rescheduling aborts the old timer task and spawns a new one,
/// which guarantees at most one pending toggle at any time.
pub struct SettingsScheduler {
    db: DatabaseConnection,
    events: SettingsEvents,
    config: ToggleConfig,
    rx: mpsc::UnboundedReceiver<SettingsModel>,
    timer: Option<JoinHandle<()>>,
}

impl SettingsScheduler {
    pub fn new(
        db: DatabaseConnection,
        events: SettingsEvents,
        rx: mpsc::UnboundedReceiver<SettingsModel>,
        config: ToggleConfig,
    ) -> Self {
        Self {
            db,
            events,
            config,
            rx,
            timer: None,
        }
    }

    /// Runs until every `SettingsEvents` sender has been dropped.
    pub async fn run(mut self) {
        match SettingsService::new(self.db.clone(), self.events.clone())
            .get()
            .await
        {
            Ok(current) => self.reschedule(&current),
            Err(e) => tracing::error!("Failed to load settings for scheduler: {e}"),
        }

        while let Some(update) = self.rx.recv().await {
            self.reschedule(&update);
        }

        if let Some(handle) = self.timer.take() {
            handle.abort();
        }
        tracing::info!("Settings scheduler stopped");
    }

    fn reschedule(&mut self, settings: &SettingsModel) {
        // Only a sleeping timer can be cancelled here: a tick's write
        // commits before `set` publishes the event that lands in this
        // abort, so an in-flight toggle is never cut short.
        if let Some(handle) = self.timer.take() {
            handle.abort();
        }

        let period = self.config.period_for(settings.site_is_active);
        tracing::info!(
            site_is_active = settings.site_is_active,
            "Scheduling site toggle every {period:?}"
        );

        let db = self.db.clone();
        let events = self.events.clone();
        self.timer = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(period).await;
                if let Err(e) = toggle_site_is_active(&db, &events).await {
                    tracing::error!("Site toggle failed: {e}");
                }
            }
        }));
    }
}

/// One toggle tick. The write is attributed to the admin account; with
/// no admin bootstrapped the tick is skipped. A successful toggle
/// publishes back through the channel, which makes the scheduler pick
/// the period matching the new flag.
async fn toggle_site_is_active(
    db: &DatabaseConnection,
    events: &SettingsEvents,
) -> AppResult<()> {
    let Some(admin) = UserService::new(db.clone())
        .find_by_username(ADMIN_USERNAME)
        .await?
    else {
        tracing::warn!("No admin account, skipping site toggle");
        return Ok(());
    };

    let service = SettingsService::new(db.clone(), events.clone());
    let current = service.get().await?;
    let updated = service.set(!current.site_is_active, Some(admin.id)).await?;
    tracing::info!(site_is_active = updated.site_is_active, "Toggled site activity");
    Ok(())
}
