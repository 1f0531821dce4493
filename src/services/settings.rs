use crate::{
    error::AppResult,
    models::{settings, Settings, SettingsModel},
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait};
use tokio::sync::mpsc;

/// Sender half of the settings-update channel. Cloned into request
/// handlers; the single receiver lives inside the scheduler.
#[derive(Clone)]
pub struct SettingsEvents {
    tx: mpsc::UnboundedSender<SettingsModel>,
}

impl SettingsEvents {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SettingsModel>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Best-effort: a missing subscriber (scheduler stopped) must not
    /// fail the write that triggered the event.
    pub fn publish(&self, update: SettingsModel) {
        if self.tx.send(update).is_err() {
            tracing::debug!("Settings update dropped: no subscriber");
        }
    }
}

pub struct SettingsService {
    db: DatabaseConnection,
    events: SettingsEvents,
}

impl SettingsService {
    pub fn new(db: DatabaseConnection, events: SettingsEvents) -> Self {
        Self { db, events }
    }

    /// Current settings, or the built-in defaults when the table has
    /// never been written.
    pub async fn get(&self) -> AppResult<SettingsModel> {
        match Settings::find().one(&self.db).await? {
            Some(model) => Ok(model),
            None => Ok(default_settings()),
        }
    }

    /// Full-replace write: the settings document is deleted and
    /// recreated, then the update is published to the scheduler.
    pub async fn set(
        &self,
        site_is_active: bool,
        updated_by: Option<i32>,
    ) -> AppResult<SettingsModel> {
        let now = chrono::Utc::now().naive_utc();
        Settings::delete_many().exec(&self.db).await?;
        let created = settings::ActiveModel {
            site_is_active: sea_orm::ActiveValue::Set(site_is_active),
            updated_by: sea_orm::ActiveValue::Set(updated_by),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        self.events.publish(created.clone());
        Ok(created)
    }
}

/// The site starts active before any admin has touched the settings.
pub fn default_settings() -> SettingsModel {
    let now = chrono::Utc::now().naive_utc();
    SettingsModel {
        id: 0,
        site_is_active: true,
        updated_by: None,
        created_at: now,
        updated_at: now,
    }
}
