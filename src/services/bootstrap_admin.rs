use crate::config::auth::AdminConfig;
use crate::error::AppResult;
use crate::models::{user, User};
use crate::utils::{generate_referral_code, hash_password};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use super::ADMIN_USERNAME;

/// 启动时确保 admin 账号存在：
/// - 未配置 ADMIN_PASSWORD：跳过（站点切换任务也会随之空转）
/// - 账号已存在：按当前配置重置其密码哈希
/// - 否则创建 admin（is_verified=true，无需邮件验证）
pub async fn ensure_admin(db: &DatabaseConnection) -> AppResult<()> {
    let Some(cfg) = AdminConfig::from_env() else {
        tracing::warn!("ADMIN_PASSWORD not set, skipping admin bootstrap");
        return Ok(());
    };

    let password_hash = hash_password(&cfg.password)?;
    let now = chrono::Utc::now().naive_utc();

    let existing = User::find()
        .filter(user::Column::Username.eq(ADMIN_USERNAME))
        .one(db)
        .await?;

    if let Some(admin) = existing {
        let mut active: user::ActiveModel = admin.into();
        active.password_hash = sea_orm::ActiveValue::Set(password_hash);
        active.updated_at = sea_orm::ActiveValue::Set(now);
        active.update(db).await?;
        tracing::info!("Admin account refreshed");
        return Ok(());
    }

    user::ActiveModel {
        username: sea_orm::ActiveValue::Set(ADMIN_USERNAME.to_string()),
        first_name: sea_orm::ActiveValue::Set("Admin".to_string()),
        last_name: sea_orm::ActiveValue::Set(String::new()),
        password_hash: sea_orm::ActiveValue::Set(password_hash),
        role: sea_orm::ActiveValue::Set(user::ROLE_ADMIN.to_string()),
        referral_code: sea_orm::ActiveValue::Set(generate_referral_code()),
        referred_code: sea_orm::ActiveValue::Set(None),
        profile_image: sea_orm::ActiveValue::Set(None),
        verification_token: sea_orm::ActiveValue::Set(None),
        reset_password_token: sea_orm::ActiveValue::Set(None),
        is_verified: sea_orm::ActiveValue::Set(true),
        is_first_login: sea_orm::ActiveValue::Set(false),
        created_at: sea_orm::ActiveValue::Set(now),
        updated_at: sea_orm::ActiveValue::Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("Admin account created");
    Ok(())
}
