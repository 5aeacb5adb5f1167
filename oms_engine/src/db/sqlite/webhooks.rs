use chrono::Utc;
use log::debug;
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::{db::traits::StoreError, db_types::WebhookRegistration};

/// Creates the tenant's webhook registration, or replaces the URL if one already exists.
pub async fn upsert_webhook(
    tenant_id: &Uuid,
    url: &str,
    conn: &mut SqliteConnection,
) -> Result<WebhookRegistration, StoreError> {
    let registration = sqlx::query_as(
        r#"
            INSERT INTO webhooks (tenant_id, url, created_at) VALUES ($1, $2, $3)
            ON CONFLICT (tenant_id) DO UPDATE SET url = excluded.url, created_at = excluded.created_at
            RETURNING *;
        "#,
    )
    .bind(tenant_id)
    .bind(url)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Webhook for tenant {tenant_id} set to {url}");
    Ok(registration)
}

pub async fn fetch_webhook(
    tenant_id: &Uuid,
    conn: &mut SqliteConnection,
) -> Result<Option<WebhookRegistration>, StoreError> {
    let registration =
        sqlx::query_as("SELECT * FROM webhooks WHERE tenant_id = $1").bind(tenant_id).fetch_optional(conn).await?;
    Ok(registration)
}
