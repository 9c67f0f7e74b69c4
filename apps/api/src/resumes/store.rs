//! Resume persistence.
//!
//! Every operation is scoped by `user_id`: a resume owned by someone else is
//! indistinguishable from one that does not exist.

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::layout::TemplateId;
use crate::models::resume::{NewResume, ResumeContent, ResumeRecord, ResumeUpdate};

#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn create(&self, new: NewResume) -> Result<ResumeRecord, AppError>;

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<ResumeRecord, AppError>;

    /// Most recently updated first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ResumeRecord>, AppError>;

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        update: ResumeUpdate,
    ) -> Result<ResumeRecord, AppError>;

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError>;

    async fn record_download(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError>;
}

pub(crate) fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Resume {id} not found"))
}

// ────────────────────────────────────────────────────────────────────────────
// PostgreSQL
// ────────────────────────────────────────────────────────────────────────────

const CREATE_RESUMES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS resumes (
    id             UUID PRIMARY KEY,
    user_id        UUID NOT NULL,
    name           TEXT NOT NULL,
    template       TEXT NOT NULL,
    content        JSONB NOT NULL,
    download_count BIGINT NOT NULL DEFAULT 0,
    created_at     TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at     TIMESTAMPTZ NOT NULL DEFAULT now()
)"#;

const CREATE_RESUMES_USER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS resumes_user_id_idx ON resumes (user_id, updated_at DESC)";

const RESUME_COLUMNS: &str =
    "id, user_id, name, template, content, download_count, created_at, updated_at";

#[derive(Debug, FromRow)]
struct ResumeRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    template: String,
    content: Json<ResumeContent>,
    download_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ResumeRow {
    fn into_record(self) -> Result<ResumeRecord, AppError> {
        let template = self
            .template
            .parse::<TemplateId>()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("resume {}: {e}", self.id)))?;

        Ok(ResumeRecord {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            template,
            content: self.content.0,
            download_count: self.download_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    /// Connects to PostgreSQL and makes sure the `resumes` table exists.
    pub async fn connect(database_url: &str) -> AnyResult<Self> {
        info!("Connecting to PostgreSQL...");

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        info!("PostgreSQL connection pool established");

        sqlx::query(CREATE_RESUMES_TABLE).execute(&pool).await?;
        sqlx::query(CREATE_RESUMES_USER_INDEX).execute(&pool).await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn create(&self, new: NewResume) -> Result<ResumeRecord, AppError> {
        let row = sqlx::query_as::<_, ResumeRow>(&format!(
            "INSERT INTO resumes (id, user_id, name, template, content) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {RESUME_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(&new.name)
        .bind(new.template.as_str())
        .bind(Json(&new.content))
        .fetch_one(&self.pool)
        .await?;

        info!(user_id = %new.user_id, resume_id = %row.id, "created resume");
        row.into_record()
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<ResumeRecord, AppError> {
        sqlx::query_as::<_, ResumeRow>(&format!(
            "SELECT {RESUME_COLUMNS} FROM resumes WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(id))?
        .into_record()
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ResumeRecord>, AppError> {
        sqlx::query_as::<_, ResumeRow>(&format!(
            "SELECT {RESUME_COLUMNS} FROM resumes WHERE user_id = $1 ORDER BY updated_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(ResumeRow::into_record)
        .collect()
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        update: ResumeUpdate,
    ) -> Result<ResumeRecord, AppError> {
        sqlx::query_as::<_, ResumeRow>(&format!(
            "UPDATE resumes SET name = $3, template = $4, content = $5, updated_at = now() \
             WHERE id = $1 AND user_id = $2 RETURNING {RESUME_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(&update.name)
        .bind(update.template.as_str())
        .bind(Json(&update.content))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(id))?
        .into_record()
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM resumes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        info!(%user_id, resume_id = %id, "deleted resume");
        Ok(())
    }

    async fn record_download(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE resumes SET download_count = download_count + 1 WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory (tests)
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub mod memory {
    use std::collections::HashMap;

    use tokio::sync::RwLock;

    use super::*;

    #[derive(Default)]
    pub struct MemoryResumeStore {
        resumes: RwLock<HashMap<Uuid, ResumeRecord>>,
    }

    #[async_trait]
    impl ResumeStore for MemoryResumeStore {
        async fn create(&self, new: NewResume) -> Result<ResumeRecord, AppError> {
            let now = Utc::now();
            let record = ResumeRecord {
                id: Uuid::new_v4(),
                user_id: new.user_id,
                name: new.name,
                template: new.template,
                content: new.content,
                download_count: 0,
                created_at: now,
                updated_at: now,
            };
            self.resumes.write().await.insert(record.id, record.clone());
            Ok(record)
        }

        async fn get(&self, user_id: Uuid, id: Uuid) -> Result<ResumeRecord, AppError> {
            self.resumes
                .read()
                .await
                .get(&id)
                .filter(|r| r.user_id == user_id)
                .cloned()
                .ok_or_else(|| not_found(id))
        }

        async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ResumeRecord>, AppError> {
            let mut records: Vec<ResumeRecord> = self
                .resumes
                .read()
                .await
                .values()
                .filter(|r| r.user_id == user_id)
                .cloned()
                .collect();
            records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            Ok(records)
        }

        async fn update(
            &self,
            user_id: Uuid,
            id: Uuid,
            update: ResumeUpdate,
        ) -> Result<ResumeRecord, AppError> {
            let mut resumes = self.resumes.write().await;
            let record = resumes
                .get_mut(&id)
                .filter(|r| r.user_id == user_id)
                .ok_or_else(|| not_found(id))?;
            record.name = update.name;
            record.template = update.template;
            record.content = update.content;
            record.updated_at = Utc::now();
            Ok(record.clone())
        }

        async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
            let mut resumes = self.resumes.write().await;
            match resumes.get(&id) {
                Some(r) if r.user_id == user_id => {
                    resumes.remove(&id);
                    Ok(())
                }
                _ => Err(not_found(id)),
            }
        }

        async fn record_download(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
            let mut resumes = self.resumes.write().await;
            let record = resumes
                .get_mut(&id)
                .filter(|r| r.user_id == user_id)
                .ok_or_else(|| not_found(id))?;
            record.download_count += 1;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryResumeStore;
    use super::*;
    use crate::models::resume::PersonalInfo;

    fn new_resume(user_id: Uuid, name: &str) -> NewResume {
        NewResume {
            user_id,
            name: name.to_string(),
            template: TemplateId::Classic,
            content: ResumeContent {
                personal_info: PersonalInfo {
                    full_name: "Jane Doe".to_string(),
                    ..Default::default()
                },
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_other_users_resume_is_not_found() {
        let store = MemoryResumeStore::default();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let created = store.create(new_resume(owner, "Main")).await.unwrap();

        assert!(store.get(owner, created.id).await.is_ok());
        assert!(matches!(
            store.get(stranger, created.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            store.delete(stranger, created.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(store.list_for_user(stranger).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_fields_and_download_counts() {
        let store = MemoryResumeStore::default();
        let owner = Uuid::new_v4();
        let created = store.create(new_resume(owner, "Main")).await.unwrap();

        let updated = store
            .update(
                owner,
                created.id,
                ResumeUpdate {
                    name: "Backend roles".to_string(),
                    template: TemplateId::Minimal,
                    content: created.content.clone(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Backend roles");
        assert_eq!(updated.template, TemplateId::Minimal);

        store.record_download(owner, created.id).await.unwrap();
        store.record_download(owner, created.id).await.unwrap();
        assert_eq!(store.get(owner, created.id).await.unwrap().download_count, 2);
    }

    #[test]
    fn test_row_with_unknown_template_is_rejected() {
        let row = ResumeRow {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            name: "Main".to_string(),
            template: "baroque".to_string(),
            content: Json(ResumeContent::default()),
            download_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(matches!(row.into_record(), Err(AppError::Internal(_))));
    }
}
