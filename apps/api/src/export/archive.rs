//! Post-export side effects: archive the PDF and count the download.
//!
//! Runs after the response has been decided. Failures are logged by the caller
//! and never change what the user receives.

use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use redis::AsyncCommands;
use redis::Client as RedisClient;
use tracing::info;
use uuid::Uuid;

/// Destination for exported documents.
#[async_trait]
pub trait ExportArchive: Send + Sync {
    async fn archive(&self, user_id: Uuid, resume_id: Uuid, pdf: Bytes) -> Result<()>;
}

pub fn export_key(user_id: Uuid, resume_id: Uuid) -> String {
    format!("exports/{user_id}/{resume_id}.pdf")
}

pub fn download_counter_key(resume_id: Uuid) -> String {
    format!("downloads:{resume_id}")
}

/// Uploads to S3 (or MinIO) and bumps a Redis download counter.
pub struct S3Archive {
    s3: S3Client,
    bucket: String,
    redis: RedisClient,
}

impl S3Archive {
    pub fn new(s3: S3Client, bucket: String, redis: RedisClient) -> Self {
        Self { s3, bucket, redis }
    }
}

#[async_trait]
impl ExportArchive for S3Archive {
    async fn archive(&self, user_id: Uuid, resume_id: Uuid, pdf: Bytes) -> Result<()> {
        let key = export_key(user_id, resume_id);
        self.s3
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(pdf))
            .content_type("application/pdf")
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("S3 upload failed: {e}"))?;

        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let downloads: i64 = conn.incr(download_counter_key(resume_id), 1).await?;

        info!(
            %user_id,
            %resume_id,
            downloads,
            "archived export to s3://{}/{}", self.bucket, key
        );
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_scoped_by_user_and_resume() {
        let user = Uuid::nil();
        let resume = Uuid::from_u128(7);
        assert_eq!(
            export_key(user, resume),
            format!("exports/{user}/{resume}.pdf")
        );
        assert_eq!(download_counter_key(resume), format!("downloads:{resume}"));
    }
}
