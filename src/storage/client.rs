use async_trait::async_trait;

use crate::error::AppError;

/// A raw file attached to a bulk import, keyed by the name its markup
/// image references use.
#[derive(Debug, Clone)]
pub struct PendingAsset {
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Trait for asset storage operations (S3-compatible).
///
/// Abstracted as a trait so tests can use a mock without a real S3
/// instance. Every image or PDF referenced by the resource tree goes
/// through here before parsing, so the tree only ever carries resolved
/// URLs.
#[async_trait]
pub trait AssetStorage: Send + Sync {
    /// Upload an asset and return its opaque URL.
    ///
    /// Only image and PDF content types are accepted.
    async fn upload_asset(
        &self,
        file_name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<String, AppError>;
}

/// Content types the platform accepts: images for topics and sub-topics,
/// PDFs for past papers.
pub fn supported_content_type(content_type: &str) -> bool {
    content_type.starts_with("image/") || content_type == "application/pdf"
}

/// Infer a content type from a file name's extension.
pub fn content_type_for(file_name: &str) -> &'static str {
    if file_name.ends_with(".png") {
        "image/png"
    } else if file_name.ends_with(".jpg") || file_name.ends_with(".jpeg") {
        "image/jpeg"
    } else if file_name.ends_with(".gif") {
        "image/gif"
    } else if file_name.ends_with(".webp") {
        "image/webp"
    } else if file_name.ends_with(".svg") {
        "image/svg+xml"
    } else if file_name.ends_with(".pdf") {
        "application/pdf"
    } else {
        "application/octet-stream"
    }
}

/// S3 implementation of AssetStorage.
pub struct S3AssetStorage {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3AssetStorage {
    /// Create a new S3 asset storage client.
    ///
    /// Configuration is read from environment variables:
    /// - `S3_BUCKET` — the bucket name
    /// - `S3_ENDPOINT` (optional) — custom endpoint for MinIO / LocalStack
    /// - `AWS_REGION` or `S3_REGION` — the AWS region
    pub async fn from_env() -> Result<Self, AppError> {
        let bucket = std::env::var("S3_BUCKET")
            .map_err(|_| AppError::Storage("S3_BUCKET not set".into()))?;

        let mut config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

        // Support custom S3 endpoint (for MinIO, LocalStack, etc.)
        if let Ok(endpoint) = std::env::var("S3_ENDPOINT") {
            config_loader = config_loader.endpoint_url(&endpoint);
        }

        let sdk_config = config_loader.load().await;
        let client = aws_sdk_s3::Client::new(&sdk_config);

        Ok(Self { client, bucket })
    }

    /// Create with explicit values (useful for testing / DI).
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl AssetStorage for S3AssetStorage {
    async fn upload_asset(
        &self,
        file_name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<String, AppError> {
        if !supported_content_type(content_type) {
            return Err(AppError::BadRequest(
                "Only image and PDF files are allowed".into(),
            ));
        }

        let sanitized: String = file_name
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '.' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let key = format!("assets/{}_{}", uuid::Uuid::new_v4(), sanitized);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(data.into())
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to put object '{}': {}", key, e)))?;

        Ok(format!("/{key}"))
    }
}
