use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::get_object::GetObjectError;
use bytes::Bytes;
use tracing::debug;

use super::ObjectStore;
use crate::config::Config;
use crate::error::{EtlError, Result};

/// Error codes S3 returns when the caller's identity is missing or refused.
const AUTH_ERROR_CODES: &[&str] = &[
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
    "AccessDenied",
    "ExpiredToken",
    "InvalidToken",
];

/// Reads objects from a single S3 bucket.
///
/// Credentials, region and endpoint all come from [`Config`]; nothing is
/// read from the ambient environment once the store is built.
pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Store {
    pub async fn new(config: &Config) -> Self {
        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "bengals_etl",
        );

        let mut loader = aws_config::from_env()
            .credentials_provider(credentials)
            .region(aws_config::Region::new(config.region.clone()));
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.endpoint_url.is_some())
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        }
    }

    fn classify<R>(&self, key: &str, err: SdkError<GetObjectError, R>) -> EtlError
    where
        R: std::fmt::Debug + Send + Sync + 'static,
    {
        match err {
            SdkError::ServiceError(service) => {
                classify_service_error(&self.bucket, key, &service.into_err())
            }
            other => EtlError::ObjectStore {
                key: key.to_string(),
                message: DisplayErrorContext(&other).to_string(),
            },
        }
    }
}

fn classify_service_error(bucket: &str, key: &str, err: &GetObjectError) -> EtlError {
    if let GetObjectError::NoSuchKey(_) = err {
        return EtlError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        };
    }
    classify_code(bucket, key, err.code(), err.message())
}

/// Maps an S3 error code and message onto the crate's error kinds.
fn classify_code(bucket: &str, key: &str, code: Option<&str>, message: Option<&str>) -> EtlError {
    let code = code.unwrap_or_default();
    let message = message.unwrap_or(code).to_string();

    if code == "NoSuchKey" {
        EtlError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    } else if AUTH_ERROR_CODES.contains(&code) {
        EtlError::Credentials {
            key: key.to_string(),
            message,
        }
    } else {
        EtlError::ObjectStore {
            key: key.to_string(),
            message: format!("{code}: {message}"),
        }
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3Store {
    async fn get_object(&self, key: &str) -> Result<Bytes> {
        debug!(bucket = %self.bucket, key, "Fetching object");

        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| self.classify(key, e))?;

        let body = resp.body.collect().await.map_err(|e| EtlError::ObjectStore {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        Ok(body.into_bytes())
    }
}
