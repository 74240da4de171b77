use crate::config::CloudinaryConfig;
use crate::error::{AppError, AppResult};
use crate::models::MediaKind;
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::Path;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub secure_url: Option<String>,
    pub public_id: Option<String>,
}

#[derive(Clone)]
pub struct CloudinaryService {
    client: Client,
    config: CloudinaryConfig,
}

impl CloudinaryService {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// 对象存储按 image / video 两条管线接收; 音频走 video 管线
    fn resource_type(kind: MediaKind) -> &'static str {
        match kind {
            MediaKind::Image => "image",
            MediaKind::Audio | MediaKind::Video => "video",
        }
    }

    /// 待签名参数串: 按 key 字典序排列的 key=value, 以 & 连接
    fn signing_string(params: &[(&str, &str)]) -> String {
        let mut pairs: Vec<String> = params
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        pairs.sort();
        pairs.join("&")
    }

    fn sign(&self, params: &[(&str, &str)]) -> String {
        let to_sign = format!("{}{}", Self::signing_string(params), self.config.api_secret);
        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// 上传本地文件, 成功返回持久 URL; 失败即整体失败, 由调用方决定是否重新提交
    pub async fn upload_file(
        &self,
        path: &Path,
        kind: MediaKind,
        folder: &str,
        file_name: Option<&str>,
    ) -> AppResult<String> {
        let public_id = Uuid::new_v4().to_string();
        let folder = format!("{}/{}", self.config.folder, folder);
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = self.sign(&[
            ("folder", folder.as_str()),
            ("public_id", public_id.as_str()),
            ("timestamp", timestamp.as_str()),
        ]);

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            AppError::InternalError(format!("Failed to read upload file: {e}"))
        })?;
        let mut part = reqwest::multipart::Part::bytes(bytes);
        if let Some(name) = file_name {
            part = part.file_name(name.to_string());
        }

        let form = reqwest::multipart::Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("public_id", public_id)
            .text("folder", folder)
            .text("signature_algorithm", "sha256")
            .text("signature", signature)
            .part("file", part);

        let url = format!(
            "{}/v1_1/{}/{}/upload",
            self.config.base_url,
            self.config.cloud_name,
            Self::resource_type(kind)
        );

        let response = self.client.post(&url).multipart(form).send().await?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("Asset upload failed: {}", error_text);
            return Err(AppError::ExternalApiError(format!(
                "Asset upload failed: {error_text}"
            )));
        }

        let result: UploadResponse = response.json().await?;
        let secure_url = result.secure_url.ok_or_else(|| {
            AppError::ExternalApiError("Upload response missing secure_url".to_string())
        })?;

        log::info!(
            "Asset uploaded: public_id={:?}, url={}",
            result.public_id,
            secure_url
        );

        Ok(secure_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> CloudinaryService {
        CloudinaryService::new(CloudinaryConfig {
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            base_url: "https://api.cloudinary.com".to_string(),
            folder: "investment-products".to_string(),
        })
    }

    #[test]
    fn test_signing_string_sorted_by_key() {
        let s = CloudinaryService::signing_string(&[
            ("timestamp", "1700000000"),
            ("folder", "investment-products/images"),
            ("public_id", "abc"),
        ]);
        assert_eq!(
            s,
            "folder=investment-products/images&public_id=abc&timestamp=1700000000"
        );
    }

    #[test]
    fn test_sign_is_deterministic_hex() {
        let svc = service();
        let params = [("public_id", "abc"), ("timestamp", "1700000000")];
        let first = svc.sign(&params);
        let second = svc.sign(&params);
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_resource_type_mapping() {
        assert_eq!(CloudinaryService::resource_type(MediaKind::Image), "image");
        assert_eq!(CloudinaryService::resource_type(MediaKind::Audio), "video");
        assert_eq!(CloudinaryService::resource_type(MediaKind::Video), "video");
    }
}
