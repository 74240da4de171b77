use crate::error::{AppError, AppResult};
use crate::external::CloudinaryService;
use crate::models::{MediaSlot, MediaUpload, MediaUrls};
use futures_util::future::try_join_all;

#[derive(Clone)]
pub struct MediaService {
    cloudinary: CloudinaryService,
}

impl MediaService {
    pub fn new(cloudinary: CloudinaryService) -> Self {
        Self { cloudinary }
    }

    /// 把一组具名槽位的文件并发上传到对象存储.
    /// 任一上传失败则整个调用失败; 结果先全部缓冲, 调用方在拿到完整
    /// URL 映射之前不会写库, 因此不会出现只带一部分媒体的产品记录
    pub async fn ingest(&self, uploads: Vec<MediaUpload>) -> AppResult<MediaUrls> {
        if uploads.is_empty() {
            return Ok(MediaUrls::default());
        }

        let futures = uploads.iter().map(|upload| {
            let cloudinary = &self.cloudinary;
            async move {
                let url = cloudinary
                    .upload_file(
                        &upload.path,
                        upload.slot.kind(),
                        upload.slot.folder(),
                        upload.file_name.as_deref(),
                    )
                    .await
                    .map_err(|e| {
                        log::error!(
                            "Upload failed for field {}: {}",
                            upload.slot.field_name(),
                            e
                        );
                        e
                    })?;
                Ok::<(MediaSlot, String), AppError>((upload.slot, url))
            }
        });

        let results = try_join_all(futures).await?;

        let mut urls = MediaUrls::default();
        for (slot, url) in results {
            urls.insert(slot, url);
        }

        log::info!("Media ingestion completed: {} file(s)", uploads.len());
        Ok(urls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CloudinaryConfig;

    #[tokio::test]
    async fn test_ingest_without_files_returns_empty_map() {
        let service = MediaService::new(CloudinaryService::new(CloudinaryConfig {
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            base_url: "https://api.cloudinary.com".to_string(),
            folder: "investment-products".to_string(),
        }));

        let urls = service.ingest(Vec::new()).await.unwrap();
        assert!(urls.is_empty());
    }
}
