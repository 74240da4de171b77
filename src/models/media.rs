use std::path::PathBuf;

/// 固定且可枚举的媒体槽位集合, 不做任何动态字段名查找
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaSlot {
    CoverImage,
    AlbumArt,
    PosterImage,
    VideoThumbnail,
    GalleryImages,
    VideoFile,
    DemoTrack,
    FullTrack,
}

/// 槽位的媒体类型; 决定对象存储侧走哪条处理管线
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Audio,
    Video,
}

impl MediaSlot {
    pub fn field_name(&self) -> &'static str {
        match self {
            MediaSlot::CoverImage => "coverImage",
            MediaSlot::AlbumArt => "albumArt",
            MediaSlot::PosterImage => "posterImage",
            MediaSlot::VideoThumbnail => "videoThumbnail",
            MediaSlot::GalleryImages => "galleryImages",
            MediaSlot::VideoFile => "videoFile",
            MediaSlot::DemoTrack => "demoTrack",
            MediaSlot::FullTrack => "fullTrack",
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            MediaSlot::CoverImage
            | MediaSlot::AlbumArt
            | MediaSlot::PosterImage
            | MediaSlot::VideoThumbnail
            | MediaSlot::GalleryImages => MediaKind::Image,
            MediaSlot::VideoFile => MediaKind::Video,
            MediaSlot::DemoTrack | MediaSlot::FullTrack => MediaKind::Audio,
        }
    }

    /// 对象存储里的子目录
    pub fn folder(&self) -> &'static str {
        match self {
            MediaSlot::GalleryImages => "gallery",
            _ => match self.kind() {
                MediaKind::Image => "images",
                MediaKind::Audio => "audio",
                MediaKind::Video => "video",
            },
        }
    }
}

/// 单个待上传文件
#[derive(Debug)]
pub struct MediaUpload {
    pub slot: MediaSlot,
    pub path: PathBuf,
    pub file_name: Option<String>,
}

/// 一次摄取调用里全部上传成功后, 按槽位聚合出的 URL 映射.
/// 未出现的槽位保持 None, 不会产生空字符串
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MediaUrls {
    pub cover_image: Option<String>,
    pub album_art: Option<String>,
    pub poster_image: Option<String>,
    pub video_thumbnail: Option<String>,
    pub video_file: Option<String>,
    pub gallery_images: Vec<String>,
    pub demo_track: Option<String>,
    pub full_track: Option<String>,
}

impl MediaUrls {
    pub fn insert(&mut self, slot: MediaSlot, url: String) {
        match slot {
            MediaSlot::CoverImage => self.cover_image = Some(url),
            MediaSlot::AlbumArt => self.album_art = Some(url),
            MediaSlot::PosterImage => self.poster_image = Some(url),
            MediaSlot::VideoThumbnail => self.video_thumbnail = Some(url),
            MediaSlot::GalleryImages => self.gallery_images.push(url),
            MediaSlot::VideoFile => self.video_file = Some(url),
            MediaSlot::DemoTrack => self.demo_track = Some(url),
            MediaSlot::FullTrack => self.full_track = Some(url),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cover_image.is_none()
            && self.album_art.is_none()
            && self.poster_image.is_none()
            && self.video_thumbnail.is_none()
            && self.video_file.is_none()
            && self.gallery_images.is_empty()
            && self.demo_track.is_none()
            && self.full_track.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_slots_use_video_pipeline_folder() {
        // 音频走对象存储的 video 管线, 但目录仍按媒体类型区分
        assert_eq!(MediaSlot::DemoTrack.kind(), MediaKind::Audio);
        assert_eq!(MediaSlot::FullTrack.folder(), "audio");
        assert_eq!(MediaSlot::VideoFile.kind(), MediaKind::Video);
        assert_eq!(MediaSlot::CoverImage.folder(), "images");
        assert_eq!(MediaSlot::GalleryImages.folder(), "gallery");
    }

    #[test]
    fn test_media_urls_single_and_multi_slots() {
        let mut urls = MediaUrls::default();
        assert!(urls.is_empty());

        urls.insert(MediaSlot::CoverImage, "https://cdn/a.jpg".to_string());
        urls.insert(MediaSlot::GalleryImages, "https://cdn/g1.jpg".to_string());
        urls.insert(MediaSlot::GalleryImages, "https://cdn/g2.jpg".to_string());

        assert_eq!(urls.cover_image.as_deref(), Some("https://cdn/a.jpg"));
        assert_eq!(urls.gallery_images.len(), 2);
        assert!(urls.album_art.is_none());
        assert!(!urls.is_empty());
    }

    #[test]
    fn test_field_names_are_stable() {
        assert_eq!(MediaSlot::CoverImage.field_name(), "coverImage");
        assert_eq!(MediaSlot::DemoTrack.field_name(), "demoTrack");
    }
}
