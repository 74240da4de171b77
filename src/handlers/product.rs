use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::models::*;
use crate::services::{InvestorService, MediaService, ProductService};

/// 创建产品的 multipart 表单; 文件槽位是固定集合, 不做动态字段名查找
#[derive(Debug, MultipartForm)]
pub struct CreateProductForm {
    #[multipart(rename = "productTitle")]
    pub title: Option<Text<String>>,
    pub description: Option<Text<String>>,
    #[multipart(rename = "artistName")]
    pub artist_name: Option<Text<String>>,
    #[multipart(rename = "producerName")]
    pub producer_name: Option<Text<String>>,
    #[multipart(rename = "labelName")]
    pub label_name: Option<Text<String>>,
    pub category: Option<Text<String>>,
    pub genre: Option<Text<String>>,
    #[multipart(rename = "totalBudget")]
    pub total_budget: Option<Text<String>>,
    #[multipart(rename = "minimumInvestment")]
    pub minimum_investment: Option<Text<String>>,
    #[multipart(rename = "expectedDuration")]
    pub expected_duration: Option<Text<String>>,
    #[multipart(rename = "productStatus")]
    pub status: Option<Text<String>>,
    #[multipart(rename = "targetAudience")]
    pub target_audience: Option<Text<String>>,
    #[multipart(rename = "isFeatured")]
    pub is_featured: Option<Text<String>>,
    #[multipart(rename = "isActive")]
    pub is_active: Option<Text<String>>,

    #[multipart(rename = "coverImage", limit = "10MiB")]
    pub cover_image: Option<TempFile>,
    #[multipart(rename = "albumArt", limit = "10MiB")]
    pub album_art: Option<TempFile>,
    #[multipart(rename = "posterImage", limit = "10MiB")]
    pub poster_image: Option<TempFile>,
    #[multipart(rename = "videoThumbnail", limit = "10MiB")]
    pub video_thumbnail: Option<TempFile>,
    #[multipart(rename = "galleryImages", limit = "10MiB")]
    pub gallery_images: Vec<TempFile>,
    #[multipart(rename = "videoFile", limit = "200MiB")]
    pub video_file: Option<TempFile>,
    #[multipart(rename = "demoTrack", limit = "100MiB")]
    pub demo_track: Option<TempFile>,
    #[multipart(rename = "fullTrack", limit = "100MiB")]
    pub full_track: Option<TempFile>,
}

impl CreateProductForm {
    fn input(&self) -> CreateProductInput {
        fn text(field: &Option<Text<String>>) -> Option<String> {
            field.as_ref().map(|t| t.0.clone())
        }

        CreateProductInput {
            title: text(&self.title),
            description: text(&self.description),
            artist_name: text(&self.artist_name),
            producer_name: text(&self.producer_name),
            label_name: text(&self.label_name),
            category: text(&self.category),
            genre: text(&self.genre),
            total_budget: text(&self.total_budget),
            minimum_investment: text(&self.minimum_investment),
            expected_duration: text(&self.expected_duration),
            status: text(&self.status),
            target_audience: text(&self.target_audience),
            is_featured: text(&self.is_featured),
            is_active: text(&self.is_active),
        }
    }

    fn uploads(&self) -> Vec<MediaUpload> {
        let mut uploads = Vec::new();
        push_single(&mut uploads, MediaSlot::CoverImage, self.cover_image.as_ref());
        push_single(&mut uploads, MediaSlot::AlbumArt, self.album_art.as_ref());
        push_single(&mut uploads, MediaSlot::PosterImage, self.poster_image.as_ref());
        push_single(
            &mut uploads,
            MediaSlot::VideoThumbnail,
            self.video_thumbnail.as_ref(),
        );
        push_multi(&mut uploads, MediaSlot::GalleryImages, &self.gallery_images);
        push_single(&mut uploads, MediaSlot::VideoFile, self.video_file.as_ref());
        push_single(&mut uploads, MediaSlot::DemoTrack, self.demo_track.as_ref());
        push_single(&mut uploads, MediaSlot::FullTrack, self.full_track.as_ref());
        uploads
    }
}

/// 已有产品的媒体重新摄取表单
#[derive(Debug, MultipartForm)]
pub struct ProductMediaForm {
    #[multipart(rename = "coverImage", limit = "10MiB")]
    pub cover_image: Option<TempFile>,
    #[multipart(rename = "albumArt", limit = "10MiB")]
    pub album_art: Option<TempFile>,
    #[multipart(rename = "posterImage", limit = "10MiB")]
    pub poster_image: Option<TempFile>,
    #[multipart(rename = "videoThumbnail", limit = "10MiB")]
    pub video_thumbnail: Option<TempFile>,
    #[multipart(rename = "galleryImages", limit = "10MiB")]
    pub gallery_images: Vec<TempFile>,
    #[multipart(rename = "videoFile", limit = "200MiB")]
    pub video_file: Option<TempFile>,
    #[multipart(rename = "demoTrack", limit = "100MiB")]
    pub demo_track: Option<TempFile>,
    #[multipart(rename = "fullTrack", limit = "100MiB")]
    pub full_track: Option<TempFile>,
}

impl ProductMediaForm {
    fn uploads(&self) -> Vec<MediaUpload> {
        let mut uploads = Vec::new();
        push_single(&mut uploads, MediaSlot::CoverImage, self.cover_image.as_ref());
        push_single(&mut uploads, MediaSlot::AlbumArt, self.album_art.as_ref());
        push_single(&mut uploads, MediaSlot::PosterImage, self.poster_image.as_ref());
        push_single(
            &mut uploads,
            MediaSlot::VideoThumbnail,
            self.video_thumbnail.as_ref(),
        );
        push_multi(&mut uploads, MediaSlot::GalleryImages, &self.gallery_images);
        push_single(&mut uploads, MediaSlot::VideoFile, self.video_file.as_ref());
        push_single(&mut uploads, MediaSlot::DemoTrack, self.demo_track.as_ref());
        push_single(&mut uploads, MediaSlot::FullTrack, self.full_track.as_ref());
        uploads
    }
}

fn push_single(uploads: &mut Vec<MediaUpload>, slot: MediaSlot, file: Option<&TempFile>) {
    if let Some(file) = file {
        // 浏览器对未填写的文件控件会提交空文件
        if file.size == 0 {
            return;
        }
        uploads.push(MediaUpload {
            slot,
            path: file.file.path().to_path_buf(),
            file_name: file.file_name.clone(),
        });
    }
}

fn push_multi(uploads: &mut Vec<MediaUpload>, slot: MediaSlot, files: &[TempFile]) {
    for file in files {
        push_single(uploads, slot, Some(file));
    }
}

#[utoipa::path(
    post,
    path = "/products",
    tag = "product",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "创建产品成功", body = ProductResponse),
        (status = 400, description = "字段校验失败"),
        (status = 401, description = "未授权"),
        (status = 502, description = "媒体上传失败, 产品未入库")
    )
)]
pub async fn create_product(
    product_service: web::Data<ProductService>,
    media_service: web::Data<MediaService>,
    MultipartForm(form): MultipartForm<CreateProductForm>,
) -> Result<HttpResponse> {
    // 先校验字段, 再上传媒体, 最后一次性入库
    let validated = match form.input().validate() {
        Ok(v) => v,
        Err(e) => return Ok(e.error_response()),
    };

    let media = match media_service.ingest(form.uploads()).await {
        Ok(m) => m,
        Err(e) => return Ok(e.error_response()),
    };

    match product_service.create_product(validated, media).await {
        Ok(product) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "message": "Investment product added successfully",
            "data": {
                "product": product
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/products",
    tag = "product",
    params(
        ("category" = Option<String>, Query, description = "按分类过滤"),
        ("status" = Option<String>, Query, description = "按状态过滤"),
        ("featured" = Option<bool>, Query, description = "只看推荐位"),
        ("active" = Option<bool>, Query, description = "是否只看上架产品, 默认 true"),
        ("search" = Option<String>, Query, description = "标题/艺人/描述模糊搜索"),
        ("page" = Option<u32>, Query, description = "页码"),
        ("limit" = Option<u32>, Query, description = "每页数量"),
        ("sortBy" = Option<String>, Query, description = "排序字段, 默认 createdAt"),
        ("sortOrder" = Option<String>, Query, description = "asc / desc, 默认 desc")
    ),
    responses(
        (status = 200, description = "获取产品列表成功")
    )
)]
pub async fn list_products(
    product_service: web::Data<ProductService>,
    query: web::Query<ProductListQuery>,
) -> Result<HttpResponse> {
    match product_service.list_products(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "product",
    params(
        ("id" = i64, Path, description = "产品ID")
    ),
    responses(
        (status = 200, description = "获取产品详情成功", body = ProductDetailResponse),
        (status = 404, description = "产品不存在")
    )
)]
pub async fn get_product(
    product_service: web::Data<ProductService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match product_service.get_product(path.into_inner()).await {
        Ok(product) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": {
                "product": product
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/products/{id}",
    tag = "product",
    request_body = UpdateProductRequest,
    params(
        ("id" = i64, Path, description = "产品ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新产品成功", body = ProductResponse),
        (status = 400, description = "字段校验失败"),
        (status = 401, description = "未授权"),
        (status = 404, description = "产品不存在")
    )
)]
pub async fn update_product(
    product_service: web::Data<ProductService>,
    path: web::Path<i64>,
    request: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse> {
    match product_service
        .update_product(path.into_inner(), request.into_inner())
        .await
    {
        Ok(product) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Investment product updated successfully",
            "data": {
                "product": product
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/products/{id}/media",
    tag = "product",
    params(
        ("id" = i64, Path, description = "产品ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "媒体更新成功", body = ProductResponse),
        (status = 400, description = "未提交任何文件"),
        (status = 404, description = "产品不存在"),
        (status = 502, description = "媒体上传失败, 产品保持原状")
    )
)]
pub async fn upload_product_media(
    product_service: web::Data<ProductService>,
    media_service: web::Data<MediaService>,
    path: web::Path<i64>,
    MultipartForm(form): MultipartForm<ProductMediaForm>,
) -> Result<HttpResponse> {
    let uploads = form.uploads();
    if uploads.is_empty() {
        return Ok(crate::error::AppError::ValidationError(
            "No media files provided".to_string(),
        )
        .error_response());
    }

    let media = match media_service.ingest(uploads).await {
        Ok(m) => m,
        Err(e) => return Ok(e.error_response()),
    };

    match product_service.apply_media(path.into_inner(), media).await {
        Ok(product) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Product media updated successfully",
            "data": {
                "product": product
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = "product",
    params(
        ("id" = i64, Path, description = "产品ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除产品成功"),
        (status = 404, description = "产品不存在"),
        (status = 409, description = "存在已完成出资, 拒绝删除")
    )
)]
pub async fn delete_product(
    product_service: web::Data<ProductService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match product_service.delete_product(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Investment product removed successfully"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/products/{id}/investors",
    tag = "product",
    params(
        ("id" = i64, Path, description = "产品ID"),
        ("page" = Option<u32>, Query, description = "页码"),
        ("limit" = Option<u32>, Query, description = "每页数量")
    ),
    responses(
        (status = 200, description = "获取出资列表成功"),
        (status = 404, description = "产品不存在")
    )
)]
pub async fn list_product_investors(
    investor_service: web::Data<InvestorService>,
    path: web::Path<i64>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    match investor_service
        .list_product_investors(path.into_inner(), &query)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn product_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/products")
            .route("", web::get().to(list_products))
            .route("", web::post().to(create_product))
            .route("/{id}", web::get().to(get_product))
            .route("/{id}", web::put().to(update_product))
            .route("/{id}", web::delete().to(delete_product))
            .route("/{id}/media", web::post().to(upload_product_media))
            .route("/{id}/investors", web::get().to(list_product_investors)),
    );
}
