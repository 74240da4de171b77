use crate::entities::{investor_entity as investors, product_entity as products};
use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    Order, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;

#[derive(Clone)]
pub struct ProductService {
    pool: std::sync::Arc<DatabaseConnection>,
}

impl ProductService {
    pub fn new(pool: impl Into<std::sync::Arc<DatabaseConnection>>) -> Self {
        Self { pool: pool.into() }
    }

    /// 创建产品; 媒体 URL 已在摄取阶段全部就绪, 入库一次完成
    pub async fn create_product(
        &self,
        data: ValidatedProduct,
        media: MediaUrls,
    ) -> AppResult<ProductResponse> {
        let now = Utc::now();
        let model = products::ActiveModel {
            title: Set(data.title),
            description: Set(data.description),
            artist_name: Set(data.artist_name),
            producer_name: Set(data.producer_name),
            label_name: Set(data.label_name),
            category: Set(data.category.as_str().to_string()),
            genre: Set(data.genre.map(|g| g.as_str().to_string())),
            total_budget: Set(data.total_budget),
            current_funding: Set(0),
            minimum_investment: Set(data.minimum_investment),
            cover_image: Set(media.cover_image),
            album_art: Set(media.album_art),
            poster_image: Set(media.poster_image),
            video_thumbnail: Set(media.video_thumbnail),
            video_file: Set(media.video_file),
            gallery_images: Set(serde_json::json!(media.gallery_images)),
            demo_track: Set(media.demo_track),
            full_track: Set(media.full_track),
            expected_duration: Set(data.expected_duration),
            status: Set(data.status.as_str().to_string()),
            target_audience: Set(serde_json::json!(data.target_audience)),
            is_featured: Set(data.is_featured),
            is_active: Set(data.is_active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let created = model.insert(&*self.pool).await?;
        log::info!("Product created: id={}, title={}", created.id, created.title);

        Ok(ProductResponse::from(created))
    }

    /// 产品详情, 附带融资统计与最近 5 笔已完成出资
    pub async fn get_product(&self, id: i64) -> AppResult<ProductDetailResponse> {
        let product = products::Entity::find_by_id(id)
            .one(&*self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Investment product not found".to_string()))?;

        #[derive(Debug, sea_orm::FromQueryResult)]
        struct CountRow {
            count: i64,
        }
        let total_investors = investors::Entity::find()
            .filter(investors::Column::ProductId.eq(id))
            .filter(investors::Column::PaymentStatus.eq(PaymentStatus::Completed.as_str()))
            .select_only()
            .column_as(Expr::val(1).count(), "count")
            .into_model::<CountRow>()
            .one(&*self.pool)
            .await?
            .map(|r| r.count)
            .unwrap_or(0);

        let recent = investors::Entity::find()
            .filter(investors::Column::ProductId.eq(id))
            .filter(investors::Column::PaymentStatus.eq(PaymentStatus::Completed.as_str()))
            .order_by_desc(investors::Column::InvestmentDate)
            .limit(5)
            .all(&*self.pool)
            .await?;

        let average_investment = if total_investors > 0 {
            product.current_funding / total_investors
        } else {
            0
        };

        Ok(ProductDetailResponse {
            product: ProductResponse::from(product).with_investors(total_investors),
            average_investment,
            recent_investments: recent.into_iter().map(InvestorResponse::from).collect(),
        })
    }

    /// 目录查询: 过滤 + 排序 + 分页, 每页只做一次投资人数量的分组统计
    pub async fn list_products(
        &self,
        query: &ProductListQuery,
    ) -> AppResult<PaginatedResponse<ProductResponse>> {
        let params = PaginationParams::new(query.page, query.limit);

        let mut cond = Condition::all();
        if let Some(category) = query.category.as_deref().filter(|c| !c.is_empty()) {
            cond = cond.add(products::Column::Category.eq(category));
        }
        if let Some(status) = query.status.as_deref().filter(|s| !s.is_empty()) {
            cond = cond.add(products::Column::Status.eq(status));
        }
        if let Some(featured) = query.featured {
            cond = cond.add(products::Column::IsFeatured.eq(featured));
        }
        // 未显式指定时只返回对投资人可见的产品
        cond = cond.add(products::Column::IsActive.eq(query.active.unwrap_or(true)));

        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            cond = cond.add(
                Condition::any()
                    .add(products::Column::Title.contains(search))
                    .add(products::Column::ArtistName.contains(search))
                    .add(products::Column::Description.contains(search)),
            );
        }

        #[derive(Debug, sea_orm::FromQueryResult)]
        struct CountRow {
            count: i64,
        }
        let total = products::Entity::find()
            .filter(cond.clone())
            .select_only()
            .column_as(Expr::val(1).count(), "count")
            .into_model::<CountRow>()
            .one(&*self.pool)
            .await?
            .map(|r| r.count)
            .unwrap_or(0);

        let order = match query.sort_order.as_deref() {
            Some("asc") => Order::Asc,
            _ => Order::Desc,
        };
        let models = products::Entity::find()
            .filter(cond)
            .order_by(Self::sort_column(query.sort_by.as_deref()), order)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&*self.pool)
            .await?;

        let counts = self.completed_investor_counts(&models).await?;
        let items = models
            .into_iter()
            .map(|m| {
                let investor_count = counts.get(&m.id).copied().unwrap_or(0);
                ProductResponse::from(m).with_investors(investor_count)
            })
            .collect();

        Ok(PaginatedResponse::new(items, &params, total))
    }

    fn sort_column(sort_by: Option<&str>) -> products::Column {
        match sort_by.unwrap_or("createdAt") {
            "productTitle" | "title" => products::Column::Title,
            "totalBudget" => products::Column::TotalBudget,
            "currentFunding" => products::Column::CurrentFunding,
            "minimumInvestment" => products::Column::MinimumInvestment,
            "updatedAt" => products::Column::UpdatedAt,
            _ => products::Column::CreatedAt,
        }
    }

    /// 当前页产品的已完成投资人数量, 单次分组查询
    async fn completed_investor_counts(
        &self,
        models: &[products::Model],
    ) -> AppResult<HashMap<i64, i64>> {
        let ids: Vec<i64> = models.iter().map(|m| m.id).collect();
        let mut counts = HashMap::new();
        if ids.is_empty() {
            return Ok(counts);
        }

        #[derive(Debug, sea_orm::FromQueryResult)]
        struct InvestorCountRow {
            product_id: i64,
            investor_count: i64,
        }
        let rows = investors::Entity::find()
            .filter(investors::Column::ProductId.is_in(ids))
            .filter(investors::Column::PaymentStatus.eq(PaymentStatus::Completed.as_str()))
            .select_only()
            .column(investors::Column::ProductId)
            .column_as(Expr::val(1).count(), "investor_count")
            .group_by(investors::Column::ProductId)
            .into_model::<InvestorCountRow>()
            .all(&*self.pool)
            .await?;

        for row in rows {
            counts.insert(row.product_id, row.investor_count);
        }
        Ok(counts)
    }

    /// 部分字段更新; 更新字段沿用创建时的校验规则
    pub async fn update_product(
        &self,
        id: i64,
        request: UpdateProductRequest,
    ) -> AppResult<ProductResponse> {
        let product = products::Entity::find_by_id(id)
            .one(&*self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Investment product not found".to_string()))?;

        let mut model = product.into_active_model();

        if let Some(title) = request.title {
            let trimmed = title.trim().to_string();
            if trimmed.is_empty() {
                return Err(AppError::ValidationError(
                    "productTitle is required".to_string(),
                ));
            }
            model.title = Set(trimmed);
        }
        if let Some(description) = request.description {
            let trimmed = description.trim().to_string();
            if trimmed.is_empty() {
                return Err(AppError::ValidationError(
                    "description is required".to_string(),
                ));
            }
            model.description = Set(trimmed);
        }
        if let Some(artist_name) = request.artist_name {
            let trimmed = artist_name.trim().to_string();
            if trimmed.is_empty() {
                return Err(AppError::ValidationError(
                    "artistName is required".to_string(),
                ));
            }
            model.artist_name = Set(trimmed);
        }
        if let Some(producer_name) = request.producer_name {
            let trimmed = producer_name.trim().to_string();
            model.producer_name = Set(if trimmed.is_empty() { None } else { Some(trimmed) });
        }
        if let Some(label_name) = request.label_name {
            let trimmed = label_name.trim().to_string();
            model.label_name = Set(if trimmed.is_empty() { None } else { Some(trimmed) });
        }
        if let Some(category) = request.category {
            let category = Category::parse(category.trim()).ok_or_else(|| {
                AppError::ValidationError(format!("Unknown category: {category}"))
            })?;
            model.category = Set(category.as_str().to_string());
        }
        if let Some(genre) = request.genre {
            let trimmed = genre.trim();
            if trimmed.is_empty() {
                model.genre = Set(None);
            } else {
                let genre = Genre::parse(trimmed).ok_or_else(|| {
                    AppError::ValidationError(format!("Unknown genre: {trimmed}"))
                })?;
                model.genre = Set(Some(genre.as_str().to_string()));
            }
        }
        if let Some(total_budget) = request.total_budget {
            if total_budget <= 0 {
                return Err(AppError::ValidationError(
                    "totalBudget must be greater than 0".to_string(),
                ));
            }
            model.total_budget = Set(total_budget);
        }
        if let Some(minimum_investment) = request.minimum_investment {
            if minimum_investment <= 0 {
                return Err(AppError::ValidationError(
                    "minimumInvestment must be greater than 0".to_string(),
                ));
            }
            model.minimum_investment = Set(minimum_investment);
        }
        if let Some(expected_duration) = request.expected_duration {
            let trimmed = expected_duration.trim().to_string();
            model.expected_duration = Set(if trimmed.is_empty() { None } else { Some(trimmed) });
        }
        if let Some(status) = request.status {
            let status = ProductStatus::parse(status.trim()).ok_or_else(|| {
                AppError::ValidationError(format!("Unknown productStatus: {status}"))
            })?;
            model.status = Set(status.as_str().to_string());
        }
        if let Some(target_audience) = request.target_audience {
            model.target_audience = Set(serde_json::json!(target_audience.into_vec()));
        }
        if let Some(is_featured) = request.is_featured {
            model.is_featured = Set(is_featured);
        }
        if let Some(is_active) = request.is_active {
            model.is_active = Set(is_active);
        }

        if let Some(url) = request.cover_image {
            validate_url("coverImage", &url)?;
            model.cover_image = Set(Some(url));
        }
        if let Some(url) = request.album_art {
            validate_url("albumArt", &url)?;
            model.album_art = Set(Some(url));
        }
        if let Some(url) = request.poster_image {
            validate_url("posterImage", &url)?;
            model.poster_image = Set(Some(url));
        }
        if let Some(url) = request.video_thumbnail {
            validate_url("videoThumbnail", &url)?;
            model.video_thumbnail = Set(Some(url));
        }
        if let Some(url) = request.video_file {
            validate_url("videoFile", &url)?;
            model.video_file = Set(Some(url));
        }
        if let Some(url) = request.demo_track {
            validate_url("demoTrack", &url)?;
            model.demo_track = Set(Some(url));
        }
        if let Some(url) = request.full_track {
            validate_url("fullTrack", &url)?;
            model.full_track = Set(Some(url));
        }
        if let Some(gallery) = request.gallery_images {
            for url in &gallery {
                validate_url("galleryImages", url)?;
            }
            model.gallery_images = Set(serde_json::json!(gallery));
        }

        model.updated_at = Set(Utc::now());

        let updated = model.update(&*self.pool).await?;
        log::info!("Product updated: id={}", updated.id);

        Ok(ProductResponse::from(updated))
    }

    /// 媒体重新摄取后的落库; 只覆盖本次上传出现的槽位
    pub async fn apply_media(&self, id: i64, media: MediaUrls) -> AppResult<ProductResponse> {
        let product = products::Entity::find_by_id(id)
            .one(&*self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Investment product not found".to_string()))?;

        let mut model = product.into_active_model();

        if let Some(url) = media.cover_image {
            model.cover_image = Set(Some(url));
        }
        if let Some(url) = media.album_art {
            model.album_art = Set(Some(url));
        }
        if let Some(url) = media.poster_image {
            model.poster_image = Set(Some(url));
        }
        if let Some(url) = media.video_thumbnail {
            model.video_thumbnail = Set(Some(url));
        }
        if let Some(url) = media.video_file {
            model.video_file = Set(Some(url));
        }
        if let Some(url) = media.demo_track {
            model.demo_track = Set(Some(url));
        }
        if let Some(url) = media.full_track {
            model.full_track = Set(Some(url));
        }
        if !media.gallery_images.is_empty() {
            model.gallery_images = Set(serde_json::json!(media.gallery_images));
        }

        model.updated_at = Set(Utc::now());

        let updated = model.update(&*self.pool).await?;
        log::info!("Product media updated: id={}", updated.id);

        Ok(ProductResponse::from(updated))
    }

    /// 删除产品并级联删除出资记录; 存在已完成出资时拒绝删除
    pub async fn delete_product(&self, id: i64) -> AppResult<()> {
        let txn = self.pool.begin().await?;

        products::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Investment product not found".to_string()))?;

        // 已入账的钱不能随产品一起消失
        let completed = investors::Entity::find()
            .filter(investors::Column::ProductId.eq(id))
            .filter(investors::Column::PaymentStatus.eq(PaymentStatus::Completed.as_str()))
            .limit(1)
            .all(&txn)
            .await?;
        if !completed.is_empty() {
            return Err(AppError::Conflict(
                "Cannot delete product with completed investments. Please refund investors first."
                    .to_string(),
            ));
        }

        investors::Entity::delete_many()
            .filter(investors::Column::ProductId.eq(id))
            .exec(&txn)
            .await?;
        products::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        log::info!("Product deleted: id={}", id);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;

    fn product_model(id: i64) -> products::Model {
        let now = Utc::now();
        products::Model {
            id,
            title: "Midnight Sessions".to_string(),
            description: "A debut studio album".to_string(),
            artist_name: "Ada Lin".to_string(),
            producer_name: None,
            label_name: None,
            category: "Music".to_string(),
            genre: Some("Indie".to_string()),
            total_budget: 1_000_000,
            current_funding: 500_000,
            minimum_investment: 10_000,
            cover_image: None,
            album_art: None,
            poster_image: None,
            video_thumbnail: None,
            video_file: None,
            gallery_images: json!([]),
            demo_track: None,
            full_track: None,
            expected_duration: None,
            status: "funding".to_string(),
            target_audience: json!([]),
            is_featured: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn investor_model(id: i64, product_id: i64, status: &str) -> investors::Model {
        let now = Utc::now();
        investors::Model {
            id,
            product_id,
            investor_name: "Jamie Park".to_string(),
            email: "jamie@example.com".to_string(),
            investment_amount: 300_000,
            payment_status: status.to_string(),
            investment_date: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_delete_product_with_completed_investor_conflicts() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![product_model(1)]])
            .append_query_results([vec![investor_model(7, 1, "completed")]])
            .into_connection();

        let service = ProductService::new(db);
        let result = service.delete_product(1).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_delete_product_without_completed_investors_cascades() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![product_model(1)]])
            .append_query_results([Vec::<investors::Model>::new()])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();

        let service = ProductService::new(db);
        assert!(service.delete_product(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_unknown_product_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([Vec::<products::Model>::new()])
            .into_connection();

        let service = ProductService::new(db);
        assert!(matches!(
            service.delete_product(42).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_product_rejects_zero_budget() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![product_model(1)]])
            .into_connection();

        let service = ProductService::new(db);
        let request = UpdateProductRequest {
            title: None,
            description: None,
            artist_name: None,
            producer_name: None,
            label_name: None,
            category: None,
            genre: None,
            total_budget: Some(0),
            minimum_investment: None,
            expected_duration: None,
            status: None,
            target_audience: None,
            is_featured: None,
            is_active: None,
            cover_image: None,
            album_art: None,
            poster_image: None,
            video_thumbnail: None,
            video_file: None,
            demo_track: None,
            full_track: None,
            gallery_images: None,
        };

        assert!(matches!(
            service.update_product(1, request).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_sort_column_whitelist() {
        assert!(matches!(
            ProductService::sort_column(Some("totalBudget")),
            products::Column::TotalBudget
        ));
        assert!(matches!(
            ProductService::sort_column(Some("drop table")),
            products::Column::CreatedAt
        ));
        assert!(matches!(
            ProductService::sort_column(None),
            products::Column::CreatedAt
        ));
    }
}
