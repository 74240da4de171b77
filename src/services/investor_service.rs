use crate::entities::{investor_entity as investors, product_entity as products};
use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

#[derive(Clone)]
pub struct InvestorService {
    pool: std::sync::Arc<DatabaseConnection>,
}

impl InvestorService {
    pub fn new(pool: impl Into<std::sync::Arc<DatabaseConnection>>) -> Self {
        Self { pool: pool.into() }
    }

    /// 记录一笔出资, 初始状态为 pending; 确认由独立流程完成
    pub async fn create_investment(
        &self,
        request: CreateInvestorRequest,
    ) -> AppResult<InvestorResponse> {
        let investor_name = request.investor_name.trim().to_string();
        if investor_name.is_empty() {
            return Err(AppError::ValidationError(
                "investorName is required".to_string(),
            ));
        }
        let email = request.email.trim().to_string();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::ValidationError(
                "A valid email is required".to_string(),
            ));
        }
        if request.investment_amount <= 0 {
            return Err(AppError::ValidationError(
                "investmentAmount must be greater than 0".to_string(),
            ));
        }

        let product = products::Entity::find_by_id(request.product_id)
            .one(&*self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Investment product not found".to_string()))?;

        if !product.is_active {
            return Err(AppError::ValidationError(
                "Product is not open for investment".to_string(),
            ));
        }
        if request.investment_amount < product.minimum_investment {
            return Err(AppError::ValidationError(format!(
                "investmentAmount is below the minimum investment of {}",
                product.minimum_investment
            )));
        }

        let now = Utc::now();
        let model = investors::ActiveModel {
            product_id: Set(request.product_id),
            investor_name: Set(investor_name),
            email: Set(email),
            investment_amount: Set(request.investment_amount),
            payment_status: Set(PaymentStatus::Pending.as_str().to_string()),
            investment_date: Set(now),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let created = model.insert(&*self.pool).await?;
        log::info!(
            "Investment recorded: id={}, product_id={}, amount={}",
            created.id,
            created.product_id,
            created.investment_amount
        );

        Ok(InvestorResponse::from(created))
    }

    /// 确认出资: 置为 completed 并以原子增量把金额计入产品融资额.
    /// 重复确认是幂等的; 增量绝不能以读-改-写方式实现, 否则并发确认会丢更新
    pub async fn confirm_investment(&self, id: i64) -> AppResult<ConfirmInvestmentResponse> {
        let txn = self.pool.begin().await?;

        let investor = investors::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Investor record not found".to_string()))?;

        match PaymentStatus::parse(&investor.payment_status) {
            Some(PaymentStatus::Completed) => {
                // 已经入账, 返回当前账本状态
                let product = products::Entity::find_by_id(investor.product_id)
                    .one(&txn)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound("Investment product not found".to_string())
                    })?;
                txn.commit().await?;
                return Ok(Self::ledger_snapshot(investor, &product));
            }
            Some(PaymentStatus::Failed) => {
                return Err(AppError::ValidationError(
                    "Investment has already failed and cannot be confirmed".to_string(),
                ));
            }
            _ => {}
        }

        let now = Utc::now();
        let amount = investor.investment_amount;
        let product_id = investor.product_id;

        let mut model = investor.into_active_model();
        model.payment_status = Set(PaymentStatus::Completed.as_str().to_string());
        model.updated_at = Set(now);
        let confirmed = model.update(&txn).await?;

        // 原子增量, 由存储层串行化并发确认
        products::Entity::update_many()
            .col_expr(
                products::Column::CurrentFunding,
                Expr::col(products::Column::CurrentFunding).add(amount),
            )
            .col_expr(products::Column::UpdatedAt, Expr::value(now))
            .filter(products::Column::Id.eq(product_id))
            .exec(&txn)
            .await?;

        let product = products::Entity::find_by_id(product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Investment product not found".to_string()))?;

        txn.commit().await?;
        log::info!(
            "Investment confirmed: id={}, product_id={}, amount={}",
            confirmed.id,
            product_id,
            amount
        );

        Ok(Self::ledger_snapshot(confirmed, &product))
    }

    /// 标记出资失败; 终态记录不再变化
    pub async fn fail_investment(&self, id: i64) -> AppResult<InvestorResponse> {
        let investor = investors::Entity::find_by_id(id)
            .one(&*self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Investor record not found".to_string()))?;

        match PaymentStatus::parse(&investor.payment_status) {
            Some(PaymentStatus::Completed) => {
                return Err(AppError::ValidationError(
                    "Completed investment cannot be marked as failed".to_string(),
                ));
            }
            Some(PaymentStatus::Failed) => {
                return Ok(InvestorResponse::from(investor));
            }
            _ => {}
        }

        let mut model = investor.into_active_model();
        model.payment_status = Set(PaymentStatus::Failed.as_str().to_string());
        model.updated_at = Set(Utc::now());
        let failed = model.update(&*self.pool).await?;

        log::info!("Investment failed: id={}", failed.id);
        Ok(InvestorResponse::from(failed))
    }

    /// 某产品的已完成出资列表, 新的在前
    pub async fn list_product_investors(
        &self,
        product_id: i64,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<InvestorResponse>> {
        products::Entity::find_by_id(product_id)
            .one(&*self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Investment product not found".to_string()))?;

        #[derive(Debug, sea_orm::FromQueryResult)]
        struct CountRow {
            count: i64,
        }
        let total = investors::Entity::find()
            .filter(investors::Column::ProductId.eq(product_id))
            .filter(investors::Column::PaymentStatus.eq(PaymentStatus::Completed.as_str()))
            .select_only()
            .column_as(Expr::val(1).count(), "count")
            .into_model::<CountRow>()
            .one(&*self.pool)
            .await?
            .map(|r| r.count)
            .unwrap_or(0);

        let models = investors::Entity::find()
            .filter(investors::Column::ProductId.eq(product_id))
            .filter(investors::Column::PaymentStatus.eq(PaymentStatus::Completed.as_str()))
            .order_by_desc(investors::Column::InvestmentDate)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&*self.pool)
            .await?;

        let items = models.into_iter().map(InvestorResponse::from).collect();
        Ok(PaginatedResponse::new(items, params, total))
    }

    fn ledger_snapshot(
        investor: investors::Model,
        product: &products::Model,
    ) -> ConfirmInvestmentResponse {
        ConfirmInvestmentResponse {
            investor: InvestorResponse::from(investor),
            current_funding: product.current_funding,
            funding_percentage: product.funding_percentage(),
            remaining_amount: product.remaining_amount(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;

    fn product_model(id: i64, current_funding: i64) -> products::Model {
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
            current_funding,
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

    fn investor_model(id: i64, product_id: i64, amount: i64, status: &str) -> investors::Model {
        let now = Utc::now();
        investors::Model {
            id,
            product_id,
            investor_name: "Jamie Park".to_string(),
            email: "jamie@example.com".to_string(),
            investment_amount: amount,
            payment_status: status.to_string(),
            investment_date: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_confirm_applies_atomic_increment() {
        let pending = investor_model(5, 1, 300_000, "pending");
        let completed = investor_model(5, 1, 300_000, "completed");

        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![pending]])
            .append_exec_results([
                // UPDATE investors SET payment_status = 'completed', ...
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                // UPDATE products SET current_funding = current_funding + 300000, ...
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .append_query_results([vec![completed]])
            .append_query_results([vec![product_model(1, 500_000)]])
            .into_connection();

        let service = InvestorService::new(db);
        let response = service.confirm_investment(5).await.unwrap();

        assert_eq!(response.investor.payment_status, "completed");
        assert_eq!(response.current_funding, 500_000);
        assert_eq!(response.funding_percentage, 50.0);
        assert_eq!(response.remaining_amount, 500_000);
    }

    #[tokio::test]
    async fn test_confirm_is_idempotent_for_completed_investment() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![investor_model(5, 1, 300_000, "completed")]])
            .append_query_results([vec![product_model(1, 500_000)]])
            .into_connection();

        let service = InvestorService::new(db);
        let response = service.confirm_investment(5).await.unwrap();

        // 不追加增量, 直接返回当前账本状态
        assert_eq!(response.current_funding, 500_000);
    }

    #[tokio::test]
    async fn test_confirm_rejects_failed_investment() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![investor_model(5, 1, 300_000, "failed")]])
            .into_connection();

        let service = InvestorService::new(db);
        assert!(matches!(
            service.confirm_investment(5).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_confirm_unknown_investor_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([Vec::<investors::Model>::new()])
            .into_connection();

        let service = InvestorService::new(db);
        assert!(matches!(
            service.confirm_investment(404).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_investment_below_minimum_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![product_model(1, 0)]])
            .into_connection();

        let service = InvestorService::new(db);
        let request = CreateInvestorRequest {
            product_id: 1,
            investor_name: "Jamie Park".to_string(),
            email: "jamie@example.com".to_string(),
            investment_amount: 500,
        };

        assert!(matches!(
            service.create_investment(request).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_create_investment_rejects_non_positive_amount() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let service = InvestorService::new(db);
        let request = CreateInvestorRequest {
            product_id: 1,
            investor_name: "Jamie Park".to_string(),
            email: "jamie@example.com".to_string(),
            investment_amount: 0,
        };

        assert!(matches!(
            service.create_investment(request).await,
            Err(AppError::ValidationError(_))
        ));
    }
}
