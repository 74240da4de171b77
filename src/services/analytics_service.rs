use crate::entities::{investor_entity as investors, product_entity as products};
use crate::error::AppResult;
use crate::models::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect};

#[derive(Clone)]
pub struct AnalyticsService {
    pool: std::sync::Arc<DatabaseConnection>,
}

impl AnalyticsService {
    pub fn new(pool: impl Into<std::sync::Arc<DatabaseConnection>>) -> Self {
        Self { pool: pool.into() }
    }

    /// 平台汇总, 每次按当前存储状态即时计算
    pub async fn get_analytics(&self) -> AppResult<AnalyticsResponse> {
        let total_products = self.count_products(None).await?;
        let active_products = self
            .count_products(Some(products::Column::IsActive.eq(true)))
            .await?;
        let funding_products = self
            .count_products(Some(
                products::Column::Status.eq(ProductStatus::Funding.as_str()),
            ))
            .await?;

        #[derive(Debug, sea_orm::FromQueryResult)]
        struct SumRow {
            // 空集上 SUM 为 NULL
            total: Option<i64>,
        }
        let total_investment = investors::Entity::find()
            .filter(investors::Column::PaymentStatus.eq(PaymentStatus::Completed.as_str()))
            .select_only()
            .column_as(Expr::col(investors::Column::InvestmentAmount).sum(), "total")
            .into_model::<SumRow>()
            .one(&*self.pool)
            .await?
            .and_then(|r| r.total)
            .unwrap_or(0);

        #[derive(Debug, sea_orm::FromQueryResult)]
        struct CountRow {
            count: i64,
        }
        let total_investors = investors::Entity::find()
            .filter(investors::Column::PaymentStatus.eq(PaymentStatus::Completed.as_str()))
            .select_only()
            .column_as(Expr::val(1).count(), "count")
            .into_model::<CountRow>()
            .one(&*self.pool)
            .await?
            .map(|r| r.count)
            .unwrap_or(0);

        #[derive(Debug, sea_orm::FromQueryResult)]
        struct CategoryCountRow {
            category: String,
            count: i64,
        }
        let category_stats = products::Entity::find()
            .filter(products::Column::IsActive.eq(true))
            .select_only()
            .column(products::Column::Category)
            .column_as(Expr::val(1).count(), "count")
            .group_by(products::Column::Category)
            .into_model::<CategoryCountRow>()
            .all(&*self.pool)
            .await?
            .into_iter()
            .map(|r| CategoryCount {
                category: r.category,
                count: r.count,
            })
            .collect();

        // 排行在应用层用实体的派生字段方法计算, 保证与列表/详情同一个公式
        let all_products = products::Entity::find().all(&*self.pool).await?;
        let top_funded_projects = Self::rank_top_funded(all_products, 10);

        Ok(AnalyticsResponse {
            overview: AnalyticsOverview {
                total_products,
                active_products,
                funding_products,
                total_investment,
                total_investors,
            },
            category_stats,
            top_funded_projects,
        })
    }

    async fn count_products(
        &self,
        filter: Option<sea_orm::sea_query::SimpleExpr>,
    ) -> AppResult<i64> {
        #[derive(Debug, sea_orm::FromQueryResult)]
        struct CountRow {
            count: i64,
        }
        let mut query = products::Entity::find();
        if let Some(filter) = filter {
            query = query.filter(filter);
        }
        let count = query
            .select_only()
            .column_as(Expr::val(1).count(), "count")
            .into_model::<CountRow>()
            .one(&*self.pool)
            .await?
            .map(|r| r.count)
            .unwrap_or(0);
        Ok(count)
    }

    fn rank_top_funded(models: Vec<products::Model>, n: usize) -> Vec<TopFundedProject> {
        let mut ranked: Vec<TopFundedProject> = models
            .into_iter()
            .map(|m| TopFundedProject {
                id: m.id,
                title: m.title.clone(),
                total_budget: m.total_budget,
                current_funding: m.current_funding,
                funding_percentage: m.funding_percentage(),
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.funding_percentage
                .partial_cmp(&a.funding_percentage)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(n);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn product(id: i64, total_budget: i64, current_funding: i64) -> products::Model {
        let now = Utc::now();
        products::Model {
            id,
            title: format!("Project {id}"),
            description: "desc".to_string(),
            artist_name: "artist".to_string(),
            producer_name: None,
            label_name: None,
            category: "Music".to_string(),
            genre: None,
            total_budget,
            current_funding,
            minimum_investment: 100,
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

    #[test]
    fn test_rank_top_funded_orders_by_percentage() {
        let ranked = AnalyticsService::rank_top_funded(
            vec![
                product(1, 1_000_000, 100_000), // 10%
                product(2, 200_000, 150_000),   // 75%
                product(3, 500_000, 200_000),   // 40%
            ],
            10,
        );

        let ids: Vec<i64> = ranked.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert_eq!(ranked[0].funding_percentage, 75.0);
    }

    #[test]
    fn test_rank_top_funded_truncates_and_clamps() {
        let models: Vec<products::Model> = (1..=12)
            .map(|i| product(i, 100_000, 20_000 * i))
            .collect();
        let ranked = AnalyticsService::rank_top_funded(models, 10);

        assert_eq!(ranked.len(), 10);
        // 超募产品的百分比同样受 clamp 约束
        assert_eq!(ranked[0].funding_percentage, 100.0);
    }

    #[test]
    fn test_rank_top_funded_zero_budget_sorts_last() {
        let ranked = AnalyticsService::rank_top_funded(
            vec![product(1, 0, 50_000), product(2, 100_000, 10_000)],
            10,
        );
        assert_eq!(ranked[0].id, 2);
        assert_eq!(ranked[1].funding_percentage, 0.0);
    }
}
