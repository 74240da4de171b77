use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsOverview {
    pub total_products: i64,
    pub active_products: i64,
    pub funding_products: i64,
    /// 所有 completed 出资记录的金额之和(美分)
    pub total_investment: i64,
    pub total_investors: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopFundedProject {
    pub id: i64,
    #[serde(rename = "productTitle")]
    pub title: String,
    pub total_budget: i64,
    pub current_funding: i64,
    pub funding_percentage: f64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub overview: AnalyticsOverview,
    pub category_stats: Vec<CategoryCount>,
    pub top_funded_projects: Vec<TopFundedProject>,
}
