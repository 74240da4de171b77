use crate::entities::investor_entity as investors;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 出资记录的支付状态; 只有 completed 计入融资总额与投资人数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(PaymentStatus::Pending),
            "completed" => Some(PaymentStatus::Completed),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvestorRequest {
    pub product_id: i64,
    #[schema(example = "Jamie Park")]
    pub investor_name: String,
    #[schema(example = "jamie@example.com")]
    pub email: String,
    /// 出资金额(美分)
    pub investment_amount: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvestorResponse {
    pub id: i64,
    pub product_id: i64,
    pub investor_name: String,
    pub email: String,
    pub investment_amount: i64,
    pub payment_status: String,
    pub investment_date: DateTime<Utc>,
}

impl From<investors::Model> for InvestorResponse {
    fn from(investor: investors::Model) -> Self {
        Self {
            id: investor.id,
            product_id: investor.product_id,
            investor_name: investor.investor_name,
            email: investor.email,
            investment_amount: investor.investment_amount,
            payment_status: investor.payment_status,
            investment_date: investor.investment_date,
        }
    }
}

/// 确认出资后的账本状态快照
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmInvestmentResponse {
    pub investor: InvestorResponse,
    pub current_funding: i64,
    pub funding_percentage: f64,
    pub remaining_amount: i64,
}
