use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::services::AnalyticsService;

#[utoipa::path(
    get,
    path = "/analytics",
    tag = "analytics",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取平台汇总成功"),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_analytics(
    analytics_service: web::Data<AnalyticsService>,
) -> Result<HttpResponse> {
    match analytics_service.get_analytics().await {
        Ok(analytics) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": {
                "analytics": analytics
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn analytics_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/analytics").route("", web::get().to(get_analytics)));
}
