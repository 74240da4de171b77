use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::models::*;
use crate::services::InvestorService;

#[utoipa::path(
    post,
    path = "/investors",
    tag = "investor",
    request_body = CreateInvestorRequest,
    responses(
        (status = 201, description = "出资已记录, 等待确认", body = InvestorResponse),
        (status = 400, description = "字段校验失败"),
        (status = 404, description = "产品不存在")
    )
)]
pub async fn create_investment(
    investor_service: web::Data<InvestorService>,
    request: web::Json<CreateInvestorRequest>,
) -> Result<HttpResponse> {
    match investor_service.create_investment(request.into_inner()).await {
        Ok(investor) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "message": "Investment recorded, pending confirmation",
            "data": {
                "investor": investor
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/investors/{id}/confirm",
    tag = "investor",
    params(
        ("id" = i64, Path, description = "出资记录ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "确认成功, 金额已计入产品融资额", body = ConfirmInvestmentResponse),
        (status = 400, description = "记录已失败, 无法确认"),
        (status = 401, description = "未授权"),
        (status = 404, description = "出资记录不存在")
    )
)]
pub async fn confirm_investment(
    investor_service: web::Data<InvestorService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match investor_service.confirm_investment(path.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Investment confirmed",
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/investors/{id}/fail",
    tag = "investor",
    params(
        ("id" = i64, Path, description = "出资记录ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已标记为失败", body = InvestorResponse),
        (status = 400, description = "记录已完成, 无法标记失败"),
        (status = 401, description = "未授权"),
        (status = 404, description = "出资记录不存在")
    )
)]
pub async fn fail_investment(
    investor_service: web::Data<InvestorService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match investor_service.fail_investment(path.into_inner()).await {
        Ok(investor) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Investment marked as failed",
            "data": {
                "investor": investor
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn investor_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/investors")
            .route("", web::post().to(create_investment))
            .route("/{id}/confirm", web::post().to(confirm_investment))
            .route("/{id}/fail", web::post().to(fail_investment)),
    );
}
