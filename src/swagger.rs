use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::admin_login,
        handlers::auth::refresh,
        handlers::product::create_product,
        handlers::product::list_products,
        handlers::product::get_product,
        handlers::product::update_product,
        handlers::product::upload_product_media,
        handlers::product::delete_product,
        handlers::product::list_product_investors,
        handlers::investor::create_investment,
        handlers::investor::confirm_investment,
        handlers::investor::fail_investment,
        handlers::analytics::get_analytics,
    ),
    components(
        schemas(
            Category,
            Genre,
            ProductStatus,
            PaymentStatus,
            UpdateProductRequest,
            ProductResponse,
            ProductDetailResponse,
            CreateInvestorRequest,
            InvestorResponse,
            ConfirmInvestmentResponse,
            AnalyticsOverview,
            CategoryCount,
            TopFundedProject,
            AnalyticsResponse,
            AdminLoginRequest,
            RefreshTokenRequest,
            AuthTokensResponse,
            ApiError,
            PaginationInfo,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Admin authentication API"),
        (name = "product", description = "Investment product catalog API"),
        (name = "investor", description = "Investor ledger API"),
        (name = "analytics", description = "Funding analytics API"),
    ),
    info(
        title = "MediaVest Backend API",
        version = "1.0.0",
        description = "Crowdfunding catalog and funding ledger REST API documentation",
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
