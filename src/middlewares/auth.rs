use crate::error::AppError;
use crate::utils::{Claims, JwtService};
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

// 公开路径配置
struct PublicPaths {
    exact_paths: Vec<&'static str>,
    prefix_paths: Vec<&'static str>,
}

impl PublicPaths {
    fn new() -> Self {
        Self {
            // 完全匹配的公开路径
            exact_paths: vec!["/swagger-ui", "/swagger-ui/", "/api-docs/openapi.json"],
            // 前缀匹配的公开路径
            prefix_paths: vec!["/swagger-ui/", "/api-docs/", "/api/v1/auth/"],
        }
    }

    /// 目录浏览与出资提交对投资人公开, 其余路径均为管理端
    fn is_public(&self, method: &Method, path: &str) -> bool {
        if self.exact_paths.contains(&path) {
            return true;
        }
        if self
            .prefix_paths
            .iter()
            .any(|&prefix| path.starts_with(prefix))
        {
            return true;
        }

        if *method == Method::GET
            && (path == "/api/v1/products" || path.starts_with("/api/v1/products/"))
        {
            return true;
        }
        if *method == Method::POST && path == "/api/v1/investors" {
            return true;
        }

        false
    }
}

pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
            public_paths: PublicPaths::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
    public_paths: PublicPaths,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // 放行所有 CORS 预检请求
        if req.method() == Method::OPTIONS {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        // 检查是否为公开路径
        if self.public_paths.is_public(req.method(), req.path()) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        // 提取Authorization header
        let auth_header = req.headers().get("Authorization");

        let token = if let Some(auth_value) = auth_header {
            if let Ok(auth_str) = auth_value.to_str() {
                auth_str.strip_prefix("Bearer ")
            } else {
                None
            }
        } else {
            None
        };

        let jwt_service = self.jwt_service.clone();

        if let Some(token) = token {
            match jwt_service.verify_access_token(token) {
                Ok(claims) => {
                    // 管理端接口只对 admin 角色开放
                    if claims.role != "admin" {
                        let error = AppError::PermissionDenied;
                        return Box::pin(async move { Err(error.into()) });
                    }
                    // 将凭据信息添加到请求扩展中
                    req.extensions_mut().insert::<Claims>(claims);
                    let fut = self.service.call(req);
                    Box::pin(fut)
                }
                Err(_) => {
                    let error = AppError::AuthError("Invalid access token".to_string());
                    Box::pin(async move { Err(error.into()) })
                }
            }
        } else {
            let error = AppError::AuthError("Missing access token".to_string());
            Box::pin(async move { Err(error.into()) })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_reads_are_public() {
        let paths = PublicPaths::new();
        assert!(paths.is_public(&Method::GET, "/api/v1/products"));
        assert!(paths.is_public(&Method::GET, "/api/v1/products/12"));
        assert!(paths.is_public(&Method::GET, "/api/v1/products/12/investors"));
        assert!(paths.is_public(&Method::POST, "/api/v1/investors"));
        assert!(paths.is_public(&Method::POST, "/api/v1/auth/admin/login"));
    }

    #[test]
    fn test_mutations_require_auth() {
        let paths = PublicPaths::new();
        assert!(!paths.is_public(&Method::POST, "/api/v1/products"));
        assert!(!paths.is_public(&Method::PUT, "/api/v1/products/12"));
        assert!(!paths.is_public(&Method::DELETE, "/api/v1/products/12"));
        assert!(!paths.is_public(&Method::POST, "/api/v1/products/12/media"));
        assert!(!paths.is_public(&Method::POST, "/api/v1/investors/5/confirm"));
        assert!(!paths.is_public(&Method::GET, "/api/v1/analytics"));
    }
}
