use actix_multipart::form::MultipartFormConfig;
use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use mediavest_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::CloudinaryService,
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration file");

    // 创建数据库连接池
    let pool = std::sync::Arc::new(
        create_pool(&config.database)
            .await
            .expect("Failed to create database connection pool"),
    );

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // 创建JWT服务
    let jwt_service = JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
    );

    // 创建外部服务
    let cloudinary_service = CloudinaryService::new(config.cloudinary.clone());

    // 创建服务
    let media_service = MediaService::new(cloudinary_service);
    let product_service = ProductService::new(pool.clone());
    let investor_service = InvestorService::new(pool.clone());
    let analytics_service = AnalyticsService::new(pool.clone());

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let server_config = config.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .app_data(web::Data::new(server_config.clone()))
            .app_data(web::Data::new(jwt_service.clone()))
            .app_data(web::Data::new(media_service.clone()))
            .app_data(web::Data::new(product_service.clone()))
            .app_data(web::Data::new(investor_service.clone()))
            .app_data(web::Data::new(analytics_service.clone()))
            // 单次摄取的总量上限是传输层约束, 与账本无关
            .app_data(
                MultipartFormConfig::default()
                    .total_limit(512 * 1024 * 1024)
                    .memory_limit(16 * 1024 * 1024),
            )
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::auth_config)
                    .configure(handlers::product_config)
                    .configure(handlers::investor_config)
                    .configure(handlers::analytics_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
