pub mod analytics;
pub mod auth;
pub mod investor;
pub mod product;

pub use analytics::analytics_config;
pub use auth::auth_config;
pub use investor::investor_config;
pub use product::product_config;
