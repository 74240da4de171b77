pub mod analytics_service;
pub mod investor_service;
pub mod media_service;
pub mod product_service;

pub use analytics_service::*;
pub use investor_service::*;
pub use media_service::*;
pub use product_service::*;
