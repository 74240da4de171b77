pub mod analytics;
pub mod auth;
pub mod common;
pub mod investor;
pub mod media;
pub mod pagination;
pub mod product;

pub use analytics::*;
pub use auth::*;
pub use common::*;
pub use investor::*;
pub use media::*;
pub use pagination::*;
pub use product::*;
