use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub description: String,
    pub artist_name: String,
    pub producer_name: Option<String>,
    pub label_name: Option<String>,
    pub category: String,
    pub genre: Option<String>,
    /// 融资目标(美分)
    pub total_budget: i64,
    /// 已确认的累计融资额(美分), 只能通过原子增量更新
    pub current_funding: i64,
    pub minimum_investment: i64,
    pub cover_image: Option<String>,
    pub album_art: Option<String>,
    pub poster_image: Option<String>,
    pub video_thumbnail: Option<String>,
    pub video_file: Option<String>,
    pub gallery_images: Json,
    pub demo_track: Option<String>,
    pub full_track: Option<String>,
    pub expected_duration: Option<String>,
    pub status: String,
    pub target_audience: Json,
    pub is_featured: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::investors::Entity")]
    Investors,
}

impl Related<super::investors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Investors.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 融资进度百分比, 恒为存储字段的纯函数, 结果落在 [0, 100]
    pub fn funding_percentage(&self) -> f64 {
        if self.total_budget <= 0 {
            return 0.0;
        }
        ((self.current_funding as f64 / self.total_budget as f64) * 100.0).clamp(0.0, 100.0)
    }

    /// 剩余待筹金额(美分), 不会为负
    pub fn remaining_amount(&self) -> i64 {
        (self.total_budget - self.current_funding).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product(total_budget: i64, current_funding: i64) -> Model {
        let now = Utc::now();
        Model {
            id: 1,
            title: "Midnight Sessions".to_string(),
            description: "A debut studio album".to_string(),
            artist_name: "Ada Lin".to_string(),
            producer_name: None,
            label_name: None,
            category: "Music".to_string(),
            genre: Some("Indie".to_string()),
            total_budget,
            current_funding,
            minimum_investment: 10_000,
            cover_image: None,
            album_art: None,
            poster_image: None,
            video_thumbnail: None,
            video_file: None,
            gallery_images: json!([]),
            demo_track: None,
            full_track: None,
            expected_duration: None,
            status: "funding".to_string(),
            target_audience: json!([]),
            is_featured: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_funding_percentage() {
        let p = product(1_000_000, 500_000);
        assert_eq!(p.funding_percentage(), 50.0);
        assert_eq!(p.remaining_amount(), 500_000);
    }

    #[test]
    fn test_funding_percentage_clamped_at_100() {
        let p = product(100_000, 250_000);
        assert_eq!(p.funding_percentage(), 100.0);
        assert_eq!(p.remaining_amount(), 0);
    }

    #[test]
    fn test_funding_percentage_zero_budget() {
        // 预算为 0 的记录不会通过校验产生, 但派生字段仍需有定义
        let p = product(0, 500);
        assert_eq!(p.funding_percentage(), 0.0);
        assert_eq!(p.remaining_amount(), 0);
    }

    #[test]
    fn test_remaining_amount_zero_funding() {
        let p = product(750_000, 0);
        assert_eq!(p.funding_percentage(), 0.0);
        assert_eq!(p.remaining_amount(), 750_000);
    }
}
