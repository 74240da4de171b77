use crate::entities::product_entity as products;
use crate::error::{AppError, AppResult};
use crate::models::investor::InvestorResponse;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 产品大类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Category {
    Music,
    Film,
    Documentary,
    #[serde(rename = "Web Series")]
    WebSeries,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Music => "Music",
            Category::Film => "Film",
            Category::Documentary => "Documentary",
            Category::WebSeries => "Web Series",
            Category::Other => "Other",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Music" => Some(Category::Music),
            "Film" => Some(Category::Film),
            "Documentary" => Some(Category::Documentary),
            "Web Series" => Some(Category::WebSeries),
            "Other" => Some(Category::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 音乐类产品的流派细分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Genre {
    Pop,
    Rock,
    Classical,
    Jazz,
    #[serde(rename = "Hip-Hop")]
    HipHop,
    Electronic,
    Folk,
    Country,
    #[serde(rename = "R&B")]
    RnB,
    Indie,
    Other,
}

impl Genre {
    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Pop => "Pop",
            Genre::Rock => "Rock",
            Genre::Classical => "Classical",
            Genre::Jazz => "Jazz",
            Genre::HipHop => "Hip-Hop",
            Genre::Electronic => "Electronic",
            Genre::Folk => "Folk",
            Genre::Country => "Country",
            Genre::RnB => "R&B",
            Genre::Indie => "Indie",
            Genre::Other => "Other",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Pop" => Some(Genre::Pop),
            "Rock" => Some(Genre::Rock),
            "Classical" => Some(Genre::Classical),
            "Jazz" => Some(Genre::Jazz),
            "Hip-Hop" => Some(Genre::HipHop),
            "Electronic" => Some(Genre::Electronic),
            "Folk" => Some(Genre::Folk),
            "Country" => Some(Genre::Country),
            "R&B" => Some(Genre::RnB),
            "Indie" => Some(Genre::Indie),
            "Other" => Some(Genre::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 产品生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ProductStatus {
    Funding,
    InProduction,
    Completed,
    Cancelled,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Funding => "funding",
            ProductStatus::InProduction => "in-production",
            ProductStatus::Completed => "completed",
            ProductStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "funding" => Some(ProductStatus::Funding),
            "in-production" => Some(ProductStatus::InProduction),
            "completed" => Some(ProductStatus::Completed),
            "cancelled" => Some(ProductStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// multipart 表单里除文件外的原始字段, 全部以字符串形态到达
#[derive(Debug, Default)]
pub struct CreateProductInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub artist_name: Option<String>,
    pub producer_name: Option<String>,
    pub label_name: Option<String>,
    pub category: Option<String>,
    pub genre: Option<String>,
    pub total_budget: Option<String>,
    pub minimum_investment: Option<String>,
    pub expected_duration: Option<String>,
    pub status: Option<String>,
    pub target_audience: Option<String>,
    pub is_featured: Option<String>,
    pub is_active: Option<String>,
}

/// 校验通过后的产品字段
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedProduct {
    pub title: String,
    pub description: String,
    pub artist_name: String,
    pub producer_name: Option<String>,
    pub label_name: Option<String>,
    pub category: Category,
    pub genre: Option<Genre>,
    pub total_budget: i64,
    pub minimum_investment: i64,
    pub expected_duration: Option<String>,
    pub status: ProductStatus,
    pub target_audience: Vec<String>,
    pub is_featured: bool,
    pub is_active: bool,
}

impl CreateProductInput {
    pub fn validate(self) -> AppResult<ValidatedProduct> {
        let title = require_trimmed("productTitle", self.title)?;
        let description = require_trimmed("description", self.description)?;
        let artist_name = require_trimmed("artistName", self.artist_name)?;

        let category = match self.category.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Category::parse(raw).ok_or_else(|| {
                AppError::ValidationError(format!("Unknown category: {raw}"))
            })?,
            _ => {
                return Err(AppError::ValidationError("category is required".to_string()));
            }
        };
        let genre = match self.genre.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(Genre::parse(raw).ok_or_else(|| {
                AppError::ValidationError(format!("Unknown genre: {raw}"))
            })?),
            _ => None,
        };

        let total_budget = parse_amount("totalBudget", self.total_budget.as_deref())?;
        if total_budget <= 0 {
            return Err(AppError::ValidationError(
                "totalBudget must be greater than 0".to_string(),
            ));
        }
        let minimum_investment =
            parse_amount("minimumInvestment", self.minimum_investment.as_deref())?;
        if minimum_investment <= 0 {
            return Err(AppError::ValidationError(
                "minimumInvestment must be greater than 0".to_string(),
            ));
        }

        let status = match self.status.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => ProductStatus::parse(raw).ok_or_else(|| {
                AppError::ValidationError(format!("Unknown productStatus: {raw}"))
            })?,
            _ => ProductStatus::Funding,
        };

        Ok(ValidatedProduct {
            title,
            description,
            artist_name,
            producer_name: optional_trimmed(self.producer_name),
            label_name: optional_trimmed(self.label_name),
            category,
            genre,
            total_budget,
            minimum_investment,
            expected_duration: optional_trimmed(self.expected_duration),
            status,
            target_audience: parse_tag_list(self.target_audience.as_deref()),
            is_featured: parse_flag(self.is_featured.as_deref(), false),
            is_active: parse_flag(self.is_active.as_deref(), true),
        })
    }
}

fn require_trimmed(field: &str, value: Option<String>) -> AppResult<String> {
    match value {
        Some(v) => {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                Err(AppError::ValidationError(format!("{field} is required")))
            } else {
                Ok(trimmed.to_string())
            }
        }
        None => Err(AppError::ValidationError(format!("{field} is required"))),
    }
}

fn optional_trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_amount(field: &str, raw: Option<&str>) -> AppResult<i64> {
    let raw = raw
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::ValidationError(format!("{field} is required")))?;
    raw.parse::<i64>()
        .map_err(|_| AppError::ValidationError(format!("{field} must be a number")))
}

fn parse_flag(raw: Option<&str>, default: bool) -> bool {
    match raw {
        Some(s) => matches!(s.trim(), "true" | "1"),
        None => default,
    }
}

/// targetAudience 在不同客户端以原生数组或 JSON 字符串两种形态出现,
/// 在入口统一规范化; 解析失败时回退为空列表, 不阻断请求
pub fn parse_tag_list(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(s) if !s.trim().is_empty() => serde_json::from_str(s).unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// JSON 请求体里同一字段的两种形态
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StringList {
    List(Vec<String>),
    Text(String),
}

impl StringList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            StringList::List(v) => v,
            StringList::Text(s) => parse_tag_list(Some(&s)),
        }
    }
}

/// 存储的媒体 URL 必须带 http(s) 协议
pub fn validate_url(field: &str, url: &str) -> AppResult<()> {
    let url_regex = Regex::new(r"^https?://").unwrap();
    if url_regex.is_match(url) {
        Ok(())
    } else {
        Err(AppError::ValidationError(format!(
            "{field} must be an http(s) URL"
        )))
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[serde(rename = "productTitle")]
    pub title: Option<String>,
    pub description: Option<String>,
    pub artist_name: Option<String>,
    pub producer_name: Option<String>,
    pub label_name: Option<String>,
    pub category: Option<String>,
    pub genre: Option<String>,
    pub total_budget: Option<i64>,
    pub minimum_investment: Option<i64>,
    pub expected_duration: Option<String>,
    #[serde(rename = "productStatus")]
    pub status: Option<String>,
    #[schema(value_type = Vec<String>)]
    pub target_audience: Option<StringList>,
    pub is_featured: Option<bool>,
    pub is_active: Option<bool>,
    pub cover_image: Option<String>,
    pub album_art: Option<String>,
    pub poster_image: Option<String>,
    pub video_thumbnail: Option<String>,
    pub video_file: Option<String>,
    pub demo_track: Option<String>,
    pub full_track: Option<String>,
    pub gallery_images: Option<Vec<String>>,
}

/// 目录查询参数
#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub category: Option<String>,
    pub status: Option<String>,
    pub featured: Option<bool>,
    pub active: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: i64,
    #[serde(rename = "productTitle")]
    pub title: String,
    pub description: String,
    pub artist_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_name: Option<String>,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    pub total_budget: i64,
    pub current_funding: i64,
    pub minimum_investment: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_art: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_file: Option<String>,
    pub gallery_images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_track: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_track: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_duration: Option<String>,
    #[serde(rename = "productStatus")]
    pub status: String,
    pub target_audience: Vec<String>,
    pub is_featured: bool,
    pub is_active: bool,
    pub funding_percentage: f64,
    pub remaining_amount: i64,
    pub total_investors: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductResponse {
    pub fn with_investors(mut self, total_investors: i64) -> Self {
        self.total_investors = total_investors;
        self
    }
}

impl From<products::Model> for ProductResponse {
    fn from(product: products::Model) -> Self {
        // 派生字段只在实体方法里计算一次, 各端点不得自行推导
        let funding_percentage = product.funding_percentage();
        let remaining_amount = product.remaining_amount();

        Self {
            id: product.id,
            title: product.title,
            description: product.description,
            artist_name: product.artist_name,
            producer_name: product.producer_name,
            label_name: product.label_name,
            category: product.category,
            genre: product.genre,
            total_budget: product.total_budget,
            current_funding: product.current_funding,
            minimum_investment: product.minimum_investment,
            cover_image: product.cover_image,
            album_art: product.album_art,
            poster_image: product.poster_image,
            video_thumbnail: product.video_thumbnail,
            video_file: product.video_file,
            gallery_images: json_string_list(&product.gallery_images),
            demo_track: product.demo_track,
            full_track: product.full_track,
            expected_duration: product.expected_duration,
            status: product.status,
            target_audience: json_string_list(&product.target_audience),
            is_featured: product.is_featured,
            is_active: product.is_active,
            funding_percentage,
            remaining_amount,
            total_investors: 0,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetailResponse {
    #[serde(flatten)]
    pub product: ProductResponse,
    pub average_investment: i64,
    pub recent_investments: Vec<InvestorResponse>,
}

pub(crate) fn json_string_list(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> CreateProductInput {
        CreateProductInput {
            title: Some("Midnight Sessions".to_string()),
            description: Some("A debut studio album".to_string()),
            artist_name: Some("Ada Lin".to_string()),
            category: Some("Music".to_string()),
            genre: Some("Indie".to_string()),
            total_budget: Some("1000000".to_string()),
            minimum_investment: Some("10000".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_ok() {
        let validated = valid_input().validate().unwrap();
        assert_eq!(validated.title, "Midnight Sessions");
        assert_eq!(validated.category, Category::Music);
        assert_eq!(validated.genre, Some(Genre::Indie));
        assert_eq!(validated.total_budget, 1_000_000);
        assert_eq!(validated.status, ProductStatus::Funding);
        assert!(validated.is_active);
        assert!(!validated.is_featured);
        assert!(validated.target_audience.is_empty());
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        let mut input = valid_input();
        input.title = Some("   ".to_string());
        assert!(matches!(
            input.validate(),
            Err(AppError::ValidationError(msg)) if msg.contains("productTitle")
        ));
    }

    #[test]
    fn test_validate_rejects_zero_budget() {
        // 预算为 0 必须在校验阶段拒绝, 而不是留给派生字段去兜底
        let mut input = valid_input();
        input.total_budget = Some("0".to_string());
        assert!(matches!(
            input.validate(),
            Err(AppError::ValidationError(msg)) if msg.contains("totalBudget")
        ));
    }

    #[test]
    fn test_validate_rejects_non_numeric_amount() {
        let mut input = valid_input();
        input.minimum_investment = Some("a lot".to_string());
        assert!(matches!(
            input.validate(),
            Err(AppError::ValidationError(msg)) if msg.contains("minimumInvestment")
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_category() {
        let mut input = valid_input();
        input.category = Some("Podcast".to_string());
        assert!(matches!(
            input.validate(),
            Err(AppError::ValidationError(msg)) if msg.contains("category")
        ));
    }

    #[test]
    fn test_validate_trims_optional_credits() {
        let mut input = valid_input();
        input.producer_name = Some("  ".to_string());
        input.label_name = Some(" North Shore Records ".to_string());
        let validated = input.validate().unwrap();
        assert_eq!(validated.producer_name, None);
        assert_eq!(validated.label_name, Some("North Shore Records".to_string()));
    }

    #[test]
    fn test_parse_tag_list_json_string() {
        let tags = parse_tag_list(Some(r#"["indie fans","students"]"#));
        assert_eq!(tags, vec!["indie fans".to_string(), "students".to_string()]);
    }

    #[test]
    fn test_parse_tag_list_malformed_defaults_to_empty() {
        assert!(parse_tag_list(Some("not json")).is_empty());
        assert!(parse_tag_list(Some("")).is_empty());
        assert!(parse_tag_list(None).is_empty());
    }

    #[test]
    fn test_string_list_both_shapes() {
        let native = StringList::List(vec!["fans".to_string()]);
        assert_eq!(native.into_vec(), vec!["fans".to_string()]);

        let encoded = StringList::Text(r#"["fans"]"#.to_string());
        assert_eq!(encoded.into_vec(), vec!["fans".to_string()]);

        let malformed = StringList::Text("oops".to_string());
        assert!(malformed.into_vec().is_empty());
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("coverImage", "https://cdn.example.com/a.jpg").is_ok());
        assert!(validate_url("coverImage", "http://cdn.example.com/a.jpg").is_ok());
        assert!(validate_url("coverImage", "ftp://cdn.example.com/a.jpg").is_err());
        assert!(validate_url("coverImage", "a.jpg").is_err());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            ProductStatus::Funding,
            ProductStatus::InProduction,
            ProductStatus::Completed,
            ProductStatus::Cancelled,
        ] {
            assert_eq!(ProductStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ProductStatus::parse("archived"), None);
    }
}
