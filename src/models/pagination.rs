//! 分页相关的数据结构

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaginationParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PaginationParams {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self { page, limit }
    }

    pub fn get_page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn get_limit(&self) -> u32 {
        self.limit.unwrap_or(10).clamp(1, 100)
    }

    pub fn get_offset(&self) -> u32 {
        (self.get_page() - 1) * self.get_limit()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub current_page: u32,
    pub per_page: u32,
    pub total: i64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationInfo {
    pub fn new(current_page: u32, per_page: u32, total: i64) -> Self {
        let total_pages = ((total as f64) / (per_page as f64)).ceil() as u32;
        let has_next = (current_page as i64) * (per_page as i64) < total;
        let has_prev = current_page > 1;

        Self {
            current_page,
            per_page,
            total,
            total_pages,
            has_next,
            has_prev,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub pagination: PaginationInfo,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, params: &PaginationParams, total: i64) -> Self {
        let pagination = PaginationInfo::new(params.get_page(), params.get_limit(), total);

        Self { items, pagination }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_params() {
        let params = PaginationParams::new(Some(2), Some(10));
        assert_eq!(params.get_page(), 2);
        assert_eq!(params.get_limit(), 10);
        assert_eq!(params.get_offset(), 10);
    }

    #[test]
    fn test_pagination_params_defaults() {
        let params = PaginationParams::new(None, None);
        assert_eq!(params.get_page(), 1);
        assert_eq!(params.get_limit(), 10);
        assert_eq!(params.get_offset(), 0);
    }

    #[test]
    fn test_pagination_info_middle_page() {
        // 25 条记录, 第 2 页, 每页 10 条
        let info = PaginationInfo::new(2, 10, 25);
        assert_eq!(info.total_pages, 3);
        assert!(info.has_next);
        assert!(info.has_prev);
    }

    #[test]
    fn test_pagination_info_last_page() {
        let info = PaginationInfo::new(3, 10, 25);
        assert_eq!(info.total_pages, 3);
        assert!(!info.has_next);
        assert!(info.has_prev);
    }

    #[test]
    fn test_pagination_info_page_out_of_range() {
        // 超出总页数时 hasNext 必须为 false
        let info = PaginationInfo::new(4, 10, 25);
        assert!(!info.has_next);
        assert!(info.has_prev);
    }

    #[test]
    fn test_pagination_info_empty() {
        let info = PaginationInfo::new(1, 10, 0);
        assert_eq!(info.total_pages, 0);
        assert!(!info.has_next);
        assert!(!info.has_prev);
    }

    #[test]
    fn test_total_pages_is_ceiling() {
        assert_eq!(PaginationInfo::new(1, 10, 30).total_pages, 3);
        assert_eq!(PaginationInfo::new(1, 10, 31).total_pages, 4);
    }
}
