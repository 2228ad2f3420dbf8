//! Response envelope and pagination wrapper.
//!
//! Every JSON endpoint (streaming excluded) answers with the same
//! `{code, message, result}` envelope; code 200 means success and any
//! other value maps to the error taxonomy in `error.rs`.

use serde::Serialize;

/// Uniform response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    pub result: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Successful envelope carrying a result.
    pub fn success(result: T, message: impl Into<String>) -> Self {
        ApiResponse {
            code: 200,
            message: message.into(),
            result: Some(result),
        }
    }
}

impl ApiResponse<()> {
    /// Successful envelope with no payload.
    pub fn ok(message: impl Into<String>) -> Self {
        ApiResponse {
            code: 200,
            message: message.into(),
            result: None,
        }
    }

    /// Error envelope; `result` is always null.
    pub fn error(code: i32, message: impl Into<String>) -> Self {
        ApiResponse {
            code,
            message: message.into(),
            result: None,
        }
    }
}

/// One page of results plus navigation metadata.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<T> {
    pub content: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
    pub first: bool,
    pub last: bool,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> PagedResponse<T> {
    /// Build the wrapper from a page of content and the total count.
    pub fn of(content: Vec<T>, page: i64, size: i64, total_elements: i64) -> Self {
        let total_pages = if size == 0 {
            1
        } else {
            (total_elements + size - 1) / size
        };
        PagedResponse {
            content,
            page,
            size,
            total_elements,
            total_pages,
            first: page == 0,
            last: page >= total_pages - 1,
            has_next: page < total_pages - 1,
            has_previous: page > 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_serializes_null_result() {
        let json = serde_json::to_value(ApiResponse::ok("Logged out")).unwrap();
        assert_eq!(json["code"], 200);
        assert_eq!(json["message"], "Logged out");
        assert!(json["result"].is_null());
    }

    #[test]
    fn paged_math_middle_page() {
        let page = PagedResponse::of(vec![1, 2, 3], 1, 3, 8);
        assert_eq!(page.total_pages, 3);
        assert!(!page.first);
        assert!(!page.last);
        assert!(page.has_next);
        assert!(page.has_previous);
    }

    #[test]
    fn paged_math_single_page() {
        let page = PagedResponse::of(vec![1], 0, 10, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.first);
        assert!(page.last);
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }

    #[test]
    fn paged_math_empty() {
        let page = PagedResponse::of(Vec::<i32>::new(), 0, 10, 0);
        assert_eq!(page.total_pages, 0);
        assert!(page.first);
        assert!(page.last);
        assert!(!page.has_next);
    }

    #[test]
    fn paged_serializes_camel_case() {
        let json = serde_json::to_value(PagedResponse::of(vec![1], 0, 10, 1)).unwrap();
        assert!(json.get("totalElements").is_some());
        assert!(json.get("hasPrevious").is_some());
    }
}
