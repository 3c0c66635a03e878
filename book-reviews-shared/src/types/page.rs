use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page size used when the client does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page a client may request.
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PageRequestError {
    #[error("Page size must be between 1 and {MAX_PAGE_SIZE}, got {0}")]
    InvalidSize(u32),
}

/// A zero-based page window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Result<Self, PageRequestError> {
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(PageRequestError::InvalidSize(size));
        }
        Ok(Self { page, size })
    }

    /// Builds a request from optional query parameters, applying the defaults.
    pub fn from_params(page: Option<u32>, size: Option<u32>) -> Result<Self, PageRequestError> {
        Self::new(page.unwrap_or(0), size.unwrap_or(DEFAULT_PAGE_SIZE))
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

/// One page of results together with the paging metadata clients render.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_elements: u64,
    pub is_last: bool,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        let size = u64::from(request.size.max(1));
        let total_pages = u32::try_from(total_elements.div_ceil(size)).unwrap_or(u32::MAX);
        Self {
            data,
            page_number: request.page,
            page_size: request.size,
            total_pages,
            total_elements,
            is_last: request.page.saturating_add(1) >= total_pages,
        }
    }
}
