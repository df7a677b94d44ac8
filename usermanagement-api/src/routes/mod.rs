/// API route handlers
///
/// - `health`: liveness and storage check
/// - `users`: user accounts
/// - `groups`: groups and their members

use crate::error::ApiResult;
use serde::Deserialize;
use usermanagement_shared::pagination::PageRequest;

pub mod groups;
pub mod health;
pub mod users;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_PER_PAGE: u32 = 10;

/// `?page=&perPage=` query for list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,

    #[serde(rename = "perPage")]
    pub per_page: Option<u32>,
}

impl PageQuery {
    /// Validated page request, defaulting to page 1 of 10
    pub fn to_request(&self) -> ApiResult<PageRequest> {
        Ok(PageRequest::new(
            self.page.unwrap_or(DEFAULT_PAGE),
            self.per_page.unwrap_or(DEFAULT_PER_PAGE),
        )?)
    }
}
