mod request;
mod response;
mod wrapper;

pub use request::*;
pub use response::*;
pub use wrapper::*;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: u32 = 5;
pub const MAX_PER_PAGE: u32 = 50;

#[derive(Deserialize, Serialize, Debug)]
pub struct PostQueryParams {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "get_default_page")]
    pub page: u32,
    #[serde(default = "get_default_per_page")]
    pub per_page: u32,
}

impl PostQueryParams {
    /// Category filter, `None` for "all".
    pub fn category_filter(&self) -> Option<String> {
        self.category
            .as_deref()
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty() && c != "all")
    }

    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    pub fn per_page(&self) -> u32 {
        self.per_page.clamp(1, MAX_PER_PAGE)
    }

    /// Inclusive row range `(from, to)` of the requested page.
    pub fn range(&self) -> (i64, i64) {
        let from = i64::from(self.page() - 1) * i64::from(self.per_page());
        (from, from + i64::from(self.per_page()) - 1)
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct RecentQueryParams {
    #[serde(default = "get_default_recent_limit")]
    pub limit: u32,
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct MediaQueryParams {
    #[serde(default)]
    pub prefix: Option<String>,
}

fn get_default_page() -> u32 {
    1
}

fn get_default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

fn get_default_recent_limit() -> u32 {
    3
}
