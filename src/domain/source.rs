use super::GamePage;
use crate::error::Result;
use std::future::Future;

pub const PAGE_SIZE: u32 = 40;

/// Anything that can hand out pages of the trending collection.
pub trait CatalogSource: Send + Sync {
    fn fetch_page(&self, page: u32) -> impl Future<Output = Result<GamePage>> + Send;
}

impl<T: CatalogSource> CatalogSource for std::sync::Arc<T> {
    fn fetch_page(&self, page: u32) -> impl Future<Output = Result<GamePage>> + Send {
        (**self).fetch_page(page)
    }
}
