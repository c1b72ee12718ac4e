use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self { page, page_size }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub has_more: bool,
}

/// Slice `items` according to `req`. `has_more` is true exactly when
/// `page * page_size < total`.
pub fn paginate<T: Clone>(items: &[T], req: PageRequest) -> Paginated<T> {
    let page = req.page.max(1);
    let page_size = req.page_size.max(1);
    let total = items.len();
    let start = (page - 1).saturating_mul(page_size);
    let data = if start >= total {
        Vec::new()
    } else {
        items[start..start.saturating_add(page_size).min(total)].to_vec()
    };

    Paginated {
        data,
        total,
        page,
        page_size,
        has_more: page.saturating_mul(page_size) < total,
    }
}
