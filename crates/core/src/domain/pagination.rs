use super::DomainError;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// 1-based page over an in-memory list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub per_page: usize,
}

impl PageRequest {
    pub fn new(page: Option<i64>, per_page: usize) -> Result<Self, DomainError> {
        let page = page.unwrap_or(1);
        if page < 1 {
            return Err(DomainError::InvalidPage);
        }
        let page = usize::try_from(page).map_err(|_| DomainError::InvalidPage)?;
        Ok(Self {
            page,
            per_page: per_page.max(1),
        })
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.page - 1).saturating_mul(self.per_page);
        if start >= items.len() {
            return &[];
        }
        let end = start.saturating_add(self.per_page).min(items.len());
        &items[start..end]
    }
}
