/// One window of an ordered result list, plus the size of the whole list.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PageSlice<T> {
    pub items: Vec<T>,
    pub total_count: usize,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("page number must not be negative")]
    NegativePageNumber,
    #[error("page size must be positive")]
    InvalidPageSize,
}

/// Stateless windowing over any ordered list: items at offset
/// `page_number * page_size`, clipped to the available remainder. A page
/// past the end is empty, not an error.
pub fn paginate<T>(
    items: Vec<T>,
    page_number: i64,
    page_size: i64,
) -> Result<PageSlice<T>, PageError> {
    if page_number < 0 {
        return Err(PageError::NegativePageNumber);
    }
    if page_size <= 0 {
        return Err(PageError::InvalidPageSize);
    }

    let total_count = items.len();
    let offset = (page_number as usize).saturating_mul(page_size as usize);
    let window = items
        .into_iter()
        .skip(offset)
        .take(page_size as usize)
        .collect();

    Ok(PageSlice {
        items: window,
        total_count,
    })
}
