/// Rows per page in a specialist's own slot list.
pub const MY_SLOTS_PAGE_SIZE: usize = 5;
/// Rows per page when a client picks a slot.
pub const SLOT_PICKER_PAGE_SIZE: usize = 10;

#[derive(Debug, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// Zero-based, already clamped.
    pub index: usize,
    pub total_pages: usize,
}

impl<T> Page<'_, T> {
    pub fn has_previous(&self) -> bool {
        self.index > 0
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.total_pages
    }

    /// One-based label, e.g. "page 2 of 3".
    pub fn label(&self) -> String {
        format!("page {} of {}", self.index + 1, self.total_pages.max(1))
    }
}

/// Slices `items` into pages of `page_size`, clamping `requested` into range.
pub fn paginate<T>(items: &[T], page_size: usize, requested: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let total_pages = (items.len() + page_size - 1) / page_size;
    let index = requested.min(total_pages.saturating_sub(1));

    let start = (index * page_size).min(items.len());
    let end = (start + page_size).min(items.len());

    Page {
        items: &items[start..end],
        index,
        total_pages,
    }
}

/// Which paginated list a cached message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorKind {
    MySlots { specialist: i64 },
    SlotPicker { specialist: i64, service: i64 },
}

/// Last rendered page of a list, so the next page edits it in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub kind: CursorKind,
    pub page: usize,
    pub message_id: i32,
}
