use std::ops::Range;

/// Pages kept mounted on each side of the current one.
pub const RESIDENT_RADIUS: usize = 1;

/// Position of one page in the horizontal list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub index: usize,
    /// Start of the page along the scroll axis, in pixels.
    pub offset: f64,
    /// Page extent; every page is one viewport wide.
    pub length: f64,
}

impl PageLayout {
    pub fn new(index: usize, page_width: f64) -> Self {
        Self {
            index,
            offset: index as f64 * page_width,
            length: page_width,
        }
    }
}

/// The paginated list that hosts the pages.
///
/// The gallery only needs to lock horizontal paging while an image is zoomed;
/// windowing and rendering stay with the host.
pub trait PagerHandle {
    fn set_scroll_enabled(&self, enabled: bool);
}

/// Indices that should be mounted around `current`.
pub fn resident_range(current: usize, item_count: usize, radius: usize) -> Range<usize> {
    if item_count == 0 {
        return 0..0;
    }
    let current = current.min(item_count - 1);
    let start = current.saturating_sub(radius);
    let end = current.saturating_add(radius).saturating_add(1).min(item_count);
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_layout() {
        let layout = PageLayout::new(3, 390.0);
        assert_eq!(layout.offset, 1170.0);
        assert_eq!(layout.length, 390.0);
        assert_eq!(layout.index, 3);
    }

    #[test]
    fn test_resident_range_in_middle() {
        assert_eq!(resident_range(5, 10, 1), 4..7);
        assert_eq!(resident_range(5, 10, 2), 3..8);
    }

    #[test]
    fn test_resident_range_at_edges() {
        assert_eq!(resident_range(0, 10, 1), 0..2);
        assert_eq!(resident_range(9, 10, 1), 8..10);
        assert_eq!(resident_range(0, 1, 1), 0..1);
    }

    #[test]
    fn test_resident_range_empty_and_out_of_range() {
        assert_eq!(resident_range(0, 0, 1), 0..0);
        assert_eq!(resident_range(50, 3, 1), 1..3);
    }
}
