use serde::{Deserialize, Serialize};

/// Allowed page sizes for the table footer select. Anything else is ignored.
pub const PAGE_SIZES: [usize; 3] = [10, 25, 50];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDir {
    Asc,
    Desc,
}

/// Client-side view state: active sort, filter texts and pagination.
/// Pages are 1-based, matching the numbered buttons in the footer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub sort_key: String,
    pub sort_direction: SortDir,
    pub client_filter: String,
    pub contact_filter: String,
    pub page: usize,
    pub page_size: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            sort_key: "cod_unid_negoc".to_string(),
            sort_direction: SortDir::Asc,
            client_filter: String::new(),
            contact_filter: String::new(),
            page: 1,
            page_size: 10,
        }
    }
}

impl ViewState {
    /// First click on a new column sorts ascending; clicking the active
    /// column again flips the direction.
    pub fn toggle_sort(&mut self, key: &str) {
        if self.sort_key == key {
            self.sort_direction = match self.sort_direction {
                SortDir::Asc => SortDir::Desc,
                SortDir::Desc => SortDir::Asc,
            };
        } else {
            self.sort_key = key.to_string();
            self.sort_direction = SortDir::Asc;
        }
    }

    pub fn set_client_filter(&mut self, value: String) {
        self.client_filter = value;
        self.page = 1;
    }

    pub fn set_contact_filter(&mut self, value: String) {
        self.contact_filter = value;
        self.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.client_filter.clear();
        self.contact_filter.clear();
        self.page = 1;
    }

    /// Changes the page size if it is one of [`PAGE_SIZES`]; otherwise the
    /// request is ignored. A valid change resets to page 1.
    pub fn set_page_size(&mut self, size: usize) {
        if PAGE_SIZES.contains(&size) {
            self.page_size = size;
            self.page = 1;
        }
    }

    /// Number of pages for `total` items, never less than 1.
    pub fn page_count(&self, total: usize) -> usize {
        if total == 0 {
            1
        } else {
            total.div_ceil(self.page_size)
        }
    }

    /// The page actually rendered: `page` clamped into `1..=page_count`,
    /// without mutating the stored value.
    pub fn current_page_safe(&self, total: usize) -> usize {
        self.page.clamp(1, self.page_count(total))
    }

    pub fn prev_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    pub fn next_page(&mut self, total: usize) {
        if self.page < self.page_count(total) {
            self.page += 1;
        }
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.page = page;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let st = ViewState::default();
        assert_eq!(st.sort_key, "cod_unid_negoc");
        assert_eq!(st.sort_direction, SortDir::Asc);
        assert_eq!(st.page, 1);
        assert_eq!(st.page_size, 10);
        assert!(st.client_filter.is_empty());
        assert!(st.contact_filter.is_empty());
    }

    #[test]
    fn test_toggle_sort_new_column_is_ascending() {
        let mut st = ViewState::default();
        st.sort_direction = SortDir::Desc;
        st.toggle_sort("nom_contato");
        assert_eq!(st.sort_key, "nom_contato");
        assert_eq!(st.sort_direction, SortDir::Asc);
    }

    #[test]
    fn test_toggle_sort_same_column_flips() {
        let mut st = ViewState::default();
        st.toggle_sort("cod_unid_negoc");
        assert_eq!(st.sort_direction, SortDir::Desc);
        st.toggle_sort("cod_unid_negoc");
        assert_eq!(st.sort_direction, SortDir::Asc);
    }

    #[test]
    fn test_filter_changes_reset_page() {
        let mut st = ViewState {
            page: 4,
            ..Default::default()
        };
        st.set_client_filter("centro".to_string());
        assert_eq!(st.page, 1);

        st.page = 3;
        st.set_contact_filter("alice".to_string());
        assert_eq!(st.page, 1);

        st.page = 2;
        st.clear_filters();
        assert_eq!(st.page, 1);
        assert!(st.client_filter.is_empty() && st.contact_filter.is_empty());
    }

    #[test]
    fn test_page_size_allow_list() {
        let mut st = ViewState {
            page: 5,
            ..Default::default()
        };
        st.set_page_size(25);
        assert_eq!(st.page_size, 25);
        assert_eq!(st.page, 1);

        st.page = 3;
        st.set_page_size(33);
        assert_eq!(st.page_size, 25, "invalid size is ignored");
        assert_eq!(st.page, 3, "ignored change does not reset the page");
    }

    #[test]
    fn test_page_count_floor_is_one() {
        let st = ViewState::default();
        assert_eq!(st.page_count(0), 1);
        assert_eq!(st.page_count(1), 1);
        assert_eq!(st.page_count(10), 1);
        assert_eq!(st.page_count(11), 2);
    }

    #[test]
    fn test_current_page_safe_clamps_without_mutating() {
        let st = ViewState {
            page: 9,
            ..Default::default()
        };
        assert_eq!(st.current_page_safe(15), 2);
        assert_eq!(st.page, 9);
        assert_eq!(st.current_page_safe(0), 1);
    }

    #[test]
    fn test_prev_next_are_noops_at_boundaries() {
        let mut st = ViewState::default();
        st.prev_page();
        assert_eq!(st.page, 1);

        st.next_page(15); // 2 pages
        assert_eq!(st.page, 2);
        st.next_page(15);
        assert_eq!(st.page, 2);
        st.prev_page();
        assert_eq!(st.page, 1);
    }
}
