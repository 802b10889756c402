//! In-memory filtering, pagination and row selection for list pages.

use std::collections::BTreeSet;

use crate::models::{Collaborator, Department};

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Something that can be shown in a filtered, paged list.
pub trait Listable {
    fn list_id(&self) -> &str;
    fn list_name(&self) -> &str;
    fn list_email(&self) -> &str {
        ""
    }
    fn list_department(&self) -> &str {
        ""
    }
}

impl Listable for Collaborator {
    fn list_id(&self) -> &str {
        &self.id
    }

    fn list_name(&self) -> &str {
        &self.name
    }

    fn list_email(&self) -> &str {
        &self.email
    }

    fn list_department(&self) -> &str {
        self.department_name.as_deref().unwrap_or_default()
    }
}

impl Listable for Department {
    fn list_id(&self) -> &str {
        &self.id
    }

    fn list_name(&self) -> &str {
        &self.name
    }

    fn list_department(&self) -> &str {
        &self.name
    }
}

/// Case-insensitive substring filters. Empty filters match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilters {
    pub name: String,
    pub email: String,
    pub department: String,
}

impl ListFilters {
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty() && self.email.trim().is_empty() && self.department.trim().is_empty()
    }

    pub fn matches<T: Listable>(&self, item: &T) -> bool {
        contains(item.list_name(), &self.name)
            && contains(item.list_email(), &self.email)
            && contains(item.list_department(), &self.department)
    }
}

fn contains(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Items matching `filters`, in their original order.
pub fn filter_items<'a, T: Listable>(items: &'a [T], filters: &ListFilters) -> Vec<&'a T> {
    items.iter().filter(|item| filters.matches(*item)).collect()
}

/// Number of pages for `len` items. An empty list still has one page.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1)).max(1)
}

/// Slice of `items` for the 1-based `page`; empty when out of range.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let page_size = page_size.max(1);
    let start = page.saturating_sub(1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = (start + page_size).min(items.len());
    &items[start..end]
}

/// What a list page renders.
#[derive(Debug)]
pub struct PageView<'a, T> {
    pub rows: Vec<&'a T>,
    pub page: usize,
    pub total_pages: usize,
    /// Number of items after filtering, across all pages.
    pub matching: usize,
}

/// Filters, current page and selected ids of one list page.
#[derive(Debug, Clone)]
pub struct ListState {
    filters: ListFilters,
    page: usize,
    page_size: usize,
    selected: BTreeSet<String>,
}

impl Default for ListState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ListState {
    pub fn new(page_size: usize) -> Self {
        Self {
            filters: ListFilters::default(),
            page: 1,
            page_size: page_size.max(1),
            selected: BTreeSet::new(),
        }
    }

    pub fn filters(&self) -> &ListFilters {
        &self.filters
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Replace the filters. Falls back to page 1 when the current page would
    /// be out of range, and drops selections that are no longer visible.
    pub fn set_filters<T: Listable>(&mut self, filters: ListFilters, items: &[T]) {
        if filters == self.filters {
            return;
        }
        self.filters = filters;
        let matching = filter_items(items, &self.filters).len();
        if self.page > total_pages(matching, self.page_size) {
            self.page = 1;
        }
        self.sync(items);
    }

    /// Move to `page`, clamped to the valid range.
    pub fn set_page<T: Listable>(&mut self, page: usize, items: &[T]) {
        let matching = filter_items(items, &self.filters).len();
        self.page = page.clamp(1, total_pages(matching, self.page_size));
        self.sync(items);
    }

    pub fn view<'a, T: Listable>(&self, items: &'a [T]) -> PageView<'a, T> {
        let filtered = filter_items(items, &self.filters);
        let pages = total_pages(filtered.len(), self.page_size);
        PageView {
            rows: paginate(&filtered, self.page, self.page_size).to_vec(),
            page: self.page,
            total_pages: pages,
            matching: filtered.len(),
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn toggle(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
    }

    /// Select every visible row, or clear them all if they already are.
    pub fn select_all_visible<T: Listable>(&mut self, items: &[T]) {
        let view = self.view(items);
        if self.all_visible_selected(items) {
            for row in &view.rows {
                self.selected.remove(row.list_id());
            }
        } else {
            self.selected
                .extend(view.rows.iter().map(|row| row.list_id().to_string()));
        }
    }

    pub fn all_visible_selected<T: Listable>(&self, items: &[T]) -> bool {
        let view = self.view(items);
        !view.rows.is_empty() && view.rows.iter().all(|row| self.selected.contains(row.list_id()))
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.selected.iter().cloned().collect()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Re-intersect the selection with the visible rows and clamp the page.
    /// Call after the underlying items change.
    pub fn sync<T: Listable>(&mut self, items: &[T]) {
        let matching = filter_items(items, &self.filters).len();
        self.page = self.page.clamp(1, total_pages(matching, self.page_size));
        let view = self.view(items);
        let visible: BTreeSet<&str> = view.rows.iter().map(|row| row.list_id()).collect();
        self.selected.retain(|id| visible.contains(id.as_str()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people(n: usize) -> Vec<Collaborator> {
        (1..=n)
            .map(|i| Collaborator {
                id: format!("c{i}"),
                name: format!("Person {i}"),
                email: format!("p{i}@{}.com", if i % 2 == 0 { "even" } else { "odd" }),
                department_name: Some(if i <= 5 { "Sales" } else { "Engineering" }.to_string()),
                ..Default::default()
            })
            .collect()
    }

    fn ids<T: Listable>(items: &[&T]) -> Vec<String> {
        items.iter().map(|i| i.list_id().to_string()).collect()
    }

    #[test]
    fn test_filters_are_case_insensitive() {
        let items = people(3);
        let filters = ListFilters {
            name: "PERSON 2".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_items(&items, &filters)), vec!["c2"]);
    }

    #[test]
    fn test_empty_filters_match_all() {
        let items = people(4);
        assert!(ListFilters::default().is_empty());
        assert_eq!(filter_items(&items, &ListFilters::default()).len(), 4);
    }

    #[test]
    fn test_filter_order_does_not_matter() {
        let items = people(12);
        let email = ListFilters {
            email: "even".to_string(),
            ..Default::default()
        };
        let dept = ListFilters {
            department: "eng".to_string(),
            ..Default::default()
        };
        let both = ListFilters {
            email: "even".to_string(),
            department: "eng".to_string(),
            ..Default::default()
        };

        let email_then_dept: Vec<Collaborator> = filter_items(&items, &email).into_iter().cloned().collect();
        let dept_then_email: Vec<Collaborator> = filter_items(&items, &dept).into_iter().cloned().collect();

        let a = ids(&filter_items(&email_then_dept, &dept));
        let b = ids(&filter_items(&dept_then_email, &email));
        assert_eq!(a, b);
        assert_eq!(a, ids(&filter_items(&items, &both)));
    }

    #[test]
    fn test_filter_is_idempotent() {
        let items = people(12);
        let filters = ListFilters {
            name: "1".to_string(),
            ..Default::default()
        };
        let once: Vec<Collaborator> = filter_items(&items, &filters).into_iter().cloned().collect();
        assert_eq!(filter_items(&once, &filters).len(), once.len());
    }

    #[test]
    fn test_paginate_bounds() {
        let items: Vec<u32> = (1..=23).collect();
        assert_eq!(total_pages(items.len(), 10), 3);
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(paginate(&items, 3, 10), &[21, 22, 23]);
        assert!(paginate(&items, 4, 10).is_empty());
        assert_eq!(paginate(&items, 0, 10), &items[..10]);
    }

    #[test]
    fn test_filter_change_resets_page() {
        let items = people(25);
        let mut state = ListState::new(10);
        state.set_page(3, &items);
        assert_eq!(state.page(), 3);

        state.set_filters(
            ListFilters {
                department: "sales".to_string(),
                ..Default::default()
            },
            &items,
        );
        assert_eq!(state.page(), 1);
        assert_eq!(state.view(&items).matching, 5);
    }

    #[test]
    fn test_filter_change_keeps_page_in_range() {
        let items = people(25);
        let mut state = ListState::new(10);
        state.set_page(2, &items);

        state.set_filters(
            ListFilters {
                name: "person".to_string(),
                ..Default::default()
            },
            &items,
        );
        assert_eq!(state.page(), 2);
    }

    #[test]
    fn test_select_all_only_touches_visible_rows() {
        let items = people(15);
        let mut state = ListState::new(10);

        state.select_all_visible(&items);
        assert_eq!(state.selected_count(), 10);
        assert!(state.all_visible_selected(&items));

        state.set_page(2, &items);
        assert_eq!(state.selected_count(), 0);
        assert!(!state.all_visible_selected(&items));
    }

    #[test]
    fn test_select_all_toggles_off() {
        let items = people(3);
        let mut state = ListState::new(10);

        state.select_all_visible(&items);
        state.select_all_visible(&items);
        assert_eq!(state.selected_count(), 0);
    }

    #[test]
    fn test_selection_follows_filters() {
        let items = people(6);
        let mut state = ListState::new(10);
        state.toggle("c1");
        state.toggle("c6");

        state.set_filters(
            ListFilters {
                department: "engineering".to_string(),
                ..Default::default()
            },
            &items,
        );
        assert_eq!(state.selected_ids(), vec!["c6".to_string()]);
    }

    #[test]
    fn test_sync_after_delete() {
        let mut items = people(11);
        let mut state = ListState::new(10);
        state.set_page(2, &items);
        state.toggle("c11");

        items.pop();
        state.sync(&items);
        assert_eq!(state.page(), 1);
        assert_eq!(state.selected_count(), 0);
    }
}
