//! Search, SE filter, pagination and selection over the reviewer's requests.

use std::collections::BTreeSet;

use crate::domain::reportee::Reportee;
use crate::domain::request::{DiscountRequest, RequestId};
use crate::review::BulkAction;

pub const PAGE_SIZE: usize = 10;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SeUserFilter {
    #[default]
    All,
    User(String),
}

impl SeUserFilter {
    /// `all` (any case) or blank selects every SE.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::User(value.to_string())
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestFilter {
    pub search: String,
    pub se_user: SeUserFilter,
}

impl RequestFilter {
    pub fn matches(&self, request: &DiscountRequest) -> bool {
        let needle = self.search.trim().to_lowercase();
        let text_match = needle.is_empty()
            || [
                request.customer_id.to_string(),
                request.customer_name.to_lowercase(),
                request.requested_by_user_name.to_lowercase(),
            ]
            .iter()
            .any(|haystack| haystack.contains(&needle));

        let se_match = match &self.se_user {
            SeUserFilter::All => true,
            SeUserFilter::User(name) => request.requested_by_user_name == *name,
        };

        text_match && se_match
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    current: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { current: 1 }
    }
}

impl Pagination {
    pub fn total_pages(item_count: usize) -> usize {
        item_count.div_ceil(PAGE_SIZE)
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn reset(&mut self) {
        self.current = 1;
    }

    /// Pulls the page back inside `1..=total_pages` after the item count changes.
    pub fn clamp(&mut self, item_count: usize) {
        let last = Self::total_pages(item_count).max(1);
        self.current = self.current.clamp(1, last);
    }

    pub fn go_to(&mut self, page: usize, item_count: usize) {
        self.current = page;
        self.clamp(item_count);
    }

    pub fn range(&self, item_count: usize) -> std::ops::Range<usize> {
        let start = ((self.current - 1) * PAGE_SIZE).min(item_count);
        let end = (start + PAGE_SIZE).min(item_count);
        start..end
    }
}

/// Per-row lock state owned by whoever submits actions.
pub trait ActionLocks {
    fn is_action_disabled(&self, request_id: RequestId) -> bool;
}

impl<F> ActionLocks for F
where
    F: Fn(RequestId) -> bool,
{
    fn is_action_disabled(&self, request_id: RequestId) -> bool {
        self(request_id)
    }
}

#[derive(Clone, Debug, Default)]
pub struct RequestListView {
    requests: Vec<DiscountRequest>,
    filter: RequestFilter,
    pagination: Pagination,
    selected: BTreeSet<RequestId>,
}

impl RequestListView {
    pub fn new(requests: Vec<DiscountRequest>) -> Self {
        Self { requests, ..Self::default() }
    }

    /// Replaces the data after a refresh. Selections that became terminal are dropped.
    pub fn set_requests(&mut self, requests: Vec<DiscountRequest>) {
        self.requests = requests;
        let open: BTreeSet<RequestId> = self
            .requests
            .iter()
            .filter(|request| !request.is_terminal())
            .map(|request| request.request_id)
            .collect();
        self.selected.retain(|id| open.contains(id));
        let count = self.filtered().len();
        self.pagination.clamp(count);
    }

    pub fn requests(&self) -> &[DiscountRequest] {
        &self.requests
    }

    pub fn filter(&self) -> &RequestFilter {
        &self.filter
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filter.search = search.into();
        self.filter_changed();
    }

    pub fn set_se_user(&mut self, se_user: SeUserFilter) {
        self.filter.se_user = se_user;
        self.filter_changed();
    }

    fn filter_changed(&mut self) {
        self.pagination.reset();
        self.selected.clear();
    }

    pub fn filtered(&self) -> Vec<&DiscountRequest> {
        self.requests.iter().filter(|request| self.filter.matches(request)).collect()
    }

    pub fn current_page(&self) -> usize {
        self.pagination.current()
    }

    pub fn total_pages(&self) -> usize {
        Pagination::total_pages(self.filtered().len())
    }

    pub fn go_to_page(&mut self, page: usize) {
        let count = self.filtered().len();
        self.pagination.go_to(page, count);
    }

    pub fn page(&self) -> Vec<&DiscountRequest> {
        let filtered = self.filtered();
        let range = self.pagination.range(filtered.len());
        filtered[range].to_vec()
    }

    /// Distinct SE usernames for the filter facet, sorted.
    ///
    /// The reportee list drives the facet, so an SE with no requests is still
    /// offered. Pass `None` when reportees could not be loaded and the names
    /// on the loaded requests are used instead.
    pub fn se_user_options(&self, reportees: Option<&[Reportee]>) -> Vec<String> {
        let names: BTreeSet<String> = match reportees {
            Some(reportees) => {
                reportees.iter().map(|reportee| reportee.se_user_name.clone()).collect()
            }
            None => {
                self.requests.iter().map(|request| request.requested_by_user_name.clone()).collect()
            }
        };
        names.into_iter().collect()
    }

    pub fn is_selectable(request: &DiscountRequest, locks: &impl ActionLocks) -> bool {
        !request.is_terminal() && !locks.is_action_disabled(request.request_id)
    }

    /// Returns whether the row ended up selected.
    pub fn toggle_selection(&mut self, request_id: RequestId, locks: &impl ActionLocks) -> bool {
        if self.selected.remove(&request_id) {
            return false;
        }
        let selectable = self
            .requests
            .iter()
            .find(|request| request.request_id == request_id)
            .is_some_and(|request| Self::is_selectable(request, locks));
        if selectable {
            self.selected.insert(request_id);
        }
        selectable
    }

    pub fn select_all_on_page(&mut self, locks: &impl ActionLocks) {
        let ids: Vec<RequestId> = self
            .page()
            .into_iter()
            .filter(|request| Self::is_selectable(request, locks))
            .map(|request| request.request_id)
            .collect();
        self.selected = ids.into_iter().collect();
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn selected(&self) -> &BTreeSet<RequestId> {
        &self.selected
    }

    pub fn bulk_mode_active(&self) -> bool {
        !self.selected.is_empty()
    }

    /// Selected rows the bulk action may touch.
    pub fn bulk_targets(&self, action: BulkAction, locks: &impl ActionLocks) -> Vec<&DiscountRequest> {
        self.requests
            .iter()
            .filter(|request| self.selected.contains(&request.request_id))
            .filter(|request| !locks.is_action_disabled(request.request_id))
            .filter(|request| action.admits(request))
            .collect()
    }
}
