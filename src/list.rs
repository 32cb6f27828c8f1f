use chrono::NaiveDate;
use log::{error, info};

use crate::api::{ApiError, ListQuery, RecordApi};
use crate::models::{Record, Resource};

/// Label of the filter choice that shows everything.
pub const ALL: &str = "All";

/// One collection as shown by a list screen: the fetched records, the active
/// key filter, the server-side date filter, the selected row and any delete
/// awaiting confirmation.
#[derive(Debug)]
pub struct ListView<R: Resource> {
    records: Vec<R>,
    loading: bool,
    filter: Option<String>,
    date: Option<NaiveDate>,
    selected: usize,
    pending_delete: Option<u64>,
}

impl<R: Resource> Default for ListView<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> ListView<R> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            loading: true,
            filter: None,
            date: None,
            selected: 0,
            pending_delete: None,
        }
    }

    /// Replaces the records with a fresh fetch, narrowed by the date filter
    /// if one is set. On failure the list is left empty and the error is only
    /// logged.
    pub async fn load<A: RecordApi<R>>(&mut self, api: &A) {
        self.loading = true;
        match api.list(&ListQuery::on(self.date)).await {
            Ok(records) => {
                info!("loaded {} {}s", records.len(), R::NOUN);
                self.set_records(records);
            }
            Err(err) => {
                error!("failed to load {}s: {err}", R::NOUN);
                self.set_records(Vec::new());
            }
        }
    }

    pub fn set_records(&mut self, records: Vec<R>) {
        self.records = records;
        self.loading = false;
        self.clamp_selection();
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    pub fn filter_label(&self) -> &str {
        self.filter().unwrap_or(ALL)
    }

    /// Records matching the filter exactly, in fetch order.
    pub fn visible(&self) -> Vec<&R> {
        self.records
            .iter()
            .filter(|r| self.filter.as_deref().is_none_or(|f| r.key() == f))
            .collect()
    }

    /// `All` followed by every distinct key in first-seen order.
    pub fn filter_options(&self) -> Vec<String> {
        let mut options = vec![ALL.to_string()];
        for record in &self.records {
            if !options.iter().skip(1).any(|o| o == record.key()) {
                options.push(record.key().to_string());
            }
        }
        options
    }

    pub fn date_filter(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Sets the day the server should narrow the collection to. Takes effect
    /// on the next [`ListView::load`].
    pub fn set_date_filter(&mut self, date: Option<NaiveDate>) {
        self.date = date;
        self.filter = None;
        self.selected = 0;
        self.loading = true;
    }

    /// `None` or `Some("All")` clears the filter.
    pub fn set_filter(&mut self, filter: Option<String>) {
        self.filter = filter.filter(|f| f != ALL);
        self.selected = 0;
    }

    pub fn cycle_filter(&mut self, forward: bool) {
        let options = self.filter_options();
        let current = options
            .iter()
            .position(|o| o == self.filter_label())
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % options.len()
        } else {
            (current + options.len() - 1) % options.len()
        };
        self.set_filter(Some(options[next].clone()));
    }

    pub fn selected(&self) -> Option<usize> {
        (!self.visible().is_empty()).then_some(self.selected)
    }

    pub fn selected_record(&self) -> Option<&R> {
        self.visible().get(self.selected).copied()
    }

    pub fn next(&mut self) {
        let len = self.visible().len();
        if len > 0 {
            self.selected = if self.selected + 1 >= len { 0 } else { self.selected + 1 };
        }
    }

    pub fn previous(&mut self) {
        let len = self.visible().len();
        if len > 0 {
            self.selected = if self.selected == 0 { len - 1 } else { self.selected - 1 };
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    pub fn pending_delete(&self) -> Option<u64> {
        self.pending_delete
    }

    pub fn request_delete(&mut self, id: u64) {
        self.pending_delete = Some(id);
    }

    pub fn request_delete_selected(&mut self) -> bool {
        match self.selected_record().map(|r| r.id()) {
            Some(id) => {
                self.request_delete(id);
                true
            }
            None => false,
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Issues the DELETE for the pending id. On success exactly that record is
    /// dropped from local state; the pending request is cleared either way.
    /// Returns `Ok(false)` when nothing was pending.
    pub async fn confirm_delete<A: RecordApi<R>>(&mut self, api: &A) -> Result<bool, ApiError> {
        let Some(id) = self.pending_delete.take() else {
            return Ok(false);
        };
        match api.delete(id).await {
            Ok(()) => {
                if let Some(index) = self.records.iter().position(|r| r.id() == id) {
                    self.records.remove(index);
                }
                self.clamp_selection();
                info!("deleted {} {id}", R::NOUN);
                Ok(true)
            }
            Err(err) => {
                error!("Failed to delete {}: {err}", R::NOUN);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::memory::MemoryApi;
    use crate::models::{expense::Expense, income::Income};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn expense(id: u64, category: &str) -> Expense {
        Expense {
            id,
            title: format!("expense {id}"),
            amount: Decimal::from(id * 10),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            category: category.to_string(),
        }
    }

    fn sample() -> Vec<Expense> {
        vec![
            expense(1, "Food"),
            expense(2, "Health"),
            expense(3, "Food"),
            expense(4, "Utilities"),
        ]
    }

    #[test]
    fn starts_loading_until_records_arrive() {
        let mut view = ListView::<Expense>::new();
        assert!(view.is_loading());
        view.set_records(sample());
        assert!(!view.is_loading());
    }

    #[test]
    fn filter_matches_key_exactly() {
        let mut view = ListView::new();
        view.set_records(sample());

        view.set_filter(Some("Food".to_string()));
        let ids: Vec<u64> = view.visible().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 3]);

        view.set_filter(Some("food".to_string()));
        assert!(view.visible().is_empty());

        view.set_filter(Some(ALL.to_string()));
        assert_eq!(view.visible().len(), 4);
        assert_eq!(view.filter(), None);
    }

    #[test]
    fn filter_options_are_distinct_in_first_seen_order() {
        let mut view = ListView::new();
        view.set_records(sample());
        assert_eq!(view.filter_options(), vec!["All", "Food", "Health", "Utilities"]);
    }

    #[test]
    fn cycling_filters_wraps() {
        let mut view = ListView::new();
        view.set_records(sample());
        view.cycle_filter(false);
        assert_eq!(view.filter_label(), "Utilities");
        view.cycle_filter(true);
        assert_eq!(view.filter_label(), ALL);
        view.cycle_filter(true);
        assert_eq!(view.filter_label(), "Food");
    }

    #[test]
    fn selection_wraps_within_visible_rows() {
        let mut view = ListView::new();
        view.set_records(sample());
        view.set_filter(Some("Food".to_string()));
        view.previous();
        assert_eq!(view.selected_record().map(|e| e.id), Some(3));
        view.next();
        assert_eq!(view.selected_record().map(|e| e.id), Some(1));
    }

    #[tokio::test]
    async fn load_failure_leaves_empty_list() {
        let api = MemoryApi::<Income>::failing_list();
        let mut view = ListView::<Income>::new();
        view.load(&api).await;
        assert!(!view.is_loading());
        assert!(view.records().is_empty());
    }

    #[tokio::test]
    async fn date_filter_narrows_the_fetch() {
        let mut records = sample();
        records[1].date = NaiveDate::from_ymd_opt(2024, 2, 14).unwrap();
        let api = MemoryApi::new(records);
        let mut view = ListView::<Expense>::new();

        view.set_date_filter(NaiveDate::from_ymd_opt(2024, 2, 14));
        assert!(view.is_loading());
        view.load(&api).await;
        let ids: Vec<u64> = view.records().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2]);

        view.set_date_filter(None);
        view.load(&api).await;
        assert_eq!(view.records().len(), 4);
    }

    #[tokio::test]
    async fn confirmed_delete_removes_exactly_one_record() {
        let api = MemoryApi::new(sample());
        let mut view = ListView::<Expense>::new();
        view.load(&api).await;
        view.set_filter(Some("Food".to_string()));

        view.request_delete(3);
        assert_eq!(view.pending_delete(), Some(3));
        assert_eq!(view.confirm_delete(&api).await.unwrap(), true);

        assert_eq!(view.pending_delete(), None);
        assert_eq!(api.deleted(), vec![3]);
        let ids: Vec<u64> = view.records().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 4]);
        assert_eq!(view.visible().len(), 1);
    }

    #[tokio::test]
    async fn cancelled_delete_issues_no_request() {
        let api = MemoryApi::new(sample());
        let mut view = ListView::<Expense>::new();
        view.load(&api).await;

        assert!(view.request_delete_selected());
        view.cancel_delete();
        assert_eq!(view.confirm_delete(&api).await.unwrap(), false);
        assert!(api.deleted().is_empty());
        assert_eq!(view.records().len(), 4);
    }

    #[tokio::test]
    async fn failed_delete_keeps_record_and_clears_request() {
        let api = MemoryApi::new(sample()).fail_deletes();
        let mut view = ListView::<Expense>::new();
        view.load(&api).await;

        view.request_delete(2);
        assert!(view.confirm_delete(&api).await.is_err());
        assert_eq!(view.pending_delete(), None);
        assert_eq!(view.records().len(), 4);
    }
}
