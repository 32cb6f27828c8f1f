//! Dashboard aggregates: totals, monthly series, per-key breakdowns.
//!
//! Everything here is recomputed from a full fetch of both collections;
//! nothing is cached between loads.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use log::{error, info, warn};
use rust_decimal::Decimal;

use crate::api::{ListQuery, RecordApi};
use crate::models::{Record, expense::Expense, income::Income};

/// Shown when there is nothing to rank.
pub const NOT_AVAILABLE: &str = "N/A";
pub const RECENT_COUNT: usize = 5;
pub const LARGEST_COUNT: usize = 5;

pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Adds an amount to a running sum, pinning at the representable bound on
/// overflow.
fn add_amount(sum: Decimal, amount: Decimal) -> Decimal {
    sum.checked_add(amount).unwrap_or_else(|| {
        warn!("amount sum overflowed adding {amount}; capping");
        sum.saturating_add(amount)
    })
}

/// Sums grouped by key, in the order keys were first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyedTotals {
    entries: Vec<(String, Decimal)>,
}

impl KeyedTotals {
    pub fn from_records<R, F>(records: &[R], key: F) -> Self
    where
        F: Fn(&R) -> String,
        R: Record,
    {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut entries: Vec<(String, Decimal)> = Vec::new();

        for record in records {
            let key = key(record);
            match index.get(&key) {
                Some(&i) => entries[i].1 = add_amount(entries[i].1, record.amount()),
                None => {
                    index.insert(key.clone(), entries.len());
                    entries.push((key, record.amount()));
                }
            }
        }

        Self { entries }
    }

    pub fn by_key<R: Record>(records: &[R]) -> Self {
        Self::from_records(records, |r| r.key().to_string())
    }

    pub fn by_month<R: Record>(records: &[R]) -> Self {
        Self::from_records(records, |r| month_key(r.date()))
    }

    pub fn entries(&self) -> &[(String, Decimal)] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Decimal {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn total(&self) -> Decimal {
        self.entries.iter().fold(Decimal::ZERO, |sum, (_, v)| add_amount(sum, *v))
    }

    /// Key with the largest sum. On a tie the earliest-seen key wins.
    pub fn top(&self) -> Option<&str> {
        let mut best: Option<&(String, Decimal)> = None;
        for entry in &self.entries {
            if best.is_none_or(|b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        best.map(|(k, _)| k.as_str())
    }

    pub fn top_or_na(&self) -> String {
        self.top().unwrap_or(NOT_AVAILABLE).to_string()
    }
}

pub fn total<R: Record>(records: &[R]) -> Decimal {
    records.iter().fold(Decimal::ZERO, |sum, r| add_amount(sum, r.amount()))
}

/// Total divided by the number of distinct months present; zero when empty.
pub fn average_per_month<R: Record>(records: &[R]) -> Decimal {
    let months: BTreeSet<String> = records.iter().map(|r| month_key(r.date())).collect();
    if months.is_empty() {
        return Decimal::ZERO;
    }
    total(records) / Decimal::from(months.len())
}

/// Last `n` records in arrival order, newest arrival first.
pub fn recent<R: Clone>(records: &[R], n: usize) -> Vec<R> {
    let start = records.len().saturating_sub(n);
    records[start..].iter().rev().cloned().collect()
}

/// Top `n` records by amount, largest first. Equal amounts keep arrival order.
pub fn largest<R: Record + Clone>(records: &[R], n: usize) -> Vec<R> {
    let mut sorted: Vec<R> = records.to_vec();
    sorted.sort_by(|a, b| b.amount().cmp(&a.amount()));
    sorted.truncate(n);
    sorted
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyPoint {
    pub month: String,
    pub income: Decimal,
    pub expense: Decimal,
}

impl MonthlyPoint {
    pub fn net(&self) -> Decimal {
        self.income.saturating_sub(self.expense)
    }
}

/// One point per month present in either list, months ascending.
pub fn monthly_series(expenses: &[Expense], incomes: &[Income]) -> Vec<MonthlyPoint> {
    let expense_by_month = KeyedTotals::by_month(expenses);
    let income_by_month = KeyedTotals::by_month(incomes);

    let months: BTreeSet<&str> = expense_by_month
        .entries()
        .iter()
        .chain(income_by_month.entries())
        .map(|(month, _)| month.as_str())
        .collect();

    months
        .into_iter()
        .map(|month| MonthlyPoint {
            month: month.to_string(),
            income: income_by_month.get(month),
            expense: expense_by_month.get(month),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net_balance: Decimal,
    pub average_monthly_income: Decimal,
    pub average_monthly_expense: Decimal,
    pub top_income_source: String,
    pub top_expense_category: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub summary: Summary,
    pub monthly: Vec<MonthlyPoint>,
    pub income_by_source: KeyedTotals,
    pub expense_by_category: KeyedTotals,
    pub recent_incomes: Vec<Income>,
    pub recent_expenses: Vec<Expense>,
    pub largest_expenses: Vec<Expense>,
}

impl Dashboard {
    pub fn compute(expenses: &[Expense], incomes: &[Income]) -> Self {
        let income_by_source = KeyedTotals::by_key(incomes);
        let expense_by_category = KeyedTotals::by_key(expenses);
        let total_income = total(incomes);
        let total_expense = total(expenses);

        let summary = Summary {
            total_income,
            total_expense,
            net_balance: total_income.saturating_sub(total_expense),
            average_monthly_income: average_per_month(incomes),
            average_monthly_expense: average_per_month(expenses),
            top_income_source: income_by_source.top_or_na(),
            top_expense_category: expense_by_category.top_or_na(),
        };

        Self {
            summary,
            monthly: monthly_series(expenses, incomes),
            income_by_source,
            expense_by_category,
            recent_incomes: recent(incomes, RECENT_COUNT),
            recent_expenses: recent(expenses, RECENT_COUNT),
            largest_expenses: largest(expenses, LARGEST_COUNT),
        }
    }

    pub fn empty() -> Self {
        Self::compute(&[], &[])
    }
}

/// Fetches both collections concurrently and aggregates them. A failed fetch
/// is logged and yields an empty dashboard.
pub async fn load_dashboard<E, I>(expenses_api: &E, incomes_api: &I) -> Dashboard
where
    E: RecordApi<Expense>,
    I: RecordApi<Income>,
{
    let query = ListQuery::all();
    match tokio::try_join!(expenses_api.list(&query), incomes_api.list(&query)) {
        Ok((expenses, incomes)) => {
            info!("dashboard loaded {} expenses, {} incomes", expenses.len(), incomes.len());
            Dashboard::compute(&expenses, &incomes)
        }
        Err(err) => {
            error!("Error fetching analytics data: {err}");
            Dashboard::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::memory::MemoryApi;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn expense(id: u64, category: &str, amount: &str, on: &str) -> Expense {
        Expense {
            id,
            title: format!("expense {id}"),
            amount: dec(amount),
            date: date(on),
            category: category.to_string(),
        }
    }

    fn income(id: u64, source: &str, amount: &str, on: &str) -> Income {
        Income {
            id,
            source: source.to_string(),
            amount: dec(amount),
            date: date(on),
        }
    }

    #[test]
    fn category_sums_and_top() {
        let expenses = vec![
            expense(1, "Food", "100", "2024-01-03"),
            expense(2, "Food", "50", "2024-01-09"),
            expense(3, "Transport", "30", "2024-02-01"),
        ];
        let totals = KeyedTotals::by_key(&expenses);
        assert_eq!(
            totals.entries(),
            &[("Food".to_string(), dec("150")), ("Transport".to_string(), dec("30"))]
        );
        assert_eq!(totals.top(), Some("Food"));
    }

    #[test]
    fn top_tie_goes_to_first_seen_key() {
        let incomes = vec![
            income(1, "Freelance", "200", "2024-03-01"),
            income(2, "Salary", "150", "2024-03-02"),
            income(3, "Salary", "50", "2024-03-03"),
        ];
        assert_eq!(KeyedTotals::by_key(&incomes).top(), Some("Freelance"));
    }

    #[test]
    fn top_of_nothing_is_not_available() {
        let totals = KeyedTotals::by_key::<Expense>(&[]);
        assert_eq!(totals.top(), None);
        assert_eq!(totals.top_or_na(), NOT_AVAILABLE);
    }

    #[test]
    fn oversized_amounts_cap_instead_of_overflowing() {
        let json = r#"[
            {"id": 1, "title": "a", "amount": 5e28, "date": "2024-01-01", "category": "Food"},
            {"id": 2, "title": "b", "amount": 5e28, "date": "2024-01-02", "category": "Food"}
        ]"#;
        let expenses: Vec<Expense> = serde_json::from_str(json).unwrap();
        let incomes = vec![income(1, "Salary", "100", "2024-01-05")];

        let dashboard = Dashboard::compute(&expenses, &incomes);
        assert_eq!(dashboard.summary.total_expense, Decimal::MAX);
        assert_eq!(dashboard.expense_by_category.get("Food"), Decimal::MAX);
        assert_eq!(dashboard.summary.top_expense_category, "Food");
        assert!(dashboard.summary.net_balance < Decimal::ZERO);
        assert!(dashboard.monthly[0].net() < Decimal::ZERO);
    }

    #[test]
    fn average_uses_distinct_months() {
        let expenses = vec![
            expense(1, "Food", "10", "2024-01-01"),
            expense(2, "Food", "20", "2024-01-31"),
            expense(3, "Food", "30", "2024-03-15"),
        ];
        assert_eq!(average_per_month(&expenses), dec("30"));
        assert_eq!(average_per_month::<Expense>(&[]), Decimal::ZERO);
    }

    #[test]
    fn monthly_series_unions_months() {
        let expenses = vec![
            expense(1, "Food", "40", "2024-02-10"),
            expense(2, "Health", "10", "2024-01-05"),
        ];
        let incomes = vec![
            income(1, "Salary", "100", "2024-03-01"),
            income(2, "Salary", "100", "2024-01-30"),
        ];

        let series = monthly_series(&expenses, &incomes);
        let months: Vec<&str> = series.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(months, vec!["2024-01", "2024-02", "2024-03"]);

        assert_eq!(series[0].income, dec("100"));
        assert_eq!(series[0].expense, dec("10"));
        assert_eq!(series[0].net(), dec("90"));
        assert_eq!(series[1].income, Decimal::ZERO);
        assert_eq!(series[1].net(), dec("-40"));
        assert_eq!(series[2].expense, Decimal::ZERO);
    }

    #[test]
    fn recent_is_arrival_order_not_date_order() {
        let expenses: Vec<Expense> = (1..=7)
            .map(|i| expense(i, "Food", "1", if i % 2 == 0 { "2020-01-01" } else { "2024-01-01" }))
            .collect();
        let ids: Vec<u64> = recent(&expenses, RECENT_COUNT).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![7, 6, 5, 4, 3]);
        assert_eq!(recent(&expenses[..2], RECENT_COUNT).len(), 2);
    }

    #[test]
    fn largest_sorts_by_amount_descending() {
        let expenses = vec![
            expense(1, "Food", "5", "2024-01-01"),
            expense(2, "Food", "50", "2024-01-01"),
            expense(3, "Food", "20", "2024-01-01"),
            expense(4, "Food", "50", "2024-01-01"),
        ];
        let ids: Vec<u64> = largest(&expenses, 3).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 4, 3]);
    }

    #[test]
    fn summary_totals_and_net() {
        let expenses = vec![expense(1, "Food", "120.50", "2024-01-01")];
        let incomes = vec![income(1, "Salary", "100", "2024-01-01")];
        let dashboard = Dashboard::compute(&expenses, &incomes);
        assert_eq!(dashboard.summary.total_expense, dec("120.50"));
        assert_eq!(dashboard.summary.total_income, dec("100"));
        assert_eq!(dashboard.summary.net_balance, dec("-20.50"));
        assert_eq!(dashboard.summary.top_income_source, "Salary");
        assert_eq!(dashboard.summary.top_expense_category, "Food");
    }

    #[tokio::test]
    async fn load_dashboard_aggregates_both_collections() {
        let expenses = MemoryApi::new(vec![expense(1, "Food", "10", "2024-05-01")]);
        let incomes = MemoryApi::new(vec![income(1, "Salary", "90", "2024-05-20")]);

        let dashboard = load_dashboard(&expenses, &incomes).await;
        assert_eq!(dashboard.summary.net_balance, dec("80"));
        assert_eq!(dashboard.monthly.len(), 1);
    }

    #[tokio::test]
    async fn failed_fetch_yields_empty_dashboard() {
        let expenses = MemoryApi::new(vec![expense(1, "Food", "10", "2024-05-01")]);
        let incomes = MemoryApi::<Income>::failing_list();

        let dashboard = load_dashboard(&expenses, &incomes).await;
        assert_eq!(dashboard, Dashboard::empty());
        assert_eq!(dashboard.summary.top_expense_category, NOT_AVAILABLE);
    }
}
