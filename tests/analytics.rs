use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use expense_tracker::analytics::{self, NOT_AVAILABLE};
use expense_tracker::{Dashboard, Expense, Income, KeyedTotals};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn expense(id: u64, amount: &str, day: &str, category: &str) -> Expense {
    Expense {
        id,
        title: format!("expense {id}"),
        amount: dec(amount),
        date: date(day),
        category: category.to_string(),
    }
}

fn income(id: u64, amount: &str, day: &str, source: &str) -> Income {
    Income {
        id,
        source: source.to_string(),
        amount: dec(amount),
        date: date(day),
    }
}

fn household() -> (Vec<Expense>, Vec<Income>) {
    let expenses = vec![
        expense(1, "120.50", "2024-01-03", "Food"),
        expense(2, "60", "2024-01-15", "Transportation"),
        expense(3, "900", "2024-02-01", "Utilities"),
        expense(4, "45.25", "2024-02-20", "Food"),
        expense(5, "30", "2024-03-09", "Entertainment"),
        expense(6, "12", "2024-03-10", "Food"),
    ];
    let incomes = vec![
        income(1, "3000", "2024-01-31", "Salary"),
        income(2, "250", "2024-02-10", "Freelance"),
        income(3, "3000", "2024-02-29", "Salary"),
    ];
    (expenses, incomes)
}

#[test]
fn grouped_sums_add_up_to_the_total() {
    let (expenses, incomes) = household();

    let by_category = KeyedTotals::by_key(&expenses);
    assert_eq!(by_category.total(), analytics::total(&expenses));
    assert_eq!(by_category.get("Food"), dec("177.75"));

    let by_month = KeyedTotals::by_month(&incomes);
    assert_eq!(by_month.total(), analytics::total(&incomes));
    let months: Vec<&str> = by_month.entries().iter().map(|(m, _)| m.as_str()).collect();
    assert_eq!(months, vec!["2024-01", "2024-02"]);
}

#[test]
fn summary_reflects_both_collections() {
    let (expenses, incomes) = household();
    let dashboard = Dashboard::compute(&expenses, &incomes);
    let summary = &dashboard.summary;

    assert_eq!(summary.total_expense, dec("1167.75"));
    assert_eq!(summary.total_income, dec("6250"));
    assert_eq!(summary.net_balance, dec("5082.25"));
    assert_eq!(summary.average_monthly_expense, dec("389.25"));
    assert_eq!(summary.average_monthly_income, dec("3125"));
    assert_eq!(summary.top_expense_category, "Utilities");
    assert_eq!(summary.top_income_source, "Salary");
}

#[test]
fn monthly_series_covers_every_month_in_order() {
    let (expenses, incomes) = household();
    let dashboard = Dashboard::compute(&expenses, &incomes);

    let months: Vec<&str> = dashboard.monthly.iter().map(|p| p.month.as_str()).collect();
    assert_eq!(months, vec!["2024-01", "2024-02", "2024-03"]);

    let march = &dashboard.monthly[2];
    assert_eq!(march.income, Decimal::ZERO);
    assert_eq!(march.expense, dec("42"));
    assert_eq!(march.net(), dec("-42"));
}

#[test]
fn recent_and_largest_lists() {
    let (expenses, _) = household();
    let dashboard = Dashboard::compute(&expenses, &[]);

    let recent: Vec<u64> = dashboard.recent_expenses.iter().map(|e| e.id).collect();
    assert_eq!(recent, vec![6, 5, 4, 3, 2]);

    let largest: Vec<u64> = dashboard.largest_expenses.iter().map(|e| e.id).collect();
    assert_eq!(largest, vec![3, 1, 2, 4, 5]);
}

#[test]
fn nothing_recorded_yields_zeroes_and_placeholders() {
    let dashboard = Dashboard::compute(&[], &[]);
    assert_eq!(dashboard, Dashboard::empty());
    assert_eq!(dashboard.summary.net_balance, Decimal::ZERO);
    assert_eq!(dashboard.summary.average_monthly_expense, Decimal::ZERO);
    assert_eq!(dashboard.summary.top_income_source, NOT_AVAILABLE);
    assert_eq!(dashboard.summary.top_expense_category, NOT_AVAILABLE);
    assert!(dashboard.monthly.is_empty());
}
