use chrono::NaiveDate;
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Cell, ListItem, Row},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Record, Resource, category::category_color, date_format};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: u64,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(with = "date_format")]
    pub date: NaiveDate,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewExpense {
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(with = "date_format")]
    pub date: NaiveDate,
    pub category: String,
}

impl Record for Expense {
    fn id(&self) -> u64 {
        self.id
    }

    fn key(&self) -> &str {
        &self.category
    }

    fn amount(&self) -> Decimal {
        self.amount
    }

    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Resource for Expense {
    type New = NewExpense;

    const PATH: &'static str = "expenses";
    const NOUN: &'static str = "expense";

    fn from_new(id: u64, new: NewExpense) -> Self {
        Expense {
            id,
            title: new.title,
            amount: new.amount,
            date: new.date,
            category: new.category,
        }
    }
}

impl Expense {
    pub fn to_row(&self) -> Row {
        Row::new(vec![
            Cell::from(self.title.clone()),
            Cell::from(format!("${:.2}", self.amount)),
            Cell::from(self.date.format("%Y-%m-%d").to_string()),
            Cell::from(Span::styled(
                self.category.clone(),
                Style::default().fg(Color::Black).bg(category_color(&self.category)),
            )),
        ])
    }

    pub fn to_list_item(&self) -> ListItem {
        ListItem::new(Line::from(vec![
            Span::raw(format!("{} ", self.title)),
            Span::styled(
                format!("({}) ", self.category),
                Style::default().fg(category_color(&self.category)),
            ),
            Span::styled(format!("${:.2}", self.amount), Style::default().fg(Color::Red)),
            Span::raw(format!(" on {}", self.date.format("%Y-%m-%d"))),
        ]))
    }
}
