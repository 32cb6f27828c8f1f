use chrono::NaiveDate;
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Cell, ListItem, Row},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Record, Resource, category::source_color, date_format};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Income {
    pub id: u64,
    pub source: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(with = "date_format")]
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewIncome {
    pub source: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(with = "date_format")]
    pub date: NaiveDate,
}

impl Record for Income {
    fn id(&self) -> u64 {
        self.id
    }

    fn key(&self) -> &str {
        &self.source
    }

    fn amount(&self) -> Decimal {
        self.amount
    }

    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Resource for Income {
    type New = NewIncome;

    const PATH: &'static str = "incomes";
    const NOUN: &'static str = "income";

    fn from_new(id: u64, new: NewIncome) -> Self {
        Income {
            id,
            source: new.source,
            amount: new.amount,
            date: new.date,
        }
    }
}

impl Income {
    pub fn to_row(&self) -> Row {
        Row::new(vec![
            Cell::from(Span::styled(
                self.source.clone(),
                Style::default().fg(Color::Black).bg(source_color(&self.source)),
            )),
            Cell::from(format!("${:.2}", self.amount)),
            Cell::from(self.date.format("%Y-%m-%d").to_string()),
        ])
    }

    pub fn to_list_item(&self) -> ListItem {
        ListItem::new(Line::from(vec![
            Span::styled(
                format!("{} ", self.source),
                Style::default().fg(source_color(&self.source)),
            ),
            Span::styled(format!("${:.2}", self.amount), Style::default().fg(Color::Green)),
            Span::raw(format!(" on {}", self.date.format("%Y-%m-%d"))),
        ]))
    }
}
