//! Single-record entry forms.
//!
//! A `Form` owns the raw text of each field, the per-field error messages and
//! the focused field. Drafts turn that text into a creation payload.

use std::collections::BTreeMap;
use std::str::FromStr;

use log::{error, info};
use rust_decimal::Decimal;

use crate::api::{ApiError, RecordApi};
use crate::models::{
    Record, Resource,
    category::ExpenseCategory,
    expense::{Expense, NewExpense},
    income::{Income, NewIncome},
    parse_date,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Title,
    Source,
    Amount,
    Date,
    Category,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::Title => "Expense Title",
            Field::Source => "Income Source",
            Field::Amount => "Amount",
            Field::Date => "Date (YYYY-MM-DD)",
            Field::Category => "Category",
        }
    }
}

pub type FieldErrors = BTreeMap<Field, String>;

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Valid,
    Invalid(String),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(msg) => Some(msg),
        }
    }
}

pub fn required(value: &str, message: &str) -> ValidationResult {
    if value.trim().is_empty() {
        ValidationResult::Invalid(message.to_string())
    } else {
        ValidationResult::Valid
    }
}

/// Largest amount a single record may carry.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Parses a strictly positive amount no larger than [`MAX_AMOUNT`].
pub fn parse_amount(value: &str) -> Option<Decimal> {
    Decimal::from_str(value.trim())
        .ok()
        .filter(|amount| *amount > Decimal::ZERO && *amount <= MAX_AMOUNT)
}

pub fn positive_amount(value: &str) -> ValidationResult {
    if value.is_empty() {
        ValidationResult::Invalid("Amount is required".to_string())
    } else if parse_amount(value).is_none() {
        ValidationResult::Invalid("Amount must be a positive number".to_string())
    } else {
        ValidationResult::Valid
    }
}

pub fn iso_date(value: &str) -> ValidationResult {
    if value.is_empty() {
        ValidationResult::Invalid("Date is required".to_string())
    } else if parse_date(value).is_none() {
        ValidationResult::Invalid("Date must be in YYYY-MM-DD format".to_string())
    } else {
        ValidationResult::Valid
    }
}

/// Field layout and validation for one record type.
pub trait Draft: Default {
    type Record: Resource;

    const FIELDS: &'static [Field];

    fn value(&self, field: Field) -> &str;

    fn value_mut(&mut self, field: Field) -> Option<&mut String>;

    /// Fixed choices for a select-style field.
    fn options(_field: Field) -> Option<&'static [&'static str]> {
        None
    }

    fn check(&self) -> Vec<(Field, ValidationResult)>;

    /// Builds the payload; only called once `check` passes.
    fn build(&self) -> Option<<Self::Record as Resource>::New>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseDraft {
    pub title: String,
    pub amount: String,
    pub date: String,
    pub category: String,
}

impl Draft for ExpenseDraft {
    type Record = Expense;

    const FIELDS: &'static [Field] = &[Field::Title, Field::Amount, Field::Date, Field::Category];

    fn value(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Amount => &self.amount,
            Field::Date => &self.date,
            Field::Category => &self.category,
            Field::Source => "",
        }
    }

    fn value_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Title => Some(&mut self.title),
            Field::Amount => Some(&mut self.amount),
            Field::Date => Some(&mut self.date),
            Field::Category => Some(&mut self.category),
            Field::Source => None,
        }
    }

    fn options(field: Field) -> Option<&'static [&'static str]> {
        (field == Field::Category).then(ExpenseCategory::names)
    }

    fn check(&self) -> Vec<(Field, ValidationResult)> {
        vec![
            (Field::Title, required(&self.title, "Title is required")),
            (Field::Amount, positive_amount(&self.amount)),
            (Field::Date, iso_date(&self.date)),
            (Field::Category, required(&self.category, "Category is required")),
        ]
    }

    fn build(&self) -> Option<NewExpense> {
        Some(NewExpense {
            title: self.title.trim().to_string(),
            amount: parse_amount(&self.amount)?,
            date: parse_date(&self.date)?,
            category: self.category.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncomeDraft {
    pub source: String,
    pub amount: String,
    pub date: String,
}

impl Draft for IncomeDraft {
    type Record = Income;

    const FIELDS: &'static [Field] = &[Field::Source, Field::Amount, Field::Date];

    fn value(&self, field: Field) -> &str {
        match field {
            Field::Source => &self.source,
            Field::Amount => &self.amount,
            Field::Date => &self.date,
            Field::Title | Field::Category => "",
        }
    }

    fn value_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Source => Some(&mut self.source),
            Field::Amount => Some(&mut self.amount),
            Field::Date => Some(&mut self.date),
            Field::Title | Field::Category => None,
        }
    }

    fn check(&self) -> Vec<(Field, ValidationResult)> {
        vec![
            (Field::Source, required(&self.source, "Source is required")),
            (Field::Amount, positive_amount(&self.amount)),
            (Field::Date, iso_date(&self.date)),
        ]
    }

    fn build(&self) -> Option<NewIncome> {
        Some(NewIncome {
            source: self.source.trim().to_string(),
            amount: parse_amount(&self.amount)?,
            date: parse_date(&self.date)?,
        })
    }
}

#[derive(Debug)]
pub enum SubmitError {
    Invalid,
    Api(ApiError),
}

#[derive(Debug)]
pub struct Form<D: Draft> {
    draft: D,
    errors: FieldErrors,
    focus: usize,
}

impl<D: Draft> Form<D> {
    pub fn new() -> Self {
        Self {
            draft: D::default(),
            errors: FieldErrors::new(),
            focus: 0,
        }
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn fields(&self) -> &'static [Field] {
        D::FIELDS
    }

    pub fn focused(&self) -> Field {
        D::FIELDS[self.focus]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % D::FIELDS.len();
    }

    pub fn focus_previous(&mut self) {
        self.focus = (self.focus + D::FIELDS.len() - 1) % D::FIELDS.len();
    }

    /// Replaces a field's text and clears its error.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        if let Some(slot) = self.draft.value_mut(field) {
            *slot = value.into();
            self.errors.remove(&field);
        }
    }

    pub fn input_char(&mut self, c: char) {
        let field = self.focused();
        if D::options(field).is_some() {
            return;
        }
        let mut value = self.draft.value(field).to_string();
        value.push(c);
        self.set(field, value);
    }

    pub fn backspace(&mut self) {
        let field = self.focused();
        let mut value = self.draft.value(field).to_string();
        value.pop();
        self.set(field, value);
    }

    /// Steps a select-style field through its choices; an empty value means
    /// nothing chosen yet.
    pub fn cycle_option(&mut self, forward: bool) {
        let field = self.focused();
        let Some(options) = D::options(field) else {
            return;
        };
        let current = options.iter().position(|o| *o == self.draft.value(field));
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => options.len() - 1,
            (Some(i), true) => (i + 1) % options.len(),
            (Some(i), false) => (i + options.len() - 1) % options.len(),
        };
        self.set(field, options[next]);
    }

    /// Runs every rule, records the failures and returns the payload if all
    /// fields are valid.
    pub fn validate(&mut self) -> Option<<D::Record as Resource>::New> {
        self.errors = self
            .draft
            .check()
            .into_iter()
            .filter_map(|(field, result)| result.error_message().map(|m| (field, m.to_string())))
            .collect();
        if self.errors.is_empty() { self.draft.build() } else { None }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Validates, then POSTs. The form is cleared only on success.
    pub async fn submit<A>(&mut self, api: &A) -> Result<D::Record, SubmitError>
    where
        A: RecordApi<D::Record>,
    {
        let new = self.validate().ok_or(SubmitError::Invalid)?;
        match api.create(&new).await {
            Ok(record) => {
                info!("added {} {}", <D::Record as Resource>::NOUN, record.id());
                self.reset();
                Ok(record)
            }
            Err(err) => {
                error!("failed to add {}: {err}", <D::Record as Resource>::NOUN);
                Err(SubmitError::Api(err))
            }
        }
    }
}
