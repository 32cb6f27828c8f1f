pub mod analytics;
pub mod api;
pub mod config;
pub mod forms;
pub mod import;
pub mod list;
pub mod models;
pub mod navigation;
pub mod notify;
pub mod ui;

// Re-export commonly used items
pub use analytics::{Dashboard, KeyedTotals, MonthlyPoint, Summary};
pub use api::{ApiError, HttpApi, ListQuery, RecordApi, UploadReport};
pub use config::Config;
pub use models::{Record, Resource, category::ExpenseCategory, expense::Expense, income::Income};
pub use navigation::Route;
pub use ui::app::App;
