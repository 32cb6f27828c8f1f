use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ApiError, ListQuery, RecordApi, UploadReport};
use crate::models::{
    Record, Resource,
    expense::{Expense, NewExpense},
    income::{Income, NewIncome},
};

/// In-process stand-in for the REST server.
pub(crate) struct MemoryApi<R: Resource> {
    state: Mutex<State<R>>,
}

struct State<R: Resource> {
    records: Vec<R>,
    created: Vec<R::New>,
    deleted: Vec<u64>,
    next_id: u64,
    fail_after_creates: Option<usize>,
    fail_list: bool,
    fail_delete: bool,
}

impl<R: Resource> MemoryApi<R> {
    pub(crate) fn new(records: Vec<R>) -> Self {
        let next_id = records.iter().map(|r| r.id()).max().unwrap_or(0) + 1;
        Self {
            state: Mutex::new(State {
                records,
                created: Vec::new(),
                deleted: Vec::new(),
                next_id,
                fail_after_creates: None,
                fail_list: false,
                fail_delete: false,
            }),
        }
    }

    pub(crate) fn failing_list() -> Self {
        let api = Self::new(Vec::new());
        api.state.lock().unwrap().fail_list = true;
        api
    }

    pub(crate) fn fail_deletes(self) -> Self {
        self.state.lock().unwrap().fail_delete = true;
        self
    }

    /// Accept `n` creates, then answer every further create with a 500.
    pub(crate) fn fail_after_creates(self, n: usize) -> Self {
        self.state.lock().unwrap().fail_after_creates = Some(n);
        self
    }

    pub(crate) fn created(&self) -> Vec<R::New> {
        self.state.lock().unwrap().created.clone()
    }

    pub(crate) fn deleted(&self) -> Vec<u64> {
        self.state.lock().unwrap().deleted.clone()
    }

    pub(crate) fn records(&self) -> Vec<R> {
        self.state.lock().unwrap().records.clone()
    }
}

fn server_error() -> ApiError {
    ApiError::Status {
        status: 500,
        message: "Internal Server Error".to_string(),
    }
}

#[async_trait]
impl<R: Resource> RecordApi<R> for MemoryApi<R> {
    async fn list(&self, query: &ListQuery) -> Result<Vec<R>, ApiError> {
        let state = self.state.lock().unwrap();
        if state.fail_list {
            return Err(server_error());
        }
        Ok(state
            .records
            .iter()
            .filter(|r| query.date.is_none_or(|date| r.date() == date))
            .cloned()
            .collect())
    }

    async fn create(&self, new: &R::New) -> Result<R, ApiError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_after_creates.is_some_and(|n| state.created.len() >= n) {
            return Err(server_error());
        }
        let id = state.next_id;
        state.next_id += 1;
        state.created.push(new.clone());
        let record = R::from_new(id, new.clone());
        state.records.push(record.clone());
        Ok(record)
    }

    async fn delete(&self, id: u64) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_delete {
            return Err(server_error());
        }
        let before = state.records.len();
        state.records.retain(|r| r.id() != id);
        if state.records.len() == before {
            return Err(ApiError::Status {
                status: 404,
                message: "Not Found".to_string(),
            });
        }
        state.deleted.push(id);
        Ok(())
    }

    async fn upload(&self, path: &Path) -> Result<UploadReport, ApiError> {
        Err(ApiError::Io {
            path: path.display().to_string(),
            source: std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "uploads are not simulated",
            ),
        })
    }
}

/// Both collections behind one handle, like a real server.
pub(crate) struct MemoryBackend {
    pub(crate) expenses: MemoryApi<Expense>,
    pub(crate) incomes: MemoryApi<Income>,
}

impl MemoryBackend {
    pub(crate) fn new(expenses: Vec<Expense>, incomes: Vec<Income>) -> Self {
        Self {
            expenses: MemoryApi::new(expenses),
            incomes: MemoryApi::new(incomes),
        }
    }
}

#[async_trait]
impl RecordApi<Expense> for MemoryBackend {
    async fn list(&self, query: &ListQuery) -> Result<Vec<Expense>, ApiError> {
        self.expenses.list(query).await
    }

    async fn create(&self, new: &NewExpense) -> Result<Expense, ApiError> {
        self.expenses.create(new).await
    }

    async fn delete(&self, id: u64) -> Result<(), ApiError> {
        RecordApi::<Expense>::delete(&self.expenses, id).await
    }

    async fn upload(&self, path: &Path) -> Result<UploadReport, ApiError> {
        RecordApi::<Expense>::upload(&self.expenses, path).await
    }
}

#[async_trait]
impl RecordApi<Income> for MemoryBackend {
    async fn list(&self, query: &ListQuery) -> Result<Vec<Income>, ApiError> {
        self.incomes.list(query).await
    }

    async fn create(&self, new: &NewIncome) -> Result<Income, ApiError> {
        self.incomes.create(new).await
    }

    async fn delete(&self, id: u64) -> Result<(), ApiError> {
        RecordApi::<Income>::delete(&self.incomes, id).await
    }

    async fn upload(&self, path: &Path) -> Result<UploadReport, ApiError> {
        RecordApi::<Income>::upload(&self.incomes, path).await
    }
}
