use std::path::PathBuf;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::error;

use crate::analytics::{Dashboard, load_dashboard};
use crate::api::{RecordApi, UploadReport};
use crate::forms::{Draft, ExpenseDraft, Form, IncomeDraft, SubmitError};
use crate::import::{ImportReport, Importable, import_file};
use crate::list::ListView;
use crate::models::{Resource, expense::Expense, income::Income, parse_date};
use crate::navigation::Route;
use crate::notify::{FORM_TTL, IMPORT_TTL, Notifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathAction {
    /// Parse the CSV locally and POST rows one by one.
    Import,
    /// Hand the whole file to the server's upload endpoint.
    Upload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Path(PathAction),
    /// Typing the day a list screen is narrowed to.
    Date,
}

enum FormAction {
    None,
    Edited,
    Submit,
    Prompt(PathAction),
}

enum ListAction {
    None,
    Quit,
    Refresh,
    ConfirmDelete,
    PickDate,
}

pub struct App<A> {
    api: A,
    pub route: Route,
    pub dashboard: Option<Dashboard>,
    pub expenses: ListView<Expense>,
    pub incomes: ListView<Income>,
    pub expense_form: Form<ExpenseDraft>,
    pub income_form: Form<IncomeDraft>,
    pub notifier: Notifier,
    pub input_mode: InputMode,
    pub input_text: String,
    pub last_import: Option<ImportReport>,
    pub should_quit: bool,
    refresh_pending: bool,
}

impl<A> App<A>
where
    A: RecordApi<Expense> + RecordApi<Income>,
{
    pub fn new(api: A) -> Self {
        Self {
            api,
            route: Route::Dashboard,
            dashboard: None,
            expenses: ListView::new(),
            incomes: ListView::new(),
            expense_form: Form::new(),
            income_form: Form::new(),
            notifier: Notifier::default(),
            input_mode: InputMode::Normal,
            input_text: String::new(),
            last_import: None,
            should_quit: false,
            refresh_pending: true,
        }
    }

    /// Switches screens. Each screen starts from fresh state and fetches on
    /// the next [`App::process_pending`].
    pub fn go(&mut self, route: Route) {
        self.route = route;
        match route {
            Route::Dashboard => self.dashboard = None,
            Route::Expenses => self.expenses = ListView::new(),
            Route::Incomes => self.incomes = ListView::new(),
            Route::AddExpense => {
                self.expense_form = Form::new();
                self.last_import = None;
            }
            Route::AddIncome => {
                self.income_form = Form::new();
                self.last_import = None;
            }
        }
        self.refresh_pending = true;
    }

    pub async fn navigate(&mut self, route: Route) {
        self.go(route);
        self.process_pending().await;
    }

    /// Runs a fetch requested by navigation or the refresh key.
    pub async fn process_pending(&mut self) {
        if std::mem::take(&mut self.refresh_pending) {
            self.refresh().await;
        }
    }

    pub fn has_pending(&self) -> bool {
        self.refresh_pending
    }

    async fn refresh(&mut self) {
        match self.route {
            Route::Dashboard => self.dashboard = Some(load_dashboard(&self.api, &self.api).await),
            Route::Expenses => self.expenses.load(&self.api).await,
            Route::Incomes => self.incomes.load(&self.api).await,
            Route::AddExpense | Route::AddIncome => {}
        }
    }

    pub fn tick(&mut self) {
        self.notifier.tick(Instant::now());
    }

    pub async fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.input_mode {
            InputMode::Path(action) => return self.handle_path_key(action, key.code).await,
            InputMode::Date => return self.handle_date_key(key.code),
            InputMode::Normal => {}
        }

        match key.code {
            KeyCode::Tab => return self.go(self.route.next()),
            KeyCode::BackTab => return self.go(self.route.previous()),
            _ => {}
        }

        match self.route {
            Route::Dashboard => match key.code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char('r') => self.refresh_pending = true,
                _ => {}
            },
            Route::AddExpense => match form_key(&mut self.expense_form, key.code) {
                FormAction::Submit => {
                    submit_form(&mut self.expense_form, &self.api, &mut self.notifier).await
                }
                FormAction::Edited => self.notifier.clear(),
                FormAction::Prompt(action) => self.prompt(InputMode::Path(action)),
                FormAction::None => {}
            },
            Route::AddIncome => match form_key(&mut self.income_form, key.code) {
                FormAction::Submit => {
                    submit_form(&mut self.income_form, &self.api, &mut self.notifier).await
                }
                FormAction::Edited => self.notifier.clear(),
                FormAction::Prompt(action) => self.prompt(InputMode::Path(action)),
                FormAction::None => {}
            },
            Route::Expenses => match list_key(&mut self.expenses, key.code) {
                ListAction::ConfirmDelete => {
                    confirm_delete(&mut self.expenses, &self.api, &mut self.notifier).await
                }
                ListAction::PickDate => self.prompt(InputMode::Date),
                ListAction::Quit => self.should_quit = true,
                ListAction::Refresh => self.refresh_pending = true,
                ListAction::None => {}
            },
            Route::Incomes => match list_key(&mut self.incomes, key.code) {
                ListAction::ConfirmDelete => {
                    confirm_delete(&mut self.incomes, &self.api, &mut self.notifier).await
                }
                ListAction::PickDate => self.prompt(InputMode::Date),
                ListAction::Quit => self.should_quit = true,
                ListAction::Refresh => self.refresh_pending = true,
                ListAction::None => {}
            },
        }
    }

    fn prompt(&mut self, mode: InputMode) {
        self.input_mode = mode;
        self.input_text.clear();
    }

    /// Date prompt on a list screen. An empty entry clears the date filter.
    fn handle_date_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.input_text.clear();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                self.input_text.pop();
            }
            KeyCode::Char(c) => self.input_text.push(c),
            KeyCode::Enter => {
                let text = std::mem::take(&mut self.input_text);
                self.input_mode = InputMode::Normal;
                let date = match text.trim() {
                    "" => None,
                    raw => match parse_date(raw) {
                        Some(date) => Some(date),
                        None => {
                            self.notifier.error("Date must be in YYYY-MM-DD format", FORM_TTL);
                            return;
                        }
                    },
                };
                match self.route {
                    Route::Expenses => self.expenses.set_date_filter(date),
                    Route::Incomes => self.incomes.set_date_filter(date),
                    _ => return,
                }
                self.refresh_pending = true;
            }
            _ => {}
        }
    }

    async fn handle_path_key(&mut self, action: PathAction, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.input_text.clear();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                self.input_text.pop();
            }
            KeyCode::Char(c) => self.input_text.push(c),
            KeyCode::Enter => {
                let path = PathBuf::from(self.input_text.trim());
                self.input_text.clear();
                self.input_mode = InputMode::Normal;
                if path.as_os_str().is_empty() {
                    return;
                }
                match (self.route, action) {
                    (Route::AddExpense, PathAction::Import) => self.import::<Expense>(path).await,
                    (Route::AddIncome, PathAction::Import) => self.import::<Income>(path).await,
                    (Route::AddExpense, PathAction::Upload) => self.upload::<Expense>(path).await,
                    (Route::AddIncome, PathAction::Upload) => self.upload::<Income>(path).await,
                    _ => {}
                }
            }
            _ => {}
        }
    }

    async fn import<R>(&mut self, path: PathBuf)
    where
        R: Importable,
        A: RecordApi<R>,
    {
        match import_file::<R, A>(&self.api, &path).await {
            Ok(report) => {
                let message = report.message(R::NOUN);
                if report.is_complete() {
                    self.notifier.success(message, IMPORT_TTL);
                } else {
                    self.notifier.error(message, IMPORT_TTL);
                }
                self.last_import = Some(report);
            }
            Err(err) => {
                error!("bulk import of {} failed: {err:#}", path.display());
                self.notifier.error(format!("Bulk import failed: {err:#}"), IMPORT_TTL);
            }
        }
    }

    async fn upload<R>(&mut self, path: PathBuf)
    where
        R: Resource,
        A: RecordApi<R>,
    {
        match <A as RecordApi<R>>::upload(&self.api, &path).await {
            Ok(UploadReport::Added(count)) => {
                self.notifier.success(format!("Uploaded {count} {}s", R::NOUN), IMPORT_TTL)
            }
            Ok(UploadReport::Rejected(errors)) => {
                self.notifier.error(format!("Upload rejected: {}", errors.join("; ")), IMPORT_TTL)
            }
            Err(err) => {
                error!("upload of {} failed: {err}", path.display());
                self.notifier.error(format!("Upload failed: {}", err.user_message()), IMPORT_TTL)
            }
        }
    }
}

fn form_key<D: Draft>(form: &mut Form<D>, code: KeyCode) -> FormAction {
    match code {
        KeyCode::Up => form.focus_previous(),
        KeyCode::Down => form.focus_next(),
        KeyCode::Left => form.cycle_option(false),
        KeyCode::Right => form.cycle_option(true),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(c) => form.input_char(c),
        KeyCode::Enter => return FormAction::Submit,
        KeyCode::F(2) => return FormAction::Prompt(PathAction::Import),
        KeyCode::F(3) => return FormAction::Prompt(PathAction::Upload),
        _ => return FormAction::None,
    }
    match code {
        KeyCode::Up | KeyCode::Down => FormAction::None,
        _ => FormAction::Edited,
    }
}

/// Handles a list-screen key. While a delete awaits confirmation only the
/// confirm and cancel keys do anything.
fn list_key<R: Resource>(view: &mut ListView<R>, code: KeyCode) -> ListAction {
    if view.pending_delete().is_some() {
        match code {
            KeyCode::Char('y') | KeyCode::Enter => return ListAction::ConfirmDelete,
            KeyCode::Char('n') | KeyCode::Esc => view.cancel_delete(),
            _ => {}
        }
        return ListAction::None;
    }

    match code {
        KeyCode::Char('q') => return ListAction::Quit,
        KeyCode::Char('r') => return ListAction::Refresh,
        KeyCode::Char('/') => return ListAction::PickDate,
        KeyCode::Up => view.previous(),
        KeyCode::Down => view.next(),
        KeyCode::Left => view.cycle_filter(false),
        KeyCode::Right => view.cycle_filter(true),
        KeyCode::Char('d') | KeyCode::Delete => {
            view.request_delete_selected();
        }
        _ => {}
    }
    ListAction::None
}

async fn submit_form<D, A>(form: &mut Form<D>, api: &A, notifier: &mut Notifier)
where
    D: Draft,
    A: RecordApi<D::Record>,
{
    let noun = <D::Record as Resource>::NOUN;
    match form.submit(api).await {
        Ok(_) => notifier.success(format!("{} added successfully!", capitalize(noun)), FORM_TTL),
        Err(SubmitError::Invalid) => notifier.clear(),
        Err(SubmitError::Api(err)) => notifier.error(
            format!("Failed to add {noun}: {}", err.user_message()),
            FORM_TTL,
        ),
    }
}

async fn confirm_delete<R, A>(view: &mut ListView<R>, api: &A, notifier: &mut Notifier)
where
    R: Resource,
    A: RecordApi<R>,
{
    match view.confirm_delete(api).await {
        Ok(true) => notifier.success(format!("{} deleted.", capitalize(R::NOUN)), FORM_TTL),
        Ok(false) => {}
        Err(err) => notifier.error(
            format!("Failed to delete {}: {}", R::NOUN, err.user_message()),
            FORM_TTL,
        ),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
