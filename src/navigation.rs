/// Screens of the app, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    AddExpense,
    Expenses,
    AddIncome,
    Incomes,
}

impl Route {
    pub fn all() -> [Route; 5] {
        [
            Route::Dashboard,
            Route::AddExpense,
            Route::Expenses,
            Route::AddIncome,
            Route::Incomes,
        ]
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Dashboard => "/",
            Route::AddExpense => "/add-expense",
            Route::Expenses => "/expenses",
            Route::AddIncome => "/add-income",
            Route::Incomes => "/incomes",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Dashboard => "Dashboard",
            Route::AddExpense => "Add Expense",
            Route::Expenses => "Expense List",
            Route::AddIncome => "Add Income",
            Route::Incomes => "Income List",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn next(&self) -> Route {
        Route::all()[(self.index() + 1) % 5]
    }

    pub fn previous(&self) -> Route {
        Route::all()[(self.index() + 4) % 5]
    }
}
