use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Clear, Dataset, GraphType, List,
        ListItem, Paragraph, Row, Table, Tabs,
    },
};
use rust_decimal::{Decimal, prelude::ToPrimitive};

use super::app::{App, InputMode, PathAction};
use crate::analytics::{Dashboard, KeyedTotals};
use crate::api::RecordApi;
use crate::forms::{Draft, Form};
use crate::import::ImportReport;
use crate::list::ListView;
use crate::models::{
    Resource,
    category::{category_color, source_color},
    expense::Expense,
    income::Income,
};
use crate::navigation::Route;
use crate::notify::FlashKind;

const INCOME_COLOR: Color = Color::Rgb(0x2e, 0xcc, 0x71);
const EXPENSE_COLOR: Color = Color::Rgb(0xe7, 0x4c, 0x3c);
const NET_COLOR: Color = Color::Rgb(0x9b, 0x59, 0xb6);

pub fn draw<A>(f: &mut Frame, app: &App<A>)
where
    A: RecordApi<Expense> + RecordApi<Income>,
{
    let size = f.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(size);

    render_tabs(f, app.route, chunks[0]);

    match app.route {
        Route::Dashboard => render_dashboard(f, app.dashboard.as_ref(), chunks[1]),
        Route::AddExpense => render_form(
            f,
            "Add New Expense",
            &app.expense_form,
            app.last_import.as_ref(),
            chunks[1],
        ),
        Route::Expenses => render_expense_list(f, &app.expenses, chunks[1]),
        Route::AddIncome => render_form(
            f,
            "Add Income",
            &app.income_form,
            app.last_import.as_ref(),
            chunks[1],
        ),
        Route::Incomes => render_income_list(f, &app.incomes, chunks[1]),
    }

    render_flash(f, app, chunks[2]);
    render_help_panel(f, app.route, chunks[3]);

    let pending = match app.route {
        Route::Expenses => app.expenses.pending_delete().map(|_| Expense::NOUN),
        Route::Incomes => app.incomes.pending_delete().map(|_| Income::NOUN),
        _ => None,
    };
    if let Some(noun) = pending {
        render_confirm(f, noun, size);
    }

    match app.input_mode {
        InputMode::Path(action) => render_path_prompt(f, action, &app.input_text, size),
        InputMode::Date => render_date_prompt(f, &app.input_text, size),
        InputMode::Normal => {}
    }
}

fn render_tabs(f: &mut Frame, route: Route, area: Rect) {
    let titles: Vec<Line> = Route::all()
        .iter()
        .map(|r| Line::from(format!(" {} ", r.title())))
        .collect();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Expense Tracker {} ", route.path())),
        )
        .select(route.index())
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    f.render_widget(tabs, area);
}

fn money(amount: Decimal) -> String {
    format!("${:.2}", amount)
}

fn chart_value(amount: Decimal) -> u64 {
    amount.round().to_u64().unwrap_or(0)
}

pub fn render_dashboard(f: &mut Frame, dashboard: Option<&Dashboard>, area: Rect) {
    let Some(dashboard) = dashboard else {
        let loading = Paragraph::new("Loading analytics...")
            .block(Block::default().title("Financial Analytics").borders(Borders::ALL));
        f.render_widget(loading, area);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Percentage(50),
            Constraint::Min(6),
        ])
        .split(area);

    render_summary_cards(f, dashboard, rows[0]);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);
    render_monthly_bars(f, dashboard, charts[0]);
    render_balance_trend(f, dashboard, charts[1]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 5); 5])
        .split(rows[2]);
    render_breakdown(
        f,
        "Income by Source",
        &dashboard.income_by_source,
        source_color,
        bottom[0],
    );
    render_breakdown(
        f,
        "Expense by Category",
        &dashboard.expense_by_category,
        category_color,
        bottom[1],
    );

    let recent_incomes: Vec<ListItem> =
        dashboard.recent_incomes.iter().map(|i| i.to_list_item()).collect();
    render_record_list(f, "Recent Incomes", recent_incomes, bottom[2]);
    let recent_expenses: Vec<ListItem> =
        dashboard.recent_expenses.iter().map(|e| e.to_list_item()).collect();
    render_record_list(f, "Recent Expenses", recent_expenses, bottom[3]);
    let largest: Vec<ListItem> =
        dashboard.largest_expenses.iter().map(|e| e.to_list_item()).collect();
    render_record_list(f, "Largest Expenses", largest, bottom[4]);
}

fn render_record_list(f: &mut Frame, title: &'static str, items: Vec<ListItem>, area: Rect) {
    let list = List::new(items).block(Block::default().title(title).borders(Borders::ALL));
    f.render_widget(list, area);
}

fn render_summary_cards(f: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let summary = &dashboard.summary;
    let net_color = if summary.net_balance >= Decimal::ZERO { Color::Green } else { Color::Red };

    let cards = [
        ("Total Income", money(summary.total_income), Color::Green),
        ("Total Expense", money(summary.total_expense), Color::Red),
        ("Net Balance", money(summary.net_balance), net_color),
        ("Avg Income / Month", money(summary.average_monthly_income.round_dp(2)), Color::Green),
        ("Avg Expense / Month", money(summary.average_monthly_expense.round_dp(2)), Color::Red),
        ("Top Income Source", summary.top_income_source.clone(), Color::White),
        ("Top Expense Category", summary.top_expense_category.clone(), Color::White),
    ];

    let slots = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, cards.len() as u32); cards.len()])
        .split(area);

    for ((title, value, color), slot) in cards.into_iter().zip(slots.iter()) {
        let card = Paragraph::new(Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(Block::default().title(title).borders(Borders::ALL));
        f.render_widget(card, *slot);
    }
}

fn render_monthly_bars(f: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let mut chart = BarChart::default()
        .block(Block::default().title("Monthly Income vs Expense").borders(Borders::ALL))
        .bar_width(5)
        .bar_gap(1)
        .group_gap(2);

    for point in &dashboard.monthly {
        let bars = [
            Bar::default()
                .value(chart_value(point.income))
                .style(Style::default().fg(INCOME_COLOR)),
            Bar::default()
                .value(chart_value(point.expense))
                .style(Style::default().fg(EXPENSE_COLOR)),
        ];
        chart = chart.data(BarGroup::default().label(Line::from(point.month.clone())).bars(&bars));
    }

    f.render_widget(chart, area);
}

fn render_balance_trend(f: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let points: Vec<(f64, f64)> = dashboard
        .monthly
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.net().to_f64().unwrap_or(0.0)))
        .collect();

    let (min, max) = points
        .iter()
        .fold((0.0_f64, 0.0_f64), |(lo, hi), (_, y)| (lo.min(*y), hi.max(*y)));
    let x_max = points.len().saturating_sub(1).max(1) as f64;

    let x_labels: Vec<Span> = match (dashboard.monthly.first(), dashboard.monthly.last()) {
        (Some(first), Some(last)) => {
            vec![Span::raw(first.month.clone()), Span::raw(last.month.clone())]
        }
        _ => vec![],
    };

    let datasets = vec![
        Dataset::default()
            .name("Net Balance")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(NET_COLOR))
            .data(&points),
    ];

    let chart = Chart::new(datasets)
        .block(Block::default().title("Net Balance Trend").borders(Borders::ALL))
        .x_axis(Axis::default().bounds([0.0, x_max]).labels(x_labels))
        .y_axis(
            Axis::default()
                .bounds([min, max.max(min + 1.0)])
                .labels(vec![Span::raw(format!("{min:.0}")), Span::raw(format!("{max:.0}"))]),
        );

    f.render_widget(chart, area);
}

fn render_breakdown(
    f: &mut Frame,
    title: &str,
    totals: &KeyedTotals,
    color: fn(&str) -> Color,
    area: Rect,
) {
    let grand_total = totals.total();
    let items: Vec<ListItem> = totals
        .entries()
        .iter()
        .map(|(key, amount)| {
            let share = if grand_total.is_zero() {
                Decimal::ZERO
            } else {
                (*amount / grand_total * Decimal::ONE_HUNDRED).round_dp(1)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{key:<14} "), Style::default().fg(color(key))),
                Span::raw(format!("{:>10} ", money(*amount))),
                Span::styled(format!("{share:>5}%"), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let list =
        List::new(items).block(Block::default().title(title.to_string()).borders(Borders::ALL));
    f.render_widget(list, area);
}

fn list_block<R: Resource>(title: &str, view: &ListView<R>) -> Block<'static> {
    let shown = view.visible().len();
    let mut heading = format!(
        "{title} ({} total, {shown} shown) Filter: {}",
        view.records().len(),
        view.filter_label()
    );
    if let Some(date) = view.date_filter() {
        heading.push_str(&format!(" Date: {}", date.format("%Y-%m-%d")));
    }
    Block::default().title(heading).borders(Borders::ALL)
}

fn list_placeholder<R: Resource>(
    f: &mut Frame,
    title: &str,
    view: &ListView<R>,
    area: Rect,
) -> bool {
    let text = if view.is_loading() {
        format!("Loading {}s...", R::NOUN)
    } else if view.visible().is_empty() {
        format!("No {}s found.", R::NOUN)
    } else {
        return false;
    };
    f.render_widget(Paragraph::new(text).block(list_block(title, view)), area);
    true
}

fn highlight(row: Row, selected: bool) -> Row {
    if selected {
        row.style(Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD))
    } else {
        row
    }
}

fn header_row(titles: Vec<&'static str>) -> Row<'static> {
    Row::new(titles).style(Style::default().add_modifier(Modifier::BOLD))
}

pub fn render_expense_list(f: &mut Frame, view: &ListView<Expense>, area: Rect) {
    if list_placeholder(f, "Expense List", view, area) {
        return;
    }

    let selected = view.selected();
    let rows = view
        .visible()
        .into_iter()
        .enumerate()
        .map(|(idx, expense)| highlight(expense.to_row(), Some(idx) == selected));

    let widths = [
        Constraint::Min(20),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(16),
    ];

    let table = Table::new(rows, widths)
        .header(header_row(vec!["Title", "Amount", "Date", "Category"]))
        .block(list_block("Expense List", view));

    f.render_widget(table, area);
}

pub fn render_income_list(f: &mut Frame, view: &ListView<Income>, area: Rect) {
    if list_placeholder(f, "Income List", view, area) {
        return;
    }

    let selected = view.selected();
    let rows = view
        .visible()
        .into_iter()
        .enumerate()
        .map(|(idx, income)| highlight(income.to_row(), Some(idx) == selected));

    let widths = [Constraint::Min(20), Constraint::Length(12), Constraint::Length(12)];

    let table = Table::new(rows, widths)
        .header(header_row(vec!["Source", "Amount", "Date"]))
        .block(list_block("Income List", view));

    f.render_widget(table, area);
}

pub fn render_form<D: Draft>(
    f: &mut Frame,
    title: &str,
    form: &Form<D>,
    last_import: Option<&ImportReport>,
    area: Rect,
) {
    let outer = Block::default().title(title.to_string()).borders(Borders::ALL);
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let mut constraints: Vec<Constraint> =
        form.fields().iter().map(|_| Constraint::Length(4)).collect();
    constraints.push(Constraint::Min(0));
    let slots = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(inner);

    for (field, slot) in form.fields().iter().zip(slots.iter()) {
        let focused = *field == form.focused();
        let value = form.draft().value(*field);
        let shown = match D::options(*field) {
            Some(_) if value.is_empty() => "< Select Category >".to_string(),
            Some(_) => format!("< {value} >"),
            None if focused => format!("{value}_"),
            None => value.to_string(),
        };

        let mut lines = vec![Line::from(shown)];
        if let Some(error) = form.error(*field) {
            lines.push(Line::from(Span::styled(
                error.to_string(),
                Style::default().fg(Color::Red),
            )));
        }

        let border = if focused { Color::Yellow } else { Color::DarkGray };
        let input = Paragraph::new(lines).block(
            Block::default()
                .title(field.label())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        );
        f.render_widget(input, *slot);
    }

    if let (Some(report), Some(slot)) = (last_import, slots.last()) {
        let style = if report.is_complete() {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Red)
        };
        let mut lines = vec![Line::from(format!(
            "Last import: {} of {} rows submitted",
            report.submitted, report.total
        ))];
        if let Some(failure) = &report.failure {
            let text = format!("Row {}: {}", failure.row, failure.reason);
            lines.push(Line::from(Span::styled(text, style)));
        }
        f.render_widget(Paragraph::new(lines), *slot);
    }
}

fn render_flash<A>(f: &mut Frame, app: &App<A>, area: Rect)
where
    A: RecordApi<Expense> + RecordApi<Income>,
{
    let Some(flash) = app.notifier.current() else {
        return;
    };
    let (prefix, color) = match flash.kind {
        FlashKind::Success => ("✅ ", Color::Green),
        FlashKind::Error => ("❌ ", Color::Red),
    };
    let line = Line::from(Span::styled(
        format!("{prefix}{}", flash.text),
        Style::default().fg(color),
    ));
    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

pub fn render_help_panel(f: &mut Frame, route: Route, area: Rect) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
    let mut spans = vec![key("Tab"), Span::raw(" Next view • ")];
    match route {
        Route::Dashboard => {
            spans.extend([key("r"), Span::raw(" Refresh • "), key("q"), Span::raw(" Quit")]);
        }
        Route::AddExpense | Route::AddIncome => {
            spans.extend([
                key("↑/↓"),
                Span::raw(" Field • "),
                key("←/→"),
                Span::raw(" Choose • "),
                key("Enter"),
                Span::raw(" Save • "),
                key("F2"),
                Span::raw(" Import CSV • "),
                key("F3"),
                Span::raw(" Upload file • "),
                key("Ctrl-C"),
                Span::raw(" Quit"),
            ]);
        }
        Route::Expenses | Route::Incomes => {
            spans.extend([
                key("↑/↓"),
                Span::raw(" Move • "),
                key("←/→"),
                Span::raw(" Filter • "),
                key("/"),
                Span::raw(" Date • "),
                key("d"),
                Span::raw(" Delete • "),
                key("r"),
                Span::raw(" Refresh • "),
                key("q"),
                Span::raw(" Quit"),
            ]);
        }
    }

    let help = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Help "),
        )
        .alignment(Alignment::Center);

    f.render_widget(help, area);
}

fn render_confirm(f: &mut Frame, noun: &str, area: Rect) {
    let text = vec![
        Line::from(format!("Are you sure you want to delete this {noun}?")),
        Line::from(""),
        Line::from(vec![
            Span::styled("n", Style::default().fg(Color::Yellow)),
            Span::raw(" Cancel • "),
            Span::styled("y", Style::default().fg(Color::Yellow)),
            Span::raw(" Confirm"),
        ]),
    ];

    let popup = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .title("Confirm")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );

    let popup_area = centered_rect(50, 20, area);
    f.render_widget(Clear, popup_area);
    f.render_widget(popup, popup_area);
}

fn render_path_prompt(f: &mut Frame, action: PathAction, input_text: &str, area: Rect) {
    let title = match action {
        PathAction::Import => "Import from CSV (Enter to import, Esc to cancel)",
        PathAction::Upload => "Upload CSV/XLS/XLSX to server (Enter to send, Esc to cancel)",
    };
    render_input_prompt(f, title, "Path to file...", input_text, area);
}

fn render_date_prompt(f: &mut Frame, input_text: &str, area: Rect) {
    let title = "Show one day (Enter to apply, empty for all, Esc to cancel)";
    render_input_prompt(f, title, "YYYY-MM-DD", input_text, area);
}

fn render_input_prompt(
    f: &mut Frame,
    title: &str,
    placeholder: &str,
    input_text: &str,
    area: Rect,
) {
    let input = Paragraph::new(if input_text.is_empty() {
        Line::from(Span::styled(placeholder.to_string(), Style::default().fg(Color::DarkGray)))
    } else {
        Line::from(input_text.to_string())
    })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(title.to_string())
            .border_style(Style::default().fg(Color::Yellow)),
    );

    let popup_area = centered_rect(60, 10, area);
    f.render_widget(Clear, popup_area);
    f.render_widget(input, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(layout[1])[1]
}
