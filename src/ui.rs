use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use finance_tracker::app::{App, Page, Status};
use finance_tracker::entities::Record;
use finance_tracker::forms::{ExpenseForm, IncomeForm};
use finance_tracker::validation::Field;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.map_err(Into::into)
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        let key = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => key,
            _ => continue,
        };

        // Global keys
        match key.code {
            KeyCode::Esc => return Ok(()),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(()),
            KeyCode::Tab => {
                app.next_page();
                continue;
            }
            KeyCode::BackTab => {
                app.previous_page();
                continue;
            }
            _ => {}
        }

        match app.current_page {
            Page::Dashboard => match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Delete | KeyCode::Char('d') => app.delete_selected(),
                KeyCode::Char('r') => {
                    if let Err(err) = app.refresh() {
                        app.status = Some(Status::Error(format!("Could not refresh: {:#}", err)));
                    }
                }
                _ => {}
            },
            Page::Income => match key.code {
                KeyCode::Enter => app.submit(),
                KeyCode::Down => app.income_form.next_field(),
                KeyCode::Up => app.income_form.previous_field(),
                KeyCode::Backspace => app.income_form.backspace(),
                KeyCode::Char(c) => app.income_form.input(c),
                _ => {}
            },
            Page::Expenses => match key.code {
                KeyCode::Enter => app.submit(),
                KeyCode::Down => app.expense_form.next_field(),
                KeyCode::Up => app.expense_form.previous_field(),
                KeyCode::Right if app.expense_form.focus == Field::Category => {
                    app.expense_form.next_category()
                }
                KeyCode::Left if app.expense_form.focus == Field::Category => {
                    app.expense_form.previous_category()
                }
                KeyCode::Backspace => app.expense_form.backspace(),
                KeyCode::Char(c) => app.expense_form.input(c),
                _ => {}
            },
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Dashboard => render_dashboard(f, chunks[1], app),
        Page::Income => render_income_form(f, chunks[1], app),
        Page::Expenses => render_expense_form(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn money_color(amount: f64) -> Color {
    if amount < 0.0 {
        Color::Red
    } else {
        Color::Green
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![];
    for (i, page) in Page::ALL.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Balance: {:.2}", app.totals.balance),
        Style::default().fg(money_color(app.totals.balance)),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_dashboard(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(0)])
        .split(area);

    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let summary = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Total Income:   ", label),
            Span::styled(format!("{:>12.2}", app.totals.income), Style::default().fg(Color::Green)),
        ]),
        Line::from(vec![
            Span::styled("  Total Expenses: ", label),
            Span::styled(format!("{:>12.2}", app.totals.expenses), Style::default().fg(Color::Red)),
        ]),
        Line::from(vec![
            Span::styled("  Balance:        ", label),
            Span::styled(
                format!("{:>12.2}", app.totals.balance),
                Style::default()
                    .fg(money_color(app.totals.balance))
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    let summary = Paragraph::new(summary).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Summary "),
    );
    f.render_widget(summary, chunks[0]);

    render_recent_table(f, chunks[1], app);
}

fn render_recent_table(f: &mut Frame, area: Rect, app: &App) {
    let header_cells = ["ID", "Date", "Type", "Source / Category", "Amount"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.recent.iter().map(|record| {
        let (kind, color, date) = match record {
            Record::Income(r) => ("Income", Color::Green, r.display_date()),
            Record::Expense(r) => ("Expense", Color::Red, r.display_date()),
        };

        let cells = vec![
            Cell::from(record.id().to_string()),
            Cell::from(date),
            Cell::from(kind).style(Style::default().fg(color)),
            Cell::from(truncate(record.label(), 30)),
            Cell::from(format!("{:.2}", record.amount())).style(Style::default().fg(color)),
        ];

        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Length(32),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(format!(" Recent Transactions (last {} per table) ", app.recent_limit)),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    let mut state = TableState::default();
    state.select(app.selected);
    f.render_stateful_widget(table, area, &mut state);
}

fn field_line<'a>(name: &'a str, value: &'a str, focused: bool, invalid: bool) -> Line<'a> {
    let label_style = if invalid {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    };

    let mut spans = vec![
        Span::raw(if focused { "→ " } else { "  " }),
        Span::styled(format!("{:<22}", name), label_style),
        Span::raw(value),
    ];
    if focused {
        spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
    }

    Line::from(spans)
}

fn render_income_form(f: &mut Frame, area: Rect, app: &App) {
    let form = &app.income_form;

    let mut content = vec![Line::from("")];
    for field in IncomeForm::FIELDS {
        content.push(field_line(
            field_label(field),
            form.value(field),
            form.focus == field,
            form.has_error(field),
        ));
        content.push(Line::from(""));
    }
    content.push(hint_line("Enter to add income"));

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Add Income "),
    );

    f.render_widget(paragraph, area);
}

fn render_expense_form(f: &mut Frame, area: Rect, app: &App) {
    let form = &app.expense_form;

    let category = format!("◀ {} ▶", form.category);

    let mut content = vec![Line::from("")];
    for field in ExpenseForm::FIELDS {
        let value = match field {
            Field::Category => category.as_str(),
            _ => form.value(field),
        };
        content.push(field_line(
            field_label(field),
            value,
            form.focus == field,
            form.has_error(field),
        ));
        content.push(Line::from(""));
    }
    content.push(hint_line("←/→ pick category, Enter to add expense"));

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Add Expense "),
    );

    f.render_widget(paragraph, area);
}

fn field_label(field: Field) -> &'static str {
    match field {
        Field::Source => "Source:",
        Field::Category => "Category:",
        Field::Amount => "Amount:",
        Field::Date => "Date (MM-DD-YYYY):",
    }
}

fn hint_line(text: &str) -> Line<'_> {
    Line::from(vec![
        Span::styled(
            "  Hint: ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        ),
        Span::styled(
            text,
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ),
    ])
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![];

    if let Some(status) = &app.status {
        let color = if status.is_error() { Color::Red } else { Color::Green };
        status_spans.push(Span::styled(format!(" {} ", status.text()), Style::default().fg(color)));
        status_spans.push(Span::raw(" | "));
    }

    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Page | "));
    status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));

    match app.current_page {
        Page::Dashboard => {
            status_spans.push(Span::raw(" Nav | "));
            status_spans.push(Span::styled("d", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Delete | "));
            status_spans.push(Span::styled("r", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Refresh | "));
            status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
            status_spans.push(Span::raw(" Quit"));
        }
        Page::Income | Page::Expenses => {
            status_spans.push(Span::raw(" Field | "));
            status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Save | "));
            status_spans.push(Span::styled("Esc", Style::default().fg(Color::Red)));
            status_spans.push(Span::raw(" Quit"));
        }
    }

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}
