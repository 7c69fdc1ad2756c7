use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, BarChart, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table,
        Wrap,
    },
    Frame, Terminal,
};
use sales_insights::{
    report::{METHODOLOGY, OBJECTIVES},
    CategoryCount, ChangeStatus, SalesReport, Verdict, FALLBACK_ANSWER,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Trend,
    Gender,
    Dayparts,
    Change,
    Ask,
}

impl Page {
    const ALL: [Page; 5] = [Page::Trend, Page::Gender, Page::Dayparts, Page::Change, Page::Ask];

    pub fn next(&self) -> Self {
        match self {
            Page::Trend => Page::Gender,
            Page::Gender => Page::Dayparts,
            Page::Dayparts => Page::Change,
            Page::Change => Page::Ask,
            Page::Ask => Page::Trend,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Trend => Page::Ask,
            Page::Gender => Page::Trend,
            Page::Dayparts => Page::Gender,
            Page::Change => Page::Dayparts,
            Page::Ask => Page::Change,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Trend => "Daily Trend",
            Page::Gender => "Gender",
            Page::Dayparts => "Dayparts",
            Page::Change => "Change Detection",
            Page::Ask => "Ask",
        }
    }
}

/// Last question submitted on the Ask page
#[derive(Debug, Clone)]
pub struct Exchange {
    pub question: String,
    pub answer: String,
    pub matched: Option<(String, f64)>,
}

pub struct App {
    pub report: SalesReport,
    pub current_page: Page,
    pub input: String,
    pub last_exchange: Option<Exchange>,
}

impl App {
    pub fn new(report: SalesReport) -> Self {
        Self {
            report,
            current_page: Page::Trend,
            input: String::new(),
            last_exchange: None,
        }
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    pub fn submit_question(&mut self) {
        if self.input.trim().is_empty() {
            return;
        }

        // Scored as typed; matching is whitespace-sensitive
        let question = self.input.clone();
        let exchange = match self.report.faq.best_match(&question) {
            Some(m) => Exchange {
                question,
                answer: m.answer.to_string(),
                matched: Some((m.question.to_string(), m.score)),
            },
            None => Exchange {
                question,
                answer: FALLBACK_ANSWER.to_string(),
                matched: None,
            },
        };

        self.last_exchange = Some(exchange);
        self.input.clear();
    }

    /// Apply one key press. Returns true when the app should exit.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Tab => self.next_page(),
            KeyCode::BackTab => self.previous_page(),
            _ if self.current_page == Page::Ask => match key.code {
                KeyCode::Enter => self.submit_question(),
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Char(c) => self.input.push(c),
                _ => {}
            },
            KeyCode::Char('q') => return true,
            KeyCode::Right | KeyCode::Char('l') => self.next_page(),
            KeyCode::Left | KeyCode::Char('h') => self.previous_page(),
            KeyCode::Char('?') => self.current_page = Page::Ask,
            _ => {}
        }
        false
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.on_key(key) {
                return Ok(());
            }
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
        Page::Trend => render_trend(f, chunks[1], app),
        Page::Gender => render_gender(f, chunks[1], app),
        Page::Dayparts => render_dayparts(f, chunks[1], app),
        Page::Change => render_change(f, chunks[1], app),
        Page::Ask => render_ask(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
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
        format!("Sales: {}", app.report.total_transactions),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Days: {}", app.report.daily.len()),
        Style::default().fg(Color::Cyan),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_trend(f: &mut Frame, area: Rect, app: &App) {
    let daily = &app.report.daily;

    if daily.is_empty() {
        render_empty(f, area, " Daily Sales Over Time ");
        return;
    }

    let points: Vec<(f64, f64)> = daily
        .iter()
        .enumerate()
        .map(|(i, d)| (i as f64, d.count as f64))
        .collect();

    let max_count = daily.iter().map(|d| d.count).max().unwrap_or(0) as f64;
    let last = (daily.len() - 1) as f64;

    let mid = &daily[daily.len() / 2];
    let x_labels = vec![
        Span::raw(daily[0].date.to_string()),
        Span::raw(mid.date.to_string()),
        Span::raw(daily[daily.len() - 1].date.to_string()),
    ];
    let y_top = (max_count * 1.1).ceil().max(1.0);
    let y_labels = vec![
        Span::raw("0"),
        Span::raw(format!("{:.0}", y_top / 2.0)),
        Span::raw(format!("{:.0}", y_top)),
    ];

    let datasets = vec![Dataset::default()
        .name("sales_count")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&points)];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Daily Sales Over Time "),
        )
        .x_axis(
            Axis::default()
                .title("sale_date")
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, last.max(1.0)])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title("sales")
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, y_top])
                .labels(y_labels),
        );

    f.render_widget(chart, area);
}

fn category_bars(counts: &[CategoryCount]) -> Vec<(&str, u64)> {
    counts
        .iter()
        .map(|c| (c.label.as_str(), c.count as u64))
        .collect()
}

fn render_gender(f: &mut Frame, area: Rect, app: &App) {
    if app.report.gender.is_empty() {
        render_empty(f, area, " Sales by Gender ");
        return;
    }

    let bars = category_bars(&app.report.gender);

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Sales by Gender "),
        )
        .data(bars.as_slice())
        .bar_width(12)
        .bar_gap(4)
        .bar_style(Style::default().fg(Color::Magenta))
        .value_style(Style::default().fg(Color::Black).bg(Color::Magenta).add_modifier(Modifier::BOLD))
        .label_style(Style::default().fg(Color::Yellow));

    f.render_widget(chart, area);
}

fn render_dayparts(f: &mut Frame, area: Rect, app: &App) {
    if app.report.dayparts.is_empty() {
        render_empty(f, area, " Sales Distribution by Daypart ");
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let bars = category_bars(&app.report.dayparts);
    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Sales by Daypart "),
        )
        .data(bars.as_slice())
        .bar_width(10)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::Green))
        .value_style(Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD))
        .label_style(Style::default().fg(Color::Yellow));
    f.render_widget(chart, columns[0]);

    let total = app.report.total_transactions;
    let header = Row::new(
        ["Daypart", "Sales", "Share", ""]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))),
    )
    .style(Style::default().bg(Color::DarkGray))
    .height(1);

    let rows = app.report.dayparts.iter().map(|entry| {
        let share = entry.share(total);
        let bar = "█".repeat((share / 5.0).round() as usize);
        Row::new(vec![
            Cell::from(entry.label.clone()),
            Cell::from(entry.count.to_string()),
            Cell::from(format!("{:.1}%", share)),
            Cell::from(bar).style(Style::default().fg(Color::Green)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(11),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Min(0),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Share of Sales "),
    );

    f.render_widget(table, columns[1]);
}

fn render_change(f: &mut Frame, area: Rect, app: &App) {
    let label = |s: &'static str| {
        Span::styled(s, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    };

    let mut content = vec![Line::from("")];

    let (banner_color, banner_icon) = match &app.report.change {
        ChangeStatus::Assessed(a) => {
            content.push(Line::from(vec![
                label("  Detected change around: "),
                Span::styled(a.change_date.to_string(), Style::default().fg(Color::Yellow)),
            ]));
            content.push(Line::from(""));
            content.push(Line::from(vec![
                label("  P-value: "),
                Span::raw(
                    a.p_value()
                        .map(|p| format!("{:.5}", p))
                        .unwrap_or_else(|| "n/a".to_string()),
                ),
            ]));
            content.push(Line::from(vec![
                label("  t statistic: "),
                Span::raw(
                    a.statistic()
                        .map(|t| format!("{:.3}", t))
                        .unwrap_or_else(|| "n/a".to_string()),
                ),
            ]));
            content.push(Line::from(""));
            content.push(Line::from(vec![
                label("  Before: "),
                Span::raw(format!(
                    "{} days, {:.1} sales/day",
                    a.before.days, a.before.mean_daily_sales
                )),
            ]));
            content.push(Line::from(vec![
                label("  After:  "),
                Span::raw(format!(
                    "{} days, {:.1} sales/day",
                    a.after.days, a.after.mean_daily_sales
                )),
            ]));

            match a.verdict() {
                Verdict::Significant => (Color::Green, "✅"),
                Verdict::NotSignificant => (Color::Blue, "ℹ️ "),
                Verdict::Indeterminate => (Color::Yellow, "⚠️ "),
            }
        }
        ChangeStatus::InsufficientData { .. } => (Color::Red, "⛔"),
    };

    content.push(Line::from(""));
    content.push(Line::from(vec![Span::styled(
        format!("  {} {}", banner_icon, app.report.change_banner()),
        Style::default().fg(banner_color).add_modifier(Modifier::BOLD),
    )]));
    content.push(Line::from(""));
    content.push(Line::from("  ─────────────────────────────────────"));
    content.push(Line::from(""));
    content.push(Line::from(vec![Span::styled(
        "  OBJECTIVES",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    )]));
    for line in OBJECTIVES.iter().chain(METHODOLOGY.iter()) {
        content.push(Line::from(Span::styled(
            format!("  • {}", line),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let panel = Paragraph::new(content).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(banner_color))
            .title(" Change Detection in Sales "),
    );

    f.render_widget(panel, area);
}

fn render_ask(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Input box
            Constraint::Length(5), // Suggestions
            Constraint::Min(0),    // Answer
        ])
        .split(area);

    let input = Paragraph::new(Line::from(vec![
        Span::raw(app.input.as_str()),
        Span::styled("▏", Style::default().fg(Color::Yellow)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" What do you want to know? "),
    );
    f.render_widget(input, chunks[0]);

    let suggestions: Vec<Line> = app
        .report
        .faq
        .suggestions()
        .iter()
        .map(|s| {
            Line::from(Span::styled(
                format!("  {}", s),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ))
        })
        .collect();
    let hints = Paragraph::new(suggestions).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Try asking "),
    );
    f.render_widget(hints, chunks[1]);

    let content = match &app.last_exchange {
        None => vec![Line::from(Span::styled(
            "  Type a question and press Enter",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))],
        Some(exchange) => {
            let mut lines = vec![
                Line::from(vec![
                    Span::styled("  You: ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                    Span::raw(exchange.question.as_str()),
                ]),
                Line::from(""),
                Line::from(vec![
                    Span::styled("  🤖 ", Style::default().fg(Color::Green)),
                    Span::raw(exchange.answer.as_str()),
                ]),
                Line::from(""),
            ];
            if let Some((question, score)) = &exchange.matched {
                lines.push(Line::from(Span::styled(
                    format!("  matched \"{}\" (similarity {:.2})", question, score),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )));
            }
            lines
        }
    };

    let answer = Paragraph::new(content).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Answer "),
    );
    f.render_widget(answer, chunks[2]);
}

fn render_empty(f: &mut Frame, area: Rect, title: &str) {
    let empty = Paragraph::new("  No sales loaded").block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(title.to_string()),
    );
    f.render_widget(empty, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![Span::styled(
        format!(" {} ", app.current_page.title()),
        Style::default().fg(Color::Cyan),
    )];

    status_spans.push(Span::raw(" | "));
    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Page | "));

    if app.current_page == Page::Ask {
        status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Ask | "));
        status_spans.push(Span::styled("Esc", Style::default().fg(Color::Red)));
        status_spans.push(Span::raw(" Quit"));
    } else {
        status_spans.push(Span::styled("←/→", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Nav | "));
        status_spans.push(Span::styled("?", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Ask | "));
        status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
        status_spans.push(Span::raw(" Quit"));
    }

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use sales_insights::load_from_reader;

    fn app() -> App {
        let data = "sale_time,purchaser_gender\n\
                    2013-01-07 06:14:00,female\n\
                    2013-01-07 13:00:00,male\n\
                    2013-01-08 20:10:00,female\n\
                    2013-01-09 02:45:00,female\n";
        let transactions = load_from_reader(data.as_bytes()).unwrap();
        App::new(SalesReport::build(&transactions))
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.on_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_page_cycle() {
        let mut app = app();
        for _ in 0..Page::ALL.len() {
            press(&mut app, KeyCode::Tab);
        }
        assert_eq!(app.current_page, Page::Trend);

        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.current_page, Page::Ask);
    }

    #[test]
    fn test_typing_on_ask_page_does_not_quit() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.current_page, Page::Ask);

        for c in "what is the p value?".chars() {
            assert!(!press(&mut app, KeyCode::Char(c)));
        }
        press(&mut app, KeyCode::Enter);

        let exchange = app.last_exchange.as_ref().unwrap();
        assert_eq!(exchange.matched.as_ref().unwrap().0, "What is the p-value?");
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_blank_submit_is_ignored() {
        let mut app = app();
        app.current_page = Page::Ask;
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Enter);

        assert!(app.last_exchange.is_none());
    }

    #[test]
    fn test_unmatched_question_uses_fallback() {
        let mut app = app();
        app.current_page = Page::Ask;
        app.input = "asdkjasdkj nonsense query".to_string();
        app.submit_question();

        let exchange = app.last_exchange.as_ref().unwrap();
        assert_eq!(exchange.answer, FALLBACK_ANSWER);
        assert!(exchange.matched.is_none());
    }

    #[test]
    fn test_padded_question_answers_like_report() {
        let mut app = app();
        app.current_page = Page::Ask;
        app.input = "   What  ".to_string();
        app.submit_question();

        let exchange = app.last_exchange.as_ref().unwrap();
        assert_eq!(exchange.question, "   What  ");
        assert_eq!(exchange.answer, app.report.answer("   What  "));
        assert_eq!(exchange.matched.as_ref().unwrap().0, "What is the p-value?");
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        assert!(press(&mut app, KeyCode::Char('q')));
        assert!(press(&mut app, KeyCode::Esc));
    }
}
