//! View rendering dispatch.

pub mod batch;
pub mod table;

pub use table::{action_cells, sort_intent, visible_columns, OrderTable, TableIntent};

use crate::controller::FetchController;
use crate::nav::View;
use crate::notifications::NotificationLevel;
use crate::state::{App, InputMode};
use crate::widgets::DetailPanel;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use shipdesk_core::{Resource, RowAction};

pub fn render_view(f: &mut Frame<'_>, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    render_header(f, app, layout[0]);

    let body = match &app.last_batch {
        Some(report) => {
            let split = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(8), Constraint::Length(8)])
                .split(layout[1]);
            batch::render(f, app, report, split[1]);
            split[0]
        }
        None => layout[1],
    };

    match app.active_view {
        View::Orders => render_resource(f, app, &app.orders, body),
        View::Returns => render_resource(f, app, &app.returns, body),
        View::Pickups => render_resource(f, app, &app.pickups, body),
    }

    render_footer(f, app, layout[2]);
}

fn render_resource<R: Resource>(f: &mut Frame<'_>, app: &App, controller: &FetchController<R>, area: Rect) {
    let (table_area, detail_area) = if app.detail_open {
        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(area);
        (split[0], Some(split[1]))
    } else {
        (area, None)
    };

    let table = OrderTable {
        controller,
        theme: &app.theme,
        focused_filter: app.focused_filter_param(),
    };
    table.render(f, table_area);

    if let Some(detail_area) = detail_area {
        let style = Style::default().fg(app.theme.secondary);
        let schema = controller.schema();
        let mut detail = match controller.focused_row() {
            Some(row) => DetailPanel::for_row("Details", &schema.columns, row, style),
            None => DetailPanel {
                title: "Details",
                fields: Vec::new(),
                style,
            },
        };
        if controller.focused_row().is_some() && !schema.row_actions.is_empty() {
            let actions: Vec<String> = schema
                .row_actions
                .iter()
                .map(|action| format!("{} {} [{}]", action.icon(), action.label(), action.hotkey()))
                .collect();
            detail.fields.push(("Actions", actions.join("  ")));
        }
        detail.render(f, detail_area);
    }
}

fn render_header(f: &mut Frame<'_>, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        "SHIPDESK ",
        Style::default()
            .fg(app.theme.primary)
            .add_modifier(Modifier::BOLD),
    )];
    for (index, view) in View::all().iter().enumerate() {
        let style = if *view == app.active_view {
            Style::default()
                .fg(app.theme.bg)
                .bg(app.theme.primary)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text_dim)
        };
        spans.push(Span::styled(format!(" {} {} ", index + 1, view.title()), style));
        spans.push(Span::raw(" "));
    }
    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn render_footer(f: &mut Frame<'_>, app: &App, area: Rect) {
    let help = "1-3 table • [/] state • j/k move • space select • / search • f/v/x filter • s/S sort • n/p page • m manifest • u upload • q quit";
    let (text, style) = match &app.input {
        InputMode::Search(buffer) => (
            format!("Search: {}▏ (Enter/Esc to close)", buffer),
            Style::default().fg(app.theme.primary),
        ),
        InputMode::UploadPath(buffer) => (
            format!("Upload file: {}▏ (Enter to upload, Esc to cancel)", buffer),
            Style::default().fg(app.theme.primary),
        ),
        InputMode::Normal => match app.notifications.last() {
            Some(note) => {
                let color = match note.level {
                    NotificationLevel::Info => app.theme.info,
                    NotificationLevel::Warning => app.theme.warning,
                    NotificationLevel::Error => app.theme.error,
                    NotificationLevel::Success => app.theme.success,
                };
                (
                    format!("{}: {}", note.level.label(), note.message),
                    Style::default().fg(color),
                )
            }
            None => (help.to_string(), Style::default().fg(app.theme.text_dim)),
        },
    };
    let footer = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .style(style);
    f.render_widget(footer, area);
}
