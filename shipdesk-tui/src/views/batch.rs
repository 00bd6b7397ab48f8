//! Batch report panel for the last manifest or bulk upload.

use crate::state::{App, BatchReport};
use crate::theme::batch_color;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use shipdesk_core::BatchRow;

/// One display line per batch row.
pub fn row_line(row: &BatchRow) -> String {
    let mut line = row.id.clone();
    if let Some(awb) = &row.awb_number {
        line.push_str(&format!(" → {}", awb));
    }
    if let Some(courier) = &row.courier {
        line.push_str(&format!(" ({})", courier));
    }
    if let Some(error) = &row.error {
        line.push_str(&format!(": {}", error));
    }
    line
}

pub fn render(f: &mut Frame<'_>, app: &App, report: &BatchReport, area: Rect) {
    let summary = &report.outcome.summary;
    let title = format!(
        "{} · {} · {} ok / {} failed of {} (Esc to dismiss)",
        report.resource, report.operation, summary.successful, summary.failed, summary.total
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(batch_color(summary.failed, &app.theme)));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    let succeeded: Vec<Line> = report
        .outcome
        .successful
        .iter()
        .map(|row| Line::from(row_line(row)))
        .collect();
    let failed: Vec<Line> = report
        .outcome
        .failed
        .iter()
        .map(|row| Line::from(row_line(row)))
        .collect();

    f.render_widget(
        Paragraph::new(succeeded)
            .style(Style::default().fg(app.theme.success))
            .block(Block::default().title("Succeeded")),
        columns[0],
    );
    f.render_widget(
        Paragraph::new(failed)
            .style(Style::default().fg(app.theme.error))
            .block(Block::default().title("Failed")),
        columns[1],
    );
}
