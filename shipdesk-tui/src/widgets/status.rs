//! Status indicator widget.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// A bordered one-line strip, e.g. the pagination footer under a table.
pub struct StatusIndicator<'a> {
    pub title: String,
    pub spans: Vec<Span<'a>>,
    pub style: Style,
}

impl<'a> StatusIndicator<'a> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let paragraph = Paragraph::new(Line::from(self.spans.clone()))
            .style(self.style)
            .block(
                Block::default()
                    .title(self.title.as_str())
                    .borders(Borders::ALL),
            );
        f.render_widget(paragraph, area);
    }
}
