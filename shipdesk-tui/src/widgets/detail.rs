//! Detail panel widget for showing field/value pairs.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use shipdesk_core::ColumnSpec;

pub struct DetailPanel<'a> {
    pub title: &'a str,
    pub fields: Vec<(&'a str, String)>,
    pub style: Style,
}

impl<'a> DetailPanel<'a> {
    /// Every column of the schema, hidden ones included, read through its
    /// accessor.
    pub fn for_row<Row>(title: &'a str, columns: &'a [ColumnSpec<Row>], row: &Row, style: Style) -> Self {
        let fields = columns
            .iter()
            .map(|column| (column.header, column.value(row).to_string()))
            .collect();
        Self { title, fields, style }
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let lines: Vec<Line> = if self.fields.is_empty() {
            vec![Line::from("Nothing focused")]
        } else {
            self.fields
                .iter()
                .map(|(label, value)| {
                    Line::from(vec![
                        Span::styled(format!("{}: ", label), self.style),
                        Span::raw(value.clone()),
                    ])
                })
                .collect()
        };

        let widget = Paragraph::new(Text::from(lines))
            .block(Block::default().title(self.title).borders(Borders::ALL))
            .wrap(Wrap { trim: true });

        f.render_widget(widget, area);
    }
}
