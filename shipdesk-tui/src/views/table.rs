//! Order table: status tabs, filter bar, rows and the pagination footer.
//!
//! Rendering only reads the controller. Anything the operator asks the table
//! to change comes back out as a `TableIntent` for the app to apply.

use crate::controller::FetchController;
use crate::theme::{status_color, DispatchTheme};
use crate::widgets::{filter_chips, FilterBar, StatusIndicator};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Tabs},
    Frame,
};
use shipdesk_core::{
    CellValue, ColumnSpec, Lifecycle, Record, Resource, RowAction, SchemaRecord, SortDirection,
    SortSpec,
};
use std::iter;

/// A change the operator requested through the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableIntent {
    Sort(SortSpec),
    ToggleRow(String),
    SelectAllVisible,
    GoToPage(u32),
    SetPageSize(u32),
    /// Position of the state in its lifecycle tab order.
    SetStatus(usize),
}

/// Sort requested by activating `column_id`: the active column flips
/// direction, any other sortable column starts ascending.
pub fn sort_intent<R: Resource>(
    schema: &SchemaRecord<R>,
    current: SortSpec,
    column_id: &str,
) -> Option<SortSpec> {
    let column = schema.column(column_id).filter(|column| column.sortable)?;
    if current.column_id == column.id {
        Some(SortSpec::new(column.id, current.direction.toggled()))
    } else {
        Some(SortSpec::new(column.id, SortDirection::Asc))
    }
}

/// The sortable column after `current` among those visible at `width`,
/// wrapping around.
pub fn next_sort_column<R: Resource>(
    schema: &SchemaRecord<R>,
    current: &str,
    width: u16,
) -> Option<&'static str> {
    let sortable: Vec<&'static str> = visible_columns(schema, width)
        .into_iter()
        .filter(|column| column.sortable)
        .map(|column| column.id)
        .collect();
    let next = match sortable.iter().position(|id| *id == current) {
        Some(index) => (index + 1) % sortable.len(),
        None => 0,
    };
    sortable.get(next).copied()
}

pub fn visible_columns<R: Resource>(schema: &SchemaRecord<R>, width: u16) -> Vec<&ColumnSpec<R::Row>> {
    schema
        .columns
        .iter()
        .filter(|column| column.visible_at(width))
        .collect()
}

/// Action buttons for one row, in schema order, skipping those the row does
/// not qualify for.
pub fn action_cells<A: RowAction, Row: Record>(actions: &[A], row: &Row) -> Vec<String> {
    actions
        .iter()
        .filter(|action| action.available_for(row))
        .map(|action| format!("[{}]{}", action.hotkey(), action.label()))
        .collect()
}

pub struct OrderTable<'a, R: Resource> {
    pub controller: &'a FetchController<R>,
    pub theme: &'a DispatchTheme,
    pub focused_filter: Option<&'a str>,
}

impl<'a, R: Resource> OrderTable<'a, R> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(3),
            ])
            .split(area);

        self.render_tabs(f, layout[0]);
        self.render_filters(f, layout[1]);
        self.render_rows(f, layout[2]);
        self.render_footer(f, layout[3]);
    }

    fn render_tabs(&self, f: &mut Frame<'_>, area: Rect) {
        let counts = self.controller.status_counts();
        let titles: Vec<Line> = <R::State as Lifecycle>::ALL
            .iter()
            .map(|state| {
                Line::from(Span::styled(
                    format!("{} ({})", state.label(), counts.get(*state)),
                    Style::default().fg(status_color(state.label(), self.theme)),
                ))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .select(self.controller.state().ordinal())
            .block(Block::default().borders(Borders::ALL).title(R::KIND.title()))
            .highlight_style(
                Style::default()
                    .fg(self.theme.primary)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            )
            .divider("|");
        f.render_widget(tabs, area);
    }

    fn render_filters(&self, f: &mut Frame<'_>, area: Rect) {
        let chips = filter_chips(
            &self.controller.schema().filters,
            self.controller.filters(),
            self.focused_filter,
        );
        let title = if self.controller.search_pending() {
            "Filters (searching…)"
        } else {
            "Filters"
        };
        let bar = FilterBar {
            title,
            chips: &chips,
            active_style: Style::default().fg(self.theme.primary),
            inactive_style: Style::default().fg(self.theme.text_dim),
        };
        bar.render(f, area);
    }

    fn render_rows(&self, f: &mut Frame<'_>, area: Rect) {
        let controller = self.controller;
        let list = controller.list();
        let schema = controller.schema();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border));

        if list.items.is_empty() {
            let (message, color) = match (&list.error, list.loading) {
                (Some(error), _) => (error.clone(), self.theme.error),
                (None, true) => ("Loading…".to_string(), self.theme.text_dim),
                (None, false) => (
                    format!("No {} in {}", R::KIND.title().to_lowercase(), controller.state().label()),
                    self.theme.text_dim,
                ),
            };
            let paragraph = Paragraph::new(message)
                .style(Style::default().fg(color))
                .block(block);
            f.render_widget(paragraph, area);
            return;
        }

        let sort = controller.sort();
        let columns = visible_columns(schema, area.width);

        let header_cells = iter::once(Cell::from(""))
            .chain(columns.iter().map(|column| {
                if column.id == sort.column_id {
                    Cell::from(format!("{} {}", column.header, sort.direction.arrow()))
                } else {
                    Cell::from(column.header)
                }
            }))
            .chain(iter::once(Cell::from("Actions")));
        let header = Row::new(header_cells).style(
            Style::default()
                .fg(self.theme.primary)
                .add_modifier(Modifier::BOLD),
        );

        let rows: Vec<Row> = controller
            .visible_rows()
            .into_iter()
            .map(|row| {
                let check = if controller.is_selected(row.id()) { "[x]" } else { "[ ]" };
                let cells = columns.iter().map(|column| {
                    let value = column.value(row);
                    let style = match &value {
                        CellValue::Status(label) => Style::default().fg(status_color(label, self.theme)),
                        CellValue::Empty => Style::default().fg(self.theme.text_muted),
                        _ => Style::default().fg(self.theme.text),
                    };
                    Cell::from(value.to_string()).style(style)
                });
                let actions = if list.generating_id.as_deref() == Some(row.id()) {
                    Cell::from("Generating AWB…").style(Style::default().fg(self.theme.warning))
                } else {
                    Cell::from(action_cells(&schema.row_actions, row).join(" "))
                        .style(Style::default().fg(self.theme.secondary))
                };
                Row::new(
                    iter::once(Cell::from(check))
                        .chain(cells)
                        .chain(iter::once(actions))
                        .collect::<Vec<_>>(),
                )
            })
            .collect();

        let widths: Vec<Constraint> = iter::once(Constraint::Length(3))
            .chain(
                columns
                    .iter()
                    .map(|column| Constraint::Min(column.min_width.unwrap_or(8))),
            )
            .chain(iter::once(Constraint::Min(12)))
            .collect();

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .highlight_style(Style::default().bg(self.theme.bg_highlight))
            .highlight_symbol("▶ ");

        let mut state = TableState::default();
        state.select(Some(controller.focus()));
        f.render_stateful_widget(table, area, &mut state);
    }

    fn render_footer(&self, f: &mut Frame<'_>, area: Rect) {
        let list = self.controller.list();
        let pagination = list.pagination;
        let mut spans = vec![
            Span::raw(format!(
                "Page {}/{} • rows {}-{} of {} • {}/page",
                pagination.page,
                pagination.total_pages(),
                pagination.first_row(),
                pagination.last_row(list.items.len()),
                pagination.total,
                pagination.page_size,
            )),
        ];
        let selected = self.controller.selected().len();
        if selected > 0 {
            spans.push(Span::styled(
                format!(" • {} selected", selected),
                Style::default().fg(self.theme.primary),
            ));
        }
        if list.loading {
            spans.push(Span::styled(" • Loading…", Style::default().fg(self.theme.text_dim)));
        }
        if let Some(error) = &list.error {
            spans.push(Span::styled(
                format!(" • {}", error),
                Style::default().fg(self.theme.error),
            ));
        }

        let indicator = StatusIndicator {
            title: format!("{} · {}", R::KIND.title(), self.controller.state().label()),
            spans,
            style: Style::default().fg(self.theme.text),
        };
        indicator.render(f, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipdesk_core::{ForwardAction, ForwardOrders, ForwardState};

    #[test]
    fn sort_intent_toggles_the_active_column() {
        let schema = ForwardOrders::schema(ForwardState::Pending);
        let current = schema.default_sort;
        let toggled = sort_intent(schema, current, current.column_id).unwrap();
        assert_eq!(toggled.column_id, current.column_id);
        assert_eq!(toggled.direction, current.direction.toggled());
    }

    #[test]
    fn unknown_column_yields_no_intent() {
        let schema = ForwardOrders::schema(ForwardState::Pending);
        assert_eq!(sort_intent(schema, schema.default_sort, "no_such_column"), None);
    }

    #[test]
    fn generate_awb_hidden_once_awb_exists() {
        let mut order = shipdesk_test_utils::fixtures::forward_order("ORD1", ForwardState::Pending);
        let actions = [ForwardAction::GenerateAwb, ForwardAction::ViewDetails];
        assert_eq!(action_cells(&actions, &order).len(), 2);
        order.awb_number = Some("AWB1".to_string());
        assert_eq!(action_cells(&actions, &order), vec!["[D]Details".to_string()]);
    }
}
