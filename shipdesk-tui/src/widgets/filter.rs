//! Filter bar widget.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use shipdesk_core::catalog;
use shipdesk_core::{FilterKind, FilterSpec, FilterValues};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChip {
    pub param: String,
    pub text: String,
    pub active: bool,
    pub focused: bool,
}

/// One chip per renderable filter, labelled from the option catalog.
/// Unsupported filter kinds are left out.
pub fn filter_chips(
    filters: &[FilterSpec],
    values: &FilterValues,
    focused_param: Option<&str>,
) -> Vec<FilterChip> {
    filters
        .iter()
        .filter_map(|filter| {
            let value = values.get(&filter.param).filter(|v| !v.trim().is_empty());
            let shown = match &filter.kind {
                FilterKind::Search { placeholder } => match value {
                    Some(v) => v.to_string(),
                    None => placeholder.clone(),
                },
                FilterKind::Date { .. } | FilterKind::Select { .. } => match value {
                    Some(v) => filter
                        .option_source()
                        .and_then(|source| catalog::label_for(source, v))
                        .map(str::to_string)
                        .unwrap_or_else(|| v.to_string()),
                    None => "Any".to_string(),
                },
                FilterKind::Unsupported => return None,
            };
            Some(FilterChip {
                param: filter.param.clone(),
                text: format!("{}: {}", filter.label, shown),
                active: value.is_some(),
                focused: focused_param == Some(filter.param.as_str()),
            })
        })
        .collect()
}

pub struct FilterBar<'a> {
    pub title: &'a str,
    pub chips: &'a [FilterChip],
    pub active_style: Style,
    pub inactive_style: Style,
}

impl<'a> FilterBar<'a> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let spans: Vec<Span> = self
            .chips
            .iter()
            .map(|chip| {
                let mut style = if chip.active {
                    self.active_style
                } else {
                    self.inactive_style
                };
                if chip.focused {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                Span::styled(format!(" {} ", chip.text), style)
            })
            .collect();

        let paragraph = Paragraph::new(Line::from(spans))
            .block(Block::default().title(self.title).borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipdesk_core::{DateMode, OptionSource};

    #[test]
    fn chips_use_catalog_labels() {
        let filters = vec![
            FilterSpec::search("Order ID / AWB"),
            FilterSpec::select("zone", "Zone", OptionSource::Zones),
            FilterSpec::date("order_date", "Order Date", DateMode::Range),
        ];
        let values: FilterValues = [("zone", "B")].into_iter().collect();
        let chips = filter_chips(&filters, &values, Some("order_date"));

        assert_eq!(chips[0].text, "Search: Order ID / AWB");
        assert!(!chips[0].active);
        assert_eq!(chips[1].text, "Zone: Zone B - Within State");
        assert!(chips[1].active);
        assert_eq!(chips[2].text, "Order Date: Any");
        assert!(chips[2].focused);
    }
}
