use crate::Config;
use crate::progress::ChecklistGroup;
use crate::tui::app::ChecklistRow;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

/// The Checklist tab: submission items grouped per store platform. A
/// project targeting both stores always shows both groups, even when
/// one is still empty.
pub fn render_checklist(
    f: &mut Frame,
    area: Rect,
    groups: &[ChecklistGroup],
    rows: &[ChecklistRow],
    selected: usize,
    config: &Config,
) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = get_contrast_text_color(highlight_bg);

    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| match row {
            ChecklistRow::Group(gi) => {
                let group = &groups[*gi];
                let heading = format!(
                    "── {} ({}/{}, {}%) ",
                    group.platform,
                    group.progress.completed,
                    group.progress.total,
                    group.progress.percent
                );
                ListItem::new(Line::from(Span::styled(
                    heading,
                    Style::default().fg(fg_color).add_modifier(Modifier::BOLD),
                )))
            }
            ChecklistRow::Item(gi, ii) => {
                let item = &groups[*gi].items[*ii];
                let (mark, mark_color) = if item.is_completed() {
                    ("✓ ", Color::Green)
                } else {
                    ("○ ", Color::Yellow)
                };
                let mut spans = vec![
                    Span::styled("  ", Style::default()),
                    Span::styled(mark, Style::default().fg(mark_color)),
                    Span::styled(
                        format!("{}: ", item.category),
                        Style::default().fg(fg_color).add_modifier(Modifier::DIM),
                    ),
                    Span::styled(item.item_name.clone(), Style::default().fg(fg_color)),
                ];
                if let Some(value) = item.value.as_deref()
                    && !value.is_empty()
                {
                    spans.push(Span::styled(
                        format!(" = {}", value),
                        Style::default().fg(fg_color),
                    ));
                }
                if !item.files.is_empty() {
                    spans.push(Span::styled(
                        format!(" ({} file{})", item.files.len(), plural(item.files.len())),
                        Style::default().fg(Color::Cyan),
                    ));
                }
                if item.notes.as_deref().is_some_and(|n| !n.is_empty()) {
                    spans.push(Span::styled(
                        " [notes]",
                        Style::default().fg(fg_color).add_modifier(Modifier::DIM),
                    ));
                }
                ListItem::new(Line::from(spans))
            }
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Checklist")
                .style(Style::default().fg(fg_color).bg(bg_color)),
        )
        .highlight_style(
            Style::default()
                .fg(highlight_fg)
                .bg(highlight_bg)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if !rows.is_empty() {
        state.select(Some(selected.min(rows.len() - 1)));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}
