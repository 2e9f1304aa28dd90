use crate::Config;
use crate::models::PhaseTasks;
use crate::progress::{classify_due_date, compute_progress};
use crate::tui::app::TaskRow;
use crate::tui::widgets::color::{
    due_status_color, get_contrast_text_color, parse_color, priority_color,
};
use chrono::NaiveDate;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

/// The Tasks tab: tasks grouped under phase headings. Heading rows show
/// the phase aggregate; task rows show completion, priority and the
/// due-date badge.
pub fn render_task_board(
    f: &mut Frame,
    area: Rect,
    phases: &[PhaseTasks],
    rows: &[TaskRow],
    selected: usize,
    today: NaiveDate,
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
            TaskRow::Phase(pi) => {
                let phase = &phases[*pi];
                let progress = compute_progress(phase.tasks.iter().map(|t| t.completed));
                let heading = format!(
                    "── Phase {}: {} ({}/{}) ",
                    phase.phase_number, phase.phase_name, progress.completed, progress.total
                );
                ListItem::new(Line::from(Span::styled(
                    heading,
                    Style::default().fg(fg_color).add_modifier(Modifier::BOLD),
                )))
            }
            TaskRow::Task(pi, ti) => {
                let task = &phases[*pi].tasks[*ti];
                let checkbox = if task.completed { "[x] " } else { "[ ] " };
                let title_style = if task.completed {
                    Style::default()
                        .fg(fg_color)
                        .add_modifier(Modifier::CROSSED_OUT | Modifier::DIM)
                } else {
                    Style::default().fg(fg_color)
                };
                let mut spans = vec![
                    Span::styled("  ", Style::default()),
                    Span::styled(checkbox, Style::default().fg(fg_color)),
                    Span::styled(task.title.clone(), title_style),
                    Span::styled(
                        format!(" !{}", task.priority.label()),
                        Style::default().fg(priority_color(task.priority)),
                    ),
                ];
                if !task.completed {
                    let due = classify_due_date(task.due_day(), today);
                    if let Some(badge) = due.badge() {
                        spans.push(Span::styled(
                            format!(" {}", badge),
                            Style::default().fg(due_status_color(due)),
                        ));
                    }
                }
                if task.memo.as_deref().is_some_and(|m| !m.is_empty()) {
                    spans.push(Span::styled(
                        " [memo]",
                        Style::default().fg(fg_color).add_modifier(Modifier::DIM),
                    ));
                }
                ListItem::new(Line::from(spans))
            }
        })
        .collect();

    let empty = rows.is_empty();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Tasks")
                .style(Style::default().fg(fg_color).bg(bg_color)),
        )
        .highlight_style(
            Style::default()
                .fg(highlight_fg)
                .bg(highlight_bg)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if !empty {
        state.select(Some(selected.min(rows.len() - 1)));
    }
    f.render_stateful_widget(list, area, &mut state);

    if empty {
        let hint = ratatui::widgets::Paragraph::new(
            "No tasks yet. Press 'n' to add one or 'g' to generate the defaults.",
        )
        .style(Style::default().fg(fg_color).bg(bg_color));
        let inner = Rect::new(
            area.x + 2,
            area.y + 2,
            area.width.saturating_sub(4),
            1.min(area.height.saturating_sub(3)),
        );
        f.render_widget(hint, inner);
    }
}
