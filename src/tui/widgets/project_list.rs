use crate::Config;
use crate::models::Project;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color, project_status_color};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

/// Sidebar list of projects. Each row shows name, platform and a
/// status label in the status accent color.
pub fn render_project_list(
    f: &mut Frame,
    area: Rect,
    projects: &[Project],
    selected: usize,
    opened_id: Option<&str>,
    config: &Config,
) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = get_contrast_text_color(highlight_bg);

    let items: Vec<ListItem> = projects
        .iter()
        .map(|project| {
            let marker = if opened_id == Some(project.id.as_str()) {
                "▸ "
            } else {
                "  "
            };
            let name_style = Style::default().fg(fg_color);
            let status_style = Style::default().fg(project_status_color(project.status));
            ListItem::new(Line::from(vec![
                Span::styled(marker, name_style),
                Span::styled(project.name.clone(), name_style),
                Span::styled(
                    format!(" [{}]", project.platform),
                    Style::default().fg(fg_color).add_modifier(Modifier::DIM),
                ),
                Span::styled(format!(" {}", project.status.label()), status_style),
            ]))
        })
        .collect();

    let title = format!("Projects ({})", projects.len());
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .style(Style::default().fg(fg_color).bg(bg_color)),
        )
        .highlight_style(
            Style::default()
                .fg(highlight_fg)
                .bg(highlight_bg)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if !projects.is_empty() {
        state.select(Some(selected.min(projects.len() - 1)));
    }
    f.render_stateful_widget(list, area, &mut state);
}
