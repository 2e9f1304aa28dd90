use crate::Config;
use crate::models::Project;
use crate::progress::{PhaseProgress, Progress};
use crate::tui::widgets::color::{parse_color, project_status_color};
use chrono::NaiveDate;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

/// A fixed-width text progress bar, e.g. `[████░░░░░░] 40%`.
fn progress_bar(progress: &Progress, width: usize) -> String {
    let filled = (width * progress.percent as usize) / 100;
    let mut bar = String::with_capacity(width + 8);
    bar.push('[');
    for i in 0..width {
        bar.push(if i < filled { '█' } else { '░' });
    }
    bar.push(']');
    bar.push_str(&format!(" {:>3}%", progress.percent));
    bar
}

fn format_date(date: Option<chrono::DateTime<chrono::Utc>>) -> String {
    date.map(|d| d.date_naive().format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "—".to_string())
}

/// The Overview tab: project facts, schedule and per-phase progress.
pub fn render_overview(
    f: &mut Frame,
    area: Rect,
    project: &Project,
    overall: &Progress,
    phases: &[PhaseProgress],
    today: NaiveDate,
    config: &Config,
) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let label = Style::default().fg(fg_color).add_modifier(Modifier::BOLD);
    let value = Style::default().fg(fg_color);

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Platform: ", label),
            Span::styled(project.platform.to_string(), value),
            Span::styled("    Status: ", label),
            Span::styled(
                project.status.label(),
                Style::default().fg(project_status_color(project.status)),
            ),
        ]),
        Line::from(vec![
            Span::styled("Start: ", label),
            Span::styled(format_date(project.start_date), value),
            Span::styled("    Publish: ", label),
            Span::styled(format_date(project.publish_date), value),
        ]),
    ];

    if let Some(publish) = project.publish_date {
        let days = (publish.date_naive() - today).num_days();
        let note = if days < 0 {
            format!("{} days past the planned publish date", -days)
        } else {
            format!("{} days until the planned publish date", days)
        };
        lines.push(Line::from(Span::styled(note, value)));
    }

    if let Some(description) = project.description.as_deref()
        && !description.is_empty()
    {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(description.to_string(), value)));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Overall  ", label),
        Span::styled(progress_bar(overall, 20), value),
        Span::styled(
            format!("  {}/{} tasks", overall.completed, overall.total),
            value,
        ),
    ]));

    for phase in phases {
        let name = format!("{:>2}. {:<24}", phase.phase_number, phase.phase_name);
        lines.push(Line::from(vec![
            Span::styled(name, value),
            Span::styled(progress_bar(&phase.progress, 20), value),
            Span::styled(
                format!("  {}/{}", phase.progress.completed, phase.progress.total),
                value,
            ),
        ]));
    }

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(project.name.clone())
                .style(Style::default().fg(fg_color).bg(bg_color)),
        )
        .wrap(ratatui::widgets::Wrap { trim: false });

    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bar_fill_tracks_percent() {
        let p = Progress {
            completed: 2,
            total: 5,
            percent: 40,
        };
        assert_eq!(progress_bar(&p, 10), "[████░░░░░░]  40%");

        let done = Progress {
            completed: 5,
            total: 5,
            percent: 100,
        };
        assert_eq!(progress_bar(&done, 10), "[██████████] 100%");
    }
}
