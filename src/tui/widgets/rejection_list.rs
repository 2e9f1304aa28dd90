use crate::Config;
use crate::models::{AiAnalysisResponse, Rejection};
use crate::tui::widgets::color::{get_contrast_text_color, parse_color, rejection_status_color};
use crate::tui::widgets::markdown::render_markdown_panel;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout as RatLayout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

/// Markdown body for the detail pane: the stored rejection plus any
/// on-demand analysis fetched for it.
fn detail_content(rejection: &Rejection, analysis: Option<&AiAnalysisResponse>) -> String {
    let mut content = format!(
        "**Platform:** {}\n**Status:** {}\n",
        rejection.platform,
        rejection.status.label()
    );
    if let Some(date) = rejection.rejection_date {
        content.push_str(&format!(
            "**Date:** {}\n",
            date.date_naive().format("%Y-%m-%d")
        ));
    }
    content.push_str(&format!("\n**Reason:**\n\n{}\n", rejection.reason));
    if let Some(plan) = rejection.action_plan.as_deref()
        && !plan.is_empty()
    {
        content.push_str(&format!("\n**Action plan:**\n\n{}\n", plan));
    }
    if let Some(stored) = rejection.ai_analysis.as_deref()
        && !stored.is_empty()
    {
        content.push_str(&format!("\n**Analysis:**\n\n{}\n", stored));
    }
    if let Some(analysis) = analysis {
        content.push_str(&format!("\n**Fresh analysis:**\n\n{}\n", analysis.analysis));
    }
    content
}

/// The Rejections tab: incident list on top, detail pane below. Returns
/// the clamped detail scroll offset.
pub fn render_rejections(
    f: &mut Frame,
    area: Rect,
    rejections: &[Rejection],
    selected: usize,
    analysis: Option<&AiAnalysisResponse>,
    scroll: usize,
    config: &Config,
) -> usize {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = get_contrast_text_color(highlight_bg);

    let chunks = RatLayout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(3)])
        .split(area);

    let items: Vec<ListItem> = rejections
        .iter()
        .map(|rejection| {
            let date = rejection
                .rejection_date
                .map(|d| d.date_naive().format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "          ".to_string());
            let reason_line = rejection.reason.lines().next().unwrap_or("");
            ListItem::new(Line::from(vec![
                Span::styled(format!("{}  ", date), Style::default().fg(fg_color)),
                Span::styled(
                    format!("[{}] ", rejection.status.label()),
                    Style::default().fg(rejection_status_color(rejection.status)),
                ),
                Span::styled(
                    format!("{}: ", rejection.platform),
                    Style::default().fg(fg_color).add_modifier(Modifier::DIM),
                ),
                Span::styled(reason_line.to_string(), Style::default().fg(fg_color)),
            ]))
        })
        .collect();

    let title = format!("Rejections ({})", rejections.len());
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
    if !rejections.is_empty() {
        state.select(Some(selected.min(rejections.len() - 1)));
    }
    f.render_stateful_widget(list, chunks[0], &mut state);

    match rejections.get(selected) {
        Some(rejection) => {
            let content = detail_content(rejection, analysis);
            render_markdown_panel(f, chunks[1], "Detail", &content, scroll, config)
        }
        None => {
            let hint = ratatui::widgets::Paragraph::new(
                "No rejections recorded. Press 'n' to record one.",
            )
            .block(Block::default().borders(Borders::ALL).title("Detail"))
            .style(Style::default().fg(fg_color).bg(bg_color));
            f.render_widget(hint, chunks[1]);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Platform, RejectionStatus};

    #[test]
    fn detail_includes_plan_and_stored_analysis() {
        let rejection = Rejection {
            id: "r1".to_string(),
            project_id: "p1".to_string(),
            platform: Platform::Ios,
            reason: "Guideline 2.1 crash on launch".to_string(),
            rejection_date: None,
            status: RejectionStatus::Open,
            ai_analysis: Some("Crash points to a missing entitlement".to_string()),
            action_plan: Some("Fix entitlements and resubmit".to_string()),
            created_at: None,
        };
        let content = detail_content(&rejection, None);
        assert!(content.contains("Guideline 2.1"));
        assert!(content.contains("**Action plan:**"));
        assert!(content.contains("missing entitlement"));
        assert!(!content.contains("**Fresh analysis:**"));
    }
}
