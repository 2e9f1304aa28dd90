use crate::Config;
use crate::tui::widgets::color::parse_color;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};

/// One-line summary strip above the status bar, e.g. project counts on
/// the dashboard or progress and due figures inside a project.
pub fn render_summary(f: &mut Frame, area: Rect, summary: &str, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);

    let paragraph = Paragraph::new(summary.to_string())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .style(Style::default().fg(fg_color).bg(bg_color)),
        )
        .style(Style::default().fg(fg_color).bg(bg_color));

    f.render_widget(paragraph, area);
}
