use crate::Config;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::confirm_delete::popup_area;
use crate::utils::format_key_binding_for_display;
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

pub fn render_help(f: &mut Frame, area: Rect, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);

    let popup_area = popup_area(area, 60, 70);
    f.render_widget(Clear, popup_area);

    let paragraph = Paragraph::new(build_help_text(config))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help - Key Bindings")
                .title_alignment(Alignment::Center)
                .style(Style::default().fg(fg_color).bg(bg_color)),
        )
        .style(Style::default().fg(fg_color).bg(bg_color))
        .wrap(ratatui::widgets::Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}

fn build_help_text(config: &Config) -> String {
    let keys = &config.key_bindings;
    let k = format_key_binding_for_display;
    let mut text = String::new();

    text.push_str("Navigation:\n");
    text.push_str(&format!(
        "  {} / {}: Switch tabs\n",
        k(&keys.tab_left),
        k(&keys.tab_right)
    ));
    text.push_str(&format!(
        "  {}-{}: Jump to tab\n",
        k(&keys.tab_1),
        k(&keys.tab_5)
    ));
    text.push_str(&format!(
        "  {} / {}: Move selection\n",
        k(&keys.list_up),
        k(&keys.list_down)
    ));
    text.push_str(&format!("  {}: Open project\n", k(&keys.select)));
    text.push_str(&format!("  {}: Back to dashboard\n", k(&keys.back)));
    text.push('\n');

    text.push_str("Actions:\n");
    text.push_str(&format!("  {}: New item for this tab\n", k(&keys.new)));
    text.push_str(&format!("  {}: Edit selection\n", k(&keys.edit)));
    text.push_str(&format!("  {}: Delete selection\n", k(&keys.delete)));
    text.push_str(&format!(
        "  {}: Toggle task done (Tasks tab)\n",
        k(&keys.toggle_complete)
    ));
    text.push_str(&format!("  {}: Edit task memo (Tasks tab)\n", k(&keys.memo)));
    text.push_str(&format!(
        "  {}: Generate defaults (Tasks/Checklist tab)\n",
        k(&keys.generate_defaults)
    ));
    text.push_str("  a: Attach file / analyze rejection\n");
    text.push_str(&format!("  {}: Copy assistant response\n", k(&keys.copy)));
    text.push_str(&format!("  {}: Refresh from backend\n", k(&keys.refresh)));
    text.push('\n');

    text.push_str("Editing:\n");
    text.push_str(&format!("  {}: Save\n", k(&keys.save)));
    text.push_str(&format!("  {}: Undo\n", k(&keys.undo)));
    text.push_str(&format!(
        "  {} / {}: Word navigation\n",
        k(&keys.word_left),
        k(&keys.word_right)
    ));
    text.push_str("  Tab / Shift+Tab: Next / previous field\n");
    text.push_str("  Arrow keys: Move cursor or cycle options\n");
    text.push_str("  Esc: Cancel\n");
    text.push('\n');

    text.push_str("General:\n");
    text.push_str(&format!("  {}: Quit\n", k(&keys.quit)));
    text.push_str(&format!("  {}: Show/hide help\n", k(&keys.help)));
    text.push_str(&format!("  {}: Toggle sidebar\n", k(&keys.toggle_sidebar)));

    text
}
