use crate::Config;
use crate::tui::widgets::color::parse_color;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout as RatLayout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarState};
use ratskin::RatSkin;
use std::cmp;
use termimad::minimad::Text as MinimadText;

/// Parse markdown into styled ratatui lines, wrapped to `width` columns.
pub fn markdown_lines(content: &str, width: u16) -> Vec<Line<'static>> {
    let input = MinimadText::from(content);
    RatSkin::default()
        .parse(input, width)
        .into_iter()
        .map(|line| {
            let spans: Vec<Span> = line
                .spans
                .into_iter()
                .map(|span| Span::styled(span.content.to_string(), span.style))
                .collect();
            Line::from(spans)
        })
        .collect()
}

/// Render markdown content in a bordered, scrollable panel. Returns the
/// clamped scroll offset so callers can keep their state in range.
pub fn render_markdown_panel(
    f: &mut Frame,
    area: Rect,
    title: &str,
    content: &str,
    scroll_offset: usize,
    config: &Config,
) -> usize {
    if area.width < 2 || area.height < 2 {
        return 0;
    }

    // Content on the left, a one-column scrollbar gutter on the right
    let horizontal = RatLayout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    let content_area = horizontal[0];
    let scrollbar_area = horizontal[1];

    let viewport_height = (area.height - 2) as usize;
    let text_width = content_area.width.saturating_sub(2);

    let lines = markdown_lines(content, text_width);
    let total_lines = lines.len();

    let max_scroll = total_lines.saturating_sub(viewport_height);
    let scroll_offset = cmp::min(scroll_offset, max_scroll);

    let end_line = cmp::min(scroll_offset + viewport_height, total_lines);
    let visible_text = if scroll_offset < total_lines {
        Text::from(lines[scroll_offset..end_line].to_vec())
    } else {
        Text::default()
    };

    // trim: false preserves indentation for nested lists
    let base_style = Style::default().fg(parse_color(&config.get_active_theme().fg));
    let paragraph = Paragraph::new(visible_text)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .style(base_style)
        .wrap(ratatui::widgets::Wrap { trim: false });
    f.render_widget(paragraph, content_area);

    if total_lines > viewport_height {
        let content_inner_height = content_area.height.saturating_sub(2);
        let scrollbar_inner_area = Rect::new(
            scrollbar_area.x,
            content_area.y + 1,
            scrollbar_area.width,
            content_inner_height,
        );
        let mut scrollbar_state = ScrollbarState::new(total_lines)
            .viewport_content_length(viewport_height)
            .position(scroll_offset);
        let scrollbar = Scrollbar::default()
            .orientation(ratatui::widgets::ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"))
            .track_symbol(Some("│"))
            .thumb_symbol("█");
        f.render_stateful_widget(scrollbar, scrollbar_inner_area, &mut scrollbar_state);
    }

    scroll_offset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_text_produces_styled_spans() {
        let lines = markdown_lines("plain **bold** text", 40);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].spans.len() > 1);
    }

    #[test]
    fn long_text_wraps_to_width() {
        let lines = markdown_lines(
            "a list of guideline references that should wrap across lines",
            20,
        );
        assert!(lines.len() > 1);
    }
}
