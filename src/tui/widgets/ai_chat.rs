use crate::Config;
use crate::models::AiExchange;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::editor::Editor;
use crate::tui::widgets::markdown::render_markdown_panel;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout as RatLayout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

/// The Assistant tab: the last exchange above, the question input below.
/// Returns the clamped response scroll offset.
pub fn render_ai_chat(
    f: &mut Frame,
    area: Rect,
    exchange: Option<&AiExchange>,
    input: &Editor,
    input_active: bool,
    scroll: usize,
    config: &Config,
) -> usize {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);

    let chunks = RatLayout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(5)])
        .split(area);

    let scroll = match exchange {
        Some(exchange) => {
            let content = format!(
                "**You:** {}\n\n---\n\n{}",
                exchange.user_message, exchange.ai_response
            );
            render_markdown_panel(f, chunks[0], "Assistant", &content, scroll, config)
        }
        None => {
            let lines = vec![
                Line::from(Span::styled(
                    "Ask about store guidelines, rejection risks or submission",
                    Style::default().fg(fg_color),
                )),
                Line::from(Span::styled(
                    "steps for this project. Press Enter to start typing.",
                    Style::default().fg(fg_color),
                )),
            ];
            let paragraph = Paragraph::new(lines)
                .block(Block::default().borders(Borders::ALL).title("Assistant"))
                .style(Style::default().fg(fg_color).bg(bg_color));
            f.render_widget(paragraph, chunks[0]);
            0
        }
    };

    let border_style = if input_active {
        Style::default().fg(highlight_bg)
    } else {
        Style::default().fg(fg_color)
    };
    let title = if input_active {
        "Question (Enter: send, Esc: cancel)"
    } else {
        "Question"
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style)
        .style(Style::default().fg(fg_color).bg(bg_color));

    let input_area = chunks[1];
    let viewport_height = input_area.height.saturating_sub(2) as usize;
    let (_, visible) = input.get_visible_lines(viewport_height, input_area.width as usize);
    let lines: Vec<Line> = visible
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(fg_color))))
        .collect();
    let paragraph = Paragraph::new(lines).block(block);
    f.render_widget(paragraph, input_area);

    if input_active
        && let Some((x, y)) = input.get_cursor_screen_pos(input_area, viewport_height)
    {
        f.set_cursor_position((x, y));
    }

    // Copy hint under the response when one is showing
    if exchange.is_some() && chunks[0].height > 1 {
        let hint_area = Rect::new(
            chunks[0].x + 2,
            chunks[0].y + chunks[0].height - 1,
            chunks[0].width.saturating_sub(4),
            1,
        );
        let hint = Paragraph::new(Span::styled(
            " y: copy response ",
            Style::default().fg(fg_color).add_modifier(Modifier::DIM),
        ));
        f.render_widget(hint, hint_area);
    }

    scroll
}
