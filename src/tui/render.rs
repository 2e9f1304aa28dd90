use crate::progress::{DueStatus, classify_due_date, overall_progress, phase_progress};
use crate::tui::app::{Mode, Tab, View};
use crate::tui::widgets::{
    ai_chat::render_ai_chat,
    checklist::render_checklist,
    color::parse_color,
    confirm_delete::{popup_area, render_confirm_delete},
    form::render_form,
    help::render_help,
    markdown::render_markdown_panel,
    overview::render_overview,
    project_list::render_project_list,
    rejection_list::render_rejections,
    status_bar::render_status_bar,
    summary::render_summary,
    tabs::render_tabs,
    task_board::render_task_board,
};
use crate::tui::{App, Layout};
use crate::utils::{format_key_binding_for_display, today};
use ratatui::Frame;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    let active_theme = app.config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);

    // Outer border with the app name centered in the top edge
    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("shipcheck")
        .title_alignment(ratatui::layout::Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color));
    f.render_widget(outer_block, f.area());

    match app.ui.view {
        View::Dashboard => {
            let header = Paragraph::new(Span::styled(
                " Projects ",
                Style::default().fg(fg_color).bg(bg_color),
            ));
            f.render_widget(header, layout.tabs_area);
        }
        View::Project => render_tabs(f, layout.tabs_area, app.ui.active_tab, &app.config),
    }

    // Sidebar: the project list, with the opened project marked
    if !app.ui.sidebar_collapsed && layout.sidebar_area.width > 0 {
        let opened_id = app.store.detail.as_ref().map(|d| d.project.id.clone());
        render_project_list(
            f,
            layout.sidebar_area,
            &app.store.projects,
            app.selection.project,
            opened_id.as_deref(),
            &app.config,
        );
    }

    render_main(f, app, layout);

    // Overlays after normal content
    if app.ui.mode == Mode::Help {
        render_help(f, f.area(), &app.config);
    }
    if app.ui.mode == Mode::Memo {
        render_memo_modal(f, app);
    }
    if app.ui.mode == Mode::Confirm
        && let Some(action) = app.modal.confirm.clone()
    {
        render_confirm_delete(f, f.area(), &action, app.modal.confirm_selected, &app.config);
    }

    let summary = build_summary(app);
    render_summary(f, layout.summary_area, &summary, &app.config);

    let key_hints = get_key_hints(app);
    render_status_bar(
        f,
        layout.status_area,
        app.status.message.as_ref(),
        &key_hints,
        &app.config,
    );
}

fn render_main(f: &mut Frame, app: &mut App, layout: &Layout) {
    let active_theme = app.config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);

    // A form takes over the whole main pane
    if app.ui.mode == Mode::Form {
        if let Some(form) = app.modal.form.clone() {
            render_form(f, layout.main_area, &form, &app.config);
            return;
        }
    }

    match app.ui.view {
        View::Dashboard => match app.selected_project().cloned() {
            Some(project) => {
                let mut content = format!(
                    "**Platform:** {}\n**Status:** {}\n",
                    project.platform,
                    project.status.label()
                );
                if let Some(publish) = project.publish_date {
                    content.push_str(&format!(
                        "**Publish:** {}\n",
                        publish.date_naive().format("%Y-%m-%d")
                    ));
                }
                if let Some(description) = project.description.as_deref()
                    && !description.is_empty()
                {
                    content.push_str(&format!("\n{}\n", description));
                }
                content.push_str("\nPress Enter to open this project.");
                render_markdown_panel(f, layout.main_area, &project.name, &content, 0, &app.config);
            }
            None => {
                let paragraph = Paragraph::new("No projects yet. Press 'n' to create one.")
                    .block(Block::default().borders(Borders::ALL).title("Projects"))
                    .style(Style::default().fg(fg_color));
                f.render_widget(paragraph, layout.main_area);
            }
        },
        View::Project => {
            let Some(detail) = app.store.detail.clone() else {
                return;
            };
            match app.ui.active_tab {
                Tab::Overview => {
                    let overall = overall_progress(&detail.tasks_by_phase);
                    let phases = phase_progress(&detail.tasks_by_phase);
                    render_overview(
                        f,
                        layout.main_area,
                        &detail.project,
                        &overall,
                        &phases,
                        today(),
                        &app.config,
                    );
                }
                Tab::Tasks => {
                    let rows = app.task_board_rows();
                    render_task_board(
                        f,
                        layout.main_area,
                        &detail.tasks_by_phase,
                        &rows,
                        app.selection.task,
                        today(),
                        &app.config,
                    );
                }
                Tab::Checklist => {
                    let groups = app.checklist_groups();
                    let rows = crate::tui::app::checklist_rows(&groups);
                    render_checklist(
                        f,
                        layout.main_area,
                        &groups,
                        &rows,
                        app.selection.checklist,
                        &app.config,
                    );
                }
                Tab::Rejections => {
                    app.rejection_view.scroll = render_rejections(
                        f,
                        layout.main_area,
                        &detail.rejections,
                        app.selection.rejection,
                        app.rejection_view.analysis.as_ref(),
                        app.rejection_view.scroll as usize,
                        &app.config,
                    ) as u16;
                }
                Tab::Assistant => {
                    app.chat.scroll = render_ai_chat(
                        f,
                        layout.main_area,
                        detail.last_exchange.as_ref(),
                        &app.chat.input,
                        app.ui.mode == Mode::Chat,
                        app.chat.scroll as usize,
                        &app.config,
                    ) as u16;
                }
            }
        }
    }
}

fn render_memo_modal(f: &mut Frame, app: &App) {
    let Some(memo) = app.modal.memo.as_ref() else {
        return;
    };
    let active_theme = app.config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);

    let area = popup_area(f.area(), 60, 50);
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Memo: {}", memo.task_title))
        .style(Style::default().fg(fg_color).bg(bg_color));

    let viewport_height = area.height.saturating_sub(2) as usize;
    let (_, visible) = memo
        .editor
        .get_visible_lines(viewport_height, area.width as usize);
    let lines: Vec<Line> = visible
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(fg_color))))
        .collect();
    let paragraph = Paragraph::new(lines).block(block);
    f.render_widget(paragraph, area);

    if let Some((x, y)) = memo.editor.get_cursor_screen_pos(area, viewport_height) {
        f.set_cursor_position((x, y));
    }
}

fn build_summary(app: &App) -> String {
    match app.ui.view {
        View::Dashboard => {
            let total = app.store.projects.len();
            let active = app
                .store
                .projects
                .iter()
                .filter(|p| p.status == crate::models::ProjectStatus::Active)
                .count();
            let rejected = app
                .store
                .projects
                .iter()
                .filter(|p| p.status == crate::models::ProjectStatus::Rejected)
                .count();
            format!(
                "{} projects • {} active • {} rejected",
                total, active, rejected
            )
        }
        View::Project => match app.store.detail.as_ref() {
            Some(detail) => {
                let overall = overall_progress(&detail.tasks_by_phase);
                let now = today();
                let overdue = detail
                    .tasks_by_phase
                    .iter()
                    .flat_map(|p| p.tasks.iter())
                    .filter(|t| {
                        !t.completed && classify_due_date(t.due_day(), now) == DueStatus::Overdue
                    })
                    .count();
                let open_rejections = detail
                    .rejections
                    .iter()
                    .filter(|r| r.status != crate::models::RejectionStatus::Resolved)
                    .count();
                format!(
                    "{}/{} tasks done ({}%) • {} overdue • {} open rejections",
                    overall.completed, overall.total, overall.percent, overdue, open_rejections
                )
            }
            None => String::new(),
        },
    }
}

fn get_key_hints(app: &App) -> Vec<String> {
    let keys = &app.config.key_bindings;
    let k = format_key_binding_for_display;
    match app.ui.mode {
        Mode::Help => vec![format!("Esc or {}: Exit help", k(&keys.help))],
        Mode::Form => vec![
            "Tab/Shift+Tab: Fields".to_string(),
            format!("{}: Save", k(&keys.save)),
            "Esc: Cancel".to_string(),
        ],
        Mode::Memo => vec![
            format!("{}: Save memo", k(&keys.save)),
            format!("{}: Undo", k(&keys.undo)),
            "Esc: Cancel".to_string(),
        ],
        Mode::Chat => vec!["Enter: Send".to_string(), "Esc: Cancel".to_string()],
        Mode::Confirm => vec![
            "↑/↓: Choose".to_string(),
            "Enter: Confirm".to_string(),
            "Esc: Cancel".to_string(),
        ],
        Mode::View => {
            let mut hints = vec![format!("{}: Quit", k(&keys.quit))];
            match app.ui.view {
                View::Dashboard => {
                    hints.push(format!("{}: Open", k(&keys.select)));
                    hints.push(format!("{}: New project", k(&keys.new)));
                    hints.push(format!("{}: Edit", k(&keys.edit)));
                    hints.push(format!("{}: Delete", k(&keys.delete)));
                }
                View::Project => {
                    hints.push(format!("{}: Back", k(&keys.back)));
                    hints.push(format!(
                        "{}/{}: Tabs",
                        k(&keys.tab_left),
                        k(&keys.tab_right)
                    ));
                    match app.ui.active_tab {
                        Tab::Overview => {
                            hints.push(format!("{}: Schedule", k(&keys.new)));
                            hints.push(format!("{}: Edit project", k(&keys.edit)));
                        }
                        Tab::Tasks => {
                            hints.push(format!("{}: Toggle done", k(&keys.toggle_complete)));
                            hints.push(format!("{}: Memo", k(&keys.memo)));
                            hints.push(format!("{}: New task", k(&keys.new)));
                            hints.push(format!("{}: Generate", k(&keys.generate_defaults)));
                        }
                        Tab::Checklist => {
                            hints.push(format!("{}: New item", k(&keys.new)));
                            hints.push(format!("{}: Edit", k(&keys.edit)));
                            hints.push("a: Attach file".to_string());
                            hints.push(format!("{}: Generate", k(&keys.generate_defaults)));
                        }
                        Tab::Rejections => {
                            hints.push(format!("{}: Record", k(&keys.new)));
                            hints.push(format!("{}: Update", k(&keys.edit)));
                            hints.push("a: Analyze".to_string());
                        }
                        Tab::Assistant => {
                            hints.push(format!("{}: Ask", k(&keys.select)));
                            hints.push(format!("{}: Copy response", k(&keys.copy)));
                        }
                    }
                }
            }
            hints.push(format!("{}: Refresh", k(&keys.refresh)));
            hints.push(format!("{}: Sidebar", k(&keys.toggle_sidebar)));
            hints.push(format!("{}: Help", k(&keys.help)));
            hints
        }
    }
}
