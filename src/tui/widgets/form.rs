use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout as RatLayout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::Config;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::tui::widgets::editor::Editor;
use crate::utils::parse_date;

/// What kind of input a form field accepts. Select fields carry their
/// options and never accept free text, so an invalid enum value cannot
/// be typed in.
#[derive(Debug, Clone)]
pub enum FieldKind {
    Text,
    Multiline,
    /// YYYY-MM-DD, validated on submit
    Date,
    Select(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct Field {
    pub label: &'static str,
    pub kind: FieldKind,
    pub editor: Editor,
    pub selected: usize,
    pub required: bool,
}

impl Field {
    pub fn text(label: &'static str, required: bool) -> Self {
        Self {
            label,
            kind: FieldKind::Text,
            editor: Editor::new(),
            selected: 0,
            required,
        }
    }

    pub fn text_with(label: &'static str, value: &str, required: bool) -> Self {
        Self {
            editor: Editor::from_string(value.to_string()),
            ..Self::text(label, required)
        }
    }

    pub fn multiline(label: &'static str) -> Self {
        Self {
            label,
            kind: FieldKind::Multiline,
            editor: Editor::new(),
            selected: 0,
            required: false,
        }
    }

    pub fn multiline_with(label: &'static str, value: &str) -> Self {
        Self {
            editor: Editor::from_string(value.to_string()),
            ..Self::multiline(label)
        }
    }

    pub fn date(label: &'static str, required: bool) -> Self {
        Self {
            label,
            kind: FieldKind::Date,
            editor: Editor::new(),
            selected: 0,
            required,
        }
    }

    pub fn date_with(label: &'static str, value: &str, required: bool) -> Self {
        Self {
            editor: Editor::from_string(value.to_string()),
            ..Self::date(label, required)
        }
    }

    pub fn select(label: &'static str, options: Vec<String>, selected: usize) -> Self {
        let selected = selected.min(options.len().saturating_sub(1));
        Self {
            label,
            kind: FieldKind::Select(options),
            editor: Editor::new(),
            selected,
            required: false,
        }
    }

    /// The submitted value: trimmed text for editable fields, the
    /// selected option for select fields.
    pub fn value(&self) -> String {
        match &self.kind {
            FieldKind::Select(options) => {
                options.get(self.selected).cloned().unwrap_or_default()
            }
            FieldKind::Multiline => self.editor.text().trim_end().to_string(),
            _ => self.editor.text().trim().to_string(),
        }
    }

    pub fn accepts_text(&self) -> bool {
        !matches!(self.kind, FieldKind::Select(_))
    }
}

/// The operation a submitted form performs. Carrying the target id in
/// the action keeps the form independent of list selection state.
#[derive(Debug, Clone)]
pub enum FormAction {
    CreateProject,
    EditProject { id: String },
    EditSchedule { id: String },
    CreateTask { project_id: String },
    EditTask { id: String },
    CreateChecklistItem { project_id: String },
    EditChecklistItem { id: String },
    AttachFile { item_id: String },
    CreateRejection { project_id: String },
    UpdateRejection { id: String },
}

/// A typed modal form: a titled sequence of fields plus the action to
/// perform on submit.
#[derive(Debug, Clone)]
pub struct Form {
    pub title: String,
    pub action: FormAction,
    pub fields: Vec<Field>,
    pub current: usize,
}

impl Form {
    pub fn new(title: impl Into<String>, action: FormAction, fields: Vec<Field>) -> Self {
        Self {
            title: title.into(),
            action,
            fields,
            current: 0,
        }
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.current = (self.current + 1) % self.fields.len();
        }
    }

    pub fn prev_field(&mut self) {
        if !self.fields.is_empty() {
            self.current = (self.current + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn current_field(&self) -> Option<&Field> {
        self.fields.get(self.current)
    }

    pub fn current_editor_mut(&mut self) -> Option<&mut Editor> {
        let field = self.fields.get_mut(self.current)?;
        field.accepts_text().then_some(&mut field.editor)
    }

    /// Cycle the options of the current select field. No-op on other kinds.
    pub fn cycle_selected(&mut self, forward: bool) {
        if let Some(field) = self.fields.get_mut(self.current)
            && let FieldKind::Select(options) = &field.kind
            && !options.is_empty()
        {
            field.selected = if forward {
                (field.selected + 1) % options.len()
            } else {
                (field.selected + options.len() - 1) % options.len()
            };
        }
    }

    pub fn value(&self, label: &str) -> String {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.value())
            .unwrap_or_default()
    }

    /// Optional value: None when the field is empty
    pub fn value_opt(&self, label: &str) -> Option<String> {
        let value = self.value(label);
        (!value.is_empty()).then_some(value)
    }

    /// Check required fields and date syntax before any request is made.
    pub fn validate(&self) -> Result<(), String> {
        for field in &self.fields {
            let value = field.value();
            if field.required && value.is_empty() {
                return Err(format!("{} is required", field.label));
            }
            if matches!(field.kind, FieldKind::Date)
                && !value.is_empty()
                && parse_date(&value).is_err()
            {
                return Err(format!("{} must be YYYY-MM-DD", field.label));
            }
        }
        Ok(())
    }

    pub fn is_multiline_active(&self) -> bool {
        matches!(
            self.current_field().map(|f| &f.kind),
            Some(FieldKind::Multiline)
        )
    }
}

/// Render the form in the main area, one bordered box per field. The
/// active text field shows the terminal cursor.
pub fn render_form(f: &mut Frame, area: Rect, form: &Form, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = get_contrast_text_color(highlight_bg);

    let outer = Block::default()
        .borders(Borders::ALL)
        .title(form.title.as_str())
        .style(Style::default().fg(fg_color).bg(bg_color));
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    // One 3-line box per single-line field; multiline fields share the rest
    let constraints: Vec<Constraint> = form
        .fields
        .iter()
        .map(|field| match field.kind {
            FieldKind::Multiline => Constraint::Min(5),
            _ => Constraint::Length(3),
        })
        .chain(std::iter::once(Constraint::Length(1)))
        .collect();

    let rows = RatLayout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (index, field) in form.fields.iter().enumerate() {
        let field_area = rows[index];
        if field_area.height == 0 {
            continue;
        }
        let is_active = index == form.current;

        let border_style = if is_active {
            Style::default().fg(highlight_bg)
        } else {
            Style::default().fg(fg_color)
        };
        let title = if field.required {
            format!("{} *", field.label)
        } else {
            field.label.to_string()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(border_style)
            .style(Style::default().fg(fg_color).bg(bg_color));

        match &field.kind {
            FieldKind::Select(options) => {
                let spans: Vec<Span> = options
                    .iter()
                    .enumerate()
                    .flat_map(|(i, option)| {
                        let style = if i == field.selected {
                            Style::default()
                                .fg(highlight_fg)
                                .bg(highlight_bg)
                                .add_modifier(Modifier::BOLD)
                        } else {
                            Style::default().fg(fg_color).bg(bg_color)
                        };
                        vec![
                            Span::styled(format!(" {} ", option), style),
                            Span::styled(" ", Style::default().bg(bg_color)),
                        ]
                    })
                    .collect();
                let paragraph = Paragraph::new(Line::from(spans)).block(block);
                f.render_widget(paragraph, field_area);
            }
            _ => {
                let viewport_height = field_area.height.saturating_sub(2) as usize;
                let (_, visible) = field
                    .editor
                    .get_visible_lines(viewport_height, field_area.width as usize);
                let lines: Vec<Line> = visible
                    .into_iter()
                    .map(|l| Line::from(Span::styled(l, Style::default().fg(fg_color))))
                    .collect();
                let paragraph = Paragraph::new(lines).block(block);
                f.render_widget(paragraph, field_area);

                if is_active
                    && let Some((x, y)) = field
                        .editor
                        .get_cursor_screen_pos(field_area, viewport_height)
                {
                    f.set_cursor_position((x, y));
                }
            }
        }
    }

    // Footer hint
    if let Some(hint_area) = rows.last()
        && hint_area.height > 0
    {
        let hint =
            Paragraph::new("Tab/Shift+Tab: fields • ←/→: options • Ctrl+s: save • Esc: cancel")
                .style(Style::default().fg(fg_color).bg(bg_color));
        f.render_widget(hint, *hint_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_form() -> Form {
        Form::new(
            "New Project",
            FormAction::CreateProject,
            vec![
                Field::text("Name", true),
                Field::select(
                    "Platform",
                    vec!["iOS".to_string(), "Android".to_string(), "Both".to_string()],
                    2,
                ),
                Field::date("Start date", false),
                Field::multiline("Description"),
            ],
        )
    }

    #[test]
    fn field_navigation_wraps() {
        let mut form = sample_form();
        assert_eq!(form.current, 0);
        form.prev_field();
        assert_eq!(form.current, 3);
        form.next_field();
        assert_eq!(form.current, 0);
    }

    #[test]
    fn select_cycles_without_free_text() {
        let mut form = sample_form();
        form.next_field(); // Platform
        assert_eq!(form.value("Platform"), "Both");
        form.cycle_selected(true);
        assert_eq!(form.value("Platform"), "iOS");
        form.cycle_selected(false);
        assert_eq!(form.value("Platform"), "Both");
        assert!(form.current_editor_mut().is_none());
    }

    #[test]
    fn validation_checks_required_and_dates() {
        let mut form = sample_form();
        assert_eq!(form.validate(), Err("Name is required".to_string()));

        form.fields[0].editor = Editor::from_string("MyApp".to_string());
        assert_eq!(form.validate(), Ok(()));

        form.fields[2].editor = Editor::from_string("01-09-2026".to_string());
        assert_eq!(
            form.validate(),
            Err("Start date must be YYYY-MM-DD".to_string())
        );

        form.fields[2].editor = Editor::from_string("2026-09-01".to_string());
        assert_eq!(form.validate(), Ok(()));
    }

    #[test]
    fn empty_optional_fields_are_none() {
        let form = sample_form();
        assert_eq!(form.value_opt("Description"), None);
        assert_eq!(form.value_opt("Platform"), Some("Both".to_string()));
    }
}
