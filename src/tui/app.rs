use std::time::Instant;

use crate::Config;
use crate::api::ApiError;
use crate::models::{
    AiAnalysisRequest, AiAnalysisResponse, ChecklistItem, ChecklistItemCreate,
    ChecklistItemUpdate, ChecklistStatus, PhaseTasks, Platform, Priority, Project, ProjectCreate,
    ProjectStatus, ProjectUpdate, Rejection, RejectionCreate, RejectionStatus, RejectionUpdate,
    Task, TaskCreate, TaskUpdate,
};
use crate::progress::{ChecklistGroup, group_checklist};
use crate::store::Store;
use crate::tui::error::TuiError;
use crate::tui::widgets::editor::Editor;
use crate::tui::widgets::form::{Field, Form, FormAction};
use crate::utils::{date_to_datetime, expand_path, parse_date};

/// Which screen is showing: the project dashboard, or one opened project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Project,
}

/// Tabs inside the project view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Tasks,
    Checklist,
    Rejections,
    Assistant,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Overview,
        Tab::Tasks,
        Tab::Checklist,
        Tab::Rejections,
        Tab::Assistant,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Tasks => "Tasks",
            Tab::Checklist => "Checklist",
            Tab::Rejections => "Rejections",
            Tab::Assistant => "Assistant",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Tab {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Tab {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Input mode. `View` is normal navigation; the others route keys to a
/// modal (form, memo editor, chat input, delete confirmation, help).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    View,
    Form,
    Memo,
    Chat,
    Confirm,
    Help,
}

/// A pending destructive action, shown in the confirmation popup.
#[derive(Debug, Clone)]
pub enum ConfirmAction {
    DeleteProject { id: String, name: String },
    DeleteTask { id: String, title: String },
    DeleteFile { item_id: String, filename: String },
}

impl ConfirmAction {
    pub fn describe(&self) -> String {
        match self {
            ConfirmAction::DeleteProject { name, .. } => {
                format!("Delete project '{}' and all its data?", name)
            }
            ConfirmAction::DeleteTask { title, .. } => format!("Delete task '{}'?", title),
            ConfirmAction::DeleteFile { filename, .. } => {
                format!("Delete attached file '{}'?", filename)
            }
        }
    }
}

/// One row of the phase-grouped task board: a phase heading or a task.
/// Indices point into `ProjectDetail::tasks_by_phase`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRow {
    Phase(usize),
    Task(usize, usize),
}

/// One row of the platform-grouped checklist. Indices point into the
/// groups built by `checklist_groups`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecklistRow {
    Group(usize),
    Item(usize, usize),
}

pub fn task_rows(phases: &[PhaseTasks]) -> Vec<TaskRow> {
    let mut rows = Vec::new();
    for (pi, phase) in phases.iter().enumerate() {
        rows.push(TaskRow::Phase(pi));
        for ti in 0..phase.tasks.len() {
            rows.push(TaskRow::Task(pi, ti));
        }
    }
    rows
}

pub fn checklist_rows(groups: &[ChecklistGroup]) -> Vec<ChecklistRow> {
    let mut rows = Vec::new();
    for (gi, group) in groups.iter().enumerate() {
        rows.push(ChecklistRow::Group(gi));
        for ii in 0..group.items.len() {
            rows.push(ChecklistRow::Item(gi, ii));
        }
    }
    rows
}

// Move a selection one step, skipping heading rows. Stays put at the edges.
fn move_past_headings(
    selected: usize,
    len: usize,
    is_heading: impl Fn(usize) -> bool,
    down: bool,
) -> usize {
    if len == 0 {
        return 0;
    }
    let mut index = selected.min(len - 1);
    loop {
        let next = if down {
            if index + 1 >= len {
                return selected.min(len - 1);
            }
            index + 1
        } else {
            if index == 0 {
                return selected.min(len - 1);
            }
            index - 1
        };
        index = next;
        if !is_heading(index) {
            return index;
        }
    }
}

// First selectable (non-heading) row, if any.
fn first_selectable(len: usize, is_heading: impl Fn(usize) -> bool) -> usize {
    (0..len).find(|i| !is_heading(*i)).unwrap_or(0)
}

/// Top-level UI flags.
pub struct UiState {
    pub view: View,
    pub active_tab: Tab,
    pub mode: Mode,
    pub sidebar_collapsed: bool,
    pub should_quit: bool,
}

/// Selections for the lists on each tab.
pub struct SelectionState {
    pub project: usize,
    pub task: usize,
    pub checklist: usize,
    pub rejection: usize,
}

/// Rejection analysis fetched on demand; not persisted server-side.
pub struct RejectionViewState {
    pub analysis: Option<AiAnalysisResponse>,
    pub scroll: u16,
}

/// Assistant tab state: the question being typed and response scroll.
pub struct ChatState {
    pub input: Editor,
    pub scroll: u16,
}

/// Transient status-bar message with its display timestamp.
pub struct StatusState {
    pub message: Option<String>,
    pub message_time: Option<Instant>,
}

/// Modal state: at most one of these is active, as tracked by `Mode`.
pub struct ModalState {
    pub form: Option<Form>,
    pub memo: Option<MemoModal>,
    pub confirm: Option<ConfirmAction>,
    /// 0 = delete, 1 = cancel
    pub confirm_selected: usize,
}

pub struct MemoModal {
    pub task_id: String,
    pub task_title: String,
    pub editor: Editor,
}

pub struct App {
    pub config: Config,
    pub store: Store,
    pub ui: UiState,
    pub selection: SelectionState,
    pub rejection_view: RejectionViewState,
    pub chat: ChatState,
    pub status: StatusState,
    pub modal: ModalState,
}

impl App {
    pub fn new(config: Config, store: Store) -> Result<Self, TuiError> {
        let mut app = Self {
            config,
            store,
            ui: UiState {
                view: View::Dashboard,
                active_tab: Tab::Overview,
                mode: Mode::View,
                sidebar_collapsed: false,
                should_quit: false,
            },
            selection: SelectionState {
                project: 0,
                task: 0,
                checklist: 0,
                rejection: 0,
            },
            rejection_view: RejectionViewState {
                analysis: None,
                scroll: 0,
            },
            chat: ChatState {
                input: Editor::new(),
                scroll: 0,
            },
            status: StatusState {
                message: None,
                message_time: None,
            },
            modal: ModalState {
                form: None,
                memo: None,
                confirm: None,
                confirm_selected: 1,
            },
        };
        // An unreachable backend should not keep the dashboard from opening
        if let Err(err) = app.store.load_projects() {
            app.set_status_message(format!("Could not reach backend: {}", err));
        }
        Ok(app)
    }

    // ----- status bar -----

    pub fn set_status_message(&mut self, message: String) {
        self.status.message = Some(message);
        self.status.message_time = Some(Instant::now());
    }

    /// Clear the status message after 3 seconds.
    pub fn check_status_message_timeout(&mut self) {
        if let Some(time) = self.status.message_time
            && time.elapsed().as_secs() >= 3
        {
            self.status.message = None;
            self.status.message_time = None;
        }
    }

    fn report(&mut self, result: Result<(), ApiError>, ok: &str) {
        match result {
            Ok(()) => self.set_status_message(ok.to_string()),
            Err(err) => self.set_status_message(format!("Error: {}", err)),
        }
    }

    // ----- derived rows and selections -----

    pub fn task_board_rows(&self) -> Vec<TaskRow> {
        self.store
            .detail
            .as_ref()
            .map(|d| task_rows(&d.tasks_by_phase))
            .unwrap_or_default()
    }

    pub fn checklist_groups(&self) -> Vec<ChecklistGroup> {
        self.store
            .detail
            .as_ref()
            .map(|d| group_checklist(&d.checklist, d.project.platform))
            .unwrap_or_default()
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.store.projects.get(self.selection.project)
    }

    pub fn opened_project(&self) -> Option<&Project> {
        self.store.detail.as_ref().map(|d| &d.project)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        let detail = self.store.detail.as_ref()?;
        match self.task_board_rows().get(self.selection.task)? {
            TaskRow::Task(pi, ti) => detail.tasks_by_phase.get(*pi)?.tasks.get(*ti),
            TaskRow::Phase(_) => None,
        }
    }

    pub fn selected_checklist_item(&self) -> Option<ChecklistItem> {
        let groups = self.checklist_groups();
        match checklist_rows(&groups).get(self.selection.checklist)? {
            ChecklistRow::Item(gi, ii) => groups.get(*gi)?.items.get(*ii).cloned(),
            ChecklistRow::Group(_) => None,
        }
    }

    pub fn selected_rejection(&self) -> Option<&Rejection> {
        self.store
            .detail
            .as_ref()?
            .rejections
            .get(self.selection.rejection)
    }

    // ----- navigation -----

    pub fn move_selection(&mut self, down: bool) {
        match self.ui.view {
            View::Dashboard => {
                let len = self.store.projects.len();
                if len == 0 {
                    return;
                }
                let current = self.selection.project.min(len - 1);
                self.selection.project = if down {
                    (current + 1).min(len - 1)
                } else {
                    current.saturating_sub(1)
                };
            }
            View::Project => match self.ui.active_tab {
                Tab::Tasks => {
                    let rows = self.task_board_rows();
                    let heading = |i: usize| matches!(rows.get(i), Some(TaskRow::Phase(_)));
                    self.selection.task =
                        move_past_headings(self.selection.task, rows.len(), heading, down);
                }
                Tab::Checklist => {
                    let groups = self.checklist_groups();
                    let rows = checklist_rows(&groups);
                    let heading = |i: usize| matches!(rows.get(i), Some(ChecklistRow::Group(_)));
                    self.selection.checklist =
                        move_past_headings(self.selection.checklist, rows.len(), heading, down);
                }
                Tab::Rejections => {
                    let len = self
                        .store
                        .detail
                        .as_ref()
                        .map(|d| d.rejections.len())
                        .unwrap_or(0);
                    if len == 0 {
                        return;
                    }
                    let current = self.selection.rejection.min(len - 1);
                    let next = if down {
                        (current + 1).min(len - 1)
                    } else {
                        current.saturating_sub(1)
                    };
                    if next != self.selection.rejection {
                        self.selection.rejection = next;
                        self.rejection_view.analysis = None;
                        self.rejection_view.scroll = 0;
                    }
                }
                Tab::Assistant => {
                    self.chat.scroll = if down {
                        self.chat.scroll.saturating_add(1)
                    } else {
                        self.chat.scroll.saturating_sub(1)
                    };
                }
                Tab::Overview => {}
            },
        }
    }

    /// Reset each selection onto a selectable row after data changed.
    fn clamp_selections(&mut self) {
        let rows = self.task_board_rows();
        let heading = |i: usize| matches!(rows.get(i), Some(TaskRow::Phase(_)));
        if rows.is_empty() {
            self.selection.task = 0;
        } else if self.selection.task >= rows.len() || heading(self.selection.task) {
            self.selection.task = first_selectable(rows.len(), heading);
        }

        let groups = self.checklist_groups();
        let rows = checklist_rows(&groups);
        let heading = |i: usize| matches!(rows.get(i), Some(ChecklistRow::Group(_)));
        if rows.is_empty() {
            self.selection.checklist = 0;
        } else if self.selection.checklist >= rows.len() || heading(self.selection.checklist) {
            self.selection.checklist = first_selectable(rows.len(), heading);
        }

        let rejections = self
            .store
            .detail
            .as_ref()
            .map(|d| d.rejections.len())
            .unwrap_or(0);
        self.selection.rejection = self.selection.rejection.min(rejections.saturating_sub(1));
        self.selection.project = self
            .selection
            .project
            .min(self.store.projects.len().saturating_sub(1));
    }

    pub fn next_tab(&mut self) {
        if self.ui.view == View::Project {
            self.ui.active_tab = self.ui.active_tab.next();
        }
    }

    pub fn prev_tab(&mut self) {
        if self.ui.view == View::Project {
            self.ui.active_tab = self.ui.active_tab.prev();
        }
    }

    pub fn set_tab(&mut self, index: usize) {
        if self.ui.view == View::Project
            && let Some(tab) = Tab::ALL.get(index)
        {
            self.ui.active_tab = *tab;
        }
    }

    pub fn toggle_sidebar(&mut self) {
        self.ui.sidebar_collapsed = !self.ui.sidebar_collapsed;
    }

    // ----- opening / closing projects -----

    pub fn open_selected_project(&mut self) {
        let Some(id) = self.selected_project().map(|p| p.id.clone()) else {
            return;
        };
        match self.store.open_project(&id) {
            Ok(()) => {
                self.ui.view = View::Project;
                self.ui.active_tab = Tab::Overview;
                self.selection.task = 0;
                self.selection.checklist = 0;
                self.selection.rejection = 0;
                self.rejection_view.analysis = None;
                self.chat.input = Editor::new();
                self.chat.scroll = 0;
                self.clamp_selections();
            }
            Err(ApiError::NotFound(_)) => {
                // The project vanished under us; resync the dashboard
                self.set_status_message("Project no longer exists".to_string());
                let _ = self.store.load_projects();
                self.clamp_selections();
            }
            Err(err) => self.set_status_message(format!("Error: {}", err)),
        }
    }

    pub fn back_to_dashboard(&mut self) {
        self.store.close_project();
        self.ui.view = View::Dashboard;
        self.ui.active_tab = Tab::Overview;
    }

    /// Re-fetch the data behind the current view.
    pub fn refresh(&mut self) {
        let result = match self.ui.view {
            View::Dashboard => self.store.load_projects(),
            View::Project => match self.opened_project().map(|p| p.id.clone()) {
                Some(id) => self.store.open_project(&id),
                None => Ok(()),
            },
        };
        match result {
            Ok(()) => {
                self.clamp_selections();
                self.set_status_message("Refreshed".to_string());
            }
            Err(ApiError::NotFound(_)) => {
                self.back_to_dashboard();
                self.set_status_message("Project no longer exists".to_string());
                let _ = self.store.load_projects();
                self.clamp_selections();
            }
            Err(err) => self.set_status_message(format!("Error: {}", err)),
        }
    }

    // ----- tasks -----

    pub fn toggle_selected_task(&mut self) {
        let Some(id) = self.selected_task().map(|t| t.id.clone()) else {
            return;
        };
        let result = self.store.toggle_task(&id);
        self.report(result, "Task updated");
        self.clamp_selections();
    }

    pub fn open_memo_modal(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        self.modal.memo = Some(MemoModal {
            task_id: task.id.clone(),
            task_title: task.title.clone(),
            editor: Editor::from_string(task.memo.clone().unwrap_or_default()),
        });
        self.ui.mode = Mode::Memo;
    }

    pub fn save_memo_modal(&mut self) {
        let Some(memo) = self.modal.memo.take() else {
            return;
        };
        let text = memo.editor.text();
        match self.store.save_memo(&memo.task_id, text.trim_end()) {
            Ok(()) => self.set_status_message("Memo saved".to_string()),
            Err(err) => self.set_status_message(format!("Memo not saved: {}", err)),
        }
        self.ui.mode = Mode::View;
    }

    pub fn cancel_memo_modal(&mut self) {
        self.modal.memo = None;
        self.ui.mode = Mode::View;
    }

    /// Generate the platform-default tasks or checklist for the active tab.
    pub fn generate_defaults(&mut self) {
        match self.ui.active_tab {
            Tab::Tasks => {
                let result = self.store.generate_default_tasks();
                self.report(result, "Default tasks generated");
            }
            Tab::Checklist => {
                let result = self.store.generate_default_checklist();
                self.report(result, "Default checklist generated");
            }
            _ => {}
        }
        self.clamp_selections();
    }

    // ----- forms -----

    fn platform_options() -> Vec<String> {
        vec!["iOS".to_string(), "Android".to_string(), "Both".to_string()]
    }

    fn parse_platform(value: &str) -> Platform {
        match value {
            "iOS" => Platform::Ios,
            "Android" => Platform::Android,
            _ => Platform::Both,
        }
    }

    fn parse_priority(value: &str) -> Priority {
        match value {
            "low" => Priority::Low,
            "high" => Priority::High,
            _ => Priority::Medium,
        }
    }

    fn open_form(&mut self, form: Form) {
        self.modal.form = Some(form);
        self.ui.mode = Mode::Form;
    }

    pub fn cancel_form(&mut self) {
        self.modal.form = None;
        self.ui.mode = Mode::View;
    }

    /// Open the create form for whatever the current view shows.
    pub fn new_item_form(&mut self) {
        match self.ui.view {
            View::Dashboard => self.open_create_project_form(),
            View::Project => match self.ui.active_tab {
                Tab::Overview => self.open_schedule_form(),
                Tab::Tasks => self.open_create_task_form(),
                Tab::Checklist => self.open_create_checklist_item_form(),
                Tab::Rejections => self.open_create_rejection_form(),
                Tab::Assistant => {}
            },
        }
    }

    /// Open the edit form for the current selection.
    pub fn edit_item_form(&mut self) {
        match self.ui.view {
            View::Dashboard => self.open_edit_project_form(),
            View::Project => match self.ui.active_tab {
                Tab::Overview => self.open_edit_project_form(),
                Tab::Tasks => self.open_edit_task_form(),
                Tab::Checklist => self.open_edit_checklist_item_form(),
                Tab::Rejections => self.open_update_rejection_form(),
                Tab::Assistant => {}
            },
        }
    }

    fn open_create_project_form(&mut self) {
        self.open_form(Form::new(
            "New Project",
            FormAction::CreateProject,
            vec![
                Field::text("Name", true),
                Field::select("Platform", Self::platform_options(), 2),
                Field::date("Start date", false),
                Field::date("Publish date", false),
                Field::select(
                    "Default tasks",
                    vec!["yes".to_string(), "no".to_string()],
                    0,
                ),
                Field::multiline("Description"),
            ],
        ));
    }

    fn open_edit_project_form(&mut self) {
        let project = match self.ui.view {
            View::Dashboard => self.selected_project(),
            View::Project => self.opened_project(),
        };
        let Some(project) = project else {
            return;
        };
        let platform_index = match project.platform {
            Platform::Ios => 0,
            Platform::Android => 1,
            Platform::Both => 2,
        };
        let status_index = match project.status {
            ProjectStatus::Active => 0,
            ProjectStatus::Submitted => 1,
            ProjectStatus::Approved => 2,
            ProjectStatus::Rejected => 3,
        };
        let form = Form::new(
            format!("Edit Project: {}", project.name),
            FormAction::EditProject {
                id: project.id.clone(),
            },
            vec![
                Field::text_with("Name", &project.name, true),
                Field::select("Platform", Self::platform_options(), platform_index),
                Field::select(
                    "Status",
                    vec![
                        "active".to_string(),
                        "submitted".to_string(),
                        "approved".to_string(),
                        "rejected".to_string(),
                    ],
                    status_index,
                ),
                Field::multiline_with(
                    "Description",
                    project.description.as_deref().unwrap_or(""),
                ),
            ],
        );
        self.open_form(form);
    }

    fn open_schedule_form(&mut self) {
        let Some(project) = self.opened_project() else {
            return;
        };
        let start = project
            .start_date
            .map(|d| d.date_naive().format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let publish = project
            .publish_date
            .map(|d| d.date_naive().format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let form = Form::new(
            "Edit Schedule",
            FormAction::EditSchedule {
                id: project.id.clone(),
            },
            vec![
                Field::date_with("Start date", &start, false),
                Field::date_with("Publish date", &publish, false),
            ],
        );
        self.open_form(form);
    }

    fn open_create_task_form(&mut self) {
        let Some(project_id) = self.opened_project().map(|p| p.id.clone()) else {
            return;
        };
        let phases: Vec<String> = self
            .store
            .phases
            .iter()
            .map(|p| p.phase_name.clone())
            .collect();
        let phase_field = if phases.is_empty() {
            Field::text("Phase", true)
        } else {
            Field::select("Phase", phases, 0)
        };
        self.open_form(Form::new(
            "New Task",
            FormAction::CreateTask { project_id },
            vec![
                Field::text("Title", true),
                phase_field,
                Field::select(
                    "Priority",
                    vec!["low".to_string(), "medium".to_string(), "high".to_string()],
                    1,
                ),
                Field::date("Due date", false),
                Field::multiline("Description"),
            ],
        ));
    }

    fn open_edit_task_form(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let priority_index = match task.priority {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
        };
        let due = task
            .due_date
            .map(|d| d.date_naive().format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let form = Form::new(
            format!("Edit Task: {}", task.title),
            FormAction::EditTask {
                id: task.id.clone(),
            },
            vec![
                Field::text_with("Title", &task.title, true),
                Field::select(
                    "Priority",
                    vec!["low".to_string(), "medium".to_string(), "high".to_string()],
                    priority_index,
                ),
                Field::date_with("Due date", &due, false),
                Field::multiline_with(
                    "Description",
                    task.description.as_deref().unwrap_or(""),
                ),
            ],
        );
        self.open_form(form);
    }

    fn open_create_checklist_item_form(&mut self) {
        let Some(project_id) = self.opened_project().map(|p| p.id.clone()) else {
            return;
        };
        self.open_form(Form::new(
            "New Checklist Item",
            FormAction::CreateChecklistItem { project_id },
            vec![
                Field::text("Item name", true),
                Field::select(
                    "Platform",
                    vec!["iOS".to_string(), "Android".to_string()],
                    0,
                ),
                Field::text("Category", true),
                Field::multiline("Description"),
            ],
        ));
    }

    fn open_edit_checklist_item_form(&mut self) {
        let Some(item) = self.selected_checklist_item() else {
            return;
        };
        let status_index = match item.status {
            ChecklistStatus::Incomplete => 0,
            ChecklistStatus::Completed => 1,
        };
        let form = Form::new(
            format!("Edit: {}", item.item_name),
            FormAction::EditChecklistItem {
                id: item.id.clone(),
            },
            vec![
                Field::select(
                    "Status",
                    vec!["incomplete".to_string(), "completed".to_string()],
                    status_index,
                ),
                Field::text_with("Value", item.value.as_deref().unwrap_or(""), false),
                Field::multiline_with("Notes", item.notes.as_deref().unwrap_or("")),
            ],
        );
        self.open_form(form);
    }

    pub fn open_attach_file_form(&mut self) {
        let Some(item) = self.selected_checklist_item() else {
            return;
        };
        let form = Form::new(
            format!("Attach File: {}", item.item_name),
            FormAction::AttachFile { item_id: item.id },
            vec![Field::text("File path", true)],
        );
        self.open_form(form);
    }

    fn open_create_rejection_form(&mut self) {
        let Some(project) = self.opened_project() else {
            return;
        };
        let platform_index = match project.platform {
            Platform::Android => 1,
            _ => 0,
        };
        let form = Form::new(
            "Record Rejection",
            FormAction::CreateRejection {
                project_id: project.id.clone(),
            },
            vec![
                Field::select(
                    "Platform",
                    vec!["iOS".to_string(), "Android".to_string()],
                    platform_index,
                ),
                Field::multiline("Reason"),
            ],
        );
        self.open_form(form);
    }

    fn open_update_rejection_form(&mut self) {
        let Some(rejection) = self.selected_rejection() else {
            return;
        };
        let status_index = match rejection.status {
            RejectionStatus::Open => 0,
            RejectionStatus::InProgress => 1,
            RejectionStatus::Resolved => 2,
        };
        let form = Form::new(
            "Update Rejection",
            FormAction::UpdateRejection {
                id: rejection.id.clone(),
            },
            vec![
                Field::select(
                    "Status",
                    vec![
                        "open".to_string(),
                        "in_progress".to_string(),
                        "resolved".to_string(),
                    ],
                    status_index,
                ),
                Field::multiline_with(
                    "Action plan",
                    rejection.action_plan.as_deref().unwrap_or(""),
                ),
            ],
        );
        self.open_form(form);
    }

    /// Validate and submit the open form. On success the form closes; on
    /// failure it stays open with the error in the status bar.
    pub fn submit_form(&mut self) {
        let Some(form) = self.modal.form.clone() else {
            return;
        };
        if let Err(msg) = form.validate() {
            self.set_status_message(msg);
            return;
        }
        let date_value = |label: &str| form.value_opt(label).and_then(|v| parse_date(&v).ok());

        let result = match form.action.clone() {
            FormAction::CreateProject => self
                .store
                .create_project(&ProjectCreate {
                    name: form.value("Name"),
                    platform: Self::parse_platform(&form.value("Platform")),
                    description: form.value_opt("Description"),
                    start_date: date_value("Start date").map(date_to_datetime),
                    publish_date: date_value("Publish date").map(date_to_datetime),
                    auto_generate_tasks: form.value("Default tasks") == "yes",
                })
                .map(|project| {
                    self.set_status_message(format!("Created project '{}'", project.name));
                }),
            FormAction::EditProject { id } => {
                let status = match form.value("Status").as_str() {
                    "submitted" => ProjectStatus::Submitted,
                    "approved" => ProjectStatus::Approved,
                    "rejected" => ProjectStatus::Rejected,
                    _ => ProjectStatus::Active,
                };
                self.store
                    .update_project(
                        &id,
                        &ProjectUpdate {
                            name: Some(form.value("Name")),
                            platform: Some(Self::parse_platform(&form.value("Platform"))),
                            description: form.value_opt("Description"),
                            status: Some(status),
                        },
                    )
                    .map(|()| self.set_status_message("Project updated".to_string()))
            }
            FormAction::EditSchedule { id } => self
                .store
                .update_schedule(
                    &id,
                    date_value("Start date").map(date_to_datetime),
                    date_value("Publish date").map(date_to_datetime),
                )
                .map(|()| self.set_status_message("Schedule updated".to_string())),
            FormAction::CreateTask { project_id } => {
                let phase_name = form.value("Phase");
                let phase_number = self
                    .store
                    .phases
                    .iter()
                    .find(|p| p.phase_name == phase_name)
                    .map(|p| p.phase_number);
                self.store
                    .create_task(&TaskCreate {
                        project_id,
                        title: form.value("Title"),
                        description: form.value_opt("Description"),
                        phase: phase_name,
                        phase_number,
                        due_date: date_value("Due date").map(date_to_datetime),
                        priority: Self::parse_priority(&form.value("Priority")),
                    })
                    .map(|()| self.set_status_message("Task created".to_string()))
            }
            FormAction::EditTask { id } => self
                .store
                .update_task(
                    &id,
                    &TaskUpdate {
                        title: Some(form.value("Title")),
                        description: form.value_opt("Description"),
                        due_date: date_value("Due date").map(date_to_datetime),
                        priority: Some(Self::parse_priority(&form.value("Priority"))),
                    },
                )
                .map(|()| self.set_status_message("Task updated".to_string())),
            FormAction::CreateChecklistItem { project_id } => self
                .store
                .create_checklist_item(&ChecklistItemCreate {
                    project_id,
                    platform: Self::parse_platform(&form.value("Platform")),
                    category: form.value("Category"),
                    item_name: form.value("Item name"),
                    description: form.value_opt("Description"),
                })
                .map(|()| self.set_status_message("Checklist item created".to_string())),
            FormAction::EditChecklistItem { id } => {
                let status = if form.value("Status") == "completed" {
                    ChecklistStatus::Completed
                } else {
                    ChecklistStatus::Incomplete
                };
                self.store
                    .update_checklist_item(
                        &id,
                        &ChecklistItemUpdate {
                            status: Some(status),
                            value: form.value_opt("Value"),
                            notes: form.value_opt("Notes"),
                        },
                    )
                    .map(|()| self.set_status_message("Checklist item updated".to_string()))
            }
            FormAction::AttachFile { item_id } => {
                let path = expand_path(&form.value("File path"));
                if !path.is_file() {
                    self.set_status_message(format!("No such file: {}", path.display()));
                    return;
                }
                self.store
                    .upload_checklist_file(&item_id, &path)
                    .map(|()| self.set_status_message("File attached".to_string()))
            }
            FormAction::CreateRejection { project_id } => {
                let reason = form.value("Reason");
                if reason.is_empty() {
                    self.set_status_message("Reason is required".to_string());
                    return;
                }
                self.store
                    .create_rejection(&RejectionCreate {
                        project_id,
                        platform: Self::parse_platform(&form.value("Platform")),
                        reason,
                    })
                    .map(|()| self.set_status_message("Rejection recorded".to_string()))
            }
            FormAction::UpdateRejection { id } => {
                let status = match form.value("Status").as_str() {
                    "in_progress" => RejectionStatus::InProgress,
                    "resolved" => RejectionStatus::Resolved,
                    _ => RejectionStatus::Open,
                };
                self.store
                    .update_rejection(
                        &id,
                        &RejectionUpdate {
                            status: Some(status),
                            action_plan: form.value_opt("Action plan"),
                        },
                    )
                    .map(|()| self.set_status_message("Rejection updated".to_string()))
            }
        };

        match result {
            Ok(()) => {
                self.modal.form = None;
                self.ui.mode = Mode::View;
                self.clamp_selections();
            }
            Err(err) => self.set_status_message(format!("Error: {}", err)),
        }
    }

    // ----- delete confirmation -----

    /// Arm the confirmation popup for the current selection.
    pub fn request_delete(&mut self) {
        let action = match self.ui.view {
            View::Dashboard => self.selected_project().map(|p| ConfirmAction::DeleteProject {
                id: p.id.clone(),
                name: p.name.clone(),
            }),
            View::Project => match self.ui.active_tab {
                Tab::Overview => self.opened_project().map(|p| ConfirmAction::DeleteProject {
                    id: p.id.clone(),
                    name: p.name.clone(),
                }),
                Tab::Tasks => self.selected_task().map(|t| ConfirmAction::DeleteTask {
                    id: t.id.clone(),
                    title: t.title.clone(),
                }),
                Tab::Checklist => self.selected_checklist_item().and_then(|item| {
                    item.files.last().map(|f| ConfirmAction::DeleteFile {
                        item_id: item.id.clone(),
                        filename: f.filename.clone(),
                    })
                }),
                _ => None,
            },
        };
        if let Some(action) = action {
            self.modal.confirm = Some(action);
            self.modal.confirm_selected = 1; // default to cancel
            self.ui.mode = Mode::Confirm;
        }
    }

    pub fn confirm_toggle(&mut self) {
        self.modal.confirm_selected = 1 - self.modal.confirm_selected;
    }

    pub fn cancel_confirm(&mut self) {
        self.modal.confirm = None;
        self.ui.mode = Mode::View;
    }

    /// Run the armed action if "Delete" is selected, otherwise just close.
    pub fn execute_confirm(&mut self) {
        let Some(action) = self.modal.confirm.take() else {
            return;
        };
        self.ui.mode = Mode::View;
        if self.modal.confirm_selected != 0 {
            return;
        }
        match action {
            ConfirmAction::DeleteProject { id, name } => {
                let in_project = self.ui.view == View::Project;
                let result = self.store.delete_project(&id);
                self.report(result, &format!("Deleted project '{}'", name));
                if in_project && self.store.detail.is_none() {
                    self.ui.view = View::Dashboard;
                    self.ui.active_tab = Tab::Overview;
                }
            }
            ConfirmAction::DeleteTask { id, .. } => {
                let result = self.store.delete_task(&id);
                self.report(result, "Task deleted");
            }
            ConfirmAction::DeleteFile { item_id, filename } => {
                let result = self.store.delete_checklist_file(&item_id, &filename);
                self.report(result, "File deleted");
            }
        }
        self.clamp_selections();
    }

    // ----- rejections -----

    /// Run an on-demand AI analysis of the selected rejection and show it
    /// in the detail pane.
    pub fn analyze_selected_rejection(&mut self) {
        let Some(rejection) = self.selected_rejection() else {
            return;
        };
        let request = AiAnalysisRequest {
            rejection_reason: rejection.reason.clone(),
            platform: rejection.platform,
        };
        match self.store.analyze_rejection(&request) {
            Ok(response) => {
                self.rejection_view.analysis = Some(response);
                self.rejection_view.scroll = 0;
                self.set_status_message("Analysis ready".to_string());
            }
            Err(err) => self.set_status_message(format!("Analysis failed: {}", err)),
        }
    }

    // ----- assistant -----

    pub fn enter_chat_mode(&mut self) {
        if self.ui.view == View::Project && self.ui.active_tab == Tab::Assistant {
            self.ui.mode = Mode::Chat;
        }
    }

    pub fn leave_chat_mode(&mut self) {
        self.ui.mode = Mode::View;
    }

    pub fn send_chat_message(&mut self) {
        let message = self.chat.input.text().trim().to_string();
        if message.is_empty() {
            self.set_status_message("Type a question first".to_string());
            return;
        }
        match self.store.ask_assistant(&message) {
            Ok(()) => {
                self.chat.input = Editor::new();
                self.chat.scroll = 0;
                self.ui.mode = Mode::View;
            }
            Err(err) => self.set_status_message(format!("Assistant error: {}", err)),
        }
    }

    /// Copy the last assistant response to the system clipboard.
    pub fn copy_chat_response(&mut self) {
        let Some(response) = self
            .store
            .detail
            .as_ref()
            .and_then(|d| d.last_exchange.as_ref())
            .map(|e| e.ai_response.clone())
        else {
            self.set_status_message("Nothing to copy".to_string());
            return;
        };
        let result = arboard::Clipboard::new()
            .and_then(|mut clipboard| clipboard.set_text(response))
            .map_err(|e| TuiError::ClipboardError(e.to_string()));
        match result {
            Ok(()) => self.set_status_message("Response copied".to_string()),
            Err(err) => self.set_status_message(format!("{}", err)),
        }
    }

    // ----- editors -----

    /// The editor keys should currently be routed to, if any.
    pub fn active_editor_mut(&mut self) -> Option<&mut Editor> {
        match self.ui.mode {
            Mode::Memo => self.modal.memo.as_mut().map(|m| &mut m.editor),
            Mode::Chat => Some(&mut self.chat.input),
            Mode::Form => self
                .modal
                .form
                .as_mut()
                .and_then(|form| form.current_editor_mut()),
            _ => None,
        }
    }

    pub fn toggle_help(&mut self) {
        self.ui.mode = if self.ui.mode == Mode::Help {
            Mode::View
        } else {
            Mode::Help
        };
    }

    pub fn quit(&mut self) {
        self.ui.should_quit = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn task(id: &str, title: &str) -> Task {
        Task {
            id: id.to_string(),
            project_id: "p1".to_string(),
            title: title.to_string(),
            description: None,
            phase: "Development".to_string(),
            phase_number: Some(1),
            completed: false,
            due_date: None,
            priority: Priority::Medium,
            memo: None,
            step_number: None,
            estimated_days: None,
            assigned_to: None,
            platform_specific: None,
            order: 0,
            is_default: false,
            completed_at: None,
            created_at: Some(Utc::now()),
        }
    }

    fn phases() -> Vec<PhaseTasks> {
        vec![
            PhaseTasks {
                phase_number: 1,
                phase_name: "Development".to_string(),
                tasks: vec![task("t1", "Build"), task("t2", "Test")],
            },
            PhaseTasks {
                phase_number: 2,
                phase_name: "Submission".to_string(),
                tasks: vec![task("t3", "Submit")],
            },
        ]
    }

    #[test]
    fn task_rows_interleave_phase_headings() {
        let rows = task_rows(&phases());
        assert_eq!(
            rows,
            vec![
                TaskRow::Phase(0),
                TaskRow::Task(0, 0),
                TaskRow::Task(0, 1),
                TaskRow::Phase(1),
                TaskRow::Task(1, 0),
            ]
        );
    }

    #[test]
    fn selection_skips_headings_in_both_directions() {
        let rows = task_rows(&phases());
        let heading = |i: usize| matches!(rows.get(i), Some(TaskRow::Phase(_)));

        // down from the last task of phase 1 jumps over the phase 2 heading
        assert_eq!(move_past_headings(2, rows.len(), heading, true), 4);
        // up from the first task of phase 2 jumps back over the heading
        assert_eq!(move_past_headings(4, rows.len(), heading, false), 2);
        // up from the very first task stays put
        assert_eq!(move_past_headings(1, rows.len(), heading, false), 1);
        // down from the last row stays put
        assert_eq!(move_past_headings(4, rows.len(), heading, true), 4);
    }

    #[test]
    fn first_selectable_skips_leading_heading() {
        let rows = task_rows(&phases());
        let heading = |i: usize| matches!(rows.get(i), Some(TaskRow::Phase(_)));
        assert_eq!(first_selectable(rows.len(), heading), 1);
    }

    #[test]
    fn tab_cycle_wraps_around() {
        assert_eq!(Tab::Assistant.next(), Tab::Overview);
        assert_eq!(Tab::Overview.prev(), Tab::Assistant);
        assert_eq!(Tab::Checklist.index(), 2);
    }
}
