use std::path::Path;

use chrono::{DateTime, Utc};

use crate::api::{ApiClient, ApiError};
use crate::models::{
    AiAnalysisRequest, AiAnalysisResponse, AiExchange, ChecklistItem, ChecklistItemCreate,
    ChecklistItemUpdate, Phase, PhaseTasks, Project, ProjectCreate, ProjectUpdate, Rejection,
    RejectionCreate, RejectionUpdate, Task, TaskCreate, TaskUpdate,
};

/// The remote backend, as the store sees it. The HTTP client implements
/// this for the real service; tests supply an in-memory fake.
pub trait Backend {
    fn list_projects(&self) -> Result<Vec<Project>, ApiError>;
    fn create_project(&self, input: &ProjectCreate) -> Result<Project, ApiError>;
    fn get_project(&self, id: &str) -> Result<Project, ApiError>;
    fn update_project(&self, id: &str, input: &ProjectUpdate) -> Result<Project, ApiError>;
    fn delete_project(&self, id: &str) -> Result<(), ApiError>;
    fn update_schedule(
        &self,
        id: &str,
        start_date: Option<DateTime<Utc>>,
        publish_date: Option<DateTime<Utc>>,
    ) -> Result<Project, ApiError>;
    fn generate_default_tasks(&self, id: &str) -> Result<(), ApiError>;
    fn generate_default_checklist(&self, id: &str) -> Result<(), ApiError>;

    fn project_tasks(&self, project_id: &str) -> Result<Vec<PhaseTasks>, ApiError>;
    fn phases(&self) -> Result<Vec<Phase>, ApiError>;
    fn create_task(&self, input: &TaskCreate) -> Result<Task, ApiError>;
    fn update_task(&self, id: &str, input: &TaskUpdate) -> Result<Task, ApiError>;
    fn delete_task(&self, id: &str) -> Result<(), ApiError>;
    fn set_task_completed(&self, id: &str, completed: bool) -> Result<Task, ApiError>;
    fn set_task_memo(&self, id: &str, memo: &str) -> Result<Task, ApiError>;

    fn checklist(&self, project_id: &str) -> Result<Vec<ChecklistItem>, ApiError>;
    fn create_checklist_item(&self, input: &ChecklistItemCreate)
    -> Result<ChecklistItem, ApiError>;
    fn update_checklist_item(
        &self,
        id: &str,
        input: &ChecklistItemUpdate,
    ) -> Result<ChecklistItem, ApiError>;
    fn upload_checklist_file(&self, id: &str, path: &Path) -> Result<ChecklistItem, ApiError>;
    fn delete_checklist_file(&self, id: &str, filename: &str)
    -> Result<ChecklistItem, ApiError>;

    fn rejections(&self, project_id: &str) -> Result<Vec<Rejection>, ApiError>;
    fn create_rejection(&self, input: &RejectionCreate) -> Result<Rejection, ApiError>;
    fn update_rejection(&self, id: &str, input: &RejectionUpdate)
    -> Result<Rejection, ApiError>;

    fn ai_chat(&self, project_id: &str, message: &str) -> Result<AiExchange, ApiError>;
    fn analyze_rejection(
        &self,
        input: &AiAnalysisRequest,
    ) -> Result<AiAnalysisResponse, ApiError>;
}

impl Backend for ApiClient {
    fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        ApiClient::list_projects(self)
    }
    fn create_project(&self, input: &ProjectCreate) -> Result<Project, ApiError> {
        ApiClient::create_project(self, input)
    }
    fn get_project(&self, id: &str) -> Result<Project, ApiError> {
        ApiClient::get_project(self, id)
    }
    fn update_project(&self, id: &str, input: &ProjectUpdate) -> Result<Project, ApiError> {
        ApiClient::update_project(self, id, input)
    }
    fn delete_project(&self, id: &str) -> Result<(), ApiError> {
        ApiClient::delete_project(self, id)
    }
    fn update_schedule(
        &self,
        id: &str,
        start_date: Option<DateTime<Utc>>,
        publish_date: Option<DateTime<Utc>>,
    ) -> Result<Project, ApiError> {
        ApiClient::update_schedule(self, id, start_date, publish_date)
    }
    fn generate_default_tasks(&self, id: &str) -> Result<(), ApiError> {
        ApiClient::generate_default_tasks(self, id)
    }
    fn generate_default_checklist(&self, id: &str) -> Result<(), ApiError> {
        ApiClient::generate_default_checklist(self, id)
    }
    fn project_tasks(&self, project_id: &str) -> Result<Vec<PhaseTasks>, ApiError> {
        ApiClient::project_tasks(self, project_id)
    }
    fn phases(&self) -> Result<Vec<Phase>, ApiError> {
        ApiClient::phases(self)
    }
    fn create_task(&self, input: &TaskCreate) -> Result<Task, ApiError> {
        ApiClient::create_task(self, input)
    }
    fn update_task(&self, id: &str, input: &TaskUpdate) -> Result<Task, ApiError> {
        ApiClient::update_task(self, id, input)
    }
    fn delete_task(&self, id: &str) -> Result<(), ApiError> {
        ApiClient::delete_task(self, id)
    }
    fn set_task_completed(&self, id: &str, completed: bool) -> Result<Task, ApiError> {
        ApiClient::set_task_completed(self, id, completed)
    }
    fn set_task_memo(&self, id: &str, memo: &str) -> Result<Task, ApiError> {
        ApiClient::set_task_memo(self, id, memo)
    }
    fn checklist(&self, project_id: &str) -> Result<Vec<ChecklistItem>, ApiError> {
        ApiClient::checklist(self, project_id)
    }
    fn create_checklist_item(
        &self,
        input: &ChecklistItemCreate,
    ) -> Result<ChecklistItem, ApiError> {
        ApiClient::create_checklist_item(self, input)
    }
    fn update_checklist_item(
        &self,
        id: &str,
        input: &ChecklistItemUpdate,
    ) -> Result<ChecklistItem, ApiError> {
        ApiClient::update_checklist_item(self, id, input)
    }
    fn upload_checklist_file(&self, id: &str, path: &Path) -> Result<ChecklistItem, ApiError> {
        ApiClient::upload_checklist_file(self, id, path)
    }
    fn delete_checklist_file(
        &self,
        id: &str,
        filename: &str,
    ) -> Result<ChecklistItem, ApiError> {
        ApiClient::delete_checklist_file(self, id, filename)
    }
    fn rejections(&self, project_id: &str) -> Result<Vec<Rejection>, ApiError> {
        ApiClient::rejections(self, project_id)
    }
    fn create_rejection(&self, input: &RejectionCreate) -> Result<Rejection, ApiError> {
        ApiClient::create_rejection(self, input)
    }
    fn update_rejection(
        &self,
        id: &str,
        input: &RejectionUpdate,
    ) -> Result<Rejection, ApiError> {
        ApiClient::update_rejection(self, id, input)
    }
    fn ai_chat(&self, project_id: &str, message: &str) -> Result<AiExchange, ApiError> {
        ApiClient::ai_chat(self, project_id, message)
    }
    fn analyze_rejection(
        &self,
        input: &AiAnalysisRequest,
    ) -> Result<AiAnalysisResponse, ApiError> {
        ApiClient::analyze_rejection(self, input)
    }
}

/// Everything loaded for the currently opened project.
#[derive(Debug, Clone)]
pub struct ProjectDetail {
    pub project: Project,
    pub tasks_by_phase: Vec<PhaseTasks>,
    pub checklist: Vec<ChecklistItem>,
    pub rejections: Vec<Rejection>,
    /// Most recent assistant exchange; not persisted server-side.
    pub last_exchange: Option<AiExchange>,
}

/// Client-side mirror of the server state, plus the mutations that keep
/// it in sync. Every mutation goes to the backend first; local state is
/// then refreshed from the response or by re-fetching the owning list.
/// All calls are blocking, so no two mutations can overlap.
pub struct Store {
    backend: Box<dyn Backend>,
    pub projects: Vec<Project>,
    pub phases: Vec<Phase>,
    pub detail: Option<ProjectDetail>,
}

impl Store {
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self {
            backend,
            projects: Vec::new(),
            phases: Vec::new(),
            detail: None,
        }
    }

    // ----- projects -----

    pub fn load_projects(&mut self) -> Result<(), ApiError> {
        self.projects = self.backend.list_projects()?;
        Ok(())
    }

    /// Load everything for one project. A `NotFound` here means the
    /// project vanished under us; the caller falls back to the dashboard.
    pub fn open_project(&mut self, id: &str) -> Result<(), ApiError> {
        let project = self.backend.get_project(id)?;
        let tasks_by_phase = self.backend.project_tasks(id)?;
        let checklist = self.backend.checklist(id)?;
        let rejections = self.backend.rejections(id)?;
        if self.phases.is_empty() {
            self.phases = self.backend.phases()?;
        }
        self.detail = Some(ProjectDetail {
            project,
            tasks_by_phase,
            checklist,
            rejections,
            last_exchange: None,
        });
        Ok(())
    }

    pub fn close_project(&mut self) {
        self.detail = None;
    }

    pub fn create_project(&mut self, input: &ProjectCreate) -> Result<Project, ApiError> {
        let project = self.backend.create_project(input)?;
        self.load_projects()?;
        Ok(project)
    }

    pub fn update_project(&mut self, id: &str, input: &ProjectUpdate) -> Result<(), ApiError> {
        let updated = self.backend.update_project(id, input)?;
        self.merge_project(updated);
        Ok(())
    }

    pub fn delete_project(&mut self, id: &str) -> Result<(), ApiError> {
        self.backend.delete_project(id)?;
        self.projects.retain(|p| p.id != id);
        if self.detail.as_ref().is_some_and(|d| d.project.id == id) {
            self.detail = None;
        }
        Ok(())
    }

    pub fn update_schedule(
        &mut self,
        id: &str,
        start_date: Option<DateTime<Utc>>,
        publish_date: Option<DateTime<Utc>>,
    ) -> Result<(), ApiError> {
        let updated = self.backend.update_schedule(id, start_date, publish_date)?;
        self.merge_project(updated);
        Ok(())
    }

    pub fn generate_default_tasks(&mut self) -> Result<(), ApiError> {
        let id = self.opened_id()?;
        self.backend.generate_default_tasks(&id)?;
        self.refresh_tasks()
    }

    pub fn generate_default_checklist(&mut self) -> Result<(), ApiError> {
        let id = self.opened_id()?;
        self.backend.generate_default_checklist(&id)?;
        self.refresh_checklist()
    }

    fn merge_project(&mut self, updated: Project) {
        if let Some(slot) = self.projects.iter_mut().find(|p| p.id == updated.id) {
            *slot = updated.clone();
        }
        if let Some(detail) = self.detail.as_mut()
            && detail.project.id == updated.id
        {
            detail.project = updated;
        }
    }

    fn opened_id(&self) -> Result<String, ApiError> {
        self.detail
            .as_ref()
            .map(|d| d.project.id.clone())
            .ok_or_else(|| ApiError::NotFound("no project is open".to_string()))
    }

    // ----- tasks -----

    pub fn refresh_tasks(&mut self) -> Result<(), ApiError> {
        let id = self.opened_id()?;
        let tasks = self.backend.project_tasks(&id)?;
        if let Some(detail) = self.detail.as_mut() {
            detail.tasks_by_phase = tasks;
        }
        Ok(())
    }

    pub fn create_task(&mut self, input: &TaskCreate) -> Result<(), ApiError> {
        self.backend.create_task(input)?;
        self.refresh_tasks()
    }

    pub fn update_task(&mut self, id: &str, input: &TaskUpdate) -> Result<(), ApiError> {
        self.backend.update_task(id, input)?;
        self.refresh_tasks()
    }

    pub fn delete_task(&mut self, id: &str) -> Result<(), ApiError> {
        self.backend.delete_task(id)?;
        self.refresh_tasks()
    }

    /// Flip a task's completion flag and re-fetch the phase grouping so
    /// per-phase aggregates stay consistent with the server.
    pub fn toggle_task(&mut self, id: &str) -> Result<(), ApiError> {
        let completed = self
            .find_task(id)
            .map(|t| t.completed)
            .ok_or_else(|| ApiError::NotFound("task not found".to_string()))?;
        self.backend.set_task_completed(id, !completed)?;
        self.refresh_tasks()
    }

    /// Save a task memo. The edit is applied locally first; if the save
    /// fails the previous value is restored and the error returned.
    pub fn save_memo(&mut self, id: &str, memo: &str) -> Result<(), ApiError> {
        let previous = match self.find_task_mut(id) {
            Some(task) => {
                let prev = task.memo.take();
                task.memo = Some(memo.to_string());
                prev
            }
            None => return Err(ApiError::NotFound("task not found".to_string())),
        };
        match self.backend.set_task_memo(id, memo) {
            Ok(saved) => {
                if let Some(task) = self.find_task_mut(id) {
                    *task = saved;
                }
                Ok(())
            }
            Err(err) => {
                if let Some(task) = self.find_task_mut(id) {
                    task.memo = previous;
                }
                Err(err)
            }
        }
    }

    pub fn find_task(&self, id: &str) -> Option<&Task> {
        self.detail
            .as_ref()?
            .tasks_by_phase
            .iter()
            .flat_map(|p| p.tasks.iter())
            .find(|t| t.id == id)
    }

    fn find_task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.detail
            .as_mut()?
            .tasks_by_phase
            .iter_mut()
            .flat_map(|p| p.tasks.iter_mut())
            .find(|t| t.id == id)
    }

    // ----- checklist -----

    pub fn refresh_checklist(&mut self) -> Result<(), ApiError> {
        let id = self.opened_id()?;
        let items = self.backend.checklist(&id)?;
        if let Some(detail) = self.detail.as_mut() {
            detail.checklist = items;
        }
        Ok(())
    }

    pub fn create_checklist_item(&mut self, input: &ChecklistItemCreate) -> Result<(), ApiError> {
        self.backend.create_checklist_item(input)?;
        self.refresh_checklist()
    }

    pub fn update_checklist_item(
        &mut self,
        id: &str,
        input: &ChecklistItemUpdate,
    ) -> Result<(), ApiError> {
        let updated = self.backend.update_checklist_item(id, input)?;
        self.merge_checklist_item(updated);
        Ok(())
    }

    pub fn upload_checklist_file(&mut self, id: &str, path: &Path) -> Result<(), ApiError> {
        let updated = self.backend.upload_checklist_file(id, path)?;
        self.merge_checklist_item(updated);
        Ok(())
    }

    pub fn delete_checklist_file(&mut self, id: &str, filename: &str) -> Result<(), ApiError> {
        let updated = self.backend.delete_checklist_file(id, filename)?;
        self.merge_checklist_item(updated);
        Ok(())
    }

    fn merge_checklist_item(&mut self, updated: ChecklistItem) {
        if let Some(detail) = self.detail.as_mut()
            && let Some(slot) = detail.checklist.iter_mut().find(|i| i.id == updated.id)
        {
            *slot = updated;
        }
    }

    // ----- rejections -----

    pub fn refresh_rejections(&mut self) -> Result<(), ApiError> {
        let id = self.opened_id()?;
        let rejections = self.backend.rejections(&id)?;
        if let Some(detail) = self.detail.as_mut() {
            detail.rejections = rejections;
        }
        Ok(())
    }

    pub fn create_rejection(&mut self, input: &RejectionCreate) -> Result<(), ApiError> {
        self.backend.create_rejection(input)?;
        self.refresh_rejections()
    }

    pub fn update_rejection(
        &mut self,
        id: &str,
        input: &RejectionUpdate,
    ) -> Result<(), ApiError> {
        let updated = self.backend.update_rejection(id, input)?;
        if let Some(detail) = self.detail.as_mut()
            && let Some(slot) = detail.rejections.iter_mut().find(|r| r.id == updated.id)
        {
            *slot = updated;
        }
        Ok(())
    }

    pub fn analyze_rejection(
        &self,
        input: &AiAnalysisRequest,
    ) -> Result<AiAnalysisResponse, ApiError> {
        self.backend.analyze_rejection(input)
    }

    // ----- AI assistant -----

    pub fn ask_assistant(&mut self, message: &str) -> Result<(), ApiError> {
        let id = self.opened_id()?;
        let exchange = self.backend.ai_chat(&id, message)?;
        if let Some(detail) = self.detail.as_mut() {
            detail.last_exchange = Some(exchange);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChecklistStatus, Platform, Priority, ProjectStatus};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    /// Minimal server double: projects and tasks in memory, UUID-free
    /// sequential ids, with a switch to make memo saves fail.
    #[derive(Default)]
    struct FakeBackend {
        state: RefCell<FakeState>,
    }

    #[derive(Default)]
    struct FakeState {
        projects: Vec<Project>,
        tasks: Vec<Task>,
        checklist: Vec<ChecklistItem>,
        rejections: Vec<Rejection>,
        next_id: u32,
        fail_memo: bool,
    }

    impl FakeBackend {
        fn next_id(&self, prefix: &str) -> String {
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            format!("{}{}", prefix, state.next_id)
        }

        fn seed_project(&self, id: &str) {
            self.state.borrow_mut().projects.push(Project {
                id: id.to_string(),
                name: format!("project {}", id),
                platform: Platform::Both,
                description: None,
                status: ProjectStatus::Active,
                start_date: None,
                publish_date: None,
                created_at: Utc::now(),
                updated_at: None,
            });
        }

        fn seed_task(&self, id: &str, project_id: &str, phase_number: i64, completed: bool) {
            self.state.borrow_mut().tasks.push(Task {
                id: id.to_string(),
                project_id: project_id.to_string(),
                title: format!("task {}", id),
                description: None,
                phase: format!("phase {}", phase_number),
                phase_number: Some(phase_number),
                completed,
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
                created_at: None,
            });
        }
    }

    impl Backend for FakeBackend {
        fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
            Ok(self.state.borrow().projects.clone())
        }

        fn create_project(&self, input: &ProjectCreate) -> Result<Project, ApiError> {
            let project = Project {
                id: self.next_id("p"),
                name: input.name.clone(),
                platform: input.platform,
                description: input.description.clone(),
                status: ProjectStatus::Active,
                start_date: input.start_date,
                publish_date: input.publish_date,
                created_at: Utc::now(),
                updated_at: None,
            };
            self.state.borrow_mut().projects.push(project.clone());
            Ok(project)
        }

        fn get_project(&self, id: &str) -> Result<Project, ApiError> {
            self.state
                .borrow()
                .projects
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))
        }

        fn update_project(&self, id: &str, input: &ProjectUpdate) -> Result<Project, ApiError> {
            let mut state = self.state.borrow_mut();
            let project = state
                .projects
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;
            if let Some(name) = &input.name {
                project.name = name.clone();
            }
            if let Some(status) = input.status {
                project.status = status;
            }
            Ok(project.clone())
        }

        fn delete_project(&self, id: &str) -> Result<(), ApiError> {
            let mut state = self.state.borrow_mut();
            let before = state.projects.len();
            state.projects.retain(|p| p.id != id);
            if state.projects.len() == before {
                return Err(ApiError::NotFound("Project not found".to_string()));
            }
            // cascade
            state.tasks.retain(|t| t.project_id != id);
            state.checklist.retain(|i| i.project_id != id);
            state.rejections.retain(|r| r.project_id != id);
            Ok(())
        }

        fn update_schedule(
            &self,
            id: &str,
            start_date: Option<DateTime<Utc>>,
            publish_date: Option<DateTime<Utc>>,
        ) -> Result<Project, ApiError> {
            let mut state = self.state.borrow_mut();
            let project = state
                .projects
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;
            project.start_date = start_date;
            project.publish_date = publish_date;
            Ok(project.clone())
        }

        fn generate_default_tasks(&self, _id: &str) -> Result<(), ApiError> {
            Ok(())
        }

        fn generate_default_checklist(&self, _id: &str) -> Result<(), ApiError> {
            Ok(())
        }

        fn project_tasks(&self, project_id: &str) -> Result<Vec<PhaseTasks>, ApiError> {
            let state = self.state.borrow();
            let mut groups: Vec<PhaseTasks> = Vec::new();
            let mut numbers: Vec<i64> = state
                .tasks
                .iter()
                .filter(|t| t.project_id == project_id)
                .map(|t| t.phase_number.unwrap_or(0))
                .collect();
            numbers.sort_unstable();
            numbers.dedup();
            for n in numbers {
                groups.push(PhaseTasks {
                    phase_number: n,
                    phase_name: format!("phase {}", n),
                    tasks: state
                        .tasks
                        .iter()
                        .filter(|t| {
                            t.project_id == project_id && t.phase_number.unwrap_or(0) == n
                        })
                        .cloned()
                        .collect(),
                });
            }
            Ok(groups)
        }

        fn phases(&self) -> Result<Vec<Phase>, ApiError> {
            Ok(Vec::new())
        }

        fn create_task(&self, input: &TaskCreate) -> Result<Task, ApiError> {
            let task = Task {
                id: self.next_id("t"),
                project_id: input.project_id.clone(),
                title: input.title.clone(),
                description: input.description.clone(),
                phase: input.phase.clone(),
                phase_number: input.phase_number,
                completed: false,
                due_date: input.due_date,
                priority: input.priority,
                memo: None,
                step_number: None,
                estimated_days: None,
                assigned_to: None,
                platform_specific: None,
                order: 0,
                is_default: false,
                completed_at: None,
                created_at: None,
            };
            self.state.borrow_mut().tasks.push(task.clone());
            Ok(task)
        }

        fn update_task(&self, id: &str, input: &TaskUpdate) -> Result<Task, ApiError> {
            let mut state = self.state.borrow_mut();
            let task = state
                .tasks
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
            if let Some(title) = &input.title {
                task.title = title.clone();
            }
            if let Some(priority) = input.priority {
                task.priority = priority;
            }
            Ok(task.clone())
        }

        fn delete_task(&self, id: &str) -> Result<(), ApiError> {
            self.state.borrow_mut().tasks.retain(|t| t.id != id);
            Ok(())
        }

        fn set_task_completed(&self, id: &str, completed: bool) -> Result<Task, ApiError> {
            let mut state = self.state.borrow_mut();
            let task = state
                .tasks
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
            task.completed = completed;
            task.completed_at = completed.then(Utc::now);
            Ok(task.clone())
        }

        fn set_task_memo(&self, id: &str, memo: &str) -> Result<Task, ApiError> {
            let mut state = self.state.borrow_mut();
            if state.fail_memo {
                return Err(ApiError::Api {
                    code: 500,
                    detail: "storage unavailable".to_string(),
                });
            }
            let task = state
                .tasks
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
            task.memo = Some(memo.to_string());
            Ok(task.clone())
        }

        fn checklist(&self, project_id: &str) -> Result<Vec<ChecklistItem>, ApiError> {
            Ok(self
                .state
                .borrow()
                .checklist
                .iter()
                .filter(|i| i.project_id == project_id)
                .cloned()
                .collect())
        }

        fn create_checklist_item(
            &self,
            input: &ChecklistItemCreate,
        ) -> Result<ChecklistItem, ApiError> {
            let item = ChecklistItem {
                id: self.next_id("c"),
                project_id: input.project_id.clone(),
                platform: input.platform,
                category: input.category.clone(),
                item_name: input.item_name.clone(),
                description: input.description.clone(),
                status: ChecklistStatus::Incomplete,
                value: None,
                notes: None,
                files: Vec::new(),
                order: None,
                created_at: None,
            };
            self.state.borrow_mut().checklist.push(item.clone());
            Ok(item)
        }

        fn update_checklist_item(
            &self,
            id: &str,
            input: &ChecklistItemUpdate,
        ) -> Result<ChecklistItem, ApiError> {
            let mut state = self.state.borrow_mut();
            let item = state
                .checklist
                .iter_mut()
                .find(|i| i.id == id)
                .ok_or_else(|| ApiError::NotFound("Checklist item not found".to_string()))?;
            if let Some(status) = input.status {
                item.status = status;
            }
            if let Some(value) = &input.value {
                item.value = Some(value.clone());
            }
            if let Some(notes) = &input.notes {
                item.notes = Some(notes.clone());
            }
            Ok(item.clone())
        }

        fn upload_checklist_file(
            &self,
            id: &str,
            _path: &Path,
        ) -> Result<ChecklistItem, ApiError> {
            let mut state = self.state.borrow_mut();
            let item = state
                .checklist
                .iter_mut()
                .find(|i| i.id == id)
                .ok_or_else(|| ApiError::NotFound("Checklist item not found".to_string()))?;
            item.files.push(crate::models::AttachedFile {
                filename: "stored.bin".to_string(),
                original_name: "upload.bin".to_string(),
                mime_type: None,
                file_size: None,
            });
            Ok(item.clone())
        }

        fn delete_checklist_file(
            &self,
            id: &str,
            filename: &str,
        ) -> Result<ChecklistItem, ApiError> {
            let mut state = self.state.borrow_mut();
            let item = state
                .checklist
                .iter_mut()
                .find(|i| i.id == id)
                .ok_or_else(|| ApiError::NotFound("Checklist item not found".to_string()))?;
            item.files.retain(|f| f.filename != filename);
            Ok(item.clone())
        }

        fn rejections(&self, project_id: &str) -> Result<Vec<Rejection>, ApiError> {
            Ok(self
                .state
                .borrow()
                .rejections
                .iter()
                .filter(|r| r.project_id == project_id)
                .cloned()
                .collect())
        }

        fn create_rejection(&self, input: &RejectionCreate) -> Result<Rejection, ApiError> {
            let rejection = Rejection {
                id: self.next_id("r"),
                project_id: input.project_id.clone(),
                platform: input.platform,
                reason: input.reason.clone(),
                rejection_date: Some(Utc::now()),
                status: crate::models::RejectionStatus::Open,
                ai_analysis: Some("analysis".to_string()),
                action_plan: Some("plan".to_string()),
                created_at: None,
            };
            self.state.borrow_mut().rejections.push(rejection.clone());
            Ok(rejection)
        }

        fn update_rejection(
            &self,
            id: &str,
            input: &RejectionUpdate,
        ) -> Result<Rejection, ApiError> {
            let mut state = self.state.borrow_mut();
            let rejection = state
                .rejections
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| ApiError::NotFound("Rejection not found".to_string()))?;
            if let Some(status) = input.status {
                rejection.status = status;
            }
            if let Some(plan) = &input.action_plan {
                rejection.action_plan = Some(plan.clone());
            }
            Ok(rejection.clone())
        }

        fn ai_chat(&self, project_id: &str, message: &str) -> Result<AiExchange, ApiError> {
            Ok(AiExchange {
                project_id: project_id.to_string(),
                user_message: message.to_string(),
                ai_response: format!("echo: {}", message),
                timestamp: Some(Utc::now()),
            })
        }

        fn analyze_rejection(
            &self,
            input: &AiAnalysisRequest,
        ) -> Result<AiAnalysisResponse, ApiError> {
            Ok(AiAnalysisResponse {
                platform: input.platform,
                rejection_reason: input.rejection_reason.clone(),
                analysis: "analysis".to_string(),
            })
        }
    }

    fn store_with(backend: FakeBackend) -> Store {
        Store::new(Box::new(backend))
    }

    #[test]
    fn created_project_defaults_to_active_and_joins_the_list() {
        let mut store = store_with(FakeBackend::default());
        let project = store
            .create_project(&ProjectCreate {
                name: "MyApp".to_string(),
                platform: Platform::Ios,
                description: None,
                start_date: None,
                publish_date: None,
                auto_generate_tasks: true,
            })
            .unwrap();
        assert_eq!(project.status, ProjectStatus::Active);
        assert!(!project.id.is_empty());
        assert_eq!(store.projects.len(), 1);
        assert_eq!(store.projects[0].name, "MyApp");
    }

    #[test]
    fn deleting_a_project_removes_it_and_closes_the_detail() {
        let backend = FakeBackend::default();
        backend.seed_project("p1");
        let mut store = store_with(backend);
        store.load_projects().unwrap();
        store.open_project("p1").unwrap();
        assert!(store.detail.is_some());

        store.delete_project("p1").unwrap();
        assert!(store.projects.is_empty());
        assert!(store.detail.is_none());
    }

    #[test]
    fn opening_a_missing_project_is_not_found() {
        let mut store = store_with(FakeBackend::default());
        assert!(matches!(
            store.open_project("nope"),
            Err(ApiError::NotFound(_))
        ));
        assert!(store.detail.is_none());
    }

    #[test]
    fn toggling_a_task_moves_the_phase_aggregate_by_one() {
        let backend = FakeBackend::default();
        backend.seed_project("p1");
        backend.seed_task("t1", "p1", 1, false);
        backend.seed_task("t2", "p1", 1, false);
        backend.seed_task("t3", "p1", 2, true);
        let mut store = store_with(backend);
        store.open_project("p1").unwrap();

        let before =
            crate::progress::overall_progress(&store.detail.as_ref().unwrap().tasks_by_phase);
        store.toggle_task("t1").unwrap();
        let after =
            crate::progress::overall_progress(&store.detail.as_ref().unwrap().tasks_by_phase);
        assert_eq!(after.completed, before.completed + 1);
        assert_eq!(after.total, before.total);

        // toggling back undoes it
        store.toggle_task("t1").unwrap();
        let reverted =
            crate::progress::overall_progress(&store.detail.as_ref().unwrap().tasks_by_phase);
        assert_eq!(reverted.completed, before.completed);
    }

    #[test]
    fn memo_save_applies_optimistically() {
        let backend = FakeBackend::default();
        backend.seed_project("p1");
        backend.seed_task("t1", "p1", 1, false);
        let mut store = store_with(backend);
        store.open_project("p1").unwrap();

        store.save_memo("t1", "first note").unwrap();
        assert_eq!(
            store.find_task("t1").unwrap().memo.as_deref(),
            Some("first note")
        );
    }

    #[test]
    fn failed_memo_save_rolls_back_to_previous_value() {
        let backend = FakeBackend::default();
        backend.seed_project("p1");
        backend.seed_task("t1", "p1", 1, false);
        backend.state.borrow_mut().tasks[0].memo = Some("kept".to_string());
        backend.state.borrow_mut().fail_memo = true;
        let mut store = store_with(backend);
        store.open_project("p1").unwrap();

        let result = store.save_memo("t1", "lost update");
        assert!(matches!(result, Err(ApiError::Api { .. })));
        assert_eq!(store.find_task("t1").unwrap().memo.as_deref(), Some("kept"));
    }

    #[test]
    fn checklist_update_merges_the_returned_item() {
        let backend = FakeBackend::default();
        backend.seed_project("p1");
        let mut store = store_with(backend);
        store.open_project("p1").unwrap();
        store
            .create_checklist_item(&ChecklistItemCreate {
                project_id: "p1".to_string(),
                platform: Platform::Ios,
                category: "assets".to_string(),
                item_name: "App icon".to_string(),
                description: None,
            })
            .unwrap();
        let id = store.detail.as_ref().unwrap().checklist[0].id.clone();

        store
            .update_checklist_item(
                &id,
                &ChecklistItemUpdate {
                    status: Some(ChecklistStatus::Completed),
                    ..Default::default()
                },
            )
            .unwrap();
        let item = &store.detail.as_ref().unwrap().checklist[0];
        assert!(item.is_completed());
    }

    #[test]
    fn assistant_exchange_replaces_the_previous_one() {
        let backend = FakeBackend::default();
        backend.seed_project("p1");
        let mut store = store_with(backend);
        store.open_project("p1").unwrap();

        store.ask_assistant("how do I submit?").unwrap();
        store.ask_assistant("what about screenshots?").unwrap();
        let exchange = store.detail.as_ref().unwrap().last_exchange.clone().unwrap();
        assert_eq!(exchange.user_message, "what about screenshots?");
        assert_eq!(exchange.ai_response, "echo: what about screenshots?");
    }
}
