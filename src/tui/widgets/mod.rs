pub mod ai_chat;
pub mod checklist;
pub mod color;
pub mod confirm_delete;
pub mod editor;
pub mod form;
pub mod help;
pub mod markdown;
pub mod overview;
pub mod project_list;
pub mod rejection_list;
pub mod status_bar;
pub mod summary;
pub mod tabs;
pub mod task_board;
