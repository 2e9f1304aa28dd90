use chrono::NaiveDate;

use crate::models::{ChecklistItem, PhaseTasks, Platform};

/// Completion counts for a collection of tasks or checklist items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub percent: u32,
}

/// Count completion over any sequence of done-flags.
/// Empty input yields 0/0 at 0%, never a division by zero.
pub fn compute_progress<I>(items: I) -> Progress
where
    I: IntoIterator<Item = bool>,
{
    let mut completed = 0usize;
    let mut total = 0usize;
    for done in items {
        total += 1;
        if done {
            completed += 1;
        }
    }
    let percent = if total > 0 {
        ((completed as f64 / total as f64) * 100.0).round() as u32
    } else {
        0
    };
    Progress { completed, total, percent }
}

/// Urgency bucket for a task's due date, most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    Overdue,
    Today,
    /// Due within 3 days; carries the remaining day count.
    Soon(i64),
    /// Due within a week (4..=7 days out).
    Week(i64),
    None,
}

impl DueStatus {
    /// Short badge text, or None when no badge should be shown.
    pub fn badge(self) -> Option<String> {
        match self {
            DueStatus::Overdue => Some("overdue".to_string()),
            DueStatus::Today => Some("due today".to_string()),
            DueStatus::Soon(d) => Some(format!("due in {}d", d)),
            DueStatus::Week(d) => Some(format!("due in {}d", d)),
            DueStatus::None => None,
        }
    }
}

/// Bucket a due date relative to `today`. Both dates are calendar days
/// already stripped of time-of-day, so the difference is a whole number
/// of days and immune to hour/timezone drift.
pub fn classify_due_date(due: Option<NaiveDate>, today: NaiveDate) -> DueStatus {
    let Some(due) = due else {
        return DueStatus::None;
    };
    let diff_days = (due - today).num_days();
    match diff_days {
        d if d < 0 => DueStatus::Overdue,
        0 => DueStatus::Today,
        1..=3 => DueStatus::Soon(diff_days),
        4..=7 => DueStatus::Week(diff_days),
        _ => DueStatus::None,
    }
}

/// Checklist items for one platform, with their aggregate progress.
#[derive(Debug, Clone)]
pub struct ChecklistGroup {
    pub platform: Platform,
    pub items: Vec<ChecklistItem>,
    pub progress: Progress,
}

/// Partition checklist items by platform for display. Items are ordered
/// by their explicit `order` field (missing treated as 0, stable within
/// equal keys). A "Both" project always yields both platform groups,
/// even when one of them is empty.
pub fn group_checklist(items: &[ChecklistItem], project_platform: Platform) -> Vec<ChecklistGroup> {
    project_platform
        .stores()
        .into_iter()
        .map(|platform| {
            let mut group: Vec<ChecklistItem> = items
                .iter()
                .filter(|item| item.platform == platform)
                .cloned()
                .collect();
            group.sort_by_key(|item| item.order.unwrap_or(0));
            let progress = compute_progress(group.iter().map(|i| i.is_completed()));
            ChecklistGroup { platform, items: group, progress }
        })
        .collect()
}

/// Per-phase completion, paired with the phase it describes.
#[derive(Debug, Clone)]
pub struct PhaseProgress {
    pub phase_number: i64,
    pub phase_name: String,
    pub progress: Progress,
}

/// Compute per-phase completion in ascending phase_number order.
pub fn phase_progress(phases: &[PhaseTasks]) -> Vec<PhaseProgress> {
    let mut sorted: Vec<&PhaseTasks> = phases.iter().collect();
    sorted.sort_by_key(|p| p.phase_number);
    sorted
        .into_iter()
        .map(|p| PhaseProgress {
            phase_number: p.phase_number,
            phase_name: p.phase_name.clone(),
            progress: compute_progress(p.tasks.iter().map(|t| t.completed)),
        })
        .collect()
}

/// Completion across all tasks of all phases.
pub fn overall_progress(phases: &[PhaseTasks]) -> Progress {
    compute_progress(
        phases
            .iter()
            .flat_map(|p| p.tasks.iter())
            .map(|t| t.completed),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChecklistStatus, Priority, Task};
    use pretty_assertions::assert_eq;

    fn task(id: &str, completed: bool) -> Task {
        Task {
            id: id.to_string(),
            project_id: "p1".to_string(),
            title: format!("task {}", id),
            description: None,
            phase: "prep".to_string(),
            phase_number: Some(1),
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
        }
    }

    fn item(id: &str, platform: Platform, done: bool, order: Option<i64>) -> ChecklistItem {
        ChecklistItem {
            id: id.to_string(),
            project_id: "p1".to_string(),
            platform,
            category: "general".to_string(),
            item_name: format!("item {}", id),
            description: None,
            status: if done { ChecklistStatus::Completed } else { ChecklistStatus::Incomplete },
            value: None,
            notes: None,
            files: Vec::new(),
            order,
            created_at: None,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_progress_is_all_zero() {
        assert_eq!(
            compute_progress(std::iter::empty()),
            Progress { completed: 0, total: 0, percent: 0 }
        );
    }

    #[test]
    fn percent_rounds_to_nearest() {
        // 1/3 -> 33, 2/3 -> 67
        assert_eq!(compute_progress([true, false, false]).percent, 33);
        assert_eq!(compute_progress([true, true, false]).percent, 67);
        assert_eq!(compute_progress([true, true]).percent, 100);
    }

    #[test]
    fn percent_stays_in_bounds() {
        for n in 1..=10usize {
            for done in 0..=n {
                let flags = (0..n).map(|i| i < done);
                let p = compute_progress(flags);
                assert!(p.percent <= 100);
                assert_eq!(p.completed, done);
                assert_eq!(p.total, n);
            }
        }
    }

    #[test]
    fn due_date_boundaries() {
        let today = day(2026, 8, 25);
        assert_eq!(classify_due_date(None, today), DueStatus::None);
        assert_eq!(classify_due_date(Some(day(2026, 8, 24)), today), DueStatus::Overdue);
        assert_eq!(classify_due_date(Some(day(2026, 8, 25)), today), DueStatus::Today);
        assert_eq!(classify_due_date(Some(day(2026, 8, 26)), today), DueStatus::Soon(1));
        assert_eq!(classify_due_date(Some(day(2026, 8, 28)), today), DueStatus::Soon(3));
        assert_eq!(classify_due_date(Some(day(2026, 8, 29)), today), DueStatus::Week(4));
        assert_eq!(classify_due_date(Some(day(2026, 9, 1)), today), DueStatus::Week(7));
        assert_eq!(classify_due_date(Some(day(2026, 9, 2)), today), DueStatus::None);
    }

    #[test]
    fn due_date_crosses_month_end() {
        let today = day(2026, 8, 31);
        assert_eq!(classify_due_date(Some(day(2026, 9, 2)), today), DueStatus::Soon(2));
    }

    #[test]
    fn both_project_keeps_empty_platform_group() {
        let items = vec![
            item("a", Platform::Ios, true, Some(2)),
            item("b", Platform::Ios, false, Some(1)),
        ];
        let groups = group_checklist(&items, Platform::Both);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].platform, Platform::Ios);
        assert_eq!(groups[0].items.len(), 2);
        // Sorted by order, not input position
        assert_eq!(groups[0].items[0].id, "b");
        assert_eq!(groups[0].progress, Progress { completed: 1, total: 2, percent: 50 });
        // Android group present but empty
        assert_eq!(groups[1].platform, Platform::Android);
        assert!(groups[1].items.is_empty());
        assert_eq!(groups[1].progress.percent, 0);
    }

    #[test]
    fn single_platform_project_has_one_group() {
        let items = vec![item("a", Platform::Android, true, None)];
        let groups = group_checklist(&items, Platform::Android);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].platform, Platform::Android);
    }

    #[test]
    fn missing_order_sorts_first() {
        let items = vec![
            item("late", Platform::Ios, false, Some(5)),
            item("unordered", Platform::Ios, false, None),
        ];
        let groups = group_checklist(&items, Platform::Ios);
        assert_eq!(groups[0].items[0].id, "unordered");
    }

    #[test]
    fn phases_aggregate_in_ascending_order() {
        let phases = vec![
            PhaseTasks {
                phase_number: 3,
                phase_name: "submission".to_string(),
                tasks: vec![task("s1", false)],
            },
            PhaseTasks {
                phase_number: 1,
                phase_name: "preparation".to_string(),
                tasks: vec![task("p1", true), task("p2", true)],
            },
        ];
        let per_phase = phase_progress(&phases);
        assert_eq!(per_phase[0].phase_number, 1);
        assert_eq!(per_phase[0].progress, Progress { completed: 2, total: 2, percent: 100 });
        assert_eq!(per_phase[1].phase_number, 3);
        assert_eq!(overall_progress(&phases), Progress { completed: 2, total: 3, percent: 67 });
    }

    #[test]
    fn completing_one_task_moves_aggregate_by_one() {
        let mut phases = vec![PhaseTasks {
            phase_number: 1,
            phase_name: "preparation".to_string(),
            tasks: vec![task("a", false), task("b", false), task("c", true)],
        }];
        let before = overall_progress(&phases);
        phases[0].tasks[0].completed = true;
        let after = overall_progress(&phases);
        assert_eq!(after.completed, before.completed + 1);
        assert_eq!(after.total, before.total);
    }
}
