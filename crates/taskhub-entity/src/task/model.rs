//! Task entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::priority::TaskPriority;
use super::status::TaskStatus;

/// A unit of work, optionally belonging to a project and assigned to a user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique task identifier.
    pub id: Uuid,
    /// Project this task belongs to (if any).
    pub project_id: Option<Uuid>,
    /// Short title.
    pub title: String,
    /// Longer description.
    pub description: Option<String>,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// Priority level.
    pub priority: TaskPriority,
    /// The user assigned to the task.
    pub assignee_id: Option<Uuid>,
    /// The user who created the task.
    pub creator_id: Uuid,
    /// When the task is due.
    pub due_date: Option<DateTime<Utc>>,
    /// When the task was completed (set by the status transition).
    pub completed_at: Option<DateTime<Utc>>,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
    /// When the task was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Check whether the task is past its due date and still open.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(due) => self.status.is_open() && due < now,
            None => false,
        }
    }

    /// Check whether the given user created or is assigned to this task.
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.creator_id == user_id || self.assignee_id == Some(user_id)
    }
}

/// Data required to create a new task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Project this task belongs to (optional).
    pub project_id: Option<Uuid>,
    /// Short title.
    pub title: String,
    /// Longer description (optional).
    pub description: Option<String>,
    /// Priority level.
    pub priority: TaskPriority,
    /// Assignee (optional).
    pub assignee_id: Option<Uuid>,
    /// Creating user.
    pub creator_id: Uuid,
    /// Due date (optional).
    pub due_date: Option<DateTime<Utc>>,
}

/// Data for updating an existing task. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New priority.
    pub priority: Option<TaskPriority>,
    /// New assignee. `Some(None)` clears the assignment.
    pub assignee_id: Option<Option<Uuid>>,
    /// New due date. `Some(None)` clears the due date.
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// New project. `Some(None)` detaches the task from its project.
    pub project_id: Option<Option<Uuid>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_task(status: TaskStatus, due_in_hours: i64) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            project_id: None,
            title: "sample".to_string(),
            description: None,
            status,
            priority: TaskPriority::Medium,
            assignee_id: None,
            creator_id: Uuid::new_v4(),
            due_date: Some(now + Duration::hours(due_in_hours)),
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_overdue_only_when_open() {
        let now = Utc::now();
        assert!(sample_task(TaskStatus::Pending, -2).is_overdue(now));
        assert!(!sample_task(TaskStatus::Completed, -2).is_overdue(now));
        assert!(!sample_task(TaskStatus::Pending, 2).is_overdue(now));
    }

    #[test]
    fn test_involves() {
        let mut task = sample_task(TaskStatus::Pending, 1);
        let other = Uuid::new_v4();
        assert!(task.involves(task.creator_id));
        assert!(!task.involves(other));
        task.assignee_id = Some(other);
        assert!(task.involves(other));
    }
}
