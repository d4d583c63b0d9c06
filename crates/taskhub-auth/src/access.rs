//! Role and ownership checks for tasks, projects, and events.
//!
//! Admins pass every check. Regular users act on what they own: tasks
//! they created or are assigned to, projects they own, events they
//! created. The service layer calls these before touching data.

use uuid::Uuid;

use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;
use taskhub_entity::event::model::CalendarEvent;
use taskhub_entity::project::model::Project;
use taskhub_entity::task::model::Task;
use taskhub_entity::user::{User, UserRole};

/// Access decisions for TaskHub resources.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy;

impl AccessPolicy {
    /// Creates a new policy instance.
    pub fn new() -> Self {
        Self
    }

    /// Requires the admin role.
    pub fn require_admin(&self, user: &User) -> AppResult<()> {
        if user.role == UserRole::Admin {
            Ok(())
        } else {
            Err(AppError::authorization("Administrator role required"))
        }
    }

    /// Requires that the actor is the named user or an admin.
    pub fn require_self_or_admin(&self, actor: &User, user_id: Uuid) -> AppResult<()> {
        if actor.id == user_id || actor.role == UserRole::Admin {
            Ok(())
        } else {
            Err(AppError::authorization(
                "You may only manage your own account",
            ))
        }
    }

    /// Whether the user may see a task: admins see everything, others
    /// see tasks they created or are assigned to.
    pub fn can_view_task(&self, user: &User, task: &Task) -> bool {
        user.role == UserRole::Admin || task.involves(user.id)
    }

    /// Requires view access to a task.
    pub fn require_task_view(&self, user: &User, task: &Task) -> AppResult<()> {
        if self.can_view_task(user, task) {
            Ok(())
        } else {
            Err(AppError::authorization("You do not have access to this task"))
        }
    }

    /// Whether the user may edit or delete a task: admins and the creator.
    pub fn can_manage_task(&self, user: &User, task: &Task) -> bool {
        user.role == UserRole::Admin || task.creator_id == user.id
    }

    /// Requires edit/delete access to a task.
    pub fn require_task_manage(&self, user: &User, task: &Task) -> AppResult<()> {
        if self.can_manage_task(user, task) {
            Ok(())
        } else {
            Err(AppError::authorization(
                "Only the task creator or an administrator may modify this task",
            ))
        }
    }

    /// Requires the right to move a task through its lifecycle. The
    /// assignee may transition status even when they cannot edit fields.
    pub fn require_task_transition(&self, user: &User, task: &Task) -> AppResult<()> {
        if self.can_manage_task(user, task) || task.assignee_id == Some(user.id) {
            Ok(())
        } else {
            Err(AppError::authorization(
                "Only the creator, assignee, or an administrator may change task status",
            ))
        }
    }

    /// Whether the user may modify a project: admins and the owner.
    pub fn can_manage_project(&self, user: &User, project: &Project) -> bool {
        user.role == UserRole::Admin || project.owner_id == user.id
    }

    /// Requires edit/delete access to a project.
    pub fn require_project_manage(&self, user: &User, project: &Project) -> AppResult<()> {
        if self.can_manage_project(user, project) {
            Ok(())
        } else {
            Err(AppError::authorization(
                "Only the project owner or an administrator may modify this project",
            ))
        }
    }

    /// Requires edit/delete access to a calendar event. Events are
    /// visible to everyone, but only their creator or an admin may
    /// change them.
    pub fn require_event_manage(&self, user: &User, event: &CalendarEvent) -> AppResult<()> {
        if user.role == UserRole::Admin || event.created_by == user.id {
            Ok(())
        } else {
            Err(AppError::authorization(
                "Only the event creator or an administrator may modify this event",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use taskhub_entity::task::{TaskPriority, TaskStatus};
    use taskhub_entity::user::UserStatus;

    use super::*;

    fn user_with_role(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            username: "u".to_string(),
            email: "u@example.com".to_string(),
            password_hash: "h".to_string(),
            display_name: None,
            avatar_path: None,
            role,
            status: UserStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        }
    }

    fn task_created_by(creator_id: Uuid) -> Task {
        Task {
            id: Uuid::new_v4(),
            project_id: None,
            title: "t".to_string(),
            description: None,
            status: TaskStatus::Pending,
            priority: TaskPriority::Medium,
            assignee_id: None,
            creator_id,
            due_date: None,
            completed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_admin_passes_every_check() {
        let policy = AccessPolicy::new();
        let admin = user_with_role(UserRole::Admin);
        let task = task_created_by(Uuid::new_v4());

        assert!(policy.require_admin(&admin).is_ok());
        assert!(policy.require_task_view(&admin, &task).is_ok());
        assert!(policy.require_task_manage(&admin, &task).is_ok());
        assert!(policy.require_task_transition(&admin, &task).is_ok());
    }

    #[test]
    fn test_uninvolved_user_cannot_see_task() {
        let policy = AccessPolicy::new();
        let user = user_with_role(UserRole::User);
        let task = task_created_by(Uuid::new_v4());

        assert!(policy.require_task_view(&user, &task).is_err());
        assert!(policy.require_admin(&user).is_err());
    }

    #[test]
    fn test_assignee_transitions_but_does_not_edit() {
        let policy = AccessPolicy::new();
        let user = user_with_role(UserRole::User);
        let mut task = task_created_by(Uuid::new_v4());
        task.assignee_id = Some(user.id);

        assert!(policy.require_task_view(&user, &task).is_ok());
        assert!(policy.require_task_transition(&user, &task).is_ok());
        assert!(policy.require_task_manage(&user, &task).is_err());
    }

    #[test]
    fn test_creator_manages_own_task() {
        let policy = AccessPolicy::new();
        let user = user_with_role(UserRole::User);
        let task = task_created_by(user.id);

        assert!(policy.require_task_manage(&user, &task).is_ok());
    }

    #[test]
    fn test_self_or_admin() {
        let policy = AccessPolicy::new();
        let user = user_with_role(UserRole::User);

        assert!(policy.require_self_or_admin(&user, user.id).is_ok());
        assert!(policy.require_self_or_admin(&user, Uuid::new_v4()).is_err());
    }
}
