/// Project stages and their tasks
///
/// Stages are an ordered plan for a project ("Discovery", "MVP", "Pilot");
/// each stage holds a checklist of tasks that may be assigned to a profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectStage {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StageTask {
    pub id: Uuid,
    pub stage_id: Uuid,
    pub description: String,
    pub completed: bool,
    pub assignee_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stage with its tasks, as returned by the project plan endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageWithTasks {
    #[serde(flatten)]
    pub stage: ProjectStage,
    pub tasks: Vec<StageTask>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStageTask {
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub assignee_id: Option<Uuid>,
}

const TASK_COLUMNS: &str = "id, stage_id, description, completed, assignee_id, created_at, updated_at";

impl ProjectStage {
    /// Appends a stage; without an explicit position it goes last
    pub async fn create(
        pool: &PgPool,
        project_id: Uuid,
        name: &str,
        position: Option<i32>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ProjectStage>(
            r#"
            INSERT INTO project_stages (project_id, name, position)
            VALUES (
                $1, $2,
                COALESCE($3, (SELECT COALESCE(MAX(position) + 1, 0)
                              FROM project_stages WHERE project_id = $1))
            )
            RETURNING id, project_id, name, position, created_at
            "#,
        )
        .bind(project_id)
        .bind(name.trim())
        .bind(position)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProjectStage>(
            "SELECT id, project_id, name, position, created_at FROM project_stages WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// The full plan: stages in order, each with its tasks
    pub async fn list_with_tasks(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<StageWithTasks>, sqlx::Error> {
        let stages = sqlx::query_as::<_, ProjectStage>(
            r#"
            SELECT id, project_id, name, position, created_at
            FROM project_stages
            WHERE project_id = $1
            ORDER BY position ASC, created_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        let tasks = sqlx::query_as::<_, StageTask>(
            r#"
            SELECT t.id, t.stage_id, t.description, t.completed, t.assignee_id,
                   t.created_at, t.updated_at
            FROM stage_tasks t
            JOIN project_stages s ON s.id = t.stage_id
            WHERE s.project_id = $1
            ORDER BY t.created_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(group_tasks(stages, tasks))
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM project_stages WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl StageTask {
    pub async fn create(
        pool: &PgPool,
        stage_id: Uuid,
        description: &str,
        assignee_id: Option<Uuid>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, StageTask>(&format!(
            r#"
            INSERT INTO stage_tasks (stage_id, description, assignee_id)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            TASK_COLUMNS
        ))
        .bind(stage_id)
        .bind(description.trim())
        .bind(assignee_id)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, StageTask>(&format!(
            "SELECT {} FROM stage_tasks WHERE id = $1",
            TASK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateStageTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, StageTask>(&format!(
            r#"
            UPDATE stage_tasks
            SET description = COALESCE($2, description),
                completed = COALESCE($3, completed),
                assignee_id = COALESCE($4, assignee_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            TASK_COLUMNS
        ))
        .bind(id)
        .bind(data.description.as_deref().map(str::trim))
        .bind(data.completed)
        .bind(data.assignee_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM stage_tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Project the task belongs to, for permission checks
    pub async fn project_id(pool: &PgPool, id: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT s.project_id
            FROM stage_tasks t
            JOIN project_stages s ON s.id = t.stage_id
            WHERE t.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}

/// Attaches tasks to their stage, keeping both orders
fn group_tasks(stages: Vec<ProjectStage>, tasks: Vec<StageTask>) -> Vec<StageWithTasks> {
    let mut plan: Vec<StageWithTasks> = stages
        .into_iter()
        .map(|stage| StageWithTasks {
            stage,
            tasks: Vec::new(),
        })
        .collect();

    for task in tasks {
        if let Some(entry) = plan.iter_mut().find(|s| s.stage.id == task.stage_id) {
            entry.tasks.push(task);
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(position: i32) -> ProjectStage {
        ProjectStage {
            id: Uuid::new_v4(),
            project_id: Uuid::nil(),
            name: format!("Stage {}", position),
            position,
            created_at: Utc::now(),
        }
    }

    fn task(stage_id: Uuid, description: &str) -> StageTask {
        StageTask {
            id: Uuid::new_v4(),
            stage_id,
            description: description.to_string(),
            completed: false,
            assignee_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_group_tasks_by_stage() {
        let discovery = stage(0);
        let mvp = stage(1);
        let tasks = vec![
            task(mvp.id, "Build API"),
            task(discovery.id, "Interview users"),
            task(mvp.id, "Ship"),
            task(Uuid::new_v4(), "Orphan"),
        ];

        let plan = group_tasks(vec![discovery.clone(), mvp.clone()], tasks);

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].stage.id, discovery.id);
        assert_eq!(plan[0].tasks.len(), 1);
        assert_eq!(plan[1].tasks.len(), 2);
        assert_eq!(plan[1].tasks[0].description, "Build API");
        assert_eq!(plan[1].tasks[1].description, "Ship");
    }
}
