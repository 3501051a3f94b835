use sqlx::{PgPool, Postgres, Transaction};

use super::models::{Project, ProjectWithTechnologies};

#[derive(Debug)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub featured: bool,
    pub technologies: Vec<String>,
}

/// Partial update; `None` fields keep their current value.
#[derive(Debug, Default)]
pub struct ProjectChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub featured: Option<bool>,
    pub technologies: Option<Vec<String>>,
}

const LIST_COLUMNS: &str = "p.id, p.user_id, p.title, p.description, p.github_url, p.live_url,
             p.featured, p.created_at,
             COALESCE(array_remove(array_agg(t.name), NULL), '{}') AS technologies";

pub async fn list_all(pool: &PgPool) -> Result<Vec<ProjectWithTechnologies>, sqlx::Error> {
    sqlx::query_as::<_, ProjectWithTechnologies>(&format!(
        "SELECT {LIST_COLUMNS}
         FROM projects p
         LEFT JOIN project_technologies pt ON p.id = pt.project_id
         LEFT JOIN technologies t ON pt.technology_id = t.id
         GROUP BY p.id
         ORDER BY p.featured DESC, p.created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

pub async fn list_featured(pool: &PgPool) -> Result<Vec<ProjectWithTechnologies>, sqlx::Error> {
    sqlx::query_as::<_, ProjectWithTechnologies>(&format!(
        "SELECT {LIST_COLUMNS}
         FROM projects p
         LEFT JOIN project_technologies pt ON p.id = pt.project_id
         LEFT JOIN technologies t ON pt.technology_id = t.id
         WHERE p.featured = true
         GROUP BY p.id
         ORDER BY p.created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

/// Insert a project and link its technologies in one transaction.
pub async fn create(
    pool: &PgPool,
    user_id: i64,
    input: &NewProject,
) -> Result<Project, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let project = sqlx::query_as::<_, Project>(
        "INSERT INTO projects (title, description, github_url, live_url, featured, user_id)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id, user_id, title, description, github_url, live_url, featured, created_at",
    )
    .bind(&input.title)
    .bind(&input.description)
    .bind(&input.github_url)
    .bind(&input.live_url)
    .bind(input.featured)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    link_technologies(&mut tx, project.id, &input.technologies).await?;

    tx.commit().await?;
    Ok(project)
}

/// Partial project update; replaces technology links when a list is given.
/// Returns `None` when the project does not exist or is not owned by the
/// caller.
pub async fn update(
    pool: &PgPool,
    user_id: i64,
    project_id: i64,
    changes: &ProjectChanges,
) -> Result<Option<Project>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let project = sqlx::query_as::<_, Project>(
        "UPDATE projects
         SET title = COALESCE($1, title),
             description = COALESCE($2, description),
             github_url = COALESCE($3, github_url),
             live_url = COALESCE($4, live_url),
             featured = COALESCE($5, featured)
         WHERE id = $6 AND user_id = $7
         RETURNING id, user_id, title, description, github_url, live_url, featured, created_at",
    )
    .bind(&changes.title)
    .bind(&changes.description)
    .bind(&changes.github_url)
    .bind(&changes.live_url)
    .bind(changes.featured)
    .bind(project_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(project) = project else {
        tx.rollback().await?;
        return Ok(None);
    };

    if let Some(technologies) = &changes.technologies {
        sqlx::query("DELETE FROM project_technologies WHERE project_id = $1")
            .bind(project.id)
            .execute(&mut *tx)
            .await?;
        link_technologies(&mut tx, project.id, technologies).await?;
    }

    tx.commit().await?;
    Ok(Some(project))
}

pub async fn delete(pool: &PgPool, user_id: i64, project_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND user_id = $2")
        .bind(project_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

async fn link_technologies(
    tx: &mut Transaction<'_, Postgres>,
    project_id: i64,
    technologies: &[String],
) -> Result<(), sqlx::Error> {
    for tech in technologies {
        // Upsert so technology names stay unique across projects
        let technology_id: i64 = sqlx::query_scalar(
            "INSERT INTO technologies (name)
             VALUES ($1)
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
             RETURNING id",
        )
        .bind(tech)
        .fetch_one(&mut **tx)
        .await?;

        sqlx::query(
            "INSERT INTO project_technologies (project_id, technology_id)
             VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(project_id)
        .bind(technology_id)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
