//! PostgreSQL-backed content store.
//!
//! List columns are JSONB so rows written by older clients (plain or
//! brace-wrapped strings) still load; they are coerced in the row conversions
//! below and nowhere else.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow, PgPool};
use std::time::{Duration, Instant};

use super::list::{RawList, TagList};
use super::models::{
    clean_image, BlogCategory, BlogPost, BlogPostPatch, ContentCounts, NewBlogPost, NewProject,
    NewSkillCategory, PostQuery, Project, ProjectOrder, ProjectPatch, ProjectStatus, Settings,
    SkillCategory, SkillCategoryPatch, Visibility,
};
use super::sanitize_html;
use super::store::{ContentStore, StoreError, StoreResult};

const PROJECT_COLUMNS: &str = "id, title, description, tech, status, featured, github, image";
const POST_COLUMNS: &str =
    "id, title, excerpt, content, category, read_time, image, published, created_at";
const SKILL_COLUMNS: &str = "id, category, items, display_order";

// ============================================================================
// Rows
// ============================================================================

#[derive(Debug, FromRow)]
struct ProjectRow {
    id: i64,
    title: String,
    description: String,
    tech: Json<RawList>,
    status: String,
    featured: bool,
    github: String,
    image: Option<String>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        let status = row.status.parse().unwrap_or_else(|_| {
            tracing::warn!(project_id = row.id, status = %row.status, "unknown project status");
            ProjectStatus::default()
        });
        Project {
            id: row.id,
            title: row.title,
            description: row.description,
            tech: TagList::from(row.tech.0),
            status,
            featured: row.featured,
            github: row.github,
            image: clean_image(row.image),
        }
    }
}

#[derive(Debug, FromRow)]
struct PostRow {
    id: i64,
    title: String,
    excerpt: String,
    content: String,
    category: String,
    read_time: String,
    image: Option<String>,
    published: bool,
    created_at: DateTime<Utc>,
}

impl From<PostRow> for BlogPost {
    fn from(row: PostRow) -> Self {
        let category = row.category.parse().unwrap_or_else(|_| {
            tracing::warn!(post_id = row.id, category = %row.category, "unknown blog category");
            BlogCategory::default()
        });
        BlogPost {
            id: row.id,
            title: row.title,
            excerpt: row.excerpt,
            content: row.content,
            category,
            read_time: row.read_time,
            image: clean_image(row.image),
            published: row.published,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct SkillRow {
    id: i64,
    category: String,
    items: Json<RawList>,
    display_order: i32,
}

impl From<SkillRow> for SkillCategory {
    fn from(row: SkillRow) -> Self {
        SkillCategory {
            id: row.id,
            category: row.category,
            items: TagList::from(row.items.0),
            order: row.display_order,
        }
    }
}

#[derive(Debug, FromRow)]
struct SettingsRow {
    profile_image: Option<String>,
    updated_at: DateTime<Utc>,
}

impl From<SettingsRow> for Settings {
    fn from(row: SettingsRow) -> Self {
        Settings {
            profile_image: clean_image(row.profile_image),
            updated_at: row.updated_at,
        }
    }
}

fn not_found_if_empty(rows_affected: u64, what: &'static str) -> StoreResult<()> {
    if rows_affected == 0 {
        Err(StoreError::NotFound(what))
    } else {
        Ok(())
    }
}

// ============================================================================
// Store
// ============================================================================

#[derive(Debug, Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn write_project(&self, project: &Project) -> StoreResult<Project> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            r#"
            UPDATE projects
            SET title = $1, description = $2, tech = $3, status = $4,
                featured = $5, github = $6, image = $7
            WHERE id = $8
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(&project.title)
        .bind(&project.description)
        .bind(Json(project.tech.as_slice()))
        .bind(project.status.label())
        .bind(project.featured)
        .bind(&project.github)
        .bind(&project.image)
        .bind(project.id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Project::from).ok_or(StoreError::NotFound("project"))
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn ping(&self) -> StoreResult<Duration> {
        let start = Instant::now();
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(start.elapsed())
    }

    async fn list_projects(&self, order: ProjectOrder) -> StoreResult<Vec<Project>> {
        let order_by = match order {
            ProjectOrder::FeaturedFirst => "featured DESC, id ASC",
            ProjectOrder::ById => "id ASC",
        };
        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY {order_by}"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Project::from).collect())
    }

    async fn get_project(&self, id: i64) -> StoreResult<Project> {
        sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Project::from)
        .ok_or(StoreError::NotFound("project"))
    }

    async fn insert_project(&self, new: NewProject) -> StoreResult<Project> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            r#"
            INSERT INTO projects (title, description, tech, status, featured, github, image)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(&new.title)
        .bind(&new.description)
        .bind(Json(new.tech.as_slice()))
        .bind(new.status.label())
        .bind(new.featured)
        .bind(&new.github)
        .bind(clean_image(new.image))
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn update_project(&self, id: i64, patch: ProjectPatch) -> StoreResult<Project> {
        let mut project = self.get_project(id).await?;
        patch.apply(&mut project);
        self.write_project(&project).await
    }

    async fn delete_project(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        not_found_if_empty(result.rows_affected(), "project")
    }

    async fn list_posts(&self, query: &PostQuery) -> StoreResult<Vec<BlogPost>> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM blog_posts
            WHERE ($1 = false OR published = true)
              AND ($2::TEXT IS NULL OR category = $2)
              AND ($3::BIGINT IS NULL OR id <> $3)
            ORDER BY created_at DESC, id DESC
            LIMIT $4
            "#
        ))
        .bind(query.visibility == Visibility::PublishedOnly)
        .bind(query.category.map(|c| c.label()))
        .bind(query.exclude_id)
        .bind(query.limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(BlogPost::from).collect())
    }

    async fn get_post(&self, id: i64, visibility: Visibility) -> StoreResult<BlogPost> {
        sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM blog_posts WHERE id = $1 AND ($2 = false OR published = true)"
        ))
        .bind(id)
        .bind(visibility == Visibility::PublishedOnly)
        .fetch_optional(&self.pool)
        .await?
        .map(BlogPost::from)
        .ok_or(StoreError::NotFound("blog post"))
    }

    async fn insert_post(&self, new: NewBlogPost) -> StoreResult<BlogPost> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            INSERT INTO blog_posts (title, excerpt, content, category, read_time, image, published, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, now())
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(&new.title)
        .bind(&new.excerpt)
        .bind(sanitize_html(&new.content))
        .bind(new.category.label())
        .bind(&new.read_time)
        .bind(clean_image(new.image))
        .bind(new.published)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn update_post(&self, id: i64, mut patch: BlogPostPatch) -> StoreResult<BlogPost> {
        let mut post = self.get_post(id, Visibility::All).await?;
        patch.content = patch.content.map(|html| sanitize_html(&html));
        patch.apply(&mut post);

        sqlx::query_as::<_, PostRow>(&format!(
            r#"
            UPDATE blog_posts
            SET title = $1, excerpt = $2, content = $3, category = $4,
                read_time = $5, image = $6, published = $7
            WHERE id = $8
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(&post.title)
        .bind(&post.excerpt)
        .bind(&post.content)
        .bind(post.category.label())
        .bind(&post.read_time)
        .bind(&post.image)
        .bind(post.published)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(BlogPost::from)
        .ok_or(StoreError::NotFound("blog post"))
    }

    async fn delete_post(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        not_found_if_empty(result.rows_affected(), "blog post")
    }

    async fn list_skills(&self) -> StoreResult<Vec<SkillCategory>> {
        let rows = sqlx::query_as::<_, SkillRow>(&format!(
            "SELECT {SKILL_COLUMNS} FROM skills ORDER BY display_order ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(SkillCategory::from).collect())
    }

    async fn get_skill(&self, id: i64) -> StoreResult<SkillCategory> {
        sqlx::query_as::<_, SkillRow>(&format!(
            "SELECT {SKILL_COLUMNS} FROM skills WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(SkillCategory::from)
        .ok_or(StoreError::NotFound("skill category"))
    }

    async fn insert_skill(&self, new: NewSkillCategory) -> StoreResult<SkillCategory> {
        let row = sqlx::query_as::<_, SkillRow>(&format!(
            r#"
            INSERT INTO skills (category, items, display_order)
            VALUES ($1, $2, $3)
            RETURNING {SKILL_COLUMNS}
            "#
        ))
        .bind(&new.category)
        .bind(Json(new.items.as_slice()))
        .bind(new.order)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn update_skill(
        &self,
        id: i64,
        patch: SkillCategoryPatch,
    ) -> StoreResult<SkillCategory> {
        let mut skill = self.get_skill(id).await?;
        patch.apply(&mut skill);

        sqlx::query_as::<_, SkillRow>(&format!(
            r#"
            UPDATE skills SET category = $1, items = $2, display_order = $3
            WHERE id = $4
            RETURNING {SKILL_COLUMNS}
            "#
        ))
        .bind(&skill.category)
        .bind(Json(skill.items.as_slice()))
        .bind(skill.order)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(SkillCategory::from)
        .ok_or(StoreError::NotFound("skill category"))
    }

    async fn delete_skill(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM skills WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        not_found_if_empty(result.rows_affected(), "skill category")
    }

    async fn get_settings(&self) -> StoreResult<Option<Settings>> {
        let row = sqlx::query_as::<_, SettingsRow>(
            "SELECT profile_image, updated_at FROM settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Settings::from))
    }

    async fn save_profile_image(&self, image: Option<String>) -> StoreResult<Settings> {
        let row = sqlx::query_as::<_, SettingsRow>(
            r#"
            INSERT INTO settings (id, profile_image, updated_at)
            VALUES (1, $1, now())
            ON CONFLICT (id) DO UPDATE SET
                profile_image = EXCLUDED.profile_image,
                updated_at = now()
            RETURNING profile_image, updated_at
            "#,
        )
        .bind(clean_image(image))
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn counts(&self) -> StoreResult<ContentCounts> {
        let (projects, blog_posts, skills): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM projects),
                (SELECT COUNT(*) FROM blog_posts),
                (SELECT COUNT(*) FROM skills)
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(ContentCounts {
            projects,
            blog_posts,
            skills,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_row_normalizes_array_literal_and_unknown_status() {
        let row = ProjectRow {
            id: 7,
            title: "Raffle".into(),
            description: "Provably fair lottery".into(),
            tech: Json(RawList::Delimited("{Rust,\"Web Dev\"}".into())),
            status: "Shipped Somewhere".into(),
            featured: true,
            github: "https://github.com/ada/raffle".into(),
            image: Some("   ".into()),
        };
        let project = Project::from(row);
        assert_eq!(project.tech.as_slice(), ["Rust", "Web Dev"]);
        assert_eq!(project.status, ProjectStatus::InDevelopment);
        assert!(project.image.is_none());
    }

    #[test]
    fn test_project_row_keeps_known_status() {
        let row = ProjectRow {
            id: 8,
            title: "FundMe".into(),
            description: "Crowdfunding".into(),
            tech: Json(RawList::Sequence(vec![" Solidity ".into(), "".into()])),
            status: "Live on Testnet".into(),
            featured: false,
            github: String::new(),
            image: None,
        };
        let project = Project::from(row);
        assert_eq!(project.tech.as_slice(), ["Solidity"]);
        assert_eq!(project.status, ProjectStatus::LiveOnTestnet);
    }

    #[test]
    fn test_skill_row_normalizes_array_literal() {
        let row = SkillRow {
            id: 3,
            category: "Web3".into(),
            items: Json(RawList::Delimited("{Solidity,\"zkSync Era\",}".into())),
            display_order: 2,
        };
        let skill = SkillCategory::from(row);
        assert_eq!(skill.items.as_slice(), ["Solidity", "zkSync Era"]);
        assert_eq!(skill.order, 2);
    }
}
