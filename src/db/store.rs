use async_trait::async_trait;
use std::time::Duration;

use super::models::{
    BlogPost, BlogPostPatch, ContentCounts, NewBlogPost, NewProject, NewSkillCategory,
    PostQuery, Project, ProjectOrder, ProjectPatch, Settings, SkillCategory, SkillCategoryPatch,
    Visibility,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Read/write access to the site's content collections.
///
/// Every call is an independent request: no transactions span calls and
/// concurrent updates resolve last-write-wins.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Round-trip latency to the backing store.
    async fn ping(&self) -> StoreResult<Duration>;

    async fn list_projects(&self, order: ProjectOrder) -> StoreResult<Vec<Project>>;
    async fn get_project(&self, id: i64) -> StoreResult<Project>;
    async fn insert_project(&self, new: NewProject) -> StoreResult<Project>;
    async fn update_project(&self, id: i64, patch: ProjectPatch) -> StoreResult<Project>;
    async fn delete_project(&self, id: i64) -> StoreResult<()>;

    async fn list_posts(&self, query: &PostQuery) -> StoreResult<Vec<BlogPost>>;
    async fn get_post(&self, id: i64, visibility: Visibility) -> StoreResult<BlogPost>;
    async fn insert_post(&self, new: NewBlogPost) -> StoreResult<BlogPost>;
    async fn update_post(&self, id: i64, patch: BlogPostPatch) -> StoreResult<BlogPost>;
    async fn delete_post(&self, id: i64) -> StoreResult<()>;

    async fn list_skills(&self) -> StoreResult<Vec<SkillCategory>>;
    async fn get_skill(&self, id: i64) -> StoreResult<SkillCategory>;
    async fn insert_skill(&self, new: NewSkillCategory) -> StoreResult<SkillCategory>;
    async fn update_skill(&self, id: i64, patch: SkillCategoryPatch)
        -> StoreResult<SkillCategory>;
    async fn delete_skill(&self, id: i64) -> StoreResult<()>;

    async fn get_settings(&self) -> StoreResult<Option<Settings>>;
    /// Insert-or-update of the singleton settings row in one operation.
    async fn save_profile_image(&self, image: Option<String>) -> StoreResult<Settings>;

    async fn counts(&self) -> StoreResult<ContentCounts>;
}
