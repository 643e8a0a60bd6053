//! In-process content store, used when no `DATABASE_URL` is configured.

use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::models::{
    clean_image, BlogPost, BlogPostPatch, ContentCounts, NewBlogPost, NewProject,
    NewSkillCategory, PostQuery, Project, ProjectOrder, ProjectPatch, Settings, SkillCategory,
    SkillCategoryPatch, Visibility,
};
use super::sanitize_html;
use super::store::{ContentStore, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Tables {
    projects: Vec<Project>,
    posts: Vec<BlogPost>,
    skills: Vec<SkillCategory>,
    settings: Option<Settings>,
    next_id: i64,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Default)]
pub struct MemoryContentStore {
    tables: RwLock<Tables>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn find_mut<'a, T>(
    rows: &'a mut [T],
    id: i64,
    key: impl Fn(&T) -> i64,
    what: &'static str,
) -> StoreResult<&'a mut T> {
    rows.iter_mut()
        .find(|row| key(row) == id)
        .ok_or(StoreError::NotFound(what))
}

fn remove<T>(
    rows: &mut Vec<T>,
    id: i64,
    key: impl Fn(&T) -> i64,
    what: &'static str,
) -> StoreResult<()> {
    let before = rows.len();
    rows.retain(|row| key(row) != id);
    if rows.len() == before {
        return Err(StoreError::NotFound(what));
    }
    Ok(())
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn ping(&self) -> StoreResult<Duration> {
        Ok(Duration::ZERO)
    }

    async fn list_projects(&self, order: ProjectOrder) -> StoreResult<Vec<Project>> {
        let mut projects = self.tables.read().await.projects.clone();
        match order {
            ProjectOrder::FeaturedFirst => {
                projects.sort_by(|a, b| b.featured.cmp(&a.featured).then(a.id.cmp(&b.id)))
            }
            ProjectOrder::ById => projects.sort_by_key(|p| p.id),
        }
        Ok(projects)
    }

    async fn get_project(&self, id: i64) -> StoreResult<Project> {
        self.tables
            .read()
            .await
            .projects
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(StoreError::NotFound("project"))
    }

    async fn insert_project(&self, new: NewProject) -> StoreResult<Project> {
        let mut tables = self.tables.write().await;
        let project = Project {
            id: tables.allocate_id(),
            title: new.title,
            description: new.description,
            tech: new.tech,
            status: new.status,
            featured: new.featured,
            github: new.github,
            image: clean_image(new.image),
        };
        tables.projects.push(project.clone());
        Ok(project)
    }

    async fn update_project(&self, id: i64, patch: ProjectPatch) -> StoreResult<Project> {
        let mut tables = self.tables.write().await;
        let project = find_mut(&mut tables.projects, id, |p| p.id, "project")?;
        patch.apply(project);
        Ok(project.clone())
    }

    async fn delete_project(&self, id: i64) -> StoreResult<()> {
        remove(&mut self.tables.write().await.projects, id, |p| p.id, "project")
    }

    async fn list_posts(&self, query: &PostQuery) -> StoreResult<Vec<BlogPost>> {
        let tables = self.tables.read().await;
        let mut posts: Vec<BlogPost> = tables
            .posts
            .iter()
            .filter(|p| query.matches(p))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        if let Some(limit) = query.limit {
            posts.truncate(usize::try_from(limit).unwrap_or(0));
        }
        Ok(posts)
    }

    async fn get_post(&self, id: i64, visibility: Visibility) -> StoreResult<BlogPost> {
        self.tables
            .read()
            .await
            .posts
            .iter()
            .find(|p| p.id == id && visibility.admits(p))
            .cloned()
            .ok_or(StoreError::NotFound("blog post"))
    }

    async fn insert_post(&self, new: NewBlogPost) -> StoreResult<BlogPost> {
        let mut tables = self.tables.write().await;
        let post = BlogPost {
            id: tables.allocate_id(),
            title: new.title,
            excerpt: new.excerpt,
            content: sanitize_html(&new.content),
            category: new.category,
            read_time: new.read_time,
            image: clean_image(new.image),
            published: new.published,
            created_at: Utc::now(),
        };
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: i64, mut patch: BlogPostPatch) -> StoreResult<BlogPost> {
        patch.content = patch.content.map(|html| sanitize_html(&html));
        let mut tables = self.tables.write().await;
        let post = find_mut(&mut tables.posts, id, |p| p.id, "blog post")?;
        patch.apply(post);
        Ok(post.clone())
    }

    async fn delete_post(&self, id: i64) -> StoreResult<()> {
        remove(&mut self.tables.write().await.posts, id, |p| p.id, "blog post")
    }

    async fn list_skills(&self) -> StoreResult<Vec<SkillCategory>> {
        let mut skills = self.tables.read().await.skills.clone();
        skills.sort_by(|a, b| a.order.cmp(&b.order).then(a.id.cmp(&b.id)));
        Ok(skills)
    }

    async fn get_skill(&self, id: i64) -> StoreResult<SkillCategory> {
        self.tables
            .read()
            .await
            .skills
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(StoreError::NotFound("skill category"))
    }

    async fn insert_skill(&self, new: NewSkillCategory) -> StoreResult<SkillCategory> {
        let mut tables = self.tables.write().await;
        let skill = SkillCategory {
            id: tables.allocate_id(),
            category: new.category,
            items: new.items,
            order: new.order,
        };
        tables.skills.push(skill.clone());
        Ok(skill)
    }

    async fn update_skill(
        &self,
        id: i64,
        patch: SkillCategoryPatch,
    ) -> StoreResult<SkillCategory> {
        let mut tables = self.tables.write().await;
        let skill = find_mut(&mut tables.skills, id, |s| s.id, "skill category")?;
        patch.apply(skill);
        Ok(skill.clone())
    }

    async fn delete_skill(&self, id: i64) -> StoreResult<()> {
        remove(&mut self.tables.write().await.skills, id, |s| s.id, "skill category")
    }

    async fn get_settings(&self) -> StoreResult<Option<Settings>> {
        Ok(self.tables.read().await.settings.clone())
    }

    async fn save_profile_image(&self, image: Option<String>) -> StoreResult<Settings> {
        let settings = Settings {
            profile_image: clean_image(image),
            updated_at: Utc::now(),
        };
        self.tables.write().await.settings = Some(settings.clone());
        Ok(settings)
    }

    async fn counts(&self) -> StoreResult<ContentCounts> {
        let tables = self.tables.read().await;
        Ok(ContentCounts {
            projects: tables.projects.len() as i64,
            blog_posts: tables.posts.len() as i64,
            skills: tables.skills.len() as i64,
        })
    }
}
