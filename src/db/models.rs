//! Content entities, their insert payloads and partial updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::list::TagList;

// ============================================================================
// Enumerations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[default]
    #[serde(rename = "In Development")]
    InDevelopment,
    #[serde(rename = "Deployed")]
    Deployed,
    #[serde(rename = "Production Ready")]
    ProductionReady,
    #[serde(rename = "Live on Testnet")]
    LiveOnTestnet,
    #[serde(rename = "Completed")]
    Completed,
    #[serde(rename = "Beta")]
    Beta,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 6] = [
        ProjectStatus::InDevelopment,
        ProjectStatus::Deployed,
        ProjectStatus::ProductionReady,
        ProjectStatus::LiveOnTestnet,
        ProjectStatus::Completed,
        ProjectStatus::Beta,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ProjectStatus::InDevelopment => "In Development",
            ProjectStatus::Deployed => "Deployed",
            ProjectStatus::ProductionReady => "Production Ready",
            ProjectStatus::LiveOnTestnet => "Live on Testnet",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::Beta => "Beta",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProjectStatus {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.label() == s)
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlogCategory {
    #[default]
    #[serde(rename = "Blockchain")]
    Blockchain,
    #[serde(rename = "AI & ML")]
    AiMl,
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "Personal")]
    Personal,
    #[serde(rename = "Tutorial")]
    Tutorial,
}

impl BlogCategory {
    pub const ALL: [BlogCategory; 5] = [
        BlogCategory::Blockchain,
        BlogCategory::AiMl,
        BlogCategory::WebDevelopment,
        BlogCategory::Personal,
        BlogCategory::Tutorial,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BlogCategory::Blockchain => "Blockchain",
            BlogCategory::AiMl => "AI & ML",
            BlogCategory::WebDevelopment => "Web Development",
            BlogCategory::Personal => "Personal",
            BlogCategory::Tutorial => "Tutorial",
        }
    }
}

impl fmt::Display for BlogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BlogCategory {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.label() == s)
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown label '{0}'")]
pub struct UnknownLabel(pub String);

/// Forms send `""` for "no image".
pub fn clean_image(image: Option<String>) -> Option<String> {
    image
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

// ============================================================================
// Projects
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub tech: TagList,
    pub status: ProjectStatus,
    pub featured: bool,
    pub github: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tech: TagList,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub github: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tech: Option<TagList>,
    pub status: Option<ProjectStatus>,
    pub featured: Option<bool>,
    pub github: Option<String>,
    pub image: Option<String>,
}

impl ProjectPatch {
    pub fn apply(self, project: &mut Project) {
        if let Some(title) = self.title {
            project.title = title;
        }
        if let Some(description) = self.description {
            project.description = description;
        }
        if let Some(tech) = self.tech {
            project.tech = tech;
        }
        if let Some(status) = self.status {
            project.status = status;
        }
        if let Some(featured) = self.featured {
            project.featured = featured;
        }
        if let Some(github) = self.github {
            project.github = github;
        }
        if self.image.is_some() {
            project.image = clean_image(self.image);
        }
    }
}

/// Row order for project listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectOrder {
    /// Featured first, then by id. Public site.
    FeaturedFirst,
    /// By id ascending. Admin list.
    ById,
}

// ============================================================================
// Blog posts
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: BlogCategory,
    pub read_time: String,
    pub image: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBlogPost {
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: BlogCategory,
    #[serde(default)]
    pub read_time: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostPatch {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub category: Option<BlogCategory>,
    pub read_time: Option<String>,
    pub image: Option<String>,
    pub published: Option<bool>,
}

impl BlogPostPatch {
    pub fn apply(self, post: &mut BlogPost) {
        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(excerpt) = self.excerpt {
            post.excerpt = excerpt;
        }
        if let Some(content) = self.content {
            post.content = content;
        }
        if let Some(category) = self.category {
            post.category = category;
        }
        if let Some(read_time) = self.read_time {
            post.read_time = read_time;
        }
        if self.image.is_some() {
            post.image = clean_image(self.image);
        }
        if let Some(published) = self.published {
            post.published = published;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    PublishedOnly,
    All,
}

impl Visibility {
    pub fn admits(self, post: &BlogPost) -> bool {
        match self {
            Visibility::PublishedOnly => post.published,
            Visibility::All => true,
        }
    }
}

/// Filter for blog listings. Results are always newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
    pub visibility: Visibility,
    pub category: Option<BlogCategory>,
    pub exclude_id: Option<i64>,
    pub limit: Option<i64>,
}

impl PostQuery {
    pub fn published() -> Self {
        Self {
            visibility: Visibility::PublishedOnly,
            category: None,
            exclude_id: None,
            limit: None,
        }
    }

    pub fn all() -> Self {
        Self {
            visibility: Visibility::All,
            ..Self::published()
        }
    }

    pub fn matches(&self, post: &BlogPost) -> bool {
        self.visibility.admits(post)
            && self.category.is_none_or(|c| c == post.category)
            && self.exclude_id != Some(post.id)
    }
}

// ============================================================================
// Skills
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillCategory {
    pub id: i64,
    pub category: String,
    pub items: TagList,
    pub order: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSkillCategory {
    pub category: String,
    #[serde(default)]
    pub items: TagList,
    #[serde(default = "default_order")]
    pub order: i32,
}

fn default_order() -> i32 {
    1
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillCategoryPatch {
    pub category: Option<String>,
    pub items: Option<TagList>,
    pub order: Option<i32>,
}

impl SkillCategoryPatch {
    pub fn apply(self, skill: &mut SkillCategory) {
        if let Some(category) = self.category {
            skill.category = category;
        }
        if let Some(items) = self.items {
            skill.items = items;
        }
        if let Some(order) = self.order {
            skill.order = order;
        }
    }
}

// ============================================================================
// Settings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub profile_image: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Row counts shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentCounts {
    pub projects: i64,
    pub blog_posts: i64,
    pub skills: i64,
}
