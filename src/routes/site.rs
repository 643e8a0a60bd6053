/**
 * Site Route
 * Profile, headline stats, journey and animation schedules for the public
 * landing page, plus the plain-text resume download
 */
use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

use crate::config::SiteConfig;
use crate::db::models::{BlogCategory, Project, ProjectOrder, ProjectStatus, SkillCategory};
use crate::error::AppError;
use crate::presentation::{
    count_up_frames, SplashSchedule, TypewriterSchedule, COUNT_UP_DURATION,
};
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteStat {
    pub label: String,
    pub value: u32,
    /// Displayed value at each count-up tick.
    pub frames: Vec<u32>,
}

fn headline_stats() -> Vec<SiteStat> {
    [
        ("Technologies Mastered", 25),
        ("Projects Completed", 12),
        ("Blog Posts Written", 8),
        ("Years Self-Learning", 2),
    ]
    .into_iter()
    .map(|(label, value)| SiteStat {
        label: label.to_string(),
        value,
        frames: count_up_frames(value),
    })
    .collect()
}

// ============================================================================
// Journey
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JourneyEntry {
    pub period: String,
    pub title: String,
    pub description: String,
    pub highlights: Vec<String>,
}

/// Timeline entries, most recent first.
fn journey() -> Vec<JourneyEntry> {
    let entries: [(&str, &str, &str, [&str; 3]); 3] = [
        (
            "2024",
            "Self-Taught Developer Journey",
            "Mastered blockchain development, AI/ML, and full-stack technologies through intensive self-learning.",
            [
                "Built production-ready smart contracts on Ethereum",
                "Developed AI stock forecasting model",
                "Created full-stack DApps with React and Solidity",
            ],
        ),
        (
            "2023-2024",
            "Blockchain & DeFi Specialization",
            "Deep dive into Web3 technologies, focusing on Solidity, smart contract security, and DeFi protocols.",
            [
                "Mastered Solidity, Foundry, and Vyper",
                "Implemented zkSync and zero-knowledge proofs",
                "Built decentralized raffle and crowdfunding systems",
            ],
        ),
        (
            "2023",
            "AI & Data Science",
            "Entered the world of artificial intelligence and machine learning, focusing on practical applications.",
            [
                "Built predictive ML models",
                "Specialized in prompt engineering",
                "Applied data analysis to real-world problems",
            ],
        ),
    ];

    entries
        .into_iter()
        .map(|(period, title, description, highlights)| JourneyEntry {
            period: period.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            highlights: highlights.iter().map(|h| h.to_string()).collect(),
        })
        .collect()
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteResponse {
    pub name: String,
    pub title: String,
    pub description: String,
    pub profile_image: Option<String>,
    pub stats: Vec<SiteStat>,
    pub journey: Vec<JourneyEntry>,
    pub count_up_ms: u64,
    pub splash: SplashSchedule,
    pub typewriter: TypewriterSchedule,
    pub blog_categories: Vec<BlogCategory>,
    pub project_statuses: Vec<ProjectStatus>,
}

/// GET /api/site
pub async fn get_site(State(state): State<AppState>) -> Result<Json<SiteResponse>, AppError> {
    let site = &state.config.site;
    let profile_image = state
        .store
        .get_settings()
        .await?
        .and_then(|s| s.profile_image);

    Ok(Json(SiteResponse {
        name: site.owner_name.clone(),
        title: site.owner_title.clone(),
        description: site.description.clone(),
        profile_image,
        stats: headline_stats(),
        journey: journey(),
        count_up_ms: COUNT_UP_DURATION.as_millis() as u64,
        splash: SplashSchedule::standard(),
        typewriter: TypewriterSchedule::for_text(&site.owner_name),
        blog_categories: BlogCategory::ALL.to_vec(),
        project_statuses: ProjectStatus::ALL.to_vec(),
    }))
}

// ============================================================================
// Resume
// ============================================================================

fn resume_file_name(owner: &str) -> String {
    let stem: Vec<&str> = owner.split_whitespace().collect();
    if stem.is_empty() {
        "Resume.txt".to_string()
    } else {
        format!("{}_Resume.txt", stem.join("_"))
    }
}

/// Plain-text resume assembled from the live skills and projects.
fn render_resume(
    site: &SiteConfig,
    skills: &[SkillCategory],
    projects: &[Project],
    journey: &[JourneyEntry],
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "{}", site.owner_name.to_uppercase())?;
    writeln!(out, "{}", site.owner_title)?;
    writeln!(out, "{}", site.url)?;

    writeln!(out, "\nPROFESSIONAL SUMMARY\n{}", site.description)?;

    if !skills.is_empty() {
        writeln!(out, "\nTECHNICAL SKILLS")?;
        for skill in skills {
            writeln!(out, "\n{}:", skill.category)?;
            for item in skill.items.as_slice() {
                writeln!(out, "- {}", item)?;
            }
        }
    }

    if !projects.is_empty() {
        writeln!(out, "\nFEATURED PROJECTS")?;
        for project in projects {
            writeln!(out, "\n{}", project.title)?;
            writeln!(out, "- {}", project.description)?;
            if !project.tech.is_empty() {
                writeln!(out, "- Technologies: {}", project.tech.as_slice().join(", "))?;
            }
            writeln!(out, "- Status: {}", project.status)?;
        }
    }

    writeln!(out, "\nEXPERIENCE & LEARNING JOURNEY")?;
    for entry in journey {
        writeln!(out, "\n{} ({})", entry.title, entry.period)?;
        writeln!(out, "- {}", entry.description)?;
        for highlight in &entry.highlights {
            writeln!(out, "- {}", highlight)?;
        }
    }

    writeln!(out, "\nREFERENCES\nAvailable upon request")?;
    Ok(out)
}

/// GET /api/resume - Plain-text resume download
pub async fn get_resume(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let skills = state.store.list_skills().await?;
    let projects = state.store.list_projects(ProjectOrder::FeaturedFirst).await?;
    let site = &state.config.site;

    let body = render_resume(site, &skills, &projects, &journey())
        .map_err(|e| AppError::Internal(format!("resume rendering failed: {}", e)))?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        resume_file_name(&site.owner_name)
    );

    tracing::debug!(skills = skills.len(), projects = projects.len(), "resume rendered");
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}
