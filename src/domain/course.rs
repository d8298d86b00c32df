use serde::{Deserialize, Serialize};

/// A video attached to a module. `url` is the canonical embed form; the
/// original URL shape is kept alongside for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoLink {
    pub title: String,
    pub url: String,
    pub source_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_url: Option<String>,
    #[serde(default)]
    pub video_links: Vec<VideoLink>,
    #[serde(default)]
    pub pdf_links: Vec<String>,
    #[serde(default)]
    pub doc_links: Vec<String>,
    #[serde(default)]
    pub subtopics: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub practice_task: Option<String>,
    pub week: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

/// A materialized course ready for submission to the course store.
///
/// Invariant: no two video links across the whole course share a canonical
/// embed URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    pub modules: Vec<Module>,
}

pub mod content_type {
    pub const VIDEO: &str = "video";
    pub const TEXT: &str = "text";
}

pub mod category {
    pub const WEB_DEVELOPMENT: &str = "Web Development";
    pub const PROGRAMMING: &str = "Programming";
    pub const DEVOPS: &str = "DevOps";
    pub const LANGUAGE_LEARNING: &str = "Language Learning";
    pub const DESIGN: &str = "Design";
    pub const AI_ML: &str = "AI & Machine Learning";
    pub const INTERVIEW_PREP: &str = "Interview Preparation";
    pub const GENERAL: &str = "General";
}
