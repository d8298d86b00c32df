// ============================================================
// COURSE MATERIALIZER
// ============================================================
// Turn validated previews into Course entities ready for the course store.
// Two modes: every preview becomes its own course, or all previews become
// modules of one course.

use crate::domain::course::{category, content_type, Course, Module, VideoLink};
use crate::domain::preview::CourseImportPreview;

use std::collections::HashSet;

use tracing::debug;
use url::Url;

/// Commit mode selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommitMode {
    /// Each valid preview becomes an independent single-module course.
    MultiCourse,
    /// All valid previews become modules of one course.
    SingleCourse,
}

pub struct CourseMaterializerUseCase;

impl CourseMaterializerUseCase {
    pub fn materialize(
        mode: CommitMode,
        course_name: Option<&str>,
        previews: &[CourseImportPreview],
    ) -> Vec<Course> {
        let valid: Vec<&CourseImportPreview> =
            previews.iter().filter(|p| p.is_valid()).collect();
        if valid.is_empty() {
            return Vec::new();
        }

        match mode {
            CommitMode::MultiCourse => valid
                .iter()
                .enumerate()
                .map(|(index, preview)| {
                    // Dedup scope is per course, so each course gets its own
                    // seen-set here.
                    let mut seen = HashSet::new();
                    let module = build_module(preview, index, &mut seen);
                    build_course(preview.topic.trim().to_string(), preview, vec![module])
                })
                .collect(),
            CommitMode::SingleCourse => {
                let mut seen = HashSet::new();
                let modules: Vec<Module> = valid
                    .iter()
                    .enumerate()
                    .map(|(index, preview)| build_module(preview, index, &mut seen))
                    .collect();
                let name = course_name
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| derive_course_name(&valid));
                vec![build_course(name, valid[0], modules)]
            }
        }
    }

    /// Normalize the many video-URL shapes to the single embed form. Returns
    /// `None` for shapes that cannot be canonicalized; callers exclude those
    /// from `videoLinks` instead of failing.
    pub fn canonical_embed_url(raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else if trimmed.starts_with("www.") || trimmed.starts_with("youtu.be/") {
            format!("https://{}", trimmed)
        } else {
            return None;
        };

        let parsed = Url::parse(&with_scheme).ok()?;
        let host = parsed.host_str()?.to_ascii_lowercase();

        if host == "youtu.be" {
            let id = first_path_segment(&parsed)?;
            return Some(embed(&id));
        }

        let is_youtube = host == "youtube.com"
            || host.ends_with(".youtube.com")
            || host == "youtube-nocookie.com"
            || host.ends_with(".youtube-nocookie.com");
        if !is_youtube {
            return None;
        }

        let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());
        match segments.next()? {
            "watch" => {
                // A watch URL that also carries a playlist canonicalizes to
                // the plain video embed.
                let id = query_param(&parsed, "v")?;
                Some(embed(&id))
            }
            "embed" => {
                let id = segments.next()?.to_string();
                if id == "videoseries" {
                    let list = query_param(&parsed, "list")?;
                    Some(format!(
                        "https://www.youtube.com/embed/videoseries?list={}",
                        list
                    ))
                } else {
                    Some(embed(&id))
                }
            }
            "shorts" | "live" | "v" => {
                let id = segments.next()?.to_string();
                Some(embed(&id))
            }
            "playlist" => {
                let list = query_param(&parsed, "list")?;
                Some(format!(
                    "https://www.youtube.com/embed/videoseries?list={}",
                    list
                ))
            }
            _ => None,
        }
    }

    /// Keyword match over the course or topic name, defaulting to General.
    pub fn infer_category(name: &str) -> &'static str {
        let lower = name.to_lowercase();
        let matches = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));

        if matches(&["web", "html", "css", "javascript", "frontend", "front-end", "react", "vue", "angular", "node"]) {
            category::WEB_DEVELOPMENT
        } else if matches(&["interview", "leetcode", "coding challenge", "system design"]) {
            category::INTERVIEW_PREP
        } else if matches(&["machine learning", "deep learning", "neural", "data science", " ai", "ai ", "artificial intelligence", "llm", "nlp"]) {
            category::AI_ML
        } else if matches(&["devops", "docker", "kubernetes", "terraform", "ci/cd", "cloud", "aws", "azure", "linux"]) {
            category::DEVOPS
        } else if matches(&["design", "figma", "ui/ux", "ux", "typography"]) {
            category::DESIGN
        } else if matches(&["english", "spanish", "french", "german", "japanese", "mandarin", "korean", "vocabulary", "grammar"]) {
            category::LANGUAGE_LEARNING
        } else if matches(&["programming", "python", "rust", "java", "golang", " go ", "c++", "algorithm", "data structure", "sql", "database"]) {
            category::PROGRAMMING
        } else {
            category::GENERAL
        }
    }

    /// Synthesize the week-by-week schedule document from the ordered module
    /// list.
    pub fn synthesize_schedule(modules: &[Module]) -> String {
        let mut out = String::from("# Course Schedule\n");
        for module in modules {
            out.push_str(&format!("\n## Week {}: {}\n", module.week, module.title));
            if !module.subtopics.is_empty() {
                out.push_str("Subtopics:\n");
                for subtopic in &module.subtopics {
                    out.push_str(&format!("- {}\n", subtopic));
                }
            }
            if let Some(task) = &module.practice_task {
                out.push_str(&format!("Practice: {}\n", task));
            }
            let mut resources: Vec<&str> =
                module.video_links.iter().map(|v| v.url.as_str()).collect();
            resources.extend(module.pdf_links.iter().map(|s| s.as_str()));
            resources.extend(module.doc_links.iter().map(|s| s.as_str()));
            if !resources.is_empty() {
                out.push_str("Resources:\n");
                for resource in resources {
                    out.push_str(&format!("- {}\n", resource));
                }
            }
        }
        out
    }
}

fn embed(id: &str) -> String {
    format!("https://www.youtube.com/embed/{}", id)
}

fn first_path_segment(url: &Url) -> Option<String> {
    url.path_segments()?
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// `seen` holds canonical URLs already attached within the current course;
/// a link repeated across modules stays with the first module that used it.
fn build_module(
    preview: &CourseImportPreview,
    position: usize,
    seen: &mut HashSet<String>,
) -> Module {
    let mut video_links = Vec::new();
    for (index, source) in preview.youtube_links.iter().enumerate() {
        match CourseMaterializerUseCase::canonical_embed_url(source) {
            Some(canonical) => {
                if seen.insert(canonical.clone()) {
                    video_links.push(VideoLink {
                        title: format!("{} - Video {}", preview.topic.trim(), index + 1),
                        url: canonical,
                        source_url: source.clone(),
                    });
                }
            }
            None => {
                debug!(url = %source, "skipping non-canonicalizable video link");
            }
        }
    }

    let content_type = if preview.youtube_links.is_empty() {
        content_type::TEXT
    } else {
        content_type::VIDEO
    };

    let content_url = video_links
        .first()
        .map(|v| v.url.clone())
        .or_else(|| preview.pdf_links.first().cloned())
        .or_else(|| preview.doc_links.first().cloned());

    let practice_task = if preview.tasks.is_empty() {
        None
    } else {
        Some(preview.tasks.join("; "))
    };

    Module {
        title: preview.topic.trim().to_string(),
        description: preview.description.clone(),
        content_type: content_type.to_string(),
        content_url,
        video_links,
        pdf_links: preview.pdf_links.clone(),
        doc_links: preview.doc_links.clone(),
        subtopics: preview.subtopics.clone(),
        practice_task,
        week: preview.week.unwrap_or((position + 1) as u32),
        duration: preview.duration.clone(),
    }
}

fn build_course(name: String, first: &CourseImportPreview, modules: Vec<Module>) -> Course {
    let category = CourseMaterializerUseCase::infer_category(&name);
    let schedule = CourseMaterializerUseCase::synthesize_schedule(&modules);
    let duration = first.duration.clone().or_else(|| {
        Some(if modules.len() == 1 {
            "1 week".to_string()
        } else {
            format!("{} weeks", modules.len())
        })
    });

    Course {
        name,
        description: first.description.clone(),
        category: category.to_string(),
        difficulty: first.difficulty.clone(),
        duration,
        schedule: Some(schedule),
        modules,
    }
}

/// Prefer the course name the syllabus parser recorded, else fall back to the
/// first preview's topic.
fn derive_course_name(previews: &[&CourseImportPreview]) -> String {
    for preview in previews {
        let from_metadata = preview
            .metadata
            .get("originalStructure")
            .and_then(|v| v.get("course_name"))
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty());
        if let Some(name) = from_metadata {
            return name.to_string();
        }
    }
    previews
        .first()
        .map(|p| p.topic.trim().to_string())
        .unwrap_or_else(|| "Imported Course".to_string())
}
