// ============================================================
// LINK EXTRACTOR
// ============================================================
// Classify every URL found in arbitrary text into video / PDF /
// document / other buckets. Pure and deterministic: identical input
// always yields identical, identically ordered output.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::domain::raw_record::RawRecord;

/// Fallback matches shorter than this are discarded as likely noise.
const MIN_FALLBACK_LINK_LENGTH: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Video,
    Pdf,
    Document,
    Other,
}

/// Four deduplicated, insertion-ordered link buckets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedLinks {
    pub videos: Vec<String>,
    pub pdfs: Vec<String>,
    pub documents: Vec<String>,
    pub others: Vec<String>,
}

impl ExtractedLinks {
    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
            && self.pdfs.is_empty()
            && self.documents.is_empty()
            && self.others.is_empty()
    }

    pub fn total(&self) -> usize {
        self.videos.len() + self.pdfs.len() + self.documents.len() + self.others.len()
    }

    /// Merge the classified buckets into the link-bearing list fields of a
    /// raw record. `other` links are kept under their own field so the
    /// normalizer can carry them into metadata instead of dropping them.
    pub fn merge_into_record(&self, record: &mut RawRecord) {
        for link in &self.videos {
            record.push_list_item("youtube_links", link.clone());
        }
        for link in &self.pdfs {
            record.push_list_item("pdf_links", link.clone());
        }
        for link in &self.documents {
            record.push_list_item("doc_links", link.clone());
        }
        for link in &self.others {
            record.push_list_item("other_links", link.clone());
        }
    }
}

// Candidate URL tokens: http(s) URLs or bare www. hosts. Separators that
// commonly delimit lists (whitespace, quotes, brackets, pipes, commas,
// semicolons) terminate a token.
static URL_CANDIDATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(?:https?://|www\.)[^\s<>"'`\[\]{}|\\^,;]+"#).unwrap()
});

// --- Group (a): video-hosting URLs -------------------------------------

// The full YouTube URL space: watch, embed, playlist, shorts, live, v/,
// channel and handle pages, short links, mobile/music/regional subdomains,
// and the nocookie embed host.
static YOUTUBE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)
        (?:
            (?:(?:www|m|music|gaming|[a-z]{2})\.)?youtube\.com/
                (?:watch|embed/|shorts/|live/|playlist|v/|channel/|c/|user/|@)
          | (?:www\.)?youtube-nocookie\.com/embed/
          | youtu\.be/[A-Za-z0-9_-]{5,}
        )",
    )
    .unwrap()
});

static VIDEO_PLATFORM_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)
        (?:
            vimeo\.com/ | (?:www\.)?dailymotion\.com/ | dai\.ly/
          | (?:www\.)?twitch\.tv/ | \w+\.wistia\.com/ | (?:www\.)?loom\.com/
          | streamable\.com/ | (?:www\.)?bilibili\.com/video
          | (?:www\.)?coursera\.org/ | (?:www\.)?udemy\.com/
          | (?:www\.)?khanacademy\.org/ | (?:www\.)?edx\.org/
          | (?:www\.)?pluralsight\.com/ | (?:www\.)?skillshare\.com/
          | (?:www\.)?udacity\.com/ | (?:www\.)?linkedin\.com/learning
          | (?:www\.)?frontendmasters\.com/ | egghead\.io/
        )",
    )
    .unwrap()
});

static VIDEO_FILE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(?:mp4|webm|mov|avi|mkv|m4v|flv)(?:[?#]|$)").unwrap());

// --- Group (b): document URLs ------------------------------------------

static PDF_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)
        (?:
            \.pdf(?:[?\#]|$)
          | arxiv\.org/(?:pdf|abs)/
          | (?:www\.)?scribd\.com/ | (?:www\.)?slideshare\.net/
          | (?:www\.)?researchgate\.net/ | (?:www\.)?academia\.edu/
          | docdroid\.net/ | (?:www\.)?pdfdrive\.com/
        )",
    )
    .unwrap()
});

static DOC_FILE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\.(?:docx?|pptx?|xlsx?|odt|ods|odp|rtf|epub|txt|md)(?:[?#]|$)").unwrap()
});

static DOC_HOST_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)
        (?:
            docs\.google\.com/ | drive\.google\.com/
          | (?:www\.)?dropbox\.com/ | onedrive\.live\.com/ | 1drv\.ms/
          | \w+\.sharepoint\.com/ | (?:www\.|app\.)?box\.com/
          | (?:www\.)?notion\.so/ | \w+\.notion\.site/
          | (?:www\.)?evernote\.com/ | onenote\.com/
          | (?:gist\.)?github\.com/ | (?:www\.)?gitlab\.com/ | bitbucket\.org/
          | \w+\.readthedocs\.io/ | \w+\.gitbook\.io/ | (?:www\.)?gitbook\.com/
          | \w+\.atlassian\.net/wiki | developer\.mozilla\.org/
          | docs\.microsoft\.com/ | learn\.microsoft\.com/
          | (?:www\.)?w3schools\.com/ | (?:www\.)?geeksforgeeks\.org/
          | (?:www\.)?tutorialspoint\.com/ | (?:www\.)?freecodecamp\.org/news
        )",
    )
    .unwrap()
});

pub struct LinkExtractor;

impl LinkExtractor {
    /// Extract and classify every URL in the given text.
    pub fn extract(text: &str) -> ExtractedLinks {
        let normalized = Self::normalize_text(text);

        let mut links = ExtractedLinks::default();
        let mut seen: HashSet<String> = HashSet::new();

        for candidate in URL_CANDIDATE.find_iter(&normalized) {
            let url = Self::trim_trailing_punctuation(candidate.as_str());
            if url.is_empty() || !seen.insert(url.to_string()) {
                continue;
            }

            match Self::classify(url) {
                Some(LinkKind::Video) => links.videos.push(url.to_string()),
                Some(LinkKind::Pdf) => links.pdfs.push(url.to_string()),
                Some(LinkKind::Document) => links.documents.push(url.to_string()),
                Some(LinkKind::Other) => links.others.push(url.to_string()),
                None => {}
            }
        }

        links
    }

    /// Classify one URL token. Classifier groups are evaluated in a fixed
    /// order with first-match-wins semantics, so a URL lands in exactly one
    /// bucket. Returns `None` when the token is too short to be a real link.
    pub fn classify(url: &str) -> Option<LinkKind> {
        if YOUTUBE_PATTERN.is_match(url)
            || VIDEO_PLATFORM_PATTERN.is_match(url)
            || VIDEO_FILE_PATTERN.is_match(url)
        {
            return Some(LinkKind::Video);
        }
        // PDF vs generic document is itself first-match-wins.
        if PDF_PATTERN.is_match(url) {
            return Some(LinkKind::Pdf);
        }
        if DOC_FILE_PATTERN.is_match(url) || DOC_HOST_PATTERN.is_match(url) {
            return Some(LinkKind::Document);
        }
        if url.len() < MIN_FALLBACK_LINK_LENGTH {
            return None;
        }
        Some(LinkKind::Other)
    }

    /// Whether a string looks like a URL at all (used when filtering values
    /// found under recognized link-field names).
    pub fn is_link_shaped(value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.starts_with("http://")
            || trimmed.starts_with("https://")
            || trimmed.starts_with("www.")
    }

    fn normalize_text(text: &str) -> String {
        text.replace("\r\n", "\n").replace('\t', " ")
    }

    fn trim_trailing_punctuation(url: &str) -> &str {
        url.trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | ')' | ']'))
    }
}
