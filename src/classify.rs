//! Link classification.

use crate::models::LinkKind;

/// Domains that mark a link as a YouTube video.
const YOUTUBE_DOMAINS: &[&str] = &["youtube.com", "youtu.be"];

/// Classify a link by plain substring containment: anything that mentions a
/// YouTube domain is a video, everything else is treated as tablature.
///
/// This is not a URL parse. `https://tabs.example/youtube.com-covers` is
/// classified as YouTube, and the check is case-sensitive. Entries created by
/// the browser version were classified the same way.
pub fn classify(link: &str) -> LinkKind {
    if YOUTUBE_DOMAINS.iter().any(|domain| link.contains(domain)) {
        LinkKind::YouTube
    } else {
        LinkKind::Tabs
    }
}
