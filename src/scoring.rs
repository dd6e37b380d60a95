//! Scoring and ranking of article candidates.
//!
//! Pure functions: a candidate's score is the clamped sum of five bounded
//! sub-scores (source reputation, keyword impact, recency, company mentions,
//! engagement). Ranking is a stable descending sort, so candidates with equal
//! scores keep their fetch order.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

use crate::feeds::ArticleCandidate;
use crate::summarizer::payload::SummaryBody;

pub const SOURCE_CAP: f64 = 30.0;
pub const KEYWORD_CAP: f64 = 25.0;
pub const RECENCY_CAP: f64 = 20.0;
pub const COMPANY_CAP: f64 = 15.0;
pub const ENGAGEMENT_CAP: f64 = 10.0;

const KEYWORD_POINTS: f64 = 5.0;
const COMPANY_POINTS: f64 = 3.0;
const UNKNOWN_SOURCE_SCORE: f64 = 10.0;
const UNKNOWN_AGE_SCORE: f64 = 5.0;

static SOURCE_SCORES: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("techcrunch.com", 30.0),
        ("wired.com", 25.0),
        ("bbc.com", 20.0),
        ("cnet.com", 15.0),
    ])
});

// High-impact keywords, each match worth KEYWORD_POINTS.
static HIGH_IMPACT_KEYWORDS: &[&str] = &[
    // AI & ML
    "ai",
    "artificial intelligence",
    "chatgpt",
    "gpt-4",
    "gpt-5",
    "claude",
    "gemini",
    "llama",
    "machine learning",
    "deep learning",
    "neural network",
    "transformer",
    "diffusion",
    "stable diffusion",
    "midjourney",
    "dall-e",
    // Major announcements
    "breakthrough",
    "major",
    "announces",
    "launches",
    "releases",
    "unveils",
    "revolutionary",
    "game-changing",
    "first-ever",
    "new model",
    // Security
    "security breach",
    "vulnerability",
    "zero-day",
    "hack",
    "breach",
    // Business
    "acquisition",
    "funding",
    "ipo",
    "billion",
    "million",
    "raises",
    // Programming & dev
    "programming",
    "python",
    "javascript",
    "rust",
    "framework",
    "open source",
    "github",
    "developer",
    "coding",
];

// Major tech companies and AI labs, each mention worth COMPANY_POINTS.
static MAJOR_COMPANIES: &[&str] = &[
    "openai",
    "anthropic",
    "deepmind",
    "google ai",
    "meta ai",
    "google",
    "apple",
    "microsoft",
    "meta",
    "facebook",
    "amazon",
    "tesla",
    "nvidia",
    "spacex",
    "samsung",
    "intel",
    "amd",
    "qualcomm",
    "arm",
    "github",
    "gitlab",
    "stackoverflow",
    "reddit",
];

static ENGAGEMENT_WORDS: &[&str] = &["breaking", "exclusive", "first", "new", "just"];

/// A candidate plus its computed score.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub candidate: ArticleCandidate,
    pub score: f64,
}

fn extract_domain(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|h| h.to_string()))
        .map(|host| host.trim_start_matches("www.").to_string())
        .unwrap_or_default()
}

/// Source reputation, 0-30. Unknown domains get a mid-low default.
pub fn score_source(link: &str) -> f64 {
    let domain = extract_domain(link);
    SOURCE_SCORES
        .get(domain.as_str())
        .copied()
        .unwrap_or(UNKNOWN_SOURCE_SCORE)
        .min(SOURCE_CAP)
}

fn searchable_text(title: &str, summary: &SummaryBody) -> String {
    format!("{} {}", title, summary.flatten_text()).to_lowercase()
}

/// Keyword impact, 0-25.
pub fn score_keywords(title: &str, summary: &SummaryBody) -> f64 {
    let text = searchable_text(title, summary);
    let score = HIGH_IMPACT_KEYWORDS
        .iter()
        .filter(|kw| text.contains(*kw))
        .count() as f64
        * KEYWORD_POINTS;
    score.min(KEYWORD_CAP)
}

/// Recency, 0-20: a step function of age. A missing timestamp scores a fixed
/// mid-low default rather than zero.
pub fn score_recency(published: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let published = match published {
        Some(ts) => ts,
        None => return UNKNOWN_AGE_SCORE,
    };

    let hours_old = now.signed_duration_since(published).num_seconds() as f64 / 3600.0;
    if hours_old < 2.0 {
        20.0
    } else if hours_old < 6.0 {
        15.0
    } else if hours_old < 12.0 {
        10.0
    } else if hours_old < 24.0 {
        5.0
    } else {
        0.0
    }
}

/// Company mentions, 0-15.
pub fn score_companies(title: &str, summary: &SummaryBody) -> f64 {
    let text = searchable_text(title, summary);
    let score = MAJOR_COMPANIES
        .iter()
        .filter(|company| text.contains(*company))
        .count() as f64
        * COMPANY_POINTS;
    score.min(COMPANY_CAP)
}

/// Engagement, 0 or 10: fixed bonus if the title carries an urgency word.
pub fn score_engagement(title: &str) -> f64 {
    let title = title.to_lowercase();
    if ENGAGEMENT_WORDS.iter().any(|word| title.contains(word)) {
        ENGAGEMENT_CAP
    } else {
        0.0
    }
}

/// Total score at a given instant, clamped to [0,100].
pub fn score_at(candidate: &ArticleCandidate, now: DateTime<Utc>) -> f64 {
    let source = score_source(&candidate.link);
    let keywords = score_keywords(&candidate.title, &candidate.summary);
    let recency = score_recency(candidate.published, now);
    let companies = score_companies(&candidate.title, &candidate.summary);
    let engagement = score_engagement(&candidate.title);

    let total = source + keywords + recency + companies + engagement;

    debug!(
        "Article score: {:.1} | Source: {} | Keywords: {} | Recency: {} | Companies: {} | Engagement: {} | Title: {}",
        total, source, keywords, recency, companies, engagement, candidate.title
    );

    total.clamp(0.0, 100.0)
}

/// Total score, clamped to [0,100]. Deterministic for a fixed wall clock.
pub fn score(candidate: &ArticleCandidate) -> f64 {
    score_at(candidate, Utc::now())
}

/// Ranks candidates by score, highest first. Equal scores keep input order.
pub fn rank(candidates: Vec<ArticleCandidate>) -> Vec<ScoredCandidate> {
    let now = Utc::now();
    let mut scored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .map(|candidate| {
            let score = score_at(&candidate, now);
            ScoredCandidate { candidate, score }
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored
}

/// The first `n` of the ranked order; returns fewer if fewer exist.
pub fn select_top_n(candidates: Vec<ArticleCandidate>, n: usize) -> Vec<ScoredCandidate> {
    let mut ranked = rank(candidates);
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn candidate(title: &str, summary: &str, link: &str, age_hours: i64) -> ArticleCandidate {
        ArticleCandidate {
            link: link.to_string(),
            title: title.to_string(),
            summary: SummaryBody::Plain(summary.to_string()),
            published: Some(Utc::now() - ChronoDuration::hours(age_hours)),
            feed_url: "https://example.com/feed".to_string(),
            image_url: None,
        }
    }

    #[test]
    fn keyword_score_caps_even_with_many_matches() {
        let summary = HIGH_IMPACT_KEYWORDS.join(" ");
        let body = SummaryBody::Plain(summary);
        assert_eq!(score_keywords("everything at once", &body), KEYWORD_CAP);
    }

    #[test]
    fn company_score_caps() {
        let body = SummaryBody::Plain(MAJOR_COMPANIES.join(" "));
        assert_eq!(score_companies("", &body), COMPANY_CAP);
    }

    #[test]
    fn recency_steps_down_with_age() {
        let now = Utc::now();
        let at = |hours: i64| score_recency(Some(now - ChronoDuration::hours(hours)), now);
        assert_eq!(at(1), 20.0);
        assert_eq!(at(3), 15.0);
        assert_eq!(at(8), 10.0);
        assert_eq!(at(20), 5.0);
        assert_eq!(at(30), 0.0);
        assert_eq!(score_recency(None, now), 5.0);
    }

    #[test]
    fn unknown_source_gets_default() {
        assert_eq!(score_source("https://unknown-blog.example/post"), 10.0);
        assert_eq!(score_source("https://www.techcrunch.com/post"), 30.0);
        assert_eq!(score_source("not a url"), 10.0);
    }

    #[test]
    fn engagement_bonus_is_all_or_nothing() {
        assert_eq!(score_engagement("Breaking: something happened"), 10.0);
        assert_eq!(score_engagement("A quiet retrospective"), 0.0);
    }

    #[test]
    fn total_score_stays_in_bounds() {
        let c = candidate(
            "Breaking: OpenAI announces breakthrough AI model, billions in new funding",
            &format!("{} {}", HIGH_IMPACT_KEYWORDS.join(" "), MAJOR_COMPANIES.join(" ")),
            "https://techcrunch.com/story",
            1,
        );
        let total = score(&c);
        assert!(total <= 100.0);
        assert!(total >= 0.0);
        // All five sub-scores max out here: 30+25+20+15+10 hits the ceiling.
        assert_eq!(total, 100.0);
    }

    #[test]
    fn worked_example_scores_as_documented() {
        let c = candidate(
            "OpenAI announces breakthrough AI model",
            "OpenAI shipped a model.",
            "https://techcrunch.com/story",
            1,
        );
        let now = Utc::now();
        assert_eq!(score_source(&c.link), 30.0);
        assert_eq!(score_recency(c.published, now), 20.0);
        // "ai", "announces", "breakthrough" all land in the title.
        assert!(score_keywords(&c.title, &c.summary) >= 10.0);
        assert_eq!(score_companies(&c.title, &c.summary), 3.0);
        assert!(score_at(&c, now) <= 100.0);
    }

    #[test]
    fn rank_is_descending_and_stable_for_ties() {
        let a = candidate("no keywords here", "quiet", "https://a.example/1", 30);
        let b = candidate("also nothing", "calm", "https://b.example/2", 30);
        let hot = candidate(
            "Breaking AI news",
            "openai model",
            "https://techcrunch.com/x",
            1,
        );
        let ranked = rank(vec![a.clone(), b.clone(), hot]);
        assert!(ranked[0].score >= ranked[1].score);
        assert!(ranked[1].score >= ranked[2].score);
        // a and b tie; fetch order is preserved.
        assert_eq!(ranked[1].candidate.link, a.link);
        assert_eq!(ranked[2].candidate.link, b.link);
    }

    #[test]
    fn select_top_n_never_over_returns() {
        let c = candidate("rust news", "", "https://a.example/1", 1);
        let selected = select_top_n(vec![c], 5);
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn structured_summary_is_flattened_for_matching() {
        let mut c = candidate("plain title", "", "https://a.example/1", 1);
        c.summary = SummaryBody::Sections(vec![(
            "Details".to_string(),
            crate::summarizer::payload::SectionValue::Items(vec![
                "OpenAI raises funding".to_string()
            ]),
        )]);
        assert!(score_companies(&c.title, &c.summary) >= 3.0);
        assert!(score_keywords(&c.title, &c.summary) >= 5.0);
    }
}
