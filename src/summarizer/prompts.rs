//! Prompt templates for the generation backend.

use rand::Rng;

pub const SYSTEM_EDITOR: &str =
    "You are a senior tech editor. You delete fluff and output only dense, useful knowledge.";

pub const SYSTEM_ENGINEER: &str =
    "You are a senior software engineer. You value density and correctness over politeness.";

// Three interchangeable voices; one is picked uniformly at random per call
// purely for output variety.
const STYLE_ANALYST: &str = "ROLE: Data-driven tech analyst.
STYLE: Serious, dense, focused on numbers and hard facts.
FORMAT (section labels):
- Main point: the core of the story in one sentence.
- Key facts: bulleted list of specific features or numbers.
- Technical takeaway: one deep technical insight.";

const STYLE_EXPLAINER: &str = "ROLE: Tech educator.
STYLE: Explains complex news simply using a Q&A format.
FORMAT (section labels):
- What is it?: explain the core news simply.
- How does it work?: the mechanics, briefly.
- Why does it matter?: why developers should care.";

const STYLE_INSIDER: &str = "ROLE: Tech insider and reporter.
STYLE: Urgent, breaking-news feel.
FORMAT (section labels):
- The news: the headline, expanded.
- Details: what actually happened.
- Outlook: what this means for the next six months.";

const STYLE_TEMPLATES: &[&str] = &[STYLE_ANALYST, STYLE_EXPLAINER, STYLE_INSIDER];

/// Picks one of the style templates uniformly at random. Takes the rng as an
/// argument so tests can pin the selection.
pub fn pick_style(rng: &mut impl Rng) -> &'static str {
    STYLE_TEMPLATES[rng.random_range(0..STYLE_TEMPLATES.len())]
}

pub fn article_prompt(style: &str, title: &str, text: &str, link: &str) -> String {
    format!(
        "{style}

TASK:
Analyze the following article and generate a structured channel post.

ARTICLE TITLE: {title}
ARTICLE CONTENT: {text}
LINK: {link}

STRICT GUIDELINES:
1. No filler sentences like \"This is very important.\" or \"In today's world...\".
2. Concrete facts only; keep every section short.

OUTPUT FORMAT (JSON):
{{
    \"title\": \"A natural, specific title\",
    \"summary\": {{
        \"Label 1\": \"Value\",
        \"Label 2\": [\"List item 1\", \"List item 2\"]
    }},
    \"hashtags\": \"#Hashtags\"
}}"
    )
}

pub fn lesson_prompt(topic: &str) -> String {
    format!(
        "You are teaching a junior engineer.
Topic: \"{topic}\".

GOAL:
Don't just explain WHAT it is. Explain the trick, the pitfall, or the best
practice. Real engineering knowledge, not textbook definitions.

STRUCTURE:
1. Pro concept: the deep technical insight, max 2 sentences.
2. Real code: a snippet showing non-trivial usage, tricky parts commented.
3. Challenge: a specific task to test understanding.

GUIDELINES:
- No greetings, no \"today we will learn\". Start immediately with knowledge.

OUTPUT FORMAT (JSON):
{{
    \"title\": \"Master class: {topic}\",
    \"summary\": \"The structured lesson\",
    \"hashtags\": \"#Coding #Tutorial\"
}}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn style_selection_is_deterministic_for_a_seeded_rng() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        assert_eq!(pick_style(&mut a), pick_style(&mut b));
    }

    #[test]
    fn every_style_is_reachable() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(pick_style(&mut rng));
        }
        assert_eq!(seen.len(), STYLE_TEMPLATES.len());
    }
}
