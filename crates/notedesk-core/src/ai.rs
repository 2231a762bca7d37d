//! AI collaborator used by the editor's capability-gated controls.
//!
//! The editor only depends on [`AiService`]. Two implementations ship with
//! the crate: [`DisabledAi`], which always reports itself unavailable, and
//! [`KeywordAi`], an offline heuristic that needs no network.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::AiError;

/// Asynchronous AI operations the editor can invoke
#[async_trait]
pub trait AiService: Send + Sync {
    /// Suggest tags for a plain-text document. May return none.
    async fn auto_tag(&self, plain_text: &str) -> Result<Vec<String>, AiError>;

    /// Summarize an HTML document. May return an empty string.
    async fn summarize(&self, rich_content: &str) -> Result<String, AiError>;
}

/// Collaborator for sessions without AI
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledAi;

#[async_trait]
impl AiService for DisabledAi {
    async fn auto_tag(&self, _plain_text: &str) -> Result<Vec<String>, AiError> {
        Err(AiError::Unavailable("AI is disabled".to_string()))
    }

    async fn summarize(&self, _rich_content: &str) -> Result<String, AiError> {
        Err(AiError::Unavailable("AI is disabled".to_string()))
    }
}

const STOPWORDS: &[&str] = &[
    "about", "after", "again", "also", "because", "been", "before", "being", "between", "both",
    "could", "does", "doing", "down", "each", "from", "further", "have", "having", "here",
    "into", "just", "more", "most", "once", "only", "other", "over", "same", "should", "some",
    "such", "than", "that", "their", "them", "then", "there", "these", "they", "this", "those",
    "through", "under", "until", "very", "were", "what", "when", "where", "which", "while",
    "will", "with", "would", "your",
];

/// Offline heuristic collaborator
///
/// Tags are the most frequent non-trivial words; the summary is the leading
/// sentences of the document's text.
#[derive(Debug, Clone)]
pub struct KeywordAi {
    pub max_tags: usize,
    pub max_summary_chars: usize,
}

impl Default for KeywordAi {
    fn default() -> Self {
        Self {
            max_tags: 3,
            max_summary_chars: 240,
        }
    }
}

impl KeywordAi {
    fn keywords(&self, text: &str) -> Vec<String> {
        let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
        let words = text
            .split(|c: char| !c.is_alphanumeric())
            .map(str::to_lowercase)
            .filter(|w| w.chars().count() >= 4)
            .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
            .filter(|w| !STOPWORDS.contains(&w.as_str()));

        for (position, word) in words.enumerate() {
            let entry = counts.entry(word).or_insert((0, position));
            entry.0 += 1;
        }

        let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
        ranked.sort_by(|(_, (ca, pa)), (_, (cb, pb))| cb.cmp(ca).then(pa.cmp(pb)));
        ranked
            .into_iter()
            .take(self.max_tags)
            .map(|(word, _)| word)
            .collect()
    }

    fn lead_sentences(&self, text: &str) -> String {
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let mut summary = String::new();
        for sentence in text.split_inclusive(['.', '!', '?']) {
            let sentence = sentence.trim();
            if sentence.is_empty() {
                continue;
            }
            if !summary.is_empty()
                && summary.chars().count() + sentence.chars().count() + 1 > self.max_summary_chars
            {
                break;
            }
            if !summary.is_empty() {
                summary.push(' ');
            }
            summary.push_str(sentence);
        }
        if summary.chars().count() > self.max_summary_chars {
            summary = summary.chars().take(self.max_summary_chars).collect();
            summary.push('…');
        }
        summary
    }
}

/// Drop markup, keeping text and block boundaries.
fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

#[async_trait]
impl AiService for KeywordAi {
    async fn auto_tag(&self, plain_text: &str) -> Result<Vec<String>, AiError> {
        Ok(self.keywords(plain_text))
    }

    async fn summarize(&self, rich_content: &str) -> Result<String, AiError> {
        Ok(self.lead_sentences(&strip_html(rich_content)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_keyword_tags_rank_by_frequency() {
        let ai = KeywordAi::default();
        let tags = ai
            .auto_tag("Garden plans: tomatoes, garden beds, more tomatoes and garden tools. 2026")
            .await
            .unwrap();
        assert_eq!(tags, vec!["garden", "tomatoes", "plans"]);
    }

    #[tokio::test]
    async fn test_keyword_tags_empty_text() {
        let ai = KeywordAi::default();
        assert!(ai.auto_tag("a an the").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_summary_takes_leading_sentences() {
        let ai = KeywordAi {
            max_tags: 3,
            max_summary_chars: 40,
        };
        let summary = ai
            .summarize("<h1>Trip</h1><p>We leave Monday. Pack light! Bring the map and snacks.</p>")
            .await
            .unwrap();
        assert_eq!(summary, "Trip We leave Monday. Pack light!");
    }

    #[tokio::test]
    async fn test_disabled_ai_is_unavailable() {
        assert!(matches!(
            DisabledAi.summarize("<p>x</p>").await,
            Err(AiError::Unavailable(_))
        ));
    }

    #[test]
    fn test_strip_html_entities() {
        assert_eq!(strip_html("<p>a &amp; b</p>").trim(), "a & b");
    }
}
