//! Prompt text for the recommendation request.

use crate::library::model::BookRecord;

/// Fewest recommendations that can be requested.
pub const MIN_COUNT: u8 = 5;
/// Most recommendations that can be requested.
pub const MAX_COUNT: u8 = 15;
/// Recommendations requested when nothing else is configured.
pub const DEFAULT_COUNT: u8 = 10;

/// User-tunable knobs of a recommendation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    /// Number of recommendations; clamped to `MIN_COUNT..=MAX_COUNT` on use.
    pub count: u8,
    /// Free-form, comma-separated tags to prioritize. Empty means flexible.
    pub focus_tags: String,
    /// Only summarize favorite books.
    pub favorites_only: bool,
}

impl Default for PromptRequest {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            focus_tags: String::new(),
            favorites_only: true,
        }
    }
}

impl PromptRequest {
    /// Requested count within bounds.
    pub fn count(&self) -> u8 {
        self.count.clamp(MIN_COUNT, MAX_COUNT)
    }
}

/// One-line summary of a seed book.
pub fn seed_line(book: &BookRecord) -> String {
    let tags = book.tags.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
    let fav = if book.favorite { "yes" } else { "no" };
    let rating = book
        .rating
        .map(|r| r.to_string())
        .unwrap_or_else(|| "-".into());
    format!(
        "- {} — {}  [tags: {tags}]  [fav:{fav}]  [rating:{rating}]",
        book.title, book.author
    )
}

/// Summaries for the given seeds, keeping only favorites when asked.
pub fn seed_lines(seeds: &[&BookRecord], favorites_only: bool) -> Vec<String> {
    seeds
        .iter()
        .filter(|b| !favorites_only || b.favorite)
        .map(|b| seed_line(b))
        .collect()
}

/// Assemble the full instruction prompt.
pub fn build_prompt(request: &PromptRequest, seed_lines: &[String]) -> String {
    let focus = request.focus_tags.trim();
    let focus_txt = if focus.is_empty() {
        "Priority: flexible".to_string()
    } else {
        format!("Priority tags: {focus}")
    };

    format!(
        "You are a seasoned literary curator. Based on the following 'read' books,\n\
         recommend **{count}** new books for the user.\n\
         For each recommendation, include briefly:\n\
         - **Title — Author**\n\
         - Why recommended? (1–2 sentences)\n\
         - Related themes / atmosphere\n\
         - Reading Difficulty: X/10\n\
         \n\
         {focus_txt}\n\
         \n\
         Summary of read books:\n\
         {seeds}\n\
         \n\
         Rules:\n\
         - Answer in English.\n\
         - Avoid recommending many works by the same author consecutively.\n\
         - Strive for diversity (country/period/theme).\n",
        count = request.count(),
        seeds = seed_lines.join("\n"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::model::{BookDraft, ReadingStatus, now};
    use crate::library::normalize::normalize;

    fn read_book(title: &str, author: &str, fav: bool, rating: Option<i64>, tags: &[&str]) -> BookRecord {
        normalize(
            BookDraft {
                title: Some(title.into()),
                author: Some(author.into()),
                status: Some(ReadingStatus::Read),
                favorite: Some(fav),
                rating: Some(rating),
                tags: Some(tags.iter().map(|t| t.to_string()).collect()),
                ..Default::default()
            },
            now(),
        )
    }

    #[test]
    fn seed_line_format() {
        let book = read_book("Kindred", "Octavia E. Butler", true, Some(9), &["sf", "history"]);
        assert_eq!(
            seed_line(&book),
            "- Kindred — Octavia E. Butler  [tags: history, sf]  [fav:yes]  [rating:9]"
        );

        let bare = read_book("Anonymous", "", false, None, &[]);
        assert_eq!(seed_line(&bare), "- Anonymous —   [tags: ]  [fav:no]  [rating:-]");
    }

    #[test]
    fn seed_lines_filters_favorites() {
        let a = read_book("A", "x", true, None, &[]);
        let b = read_book("B", "y", false, None, &[]);
        let seeds = vec![&a, &b];
        assert_eq!(seed_lines(&seeds, false).len(), 2);
        let favs = seed_lines(&seeds, true);
        assert_eq!(favs.len(), 1);
        assert!(favs[0].starts_with("- A"));
    }

    #[test]
    fn count_is_clamped() {
        let mut request = PromptRequest::default();
        assert_eq!(request.count(), 10);
        request.count = 2;
        assert_eq!(request.count(), 5);
        request.count = 40;
        assert_eq!(request.count(), 15);
    }

    #[test]
    fn prompt_mentions_count_focus_and_seeds() {
        let request = PromptRequest {
            count: 7,
            focus_tags: " gothic, horror ".into(),
            favorites_only: false,
        };
        let lines = vec!["- Dracula — Bram Stoker  [tags: gothic]  [fav:yes]  [rating:8]".to_string()];
        let prompt = build_prompt(&request, &lines);
        assert!(prompt.contains("recommend **7** new books"));
        assert!(prompt.contains("Priority tags: gothic, horror"));
        assert!(prompt.contains("Summary of read books:\n- Dracula"));
        assert!(prompt.contains("Strive for diversity"));
    }

    #[test]
    fn prompt_without_focus_is_flexible() {
        let prompt = build_prompt(&PromptRequest::default(), &[]);
        assert!(prompt.contains("Priority: flexible"));
        assert!(prompt.contains("recommend **10** new books"));
    }
}
