//! LLM reading recommendations seeded from books already read.
//!
//! The seed list is the first [`SEED_LIMIT`] read books in collection order
//! (not the most recent, not a sample), optionally narrowed to favorites
//! after that cut. The recommender never touches the collection, and a
//! failed service call becomes a [`Recommendation::Failed`] value instead of
//! an error, so the caller stays usable.

pub mod prompt;

pub use prompt::{PromptRequest, build_prompt, seed_line, seed_lines};

use crate::library::model::{BookRecord, ReadingStatus};
use crate::llm::TextGenerator;

/// Maximum number of read books summarized in the prompt.
pub const SEED_LIMIT: usize = 40;

/// Outcome of one recommendation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recommendation {
    /// The collection has no read books; the service was not called.
    NoReadBooks,
    /// The service answered.
    Generated { prompt: String, text: String },
    /// The service call failed; `message` is meant for display.
    Failed { prompt: String, message: String },
}

impl Recommendation {
    /// The recommendation text, if any was produced.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Generated { text, .. } => Some(text.as_str()),
            _ => None,
        }
    }
}

/// Read books eligible as seeds: status `read`, first [`SEED_LIMIT`] in order.
pub fn read_books(books: &[BookRecord]) -> Vec<&BookRecord> {
    books
        .iter()
        .filter(|b| b.status == ReadingStatus::Read)
        .take(SEED_LIMIT)
        .collect()
}

/// Build the prompt and ask `generator` for recommendations.
pub fn recommend(books: &[BookRecord], request: &PromptRequest, generator: &dyn TextGenerator) -> Recommendation {
    let seeds = read_books(books);
    if seeds.is_empty() {
        return Recommendation::NoReadBooks;
    }

    let lines = seed_lines(&seeds, request.favorites_only);
    let prompt = build_prompt(request, &lines);
    tracing::info!(seeds = lines.len(), count = request.count(), "generating recommendations");

    match generator.generate(&prompt) {
        Ok(text) => Recommendation::Generated { prompt, text },
        Err(e) => {
            tracing::warn!(error = %e, "recommendation request failed");
            Recommendation::Failed {
                prompt,
                message: format!("Error: {e}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::model::{BookDraft, now};
    use crate::library::normalize::normalize;
    use crate::llm::LlmError;
    use std::cell::RefCell;

    struct Recording {
        prompts: RefCell<Vec<String>>,
        reply: Result<String, String>,
    }

    impl Recording {
        fn ok(text: &str) -> Self {
            Self {
                prompts: RefCell::new(Vec::new()),
                reply: Ok(text.into()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                prompts: RefCell::new(Vec::new()),
                reply: Err(message.into()),
            }
        }
    }

    impl TextGenerator for Recording {
        fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.borrow_mut().push(prompt.to_string());
            self.reply.clone().map_err(|message| LlmError::RequestFailed { message })
        }
    }

    fn book(title: &str, status: ReadingStatus, favorite: bool) -> BookRecord {
        normalize(
            BookDraft {
                title: Some(title.into()),
                author: Some("Someone".into()),
                status: Some(status),
                favorite: Some(favorite),
                ..Default::default()
            },
            now(),
        )
    }

    #[test]
    fn no_read_books_skips_the_call() {
        let books = vec![book("Unread", ReadingStatus::ToRead, true)];
        let generator = Recording::ok("never");
        let out = recommend(&books, &PromptRequest::default(), &generator);
        assert_eq!(out, Recommendation::NoReadBooks);
        assert!(generator.prompts.borrow().is_empty());
    }

    #[test]
    fn seeds_are_capped_at_first_forty_in_order() {
        let books: Vec<_> = (0..41)
            .map(|i| book(&format!("Book {i:02}"), ReadingStatus::Read, false))
            .collect();
        let seeds = read_books(&books);
        assert_eq!(seeds.len(), SEED_LIMIT);
        assert_eq!(seeds[0].title, "Book 00");
        assert_eq!(seeds[39].title, "Book 39");
    }

    #[test]
    fn favorites_filter_applies_after_the_cap() {
        let mut books: Vec<_> = (0..40)
            .map(|i| book(&format!("Plain {i}"), ReadingStatus::Read, false))
            .collect();
        books.push(book("Late Favorite", ReadingStatus::Read, true));
        let generator = Recording::ok("ok");
        let request = PromptRequest {
            favorites_only: true,
            ..Default::default()
        };
        recommend(&books, &request, &generator);
        let prompt = generator.prompts.borrow()[0].clone();
        assert!(!prompt.contains("Late Favorite"));
        assert!(!prompt.contains("Plain 0"));
    }

    #[test]
    fn success_returns_raw_text() {
        let books = vec![book("Read One", ReadingStatus::Read, true)];
        let generator = Recording::ok("1. **Some Book — Some Author**");
        let out = recommend(&books, &PromptRequest::default(), &generator);
        assert_eq!(out.text(), Some("1. **Some Book — Some Author**"));
        match out {
            Recommendation::Generated { prompt, .. } => assert!(prompt.contains("Read One")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn failure_becomes_visible_message() {
        let books = vec![book("Read One", ReadingStatus::Read, true)];
        let generator = Recording::failing("quota exceeded");
        let out = recommend(&books, &PromptRequest::default(), &generator);
        match &out {
            Recommendation::Failed { message, .. } => {
                assert!(message.starts_with("Error:"));
                assert!(message.contains("quota exceeded"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(out.text().is_none());
    }
}
