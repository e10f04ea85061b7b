//! In-memory article store standing in for the news database

use proto::news::News;

/// Saved articles, in insertion order
#[derive(Debug, Default)]
pub struct NewsStore {
    articles: Vec<News>,
}

impl NewsStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Save articles, skipping ones already stored (same title and publish time).
    ///
    /// Returns how many were new.
    pub fn save(&mut self, articles: impl IntoIterator<Item = News>) -> usize {
        let mut added = 0;
        for article in articles {
            let exists = self
                .articles
                .iter()
                .any(|a| a.title == article.title && a.published_at == article.published_at);
            if !exists {
                self.articles.push(article);
                added += 1;
            }
        }
        added
    }

    /// All saved articles
    pub fn all(&self) -> Vec<News> {
        self.articles.clone()
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::article;

    #[test]
    fn test_save_skips_duplicates() {
        let mut store = NewsStore::new();
        let first = article("bbc", "BBC", "A", "T", "2024-01-01");

        assert_eq!(store.save(vec![first.clone()]), 1);
        assert_eq!(store.save(vec![first.clone()]), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_keeps_insertion_order() {
        let mut store = NewsStore::new();
        store.save(vec![
            article("a", "A", "x", "first", "2024-01-01"),
            article("b", "B", "y", "second", "2024-01-02"),
        ]);

        let titles: Vec<_> = store.all().into_iter().map(|a| a.title).collect();
        assert_eq!(titles, vec!["first", "second"]);
    }
}
