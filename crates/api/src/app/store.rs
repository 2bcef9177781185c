use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub id: u64,
    pub author: String,
    pub title: String,
}

/// Read-only article catalogue backing the demo routes.
#[derive(Debug, Default)]
pub struct ArticleStore {
    articles: BTreeMap<u64, Article>,
}

impl ArticleStore {
    pub fn new(articles: impl IntoIterator<Item = Article>) -> Self {
        Self {
            articles: articles.into_iter().map(|a| (a.id, a)).collect(),
        }
    }

    /// Fixture data used by the binary and the black-box tests.
    pub fn seeded() -> Self {
        Self::new([
            Article {
                id: 1,
                author: "alice".into(),
                title: "Composing permissions".into(),
            },
            Article {
                id: 2,
                author: "bob".into(),
                title: "Lazy inputs".into(),
            },
        ])
    }

    pub fn get(&self, id: u64) -> Option<&Article> {
        self.articles.get(&id)
    }

    pub fn list(&self) -> Vec<Article> {
        self.articles.values().cloned().collect()
    }
}
