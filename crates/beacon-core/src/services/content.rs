//! Read-only public content: notes from the database and articles from WordPress

use crate::error::{BeaconError, Result};
use crate::services::traits::{ArticleSource, NoteStore};
use beacon_types::{Article, Note};
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_PER_PAGE: u32 = 10;
pub const MAX_PER_PAGE: u32 = 100;

pub struct ContentService {
    notes: Arc<dyn NoteStore>,
    articles: Option<Arc<dyn ArticleSource>>,
}

impl ContentService {
    pub fn new(notes: Arc<dyn NoteStore>, articles: Option<Arc<dyn ArticleSource>>) -> Self {
        Self { notes, articles }
    }

    pub async fn notes(&self) -> Result<Vec<Note>> {
        self.notes.list_notes().await
    }

    pub async fn note(&self, id: Uuid) -> Result<Note> {
        self.notes
            .find_note(id)
            .await?
            .ok_or_else(|| BeaconError::NotFound(format!("note {}", id)))
    }

    /// One page of articles; page numbers start at 1 and page size is capped
    pub async fn articles(&self, page: Option<u32>, per_page: Option<u32>) -> Result<Vec<Article>> {
        let page = page.unwrap_or(1).max(1);
        let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
        self.article_source()?.list_articles(page, per_page).await
    }

    pub async fn article(&self, id: u64) -> Result<Article> {
        self.article_source()?
            .find_article(id)
            .await?
            .ok_or_else(|| BeaconError::NotFound(format!("article {}", id)))
    }

    fn article_source(&self) -> Result<&Arc<dyn ArticleSource>> {
        self.articles
            .as_ref()
            .ok_or_else(|| BeaconError::Config("WordPress not configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct NoNotes;

    #[async_trait]
    impl NoteStore for NoNotes {
        async fn list_notes(&self) -> Result<Vec<Note>> {
            Ok(vec![])
        }

        async fn find_note(&self, _id: Uuid) -> Result<Option<Note>> {
            Ok(None)
        }
    }

    #[derive(Default)]
    struct RecordingArticles {
        pages: Mutex<Vec<(u32, u32)>>,
    }

    #[async_trait]
    impl ArticleSource for RecordingArticles {
        async fn list_articles(&self, page: u32, per_page: u32) -> Result<Vec<Article>> {
            self.pages.lock().unwrap().push((page, per_page));
            Ok(vec![])
        }

        async fn find_article(&self, _id: u64) -> Result<Option<Article>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn paging_is_clamped() {
        let articles = Arc::new(RecordingArticles::default());
        let service = ContentService::new(Arc::new(NoNotes), Some(articles.clone() as Arc<dyn ArticleSource>));

        service.articles(None, None).await.unwrap();
        service.articles(Some(0), Some(500)).await.unwrap();

        assert_eq!(*articles.pages.lock().unwrap(), vec![(1, 10), (1, 100)]);
    }

    #[tokio::test]
    async fn missing_records_are_not_found() {
        let service = ContentService::new(Arc::new(NoNotes), Some(Arc::new(RecordingArticles::default()) as Arc<dyn ArticleSource>));

        assert!(matches!(service.note(Uuid::new_v4()).await, Err(BeaconError::NotFound(_))));
        assert!(matches!(service.article(7).await, Err(BeaconError::NotFound(_))));
    }

    #[tokio::test]
    async fn articles_without_wordpress_are_a_configuration_error() {
        let service = ContentService::new(Arc::new(NoNotes), None);

        assert!(matches!(service.articles(None, None).await, Err(BeaconError::Config(_))));
    }
}
