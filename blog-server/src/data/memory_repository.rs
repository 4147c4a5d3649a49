//! In-memory post storage, used when no `DATABASE_URL` is configured and in tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::data::post_repository::PostRepository;
use crate::domain::error::DomainError;
use crate::domain::post::{NewPost, Post};
use crate::domain::query::{PostSort, SearchFilter};

#[derive(Default)]
struct Table {
    rows: BTreeMap<i64, Post>,
    last_id: i64,
}

/// Keeps rows in a map keyed by id. Data is lost on process restart.
#[derive(Default)]
pub struct InMemoryPostRepository {
    table: RwLock<Table>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list(&self, sort: Option<PostSort>) -> Result<Vec<Post>, DomainError> {
        let table = self.table.read().await;
        let mut posts: Vec<Post> = table.rows.values().cloned().collect();
        if let Some(sort) = sort {
            posts.sort_by(|a, b| sort.compare(a, b));
        }
        Ok(posts)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, DomainError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn create(&self, post: NewPost) -> Result<Post, DomainError> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let created_on = post.created_or_today();
        let created = Post {
            id: table.last_id,
            title: post.title,
            content: post.content,
            author: post.author,
            created: created_on,
            updated: None,
        };
        table.rows.insert(created.id, created.clone());

        info!(post_id = created.id, author = %created.author, "post created");
        Ok(created)
    }

    async fn update(&self, post: &Post) -> Result<Option<Post>, DomainError> {
        let mut table = self.table.write().await;
        let Some(row) = table.rows.get_mut(&post.id) else {
            return Ok(None);
        };
        *row = post.clone();

        info!(post_id = post.id, "post updated");
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, DomainError> {
        let removed = self.table.write().await.rows.remove(&id).is_some();
        if removed {
            info!(post_id = id, "post deleted");
        }
        Ok(removed)
    }

    async fn search(&self, filters: &[SearchFilter]) -> Result<Vec<Post>, DomainError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|post| filters.iter().all(|filter| filter.matches(post)))
            .cloned()
            .collect())
    }
}
