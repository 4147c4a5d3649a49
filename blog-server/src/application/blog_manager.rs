use std::collections::BTreeMap;
use std::sync::Arc;

use crate::data::post_repository::PostRepository;
use crate::domain::error::DomainError;
use crate::domain::post::{NewPost, Post, PostChanges, PostField, is_truthy, today};
use crate::domain::query::{PostSort, SearchFilter, SortDirection};
use serde_json::{Map, Value};
use tracing::instrument;

/// Mediates between the HTTP layer and post storage.
#[derive(Clone)]
pub struct BlogManager {
    repo: Arc<dyn PostRepository>,
}

impl BlogManager {
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }

    /// All posts, optionally ordered. An empty `sort` counts as absent;
    /// `direction` defaults to ascending.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        sort: Option<&str>,
        direction: Option<&str>,
    ) -> Result<Vec<Post>, DomainError> {
        let field = sort
            .filter(|field| !field.is_empty())
            .map(PostSort::parse_field)
            .transpose()?;
        let direction = direction.map(SortDirection::parse).transpose()?.unwrap_or_default();
        let sort = field.map(|field| PostSort { field, direction });

        self.repo.list(sort).await
    }

    /// Expects `data` to have passed [`BlogManager::validate`].
    #[instrument(skip(self, data))]
    pub async fn create(&self, data: &Map<String, Value>) -> Result<Post, DomainError> {
        let post = NewPost::from_map(data)?;
        self.repo.create(post).await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Post>, DomainError> {
        self.repo.find_by_id(id).await
    }

    #[instrument(skip(self, data))]
    pub async fn update(
        &self,
        id: i64,
        data: &Map<String, Value>,
    ) -> Result<Option<Post>, DomainError> {
        let Some(current) = self.repo.find_by_id(id).await? else {
            return Ok(None);
        };
        let changes = PostChanges::from_map(data)?;
        let next = current.update(&changes, today());
        self.repo.update(&next).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<bool, DomainError> {
        self.repo.delete(id).await
    }

    #[instrument(skip(self))]
    pub async fn search(&self, query: &BTreeMap<String, String>) -> Result<Vec<Post>, DomainError> {
        let filters = query
            .iter()
            .map(|(field, needle)| SearchFilter::parse(field, needle))
            .collect::<Result<Vec<_>, _>>()?;

        self.repo.search(&filters).await
    }

    /// Fails on the first required field that is missing or falsy.
    pub fn validate(data: &Map<String, Value>) -> Result<(), DomainError> {
        for field in PostField::ALL.into_iter().filter(|field| field.is_required()) {
            if !data.get(field.name()).is_some_and(is_truthy) {
                return Err(DomainError::validation(format!(
                    "{} is required.",
                    field.label()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory_repository::InMemoryPostRepository;
    use serde_json::json;

    fn manager() -> BlogManager {
        BlogManager::new(Arc::new(InMemoryPostRepository::new()))
    }

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    async fn seed(manager: &BlogManager, title: &str, author: &str) -> Post {
        let data = object(json!({ "title": title, "content": "text", "author": author }));
        BlogManager::validate(&data).unwrap();
        manager.create(&data).await.unwrap()
    }

    #[tokio::test]
    async fn created_post_reads_back_with_defaults() {
        let manager = manager();
        let input = json!({ "title": "Hello", "content": "World", "author": "Ann Lee" });
        let created = manager.create(&object(input.clone())).await.unwrap();

        let fetched = manager.get_by_id(created.id).await.unwrap().unwrap();
        let dict = fetched.to_dict();
        for (key, value) in input.as_object().unwrap() {
            assert_eq!(&dict[key], value);
        }
        assert_eq!(dict["id"], json!(created.id));
        assert_eq!(dict["created"], json!(today().to_string()));
        assert_eq!(dict["updated"], Value::Null);
    }

    #[tokio::test]
    async fn empty_update_only_stamps_updated() {
        let manager = manager();
        let post = seed(&manager, "Hello", "Ann").await;

        let updated = manager.update(post.id, &Map::new()).await.unwrap().unwrap();
        assert_eq!(updated.updated, Some(today()));
        assert_eq!(
            Post {
                updated: None,
                ..updated.clone()
            },
            post
        );
    }

    #[tokio::test]
    async fn update_replaces_given_fields() {
        let manager = manager();
        let post = seed(&manager, "Hello", "Ann").await;

        let updated = manager
            .update(post.id, &object(json!({ "title": "Bye", "mood": "happy" })))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Bye");
        assert_eq!(updated.author, "Ann");

        let stored = manager.get_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn update_of_missing_post_is_none() {
        let manager = manager();
        assert_eq!(manager.update(404, &Map::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_rejects_id_and_leaves_row_alone() {
        let manager = manager();
        let post = seed(&manager, "Hello", "Ann").await;

        let err = manager
            .update(post.id, &object(json!({ "id": 77, "title": "x" })))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(manager.get_by_id(post.id).await.unwrap(), Some(post));
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_was_removed() {
        let manager = manager();
        assert!(!manager.delete(1).await.unwrap());

        let post = seed(&manager, "Hello", "Ann").await;
        assert!(manager.delete(post.id).await.unwrap());
        assert_eq!(manager.get_by_id(post.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_sorts_by_title_descending() {
        let manager = manager();
        for title in ["banana", "apple", "cherry", "apple"] {
            seed(&manager, title, "someone").await;
        }

        let posts = manager.list(Some("title"), Some("desc")).await.unwrap();
        let titles: Vec<&str> = posts.iter().map(|post| post.title.as_str()).collect();
        assert_eq!(titles, vec!["cherry", "banana", "apple", "apple"]);
        assert!(posts.windows(2).all(|pair| pair[0].title >= pair[1].title));
    }

    #[tokio::test]
    async fn list_without_sort_returns_everything() {
        let manager = manager();
        seed(&manager, "b", "x").await;
        seed(&manager, "a", "y").await;

        assert_eq!(manager.list(None, None).await.unwrap().len(), 2);
        assert_eq!(manager.list(Some(""), Some("desc")).await.unwrap().len(), 2);
        assert!(manager.list(None, None).await.is_ok_and(|posts| posts[0].title == "b"));
    }

    #[tokio::test]
    async fn list_rejects_bad_sort_and_direction() {
        let manager = manager();

        let err = manager.list(Some("bogus"), None).await.unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, DomainError::Validation(_)));
        for field in PostField::ALL {
            assert!(message.contains(field.name()));
        }

        let err = manager.list(None, Some("sideways")).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_anded() {
        let manager = manager();
        let ann = seed(&manager, "Rust tips", "Ann Lee").await;
        seed(&manager, "Rust tricks", "Bob").await;

        let query = BTreeMap::from([("author".to_string(), "ann".to_string())]);
        assert_eq!(manager.search(&query).await.unwrap(), vec![ann.clone()]);

        let query = BTreeMap::from([
            ("title".to_string(), "RUST".to_string()),
            ("author".to_string(), "lee".to_string()),
        ]);
        assert_eq!(manager.search(&query).await.unwrap(), vec![ann]);

        let query = BTreeMap::from([("title".to_string(), "python".to_string())]);
        assert!(manager.search(&query).await.unwrap().is_empty());

        assert_eq!(manager.search(&BTreeMap::new()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn search_rejects_unknown_fields() {
        let manager = manager();
        let query = BTreeMap::from([("rating".to_string(), "5".to_string())]);
        let err = manager.search(&query).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn validate_names_first_missing_field() {
        let err = BlogManager::validate(&Map::new()).unwrap_err();
        assert_eq!(err.to_string(), "Title is required.");

        let err = BlogManager::validate(&object(json!({ "title": "t", "content": "" })))
            .unwrap_err();
        assert_eq!(err.to_string(), "Content is required.");

        let err = BlogManager::validate(&object(json!({
            "title": "t",
            "content": "c",
            "author": null
        })))
        .unwrap_err();
        assert_eq!(err.to_string(), "Author is required.");
    }

    #[test]
    fn validate_accepts_complete_posts() {
        let data = object(json!({ "title": "t", "content": "c", "author": "a" }));
        assert!(BlogManager::validate(&data).is_ok());
    }

    #[tokio::test]
    async fn create_round_trips_supplied_fields() {
        let manager = manager();
        let input = object(json!({
            "title": "Dated",
            "content": "Body",
            "author": "Cy",
            "created": "2020-02-29"
        }));
        let dict = manager.create(&input).await.unwrap().to_dict();
        for (key, value) in &input {
            assert_eq!(&dict[key], value);
        }
    }
}
