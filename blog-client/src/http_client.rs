use crate::error::BlogClientError;
use crate::{NewPost, Post, PostUpdate, SortDirection};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;

#[derive(Clone)]
pub struct BlogClientHttp {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    message: String,
}

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl BlogClientHttp {
    pub fn connect(endpoint: &str) -> Result<Self, BlogClientError> {
        let base_url = endpoint.trim_end_matches('/').to_string();
        Ok(Self {
            client: Client::builder().build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn read<T: DeserializeOwned>(resp: Response) -> Result<T, BlogClientError> {
        if resp.status().is_success() {
            Ok(resp.json().await?)
        } else {
            Err(BlogClientError::from_http_response(resp).await)
        }
    }

    pub async fn health(&self) -> Result<HealthResponse, BlogClientError> {
        let resp = self.client.get(self.url("/health")).send().await?;
        Self::read(resp).await
    }

    pub async fn list_posts(
        &self,
        sort: Option<&str>,
        direction: Option<SortDirection>,
    ) -> Result<Vec<Post>, BlogClientError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(sort) = sort {
            query.push(("sort", sort.to_string()));
        }
        if let Some(direction) = direction {
            query.push(("direction", direction.to_string()));
        }

        let resp = self
            .client
            .get(self.url("/posts"))
            .query(&query)
            .send()
            .await?;
        Self::read(resp).await
    }

    pub async fn get_post(&self, id: i64) -> Result<Post, BlogClientError> {
        let resp = self
            .client
            .get(self.url(&format!("/posts/{}", id)))
            .send()
            .await?;
        Self::read(resp).await
    }

    pub async fn create_post(&self, post: &NewPost) -> Result<Post, BlogClientError> {
        let resp = self
            .client
            .post(self.url("/posts"))
            .json(post)
            .send()
            .await?;
        Self::read(resp).await
    }

    pub async fn update_post(&self, id: i64, update: &PostUpdate) -> Result<Post, BlogClientError> {
        let resp = self
            .client
            .put(self.url(&format!("/posts/{}", id)))
            .json(update)
            .send()
            .await?;
        Self::read(resp).await
    }

    /// Returns the server's confirmation message.
    pub async fn delete_post(&self, id: i64) -> Result<String, BlogClientError> {
        let resp = self
            .client
            .delete(self.url(&format!("/posts/{}", id)))
            .send()
            .await?;
        let body: MessageResponse = Self::read(resp).await?;
        Ok(body.message)
    }

    /// `filters` are `(field, substring)` pairs, all of which must match.
    pub async fn search_posts(&self, filters: &[(&str, &str)]) -> Result<Vec<Post>, BlogClientError> {
        let resp = self
            .client
            .get(self.url("/posts/search"))
            .query(filters)
            .send()
            .await?;
        Self::read(resp).await
    }
}
