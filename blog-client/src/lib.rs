use chrono::NaiveDate;
use derive_more::Display;
use serde::{Deserialize, Serialize};

mod error;
mod http_client;

pub use error::BlogClientError;
pub use http_client::{BlogClientHttp, HealthResponse};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[display("Post {{ id: {}, title: {}, author: {} }}", id, title, author)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created: NaiveDate,
    pub updated: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<NaiveDate>,
}

/// Fields left as `None` are not sent and keep their stored value.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SortDirection {
    #[display("asc")]
    Asc,
    #[display("desc")]
    Desc,
}
