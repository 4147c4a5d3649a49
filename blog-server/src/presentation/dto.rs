use std::collections::BTreeMap;

use crate::domain::error::DomainError;
use crate::domain::post::Post;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    pub sort: Option<String>,
    pub direction: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub type PostDict = Map<String, Value>;

pub fn to_dicts(posts: &[Post]) -> Vec<PostDict> {
    posts.iter().map(Post::to_dict).collect()
}

/// Collapses repeated query keys, keeping the first value of each.
pub fn first_values(pairs: Vec<(String, String)>) -> BTreeMap<String, String> {
    let mut query = BTreeMap::new();
    for (key, value) in pairs {
        query.entry(key).or_insert(value);
    }
    query
}

/// Parses a request body that must be a JSON object. Bodies that are not
/// objects, and empty objects unless `allow_empty`, are rejected.
pub fn parse_object(body: &[u8], allow_empty: bool) -> Result<PostDict, DomainError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) if allow_empty || !map.is_empty() => Ok(map),
        _ => Err(DomainError::InvalidJson),
    }
}
