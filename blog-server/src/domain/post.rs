use chrono::{Local, NaiveDate};
use serde_json::{Map, Value, json};

use crate::domain::error::DomainError;

/// Columns of the `posts` table, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PostField {
    Id,
    Title,
    Content,
    Author,
    Created,
    Updated,
}

impl PostField {
    pub const ALL: [PostField; 6] = [
        PostField::Id,
        PostField::Title,
        PostField::Content,
        PostField::Author,
        PostField::Created,
        PostField::Updated,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PostField::Id => "id",
            PostField::Title => "title",
            PostField::Content => "content",
            PostField::Author => "author",
            PostField::Created => "created",
            PostField::Updated => "updated",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    /// Name with the first letter upper-cased, as used in validation messages.
    pub fn label(self) -> String {
        let name = self.name();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Not the primary key, not nullable and without a default.
    pub fn is_required(self) -> bool {
        matches!(self, PostField::Title | PostField::Content | PostField::Author)
    }

    pub fn is_text(self) -> bool {
        matches!(self, PostField::Title | PostField::Content | PostField::Author)
    }

    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|field| field.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created: NaiveDate,
    pub updated: Option<NaiveDate>,
}

impl Post {
    pub fn value(&self, field: PostField) -> Value {
        match field {
            PostField::Id => json!(self.id),
            PostField::Title => json!(self.title),
            PostField::Content => json!(self.content),
            PostField::Author => json!(self.author),
            PostField::Created => json!(self.created.to_string()),
            PostField::Updated => self
                .updated
                .map(|date| json!(date.to_string()))
                .unwrap_or(Value::Null),
        }
    }

    /// Text rendering used for substring search. `None` for an unset `updated`.
    pub fn text(&self, field: PostField) -> Option<String> {
        match field {
            PostField::Id => Some(self.id.to_string()),
            PostField::Title => Some(self.title.clone()),
            PostField::Content => Some(self.content.clone()),
            PostField::Author => Some(self.author.clone()),
            PostField::Created => Some(self.created.to_string()),
            PostField::Updated => self.updated.map(|date| date.to_string()),
        }
    }

    /// Every field keyed by column name; dates as `YYYY-MM-DD`.
    pub fn to_dict(&self) -> Map<String, Value> {
        PostField::ALL
            .into_iter()
            .map(|field| (field.name().to_string(), self.value(field)))
            .collect()
    }

    /// Returns a copy with `changes` applied and `updated` stamped with `today`.
    pub fn update(&self, changes: &PostChanges, today: NaiveDate) -> Post {
        Post {
            id: self.id,
            title: changes.title.clone().unwrap_or_else(|| self.title.clone()),
            content: changes.content.clone().unwrap_or_else(|| self.content.clone()),
            author: changes.author.clone().unwrap_or_else(|| self.author.clone()),
            created: changes.created.unwrap_or(self.created),
            updated: Some(today),
        }
    }
}

/// A post that storage has not assigned an id to yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author: String,
    pub created: Option<NaiveDate>,
}

impl NewPost {
    pub fn new(title: String, content: String, author: String) -> Self {
        Self {
            title,
            content,
            author,
            created: None,
        }
    }

    /// The caller's publication date, or the server's local date.
    pub fn created_or_today(&self) -> NaiveDate {
        self.created.unwrap_or_else(today)
    }

    /// Copies the writable columns out of a request body. `id` and `updated` are
    /// never taken from the caller on creation.
    pub fn from_map(data: &Map<String, Value>) -> Result<Self, DomainError> {
        let text = |field: PostField| -> Result<String, DomainError> {
            match data.get(field.name()) {
                Some(value) => non_empty_text(field, value),
                None => Err(DomainError::validation(format!(
                    "{} is required.",
                    field.label()
                ))),
            }
        };

        let created = data
            .get(PostField::Created.name())
            .map(|value| date_value(PostField::Created, value))
            .transpose()?;

        Ok(Self {
            title: text(PostField::Title)?,
            content: text(PostField::Content)?,
            author: text(PostField::Author)?,
            created,
        })
    }
}

/// Partial replacement of a post's columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub created: Option<NaiveDate>,
}

impl PostChanges {
    pub fn from_map(data: &Map<String, Value>) -> Result<Self, DomainError> {
        let mut changes = PostChanges::default();
        for (key, value) in data {
            let Some(field) = PostField::from_name(key) else {
                continue;
            };
            match field {
                PostField::Id => return Err(DomainError::validation("Id is read-only.")),
                PostField::Title => changes.title = Some(non_empty_text(field, value)?),
                PostField::Content => changes.content = Some(non_empty_text(field, value)?),
                PostField::Author => changes.author = Some(non_empty_text(field, value)?),
                PostField::Created => changes.created = Some(date_value(field, value)?),
                // stamped by the server on every update
                PostField::Updated => {}
            }
        }
        Ok(changes)
    }

    pub fn is_empty(&self) -> bool {
        self == &PostChanges::default()
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Python-style truthiness of a JSON value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(entries) => !entries.is_empty(),
    }
}

fn non_empty_text(field: PostField, value: &Value) -> Result<String, DomainError> {
    match value {
        Value::String(text) if !text.is_empty() => Ok(text.clone()),
        Value::String(_) | Value::Null => Err(DomainError::validation(format!(
            "{} is required.",
            field.label()
        ))),
        _ => Err(DomainError::validation(format!(
            "{} must be a string.",
            field.label()
        ))),
    }
}

fn date_value(field: PostField, value: &Value) -> Result<NaiveDate, DomainError> {
    value
        .as_str()
        .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
        .ok_or_else(|| {
            DomainError::validation(format!("{} must be a date in YYYY-MM-DD format.", field.label()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Post {
        Post {
            id: 3,
            title: "First".into(),
            content: "Hello".into(),
            author: "Ann Lee".into(),
            created: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            updated: None,
        }
    }

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn created_defaults_to_local_today() {
        let mut post = NewPost::new("T".into(), "C".into(), "A".into());
        assert_eq!(post.created_or_today(), today());

        let date = NaiveDate::from_ymd_opt(2020, 2, 29).unwrap();
        post.created = Some(date);
        assert_eq!(post.created_or_today(), date);
    }

    #[test]
    fn to_dict_renders_every_column() {
        let dict = sample().to_dict();
        assert_eq!(dict.len(), PostField::ALL.len());
        assert_eq!(dict["id"], json!(3));
        assert_eq!(dict["author"], json!("Ann Lee"));
        assert_eq!(dict["created"], json!("2024-01-15"));
        assert_eq!(dict["updated"], Value::Null);
    }

    #[test]
    fn update_with_no_changes_only_stamps_updated() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let post = sample();
        let updated = post.update(&PostChanges::default(), today);

        assert_eq!(updated.updated, Some(today));
        assert_eq!(updated.title, post.title);
        assert_eq!(updated.created, post.created);
        assert_eq!(post.updated, None);
    }

    #[test]
    fn changes_ignore_unknown_keys_and_updated() {
        let changes = PostChanges::from_map(&object(json!({
            "title": "Second",
            "likes": 10,
            "updated": "1999-01-01"
        })))
        .unwrap();

        assert_eq!(changes.title.as_deref(), Some("Second"));
        assert_eq!(changes.content, None);
        assert!(!changes.is_empty());
    }

    #[test]
    fn changes_reject_id_and_empty_text() {
        let err = PostChanges::from_map(&object(json!({ "id": 9 }))).unwrap_err();
        assert_eq!(err.to_string(), "Id is read-only.");

        let err = PostChanges::from_map(&object(json!({ "author": "" }))).unwrap_err();
        assert_eq!(err.to_string(), "Author is required.");

        let err = PostChanges::from_map(&object(json!({ "content": 12 }))).unwrap_err();
        assert_eq!(err.to_string(), "Content must be a string.");
    }

    #[test]
    fn new_post_parses_optional_created() {
        let post = NewPost::from_map(&object(json!({
            "id": 99,
            "title": "T",
            "content": "C",
            "author": "A",
            "created": "2023-05-06"
        })))
        .unwrap();

        assert_eq!(post.created, NaiveDate::from_ymd_opt(2023, 5, 6));

        let err = NewPost::from_map(&object(json!({
            "title": "T",
            "content": "C",
            "author": "A",
            "created": "yesterday"
        })))
        .unwrap_err();
        assert!(err.to_string().starts_with("Created must be a date"));
    }

    #[test]
    fn truthiness_matches_falsy_values() {
        for value in [json!(null), json!(false), json!(0), json!(""), json!([]), json!({})] {
            assert!(!is_truthy(&value), "{value} should be falsy");
        }
        for value in [json!(true), json!(1), json!("x"), json!([0]), json!({ "a": 1 })] {
            assert!(is_truthy(&value), "{value} should be truthy");
        }
    }

    #[test]
    fn labels_are_capitalized() {
        assert_eq!(PostField::Title.label(), "Title");
        assert_eq!(PostField::from_name("updated"), Some(PostField::Updated));
        assert_eq!(PostField::from_name("Title"), None);
    }
}
