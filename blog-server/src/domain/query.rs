use std::cmp::Ordering;

use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostField};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        match raw {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(DomainError::validation(
                "Invalid direction. Valid options are 'asc' or 'desc'.",
            )),
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostSort {
    pub field: PostField,
    pub direction: SortDirection,
}

impl PostSort {
    pub fn parse(field: &str, direction: SortDirection) -> Result<Self, DomainError> {
        Ok(Self {
            field: Self::parse_field(field)?,
            direction,
        })
    }

    pub fn parse_field(name: &str) -> Result<PostField, DomainError> {
        PostField::from_name(name).ok_or_else(|| {
            DomainError::validation(format!(
                "Invalid sort field. Valid options are: {}.",
                PostField::valid_names()
            ))
        })
    }

    /// Same order the SQL repository produces: nulls last in both directions,
    /// ties broken by ascending id.
    pub fn compare(&self, a: &Post, b: &Post) -> Ordering {
        let primary = match self.field {
            PostField::Id => Some(a.id.cmp(&b.id)),
            PostField::Title => Some(a.title.as_bytes().cmp(b.title.as_bytes())),
            PostField::Content => Some(a.content.as_bytes().cmp(b.content.as_bytes())),
            PostField::Author => Some(a.author.as_bytes().cmp(b.author.as_bytes())),
            PostField::Created => Some(a.created.cmp(&b.created)),
            PostField::Updated => match (a.updated, b.updated) {
                (Some(x), Some(y)) => Some(x.cmp(&y)),
                (Some(_), None) => return Ordering::Less,
                (None, Some(_)) => return Ordering::Greater,
                (None, None) => None,
            },
        };

        let primary = match (primary, self.direction) {
            (Some(ordering), SortDirection::Asc) => ordering,
            (Some(ordering), SortDirection::Desc) => ordering.reverse(),
            (None, _) => Ordering::Equal,
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// Case-insensitive substring filter on one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    pub field: PostField,
    pub needle: String,
}

impl SearchFilter {
    pub fn parse(field: &str, needle: &str) -> Result<Self, DomainError> {
        let field = PostField::from_name(field).ok_or_else(|| {
            DomainError::validation(format!(
                "Invalid search field '{}'. Valid options are: {}.",
                field,
                PostField::valid_names()
            ))
        })?;
        Ok(Self {
            field,
            needle: needle.to_string(),
        })
    }

    pub fn matches(&self, post: &Post) -> bool {
        post.text(self.field)
            .is_some_and(|text| text.to_lowercase().contains(&self.needle.to_lowercase()))
    }

    /// `%needle%` with LIKE wildcards in the needle escaped.
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.needle.len() + 2);
        pattern.push('%');
        for ch in self.needle.chars() {
            if matches!(ch, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(ch);
        }
        pattern.push('%');
        pattern
    }
}
