use crate::domain::error::DomainError;
use crate::domain::post::{NewPost, Post};
use crate::domain::query::{PostSort, SearchFilter};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{error, info};

const POST_COLUMNS: &str = "id, title, content, author, created, updated";

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn list(&self, sort: Option<PostSort>) -> Result<Vec<Post>, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, DomainError>;
    async fn create(&self, post: NewPost) -> Result<Post, DomainError>;
    /// Persists every column of `post` except `id`. `None` when the row is gone.
    async fn update(&self, post: &Post) -> Result<Option<Post>, DomainError>;
    async fn delete(&self, id: i64) -> Result<bool, DomainError>;
    async fn search(&self, filters: &[SearchFilter]) -> Result<Vec<Post>, DomainError>;
}

#[derive(Clone)]
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn order_clause(sort: Option<PostSort>) -> String {
    match sort {
        Some(sort) => {
            let collate = if sort.field.is_text() { " COLLATE \"C\"" } else { "" };
            format!(
                " ORDER BY {}{} {} NULLS LAST, id ASC",
                sort.field.name(),
                collate,
                sort.direction.as_sql()
            )
        }
        None => " ORDER BY id ASC".to_string(),
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    error!("db error {}: {}", context, e);
    DomainError::Internal(e.to_string())
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list(&self, sort: Option<PostSort>) -> Result<Vec<Post>, DomainError> {
        let sql = format!("SELECT {} FROM posts{}", POST_COLUMNS, order_clause(sort));
        sqlx::query_as::<_, Post>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("while listing posts", e))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, DomainError> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, content, author, created, updated
            FROM posts WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error(&format!("find_by_id {}", id), e))
    }

    async fn create(&self, post: NewPost) -> Result<Post, DomainError> {
        let created = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (title, content, author, created)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, content, author, created, updated
            "#,
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.author)
        .bind(post.created_or_today())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("while creating post", e))?;

        info!(post_id = created.id, author = %created.author, "post created");
        Ok(created)
    }

    async fn update(&self, post: &Post) -> Result<Option<Post>, DomainError> {
        let updated = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET
                title = $1,
                content = $2,
                author = $3,
                created = $4,
                updated = $5
            WHERE id = $6
            RETURNING id, title, content, author, created, updated
            "#,
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.author)
        .bind(post.created)
        .bind(post.updated)
        .bind(post.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error(&format!("while updating post {}", post.id), e))?;

        if updated.is_some() {
            info!(post_id = post.id, "post updated");
        }

        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<bool, DomainError> {
        let deleted = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error(&format!("while deleting post {}", id), e))?;

        let removed = deleted.rows_affected() > 0;
        if removed {
            info!(post_id = id, "post deleted");
        }
        Ok(removed)
    }

    async fn search(&self, filters: &[SearchFilter]) -> Result<Vec<Post>, DomainError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM posts WHERE TRUE", POST_COLUMNS));

        for filter in filters {
            builder.push(" AND CAST(");
            builder.push(filter.field.name());
            builder.push(" AS TEXT) ILIKE ");
            builder.push_bind(filter.like_pattern());
            builder.push(" ESCAPE '\\'");
        }
        builder.push(order_clause(None));

        builder
            .build_query_as::<Post>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("while searching posts", e))
    }
}
