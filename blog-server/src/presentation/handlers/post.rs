use crate::application::blog_manager::BlogManager;
use crate::domain::error::DomainError;
use crate::presentation::dto::{
    ListPostsQuery, MessageResponse, first_values, parse_object, to_dicts,
};
use crate::presentation::utils::{request_id, require_json};
use actix_web::{HttpRequest, HttpResponse, Scope, delete, get, post, put, web};
use tracing::info;

pub fn scope() -> Scope {
    web::scope("/posts")
        .service(get_posts)
        .service(create_post)
        .service(search_posts)
        .service(get_post)
        .service(update_post)
        .service(delete_post)
}

#[get("")]
async fn get_posts(
    req: HttpRequest,
    manager: web::Data<BlogManager>,
    query: web::Query<ListPostsQuery>,
) -> Result<HttpResponse, DomainError> {
    let query = query.into_inner();
    let posts = manager
        .list(query.sort.as_deref(), query.direction.as_deref())
        .await?;

    info!(
        request_id = %request_id(&req),
        count = posts.len(),
        "posts retrieved"
    );

    Ok(HttpResponse::Ok().json(to_dicts(&posts)))
}

#[post("")]
async fn create_post(
    req: HttpRequest,
    manager: web::Data<BlogManager>,
    body: web::Bytes,
) -> Result<HttpResponse, DomainError> {
    require_json(&req)?;
    let data = parse_object(&body, false)?;
    BlogManager::validate(&data)?;

    let post = manager.create(&data).await?;

    info!(
        request_id = %request_id(&req),
        post_id = post.id,
        "post created"
    );

    Ok(HttpResponse::Created().json(post.to_dict()))
}

#[get("/search")]
async fn search_posts(
    req: HttpRequest,
    manager: web::Data<BlogManager>,
    query: web::Query<Vec<(String, String)>>,
) -> Result<HttpResponse, DomainError> {
    let posts = manager.search(&first_values(query.into_inner())).await?;

    info!(
        request_id = %request_id(&req),
        count = posts.len(),
        "posts searched"
    );

    Ok(HttpResponse::Ok().json(to_dicts(&posts)))
}

#[get("/{id}")]
async fn get_post(
    manager: web::Data<BlogManager>,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    let post = manager
        .get_by_id(post_id)
        .await?
        .ok_or(DomainError::PostNotFound(post_id))?;

    Ok(HttpResponse::Ok().json(post.to_dict()))
}

#[put("/{id}")]
async fn update_post(
    req: HttpRequest,
    manager: web::Data<BlogManager>,
    path: web::Path<i64>,
    body: web::Bytes,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    require_json(&req)?;
    let data = parse_object(&body, true)?;

    let post = manager
        .update(post_id, &data)
        .await?
        .ok_or(DomainError::PostNotFound(post_id))?;

    info!(
        request_id = %request_id(&req),
        post_id,
        "post updated"
    );

    Ok(HttpResponse::Ok().json(post.to_dict()))
}

#[delete("/{id}")]
async fn delete_post(
    req: HttpRequest,
    manager: web::Data<BlogManager>,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    if !manager.delete(post_id).await? {
        return Err(DomainError::PostNotFound(post_id));
    }

    info!(
        request_id = %request_id(&req),
        post_id,
        "post deleted"
    );

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: format!("Post with ID {} has been deleted successfully.", post_id),
    }))
}
