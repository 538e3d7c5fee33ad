use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};

use crate::{
    models::{
        blog_post::{CommentDto, CreateBlogPostDto, UpdateBlogPostDto},
        response::CreatedResponse,
    },
    AppState, Result,
};

pub fn blog_posts_handler() -> Router {
    Router::new()
        .route("/", get(get_blog_posts).post(create_blog_post))
        .route(
            "/{blog_post_id}",
            get(get_blog_post)
                .put(update_blog_post)
                .delete(delete_blog_post),
        )
        .route(
            "/{blog_post_id}/comments",
            get(get_comments).post(create_comment),
        )
        .route(
            "/{blog_post_id}/comments/{comment_id}",
            get(get_comment).put(update_comment).delete(delete_comment),
        )
}

async fn create_blog_post(
    Extension(app_state): Extension<Arc<AppState>>,
    payload: core::result::Result<Json<CreateBlogPostDto>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(new_post) = payload?;
    let id = app_state
        .blog_posts_service
        .create_blog_post(new_post)
        .await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

async fn get_blog_posts(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse> {
    let posts = app_state.blog_posts_service.get_blog_posts().await?;
    Ok((StatusCode::OK, Json(posts)))
}

async fn get_blog_post(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(blog_post_id): Path<String>,
) -> Result<impl IntoResponse> {
    let post = app_state
        .blog_posts_service
        .get_blog_post(&blog_post_id)
        .await?;

    Ok((StatusCode::OK, Json(post)))
}

async fn update_blog_post(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(blog_post_id): Path<String>,
    payload: core::result::Result<Json<UpdateBlogPostDto>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(update) = payload?;
    let updated_post = app_state
        .blog_posts_service
        .update_blog_post(&blog_post_id, update)
        .await?;

    Ok((StatusCode::OK, Json(updated_post)))
}

async fn delete_blog_post(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(blog_post_id): Path<String>,
) -> Result<impl IntoResponse> {
    app_state
        .blog_posts_service
        .delete_blog_post(&blog_post_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn create_comment(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(blog_post_id): Path<String>,
    payload: core::result::Result<Json<CommentDto>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(comment) = payload?;
    let post = app_state
        .blog_posts_service
        .add_comment(&blog_post_id, comment)
        .await?;

    Ok((StatusCode::OK, Json(post)))
}

async fn get_comments(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(blog_post_id): Path<String>,
) -> Result<impl IntoResponse> {
    let comments = app_state
        .blog_posts_service
        .get_comments(&blog_post_id)
        .await?;

    Ok((StatusCode::OK, Json(comments)))
}

async fn get_comment(
    Extension(app_state): Extension<Arc<AppState>>,
    Path((blog_post_id, comment_id)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let comment = app_state
        .blog_posts_service
        .get_comment(&blog_post_id, &comment_id)
        .await?;

    Ok((StatusCode::OK, Json(comment)))
}

async fn update_comment(
    Extension(app_state): Extension<Arc<AppState>>,
    Path((blog_post_id, comment_id)): Path<(String, String)>,
    payload: core::result::Result<Json<CommentDto>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(update) = payload?;
    let post = app_state
        .blog_posts_service
        .update_comment(&blog_post_id, &comment_id, update)
        .await?;

    Ok((StatusCode::OK, Json(post)))
}

async fn delete_comment(
    Extension(app_state): Extension<Arc<AppState>>,
    Path((blog_post_id, comment_id)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let post = app_state
        .blog_posts_service
        .delete_comment(&blog_post_id, &comment_id)
        .await?;

    Ok((StatusCode::OK, Json(post)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
        Router,
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;
    use uuid::Uuid;

    use async_trait::async_trait;

    use crate::{
        config::Config,
        models::blog_post::BlogPost,
        repositories::{
            blog_posts_repo::{BlogPostsRepository, PostMutation},
            memory_repo::InMemoryRepo,
        },
        routes::create_routes,
        services::posts::BlogPostsService,
        AppState, Result,
    };

    fn app() -> Router {
        let config = Config::default();
        app_with_repo(Arc::new(InMemoryRepo::new()), &config)
    }

    fn app_with_repo(repo: Arc<dyn BlogPostsRepository>, config: &Config) -> Router {
        let service = BlogPostsService::new(repo, &config.avatar_base_url);
        create_routes(Arc::new(AppState {
            blog_posts_service: service,
        }))
    }

    /// Store whose connection is gone: every call fails.
    struct UnreachableRepo;

    #[async_trait]
    impl BlogPostsRepository for UnreachableRepo {
        async fn get_blog_posts(&self) -> Result<Vec<BlogPost>> {
            Err(sqlx::Error::PoolTimedOut.into())
        }

        async fn find_blog_post(&self, _post_id: Uuid) -> Result<Option<BlogPost>> {
            Err(sqlx::Error::PoolTimedOut.into())
        }

        async fn insert_blog_post(&self, _post: &BlogPost) -> Result<()> {
            Err(sqlx::Error::PoolTimedOut.into())
        }

        async fn update_blog_post(
            &self,
            _post_id: Uuid,
            _mutation: PostMutation,
        ) -> Result<Option<BlogPost>> {
            Err(sqlx::Error::PoolTimedOut.into())
        }

        async fn delete_blog_post(&self, _post_id: Uuid) -> Result<bool> {
            Err(sqlx::Error::PoolTimedOut.into())
        }
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn sample_post() -> Value {
        json!({
            "category": "tech",
            "title": "Hi",
            "readTime": { "value": 5, "unit": "min" },
            "content": "body",
            "author": { "name": "Ann" }
        })
    }

    #[tokio::test]
    async fn blog_post_lifecycle() {
        let app = app();

        let (status, created) = send(&app, Method::POST, "/blogposts", Some(sample_post())).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["_id"].as_str().unwrap().to_string();

        let (status, post) = send(&app, Method::GET, &format!("/blogposts/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(post["_id"], json!(id));
        assert_eq!(post["title"], json!("Hi"));
        assert_eq!(post["readTime"]["unit"], json!("min"));
        assert!(post["author"]["avatar"].as_str().unwrap().contains("Ann"));
        assert!(post["createdAt"].is_string());

        let (status, post) = send(
            &app,
            Method::POST,
            &format!("/blogposts/{id}/comments"),
            Some(json!({ "comment": "nice" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(post["comments"].as_array().unwrap().len(), 1);
        assert!(post["comments"][0]["addedOn"].is_string());

        let (status, body) = send(&app, Method::DELETE, &format!("/blogposts/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, body) = send(&app, Method::GET, &format!("/blogposts/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["message"].as_str().unwrap().contains(&id));
    }

    #[tokio::test]
    async fn list_returns_every_post() {
        let app = app();
        let (status, list) = send(&app, Method::GET, "/blogposts", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list, json!([]));

        send(&app, Method::POST, "/blogposts", Some(sample_post())).await;
        send(&app, Method::POST, "/blogposts", Some(sample_post())).await;

        let (_, list) = send(&app, Method::GET, "/blogposts", None).await;
        assert_eq!(list.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn invalid_bodies_are_bad_requests() {
        let app = app();

        let mut missing_title = sample_post();
        missing_title.as_object_mut().unwrap().remove("title");
        let (status, body) = send(&app, Method::POST, "/blogposts", Some(missing_title)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("Title is required"));

        let mut wrong_type = sample_post();
        wrong_type["readTime"]["value"] = json!("five");
        let (status, body) = send(&app, Method::POST, "/blogposts", Some(wrong_type)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());

        let (status, _) = send(&app, Method::GET, "/blogposts/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let app = app();
        let missing = Uuid::now_v7();

        for (method, uri, body) in [
            (Method::GET, format!("/blogposts/{missing}"), None),
            (Method::PUT, format!("/blogposts/{missing}"), Some(json!({ "title": "x" }))),
            (Method::DELETE, format!("/blogposts/{missing}"), None),
            (
                Method::POST,
                format!("/blogposts/{missing}/comments"),
                Some(json!({ "comment": "x" })),
            ),
            (Method::GET, format!("/blogposts/{missing}/comments"), None),
            (Method::GET, format!("/blogposts/{missing}/comments/{missing}"), None),
            (
                Method::PUT,
                format!("/blogposts/{missing}/comments/{missing}"),
                Some(json!({ "comment": "x" })),
            ),
            (Method::DELETE, format!("/blogposts/{missing}/comments/{missing}"), None),
        ] {
            let (status, body) = send(&app, method.clone(), &uri, body).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
            assert!(body["message"].is_string());
        }

        let (status, _) = send(&app, Method::GET, "/nowhere", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_keeps_untouched_fields() {
        let app = app();
        let (_, created) = send(&app, Method::POST, "/blogposts", Some(sample_post())).await;
        let id = created["_id"].as_str().unwrap().to_string();
        send(
            &app,
            Method::POST,
            &format!("/blogposts/{id}/comments"),
            Some(json!({ "comment": "stay" })),
        )
        .await;
        let (_, before) = send(&app, Method::GET, &format!("/blogposts/{id}"), None).await;

        let (status, after) = send(
            &app,
            Method::PUT,
            &format!("/blogposts/{id}"),
            Some(json!({ "title": "Renamed" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(after["title"], json!("Renamed"));
        for field in ["category", "readTime", "author", "content", "comments", "createdAt"] {
            assert_eq!(after[field], before[field], "{field}");
        }

        let (status, _) = send(
            &app,
            Method::PUT,
            &format!("/blogposts/{id}"),
            Some(json!({ "content": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn comment_routes() {
        let app = app();
        let (_, created) = send(&app, Method::POST, "/blogposts", Some(sample_post())).await;
        let id = created["_id"].as_str().unwrap().to_string();

        let comments_uri = format!("/blogposts/{id}/comments");
        send(&app, Method::POST, &comments_uri, Some(json!({ "comment": "a" }))).await;
        let (_, post) =
            send(&app, Method::POST, &comments_uri, Some(json!({ "comment": "b" }))).await;
        let comment_id = post["comments"][1]["_id"].as_str().unwrap().to_string();

        let (status, comments) = send(&app, Method::GET, &comments_uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(comments.as_array().unwrap().len(), 2);
        assert_eq!(comments[1]["comment"], json!("b"));

        let comment_uri = format!("/blogposts/{id}/comments/{comment_id}");
        let (status, comment) = send(&app, Method::GET, &comment_uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(comment["_id"], json!(comment_id));

        let (status, post) = send(
            &app,
            Method::PUT,
            &format!("/blogposts/{id}/comments/{comment_id}"),
            Some(json!({ "comment": "edited" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(post["comments"][1]["comment"], json!("edited"));
        assert!(post["comments"][1]["updatedOn"].is_string());

        let (status, post) = send(
            &app,
            Method::DELETE,
            &format!("/blogposts/{id}/comments/{}", Uuid::now_v7()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(post["comments"].as_array().unwrap().len(), 2);

        let (status, post) = send(&app, Method::DELETE, &comment_uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(post["comments"].as_array().unwrap().len(), 1);
        assert_eq!(post["comments"][0]["comment"], json!("a"));
    }

    #[tokio::test]
    async fn store_failures_are_generic_server_errors() {
        let app = app_with_repo(Arc::new(UnreachableRepo), &Config::default());
        let id = Uuid::now_v7();

        for (method, uri, body) in [
            (Method::GET, "/blogposts".to_string(), None),
            (Method::POST, "/blogposts".to_string(), Some(sample_post())),
            (Method::GET, format!("/blogposts/{id}"), None),
            (Method::DELETE, format!("/blogposts/{id}"), None),
            (
                Method::POST,
                format!("/blogposts/{id}/comments"),
                Some(json!({ "comment": "x" })),
            ),
        ] {
            let (status, body) = send(&app, method.clone(), &uri, body).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{method} {uri}");
            assert_eq!(body, json!({ "message": "Generic server error" }));
        }
    }
}
