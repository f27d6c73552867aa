//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business rules. Caller identity comes from the
//! `userId` cookie via [`CallerIdentity`] and is passed to services
//! explicitly.

use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::AppendHeaders,
    Json,
};

use super::auth::{clear_login_cookies, login_cookies, CallerIdentity};
use super::dto::{
    CreateCommentRequest, CreatePostRequest, HealthResponse, ImageUrlResponse, LoginRequest,
    MessageResponse, NicknameRequest, PasswordRequest, RegisterRequest, UpdateCommentRequest,
    UpdatePostRequest, UserListResponse, UserResponse, ViewsResponse,
};
use super::error::AppError;
use super::state::AppState;
use super::uploads::store_image;
use crate::models::{Comment, CommentId, NewUser, Post, PostId, UserId};
use crate::services::{accounts, comments, posts, PostUpdate};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Set-Cookie headers plus a JSON body.
type WithCookies<T> = (AppendHeaders<[(header::HeaderName, String); 2]>, Json<T>);

fn set_cookies<T>(cookies: [String; 2], body: T) -> WithCookies<T> {
    let [first, second] = cookies;
    (
        AppendHeaders([
            (header::SET_COOKIE, first),
            (header::SET_COOKIE, second),
        ]),
        Json(body),
    )
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let storage = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        storage,
    }))
}

// =============================================================================
// Accounts
// =============================================================================

/// GET /api/accounts
pub async fn list_accounts(State(state): State<AppState>) -> HandlerResult<UserListResponse> {
    let users = accounts::get_all(state.repository.as_ref()).await?;
    Ok(Json(UserListResponse { users }))
}

/// GET /api/accounts/{user_id}
pub async fn get_account(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> HandlerResult<UserResponse> {
    let user = accounts::get_by_id(state.repository.as_ref(), UserId::new(user_id)).await?;
    Ok(Json(UserResponse { user }))
}

/// POST /api/accounts
pub async fn register_account(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> HandlerResult<UserResponse> {
    let user = accounts::register(
        state.repository.as_ref(),
        NewUser {
            nickname: request.nickname,
            email: request.email,
            password: request.password,
            profile_image_url: request.profile_image_url,
        },
    )
    .await?;
    Ok(Json(UserResponse { user }))
}

/// DELETE /api/accounts/{user_id}
///
/// Cascades to the user's posts and their comments, then clears the
/// identity cookies the way logout does.
pub async fn delete_account(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<WithCookies<MessageResponse>, AppError> {
    accounts::delete(state.repository.as_ref(), UserId::new(user_id)).await?;
    Ok(set_cookies(
        clear_login_cookies(),
        MessageResponse::new("User and associated posts deleted successfully"),
    ))
}

/// PUT /api/accounts/{user_id}/nickname
pub async fn update_nickname(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(request): Json<NicknameRequest>,
) -> HandlerResult<MessageResponse> {
    accounts::update_nickname(state.repository.as_ref(), UserId::new(user_id), request.nickname)
        .await?;
    Ok(Json(MessageResponse::new("Nickname updated successfully")))
}

/// PUT /api/accounts/{user_id}/password
pub async fn update_password(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(request): Json<PasswordRequest>,
) -> HandlerResult<MessageResponse> {
    accounts::update_password(state.repository.as_ref(), UserId::new(user_id), request.password)
        .await?;
    Ok(Json(MessageResponse::new("Password updated successfully")))
}

/// PUT /api/accounts/{user_id}/profileimg
///
/// Multipart upload (field `profileimg`); stores the file and points the
/// account at the stored URL.
pub async fn upload_profile_image(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    multipart: Multipart,
) -> HandlerResult<ImageUrlResponse> {
    let user_id = UserId::new(user_id);
    // Reject unknown accounts before writing anything to disk.
    accounts::get_by_id(state.repository.as_ref(), user_id).await?;

    let url = store_image(&state.uploads_dir, "profileimg", multipart).await?;
    accounts::update_profile_image(state.repository.as_ref(), user_id, url.clone()).await?;
    Ok(Json(ImageUrlResponse { image_url: url }))
}

// =============================================================================
// Login / Logout
// =============================================================================

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<WithCookies<UserResponse>, AppError> {
    let user =
        accounts::login(state.repository.as_ref(), &request.email, &request.password).await?;
    let cookies = login_cookies(user.user_id);
    Ok(set_cookies(cookies, UserResponse { user }))
}

/// POST /logout
pub async fn logout() -> WithCookies<MessageResponse> {
    set_cookies(
        clear_login_cookies(),
        MessageResponse::new("Logout successful"),
    )
}

// =============================================================================
// Posts
// =============================================================================

/// GET /api/posts
pub async fn list_posts(State(state): State<AppState>) -> HandlerResult<Vec<Post>> {
    let posts = posts::list(state.repository.as_ref()).await?;
    Ok(Json(posts))
}

/// POST /api/posts
pub async fn create_post(
    State(state): State<AppState>,
    identity: CallerIdentity,
    Json(request): Json<CreatePostRequest>,
) -> HandlerResult<Post> {
    let post = posts::create(
        state.repository.as_ref(),
        identity.0,
        request.title,
        request.contents,
        request.image_url,
    )
    .await?;
    Ok(Json(post))
}

/// GET /api/posts/{post_id}
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> HandlerResult<Post> {
    let post = posts::get_by_id(state.repository.as_ref(), PostId::new(post_id)).await?;
    Ok(Json(post))
}

/// PUT/PATCH /api/posts/{post_id}
pub async fn update_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    identity: CallerIdentity,
    Json(request): Json<UpdatePostRequest>,
) -> HandlerResult<Post> {
    let post = posts::update(
        state.repository.as_ref(),
        PostId::new(post_id),
        identity.0,
        PostUpdate {
            title: request.title,
            contents: request.contents,
            image_url: request.image_url,
        },
    )
    .await?;
    Ok(Json(post))
}

/// DELETE /api/posts/{post_id}
pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    identity: CallerIdentity,
) -> HandlerResult<MessageResponse> {
    posts::delete(state.repository.as_ref(), PostId::new(post_id), identity.0).await?;
    Ok(Json(MessageResponse::new("Post deleted successfully")))
}

/// PUT /api/posts/{post_id}/views
pub async fn increment_views(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> HandlerResult<ViewsResponse> {
    let views = posts::increment_views(state.repository.as_ref(), PostId::new(post_id)).await?;
    Ok(Json(ViewsResponse { views }))
}

/// GET /api/posts/{post_id}/checkEditPermission
///
/// 200 when the caller is the author, 403 otherwise: the response shape
/// the frontend polls before opening its editor.
pub async fn check_edit_permission(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    identity: CallerIdentity,
) -> HandlerResult<MessageResponse> {
    let allowed = posts::check_edit_permission(
        state.repository.as_ref(),
        PostId::new(post_id),
        identity.0,
    )
    .await?;
    if allowed {
        Ok(Json(MessageResponse::new("Edit permission granted")))
    } else {
        Err(AppError::Service(crate::services::ServiceError::Forbidden(
            format!("post {} may only be modified by its author", post_id),
        )))
    }
}

/// POST /api/posts/image
///
/// Multipart upload (field `postImage`); returns the stored URL for the
/// caller to attach to a post.
pub async fn upload_post_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> HandlerResult<ImageUrlResponse> {
    let url = store_image(&state.uploads_dir, "postImage", multipart).await?;
    Ok(Json(ImageUrlResponse { image_url: url }))
}

// =============================================================================
// Comments
// =============================================================================

/// GET /api/posts/{post_id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> HandlerResult<Vec<Comment>> {
    let comments = comments::list(state.repository.as_ref(), PostId::new(post_id)).await?;
    Ok(Json(comments))
}

/// POST /api/posts/{post_id}/comments
pub async fn create_comment(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Json(request): Json<CreateCommentRequest>,
) -> HandlerResult<Comment> {
    let comment = comments::create(
        state.repository.as_ref(),
        PostId::new(post_id),
        request.author_id.map(UserId::new),
        request.content,
    )
    .await?;
    Ok(Json(comment))
}

/// GET /api/posts/{post_id}/comments/{comment_id}
pub async fn get_comment(
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> HandlerResult<Comment> {
    let comment = comments::get_by_id(
        state.repository.as_ref(),
        PostId::new(post_id),
        CommentId::new(comment_id),
    )
    .await?;
    Ok(Json(comment))
}

/// PUT /api/posts/{post_id}/comments/{comment_id}
pub async fn update_comment(
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(i64, i64)>,
    Json(request): Json<UpdateCommentRequest>,
) -> HandlerResult<Comment> {
    let comment = comments::update(
        state.repository.as_ref(),
        PostId::new(post_id),
        CommentId::new(comment_id),
        request.content,
    )
    .await?;
    Ok(Json(comment))
}

/// DELETE /api/posts/{post_id}/comments/{comment_id}
pub async fn delete_comment(
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> HandlerResult<MessageResponse> {
    comments::delete(
        state.repository.as_ref(),
        PostId::new(post_id),
        CommentId::new(comment_id),
    )
    .await?;
    Ok(Json(MessageResponse::new("Comment deleted successfully")))
}
