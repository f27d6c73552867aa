//! Account service: registration, lookup, credential check, profile
//! mutation, and cascading delete.

use tracing::{info, warn};

use crate::db::repository::BoardRepository;
use crate::models::{NewUser, User, UserId, UserPatch};

use super::error::{ServiceError, ServiceResult};

/// Register a new account.
///
/// Email and nickname must be unique across all users; both are checked
/// here so the invariant holds from registration onward, not only at
/// nickname changes.
pub async fn register(repo: &dyn BoardRepository, record: NewUser) -> ServiceResult<User> {
    if record.nickname.trim().is_empty()
        || record.email.trim().is_empty()
        || record.password.is_empty()
    {
        return Err(ServiceError::Validation(
            "nickname, email and password are required".to_string(),
        ));
    }

    let users = repo.list_users().await?;
    if users.iter().any(|u| u.email == record.email) {
        return Err(ServiceError::DuplicateEmail(record.email));
    }
    if users.iter().any(|u| u.nickname == record.nickname) {
        return Err(ServiceError::DuplicateNickname(record.nickname));
    }

    let user = repo.insert_user(record).await?;
    info!(user_id = user.user_id.value(), "account registered");
    Ok(user)
}

/// All registered accounts.
pub async fn get_all(repo: &dyn BoardRepository) -> ServiceResult<Vec<User>> {
    Ok(repo.list_users().await?)
}

/// One account by ID.
pub async fn get_by_id(repo: &dyn BoardRepository, user_id: UserId) -> ServiceResult<User> {
    repo.find_user(user_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("user {} not found", user_id)))
}

/// Change an account's nickname. Fails when another account holds it.
pub async fn update_nickname(
    repo: &dyn BoardRepository,
    user_id: UserId,
    nickname: String,
) -> ServiceResult<()> {
    if nickname.trim().is_empty() {
        return Err(ServiceError::Validation("nickname is required".to_string()));
    }

    let users = repo.list_users().await?;
    if !users.iter().any(|u| u.user_id == user_id) {
        return Err(ServiceError::NotFound(format!("user {} not found", user_id)));
    }
    if users
        .iter()
        .any(|u| u.nickname == nickname && u.user_id != user_id)
    {
        return Err(ServiceError::DuplicateNickname(nickname));
    }

    repo.update_user(
        user_id,
        UserPatch {
            nickname: Some(nickname),
            ..Default::default()
        },
    )
    .await?;
    Ok(())
}

/// Change an account's password.
pub async fn update_password(
    repo: &dyn BoardRepository,
    user_id: UserId,
    password: String,
) -> ServiceResult<()> {
    if password.is_empty() {
        return Err(ServiceError::Validation("password is required".to_string()));
    }

    repo.update_user(
        user_id,
        UserPatch {
            password: Some(password),
            ..Default::default()
        },
    )
    .await?;
    Ok(())
}

/// Change an account's profile image URL.
pub async fn update_profile_image(
    repo: &dyn BoardRepository,
    user_id: UserId,
    url: String,
) -> ServiceResult<()> {
    repo.update_user(
        user_id,
        UserPatch {
            profile_image_url: Some(url),
            ..Default::default()
        },
    )
    .await?;
    Ok(())
}

/// Check credentials and return the matching account.
///
/// Exact, case-sensitive comparison on both fields. Passwords are stored
/// in plaintext; see the data-model notes.
pub async fn login(
    repo: &dyn BoardRepository,
    email: &str,
    password: &str,
) -> ServiceResult<User> {
    let users = repo.list_users().await?;
    users
        .into_iter()
        .find(|u| u.email == email && u.password == password)
        .ok_or(ServiceError::InvalidCredentials)
}

/// Delete an account and everything it authored.
///
/// Posts (and the comments they own) go first, then the user record. A
/// failure in the cascade therefore leaves the user record intact rather
/// than deleted with orphaned posts behind it.
pub async fn delete(repo: &dyn BoardRepository, user_id: UserId) -> ServiceResult<()> {
    if repo.find_user(user_id).await?.is_none() {
        return Err(ServiceError::NotFound(format!("user {} not found", user_id)));
    }

    let removed_posts = repo.delete_posts_by_author(user_id).await?;
    if !repo.delete_user(user_id).await? {
        // Cascade ran but the record vanished meanwhile; surface it.
        warn!(
            user_id = user_id.value(),
            removed_posts, "user record disappeared during cascade delete"
        );
        return Err(ServiceError::NotFound(format!("user {} not found", user_id)));
    }

    info!(
        user_id = user_id.value(),
        removed_posts, "account deleted with authored posts"
    );
    Ok(())
}
