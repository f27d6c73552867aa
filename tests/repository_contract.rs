//! Backend-agnostic contract tests.
//!
//! Every storage backend must produce the same logical before/after state
//! for the same operation. Each test here runs against all three backends
//! and asserts the shared contract: max+1 ID assignment (including reuse
//! of a freed highest ID), field-masked partial updates, per-post comment
//! scoping, and cascade integrity on delete.

use std::sync::Arc;
use tempfile::TempDir;

use agora::db::repositories::{JsonConfig, JsonRepository, LocalRepository, SqliteRepository};
use agora::db::repository::{BoardRepository, RepositoryError};
use agora::models::{CommentId, NewComment, NewPost, NewUser, PostId, UserId, UserPatch};

struct Backend {
    name: &'static str,
    repo: Arc<dyn BoardRepository>,
    // Keeps the JSON backend's data directory alive for the test
    _tmp: Option<TempDir>,
}

fn backends() -> Vec<Backend> {
    let json_dir = tempfile::tempdir().expect("tempdir");
    vec![
        Backend {
            name: "local",
            repo: Arc::new(LocalRepository::new()),
            _tmp: None,
        },
        Backend {
            name: "json",
            repo: Arc::new(
                JsonRepository::new(JsonConfig::with_dir(json_dir.path())).expect("json repo"),
            ),
            _tmp: Some(json_dir),
        },
        Backend {
            name: "sqlite",
            repo: Arc::new(SqliteRepository::in_memory().expect("sqlite repo")),
            _tmp: None,
        },
    ]
}

fn user(nickname: &str, email: &str) -> NewUser {
    NewUser {
        nickname: nickname.to_string(),
        email: email.to_string(),
        password: "pw".to_string(),
        profile_image_url: None,
    }
}

fn post(title: &str, author: i64) -> NewPost {
    NewPost {
        title: title.to_string(),
        contents: "contents".to_string(),
        image_url: None,
        author_id: UserId::new(author),
        created_at: "2024-06-01 12:00:00".to_string(),
    }
}

fn comment(content: &str, author: i64) -> NewComment {
    NewComment {
        content: content.to_string(),
        author_id: UserId::new(author),
        created_at: "2024-06-01 12:00:00".to_string(),
    }
}

#[tokio::test]
async fn user_ids_are_max_plus_one_and_reused_after_delete() {
    for b in backends() {
        let repo = &b.repo;
        let a = repo.insert_user(user("a", "a@x")).await.unwrap();
        let second = repo.insert_user(user("b", "b@x")).await.unwrap();
        assert_eq!(a.user_id.value(), 1, "backend {}", b.name);
        assert_eq!(second.user_id.value(), 2, "backend {}", b.name);

        // Freeing the highest ID hands it to the next insert. This is the
        // compatibility policy, not an accident; see the trait docs.
        assert!(repo.delete_user(second.user_id).await.unwrap());
        let third = repo.insert_user(user("c", "c@x")).await.unwrap();
        assert_eq!(third.user_id.value(), 2, "backend {}", b.name);

        // Deleting a middle record does not shift later IDs.
        let fourth = repo.insert_user(user("d", "d@x")).await.unwrap();
        assert_eq!(fourth.user_id.value(), 3, "backend {}", b.name);
        assert!(repo.delete_user(third.user_id).await.unwrap());
        let fifth = repo.insert_user(user("e", "e@x")).await.unwrap();
        assert_eq!(fifth.user_id.value(), 4, "backend {}", b.name);
    }
}

#[tokio::test]
async fn post_ids_follow_the_same_policy() {
    for b in backends() {
        let repo = &b.repo;
        let first = repo.insert_post(post("p1", 1)).await.unwrap();
        let second = repo.insert_post(post("p2", 1)).await.unwrap();
        assert_eq!(first.post_id.value(), 1, "backend {}", b.name);
        assert_eq!(second.post_id.value(), 2, "backend {}", b.name);

        assert!(repo.delete_post(second.post_id).await.unwrap());
        let third = repo.insert_post(post("p3", 1)).await.unwrap();
        assert_eq!(third.post_id.value(), 2, "backend {}", b.name);
    }
}

#[tokio::test]
async fn inserted_posts_start_with_zero_views_and_no_comments() {
    for b in backends() {
        let repo = &b.repo;
        let created = repo.insert_post(post("p", 1)).await.unwrap();
        let found = repo.find_post(created.post_id).await.unwrap().unwrap();
        assert_eq!(found.views, 0, "backend {}", b.name);
        assert!(found.comments.is_empty(), "backend {}", b.name);
        assert_eq!(found, created, "backend {}", b.name);
    }
}

#[tokio::test]
async fn user_updates_are_field_masked() {
    for b in backends() {
        let repo = &b.repo;
        let u = repo.insert_user(user("a", "a@x")).await.unwrap();

        let updated = repo
            .update_user(
                u.user_id,
                UserPatch {
                    nickname: Some("renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.nickname, "renamed", "backend {}", b.name);
        assert_eq!(updated.email, "a@x", "backend {}", b.name);
        assert_eq!(updated.password, "pw", "backend {}", b.name);

        let reread = repo.find_user(u.user_id).await.unwrap().unwrap();
        assert_eq!(reread, updated, "backend {}", b.name);
    }
}

#[tokio::test]
async fn updating_a_missing_user_is_not_found() {
    for b in backends() {
        let err = b
            .repo
            .update_user(
                UserId::new(9),
                UserPatch {
                    nickname: Some("x".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(
            matches!(err, RepositoryError::NotFound { .. }),
            "backend {}",
            b.name
        );
    }
}

#[tokio::test]
async fn comment_ids_are_scoped_to_their_post() {
    for b in backends() {
        let repo = &b.repo;
        let p1 = repo.insert_post(post("p1", 1)).await.unwrap();
        let p2 = repo.insert_post(post("p2", 1)).await.unwrap();

        let c1 = repo.insert_comment(p1.post_id, comment("x", 1)).await.unwrap();
        let c2 = repo.insert_comment(p1.post_id, comment("y", 1)).await.unwrap();
        let other = repo.insert_comment(p2.post_id, comment("z", 1)).await.unwrap();

        assert_eq!(c1.comment_id.value(), 1, "backend {}", b.name);
        assert_eq!(c2.comment_id.value(), 2, "backend {}", b.name);
        // The second post starts its own sequence.
        assert_eq!(other.comment_id.value(), 1, "backend {}", b.name);

        // Freed comment IDs are reused within the post.
        assert!(repo.delete_comment(p1.post_id, c2.comment_id).await.unwrap());
        let again = repo.insert_comment(p1.post_id, comment("w", 1)).await.unwrap();
        assert_eq!(again.comment_id.value(), 2, "backend {}", b.name);
    }
}

#[tokio::test]
async fn comment_operations_require_the_parent_post() {
    for b in backends() {
        let repo = &b.repo;
        let ghost = PostId::new(7);

        assert!(
            matches!(
                repo.list_comments(ghost).await.unwrap_err(),
                RepositoryError::NotFound { .. }
            ),
            "backend {}",
            b.name
        );
        assert!(
            matches!(
                repo.insert_comment(ghost, comment("x", 1)).await.unwrap_err(),
                RepositoryError::NotFound { .. }
            ),
            "backend {}",
            b.name
        );
        assert!(
            matches!(
                repo.update_comment(ghost, CommentId::new(1), "x".to_string())
                    .await
                    .unwrap_err(),
                RepositoryError::NotFound { .. }
            ),
            "backend {}",
            b.name
        );
    }
}

#[tokio::test]
async fn deleting_a_post_removes_its_comments() {
    for b in backends() {
        let repo = &b.repo;
        let p = repo.insert_post(post("p", 1)).await.unwrap();
        repo.insert_comment(p.post_id, comment("x", 2)).await.unwrap();
        repo.insert_comment(p.post_id, comment("y", 3)).await.unwrap();

        assert!(repo.delete_post(p.post_id).await.unwrap());
        assert!(repo.find_post(p.post_id).await.unwrap().is_none());
        // The comments went with the post; a fresh post with the same ID
        // starts empty.
        let fresh = repo.insert_post(post("fresh", 1)).await.unwrap();
        assert_eq!(fresh.post_id, p.post_id, "backend {}", b.name);
        assert!(
            repo.list_comments(fresh.post_id).await.unwrap().is_empty(),
            "backend {}",
            b.name
        );
    }
}

#[tokio::test]
async fn delete_posts_by_author_removes_only_theirs() {
    for b in backends() {
        let repo = &b.repo;
        repo.insert_post(post("a1", 1)).await.unwrap();
        repo.insert_post(post("b1", 2)).await.unwrap();
        repo.insert_post(post("a2", 1)).await.unwrap();

        let removed = repo.delete_posts_by_author(UserId::new(1)).await.unwrap();
        assert_eq!(removed, 2, "backend {}", b.name);

        let remaining = repo.list_posts().await.unwrap();
        assert_eq!(remaining.len(), 1, "backend {}", b.name);
        assert_eq!(remaining[0].author_id, UserId::new(2), "backend {}", b.name);
    }
}

#[tokio::test]
async fn delete_reports_whether_anything_was_removed() {
    for b in backends() {
        let repo = &b.repo;
        assert!(!repo.delete_user(UserId::new(1)).await.unwrap());
        assert!(!repo.delete_post(PostId::new(1)).await.unwrap());
        assert_eq!(
            repo.delete_posts_by_author(UserId::new(1)).await.unwrap(),
            0,
            "backend {}",
            b.name
        );
    }
}

#[tokio::test]
async fn health_check_reports_serviceable() {
    for b in backends() {
        assert!(b.repo.health_check().await.unwrap(), "backend {}", b.name);
    }
}
