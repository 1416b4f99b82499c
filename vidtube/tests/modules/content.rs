//! Owner-side writes and deletion cleanup.

use entity::{comment, like, watch_history};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;
use vidtube::modules::ServiceError;
use vidtube::modules::content::{VideoChanges, purge_video_dependents};
use vidtube::modules::feed::ViewRecorder;
use vidtube::modules::relations::{RelationKind, TargetKind};

use crate::bootstrap::init::{create_account, create_video, setup_test_platform, test_image};

#[tokio::test]
async fn test_publish_toggle_round_trip() {
    let (platform, _temp) = setup_test_platform().await;
    let owner = create_account(&platform, "owner").await;
    let draft = create_video(&platform, owner.id, "Draft", false).await;
    assert!(!draft.is_published);

    let published = platform.videos().toggle_publish(draft.id, owner.id).await.unwrap();
    assert!(published.is_published);

    let unpublished = platform.videos().toggle_publish(draft.id, owner.id).await.unwrap();
    assert!(!unpublished.is_published);
}

#[tokio::test]
async fn test_owner_checks_distinguish_forbidden_from_missing() {
    let (platform, _temp) = setup_test_platform().await;
    let owner = create_account(&platform, "owner").await;
    let intruder = create_account(&platform, "intruder").await;
    let clip = create_video(&platform, owner.id, "Clip", true).await;
    let post = platform.posts().create(owner.id, "Mine").await.unwrap();

    let forbidden = platform.videos().toggle_publish(clip.id, intruder.id).await;
    assert!(matches!(forbidden, Err(ServiceError::Forbidden(_))));

    let missing = platform.videos().toggle_publish(Uuid::new_v4(), owner.id).await;
    assert!(matches!(missing, Err(ServiceError::NotFound(_))));

    let forbidden = platform.posts().update(post.id, intruder.id, "Mine now").await;
    assert!(matches!(forbidden, Err(ServiceError::Forbidden(_))));

    let missing = platform.posts().delete(Uuid::new_v4(), owner.id).await;
    assert!(matches!(missing, Err(ServiceError::NotFound(_))));

    let forbidden = platform.videos().delete(clip.id, intruder.id).await;
    assert!(matches!(forbidden, Err(ServiceError::Forbidden(_))));
}

#[tokio::test]
async fn test_update_requires_some_change() {
    let (platform, _temp) = setup_test_platform().await;
    let owner = create_account(&platform, "owner").await;
    let clip = create_video(&platform, owner.id, "Clip", true).await;

    let nothing = platform
        .videos()
        .update(clip.id, owner.id, VideoChanges::default())
        .await;
    assert!(matches!(nothing, Err(ServiceError::InvalidArgument(_))));

    let updated = platform
        .videos()
        .update(
            clip.id,
            owner.id,
            VideoChanges {
                thumbnail: Some(test_image()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_ne!(updated.thumbnail_public_id, clip.thumbnail_public_id);
    assert_eq!(updated.title, "Clip");
}

#[tokio::test]
async fn test_delete_video_purges_dependents() {
    let (platform, _temp) = setup_test_platform().await;
    let owner = create_account(&platform, "owner").await;
    let fan = create_account(&platform, "fan").await;
    let clip = create_video(&platform, owner.id, "Clip", true).await;
    let kept = create_video(&platform, owner.id, "Kept", true).await;

    let remark = platform.comments().add(clip.id, fan.id, "Nice").await.unwrap();
    let toggles = platform.toggles();
    toggles
        .toggle(fan.id, clip.id, RelationKind::Like(TargetKind::Video))
        .await
        .unwrap();
    toggles
        .toggle(owner.id, remark.id, RelationKind::Like(TargetKind::Comment))
        .await
        .unwrap();
    toggles
        .toggle(fan.id, kept.id, RelationKind::Like(TargetKind::Video))
        .await
        .unwrap();
    ViewRecorder::new(&platform.db)
        .record_view(clip.id, Some(fan.id))
        .await
        .unwrap();

    let report = platform.videos().delete(clip.id, owner.id).await.unwrap();
    assert!(report.is_complete());
    assert_eq!(report.removed, 4);

    let comments = comment::Entity::find()
        .filter(comment::Column::VideoId.eq(clip.id))
        .count(&platform.db)
        .await
        .unwrap();
    assert_eq!(comments, 0);

    let likes = like::Entity::find().all(&platform.db).await.unwrap();
    assert_eq!(likes.len(), 1);
    assert_eq!(likes[0].target_id, kept.id);

    let history = watch_history::Entity::find().count(&platform.db).await.unwrap();
    assert_eq!(history, 0);

    // Rerunning the purge finds nothing left.
    let rerun = purge_video_dependents(&platform.db, clip.id).await;
    assert!(rerun.is_complete());
    assert_eq!(rerun.removed, 0);
}

#[tokio::test]
async fn test_delete_comment_removes_its_likes() {
    let (platform, _temp) = setup_test_platform().await;
    let owner = create_account(&platform, "owner").await;
    let fan = create_account(&platform, "fan").await;
    let clip = create_video(&platform, owner.id, "Clip", true).await;
    let remark = platform.comments().add(clip.id, fan.id, "Nice").await.unwrap();
    platform
        .toggles()
        .toggle(owner.id, remark.id, RelationKind::Like(TargetKind::Comment))
        .await
        .unwrap();

    platform.comments().delete(remark.id, fan.id).await.unwrap();

    let likes = like::Entity::find().count(&platform.db).await.unwrap();
    assert_eq!(likes, 0);
}

#[tokio::test]
async fn test_comment_on_draft_requires_owner() {
    let (platform, _temp) = setup_test_platform().await;
    let owner = create_account(&platform, "owner").await;
    let fan = create_account(&platform, "fan").await;
    let draft = create_video(&platform, owner.id, "Draft", false).await;

    let hidden = platform.comments().add(draft.id, fan.id, "Early!").await;
    assert!(matches!(hidden, Err(ServiceError::NotFound(_))));

    let own = platform.comments().add(draft.id, owner.id, "Note to self").await;
    assert!(own.is_ok());
}
