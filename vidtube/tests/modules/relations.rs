//! Toggle engine and relation index against a real store.

use entity::like;
use futures::future::join_all;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;
use vidtube::modules::ServiceError;
use vidtube::modules::relations::{RelationFacts, RelationIndex, RelationKind, TargetKind};

use crate::bootstrap::init::{create_account, create_video, setup_test_platform};

const VIDEO_LIKE: RelationKind = RelationKind::Like(TargetKind::Video);

#[tokio::test]
async fn test_toggle_twice_restores_count() {
    let (platform, _temp) = setup_test_platform().await;
    let owner = create_account(&platform, "owner").await;
    let fan = create_account(&platform, "fan").await;
    let video = create_video(&platform, owner.id, "Clip", true).await;

    let first = platform.toggles().toggle(fan.id, video.id, VIDEO_LIKE).await.unwrap();
    assert!(first.active);

    let index = RelationIndex::new(&platform.db);
    let facts = index.compute(Some(fan.id), &[video.id], VIDEO_LIKE).await.unwrap();
    assert_eq!(facts.get(&video.id).count, 1);
    assert!(facts.get(&video.id).is_active);

    let second = platform.toggles().toggle(fan.id, video.id, VIDEO_LIKE).await.unwrap();
    assert!(!second.active);

    let facts = index.compute(Some(fan.id), &[video.id], VIDEO_LIKE).await.unwrap();
    assert_eq!(facts.get(&video.id).count, 0);
    assert!(!facts.get(&video.id).is_active);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_toggles_never_duplicate() {
    let (platform, _temp) = setup_test_platform().await;
    let owner = create_account(&platform, "owner").await;
    let fan = create_account(&platform, "fan").await;
    let video = create_video(&platform, owner.id, "Clip", true).await;

    let (fan_id, video_id) = (fan.id, video.id);
    let handles = (0..8).map(|_| {
        let platform = platform.clone();
        tokio::spawn(async move { platform.toggles().toggle(fan_id, video_id, VIDEO_LIKE).await })
    });
    let outcomes = join_all(handles).await;
    assert!(
        outcomes
            .iter()
            .any(|joined| matches!(joined, Ok(Ok(_)))),
        "at least one toggle should commit"
    );

    let stored = like::Entity::find()
        .filter(like::Column::AccountId.eq(fan.id))
        .filter(like::Column::TargetId.eq(video.id))
        .count(&platform.db)
        .await
        .unwrap();
    assert!(stored <= 1, "found {stored} likes for one pair");

    let facts = RelationIndex::new(&platform.db)
        .compute(Some(fan.id), &[video.id], VIDEO_LIKE)
        .await
        .unwrap();
    assert_eq!(facts.get(&video.id).count, stored);
    assert_eq!(facts.get(&video.id).is_active, stored == 1);
}

#[tokio::test]
async fn test_facts_for_many_targets_and_anonymous_viewer() {
    let (platform, _temp) = setup_test_platform().await;
    let owner = create_account(&platform, "owner").await;
    let a = create_account(&platform, "a").await;
    let b = create_account(&platform, "b").await;
    let liked_by_both = create_video(&platform, owner.id, "Both", true).await;
    let liked_by_a = create_video(&platform, owner.id, "One", true).await;
    let unliked = create_video(&platform, owner.id, "None", true).await;

    for (who, what) in [(a.id, liked_by_both.id), (b.id, liked_by_both.id), (a.id, liked_by_a.id)] {
        platform.toggles().toggle(who, what, VIDEO_LIKE).await.unwrap();
    }

    let ids = [liked_by_both.id, liked_by_a.id, unliked.id];
    let index = RelationIndex::new(&platform.db);

    let as_b = index.compute(Some(b.id), &ids, VIDEO_LIKE).await.unwrap();
    assert_eq!(as_b.get(&liked_by_both.id).count, 2);
    assert!(as_b.get(&liked_by_both.id).is_active);
    assert_eq!(as_b.get(&liked_by_a.id).count, 1);
    assert!(!as_b.get(&liked_by_a.id).is_active);
    assert_eq!(as_b.get(&unliked.id).count, 0);

    let anonymous = index.compute(None, &ids, VIDEO_LIKE).await.unwrap();
    assert!(ids.iter().all(|id| !anonymous.get(id).is_active));

    let empty = index.compute(Some(a.id), &[], VIDEO_LIKE).await.unwrap();
    assert!(ids.iter().all(|id| empty.get(id) == RelationFacts::default()));
}

#[tokio::test]
async fn test_likes_of_one_kind_do_not_leak_into_another() {
    let (platform, _temp) = setup_test_platform().await;
    let owner = create_account(&platform, "owner").await;
    let fan = create_account(&platform, "fan").await;
    let video = create_video(&platform, owner.id, "Clip", true).await;
    let comment = platform.comments().add(video.id, owner.id, "Hi").await.unwrap();

    platform
        .toggles()
        .toggle(fan.id, comment.id, RelationKind::Like(TargetKind::Comment))
        .await
        .unwrap();

    let facts = RelationIndex::new(&platform.db)
        .compute(Some(fan.id), &[video.id, comment.id], VIDEO_LIKE)
        .await
        .unwrap();
    assert_eq!(facts.get(&comment.id).count, 0);
    assert_eq!(facts.get(&video.id).count, 0);
}

#[tokio::test]
async fn test_toggle_rejects_missing_and_hidden_targets() {
    let (platform, _temp) = setup_test_platform().await;
    let owner = create_account(&platform, "owner").await;
    let fan = create_account(&platform, "fan").await;
    let draft = create_video(&platform, owner.id, "Draft", false).await;

    let missing = platform
        .toggles()
        .toggle(fan.id, Uuid::new_v4(), VIDEO_LIKE)
        .await;
    assert!(matches!(missing, Err(ServiceError::NotFound(_))));

    let hidden = platform.toggles().toggle(fan.id, draft.id, VIDEO_LIKE).await;
    assert!(matches!(hidden, Err(ServiceError::NotFound(_))));

    let own_draft = platform.toggles().toggle(owner.id, draft.id, VIDEO_LIKE).await;
    assert!(own_draft.unwrap().active);

    let note = platform
        .comments()
        .add(draft.id, owner.id, "Notes before release")
        .await
        .unwrap();
    let comment_like = RelationKind::Like(TargetKind::Comment);
    let hidden_comment = platform.toggles().toggle(fan.id, note.id, comment_like).await;
    assert!(matches!(hidden_comment, Err(ServiceError::NotFound(_))));
    let own_comment = platform.toggles().toggle(owner.id, note.id, comment_like).await;
    assert!(own_comment.unwrap().active);

    let selfish = platform
        .toggles()
        .toggle(fan.id, fan.id, RelationKind::Subscription)
        .await;
    assert!(matches!(selfish, Err(ServiceError::InvalidArgument(_))));
}

#[tokio::test]
async fn test_subscription_counts_both_directions() {
    let (platform, _temp) = setup_test_platform().await;
    let creator = create_account(&platform, "creator").await;
    let mut fans = Vec::new();
    for handle in ["f1", "f2", "f3"] {
        fans.push(create_account(&platform, handle).await);
    }

    for fan in &fans {
        let toggled = platform
            .toggles()
            .toggle(fan.id, creator.id, RelationKind::Subscription)
            .await
            .unwrap();
        assert!(toggled.active);
    }

    let index = RelationIndex::new(&platform.db);
    let facts = index
        .compute(Some(fans[0].id), &[creator.id], RelationKind::Subscription)
        .await
        .unwrap();
    assert_eq!(facts.get(&creator.id).count, 3);
    assert!(facts.get(&creator.id).is_active);

    let following = index.subscribed_to_counts(&[fans[1].id, creator.id]).await.unwrap();
    assert_eq!(following.get(&fans[1].id).copied(), Some(1));
    assert_eq!(following.get(&creator.id).copied().unwrap_or(0), 0);
}
