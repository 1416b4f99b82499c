//! Session rotation against a real store.

use futures::future::join_all;
use vidtube::modules::ServiceError;

use crate::bootstrap::init::{create_account, login, setup_test_platform};

#[tokio::test]
async fn test_refresh_rotates_and_retires_old_token() {
    let (platform, _temp) = setup_test_platform().await;
    create_account(&platform, "viewer").await;
    let session = login(&platform, "viewer").await;

    let rotated = platform.accounts().refresh(&session.refresh_token).await.unwrap();
    assert_ne!(rotated.refresh_token, session.refresh_token);

    let reused = platform.accounts().refresh(&session.refresh_token).await;
    assert!(matches!(reused, Err(ServiceError::Unauthorized(_))));

    platform.accounts().refresh(&rotated.refresh_token).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_refresh_opens_one_session() {
    let (platform, _temp) = setup_test_platform().await;
    create_account(&platform, "viewer").await;

    for _ in 0..5 {
        let session = login(&platform, "viewer").await;
        let handles = (0..4).map(|_| {
            let platform = platform.clone();
            let token = session.refresh_token.clone();
            tokio::spawn(async move { platform.accounts().refresh(&token).await })
        });
        let outcomes = join_all(handles).await;

        let opened = outcomes
            .iter()
            .filter(|joined| matches!(joined, Ok(Ok(_))))
            .count();
        assert_eq!(opened, 1, "one refresh token opened {opened} sessions");
        assert!(
            outcomes
                .iter()
                .filter(|joined| !matches!(joined, Ok(Ok(_))))
                .all(|joined| matches!(joined, Ok(Err(ServiceError::Unauthorized(_))))),
            "losing refreshes must be rejected as unauthorized"
        );
    }
}
