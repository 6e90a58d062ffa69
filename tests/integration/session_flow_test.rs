//! End-to-end session lifecycle over the on-disk store.

use std::time::Duration;

use serde_json::json;

use quill_client::dto::PostRequest;
use quill_client::transport::MockReply;
use quill_core::error::ErrorKind;
use quill_core::events::{EndReason, SessionEvent};
use quill_core::types::{HttpMethod, Identity, SessionState};
use quill_session::SessionPhase;

use crate::helpers::{settle, TestApp, INTERVAL};

#[tokio::test(start_paused = true)]
async fn test_login_extend_logout_lifecycle() {
    let app = TestApp::new();
    app.mock.reply(HttpMethod::Post, "/auth/extend", MockReply::status(200));
    app.mock.reply(HttpMethod::Post, "/auth/logout", MockReply::status(200));
    app.mock.reply(HttpMethod::Get, "/user/me", MockReply::status(401));

    let initial = app.manager.initialize().await;
    assert!(initial.initialized);
    assert_eq!(initial.phase, SessionPhase::Anonymous);

    let identity = app.login(7, "bob").await;
    assert_eq!(identity, Identity::new("7", "bob"));
    assert_eq!(app.cached(), (Some("7".into()), Some("bob".into())));
    assert!(app.manager.is_extending_periodically());

    tokio::time::sleep(INTERVAL * 2 + Duration::from_secs(1)).await;
    assert_eq!(app.extend_calls(), 2);

    app.manager.logout().await;
    assert_eq!(app.manager.state(), SessionState::anonymous());
    assert_eq!(app.cached(), (None, None));

    tokio::time::sleep(INTERVAL * 3).await;
    assert_eq!(app.extend_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_session_survives_restart() {
    let first = TestApp::new();
    first.login(7, "bob").await;
    first.manager.shutdown();

    let second = first.second_process();
    second.mock.reply(
        HttpMethod::Get,
        "/user/me",
        MockReply::json(200, json!({"id": 7, "nickname": "bob"})).after(Duration::from_secs(1)),
    );

    let manager = second.manager.clone();
    let init = tokio::spawn(async move { manager.initialize().await });
    settle().await;

    // The cached identity is shown while the server check is in flight.
    let hydrating = second.manager.snapshot();
    assert_eq!(hydrating.phase, SessionPhase::Hydrating);
    assert_eq!(hydrating.state.user_id(), Some("7"));
    assert!(!hydrating.initialized);

    let confirmed = init.await.unwrap();
    assert_eq!(confirmed.phase, SessionPhase::Authenticated);
    assert_eq!(confirmed.state, SessionState::authenticated(Identity::new("7", "bob")));
    assert!(second.manager.is_extending_periodically());
}

#[tokio::test(start_paused = true)]
async fn test_stale_cache_is_cleared_on_startup() {
    let first = TestApp::new();
    first.login(7, "bob").await;
    first.manager.shutdown();

    let second = first.second_process();
    second.mock.reply(HttpMethod::Get, "/user/me", MockReply::status(401));
    second.mock.reply(HttpMethod::Post, "/auth/refresh", MockReply::status(401));

    let snapshot = second.manager.initialize().await;
    assert_eq!(snapshot.phase, SessionPhase::Anonymous);
    assert!(snapshot.initialized);
    assert_eq!(second.cached(), (None, None));
    assert!(!second.manager.is_extending_periodically());
}

#[tokio::test(start_paused = true)]
async fn test_expired_credential_is_refreshed_transparently() {
    let app = TestApp::new();
    app.login(7, "bob").await;
    app.mock.reply_sequence(
        HttpMethod::Post,
        "/api/posts",
        vec![
            MockReply::status(401),
            MockReply::json(201, json!({"id": 11, "title": "Hello"})),
        ],
    );
    app.mock.reply(HttpMethod::Post, "/auth/refresh", MockReply::status(200));

    let post = app
        .clients
        .posts
        .create(&PostRequest {
            title: "Hello".into(),
            content: "First post".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    settle().await;

    assert_eq!(post.id, "11");
    assert_eq!(app.mock.count(HttpMethod::Post, "/auth/refresh"), 1);
    assert_eq!(app.mock.count(HttpMethod::Post, "/api/posts"), 2);
    assert!(app.manager.snapshot().is_authenticated());
}

#[tokio::test(start_paused = true)]
async fn test_unrecoverable_401_ends_session() {
    let app = TestApp::new();
    app.login(7, "bob").await;
    app.mock.reply(HttpMethod::Get, "/api/posts/5/comments", MockReply::status(401));
    app.mock.reply(HttpMethod::Post, "/auth/refresh", MockReply::status(401));
    let mut events = app.manager.events();

    let err = app.clients.comments.list("5").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
    settle().await;

    assert_eq!(app.manager.state(), SessionState::anonymous());
    assert_eq!(app.cached(), (None, None));
    assert!(!app.manager.is_extending_periodically());
    assert!(matches!(
        events.try_recv().unwrap(),
        SessionEvent::Ended {
            reason: EndReason::Invalidated,
            ..
        }
    ));

    tokio::time::sleep(INTERVAL * 2).await;
    assert_eq!(app.extend_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_short_lived_process_drops_rejected_session() {
    let agent = TestApp::new();
    agent.login(7, "bob").await;
    agent.manager.shutdown();

    // A one-shot command: manager built up front, never initialized.
    let cli = agent.second_process();
    let mut pending = cli.clients.transport_events();
    cli.mock.reply(HttpMethod::Delete, "/api/posts/5", MockReply::status(401));
    cli.mock.reply(HttpMethod::Post, "/auth/refresh", MockReply::status(401));

    let err = cli.clients.posts.delete("5").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);

    assert!(cli.manager.apply_pending(&mut pending));
    assert_eq!(cli.cached(), (None, None));
    assert!(!cli.manager.apply_pending(&mut pending));

    // The agent follows on its next re-sync.
    assert_eq!(agent.manager.refresh_auth().state, SessionState::anonymous());
}

#[tokio::test(start_paused = true)]
async fn test_rejected_extension_logs_out() {
    let app = TestApp::new();
    app.login(7, "bob").await;
    app.mock.reply_sequence(
        HttpMethod::Post,
        "/auth/extend",
        vec![MockReply::status(200), MockReply::status(403)],
    );
    app.mock.reply(HttpMethod::Post, "/auth/refresh", MockReply::status(401));
    app.mock.reply(HttpMethod::Post, "/auth/logout", MockReply::status(200));

    tokio::time::sleep(INTERVAL * 2 + Duration::from_secs(1)).await;
    assert_eq!(app.extend_calls(), 2);
    assert_eq!(app.manager.snapshot().phase, SessionPhase::Anonymous);
    assert_eq!(app.cached(), (None, None));

    tokio::time::sleep(INTERVAL * 2).await;
    assert_eq!(app.extend_calls(), 2);
}
