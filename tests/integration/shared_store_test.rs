//! Two client processes sharing one store file.

use std::time::Duration;

use serde_json::json;

use quill_client::transport::MockReply;
use quill_core::events::{EndReason, SessionEvent};
use quill_core::types::{HttpMethod, Identity, SessionState};
use quill_session::SessionPhase;

use crate::helpers::{settle, TestApp, INTERVAL};

#[tokio::test(start_paused = true)]
async fn test_login_elsewhere_is_picked_up() {
    let tab_a = TestApp::new();
    let tab_b = tab_a.second_process();
    tab_a.mock.reply(HttpMethod::Get, "/user/me", MockReply::status(401));
    tab_a.mock.reply(HttpMethod::Post, "/auth/refresh", MockReply::status(401));

    tab_b.manager.initialize().await;
    settle().await;
    assert_eq!(tab_b.manager.snapshot().phase, SessionPhase::Anonymous);

    tab_a.login(7, "bob").await;

    let snapshot = tab_b.manager.refresh_auth();
    assert_eq!(snapshot.phase, SessionPhase::Authenticated);
    assert_eq!(snapshot.state, SessionState::authenticated(Identity::new("7", "bob")));
    assert!(tab_b.manager.is_extending_periodically());
}

#[tokio::test(start_paused = true)]
async fn test_anonymous_agent_follows_login_elsewhere() {
    let agent = TestApp::new();
    agent.mock.reply(HttpMethod::Get, "/user/me", MockReply::status(401));
    agent.mock.reply(HttpMethod::Post, "/auth/refresh", MockReply::status(401));
    agent.mock.reply(HttpMethod::Post, "/auth/extend", MockReply::status(200));

    agent.manager.initialize().await;
    settle().await;
    agent.manager.watch_cache(Duration::from_secs(30));
    assert!(!agent.manager.is_extending_periodically());

    let cli = agent.second_process();
    cli.login(7, "bob").await;
    cli.manager.shutdown();

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert_eq!(
        agent.manager.state(),
        SessionState::authenticated(Identity::new("7", "bob"))
    );
    assert!(agent.manager.is_extending_periodically());

    tokio::time::sleep(INTERVAL).await;
    assert_eq!(agent.extend_calls(), 1);

    agent.manager.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_logout_elsewhere_is_picked_up() {
    let tab_a = TestApp::new();
    tab_a.mock.reply(HttpMethod::Post, "/auth/logout", MockReply::status(200));
    tab_a.login(7, "bob").await;

    let tab_b = tab_a.second_process();
    tab_b.manager.refresh_auth();
    assert!(tab_b.manager.snapshot().is_authenticated());
    let mut events = tab_b.manager.events();

    tab_a.manager.logout().await;

    let snapshot = tab_b.manager.refresh_auth();
    assert_eq!(snapshot.state, SessionState::anonymous());
    assert!(!tab_b.manager.is_extending_periodically());
    assert!(matches!(
        events.try_recv().unwrap(),
        SessionEvent::Ended {
            reason: EndReason::ExternalChange,
            ..
        }
    ));
    // Only the process that logged out talks to the server.
    assert_eq!(tab_a.mock.count(HttpMethod::Post, "/auth/logout"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_external_login_is_adopted() {
    let app = TestApp::new();
    app.mock.reply(
        HttpMethod::Get,
        "/user/me",
        MockReply::json(200, json!({"id": "42", "nickname": "oauth-user"})),
    );

    let identity = app.manager.sync_from_server().await.unwrap();

    assert_eq!(identity, Some(Identity::new("42", "oauth-user")));
    assert_eq!(app.cached(), (Some("42".into()), Some("oauth-user".into())));
    assert!(app.manager.snapshot().is_authenticated());

    // A fresh process now restores the same identity from disk.
    let other = app.second_process();
    assert_eq!(
        other.manager.refresh_auth().state,
        SessionState::authenticated(Identity::new("42", "oauth-user"))
    );
}
