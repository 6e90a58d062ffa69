//! Browsing and chat alongside a live session.

use serde_json::json;

use quill_client::api::chat::{GATEWAY_UNAVAILABLE, TIMED_OUT};
use quill_client::api::{PostFilter, PostQuery};
use quill_client::transport::MockReply;
use quill_core::types::{HttpMethod, PageRequest};

use crate::helpers::{settle, TestApp};

#[tokio::test(start_paused = true)]
async fn test_sidebar_failures_do_not_touch_session() {
    let app = TestApp::new();
    app.login(7, "bob").await;
    app.mock.reply(HttpMethod::Get, "/api/posts/categories", MockReply::status(500));
    app.mock.reply(HttpMethod::Get, "/api/posts/tags", MockReply::status(401));
    app.mock.reply(HttpMethod::Get, "/api/search/related", MockReply::error("reset"));

    assert!(app.clients.taxonomy.categories().await.is_empty());
    assert!(app.clients.taxonomy.tags().await.is_empty());
    assert!(app.clients.search.related("3", None).await.is_empty());
    settle().await;

    assert!(app.manager.snapshot().is_authenticated());
    assert_eq!(app.mock.count(HttpMethod::Post, "/auth/refresh"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_filtered_listing_and_search() {
    let app = TestApp::new();
    app.mock.reply(
        HttpMethod::Get,
        "/api/posts/tag",
        MockReply::json(
            200,
            json!({
                "content": [{"id": 1, "title": "Tokio timers", "tagNames": ["rust"]}],
                "totalPages": 1,
                "totalElements": 1,
                "number": 0
            }),
        ),
    );
    app.mock.reply(
        HttpMethod::Get,
        "/api/search",
        MockReply::json(200, json!({"results": [{"postId": 1, "title": "Tokio timers", "score": 0.91}]})),
    );

    let page = app
        .clients
        .posts
        .list(&PostQuery {
            page: PageRequest::new(0, 5),
            filter: PostFilter::from_parts(None, Some("rust".into())),
        })
        .await
        .unwrap();
    assert_eq!(page.content.len(), 1);
    assert_eq!(page.content[0].tag_names, vec!["rust".to_string()]);

    let call = app.mock.last_call(HttpMethod::Get, "/api/posts/tag").unwrap();
    assert!(call.query.contains(&("name".to_string(), "rust".to_string())));
    assert!(call.query.contains(&("size".to_string(), "5".to_string())));

    let hits = app.clients.search.search("async timers", None).await.unwrap();
    assert_eq!(hits[0].post_id, "1");
}

#[tokio::test(start_paused = true)]
async fn test_chat_always_answers() {
    let app = TestApp::new();
    app.mock.reply_sequence(
        HttpMethod::Post,
        "/chat",
        vec![
            MockReply::json(200, json!({"response": "Hello!"})),
            MockReply::status(502),
            MockReply::timeout(),
        ],
    );

    assert_eq!(app.clients.chat.send("7", "hi").await, "Hello!");
    assert_eq!(app.clients.chat.send("7", "hi").await, GATEWAY_UNAVAILABLE);
    assert_eq!(app.clients.chat.send("7", "hi").await, TIMED_OUT);

    let call = app.mock.last_call(HttpMethod::Post, "/chat").unwrap();
    assert_eq!(call.body.unwrap()["session_id"], "7");
}
