//! Redirect following through the send loop.

mod common;

use common::{client, ok, redirect, ScriptedTransport};
use fluentnet::NetError;
use http::Method;
use std::sync::atomic::{AtomicUsize, Ordering};

#[tokio::test]
async fn test_post_redirect_becomes_get() {
    let transport = ScriptedTransport::new(|m| match m.url.path() {
        "/" => redirect(302, "/next"),
        "/next" => ok(),
        _ => Err(NetError::InvalidResponse),
    });
    let client = client(&transport);

    let call = client
        .post("http://start.com")
        .body("payload")
        .header("Content-Type", "text/plain")
        .send()
        .await
        .unwrap();

    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].method, Method::POST);
    assert_eq!(sent[1].method, Method::GET);
    assert!(sent[1].body.is_empty());
    assert!(!sent[1].headers.contains("content-type"));
    assert_eq!(sent[1].url.as_str(), "http://start.com/next");

    assert_eq!(call.response.as_ref().unwrap().status(), 200);
    let first = call.redirected_from.as_deref().unwrap();
    assert_eq!(first.response.as_ref().unwrap().status(), 302);
    assert_eq!(first.redirect.as_ref().unwrap().url.as_str(), "http://start.com/next");
    assert_eq!(call.hop_count(), 2);
}

#[tokio::test]
async fn test_307_and_308_keep_verb_and_body() {
    for code in [307, 308] {
        let transport = ScriptedTransport::new(move |m| match m.url.path() {
            "/upload" => redirect(code, "/moved"),
            _ => ok(),
        });
        let client = client(&transport);

        client
            .put("http://files.com/upload")
            .body("data")
            .send()
            .await
            .unwrap();

        let sent = transport.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].method, Method::PUT, "status {code}");
        assert_eq!(sent[1].body.to_bytes().as_ref(), b"data");
    }
}

#[tokio::test]
async fn test_301_302_303_change_verb_to_get() {
    for code in [301, 302, 303] {
        let transport = ScriptedTransport::new(move |m| match m.url.path() {
            "/form" => redirect(code, "/done"),
            _ => ok(),
        });
        let client = client(&transport);

        client
            .post("http://site.com/form")
            .body("a=1")
            .send()
            .await
            .unwrap();

        let sent = transport.sent();
        assert_eq!(sent[1].method, Method::GET, "status {code}");
        assert!(sent[1].body.is_empty());
    }
}

#[tokio::test]
async fn test_redirect_cap_returns_last_response() {
    let counter = AtomicUsize::new(0);
    let transport = ScriptedTransport::new(move |_| {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        redirect(302, &format!("/hop{}", n))
    });
    let client = client(&transport);

    let call = client
        .get("http://loop.com/")
        .with_redirects(|r| {
            r.max_auto_redirects(5);
        })
        .send()
        .await
        .unwrap();

    assert_eq!(transport.sent_count(), 6);
    assert_eq!(call.response.as_ref().unwrap().status(), 302);
    assert!(call.redirect.is_none());
    assert_eq!(call.redirect_chain().len(), 6);
}

#[tokio::test]
async fn test_circular_redirect_fails() {
    let transport = ScriptedTransport::new(|m| match m.url.path() {
        "/a" => redirect(302, "/b"),
        _ => redirect(302, "/a"),
    });
    let client = client(&transport);

    let err = client.get("http://cycle.com/a").send().await.unwrap_err();

    assert!(matches!(err, NetError::CircularRedirect { .. }));
    assert!(transport.sent_count() <= 2);
}

#[tokio::test]
async fn test_authorization_forwarding() {
    let transport = ScriptedTransport::new(|m| match m.url.host_str() {
        Some("a.com") => redirect(302, "http://b.com/"),
        _ => ok(),
    });
    let client = client(&transport);

    client
        .get("http://a.com/")
        .bearer_auth("secret")
        .header("X-Custom", "1")
        .with_cookie("session", "abc")
        .send()
        .await
        .unwrap();

    let sent = transport.sent();
    assert_eq!(sent[0].headers.get("authorization"), Some("Bearer secret"));
    assert_eq!(sent[0].headers.get("cookie"), Some("session=abc"));
    assert!(!sent[1].headers.contains("authorization"));
    assert!(!sent[1].headers.contains("cookie"));
    assert_eq!(sent[1].headers.get("x-custom"), Some("1"));

    let transport = ScriptedTransport::new(|m| match m.url.host_str() {
        Some("a.com") => redirect(302, "http://b.com/"),
        _ => ok(),
    });
    client_with_forwarding(&transport).await;
    let sent = transport.sent();
    assert_eq!(sent[1].headers.get("authorization"), Some("Bearer secret"));
}

async fn client_with_forwarding(transport: &std::sync::Arc<ScriptedTransport>) {
    client(transport)
        .get("http://a.com/")
        .bearer_auth("secret")
        .with_redirects(|r| {
            r.forward_authorization_header(true);
        })
        .send()
        .await
        .unwrap();
}

#[tokio::test]
async fn test_forward_headers_disabled() {
    let transport = ScriptedTransport::new(|m| match m.url.path() {
        "/" => redirect(302, "/next"),
        _ => ok(),
    });
    let client = client(&transport);

    client
        .get("http://a.com/")
        .header("X-Custom", "1")
        .with_redirects(|r| {
            r.forward_headers(false);
        })
        .send()
        .await
        .unwrap();

    let sent = transport.sent();
    assert!(!sent[1].headers.contains("x-custom"));
}

#[tokio::test]
async fn test_secure_to_insecure_not_followed() {
    let transport = ScriptedTransport::new(|m| match m.url.scheme() {
        "https" => redirect(302, "http://plain.com/"),
        _ => ok(),
    });
    let client = client(&transport);

    let call = client.get("https://secure.com/").send().await.unwrap();
    assert_eq!(transport.sent_count(), 1);
    assert_eq!(call.response.unwrap().status(), 302);

    let call = client
        .get("https://secure.com/")
        .with_redirects(|r| {
            r.allow_secure_to_insecure(true);
        })
        .send()
        .await
        .unwrap();
    assert_eq!(transport.sent_count(), 3);
    assert_eq!(call.response.unwrap().status(), 200);
}

#[tokio::test]
async fn test_redirects_disabled() {
    let transport = ScriptedTransport::new(|_| redirect(301, "/elsewhere"));
    let client = client(&transport);

    let call = client
        .get("http://a.com/")
        .with_redirects(|r| {
            r.enabled(false);
        })
        .send()
        .await
        .unwrap();

    assert_eq!(transport.sent_count(), 1);
    assert!(call.redirect.is_none());
}

#[tokio::test]
async fn test_on_redirect_hook_can_stop_following() {
    let transport = ScriptedTransport::new(|m| match m.url.path() {
        "/" => redirect(302, "/next"),
        _ => ok(),
    });
    let client = client(&transport);

    let call = client
        .get("http://a.com/")
        .on_redirect(|call| {
            if let Some(redirect) = call.redirect.as_mut() {
                redirect.follow = false;
            }
            Box::pin(async { Ok(()) })
        })
        .send()
        .await
        .unwrap();

    assert_eq!(transport.sent_count(), 1);
    let decision = call.redirect.unwrap();
    assert!(!decision.follow);
    assert_eq!(decision.follow_count, 1);
}

#[tokio::test]
async fn test_fragment_carried_to_target() {
    let transport = ScriptedTransport::new(|m| match m.url.path() {
        "/" => redirect(302, "/next"),
        _ => ok(),
    });
    let client = client(&transport);

    let call = client.get("http://a.com/#section").send().await.unwrap();
    assert_eq!(call.request.url.as_str(), "http://a.com/next#section");
}
