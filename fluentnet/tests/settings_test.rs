//! Settings layering, timeouts, cancellation and allowed statuses.

mod common;

use common::{context, ok, status, ScriptedTransport};
use fluentnet::settings::{SettingsScope, DEFAULT_TIMEOUT};
use fluentnet::{Client, NetError, URLRequestContext};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[test]
fn test_parent_visible_until_overridden() {
    let ctx = URLRequestContext::new();
    let client = SettingsScope::child_of(ctx.settings());
    let request = SettingsScope::child_of(&client);

    assert_eq!(ctx.resolver_for(&request).timeout(), Some(DEFAULT_TIMEOUT));

    client.set_timeout(Some(Duration::from_secs(5)));
    assert_eq!(ctx.resolver_for(&request).timeout(), Some(Duration::from_secs(5)));

    request.set_timeout(None);
    assert_eq!(ctx.resolver_for(&request).timeout(), None);

    request.reset_defaults();
    assert!(!request.has_local_values());
    assert_eq!(ctx.resolver_for(&request).timeout(), Some(Duration::from_secs(5)));
}

#[test]
fn test_override_scope_wins() {
    let overrides = SettingsScope::detached();
    overrides.set_max_auto_redirects(1);
    let ctx = URLRequestContext::new().with_overrides(overrides);

    let request = SettingsScope::child_of(ctx.settings());
    request.set_max_auto_redirects(20);
    request.set_cookies_enabled(false);

    let settings = ctx.resolver_for(&request);
    assert_eq!(settings.redirects().max_auto_redirects, 1);
    assert!(!settings.cookies_enabled());
}

#[test]
fn test_root_defaults() {
    let ctx = URLRequestContext::new();
    let settings = ctx.resolver_for(ctx.settings());
    let redirects = settings.redirects();

    assert_eq!(settings.timeout(), Some(Duration::from_secs(100)));
    assert_eq!(settings.http_version(), http::Version::HTTP_11);
    assert!(settings.allowed_http_status().is_none());
    assert!(settings.cookies_enabled());
    assert!(redirects.enabled);
    assert!(!redirects.allow_secure_to_insecure);
    assert!(redirects.forward_headers);
    assert!(!redirects.forward_authorization_header);
    assert_eq!(redirects.max_auto_redirects, 10);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_fails_call() {
    let transport = ScriptedTransport::delayed(Duration::from_secs(30), |_| ok());
    let client = common::client(&transport);

    let err = client
        .get("http://slow.com/")
        .timeout(Duration::from_secs(1))
        .send()
        .await
        .unwrap_err();

    assert!(err.is_timeout());
    let call = err.into_call().unwrap();
    assert!(matches!(call.error, Some(NetError::ConnectionTimedOut)));
    assert!(call.response.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_client_timeout_applies_to_requests() {
    let transport = ScriptedTransport::delayed(Duration::from_secs(30), |_| ok());
    let client = Client::builder()
        .context(context(&transport))
        .timeout(Duration::from_secs(2))
        .build();

    let err = client.get("http://slow.com/").send().await.unwrap_err();
    assert!(matches!(err, NetError::CallTimedOut { .. }));

    let call = client
        .get("http://slow.com/")
        .no_timeout()
        .send()
        .await
        .unwrap();
    assert!(call.succeeded());
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_fails_call() {
    let transport = ScriptedTransport::delayed(Duration::from_secs(30), |_| ok());
    let client = common::client(&transport);
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        canceller.cancel();
    });

    let err = client
        .get("http://slow.com/")
        .cancellation(token)
        .send()
        .await
        .unwrap_err();

    assert!(matches!(err, NetError::Cancelled));
    assert!(!err.is_timeout());
}

#[tokio::test]
async fn test_cancelled_token_sends_nothing() {
    let transport = ScriptedTransport::new(|_| ok());
    let client = common::client(&transport);
    let token = CancellationToken::new();
    token.cancel();

    let err = client
        .get("http://example.com/")
        .cancellation(token)
        .send()
        .await
        .unwrap_err();

    assert!(matches!(err, NetError::Cancelled));
    assert_eq!(transport.sent_count(), 0);
}

#[tokio::test]
async fn test_allowed_http_status() {
    let transport = ScriptedTransport::new(|m| match m.url.path() {
        "/missing" => status(404),
        "/teapot" => status(418),
        _ => status(503),
    });
    let client = common::client(&transport);

    let call = client
        .get("http://example.com/missing")
        .allow_http_status("404,5xx")
        .unwrap()
        .send()
        .await
        .unwrap();
    assert_eq!(call.response.unwrap().status(), 404);

    let err = client
        .get("http://example.com/teapot")
        .allow_http_status("404,5xx")
        .unwrap()
        .send()
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(418));

    let call = client
        .get("http://example.com/down")
        .allow_any_http_status()
        .send()
        .await
        .unwrap();
    assert_eq!(call.response.unwrap().status(), 503);
}

#[tokio::test]
async fn test_client_allowed_status_inherited() {
    let transport = ScriptedTransport::new(|_| status(409));
    let client = Client::builder()
        .context(context(&transport))
        .allow_http_status("409")
        .unwrap()
        .build();

    assert!(client.get("http://example.com/").send().await.is_ok());
}

#[test]
fn test_invalid_status_pattern_rejected() {
    let scope = SettingsScope::detached();
    let err = scope.set_allowed_http_status("1yy").unwrap_err();
    assert!(matches!(err, NetError::InvalidStatusRange { .. }));
}

#[test]
fn test_live_request_sees_client_change() {
    let ctx = Arc::new(URLRequestContext::new());
    let client = Client::builder().context(Arc::clone(&ctx)).build();
    let request = client.get("http://example.com/");

    client.settings().set_max_auto_redirects(3);
    assert_eq!(ctx.resolver_for(request.settings()).redirects().max_auto_redirects, 3);

    let request = request.with_redirects(|r| {
        r.max_auto_redirects(7);
    });
    client.settings().set_max_auto_redirects(4);
    assert_eq!(ctx.resolver_for(request.settings()).redirects().max_auto_redirects, 7);
}
