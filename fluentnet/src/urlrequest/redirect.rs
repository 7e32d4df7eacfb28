//! Redirect policy.
//!
//! [`decide`] looks at a completed hop and returns how to follow it, if at
//! all. It has no side effects; the engine runs `OnRedirect` hooks with
//! the decision before acting on it.

use crate::base::neterror::NetError;
use crate::cookies::httpcookie::is_secure_scheme;
use crate::http::message::{OutgoingMessage, RequestBody};
use crate::settings::RedirectSettings;
use crate::urlrequest::call::CallRecord;
use http::Method;
use url::Url;

/// How to issue the next hop of a redirected call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectDecision {
    /// Resolved target of the `Location` header.
    pub url: Url,
    /// Redirects performed on this logical call including this one.
    pub follow_count: u32,
    /// Cleared by an `OnRedirect` hook to stop at the current response.
    pub follow: bool,
    /// 301, 302 and 303 switch to GET and drop the body.
    pub change_verb_to_get: bool,
    pub forward_headers: bool,
    pub forward_authorization_header: bool,
}

impl RedirectDecision {
    /// Build the next hop's request description from the previous one.
    ///
    /// `Cookie` is never carried over; the engine derives it again from
    /// the jar for the new URL.
    pub fn next_request(&self, previous: &OutgoingMessage) -> OutgoingMessage {
        let method = if self.change_verb_to_get {
            Method::GET
        } else {
            previous.method.clone()
        };

        let mut next = OutgoingMessage::new(method, self.url.clone());
        next.version = previous.version;
        next.body = if self.change_verb_to_get {
            RequestBody::Empty
        } else {
            previous.body.clone()
        };

        if self.forward_headers {
            for (name, value) in previous.headers.iter() {
                if self.forwards(name) {
                    next.headers.append(name, value);
                }
            }
        }
        next
    }

    fn forwards(&self, name: &str) -> bool {
        if name.eq_ignore_ascii_case("cookie") || name.eq_ignore_ascii_case("host") {
            return false;
        }
        if name.eq_ignore_ascii_case("authorization") {
            return self.forward_authorization_header;
        }
        let is_content_header = name
            .get(..8)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("content-"));
        !(self.change_verb_to_get && is_content_header)
    }
}

/// Decide whether and how to follow the response of `call`.
///
/// Returns `Ok(None)` when the response is not a followable redirect or
/// the redirect cap is reached, and [`NetError::CircularRedirect`] when
/// the target was already visited in this logical call.
pub fn decide(
    call: &CallRecord,
    settings: &RedirectSettings,
) -> Result<Option<RedirectDecision>, NetError> {
    let Some(response) = call.response.as_ref() else {
        return Ok(None);
    };
    if !settings.enabled || !response.status().is_redirection() {
        return Ok(None);
    }
    let Some(location) = response.header("location") else {
        return Ok(None);
    };

    let from = &call.request.url;
    let mut target = match from.join(location.trim()) {
        Ok(target) => target,
        Err(e) => {
            tracing::debug!(url = %from, location, error = %e, "unresolvable Location header");
            return Ok(None);
        }
    };
    if target.fragment().is_none() {
        target.set_fragment(from.fragment());
    }

    if is_secure_scheme(from.scheme())
        && !is_secure_scheme(target.scheme())
        && !settings.allow_secure_to_insecure
    {
        tracing::debug!(url = %from, target = %target, "not following secure to insecure redirect");
        return Ok(None);
    }

    let status = response.status().as_u16();
    let change_verb_to_get = matches!(status, 301..=303);

    let visited = without_fragment(&target);
    if call
        .redirect_chain()
        .iter()
        .any(|url| without_fragment(url) == visited)
    {
        return Err(NetError::CircularRedirect {
            url: target.to_string(),
        });
    }

    let follow_count = u32::try_from(call.hop_count()).unwrap_or(u32::MAX);
    if follow_count > settings.max_auto_redirects {
        tracing::debug!(
            url = %from,
            max = settings.max_auto_redirects,
            "redirect limit reached, returning last response"
        );
        return Ok(None);
    }

    Ok(Some(RedirectDecision {
        url: target,
        follow_count,
        follow: true,
        change_verb_to_get,
        forward_headers: settings.forward_headers,
        forward_authorization_header: settings.forward_authorization_header,
    }))
}

fn without_fragment(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_fragment(None);
    url
}
