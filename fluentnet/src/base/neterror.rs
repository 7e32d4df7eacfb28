use crate::urlrequest::call::CallRecord;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum NetError {
    // Connection Errors
    #[error("Connection closed (TCP FIN)")]
    ConnectionClosed,
    #[error("Connection reset (TCP RST)")]
    ConnectionReset,
    #[error("Connection refused")]
    ConnectionRefused,
    #[error("Connection aborted")]
    ConnectionAborted,
    #[error("Connection timed out")]
    ConnectionTimedOut,
    #[error("Connection to {host}:{port} failed: {message}")]
    ConnectionFailedTo {
        host: String,
        port: u16,
        message: String,
    },

    // HTTP Errors
    #[error("Invalid URL")]
    InvalidUrl,
    #[error("Disallowed URL scheme")]
    DisallowedUrlScheme,
    #[error("Invalid response")]
    InvalidResponse,
    #[error("Empty response")]
    EmptyResponse,
    #[error("Invalid header")]
    InvalidHeader,
    #[error("HTTP body error")]
    HttpBodyError,
    #[error("Response body is not valid UTF-8")]
    InvalidUtf8,
    #[error("Call failed with status code {status}")]
    UnexpectedStatus { status: u16 },

    // Cookie and configuration errors
    #[error("Invalid cookie `{name}`: {reason}")]
    InvalidCookie { name: String, reason: String },
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("Invalid allowed HTTP status range `{pattern}`: unrecognized token `{token}`")]
    InvalidStatusRange { pattern: String, token: String },

    // Call errors
    #[error("Circular redirect detected: {url}")]
    CircularRedirect { url: String },
    #[error("{}", .call.failure_summary())]
    CallFailed { call: Box<CallRecord> },
    #[error("Call timed out: {} {}", .call.request.method, .call.request.url)]
    CallTimedOut { call: Box<CallRecord> },
    #[error("Response could not be parsed: {message}")]
    ResponseParsingFailed {
        message: String,
        call: Option<Box<CallRecord>>,
    },
    #[error("Call was cancelled")]
    Cancelled,

    #[error("Unknown error: {0}")]
    Unknown(i32),
}

impl NetError {
    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::Cancelled => -3,
            NetError::CallTimedOut { .. } => -7,

            NetError::ConnectionClosed => -100,
            NetError::ConnectionReset => -101,
            NetError::ConnectionRefused => -102,
            NetError::ConnectionAborted => -103,
            NetError::ConnectionFailedTo { .. } => -104,
            NetError::ConnectionTimedOut => -118,

            NetError::InvalidUrl => -300,
            NetError::DisallowedUrlScheme => -301,
            NetError::InvalidResponse => -320,
            NetError::EmptyResponse => -324,

            // Call-level errors (custom codes starting at -10000, clear of
            // every range in Chromium's net_error_list.h)
            NetError::CircularRedirect { .. } => -10000,
            NetError::InvalidCookie { .. } => -10001,
            NetError::InvalidOperation(_) => -10002,
            NetError::InvalidStatusRange { .. } => -10003,
            NetError::CallFailed { .. } => -10004,
            NetError::ResponseParsingFailed { .. } => -10005,
            NetError::InvalidHeader => -10006,
            NetError::HttpBodyError => -10007,
            NetError::InvalidUtf8 => -10008,
            NetError::UnexpectedStatus { .. } => -10009,
            NetError::Unknown(code) => *code,
        }
    }

    /// Create an invalid cookie error.
    pub fn invalid_cookie(name: impl Into<String>, reason: impl Into<String>) -> Self {
        NetError::InvalidCookie {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a connection failure with host context.
    pub fn connection_failed_to(host: impl Into<String>, port: u16, err: impl ToString) -> Self {
        NetError::ConnectionFailedTo {
            host: host.into(),
            port,
            message: err.to_string(),
        }
    }

    /// The call record attached to a call-level failure, if any.
    pub fn call(&self) -> Option<&CallRecord> {
        match self {
            NetError::CallFailed { call } | NetError::CallTimedOut { call } => Some(call),
            NetError::ResponseParsingFailed { call, .. } => call.as_deref(),
            _ => None,
        }
    }

    /// Consume the error, returning its call record if one is attached.
    pub fn into_call(self) -> Option<CallRecord> {
        match self {
            NetError::CallFailed { call } | NetError::CallTimedOut { call } => Some(*call),
            NetError::ResponseParsingFailed { call, .. } => call.map(|c| *c),
            _ => None,
        }
    }

    /// HTTP status of the response behind this failure, if one was received.
    pub fn status(&self) -> Option<u16> {
        self.call()
            .and_then(|c| c.response.as_ref())
            .map(|r| r.status().as_u16())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            NetError::CallTimedOut { .. } | NetError::ConnectionTimedOut
        )
    }

    /// True for failures raised by the transport rather than by call policy.
    pub fn is_transport_error(&self) -> bool {
        (-199..=-100).contains(&self.as_i32())
    }
}

impl From<i32> for NetError {
    fn from(code: i32) -> Self {
        match code {
            -3 => NetError::Cancelled,
            -100 => NetError::ConnectionClosed,
            -101 => NetError::ConnectionReset,
            -102 => NetError::ConnectionRefused,
            -103 => NetError::ConnectionAborted,
            -118 => NetError::ConnectionTimedOut,

            -300 => NetError::InvalidUrl,
            -301 => NetError::DisallowedUrlScheme,
            -320 => NetError::InvalidResponse,
            -324 => NetError::EmptyResponse,

            -10006 => NetError::InvalidHeader,
            -10007 => NetError::HttpBodyError,
            -10008 => NetError::InvalidUtf8,
            _ => NetError::Unknown(code),
        }
    }
}
