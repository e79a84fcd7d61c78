use crate::SmsFileEntry;
use serde::{Deserialize, Serialize};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// An admin API endpoint: method plus fixed path (or path prefix).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub method: HttpMethod,
    pub path: &'static str,
}

// =========================================================
// Endpoint Definitions
// =========================================================

/// Exchange the admin key for a session token (form: `admin_key`)
pub const LOGIN: Endpoint = Endpoint {
    method: HttpMethod::Post,
    path: "/admin/login",
};

/// List files of a folder; the folder (and optionally a filename) is appended
pub const SMS_FILES: Endpoint = Endpoint {
    method: HttpMethod::Get,
    path: "/admin/api/sms",
};

/// Send a test SMS (form: `phone`, `message`)
pub const SEND_TEST_SMS: Endpoint = Endpoint {
    method: HttpMethod::Post,
    path: "/admin/api/send-test-sms",
};

/// Restart smsd; the response body streams the restart log
pub const RESTART_SMSD: Endpoint = Endpoint {
    method: HttpMethod::Post,
    path: "/admin/api/restart-smsd",
};

/// Real-time updates WebSocket; token goes in the `token` query parameter
pub const REALTIME_WS_PATH: &str = "/admin/ws";

// =========================================================
// Real-time Events
// =========================================================

/// Messages pushed by the server over the admin WebSocket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RealtimeEvent {
    /// Keep-alive sent every poll cycle
    Heartbeat,
    NewFile {
        folder: String,
        file: SmsFileEntry,
    },
    RemovedFile {
        folder: String,
        filename: String,
    },
    /// Any event name this client does not know about yet
    #[serde(other)]
    Unknown,
}
