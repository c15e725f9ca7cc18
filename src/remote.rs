use crate::model::{
    Absence, AttendanceEvent, AuthorizedPickup, Course, Device, Guardian, Notification, Schedule,
    ScheduleException, Student, Teacher, Tenant, WithdrawalRequest,
};
use serde::Deserialize;
use serde_json::Value;
use std::cell::RefCell;

/// Failure from the remote collaborator. The store surfaces the text verbatim
/// and never retries on its own.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered and said no.
    #[error("{0}")]
    Rejected(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("network error: {0}")]
    Network(String),
}

/// Server-authoritative collections the replica mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Student,
    Guardian,
    Course,
    Schedule,
    ScheduleException,
    AttendanceEvent,
    Device,
    Absence,
    AuthorizedPickup,
    WithdrawalRequest,
    Notification,
    Teacher,
}

impl EntityKind {
    /// URL path segment on the remote API.
    pub fn path(&self) -> &'static str {
        match self {
            EntityKind::Student => "students",
            EntityKind::Guardian => "guardians",
            EntityKind::Course => "courses",
            EntityKind::Schedule => "schedules",
            EntityKind::ScheduleException => "schedule-exceptions",
            EntityKind::AttendanceEvent => "attendance-events",
            EntityKind::Device => "devices",
            EntityKind::Absence => "absences",
            EntityKind::AuthorizedPickup => "authorized-pickups",
            EntityKind::WithdrawalRequest => "withdrawal-requests",
            EntityKind::Notification => "notifications",
            EntityKind::Teacher => "teachers",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Student => "student",
            EntityKind::Guardian => "guardian",
            EntityKind::Course => "course",
            EntityKind::Schedule => "schedule",
            EntityKind::ScheduleException => "schedule exception",
            EntityKind::AttendanceEvent => "attendance event",
            EntityKind::Device => "device",
            EntityKind::Absence => "absence",
            EntityKind::AuthorizedPickup => "authorized pickup",
            EntityKind::WithdrawalRequest => "withdrawal request",
            EntityKind::Notification => "notification",
            EntityKind::Teacher => "teacher",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, alias = "guardian_id")]
    pub guardian_id: Option<i64>,
}

/// Login-time bundle. Any collection present here fully replaces the local
/// one; absent collections are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bootstrap {
    #[serde(default, alias = "current_user", alias = "user")]
    pub current_user: Option<CurrentUser>,
    #[serde(default)]
    pub tenant: Option<Tenant>,
    #[serde(default)]
    pub features: Option<Vec<String>>,
    #[serde(default)]
    pub students: Option<Vec<Student>>,
    #[serde(default)]
    pub guardians: Option<Vec<Guardian>>,
    #[serde(default)]
    pub courses: Option<Vec<Course>>,
    #[serde(default)]
    pub schedules: Option<Vec<Schedule>>,
    #[serde(default, alias = "schedule_exceptions")]
    pub schedule_exceptions: Option<Vec<ScheduleException>>,
    #[serde(default, alias = "attendance_events")]
    pub attendance_events: Option<Vec<AttendanceEvent>>,
    #[serde(default)]
    pub devices: Option<Vec<Device>>,
    #[serde(default)]
    pub absences: Option<Vec<Absence>>,
    #[serde(default, alias = "authorized_pickups")]
    pub authorized_pickups: Option<Vec<AuthorizedPickup>>,
    #[serde(default, alias = "withdrawal_requests")]
    pub withdrawal_requests: Option<Vec<WithdrawalRequest>>,
    #[serde(default)]
    pub notifications: Option<Vec<Notification>>,
    #[serde(default)]
    pub teachers: Option<Vec<Teacher>>,
}

/// What the store consumes from the remote side. JSON in, JSON out; the store
/// owns typed decoding so test doubles stay trivial.
pub trait RemoteApi {
    /// Called whenever the session credential changes.
    fn auth(&self, _token: Option<&str>) {}

    fn bootstrap(&self) -> Result<Value, ApiError>;
    fn list(&self, kind: EntityKind) -> Result<Value, ApiError>;
    fn get(&self, kind: EntityKind, id: i64) -> Result<Value, ApiError>;
    fn create(&self, kind: EntityKind, payload: &Value) -> Result<Value, ApiError>;
    fn update(&self, kind: EntityKind, id: i64, payload: &Value) -> Result<Value, ApiError>;
    /// May answer with the (soft-deleted) entity or with nothing.
    fn delete(&self, kind: EntityKind, id: i64) -> Result<Option<Value>, ApiError>;
    fn restore(&self, kind: EntityKind, id: i64) -> Result<Value, ApiError>;

    /// Authenticated photo/audio endpoints reject plain URLs; bytes must be
    /// fetched with the bearer header attached.
    fn fetch_media(&self, media_ref: &str) -> Result<Vec<u8>, ApiError>;
    fn export_csv(&self, kind: EntityKind, query: &[(&str, String)]) -> Result<Vec<u8>, ApiError>;
}

/// Production client: blocking HTTP with bearer injection and a single
/// refresh-and-reissue on 401.
pub struct HttpApi {
    client: reqwest::blocking::Client,
    base_url: String,
    token: RefCell<Option<String>>,
    refresh_token: RefCell<Option<String>>,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> HttpApi {
        HttpApi {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: RefCell::new(None),
            refresh_token: RefCell::new(None),
        }
    }

    pub fn set_refresh_token(&self, token: Option<String>) {
        *self.refresh_token.borrow_mut() = token;
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&Value>,
        query: &[(&str, String)],
    ) -> Result<reqwest::blocking::Response, ApiError> {
        let attempt = |token: Option<String>| {
            let mut req = self.client.request(method.clone(), self.url(path));
            if let Some(t) = token {
                req = req.bearer_auth(t);
            }
            if let Some(b) = body {
                req = req.json(b);
            }
            if !query.is_empty() {
                req = req.query(query);
            }
            req.send().map_err(|e| ApiError::Network(e.to_string()))
        };

        let resp = attempt(self.token.borrow().clone())?;
        if resp.status() != reqwest::StatusCode::UNAUTHORIZED {
            return Ok(resp);
        }
        // One refresh, one reissue. A second 401 propagates.
        self.refresh()?;
        attempt(self.token.borrow().clone())
    }

    fn refresh(&self) -> Result<(), ApiError> {
        let refresh = self
            .refresh_token
            .borrow()
            .clone()
            .ok_or(ApiError::Unauthorized)?;
        let resp = self
            .client
            .post(self.url("auth/refresh"))
            .json(&serde_json::json!({ "refreshToken": refresh }))
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ApiError::Unauthorized);
        }
        let body: Value = resp.json().map_err(|e| ApiError::Network(e.to_string()))?;
        let token = body
            .get("token")
            .and_then(|v| v.as_str())
            .ok_or(ApiError::Unauthorized)?;
        *self.token.borrow_mut() = Some(token.to_string());
        Ok(())
    }

    fn check(resp: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        let text = resp.text().unwrap_or_default();
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .or_else(|| v.get("error"))
                    .and_then(|m| m.as_str())
                    .map(|s| s.to_string())
            })
            .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));
        Err(ApiError::Rejected(message))
    }

    fn json(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let resp = Self::check(self.send(method, path, body, &[])?)?;
        resp.json().map_err(|e| ApiError::Network(e.to_string()))
    }

    fn bytes(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<u8>, ApiError> {
        let resp = Self::check(self.send(reqwest::Method::GET, path, None, query)?)?;
        let bytes = resp.bytes().map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

impl RemoteApi for HttpApi {
    fn auth(&self, token: Option<&str>) {
        *self.token.borrow_mut() = token.map(|t| t.to_string());
    }

    fn bootstrap(&self) -> Result<Value, ApiError> {
        self.json(reqwest::Method::GET, "bootstrap", None)
    }

    fn list(&self, kind: EntityKind) -> Result<Value, ApiError> {
        self.json(reqwest::Method::GET, kind.path(), None)
    }

    fn get(&self, kind: EntityKind, id: i64) -> Result<Value, ApiError> {
        self.json(reqwest::Method::GET, &format!("{}/{}", kind.path(), id), None)
    }

    fn create(&self, kind: EntityKind, payload: &Value) -> Result<Value, ApiError> {
        self.json(reqwest::Method::POST, kind.path(), Some(payload))
    }

    fn update(&self, kind: EntityKind, id: i64, payload: &Value) -> Result<Value, ApiError> {
        self.json(
            reqwest::Method::PATCH,
            &format!("{}/{}", kind.path(), id),
            Some(payload),
        )
    }

    fn delete(&self, kind: EntityKind, id: i64) -> Result<Option<Value>, ApiError> {
        let resp = Self::check(self.send(
            reqwest::Method::DELETE,
            &format!("{}/{}", kind.path(), id),
            None,
            &[],
        )?)?;
        if resp.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let text = resp.text().map_err(|e| ApiError::Network(e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| ApiError::Network(e.to_string()))
    }

    fn restore(&self, kind: EntityKind, id: i64) -> Result<Value, ApiError> {
        self.json(
            reqwest::Method::POST,
            &format!("{}/{}/restore", kind.path(), id),
            None,
        )
    }

    fn fetch_media(&self, media_ref: &str) -> Result<Vec<u8>, ApiError> {
        self.bytes(&format!("media/{}", media_ref), &[])
    }

    fn export_csv(&self, kind: EntityKind, query: &[(&str, String)]) -> Result<Vec<u8>, ApiError> {
        self.bytes(&format!("{}/export.csv", kind.path()), query)
    }
}
