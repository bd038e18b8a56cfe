//! In-memory `ScheduleApi` for command tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use myshift_api::{
    ApiError, OnCall, OnCallQuery, Override, Result, ScheduleApi, ScheduleReference, User,
    UserReference,
};

#[derive(Default)]
pub struct MockApi {
    pub users: Vec<User>,
    pub on_calls: Vec<OnCall>,
    pub fail_users: bool,
    pub fail_on_calls: bool,
    pub fail_overrides: bool,
    pub find_user_calls: Mutex<Vec<String>>,
    pub get_user_calls: Mutex<Vec<String>>,
    pub on_call_queries: Mutex<Vec<Vec<(String, String)>>>,
    pub created: Mutex<Vec<(String, Vec<Override>)>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, id: &str, name: &str, email: &str) -> Self {
        self.users.push(User {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            kind: "user".to_string(),
        });
        self
    }

    pub fn with_shift(mut self, user_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.on_calls.push(on_call(user_id, start, end));
        self
    }

    pub fn created_overrides(&self) -> Vec<(String, Vec<Override>)> {
        self.created.lock().unwrap().clone()
    }

    fn user_summary(&self, user_id: &str) -> String {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.name.clone())
            .unwrap_or_else(|| format!("Summary {user_id}"))
    }
}

pub fn on_call(user_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> OnCall {
    OnCall {
        start,
        end,
        user: UserReference {
            id: user_id.to_string(),
            kind: "user_reference".to_string(),
            summary: format!("Summary {user_id}"),
        },
        schedule: Some(ScheduleReference {
            id: "PSCHED1".to_string(),
            summary: "Primary".to_string(),
        }),
        escalation_level: Some(1),
    }
}

/// `now` truncated to whole seconds so it survives an RFC 3339 round trip.
pub fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(Utc::now().timestamp(), 0).unwrap()
}

pub fn hours(h: i64) -> Duration {
    Duration::hours(h)
}

fn param<'a>(pairs: &'a [(String, String)], key: &str) -> Vec<&'a str> {
    pairs
        .iter()
        .filter(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .collect()
}

fn parse_time(value: Option<&&str>) -> Option<DateTime<Utc>> {
    value.and_then(|v| DateTime::parse_from_rfc3339(v).ok().map(|t| t.with_timezone(&Utc)))
}

#[async_trait]
impl ScheduleApi for MockApi {
    async fn find_user_by_email(&self, email: &str) -> Result<User> {
        self.find_user_calls.lock().unwrap().push(email.to_string());
        if self.fail_users {
            return Err(ApiError::ServerError {
                status: 500,
                message: "mock error finding user".to_string(),
            });
        }
        self.users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
            .ok_or_else(|| ApiError::NotFound {
                resource: format!("user with email {email}"),
            })
    }

    async fn get_user(&self, user_id: &str) -> Result<User> {
        self.get_user_calls.lock().unwrap().push(user_id.to_string());
        if self.fail_users {
            return Err(ApiError::ServerError {
                status: 500,
                message: "mock error getting user".to_string(),
            });
        }
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound {
                resource: format!("/users/{user_id}"),
            })
    }

    async fn list_on_calls(&self, query: &OnCallQuery) -> Result<Vec<OnCall>> {
        let pairs = query.to_pairs();
        self.on_call_queries.lock().unwrap().push(pairs.clone());
        if self.fail_on_calls {
            return Err(ApiError::ServerError {
                status: 500,
                message: "mock error fetching on-calls".to_string(),
            });
        }

        let users = param(&pairs, "user_ids[]");
        let since = parse_time(param(&pairs, "since").first());
        let until = parse_time(param(&pairs, "until").first());

        Ok(self
            .on_calls
            .iter()
            .filter(|s| users.is_empty() || users.contains(&s.user.id.as_str()))
            .filter(|s| since.map_or(true, |since| s.end > since))
            .filter(|s| until.map_or(true, |until| s.start < until))
            .cloned()
            .map(|mut s| {
                s.user.summary = self.user_summary(&s.user.id);
                s
            })
            .collect())
    }

    async fn create_overrides(&self, schedule_id: &str, overrides: &[Override]) -> Result<()> {
        if self.fail_overrides {
            return Err(ApiError::BadRequest {
                message: "mock error creating overrides".to_string(),
            });
        }
        self.created
            .lock()
            .unwrap()
            .push((schedule_id.to_string(), overrides.to_vec()));
        Ok(())
    }
}
