use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A PagerDuty user as returned by `/users`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Reference to a user embedded in other resources.
///
/// References carry the display name in `summary` rather than `name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserReference {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
}

impl UserReference {
    pub fn to_user(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: "user_reference".to_string(),
            summary: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleReference {
    pub id: String,
    #[serde(default)]
    pub summary: String,
}

/// One entry from `/oncalls`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnCall {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub user: UserReference,
    #[serde(default)]
    pub schedule: Option<ScheduleReference>,
    #[serde(default)]
    pub escalation_level: Option<u32>,
}

impl OnCall {
    pub fn schedule_id(&self) -> &str {
        self.schedule.as_ref().map(|s| s.id.as_str()).unwrap_or("")
    }

    pub fn schedule_name(&self) -> &str {
        self.schedule
            .as_ref()
            .map(|s| s.summary.as_str())
            .unwrap_or("")
    }

    /// True when `at` falls inside `[start, end)`.
    pub fn covers(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

/// A schedule override to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Override {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub user: UserReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl Override {
    pub fn for_user(user_id: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            user: UserReference::to_user(user_id),
            time_zone: Some("UTC".to_string()),
        }
    }
}

/// Filters for `GET /oncalls`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnCallQuery {
    since: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
    user_ids: Vec<String>,
    schedule_ids: Vec<String>,
    overflow: Option<bool>,
}

impl OnCallQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time_range(mut self, since: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self.until = Some(until);
        self
    }

    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.user_ids.push(user_id.into());
        self
    }

    pub fn schedule(mut self, schedule_id: impl Into<String>) -> Self {
        self.schedule_ids.push(schedule_id.into());
        self
    }

    /// Return whole shifts rather than ones truncated to the time range.
    pub fn overflow(mut self, overflow: bool) -> Self {
        self.overflow = Some(overflow);
        self
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(since) = self.since {
            pairs.push((
                "since".to_string(),
                since.to_rfc3339_opts(SecondsFormat::Secs, true),
            ));
        }
        if let Some(until) = self.until {
            pairs.push((
                "until".to_string(),
                until.to_rfc3339_opts(SecondsFormat::Secs, true),
            ));
        }
        for id in &self.user_ids {
            pairs.push(("user_ids[]".to_string(), id.clone()));
        }
        for id in &self.schedule_ids {
            pairs.push(("schedule_ids[]".to_string(), id.clone()));
        }
        if let Some(overflow) = self.overflow {
            pairs.push(("overflow".to_string(), overflow.to_string()));
        }
        pairs
    }
}
