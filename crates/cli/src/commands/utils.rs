use anyhow::{anyhow, Result};
use myshift_api::ScheduleApi;

/// Everything a shift command needs: the API and the schedule it acts on.
pub struct ShiftContext<'a> {
    pub api: &'a dyn ScheduleApi,
    pub schedule_id: String,
    pub my_user: Option<String>,
}

impl<'a> ShiftContext<'a> {
    pub fn new(api: &'a dyn ScheduleApi, schedule_id: impl Into<String>) -> Self {
        Self {
            api,
            schedule_id: schedule_id.into(),
            my_user: None,
        }
    }

    pub fn with_my_user(mut self, my_user: Option<String>) -> Self {
        self.my_user = my_user.filter(|u| !u.trim().is_empty());
        self
    }

    /// The requested email, or the configured `my_user`.
    pub fn user_email<'b>(&'b self, requested: Option<&'b str>) -> Option<&'b str> {
        requested
            .filter(|email| !email.trim().is_empty())
            .or(self.my_user.as_deref())
    }

    pub fn require_user_email<'b>(&'b self, requested: Option<&'b str>) -> Result<&'b str> {
        self.user_email(requested)
            .ok_or_else(|| anyhow!("--user is required (or set my_user in configuration)"))
    }
}
