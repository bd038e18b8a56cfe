//! PagerDuty endpoints used by myshift.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ApiError, Result};
use crate::models::{OnCall, OnCallQuery, Override, User};
use crate::pagination::{OffsetPage, PageInfo, Paginator};
use crate::ApiClient;

const ON_CALL_PAGE_SIZE: u32 = 100;
const USER_SEARCH_LIMIT: u32 = 25;

/// Operations the commands need from the scheduling API.
#[async_trait]
pub trait ScheduleApi: Send + Sync {
    /// Find a user by email address (case-insensitive).
    async fn find_user_by_email(&self, email: &str) -> Result<User>;

    async fn get_user(&self, user_id: &str) -> Result<User>;

    /// Every on-call entry matching `query`, across all pages.
    async fn list_on_calls(&self, query: &OnCallQuery) -> Result<Vec<OnCall>>;

    async fn create_overrides(&self, schedule_id: &str, overrides: &[Override]) -> Result<()>;
}

#[derive(Deserialize)]
struct UsersResponse {
    #[serde(default)]
    users: Vec<User>,
}

#[derive(Deserialize)]
struct UserResponse {
    user: User,
}

#[derive(Deserialize)]
struct OnCallsResponse {
    #[serde(default)]
    oncalls: Vec<OnCall>,
    #[serde(flatten)]
    info: PageInfo,
}

#[derive(Serialize)]
struct OverridesRequest<'a> {
    overrides: &'a [Override],
}

struct OnCallPages<'a> {
    client: &'a ApiClient,
    query: &'a OnCallQuery,
}

#[async_trait]
impl Paginator<OnCall> for OnCallPages<'_> {
    async fn fetch_page(&self, offset: u32, limit: u32) -> Result<OffsetPage<OnCall>> {
        let mut params = self.query.to_pairs();
        params.push(("offset".to_string(), offset.to_string()));
        params.push(("limit".to_string(), limit.to_string()));

        let response: OnCallsResponse = self.client.get_with_query("/oncalls", &params).await?;
        Ok(OffsetPage {
            values: response.oncalls,
            info: response.info,
        })
    }
}

#[async_trait]
impl ScheduleApi for ApiClient {
    async fn find_user_by_email(&self, email: &str) -> Result<User> {
        let params = vec![
            ("query".to_string(), email.to_string()),
            ("limit".to_string(), USER_SEARCH_LIMIT.to_string()),
        ];
        let response: UsersResponse = self.get_with_query("/users", &params).await?;
        debug!(email, candidates = response.users.len(), "User search finished");

        response
            .users
            .into_iter()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .ok_or_else(|| ApiError::NotFound {
                resource: format!("user with email {email}"),
            })
    }

    async fn get_user(&self, user_id: &str) -> Result<User> {
        let response: UserResponse = self.get(&format!("/users/{user_id}")).await?;
        Ok(response.user)
    }

    async fn list_on_calls(&self, query: &OnCallQuery) -> Result<Vec<OnCall>> {
        let pages = OnCallPages {
            client: self,
            query,
        };
        let on_calls = pages.fetch_all(ON_CALL_PAGE_SIZE).await?;
        debug!(count = on_calls.len(), "Fetched on-call entries");
        Ok(on_calls)
    }

    async fn create_overrides(&self, schedule_id: &str, overrides: &[Override]) -> Result<()> {
        let response: Value = self
            .post(
                &format!("/schedules/{schedule_id}/overrides"),
                &OverridesRequest { overrides },
            )
            .await?;

        // The bulk endpoint reports each override separately.
        let failed = response
            .as_array()
            .map(|results| {
                results
                    .iter()
                    .filter(|r| r.get("status").and_then(Value::as_u64).unwrap_or(201) >= 400)
                    .count()
            })
            .unwrap_or(0);

        if failed > 0 {
            warn!(schedule_id, failed, "PagerDuty rejected overrides");
            return Err(ApiError::BadRequest {
                message: format!(
                    "{failed} of {} override(s) were rejected: {response}",
                    overrides.len()
                ),
            });
        }

        debug!(schedule_id, count = overrides.len(), "Created overrides");
        Ok(())
    }
}
