use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use myshift_api::{OnCall, OnCallQuery, ScheduleApi};
use myshift_output::ShiftRow;
use tracing::{debug, warn};

use super::utils::ShiftContext;

/// Drop repeated entries for the same user, schedule and interval.
///
/// `/oncalls` lists a shift once per escalation rule that references the
/// schedule, so the same interval can appear several times.
pub fn dedupe(on_calls: Vec<OnCall>) -> Vec<OnCall> {
    let mut seen = HashSet::new();
    on_calls
        .into_iter()
        .filter(|shift| {
            seen.insert((
                shift.user.id.clone(),
                shift.schedule_id().to_string(),
                shift.start,
                shift.end,
            ))
        })
        .collect()
}

async fn fetch(ctx: &ShiftContext<'_>, query: OnCallQuery) -> Result<Vec<OnCall>> {
    let on_calls = ctx
        .api
        .list_on_calls(&query.schedule(ctx.schedule_id.as_str()).overflow(true))
        .await
        .context("Failed to fetch on-call shifts")?;

    let fetched = on_calls.len();
    let mut shifts = dedupe(on_calls);
    shifts.sort_by_key(|shift| shift.start);
    debug!(fetched, unique = shifts.len(), "Collected shifts");
    Ok(shifts)
}

/// Shifts for one user overlapping `[since, until]`.
pub async fn fetch_user_shifts(
    ctx: &ShiftContext<'_>,
    user_id: &str,
    since: DateTime<Utc>,
    until: DateTime<Utc>,
) -> Result<Vec<OnCall>> {
    fetch(ctx, OnCallQuery::new().time_range(since, until).user(user_id)).await
}

/// Every shift in the schedule overlapping `[since, until]`.
pub async fn fetch_schedule_shifts(
    ctx: &ShiftContext<'_>,
    since: DateTime<Utc>,
    until: DateTime<Utc>,
) -> Result<Vec<OnCall>> {
    fetch(ctx, OnCallQuery::new().time_range(since, until)).await
}

/// Look up display names, one request per distinct user.
pub async fn user_names(api: &dyn ScheduleApi, on_calls: &[OnCall]) -> HashMap<String, String> {
    let mut names = HashMap::new();
    for shift in on_calls {
        if names.contains_key(&shift.user.id) {
            continue;
        }
        let name = match api.get_user(&shift.user.id).await {
            Ok(user) if !user.name.is_empty() => user.name,
            Ok(_) => shift.user.summary.clone(),
            Err(err) => {
                warn!(user_id = %shift.user.id, error = %err, "Falling back to shift summary");
                shift.user.summary.clone()
            }
        };
        names.insert(shift.user.id.clone(), name);
    }
    names
}

pub fn to_rows(on_calls: &[OnCall], names: &HashMap<String, String>) -> Vec<ShiftRow> {
    on_calls
        .iter()
        .map(|shift| ShiftRow {
            start: shift.start,
            end: shift.end,
            user_id: shift.user.id.clone(),
            user_name: names
                .get(&shift.user.id)
                .cloned()
                .unwrap_or_else(|| shift.user.summary.clone()),
            schedule_name: shift.schedule_name().to_string(),
        })
        .collect()
}
