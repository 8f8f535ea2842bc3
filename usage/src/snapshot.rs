use chrono::{DateTime, Utc};
use db::{
    Store,
    models::{plan::Plan, subscription::Subscription},
};
use log::{debug, warn};
use serde::Serialize;
use uuid::Uuid;

use crate::{Outcome, window::QuotaClock};

/// Point-in-time view of a user's plan and remaining quota.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    pub plan: Option<Plan>,
    pub subscription: Option<Subscription>,
    pub daily_used: i64,
    pub monthly_used: i64,
    pub remaining_today: Option<i64>,
    pub remaining_month: Option<i64>,
}

impl UsageSnapshot {
    /// True when a capped window has nothing left.
    pub fn is_exhausted(&self) -> bool {
        self.remaining_today == Some(0) || self.remaining_month == Some(0)
    }

    pub fn allows_query(&self) -> bool {
        !self.is_exhausted()
    }
}

/// `None` without a cap, otherwise `max(0, cap - used)`.
pub fn remaining(cap: Option<i32>, used: i64) -> Option<i64> {
    cap.map(|cap| (i64::from(cap) - used).max(0))
}

pub async fn get_usage_snapshot(
    store: Option<&dyn Store>,
    user_id: Option<Uuid>,
    clock: &QuotaClock,
) -> Outcome<UsageSnapshot> {
    get_usage_snapshot_at(store, user_id, clock, Utc::now()).await
}

/// Builds the snapshot as of `now`.
///
/// Each sub-query runs once. A failed one is logged and treated as missing
/// (`None` for subscription and plan, `0` for a count) so the rest of the
/// snapshot is still returned.
pub async fn get_usage_snapshot_at(
    store: Option<&dyn Store>,
    user_id: Option<Uuid>,
    clock: &QuotaClock,
    now: DateTime<Utc>,
) -> Outcome<UsageSnapshot> {
    let (Some(store), Some(user_id)) = (store, user_id) else {
        debug!("Usage snapshot skipped: store or user id missing");
        return Outcome::Skipped;
    };

    let windows = clock.windows(now);
    let mut issues = Vec::new();

    let subscription = match store.get_active_subscription(user_id).await {
        Ok(subscription) => subscription,
        Err(e) => {
            warn!("Failed to fetch subscription for user {}: {}", user_id, e);
            issues.push(format!("subscription: {}", e));
            None
        }
    };

    let plan = match subscription.as_ref().and_then(|s| s.plan_id.as_deref()) {
        Some(plan_id) => match store.get_plan(plan_id).await {
            Ok(plan) => plan,
            Err(e) => {
                warn!("Failed to fetch plan '{}' for user {}: {}", plan_id, user_id, e);
                issues.push(format!("plan: {}", e));
                None
            }
        },
        None => None,
    };

    let daily_used = match store.count_consultas_since(user_id, windows.day_start).await {
        Ok(count) => count,
        Err(e) => {
            warn!("Failed to count today's queries for user {}: {}", user_id, e);
            issues.push(format!("daily count: {}", e));
            0
        }
    };

    let monthly_used = match store
        .count_consultas_since(user_id, windows.month_start)
        .await
    {
        Ok(count) => count,
        Err(e) => {
            warn!("Failed to count this month's queries for user {}: {}", user_id, e);
            issues.push(format!("monthly count: {}", e));
            0
        }
    };

    let daily_limit = plan.as_ref().and_then(|p| p.daily_limit);
    let monthly_limit = plan.as_ref().and_then(|p| p.monthly_limit);

    let snapshot = UsageSnapshot {
        remaining_today: remaining(daily_limit, daily_used),
        remaining_month: remaining(monthly_limit, monthly_used),
        plan,
        subscription,
        daily_used,
        monthly_used,
    };

    Outcome::from_parts(snapshot, issues)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use chrono_tz::Tz;
    use db::{
        memory::{InMemoryStore, StoreOp},
        models::subscription::SubscriptionStatus,
    };

    use super::*;

    const LIMA: QuotaClock = QuotaClock::Zone(Tz::America__Lima);

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn plan(daily: Option<i32>, monthly: Option<i32>) -> Plan {
        Plan {
            id: "basic".to_string(),
            name: "Básico".to_string(),
            daily_limit: daily,
            monthly_limit: monthly,
            price: Some(9.9),
            features: None,
        }
    }

    fn subscribed_store(user_id: Uuid, plan: Plan) -> InMemoryStore {
        let store = InMemoryStore::new();
        store.seed_subscription(Subscription {
            id: Uuid::new_v4(),
            user_id,
            plan_id: Some(plan.id.clone()),
            status: SubscriptionStatus::Active,
            current_period_end: None,
            started_at: None,
            created_at: utc("2026-01-01T00:00:00Z"),
        });
        store.seed_plan(plan);
        store
    }

    #[tokio::test]
    async fn missing_user_yields_zero_snapshot() {
        let store = InMemoryStore::new();

        let outcome = get_usage_snapshot(Some(&store), None, &LIMA).await;
        assert!(outcome.is_skipped());

        let snapshot = outcome.value_or_default();
        assert_eq!(snapshot, UsageSnapshot::default());
        assert_eq!(
            serde_json::to_value(&snapshot).unwrap(),
            serde_json::json!({
                "plan": null,
                "subscription": null,
                "dailyUsed": 0,
                "monthlyUsed": 0,
                "remainingToday": null,
                "remainingMonth": null
            })
        );
    }

    #[tokio::test]
    async fn missing_store_yields_zero_snapshot() {
        let outcome = get_usage_snapshot(None, Some(Uuid::new_v4()), &LIMA).await;
        assert_eq!(outcome.value_or_default(), UsageSnapshot::default());
    }

    #[tokio::test]
    async fn remaining_is_cap_minus_usage() {
        let user_id = Uuid::new_v4();
        let store = subscribed_store(user_id, plan(Some(10), Some(100)));
        // 10:00 in Lima on Oct 16th
        let now = utc("2026-10-16T15:00:00Z");
        for hours_ago in [1, 2, 3] {
            store.seed_consulta_at(user_id, now - Duration::hours(hours_ago));
        }
        // Earlier this month, and last month
        store.seed_consulta_at(user_id, utc("2026-10-02T12:00:00Z"));
        store.seed_consulta_at(user_id, utc("2026-09-30T12:00:00Z"));
        // Another user
        store.seed_consulta_at(Uuid::new_v4(), now - Duration::hours(1));

        let outcome = get_usage_snapshot_at(Some(&store), Some(user_id), &LIMA, now).await;
        let snapshot = match outcome {
            Outcome::Completed(snapshot) => snapshot,
            other => panic!("expected completed snapshot, got {:?}", other),
        };

        assert_eq!(snapshot.daily_used, 3);
        assert_eq!(snapshot.monthly_used, 4);
        assert_eq!(snapshot.remaining_today, Some(7));
        assert_eq!(snapshot.remaining_month, Some(96));
        assert_eq!(snapshot.plan.as_ref().map(|p| p.id.as_str()), Some("basic"));
        assert!(snapshot.allows_query());
    }

    #[tokio::test]
    async fn day_window_starts_at_local_midnight() {
        let user_id = Uuid::new_v4();
        let store = subscribed_store(user_id, plan(Some(5), None));
        // 00:30 in Lima on Oct 16th
        let now = utc("2026-10-16T05:30:00Z");
        // 23:50 in Lima on Oct 15th
        store.seed_consulta_at(user_id, utc("2026-10-16T04:50:00Z"));
        // 00:10 in Lima on Oct 16th
        store.seed_consulta_at(user_id, utc("2026-10-16T05:10:00Z"));

        let snapshot = get_usage_snapshot_at(Some(&store), Some(user_id), &LIMA, now)
            .await
            .value_or_default();

        assert_eq!(snapshot.daily_used, 1);
        assert_eq!(snapshot.monthly_used, 2);
    }

    #[tokio::test]
    async fn uncapped_plan_has_no_remaining() {
        let user_id = Uuid::new_v4();
        let store = subscribed_store(user_id, plan(None, None));
        let now = utc("2026-10-16T15:00:00Z");
        store.seed_consulta_at(user_id, now - Duration::minutes(5));

        let snapshot = get_usage_snapshot_at(Some(&store), Some(user_id), &LIMA, now)
            .await
            .value_or_default();

        assert_eq!(snapshot.daily_used, 1);
        assert_eq!(snapshot.remaining_today, None);
        assert_eq!(snapshot.remaining_month, None);
        assert!(!snapshot.is_exhausted());
    }

    #[tokio::test]
    async fn overuse_clamps_remaining_at_zero() {
        let user_id = Uuid::new_v4();
        let store = subscribed_store(user_id, plan(Some(5), Some(6)));
        let now = utc("2026-10-16T15:00:00Z");
        for minutes_ago in 1..=8 {
            store.seed_consulta_at(user_id, now - Duration::minutes(minutes_ago));
        }

        let snapshot = get_usage_snapshot_at(Some(&store), Some(user_id), &LIMA, now)
            .await
            .value_or_default();

        assert_eq!(snapshot.daily_used, 8);
        assert_eq!(snapshot.remaining_today, Some(0));
        assert_eq!(snapshot.remaining_month, Some(0));
        assert!(snapshot.is_exhausted());
    }

    #[tokio::test]
    async fn user_without_subscription_still_gets_counts() {
        let user_id = Uuid::new_v4();
        let store = InMemoryStore::new();
        let now = utc("2026-10-16T15:00:00Z");
        store.seed_consulta_at(user_id, now - Duration::minutes(1));

        let outcome = get_usage_snapshot_at(Some(&store), Some(user_id), &LIMA, now).await;
        let snapshot = outcome.into_value().unwrap();

        assert!(snapshot.subscription.is_none());
        assert!(snapshot.plan.is_none());
        assert_eq!(snapshot.daily_used, 1);
        assert_eq!(snapshot.remaining_today, None);
    }

    #[tokio::test]
    async fn failed_plan_fetch_degrades_only_the_plan() {
        let user_id = Uuid::new_v4();
        let store = subscribed_store(user_id, plan(Some(10), Some(100)));
        store.fail(StoreOp::Plan);
        let now = utc("2026-10-16T15:00:00Z");
        store.seed_consulta_at(user_id, now - Duration::minutes(1));

        let outcome = get_usage_snapshot_at(Some(&store), Some(user_id), &LIMA, now).await;

        assert_eq!(outcome.issues().len(), 1);
        let snapshot = outcome.into_value().unwrap();
        assert!(snapshot.subscription.is_some());
        assert!(snapshot.plan.is_none());
        assert_eq!(snapshot.daily_used, 1);
        assert_eq!(snapshot.remaining_today, None);
    }

    #[tokio::test]
    async fn failed_subscription_fetch_keeps_counts() {
        let user_id = Uuid::new_v4();
        let store = subscribed_store(user_id, plan(Some(10), Some(100)));
        store.fail(StoreOp::ActiveSubscription);
        let now = utc("2026-10-16T15:00:00Z");
        store.seed_consulta_at(user_id, now - Duration::minutes(1));
        store.seed_consulta_at(user_id, utc("2026-10-02T12:00:00Z"));

        let outcome = get_usage_snapshot_at(Some(&store), Some(user_id), &LIMA, now).await;

        let issues = outcome.issues().to_vec();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].starts_with("subscription:"));
        let snapshot = match outcome {
            Outcome::Degraded { value, .. } => value,
            other => panic!("expected degraded snapshot, got {:?}", other),
        };
        assert!(snapshot.subscription.is_none());
        assert!(snapshot.plan.is_none());
        assert_eq!(snapshot.daily_used, 1);
        assert_eq!(snapshot.monthly_used, 2);
        assert_eq!(snapshot.remaining_today, None);
        assert_eq!(snapshot.remaining_month, None);
    }

    #[tokio::test]
    async fn failed_counts_degrade_to_zero() {
        let user_id = Uuid::new_v4();
        let store = subscribed_store(user_id, plan(Some(10), Some(100)));
        store.fail(StoreOp::CountConsultas);

        let outcome =
            get_usage_snapshot_at(Some(&store), Some(user_id), &LIMA, Utc::now()).await;

        assert_eq!(outcome.issues().len(), 2);
        let snapshot = outcome.into_value().unwrap();
        assert_eq!(snapshot.daily_used, 0);
        assert_eq!(snapshot.remaining_today, Some(10));
        assert_eq!(snapshot.remaining_month, Some(100));
    }

    #[test]
    fn remaining_matches_cap_presence() {
        assert_eq!(remaining(Some(10), 3), Some(7));
        assert_eq!(remaining(Some(5), 8), Some(0));
        assert_eq!(remaining(None, 3), None);
        assert_eq!(remaining(Some(0), 0), Some(0));
    }
}
