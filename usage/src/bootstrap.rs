use common::{error::Res, jwt::Identity};
use db::{
    Store,
    dtos::{profile::ProfileCreateRequest, subscription::SubscriptionCreateRequest},
    models::subscription::SubscriptionStatus,
};
use log::{debug, info, warn};
use serde::Serialize;

/// Display name stored when the identity carries no usable name or email.
pub const FALLBACK_DISPLAY_NAME: &str = "Usuario";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BootstrapReport {
    pub profile_created: bool,
    pub subscription_created: bool,
}

/// Makes sure the user has a profile row and an active subscription.
///
/// Safe to call on every session start: rows that already exist are left
/// untouched. The profile and subscription steps are independent, a failure
/// in one does not prevent the other. A failed existence check skips the
/// matching insert so a flaky read never produces duplicates.
pub async fn ensure_user_bootstrap(
    store: Option<&dyn Store>,
    identity: Option<&Identity>,
    free_plan_id: &str,
) -> crate::Outcome<BootstrapReport> {
    let (Some(store), Some(identity)) = (store, identity) else {
        debug!("Bootstrap skipped: store or identity missing");
        return crate::Outcome::Skipped;
    };

    let mut report = BootstrapReport::default();
    let mut issues = Vec::new();

    match ensure_profile(store, identity).await {
        Ok(created) => report.profile_created = created,
        Err(e) => {
            warn!("Profile bootstrap failed for user {}: {}", identity.user_id, e);
            issues.push(format!("profile: {}", e));
        }
    }

    match ensure_subscription(store, identity, free_plan_id).await {
        Ok(created) => report.subscription_created = created,
        Err(e) => {
            warn!(
                "Subscription bootstrap failed for user {}: {}",
                identity.user_id, e
            );
            issues.push(format!("subscription: {}", e));
        }
    }

    crate::Outcome::from_parts(report, issues)
}

async fn ensure_profile(store: &dyn Store, identity: &Identity) -> Res<bool> {
    if store.profile_exists(identity.user_id).await? {
        return Ok(false);
    }

    store
        .insert_profile(ProfileCreateRequest {
            id: identity.user_id,
            full_name: display_name(identity),
            phone: identity.phone.clone(),
        })
        .await?;
    info!("Created profile for user {}", identity.user_id);
    Ok(true)
}

async fn ensure_subscription(
    store: &dyn Store,
    identity: &Identity,
    free_plan_id: &str,
) -> Res<bool> {
    if store
        .get_active_subscription(identity.user_id)
        .await?
        .is_some()
    {
        return Ok(false);
    }

    store
        .insert_subscription(SubscriptionCreateRequest {
            user_id: identity.user_id,
            plan_id: free_plan_id.to_string(),
            status: SubscriptionStatus::Active,
            current_period_end: None,
        })
        .await?;
    info!(
        "Created '{}' subscription for user {}",
        free_plan_id, identity.user_id
    );
    Ok(true)
}

/// Full name, then name, then email, then [`FALLBACK_DISPLAY_NAME`].
pub fn display_name(identity: &Identity) -> String {
    [&identity.full_name, &identity.name, &identity.email]
        .into_iter()
        .flatten()
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .unwrap_or(FALLBACK_DISPLAY_NAME)
        .to_string()
}
