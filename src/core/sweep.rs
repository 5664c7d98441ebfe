//! Scheduled cancellation sweeps.
//!
//! Two independent jobs scan for orders that have outlived a time limit and cancel them:
//!
//! - **Stale pending**: pending orders the farm has not confirmed in time (48 hours by
//!   default). The buyer and the farm are both notified.
//! - **Post harvest**: pending or confirmed orders whose product was harvested more than
//!   a grace period ago (7 days by default). Only the buyer is notified.
//!
//! Each row is cancelled in its own database transaction together with its
//! notifications. A failing row is logged and skipped and stays eligible for the next
//! run; only a failure to fetch the candidates aborts the job. The cancellation itself is
//! guarded by the expected prior status, so overlapping runs never cancel a row twice.

use crate::{
    config::settings::SweepSettings,
    core::{notification, order::cancel_guarded, profile},
    entities::{Order, OrderStatus, Product, order, product},
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{QueryOrder, TransactionTrait, prelude::*};
use tracing::{error, info, warn};

/// Time limits applied by the sweeps.
#[derive(Debug, Clone, Copy)]
pub struct SweepPolicy {
    /// Pending orders older than this are cancelled
    pub stale_pending_after: Duration,
    /// Orders are cancelled once their product's harvest is this far in the past
    pub harvest_grace: Duration,
}

impl Default for SweepPolicy {
    fn default() -> Self {
        Self {
            stale_pending_after: Duration::hours(48),
            harvest_grace: Duration::days(7),
        }
    }
}

impl TryFrom<SweepSettings> for SweepPolicy {
    type Error = Error;

    fn try_from(settings: SweepSettings) -> Result<Self> {
        settings.validate()?;
        let out_of_range = || Error::Config {
            message: "sweep threshold out of range".to_string(),
        };
        Ok(Self {
            stale_pending_after: Duration::try_hours(settings.stale_pending_hours)
                .ok_or_else(out_of_range)?,
            harvest_grace: Duration::try_days(settings.harvest_grace_days)
                .ok_or_else(out_of_range)?,
        })
    }
}

impl SweepPolicy {
    /// Reason recorded on orders cancelled by the stale-pending sweep.
    #[must_use]
    pub fn stale_pending_reason(&self) -> String {
        format!(
            "Automatically cancelled: the farm did not confirm within {} hours",
            self.stale_pending_after.num_hours()
        )
    }

    /// Reason recorded on orders cancelled by the post-harvest sweep.
    #[must_use]
    pub fn post_harvest_reason(&self) -> String {
        "Automatically cancelled: the harvest window for this product has passed".to_string()
    }
}

/// Which sweep produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepKind {
    /// Pending orders past the confirmation deadline
    StalePending,
    /// Orders whose harvest window has closed
    PostHarvest,
}

impl SweepKind {
    const fn label(self) -> &'static str {
        match self {
            Self::StalePending => "stale pending",
            Self::PostHarvest => "post-harvest",
        }
    }
}

/// Outcome of one sweep run.
#[derive(Debug, Clone)]
pub struct SweepReport {
    /// Which sweep ran
    pub kind: SweepKind,
    /// Instant the run used as "now"
    pub run_at: DateTime<Utc>,
    /// Orders matching the filter when the run started
    pub examined: usize,
    /// Orders this run cancelled
    pub cancelled: usize,
    /// Orders that changed state between the scan and the update
    pub skipped: usize,
    /// Ids of orders whose cancellation failed
    pub failed: Vec<i64>,
}

impl SweepReport {
    const fn new(kind: SweepKind, run_at: DateTime<Utc>, examined: usize) -> Self {
        Self {
            kind,
            run_at,
            examined,
            cancelled: 0,
            skipped: 0,
            failed: Vec::new(),
        }
    }

    fn record(&mut self, order_id: i64, outcome: Result<bool>) {
        match outcome {
            Ok(true) => self.cancelled += 1,
            Ok(false) => {
                warn!(order_id, "Order changed state before {} sweep could cancel it", self.kind.label());
                self.skipped += 1;
            }
            Err(e) => {
                error!(order_id, "Failed to cancel order in {} sweep: {e}", self.kind.label());
                self.failed.push(order_id);
            }
        }
    }
}

/// Cancels every pending order created before `now - policy.stale_pending_after`.
///
/// Each cancelled order produces two notifications, one for the buyer and one for the
/// farm owner.
///
/// # Errors
/// Only when the candidate orders cannot be fetched. Per-order failures are recorded
/// in [`SweepReport::failed`].
pub async fn cancel_stale_pending_orders(
    db: &DatabaseConnection,
    policy: &SweepPolicy,
    now: DateTime<Utc>,
) -> Result<SweepReport> {
    let cutoff = now - policy.stale_pending_after;
    let candidates = Order::find()
        .filter(order::Column::Status.eq(OrderStatus::Pending))
        .filter(order::Column::CreatedAt.lt(cutoff))
        .order_by_asc(order::Column::Id)
        .all(db)
        .await?;

    info!("Found {} pending orders created before {cutoff}", candidates.len());

    let reason = policy.stale_pending_reason();
    let mut report = SweepReport::new(SweepKind::StalePending, now, candidates.len());
    for stale in &candidates {
        let outcome = cancel_stale_order(db, stale, &reason, now).await;
        report.record(stale.id, outcome);
    }

    info!("{}", format_sweep_summary(&report));
    Ok(report)
}

async fn cancel_stale_order(
    db: &DatabaseConnection,
    stale: &order::Model,
    reason: &str,
    now: DateTime<Utc>,
) -> Result<bool> {
    let txn = db.begin().await?;

    if !cancel_guarded(&txn, stale, &[OrderStatus::Pending], reason, now).await? {
        return Ok(false);
    }

    let farm = profile::get_farm_profile(&txn, stale.farm_id)
        .await?
        .ok_or_else(|| Error::not_found("farm", stale.farm_id))?;

    notification::create_notification(
        &txn,
        &stale.buyer_id,
        Some(stale.id),
        "Order cancelled",
        &format!(
            "Order #{} was cancelled because the farm did not confirm it in time.",
            stale.id
        ),
    )
    .await?;
    notification::create_notification(
        &txn,
        &farm.owner_id,
        Some(stale.id),
        "Order cancelled",
        &format!(
            "Order #{} was cancelled because it was not confirmed in time.",
            stale.id
        ),
    )
    .await?;

    txn.commit().await?;
    Ok(true)
}

/// Cancels every pending or confirmed order whose product was harvested more than
/// `policy.harvest_grace` before `now`.
///
/// Each cancelled order produces one notification, for the buyer.
///
/// # Errors
/// Only when the candidate orders cannot be fetched.
pub async fn cancel_post_harvest_orders(
    db: &DatabaseConnection,
    policy: &SweepPolicy,
    now: DateTime<Utc>,
) -> Result<SweepReport> {
    let cutoff = (now - policy.harvest_grace).date_naive();
    let candidates = Order::find()
        .find_also_related(Product)
        .filter(order::Column::Status.is_in(OrderStatus::CANCELLABLE))
        .filter(product::Column::HarvestDate.lt(cutoff))
        .order_by_asc(order::Column::Id)
        .all(db)
        .await?;

    info!("Found {} open orders for products harvested before {cutoff}", candidates.len());

    let reason = policy.post_harvest_reason();
    let mut report = SweepReport::new(SweepKind::PostHarvest, now, candidates.len());
    for (expired, lot) in &candidates {
        let outcome = cancel_post_harvest_order(db, expired, lot.as_ref(), &reason, now).await;
        report.record(expired.id, outcome);
    }

    info!("{}", format_sweep_summary(&report));
    Ok(report)
}

async fn cancel_post_harvest_order(
    db: &DatabaseConnection,
    expired: &order::Model,
    lot: Option<&product::Model>,
    reason: &str,
    now: DateTime<Utc>,
) -> Result<bool> {
    let txn = db.begin().await?;

    if !cancel_guarded(&txn, expired, &OrderStatus::CANCELLABLE, reason, now).await? {
        return Ok(false);
    }

    let product_name = lot.map_or("your product", |p| p.name.as_str());
    notification::create_notification(
        &txn,
        &expired.buyer_id,
        Some(expired.id),
        "Order cancelled",
        &format!(
            "Order #{} was cancelled because the harvest window for {product_name} has passed.",
            expired.id
        ),
    )
    .await?;

    txn.commit().await?;
    Ok(true)
}

/// One-line summary of a sweep run, used in logs and handler responses.
#[must_use]
pub fn format_sweep_summary(report: &SweepReport) -> String {
    let mut summary = format!(
        "Cancelled {} {} order{}",
        report.cancelled,
        report.kind.label(),
        if report.cancelled == 1 { "" } else { "s" }
    );
    if report.skipped > 0 {
        summary.push_str(&format!(", {} skipped", report.skipped));
    }
    if !report.failed.is_empty() {
        summary.push_str(&format!(", {} failed", report.failed.len()));
    }
    summary
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{order::get_order, product::get_product_by_id, reservation::reserve_product};
    use crate::core::session::Session;
    use crate::entities::{
        Notification, ReservationStatus, notification as notification_entity, reservation,
    };
    use crate::test_utils::*;
    use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};

    async fn notifications_for(fx: &Marketplace, order_id: i64) -> Result<Vec<notification_entity::Model>> {
        notification::list_notifications_for_order(&fx.db, order_id).await
    }

    #[tokio::test]
    async fn test_stale_pending_cancelled_with_two_notifications() -> Result<()> {
        let fx = setup_marketplace().await?;
        let now = Utc::now();
        let stale = create_order_at(&fx, fx.product.id, OrderStatus::Pending, now - Duration::hours(49)).await?;

        let report = cancel_stale_pending_orders(&fx.db, &SweepPolicy::default(), now).await?;
        assert_eq!(report.examined, 1);
        assert_eq!(report.cancelled, 1);
        assert!(report.failed.is_empty());

        let cancelled = get_order(&fx.db, stale.id).await?.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert!(cancelled.cancelled_at.is_some());
        assert_eq!(
            cancelled.cancellation_reason.as_deref(),
            Some("Automatically cancelled: the farm did not confirm within 48 hours")
        );

        let notes = notifications_for(&fx, stale.id).await?;
        assert_eq!(notes.len(), 2);
        assert!(notes.iter().any(|n| n.user_id == BUYER));
        assert!(notes.iter().any(|n| n.user_id == FARMER));

        Ok(())
    }

    #[tokio::test]
    async fn test_stale_sweep_leaves_other_orders_alone() -> Result<()> {
        let fx = setup_marketplace().await?;
        let now = Utc::now();
        let young = create_order_at(&fx, fx.product.id, OrderStatus::Pending, now - Duration::hours(47)).await?;
        let old_confirmed =
            create_order_at(&fx, fx.product.id, OrderStatus::Confirmed, now - Duration::hours(100)).await?;

        let report = cancel_stale_pending_orders(&fx.db, &SweepPolicy::default(), now).await?;
        assert_eq!(report.cancelled, 0);

        assert_eq!(get_order(&fx.db, young.id).await?.unwrap(), young);
        assert_eq!(get_order(&fx.db, old_confirmed.id).await?.unwrap(), old_confirmed);
        assert_eq!(Notification::find().count(&fx.db).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_stale_sweep_rerun_changes_nothing() -> Result<()> {
        let fx = setup_marketplace().await?;
        let now = Utc::now();
        create_order_at(&fx, fx.product.id, OrderStatus::Pending, now - Duration::hours(72)).await?;
        create_order_at(&fx, fx.product.id, OrderStatus::Pending, now - Duration::hours(50)).await?;

        let first = cancel_stale_pending_orders(&fx.db, &SweepPolicy::default(), now).await?;
        assert_eq!(first.cancelled, 2);
        let notes_after_first = Notification::find().count(&fx.db).await?;
        assert_eq!(notes_after_first, 4);

        let second = cancel_stale_pending_orders(&fx.db, &SweepPolicy::default(), now).await?;
        assert_eq!(second.examined, 0);
        assert_eq!(second.cancelled, 0);
        assert_eq!(Notification::find().count(&fx.db).await?, notes_after_first);

        Ok(())
    }

    #[tokio::test]
    async fn test_stale_sweep_releases_reservation() -> Result<()> {
        let fx = setup_marketplace().await?;
        let (_, placed) = reserve_product(&fx.db, &Session::new(BUYER), fx.product.id, 60.0).await?;

        let mut backdated: order::ActiveModel = placed.clone().into();
        backdated.created_at = Set(Utc::now() - Duration::hours(49));
        backdated.update(&fx.db).await?;

        let report = cancel_stale_pending_orders(&fx.db, &SweepPolicy::default(), Utc::now()).await?;
        assert_eq!(report.cancelled, 1);

        let product = get_product_by_id(&fx.db, fx.product.id).await?.unwrap();
        assert_eq!(product.quantity_available_kg, fx.product.quantity_available_kg);

        Ok(())
    }

    #[tokio::test]
    async fn test_stale_sweep_isolates_row_failures() -> Result<()> {
        let fx = setup_marketplace().await?;
        let now = Utc::now();

        // An order pointing at a farm that does not exist fails at the notification step.
        fx.db.execute_unprepared("PRAGMA foreign_keys = OFF").await?;
        let mut orphan = create_order_at(&fx, fx.product.id, OrderStatus::Pending, now - Duration::hours(60)).await?;
        let mut active: order::ActiveModel = orphan.clone().into();
        active.farm_id = Set(9_999);
        orphan = active.update(&fx.db).await?;

        let healthy = create_order_at(&fx, fx.product.id, OrderStatus::Pending, now - Duration::hours(60)).await?;

        let report = cancel_stale_pending_orders(&fx.db, &SweepPolicy::default(), now).await?;
        assert_eq!(report.examined, 2);
        assert_eq!(report.cancelled, 1);
        assert_eq!(report.failed, vec![orphan.id]);

        // The failed row rolled back and stays eligible for the next run.
        assert_eq!(get_order(&fx.db, orphan.id).await?.unwrap().status, OrderStatus::Pending);
        assert_eq!(get_order(&fx.db, healthy.id).await?.unwrap().status, OrderStatus::Cancelled);

        Ok(())
    }

    #[tokio::test]
    async fn test_post_harvest_cancels_open_orders_with_one_notification() -> Result<()> {
        let fx = setup_marketplace().await?;
        let now = Utc::now();
        let old_lot = create_product_harvested(&fx, now.date_naive() - Duration::days(8)).await?;

        let pending = create_order_at(&fx, old_lot.id, OrderStatus::Pending, now).await?;
        let confirmed = create_order_at(&fx, old_lot.id, OrderStatus::Confirmed, now).await?;

        let report = cancel_post_harvest_orders(&fx.db, &SweepPolicy::default(), now).await?;
        assert_eq!(report.cancelled, 2);

        for id in [pending.id, confirmed.id] {
            let cancelled = get_order(&fx.db, id).await?.unwrap();
            assert_eq!(cancelled.status, OrderStatus::Cancelled);
            assert_eq!(
                cancelled.cancellation_reason.as_deref(),
                Some("Automatically cancelled: the harvest window for this product has passed")
            );

            let notes = notifications_for(&fx, id).await?;
            assert_eq!(notes.len(), 1);
            assert_eq!(notes[0].user_id, BUYER);
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_post_harvest_leaves_other_orders_alone() -> Result<()> {
        let fx = setup_marketplace().await?;
        let now = Utc::now();
        let old_lot = create_product_harvested(&fx, now.date_naive() - Duration::days(30)).await?;
        let recent_lot = create_product_harvested(&fx, now.date_naive() - Duration::days(6)).await?;

        let shipped = create_order_at(&fx, old_lot.id, OrderStatus::Shipped, now).await?;
        let delivered = create_order_at(&fx, old_lot.id, OrderStatus::Delivered, now).await?;
        let recent = create_order_at(&fx, recent_lot.id, OrderStatus::Pending, now).await?;

        let report = cancel_post_harvest_orders(&fx.db, &SweepPolicy::default(), now).await?;
        assert_eq!(report.examined, 0);

        for untouched in [shipped, delivered, recent] {
            assert_eq!(get_order(&fx.db, untouched.id).await?.unwrap(), untouched);
        }
        assert_eq!(Notification::find().count(&fx.db).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_post_harvest_rerun_changes_nothing() -> Result<()> {
        let fx = setup_marketplace().await?;
        let now = Utc::now();
        let old_lot = create_product_harvested(&fx, now.date_naive() - Duration::days(12)).await?;
        create_order_at(&fx, old_lot.id, OrderStatus::Pending, now - Duration::hours(1)).await?;
        create_order_at(&fx, old_lot.id, OrderStatus::Confirmed, now - Duration::hours(1)).await?;

        let first = cancel_post_harvest_orders(&fx.db, &SweepPolicy::default(), now).await?;
        assert_eq!(first.cancelled, 2);
        let notes_after_first = Notification::find().count(&fx.db).await?;
        assert_eq!(notes_after_first, 2);

        let second = cancel_post_harvest_orders(&fx.db, &SweepPolicy::default(), now).await?;
        assert_eq!(second.examined, 0);
        assert_eq!(second.cancelled, 0);
        assert_eq!(Notification::find().count(&fx.db).await?, notes_after_first);

        Ok(())
    }

    #[tokio::test]
    async fn test_post_harvest_sweep_isolates_row_failures() -> Result<()> {
        let fx = setup_marketplace().await?;
        let now = Utc::now();
        let old_lot = create_product_harvested(&fx, now.date_naive() - Duration::days(12)).await?;

        // A hold on a product that does not exist fails when the stock is returned.
        fx.db.execute_unprepared("PRAGMA foreign_keys = OFF").await?;
        let dangling = reservation::ActiveModel {
            product_id: Set(9_999),
            buyer_id: Set(BUYER.to_string()),
            quantity_kg: Set(10.0),
            status: Set(ReservationStatus::Confirmed),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&fx.db)
        .await?;
        let broken = create_order_at(&fx, old_lot.id, OrderStatus::Confirmed, now - Duration::days(20)).await?;
        let mut active: order::ActiveModel = broken.clone().into();
        active.reservation_id = Set(Some(dangling.id));
        let broken = active.update(&fx.db).await?;

        let healthy = create_order_at(&fx, old_lot.id, OrderStatus::Confirmed, now - Duration::days(20)).await?;

        let report = cancel_post_harvest_orders(&fx.db, &SweepPolicy::default(), now).await?;
        assert_eq!(report.examined, 2);
        assert_eq!(report.cancelled, 1);
        assert_eq!(report.failed, vec![broken.id]);

        // The failed row rolled back, including its buyer notification.
        assert_eq!(get_order(&fx.db, broken.id).await?.unwrap().status, OrderStatus::Confirmed);
        assert!(notifications_for(&fx, broken.id).await?.is_empty());
        assert_eq!(get_order(&fx.db, healthy.id).await?.unwrap().status, OrderStatus::Cancelled);

        Ok(())
    }

    #[test]
    fn test_policy_rejects_bad_thresholds() {
        for (hours, days) in [(-1, 7), (0, 7), (48, -2), (i64::MAX, 7), (48, i64::MAX)] {
            let result = SweepPolicy::try_from(SweepSettings {
                stale_pending_hours: hours,
                harvest_grace_days: days,
            });
            assert!(
                matches!(result, Err(Error::Config { .. })),
                "accepted {hours} hours / {days} days"
            );
        }
    }

    #[tokio::test]
    async fn test_custom_policy_thresholds() -> Result<()> {
        let fx = setup_marketplace().await?;
        let now = Utc::now();
        let policy = SweepPolicy::try_from(SweepSettings {
            stale_pending_hours: 2,
            harvest_grace_days: 1,
        })?;
        let order = create_order_at(&fx, fx.product.id, OrderStatus::Pending, now - Duration::hours(3)).await?;

        let report = cancel_stale_pending_orders(&fx.db, &policy, now).await?;
        assert_eq!(report.cancelled, 1);
        assert_eq!(
            get_order(&fx.db, order.id).await?.unwrap().cancellation_reason.as_deref(),
            Some("Automatically cancelled: the farm did not confirm within 2 hours")
        );

        Ok(())
    }

    #[test]
    fn test_format_sweep_summary() {
        let mut report = SweepReport::new(SweepKind::StalePending, Utc::now(), 4);
        report.cancelled = 1;
        assert_eq!(format_sweep_summary(&report), "Cancelled 1 stale pending order");

        report.cancelled = 2;
        report.skipped = 1;
        report.failed = vec![7];
        report.kind = SweepKind::PostHarvest;
        assert_eq!(
            format_sweep_summary(&report),
            "Cancelled 2 post-harvest orders, 1 skipped, 1 failed"
        );
    }
}
