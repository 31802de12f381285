use crate::{
  entity::{
    InvestmentStatus, TransactionType, daily_commission, investment,
  },
  prelude::*,
  sv::wallet::{TxMeta, Wallet},
};

/// The `process_daily_commissions` batch. Runs once per calendar day,
/// driven by the scheduler plugin (or manually by an operator).
pub struct Accrual;

#[derive(Debug, Default, serde::Serialize)]
pub struct AccrualSummary {
  pub credited: u64,
  pub completed: u64,
  pub skipped: u64,
  pub failed: u64,
}

enum Outcome {
  Credited { term_ended: bool },
  Skipped,
}

impl Accrual {
  /// Credits one day of earnings to every active investment that has not
  /// yet been processed for `today`. Each investment is its own unit of
  /// work: one failure is logged and skipped, never aborting the batch.
  pub async fn run(
    db: &DatabaseConnection,
    today: Date,
  ) -> Result<AccrualSummary> {
    let eligible = investment::Entity::find()
      .filter(investment::Column::Status.eq(InvestmentStatus::Active))
      .all(db)
      .await?;

    let mut summary = AccrualSummary::default();

    for inv in eligible {
      match Self::accrue_one(db, &inv, today).await {
        Ok(Outcome::Credited { term_ended }) => {
          summary.credited += 1;
          if term_ended {
            summary.completed += 1;
          }
        }
        Ok(Outcome::Skipped) => summary.skipped += 1,
        Err(err) => {
          error!("accrual failed for investment {}: {err}", inv.id);
          summary.failed += 1;
        }
      }
    }

    info!(
      "daily accrual for {today}: {} credited, {} completed, {} skipped, {} failed",
      summary.credited, summary.completed, summary.skipped, summary.failed
    );

    Ok(summary)
  }

  async fn accrue_one(
    db: &DatabaseConnection,
    inv: &investment::Model,
    today: Date,
  ) -> Result<Outcome> {
    let duration = inv.duration_days();
    if inv.days_completed >= duration {
      return Ok(Outcome::Skipped);
    }

    // Idempotency: at most one credit per investment per calendar day
    let already = daily_commission::Entity::find()
      .filter(daily_commission::Column::InvestmentId.eq(inv.id))
      .filter(daily_commission::Column::CommissionDate.eq(today))
      .one(db)
      .await?;

    if already.is_some() {
      return Ok(Outcome::Skipped);
    }

    let txn = db.begin().await?;

    let day_number = inv.days_completed + 1;

    Wallet::apply(
      &txn,
      inv.user_id,
      inv.daily_earning,
      TxMeta::of(TransactionType::Commission)
        .describe(format!("Daily earning, day {day_number}"))
        .reference(format!("investment:{}", inv.id)),
    )
    .await?;

    daily_commission::ActiveModel {
      id: NotSet,
      investment_id: Set(inv.id),
      user_id: Set(inv.user_id),
      day_number: Set(day_number),
      amount: Set(inv.daily_earning),
      commission_date: Set(today),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(&txn)
    .await?;

    let term_ended = day_number >= duration;

    investment::ActiveModel {
      days_completed: Set(day_number),
      total_earned: Set(inv.total_earned + inv.daily_earning),
      status: Set(if term_ended {
        InvestmentStatus::Completed
      } else {
        InvestmentStatus::Active
      }),
      ..inv.clone().into()
    }
    .update(&txn)
    .await?;

    txn.commit().await?;
    Ok(Outcome::Credited { term_ended })
  }
}
