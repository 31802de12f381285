use crate::{
  entity::{TransactionType, profile, referral},
  prelude::*,
  sv::wallet::{TxMeta, Wallet},
};

pub struct Referrals<'a> {
  db: &'a DatabaseConnection,
}

#[derive(Debug, serde::Serialize)]
pub struct ReferralStats {
  pub code: String,
  pub total_referrals: u64,
  pub total_earned: i64,
}

impl<'a> Referrals<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Deterministic signup code: `REF` + last 8 hex chars of the user id.
  /// Stable per profile and collision-free because the id is unique.
  pub fn code_for(user_id: Uuid) -> String {
    let hex = user_id.simple().to_string();
    format!("REF{}", hex[hex.len() - 8..].to_uppercase())
  }

  pub async fn by_code(&self, code: &str) -> Result<profile::Model> {
    profile::Entity::find()
      .filter(profile::Column::ReferralCode.eq(code))
      .one(self.db)
      .await?
      .ok_or(Error::ReferralCodeNotFound)
  }

  /// Credits `percent`% of `investment_amount` to the referrer and writes
  /// the referral row. Fails with `AlreadyProcessed` if the (referrer,
  /// referred) pair was already credited; the unique index on that pair
  /// backs this check at the database level.
  pub async fn record_bonus<C: ConnectionTrait>(
    conn: &C,
    referrer_id: Uuid,
    referred_id: Uuid,
    investment_amount: i64,
    percent: i64,
  ) -> Result<referral::Model> {
    let existing = referral::Entity::find()
      .filter(referral::Column::ReferrerId.eq(referrer_id))
      .filter(referral::Column::ReferredId.eq(referred_id))
      .one(conn)
      .await?;

    if existing.is_some() {
      return Err(Error::AlreadyProcessed);
    }

    let bonus = investment_amount * percent / 100;
    let code = Self::code_for(referrer_id);

    Wallet::apply(
      conn,
      referrer_id,
      bonus,
      TxMeta::of(TransactionType::ReferralBonus)
        .describe(format!("Referral bonus ({percent}% of first investment)"))
        .reference(referred_id.to_string()),
    )
    .await?;

    let now = Utc::now().naive_utc();
    Ok(
      referral::ActiveModel {
        id: NotSet,
        referrer_id: Set(referrer_id),
        referred_id: Set(referred_id),
        bonus_amount: Set(bonus),
        referral_code: Set(code),
        created_at: Set(now),
      }
      .insert(conn)
      .await?,
    )
  }

  pub async fn by_referrer(
    &self,
    referrer_id: Uuid,
  ) -> Result<Vec<referral::Model>> {
    Ok(
      referral::Entity::find()
        .filter(referral::Column::ReferrerId.eq(referrer_id))
        .order_by_desc(referral::Column::CreatedAt)
        .all(self.db)
        .await?,
    )
  }

  pub async fn stats(&self, user_id: Uuid) -> Result<ReferralStats> {
    let referrals = self.by_referrer(user_id).await?;

    Ok(ReferralStats {
      code: Self::code_for(user_id),
      total_referrals: referrals.len() as u64,
      total_earned: referrals.iter().map(|r| r.bonus_amount).sum(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::{test_utils::test_db, wallet::KES};

  #[test]
  fn test_code_is_deterministic() {
    let id = Uuid::new_v4();
    let code = Referrals::code_for(id);

    assert_eq!(code, Referrals::code_for(id));
    assert_eq!(code.len(), 11);
    assert!(code.starts_with("REF"));
  }

  #[tokio::test]
  async fn test_by_code_resolves_referrer() {
    let db = test_db::setup().await;
    let referrer = test_db::client(&db, 0).await;

    let found = Referrals::new(&db)
      .by_code(&Referrals::code_for(referrer))
      .await
      .unwrap();
    assert_eq!(found.id, referrer);

    let missing = Referrals::new(&db).by_code("REFDEADBEEF").await;
    assert!(matches!(missing, Err(Error::ReferralCodeNotFound)));
  }

  #[tokio::test]
  async fn test_bonus_credits_ten_percent() {
    let db = test_db::setup().await;
    let referrer = test_db::client(&db, 0).await;
    let referred = test_db::referred_client(&db, 0, referrer).await;

    let row =
      Referrals::record_bonus(&db, referrer, referred, 5000 * KES, 10)
        .await
        .unwrap();

    assert_eq!(row.bonus_amount, 500 * KES);
    assert_eq!(Wallet::new(&db).balance(referrer).await.unwrap(), 500 * KES);
  }

  #[tokio::test]
  async fn test_bonus_fires_at_most_once_per_pair() {
    let db = test_db::setup().await;
    let referrer = test_db::client(&db, 0).await;
    let referred = test_db::referred_client(&db, 0, referrer).await;

    Referrals::record_bonus(&db, referrer, referred, 5000 * KES, 10)
      .await
      .unwrap();
    let again =
      Referrals::record_bonus(&db, referrer, referred, 5000 * KES, 10).await;

    assert!(matches!(again, Err(Error::AlreadyProcessed)));
    assert_eq!(Wallet::new(&db).balance(referrer).await.unwrap(), 500 * KES);
  }

  #[tokio::test]
  async fn test_stats() {
    let db = test_db::setup().await;
    let referrer = test_db::client(&db, 0).await;
    let a = test_db::referred_client(&db, 0, referrer).await;
    let b = test_db::referred_client(&db, 0, referrer).await;

    Referrals::record_bonus(&db, referrer, a, 1000 * KES, 10).await.unwrap();
    Referrals::record_bonus(&db, referrer, b, 2000 * KES, 10).await.unwrap();

    let stats = Referrals::new(&db).stats(referrer).await.unwrap();
    assert_eq!(stats.total_referrals, 2);
    assert_eq!(stats.total_earned, 300 * KES);
  }
}
