use crate::{
  entity::{UserRole, profile},
  prelude::*,
  sv::Referrals,
};

pub struct Profiles<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Profiles<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Creates a client profile. A presented referral code must resolve to an
  /// existing profile; the new user is then attributed to that referrer.
  /// Self-referral cannot happen because the code is derived from an id
  /// that does not exist yet.
  pub async fn signup(
    &self,
    full_name: Option<String>,
    phone: Option<String>,
    referral_code: Option<&str>,
  ) -> Result<profile::Model> {
    let referred_by = match referral_code {
      Some(code) => Some(Referrals::new(self.db).by_code(code).await?.id),
      None => None,
    };

    let id = Uuid::new_v4();
    let now = Utc::now().naive_utc();

    Ok(
      profile::ActiveModel {
        id: Set(id),
        full_name: Set(full_name),
        phone: Set(phone),
        role: Set(UserRole::Client),
        wallet_balance: Set(0),
        referral_code: Set(Referrals::code_for(id)),
        referred_by: Set(referred_by),
        created_at: Set(now),
      }
      .insert(self.db)
      .await?,
    )
  }

  pub async fn get(&self, user_id: Uuid) -> Result<profile::Model> {
    profile::Entity::find_by_id(user_id)
      .one(self.db)
      .await?
      .ok_or(Error::ProfileNotFound)
  }

  /// Server-side role gate for every admin operation.
  pub async fn require_admin(&self, user_id: Uuid) -> Result<profile::Model> {
    let profile = self.get(user_id).await?;

    if profile.role != UserRole::Admin {
      return Err(Error::Forbidden);
    }

    Ok(profile)
  }

  pub async fn set_role(&self, user_id: Uuid, role: UserRole) -> Result<()> {
    let profile = self.get(user_id).await?;

    profile::ActiveModel { role: Set(role), ..profile.into() }
      .update(self.db)
      .await?;

    Ok(())
  }

  /// Admin roster, oldest accounts first.
  pub async fn all(&self) -> Result<Vec<profile::Model>> {
    Ok(
      profile::Entity::find()
        .order_by_asc(profile::Column::CreatedAt)
        .all(self.db)
        .await?,
    )
  }
}
