//! Shared test utilities for database setup

#[cfg(test)]
pub mod test_db {
  use sea_orm::{
    ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, DbBackend,
    NotSet, Schema, Set,
  };
  use uuid::Uuid;

  use crate::{
    entity::*,
    sv::{catalog::NewPackage, referrals::Referrals},
  };

  /// Creates an in-memory SQLite database with all required tables
  pub async fn setup() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let schema = Schema::new(DbBackend::Sqlite);

    let stmt = schema.create_table_from_entity(profile::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(package::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(investment::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(transaction::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(withdrawal::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(referral::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(daily_commission::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(pending_payment::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    db
  }

  async fn profile(
    db: &DatabaseConnection,
    role: UserRole,
    balance: i64,
    referred_by: Option<Uuid>,
  ) -> Uuid {
    let id = Uuid::new_v4();
    let now = chrono::Utc::now().naive_utc();

    profile::ActiveModel {
      id: Set(id),
      full_name: Set(Some("Test User".into())),
      phone: Set(Some("254712345678".into())),
      role: Set(role),
      wallet_balance: Set(balance),
      referral_code: Set(Referrals::code_for(id)),
      referred_by: Set(referred_by),
      created_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap();

    id
  }

  pub async fn client(db: &DatabaseConnection, balance: i64) -> Uuid {
    profile(db, UserRole::Client, balance, None).await
  }

  pub async fn referred_client(
    db: &DatabaseConnection,
    balance: i64,
    referrer: Uuid,
  ) -> Uuid {
    profile(db, UserRole::Client, balance, Some(referrer)).await
  }

  pub async fn admin(db: &DatabaseConnection) -> Uuid {
    profile(db, UserRole::Admin, 0, None).await
  }

  pub async fn package(
    db: &DatabaseConnection,
    price: i64,
    daily_earning: i64,
    duration_days: i32,
  ) -> i32 {
    let now = chrono::Utc::now().naive_utc();

    let pkg = package::ActiveModel {
      id: NotSet,
      name: Set("Test Package".into()),
      package_type: Set(PackageType::Starter),
      price: Set(price),
      daily_earning: Set(daily_earning),
      duration_days: Set(duration_days),
      features: Set(None),
      is_active: Set(true),
      created_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap();

    pkg.id
  }

  pub fn new_package(price: i64, daily_earning: i64, days: i32) -> NewPackage {
    NewPackage {
      name: "Test Package".into(),
      package_type: PackageType::Starter,
      price,
      daily_earning,
      duration_days: days,
      features: None,
    }
  }
}
