use crate::{
  entity::{PackageType, package},
  prelude::*,
};

pub struct Catalog<'a> {
  db: &'a DatabaseConnection,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct NewPackage {
  pub name: String,
  pub package_type: PackageType,
  pub price: i64,
  pub daily_earning: i64,
  pub duration_days: i32,
  pub features: Option<String>,
}

/// Admin edits. Existing investments are untouched by any of these fields;
/// they copied price/daily earning at purchase time.
#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct PackageUpdate {
  pub name: Option<String>,
  pub price: Option<i64>,
  pub daily_earning: Option<i64>,
  pub duration_days: Option<i32>,
  pub features: Option<String>,
  pub is_active: Option<bool>,
}

impl<'a> Catalog<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Purchase listing: active packages, cheapest first.
  pub async fn list_active(&self) -> Result<Vec<package::Model>> {
    Ok(
      package::Entity::find()
        .filter(package::Column::IsActive.eq(true))
        .order_by_asc(package::Column::Price)
        .all(self.db)
        .await?,
    )
  }

  pub async fn all(&self) -> Result<Vec<package::Model>> {
    Ok(
      package::Entity::find()
        .order_by_asc(package::Column::Price)
        .all(self.db)
        .await?,
    )
  }

  pub async fn get(&self, id: i32) -> Result<package::Model> {
    package::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::PackageNotFound)
  }

  pub async fn create(&self, new: NewPackage) -> Result<package::Model> {
    if new.price <= 0 || new.daily_earning <= 0 {
      return Err(Error::InvalidAmount(
        "price and daily earning must be positive".into(),
      ));
    }
    if new.duration_days <= 0 {
      return Err(Error::InvalidArgs("duration must be positive".into()));
    }

    let now = Utc::now().naive_utc();

    Ok(
      package::ActiveModel {
        id: NotSet,
        name: Set(new.name),
        package_type: Set(new.package_type),
        price: Set(new.price),
        daily_earning: Set(new.daily_earning),
        duration_days: Set(new.duration_days),
        features: Set(new.features),
        is_active: Set(true),
        created_at: Set(now),
      }
      .insert(self.db)
      .await?,
    )
  }

  pub async fn update(
    &self,
    id: i32,
    update: PackageUpdate,
  ) -> Result<package::Model> {
    let package = self.get(id).await?;

    if update.price.is_some_and(|p| p <= 0)
      || update.daily_earning.is_some_and(|e| e <= 0)
    {
      return Err(Error::InvalidAmount(
        "price and daily earning must be positive".into(),
      ));
    }
    if update.duration_days.is_some_and(|d| d <= 0) {
      return Err(Error::InvalidArgs("duration must be positive".into()));
    }

    let mut model = package::ActiveModel::from(package);
    if let Some(name) = update.name {
      model.name = Set(name);
    }
    if let Some(price) = update.price {
      model.price = Set(price);
    }
    if let Some(daily_earning) = update.daily_earning {
      model.daily_earning = Set(daily_earning);
    }
    if let Some(duration_days) = update.duration_days {
      model.duration_days = Set(duration_days);
    }
    if let Some(features) = update.features {
      model.features = Set(Some(features));
    }
    if let Some(is_active) = update.is_active {
      model.is_active = Set(is_active);
    }

    Ok(model.update(self.db).await?)
  }

  /// Packages are never deleted: investments reference them by id.
  /// Deactivation only removes them from future purchase listings.
  pub async fn deactivate(&self, id: i32) -> Result<()> {
    let package = self.get(id).await?;

    package::ActiveModel { is_active: Set(false), ..package.into() }
      .update(self.db)
      .await?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::{test_utils::test_db, wallet::KES};

  #[tokio::test]
  async fn test_list_active_is_price_ordered() {
    let db = test_db::setup().await;
    let catalog = Catalog::new(&db);

    catalog.create(test_db::new_package(9000 * KES, 900 * KES, 30)).await.unwrap();
    catalog.create(test_db::new_package(1000 * KES, 100 * KES, 10)).await.unwrap();
    let retired = catalog
      .create(test_db::new_package(5000 * KES, 500 * KES, 20))
      .await
      .unwrap();
    catalog.deactivate(retired.id).await.unwrap();

    let listed = catalog.list_active().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].price, 1000 * KES);
    assert_eq!(listed[1].price, 9000 * KES);
  }

  #[tokio::test]
  async fn test_deactivated_package_still_readable() {
    let db = test_db::setup().await;
    let catalog = Catalog::new(&db);

    let pkg =
      catalog.create(test_db::new_package(1000 * KES, 100 * KES, 10)).await.unwrap();
    catalog.deactivate(pkg.id).await.unwrap();

    let loaded = catalog.get(pkg.id).await.unwrap();
    assert!(!loaded.is_active);
  }

  #[tokio::test]
  async fn test_create_rejects_nonpositive_terms() {
    let db = test_db::setup().await;
    let catalog = Catalog::new(&db);

    let bad_price = catalog.create(test_db::new_package(0, 100, 10)).await;
    assert!(matches!(bad_price, Err(Error::InvalidAmount(_))));

    let bad_days = catalog.create(test_db::new_package(1000, 100, 0)).await;
    assert!(matches!(bad_days, Err(Error::InvalidArgs(_))));
  }

  #[tokio::test]
  async fn test_update_price() {
    let db = test_db::setup().await;
    let catalog = Catalog::new(&db);

    let pkg =
      catalog.create(test_db::new_package(1000 * KES, 100 * KES, 10)).await.unwrap();
    let updated = catalog
      .update(
        pkg.id,
        PackageUpdate { price: Some(1500 * KES), ..Default::default() },
      )
      .await
      .unwrap();

    assert_eq!(updated.price, 1500 * KES);
    assert_eq!(updated.daily_earning, 100 * KES);
  }
}
