pub use std::{sync::Arc, time::Duration};

pub use chrono::{
  NaiveDate as Date, NaiveDateTime as DateTime, TimeDelta, Utc,
};
pub use migration::MigratorTrait;
pub use sea_orm::{
  ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection,
  EntityTrait, NotSet, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
  Set, TransactionTrait,
};
pub use tracing::{debug, error, info, trace, warn};
pub use uuid::Uuid;

pub use crate::error::{Error, Result};
