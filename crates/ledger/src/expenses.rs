//! One-off ledger entries.
//!
//! Rows in this table carry both directions: `kind` distinguishes an
//! expense from a punctual income. Materialized recurring expenses also
//! land here, dated to the posting month.

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;

use crate::{EntryKind, LedgerError, MoneyCents};

/// A dated entry owned by one user.
///
/// `category_id` goes `None` when its category is deleted afterwards;
/// creation always requires one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expense {
    pub id: i32,
    pub user_id: i32,
    pub category_id: Option<i32>,
    pub description: String,
    pub amount: MoneyCents,
    pub date: NaiveDate,
    pub kind: EntryKind,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub category_id: Option<i32>,
    pub description: String,
    pub amount_cents: i64,
    pub date: Date,
    pub kind: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id"
    )]
    Categories,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Expense {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            category_id: model.category_id,
            description: model.description,
            amount: MoneyCents::new(model.amount_cents),
            date: model.date,
            kind: EntryKind::try_from(model.kind.as_str())?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
