//! Recurring monthly expense templates.

use sea_orm::entity::prelude::*;

use crate::{LedgerError, MoneyCents};

/// A monthly expense template, posted into `expenses` by the materializer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedExpense {
    pub id: i32,
    pub user_id: i32,
    pub category_id: Option<i32>,
    pub description: String,
    pub amount: MoneyCents,
    /// Scheduled day within the month, clamped to 28 at posting time.
    pub day_of_month: u8,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "fixed_expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub category_id: Option<i32>,
    pub description: String,
    pub amount_cents: i64,
    pub day_of_month: i32,
    pub is_active: bool,
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

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for FixedExpense {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let day_of_month = u8::try_from(model.day_of_month)
            .map_err(|_| LedgerError::Validation("invalid day of month".to_string()))?;
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            category_id: model.category_id,
            description: model.description,
            amount: MoneyCents::new(model.amount_cents),
            day_of_month,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
