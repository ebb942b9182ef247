//! Per-user income configuration (one row per user).
//!
//! `fixed_amount` is the flat monthly salary; `bonus_amount` is informative
//! only and never enters report totals.

use sea_orm::entity::prelude::*;

use crate::MoneyCents;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomeConfig {
    pub id: i32,
    pub user_id: i32,
    pub fixed_amount: MoneyCents,
    pub bonus_amount: MoneyCents,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "incomes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub fixed_amount_cents: i64,
    pub bonus_amount_cents: i64,
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
    #[sea_orm(has_many = "super::variable_incomes::Entity")]
    VariableIncomes,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for IncomeConfig {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            fixed_amount: MoneyCents::new(model.fixed_amount_cents),
            bonus_amount: MoneyCents::new(model.bonus_amount_cents),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
