//! Recurring income lines owned directly by a user.

use sea_orm::entity::prelude::*;

use crate::MoneyCents;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedIncome {
    pub id: i32,
    pub user_id: i32,
    pub description: String,
    pub amount: MoneyCents,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "fixed_incomes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub description: String,
    pub amount_cents: i64,
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
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for FixedIncome {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            description: model.description,
            amount: MoneyCents::new(model.amount_cents),
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
