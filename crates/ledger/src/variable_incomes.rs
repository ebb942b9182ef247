//! Variable income lines under an income configuration.

use sea_orm::entity::prelude::*;

use crate::MoneyCents;

/// An income line that can be toggled off. `valid_until` is informative
/// only and never filters anything.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableIncome {
    pub id: i32,
    pub income_id: i32,
    pub description: String,
    pub amount: MoneyCents,
    pub valid_until: Option<DateTimeUtc>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "variable_incomes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub income_id: i32,
    pub description: String,
    pub amount_cents: i64,
    pub valid_until: Option<DateTimeUtc>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::incomes::Entity",
        from = "Column::IncomeId",
        to = "super::incomes::Column::Id"
    )]
    Incomes,
}

impl Related<super::incomes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Incomes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for VariableIncome {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            income_id: model.income_id,
            description: model.description,
            amount: MoneyCents::new(model.amount_cents),
            valid_until: model.valid_until,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
