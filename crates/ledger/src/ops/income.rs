//! Income configuration and the two income line tables.

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    LedgerError, MoneyCents, ResultLedger, fixed_incomes, fixed_incomes::FixedIncome, incomes,
    incomes::IncomeConfig, variable_incomes, variable_incomes::VariableIncome,
};

use super::{Ledger, normalize_required_text, retry_read, validate_positive_amount, with_tx};

/// New variable income line. Lines start active; `valid_until` is stored
/// and returned but only `is_active` gates the aggregations.
#[derive(Clone, Debug)]
pub struct NewVariableIncome {
    pub description: String,
    pub amount: MoneyCents,
    pub valid_until: Option<DateTimeUtc>,
}

#[derive(Clone, Debug, Default)]
pub struct UpdateVariableIncome {
    pub description: Option<String>,
    pub amount: Option<MoneyCents>,
    pub valid_until: Option<DateTimeUtc>,
    pub is_active: Option<bool>,
}

#[derive(Clone, Debug)]
pub struct NewFixedIncome {
    pub description: String,
    pub amount: MoneyCents,
}

#[derive(Clone, Debug, Default)]
pub struct UpdateFixedIncome {
    pub description: Option<String>,
    pub amount: Option<MoneyCents>,
    pub is_active: Option<bool>,
}

fn validate_config_amount(amount: MoneyCents) -> ResultLedger<()> {
    if amount.is_negative() {
        return Err(LedgerError::Validation(
            "amount must not be negative".to_string(),
        ));
    }
    Ok(())
}

impl Ledger {
    /// The user's income configuration, created with zeroed amounts on
    /// first access.
    pub async fn income_config(&self, user_id: i32) -> ResultLedger<IncomeConfig> {
        if let Some(model) = retry_read!(self.find_income_config(user_id).await)? {
            return Ok(IncomeConfig::from(model));
        }
        with_tx!(self, |db_tx| {
            let model = ensure_income_config(&db_tx, user_id).await?;
            Ok(IncomeConfig::from(model))
        })
    }

    async fn find_income_config(&self, user_id: i32) -> ResultLedger<Option<incomes::Model>> {
        let model = incomes::Entity::find()
            .filter(incomes::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?;
        Ok(model)
    }

    /// Set the flat and/or bonus amount. Zero is a valid value for both.
    pub async fn update_income_config(
        &self,
        user_id: i32,
        fixed_amount: Option<MoneyCents>,
        bonus_amount: Option<MoneyCents>,
    ) -> ResultLedger<IncomeConfig> {
        if let Some(amount) = fixed_amount {
            validate_config_amount(amount)?;
        }
        if let Some(amount) = bonus_amount {
            validate_config_amount(amount)?;
        }

        with_tx!(self, |db_tx| {
            let model = ensure_income_config(&db_tx, user_id).await?;

            let mut active: incomes::ActiveModel = model.into();
            if let Some(amount) = fixed_amount {
                active.fixed_amount_cents = ActiveValue::Set(amount.cents());
            }
            if let Some(amount) = bonus_amount {
                active.bonus_amount_cents = ActiveValue::Set(amount.cents());
            }
            active.updated_at = ActiveValue::Set(Utc::now());

            let model = active.update(&db_tx).await?;
            Ok(IncomeConfig::from(model))
        })
    }

    /// List the user's variable income lines. Empty when the configuration
    /// was never created.
    pub async fn list_variable_incomes(&self, user_id: i32) -> ResultLedger<Vec<VariableIncome>> {
        retry_read!(self.find_variable_incomes(user_id).await)
    }

    async fn find_variable_incomes(&self, user_id: i32) -> ResultLedger<Vec<VariableIncome>> {
        let Some(config) = self.find_income_config(user_id).await? else {
            return Ok(Vec::new());
        };
        let models = variable_incomes::Entity::find()
            .filter(variable_incomes::Column::IncomeId.eq(config.id))
            .order_by_asc(variable_incomes::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(VariableIncome::from).collect())
    }

    pub async fn create_variable_income(
        &self,
        user_id: i32,
        cmd: NewVariableIncome,
    ) -> ResultLedger<VariableIncome> {
        let description = normalize_required_text(&cmd.description, "description")?;
        validate_positive_amount(cmd.amount)?;

        with_tx!(self, |db_tx| {
            let config = ensure_income_config(&db_tx, user_id).await?;

            let now = Utc::now();
            let model = variable_incomes::ActiveModel {
                income_id: ActiveValue::Set(config.id),
                description: ActiveValue::Set(description),
                amount_cents: ActiveValue::Set(cmd.amount.cents()),
                valid_until: ActiveValue::Set(cmd.valid_until),
                is_active: ActiveValue::Set(true),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;

            Ok(VariableIncome::from(model))
        })
    }

    pub async fn update_variable_income(
        &self,
        user_id: i32,
        variable_income_id: i32,
        cmd: UpdateVariableIncome,
    ) -> ResultLedger<VariableIncome> {
        let description = cmd
            .description
            .as_deref()
            .map(|value| normalize_required_text(value, "description"))
            .transpose()?;
        if let Some(amount) = cmd.amount {
            validate_positive_amount(amount)?;
        }

        with_tx!(self, |db_tx| {
            let model = owned_variable_income(&db_tx, user_id, variable_income_id).await?;

            let mut active: variable_incomes::ActiveModel = model.into();
            if let Some(description) = description {
                active.description = ActiveValue::Set(description);
            }
            if let Some(amount) = cmd.amount {
                active.amount_cents = ActiveValue::Set(amount.cents());
            }
            if let Some(valid_until) = cmd.valid_until {
                active.valid_until = ActiveValue::Set(Some(valid_until));
            }
            if let Some(is_active) = cmd.is_active {
                active.is_active = ActiveValue::Set(is_active);
            }
            active.updated_at = ActiveValue::Set(Utc::now());

            let model = active.update(&db_tx).await?;
            Ok(VariableIncome::from(model))
        })
    }

    pub async fn delete_variable_income(
        &self,
        user_id: i32,
        variable_income_id: i32,
    ) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let model = owned_variable_income(&db_tx, user_id, variable_income_id).await?;
            variable_incomes::Entity::delete_by_id(model.id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    pub async fn list_fixed_incomes(&self, user_id: i32) -> ResultLedger<Vec<FixedIncome>> {
        retry_read!(self.find_fixed_incomes(user_id).await)
    }

    async fn find_fixed_incomes(&self, user_id: i32) -> ResultLedger<Vec<FixedIncome>> {
        let models = fixed_incomes::Entity::find()
            .filter(fixed_incomes::Column::UserId.eq(user_id))
            .order_by_asc(fixed_incomes::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(FixedIncome::from).collect())
    }

    pub async fn create_fixed_income(
        &self,
        user_id: i32,
        cmd: NewFixedIncome,
    ) -> ResultLedger<FixedIncome> {
        let description = normalize_required_text(&cmd.description, "description")?;
        validate_positive_amount(cmd.amount)?;

        with_tx!(self, |db_tx| {
            let now = Utc::now();
            let model = fixed_incomes::ActiveModel {
                user_id: ActiveValue::Set(user_id),
                description: ActiveValue::Set(description),
                amount_cents: ActiveValue::Set(cmd.amount.cents()),
                is_active: ActiveValue::Set(true),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;

            Ok(FixedIncome::from(model))
        })
    }

    pub async fn update_fixed_income(
        &self,
        user_id: i32,
        fixed_income_id: i32,
        cmd: UpdateFixedIncome,
    ) -> ResultLedger<FixedIncome> {
        let description = cmd
            .description
            .as_deref()
            .map(|value| normalize_required_text(value, "description"))
            .transpose()?;
        if let Some(amount) = cmd.amount {
            validate_positive_amount(amount)?;
        }

        with_tx!(self, |db_tx| {
            let model = owned_fixed_income(&db_tx, user_id, fixed_income_id).await?;

            let mut active: fixed_incomes::ActiveModel = model.into();
            if let Some(description) = description {
                active.description = ActiveValue::Set(description);
            }
            if let Some(amount) = cmd.amount {
                active.amount_cents = ActiveValue::Set(amount.cents());
            }
            if let Some(is_active) = cmd.is_active {
                active.is_active = ActiveValue::Set(is_active);
            }
            active.updated_at = ActiveValue::Set(Utc::now());

            let model = active.update(&db_tx).await?;
            Ok(FixedIncome::from(model))
        })
    }

    pub async fn delete_fixed_income(
        &self,
        user_id: i32,
        fixed_income_id: i32,
    ) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let model = owned_fixed_income(&db_tx, user_id, fixed_income_id).await?;
            fixed_incomes::Entity::delete_by_id(model.id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}

/// The user's configuration row, inserted with zeroed amounts when absent.
pub(super) async fn ensure_income_config(
    db_tx: &DatabaseTransaction,
    user_id: i32,
) -> ResultLedger<incomes::Model> {
    if let Some(model) = incomes::Entity::find()
        .filter(incomes::Column::UserId.eq(user_id))
        .one(db_tx)
        .await?
    {
        return Ok(model);
    }

    let now = Utc::now();
    let model = incomes::ActiveModel {
        user_id: ActiveValue::Set(user_id),
        fixed_amount_cents: ActiveValue::Set(0),
        bonus_amount_cents: ActiveValue::Set(0),
        created_at: ActiveValue::Set(now),
        updated_at: ActiveValue::Set(now),
        ..Default::default()
    }
    .insert(db_tx)
    .await?;
    Ok(model)
}

async fn owned_variable_income(
    db_tx: &DatabaseTransaction,
    user_id: i32,
    variable_income_id: i32,
) -> ResultLedger<variable_incomes::Model> {
    let config = incomes::Entity::find()
        .filter(incomes::Column::UserId.eq(user_id))
        .one(db_tx)
        .await?
        .ok_or_else(|| LedgerError::NotFound("variable income".to_string()))?;

    variable_incomes::Entity::find_by_id(variable_income_id)
        .filter(variable_incomes::Column::IncomeId.eq(config.id))
        .one(db_tx)
        .await?
        .ok_or_else(|| LedgerError::NotFound("variable income".to_string()))
}

async fn owned_fixed_income(
    db_tx: &DatabaseTransaction,
    user_id: i32,
    fixed_income_id: i32,
) -> ResultLedger<fixed_incomes::Model> {
    fixed_incomes::Entity::find_by_id(fixed_income_id)
        .filter(fixed_incomes::Column::UserId.eq(user_id))
        .one(db_tx)
        .await?
        .ok_or_else(|| LedgerError::NotFound("fixed income".to_string()))
}
