use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{EntryKind, LedgerError, ResultLedger, categories, categories::Category};

use super::{Ledger, normalize_required_text, retry_read, with_tx};

/// New category payload.
#[derive(Clone, Debug)]
pub struct NewCategory {
    pub name: String,
    pub kind: EntryKind,
}

/// Category changes. Untouched fields keep their stored values.
#[derive(Clone, Debug, Default)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub kind: Option<EntryKind>,
}

impl Ledger {
    pub async fn list_categories(&self, user_id: i32) -> ResultLedger<Vec<Category>> {
        retry_read!(self.find_categories(user_id).await)
    }

    async fn find_categories(&self, user_id: i32) -> ResultLedger<Vec<Category>> {
        let models = categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id))
            .order_by_asc(categories::Column::Id)
            .all(&self.database)
            .await?;
        models.into_iter().map(Category::try_from).collect()
    }

    pub async fn create_category(&self, user_id: i32, cmd: NewCategory) -> ResultLedger<Category> {
        let name = normalize_required_text(&cmd.name, "category name")?;

        with_tx!(self, |db_tx| {
            let now = Utc::now();
            let model = categories::ActiveModel {
                user_id: ActiveValue::Set(user_id),
                name: ActiveValue::Set(name),
                kind: ActiveValue::Set(cmd.kind.as_str().to_string()),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;

            Category::try_from(model)
        })
    }

    pub async fn update_category(
        &self,
        user_id: i32,
        category_id: i32,
        cmd: UpdateCategory,
    ) -> ResultLedger<Category> {
        let name = cmd
            .name
            .as_deref()
            .map(|value| normalize_required_text(value, "category name"))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let model = owned_category(&db_tx, user_id, category_id).await?;

            let mut active: categories::ActiveModel = model.into();
            if let Some(name) = name {
                active.name = ActiveValue::Set(name);
            }
            if let Some(kind) = cmd.kind {
                active.kind = ActiveValue::Set(kind.as_str().to_string());
            }
            active.updated_at = ActiveValue::Set(Utc::now());

            let model = active.update(&db_tx).await?;
            Category::try_from(model)
        })
    }

    /// Delete a category. Entries that pointed at it keep existing with a
    /// nulled reference (schema-level SET NULL).
    pub async fn delete_category(&self, user_id: i32, category_id: i32) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let model = owned_category(&db_tx, user_id, category_id).await?;
            categories::Entity::delete_by_id(model.id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}

/// The category, or `NotFound` when it is absent or owned by someone else.
pub(super) async fn owned_category(
    db_tx: &DatabaseTransaction,
    user_id: i32,
    category_id: i32,
) -> ResultLedger<categories::Model> {
    categories::Entity::find_by_id(category_id)
        .filter(categories::Column::UserId.eq(user_id))
        .one(db_tx)
        .await?
        .ok_or_else(|| LedgerError::NotFound("category".to_string()))
}
