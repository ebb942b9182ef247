//! Accounts and bearer sessions: registration, login, profile, cascade
//! account deletion.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    LedgerError, ResultLedger, categories, expenses, fixed_expenses, fixed_incomes, incomes,
    sessions, users, users::User, variable_incomes,
};

use super::{Ledger, normalize_email, normalize_required_text, retry_read, with_tx};

/// New account payload.
#[derive(Clone, Debug)]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Profile changes. Untouched fields keep their stored values.
#[derive(Clone, Debug, Default)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// A freshly minted bearer session.
#[derive(Clone, Debug)]
pub struct SessionToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

fn hash_password(password: &str) -> ResultLedger<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| LedgerError::Internal(format!("password hashing failed: {err}")))
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// 64 hex chars of fresh token material.
fn new_session_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// Bad password, unknown email, missing or expired session: callers cannot
/// tell these apart.
fn invalid_credentials() -> LedgerError {
    LedgerError::Unauthorized("invalid credentials".to_string())
}

fn validate_password(password: &str) -> ResultLedger<()> {
    if password.trim().is_empty() {
        return Err(LedgerError::Validation(
            "password must not be empty".to_string(),
        ));
    }
    Ok(())
}

impl Ledger {
    /// Create a new account. The email must not already be registered.
    pub async fn register(&self, cmd: RegisterUser) -> ResultLedger<User> {
        let name = normalize_required_text(&cmd.name, "name")?;
        let email = normalize_email(&cmd.email)?;
        validate_password(&cmd.password)?;
        let password_hash = hash_password(&cmd.password)?;

        with_tx!(self, |db_tx| {
            let taken = users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if taken {
                return Err(LedgerError::Conflict(email));
            }

            let now = Utc::now();
            let model = users::ActiveModel {
                name: ActiveValue::Set(name),
                email: ActiveValue::Set(email),
                password_hash: ActiveValue::Set(password_hash),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;

            Ok(User::from(model))
        })
    }

    /// Verify credentials and mint a session token.
    pub async fn login(&self, email: &str, password: &str) -> ResultLedger<SessionToken> {
        let email = normalize_email(email)?;
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !verify_password(password, &user.password_hash) {
            return Err(invalid_credentials());
        }

        let now = Utc::now();
        let expires_at = now + self.session_ttl;
        let token = new_session_token();

        with_tx!(self, |db_tx| {
            sessions::ActiveModel {
                user_id: ActiveValue::Set(user.id),
                token: ActiveValue::Set(token.clone()),
                expires_at: ActiveValue::Set(expires_at),
                created_at: ActiveValue::Set(now),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;

            Ok(SessionToken { token, expires_at })
        })
    }

    /// Delete the presented session. Unknown tokens are a no-op.
    pub async fn logout(&self, token: &str) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            sessions::Entity::delete_many()
                .filter(sessions::Column::Token.eq(token))
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Resolve a bearer token into its user. Used by the server middleware
    /// on every authenticated request.
    pub async fn session_user(&self, token: &str) -> ResultLedger<User> {
        retry_read!(self.find_session_user(token).await)
    }

    async fn find_session_user(&self, token: &str) -> ResultLedger<User> {
        let row = sessions::Entity::find()
            .filter(sessions::Column::Token.eq(token))
            .find_also_related(users::Entity)
            .one(&self.database)
            .await?;

        let Some((session, Some(user))) = row else {
            return Err(invalid_credentials());
        };
        if session.expires_at <= Utc::now() {
            return Err(invalid_credentials());
        }

        Ok(User::from(user))
    }

    /// Current user data, without the hash.
    pub async fn profile(&self, user_id: i32) -> ResultLedger<User> {
        retry_read!(self.find_user(user_id).await)
    }

    async fn find_user(&self, user_id: i32) -> ResultLedger<User> {
        users::Entity::find_by_id(user_id)
            .one(&self.database)
            .await?
            .map(User::from)
            .ok_or_else(|| LedgerError::NotFound("user".to_string()))
    }

    /// Apply profile changes; email changes are pre-checked for uniqueness.
    pub async fn update_profile(&self, user_id: i32, cmd: UpdateProfile) -> ResultLedger<User> {
        let name = cmd
            .name
            .as_deref()
            .map(|value| normalize_required_text(value, "name"))
            .transpose()?;
        let email = cmd.email.as_deref().map(normalize_email).transpose()?;
        let password_hash = match cmd.password.as_deref() {
            Some(password) => {
                validate_password(password)?;
                Some(hash_password(password)?)
            }
            None => None,
        };

        with_tx!(self, |db_tx| {
            let model = users::Entity::find_by_id(user_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| LedgerError::NotFound("user".to_string()))?;

            if let Some(new_email) = email.as_ref()
                && *new_email != model.email
            {
                let taken = users::Entity::find()
                    .filter(users::Column::Email.eq(new_email.clone()))
                    .filter(users::Column::Id.ne(user_id))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if taken {
                    return Err(LedgerError::Conflict(new_email.clone()));
                }
            }

            let mut active: users::ActiveModel = model.into();
            if let Some(name) = name {
                active.name = ActiveValue::Set(name);
            }
            if let Some(email) = email {
                active.email = ActiveValue::Set(email);
            }
            if let Some(hash) = password_hash {
                active.password_hash = ActiveValue::Set(hash);
            }
            active.updated_at = ActiveValue::Set(Utc::now());

            let model = active.update(&db_tx).await?;
            Ok(User::from(model))
        })
    }

    /// Remove the account and everything it owns, in dependency order,
    /// inside one transaction.
    pub async fn delete_account(&self, user_id: i32) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            if let Some(income) = incomes::Entity::find()
                .filter(incomes::Column::UserId.eq(user_id))
                .one(&db_tx)
                .await?
            {
                variable_incomes::Entity::delete_many()
                    .filter(variable_incomes::Column::IncomeId.eq(income.id))
                    .exec(&db_tx)
                    .await?;
                incomes::Entity::delete_by_id(income.id).exec(&db_tx).await?;
            }

            expenses::Entity::delete_many()
                .filter(expenses::Column::UserId.eq(user_id))
                .exec(&db_tx)
                .await?;
            fixed_expenses::Entity::delete_many()
                .filter(fixed_expenses::Column::UserId.eq(user_id))
                .exec(&db_tx)
                .await?;
            fixed_incomes::Entity::delete_many()
                .filter(fixed_incomes::Column::UserId.eq(user_id))
                .exec(&db_tx)
                .await?;
            categories::Entity::delete_many()
                .filter(categories::Column::UserId.eq(user_id))
                .exec(&db_tx)
                .await?;
            sessions::Entity::delete_many()
                .filter(sessions::Column::UserId.eq(user_id))
                .exec(&db_tx)
                .await?;

            let deleted = users::Entity::delete_by_id(user_id).exec(&db_tx).await?;
            if deleted.rows_affected == 0 {
                return Err(LedgerError::NotFound("user".to_string()));
            }

            tracing::info!(user_id, "account deleted");
            Ok(())
        })
    }

    /// All accounts, oldest first. Operator tooling only.
    pub async fn list_users(&self) -> ResultLedger<Vec<User>> {
        retry_read!(
            users::Entity::find()
                .order_by_asc(users::Column::Id)
                .all(&self.database)
                .await
                .map(|models| models.into_iter().map(User::from).collect())
                .map_err(LedgerError::from)
        )
    }
}
