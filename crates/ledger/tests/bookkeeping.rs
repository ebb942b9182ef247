use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::{Database, DatabaseConnection};

use ledger::{
    EntryKind, ExpenseListFilter, Ledger, LedgerError, MoneyCents, NewCategory, NewExpense,
    NewFixedExpense, NewVariableIncome, RegisterUser, UpdateCategory, UpdateExpense,
    UpdateFixedExpense, UpdateVariableIncome,
};
use migration::MigratorTrait;

async fn ledger_with_user() -> (Ledger, DatabaseConnection, i32) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let ledger = Ledger::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    let user = ledger
        .register(RegisterUser {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "hunter2".to_string(),
        })
        .await
        .unwrap();
    (ledger, db, user.id)
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

async fn new_category(ledger: &Ledger, user_id: i32, name: &str) -> i32 {
    ledger
        .create_category(
            user_id,
            NewCategory {
                name: name.to_string(),
                kind: EntryKind::Expense,
            },
        )
        .await
        .unwrap()
        .id
}

async fn new_entry(
    ledger: &Ledger,
    user_id: i32,
    category_id: i32,
    description: &str,
    cents: i64,
    on: NaiveDate,
    kind: EntryKind,
) -> i32 {
    ledger
        .create_expense(
            user_id,
            NewExpense {
                description: description.to_string(),
                amount: MoneyCents::new(cents),
                date: on,
                kind,
                category_id,
            },
        )
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn categories_crud_round_trip() {
    let (ledger, _db, user_id) = ledger_with_user().await;

    let created = ledger
        .create_category(
            user_id,
            NewCategory {
                name: "  Groceries  ".to_string(),
                kind: EntryKind::Expense,
            },
        )
        .await
        .unwrap();
    assert_eq!(created.name, "Groceries");

    let second = new_category(&ledger, user_id, "Salary").await;
    let listed = ledger.list_categories(user_id).await.unwrap();
    let ids: Vec<i32> = listed.iter().map(|category| category.id).collect();
    assert_eq!(ids, vec![created.id, second]);

    let updated = ledger
        .update_category(
            user_id,
            second,
            UpdateCategory {
                name: Some("Wages".to_string()),
                kind: Some(EntryKind::Income),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Wages");
    assert_eq!(updated.kind, EntryKind::Income);

    ledger.delete_category(user_id, second).await.unwrap();
    let err = ledger.delete_category(user_id, second).await.unwrap_err();
    assert_eq!(err, LedgerError::NotFound("category".to_string()));
}

#[tokio::test]
async fn deleting_a_category_keeps_its_entries() {
    let (ledger, _db, user_id) = ledger_with_user().await;
    let category_id = new_category(&ledger, user_id, "Groceries").await;
    let entry_id = new_entry(
        &ledger,
        user_id,
        category_id,
        "Market",
        35_00,
        date(2024, 3, 10),
        EntryKind::Expense,
    )
    .await;

    ledger.delete_category(user_id, category_id).await.unwrap();

    let listed = ledger
        .list_expenses(user_id, &ExpenseListFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, entry_id);
    assert_eq!(listed[0].category_id, None);
}

#[tokio::test]
async fn entries_require_an_owned_category_and_positive_amount() {
    let (ledger, _db, user_id) = ledger_with_user().await;
    let category_id = new_category(&ledger, user_id, "Groceries").await;

    let intruder = ledger
        .register(RegisterUser {
            name: "Bob".to_string(),
            email: "bob@example.com".to_string(),
            password: "swordfish".to_string(),
        })
        .await
        .unwrap();
    let err = ledger
        .create_expense(
            intruder.id,
            NewExpense {
                description: "Sneaky".to_string(),
                amount: MoneyCents::new(10_00),
                date: date(2024, 3, 1),
                kind: EntryKind::Expense,
                category_id,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::NotFound("category".to_string()));

    let err = ledger
        .create_expense(
            user_id,
            NewExpense {
                description: "Free lunch".to_string(),
                amount: MoneyCents::ZERO,
                date: date(2024, 3, 1),
                kind: EntryKind::Expense,
                category_id,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[tokio::test]
async fn foreign_entries_stay_invisible() {
    let (ledger, _db, user_id) = ledger_with_user().await;
    let category_id = new_category(&ledger, user_id, "Groceries").await;
    let entry_id = new_entry(
        &ledger,
        user_id,
        category_id,
        "Market",
        35_00,
        date(2024, 3, 10),
        EntryKind::Expense,
    )
    .await;

    let intruder = ledger
        .register(RegisterUser {
            name: "Bob".to_string(),
            email: "bob@example.com".to_string(),
            password: "swordfish".to_string(),
        })
        .await
        .unwrap();

    assert!(
        ledger
            .list_expenses(intruder.id, &ExpenseListFilter::default())
            .await
            .unwrap()
            .is_empty()
    );
    let err = ledger
        .update_expense(
            intruder.id,
            entry_id,
            UpdateExpense {
                description: Some("Mine now".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::NotFound("expense".to_string()));
    let err = ledger
        .delete_expense(intruder.id, entry_id)
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::NotFound("expense".to_string()));
}

#[tokio::test]
async fn entry_list_filters_compose() {
    let (ledger, _db, user_id) = ledger_with_user().await;
    let groceries = new_category(&ledger, user_id, "Groceries").await;
    let wages = new_category(&ledger, user_id, "Wages").await;

    new_entry(
        &ledger,
        user_id,
        groceries,
        "March market",
        35_00,
        date(2024, 3, 10),
        EntryKind::Expense,
    )
    .await;
    new_entry(
        &ledger,
        user_id,
        groceries,
        "April market",
        42_00,
        date(2024, 4, 2),
        EntryKind::Expense,
    )
    .await;
    new_entry(
        &ledger,
        user_id,
        wages,
        "March salary",
        2500_00,
        date(2024, 3, 5),
        EntryKind::Income,
    )
    .await;

    let march = ledger
        .list_expenses(
            user_id,
            &ExpenseListFilter {
                month: Some(3),
                year: Some(2024),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(march.len(), 2);

    let march_expenses = ledger
        .list_expenses(
            user_id,
            &ExpenseListFilter {
                month: Some(3),
                year: Some(2024),
                kind: Some(EntryKind::Expense),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(march_expenses.len(), 1);
    assert_eq!(march_expenses[0].description, "March market");

    let whole_year = ledger
        .list_expenses(
            user_id,
            &ExpenseListFilter {
                year: Some(2024),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(whole_year.len(), 3);

    let by_category = ledger
        .list_expenses(
            user_id,
            &ExpenseListFilter {
                category_id: Some(wages),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_category.len(), 1);

    let ranged = ledger
        .list_expenses(
            user_id,
            &ExpenseListFilter {
                start_date: Some(date(2024, 3, 6)),
                end_date: Some(date(2024, 4, 2)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(ranged.len(), 2);

    let err = ledger
        .list_expenses(
            user_id,
            &ExpenseListFilter {
                month: Some(3),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LedgerError::Validation("month filter requires year".to_string())
    );

    let err = ledger
        .list_expenses(
            user_id,
            &ExpenseListFilter {
                start_date: Some(date(2024, 4, 2)),
                end_date: Some(date(2024, 3, 6)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[tokio::test]
async fn entry_update_touches_only_the_given_fields() {
    let (ledger, _db, user_id) = ledger_with_user().await;
    let groceries = new_category(&ledger, user_id, "Groceries").await;
    let wages = new_category(&ledger, user_id, "Wages").await;
    let entry_id = new_entry(
        &ledger,
        user_id,
        groceries,
        "Market",
        35_00,
        date(2024, 3, 10),
        EntryKind::Expense,
    )
    .await;

    let updated = ledger
        .update_expense(
            user_id,
            entry_id,
            UpdateExpense {
                amount: Some(MoneyCents::new(38_00)),
                category_id: Some(wages),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.description, "Market");
    assert_eq!(updated.amount, MoneyCents::new(38_00));
    assert_eq!(updated.category_id, Some(wages));
    assert_eq!(updated.date, date(2024, 3, 10));
}

#[tokio::test]
async fn fixed_expense_day_bounds_are_enforced() {
    let (ledger, _db, user_id) = ledger_with_user().await;
    let category_id = new_category(&ledger, user_id, "Housing").await;

    for day in [0u8, 32] {
        let err = ledger
            .create_fixed_expense(
                user_id,
                NewFixedExpense {
                    description: "Rent".to_string(),
                    amount: MoneyCents::new(900_00),
                    day_of_month: day,
                    category_id,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    let template = ledger
        .create_fixed_expense(
            user_id,
            NewFixedExpense {
                description: "Rent".to_string(),
                amount: MoneyCents::new(900_00),
                day_of_month: 31,
                category_id,
            },
        )
        .await
        .unwrap();
    assert!(template.is_active);

    let err = ledger
        .update_fixed_expense(
            user_id,
            template.id,
            UpdateFixedExpense {
                day_of_month: Some(0),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[tokio::test]
async fn materializer_posts_each_active_template_once() {
    let (ledger, _db, user_id) = ledger_with_user().await;
    let category_id = new_category(&ledger, user_id, "Housing").await;

    ledger
        .create_fixed_expense(
            user_id,
            NewFixedExpense {
                description: "Rent".to_string(),
                amount: MoneyCents::new(900_00),
                day_of_month: 5,
                category_id,
            },
        )
        .await
        .unwrap();
    let paused = ledger
        .create_fixed_expense(
            user_id,
            NewFixedExpense {
                description: "Gym".to_string(),
                amount: MoneyCents::new(60_00),
                day_of_month: 1,
                category_id,
            },
        )
        .await
        .unwrap();
    ledger
        .update_fixed_expense(
            user_id,
            paused.id,
            UpdateFixedExpense {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let created = ledger
        .materialize_fixed_expenses(user_id, Some(3), Some(2024))
        .await
        .unwrap();
    assert_eq!(created, 1);

    let posted = ledger
        .list_expenses(
            user_id,
            &ExpenseListFilter {
                month: Some(3),
                year: Some(2024),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].description, "Rent");
    assert_eq!(posted[0].date, date(2024, 3, 5));
    assert_eq!(posted[0].kind, EntryKind::Expense);
    assert_eq!(posted[0].category_id, Some(category_id));

    // Second run over the same month posts nothing.
    let created = ledger
        .materialize_fixed_expenses(user_id, Some(3), Some(2024))
        .await
        .unwrap();
    assert_eq!(created, 0);

    // A different month is a fresh window.
    let created = ledger
        .materialize_fixed_expenses(user_id, Some(4), Some(2024))
        .await
        .unwrap();
    assert_eq!(created, 1);
}

#[tokio::test]
async fn materializer_clamps_posting_day_to_28() {
    let (ledger, _db, user_id) = ledger_with_user().await;
    let category_id = new_category(&ledger, user_id, "Housing").await;
    ledger
        .create_fixed_expense(
            user_id,
            NewFixedExpense {
                description: "Rent".to_string(),
                amount: MoneyCents::new(900_00),
                day_of_month: 31,
                category_id,
            },
        )
        .await
        .unwrap();

    ledger
        .materialize_fixed_expenses(user_id, Some(2), Some(2024))
        .await
        .unwrap();

    let posted = ledger
        .list_expenses(
            user_id,
            &ExpenseListFilter {
                month: Some(2),
                year: Some(2024),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    // Posted on the 28th even though leap February has a 29th.
    assert_eq!(posted[0].date, date(2024, 2, 28));
}

#[tokio::test]
async fn materializer_skips_descriptions_already_in_the_window() {
    let (ledger, _db, user_id) = ledger_with_user().await;
    let category_id = new_category(&ledger, user_id, "Housing").await;

    new_entry(
        &ledger,
        user_id,
        category_id,
        "Rent",
        900_00,
        date(2024, 3, 2),
        EntryKind::Expense,
    )
    .await;
    ledger
        .create_fixed_expense(
            user_id,
            NewFixedExpense {
                description: "Rent".to_string(),
                amount: MoneyCents::new(900_00),
                day_of_month: 5,
                category_id,
            },
        )
        .await
        .unwrap();
    ledger
        .create_fixed_expense(
            user_id,
            NewFixedExpense {
                description: "Internet".to_string(),
                amount: MoneyCents::new(80_00),
                day_of_month: 10,
                category_id,
            },
        )
        .await
        .unwrap();

    let created = ledger
        .materialize_fixed_expenses(user_id, Some(3), Some(2024))
        .await
        .unwrap();
    assert_eq!(created, 1);

    let descriptions: Vec<String> = ledger
        .list_expenses(
            user_id,
            &ExpenseListFilter {
                month: Some(3),
                year: Some(2024),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.description)
        .collect();
    assert_eq!(descriptions.len(), 2);
    assert!(descriptions.contains(&"Rent".to_string()));
    assert!(descriptions.contains(&"Internet".to_string()));
}

#[tokio::test]
async fn materializer_defaults_to_the_current_month() {
    let (ledger, _db, user_id) = ledger_with_user().await;
    let category_id = new_category(&ledger, user_id, "Housing").await;
    ledger
        .create_fixed_expense(
            user_id,
            NewFixedExpense {
                description: "Rent".to_string(),
                amount: MoneyCents::new(900_00),
                day_of_month: 15,
                category_id,
            },
        )
        .await
        .unwrap();

    let created = ledger
        .materialize_fixed_expenses(user_id, None, None)
        .await
        .unwrap();
    assert_eq!(created, 1);

    let today = Utc::now().date_naive();
    let posted = ledger
        .list_expenses(
            user_id,
            &ExpenseListFilter {
                month: Some(today.month()),
                year: Some(today.year()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(posted.len(), 1);
}

#[tokio::test]
async fn income_config_appears_on_first_access_and_updates_partially() {
    let (ledger, _db, user_id) = ledger_with_user().await;

    let config = ledger.income_config(user_id).await.unwrap();
    assert_eq!(config.fixed_amount, MoneyCents::ZERO);
    assert_eq!(config.bonus_amount, MoneyCents::ZERO);

    let config = ledger
        .update_income_config(user_id, Some(MoneyCents::new(1000_00)), None)
        .await
        .unwrap();
    assert_eq!(config.fixed_amount, MoneyCents::new(1000_00));
    assert_eq!(config.bonus_amount, MoneyCents::ZERO);

    let config = ledger
        .update_income_config(user_id, None, Some(MoneyCents::new(500_00)))
        .await
        .unwrap();
    assert_eq!(config.fixed_amount, MoneyCents::new(1000_00));
    assert_eq!(config.bonus_amount, MoneyCents::new(500_00));

    let err = ledger
        .update_income_config(user_id, Some(MoneyCents::new(-1)), None)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[tokio::test]
async fn variable_income_lines_round_trip() {
    let (ledger, _db, user_id) = ledger_with_user().await;

    let line = ledger
        .create_variable_income(
            user_id,
            NewVariableIncome {
                description: "Freelance".to_string(),
                amount: MoneyCents::new(300_00),
                valid_until: Some(Utc::now()),
            },
        )
        .await
        .unwrap();
    assert!(line.is_active);
    assert!(line.valid_until.is_some());

    let updated = ledger
        .update_variable_income(
            user_id,
            line.id,
            UpdateVariableIncome {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!updated.is_active);
    assert_eq!(updated.description, "Freelance");

    ledger.delete_variable_income(user_id, line.id).await.unwrap();
    assert!(ledger.list_variable_incomes(user_id).await.unwrap().is_empty());
}
