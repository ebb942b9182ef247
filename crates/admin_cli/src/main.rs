use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor, execute,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{self, ClearType},
};
use ledger::{Ledger, LedgerError, RegisterUser};
use migration::MigratorTrait;
use sea_orm::Database;

type CliError = Box<dyn Error + Send + Sync>;

#[derive(Parser, Debug)]
#[command(name = "centavo_admin")]
#[command(about = "Admin utilities for Centavo (manage accounts)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./centavo.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account, prompting for its password.
    CreateUser(CreateUserArgs),
    /// Print every account.
    ListUsers,
    /// Delete an account and everything it owns.
    DeleteUser(DeleteUserArgs),
}

#[derive(Args, Debug)]
struct CreateUserArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
}

#[derive(Args, Debug)]
struct DeleteUserArgs {
    #[arg(long)]
    email: String,
}

/// Runs `body` with the terminal in raw mode, restoring it on every exit
/// path before the result is returned.
fn with_raw_mode<T>(body: impl FnOnce() -> Result<T, CliError>) -> Result<T, CliError> {
    terminal::enable_raw_mode()?;
    let result = body();
    terminal::disable_raw_mode()?;
    result
}

/// Reads one line with echoed stars. `None` means the operator hit Ctrl+C.
fn read_masked_line(prompt: &str) -> Result<Option<String>, CliError> {
    let mut out = std::io::stderr();
    execute!(out, cursor::MoveToColumn(0), terminal::Clear(ClearType::CurrentLine))?;
    write!(out, "{prompt}")?;
    out.flush()?;

    let entered = with_raw_mode(|| {
        let mut buf = String::new();
        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            if key.modifiers.contains(KeyModifiers::CONTROL) {
                if key.code == KeyCode::Char('c') {
                    return Ok(None);
                }
                continue;
            }

            match key.code {
                KeyCode::Enter => return Ok(Some(buf)),
                KeyCode::Backspace => {
                    if buf.pop().is_some() {
                        let mut out = std::io::stderr();
                        execute!(out, cursor::MoveLeft(1))?;
                        write!(out, " ")?;
                        execute!(out, cursor::MoveLeft(1))?;
                        out.flush()?;
                    }
                }
                KeyCode::Char(ch) => {
                    buf.push(ch);
                    let mut out = std::io::stderr();
                    write!(out, "*")?;
                    out.flush()?;
                }
                _ => {}
            }
        }
    });

    writeln!(out)?;
    out.flush()?;
    entered
}

/// Password entry with confirmation; up to three attempts.
fn ask_new_password() -> Result<String, CliError> {
    for attempt in 1..=3 {
        if attempt > 1 {
            eprintln!("Try again ({attempt}/3).");
        }

        let Some(first) = read_masked_line("Password: ")? else {
            return Err("interrupted".into());
        };
        if first.is_empty() {
            eprintln!("Password must not be empty.");
            continue;
        }

        let Some(second) = read_masked_line("Confirm password: ")? else {
            return Err("interrupted".into());
        };
        if first == second {
            return Ok(first);
        }
        eprintln!("Passwords do not match.");
    }

    Err("too many attempts".into())
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    let db = Database::connect(&cli.database_url).await?;
    migration::Migrator::up(&db, None).await?;
    let ledger = Ledger::builder().database(db).build().await?;

    match cli.command {
        Command::CreateUser(args) => {
            let password = ask_new_password()?;

            let registration = ledger
                .register(RegisterUser {
                    name: args.name,
                    email: args.email,
                    password,
                })
                .await;
            let user = match registration {
                Ok(user) => user,
                Err(err @ LedgerError::Conflict(_)) => {
                    eprintln!("{err}");
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            };

            println!("created user: {} <{}> (id {})", user.name, user.email, user.id);
        }
        Command::ListUsers => {
            let users = ledger.list_users().await?;
            if users.is_empty() {
                println!("no users");
            }
            for user in users {
                println!(
                    "{:>5}  {} <{}>  since {}",
                    user.id,
                    user.name,
                    user.email,
                    user.created_at.format("%Y-%m-%d")
                );
            }
        }
        Command::DeleteUser(args) => {
            let email = args.email.trim().to_lowercase();
            let found = ledger
                .list_users()
                .await?
                .into_iter()
                .find(|user| user.email == email);

            let Some(user) = found else {
                eprintln!("user not found: {email}");
                std::process::exit(1);
            };

            ledger.delete_account(user.id).await?;
            println!("deleted user: {} <{}>", user.name, user.email);
        }
    }

    Ok(())
}
