//! Bootstrap CLI for operators.
//!
//! Usage:
//!   cargo run --bin admin-cli -- create-admin --username ops --password secret123
//!   cargo run --bin admin-cli -- create-key --name "CI - GitHub Actions" --expires-in 365d
//!   cargo run --bin admin-cli -- list-keys

use std::env;

use ci_dashboard_lib::config::Config;
use ci_dashboard_lib::db::DbPool;
use ci_dashboard_lib::migration::Migrator;
use ci_dashboard_lib::models::UserRole;
use ci_dashboard_lib::services::{api_key, user};
use sea_orm_migration::MigratorTrait;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().collect();

    let command = match args.get(1).map(String::as_str) {
        Some("create-admin") | Some("create-key") | Some("list-keys") => args[1].clone(),
        Some("--help") | Some("-h") => {
            print_usage();
            return;
        }
        _ => {
            print_usage();
            std::process::exit(1);
        }
    };

    // Parse flag arguments
    let mut username: Option<String> = None;
    let mut password: Option<String> = None;
    let mut name: Option<String> = None;
    let mut expires_in: Option<String> = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--username" | "-u" => {
                i += 1;
                username = args.get(i).cloned();
            }
            "--password" | "-p" => {
                i += 1;
                password = args.get(i).cloned();
            }
            "--name" | "-n" => {
                i += 1;
                name = args.get(i).cloned();
            }
            "--expires-in" | "-e" => {
                i += 1;
                expires_in = args.get(i).cloned();
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    // Load config and initialize database
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match DbPool::connect(&config).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error connecting to database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = Migrator::up(pool.connection(), None).await {
        eprintln!("Error running migrations: {}", e);
        std::process::exit(1);
    }

    match command.as_str() {
        "create-admin" => {
            let (username, password) = match (username, password) {
                (Some(u), Some(p)) => (u, p),
                _ => {
                    eprintln!("Error: --username and --password are required");
                    std::process::exit(1);
                }
            };

            match user::create_user(&pool, &username, &password, UserRole::Admin).await {
                Ok(created) => {
                    println!("Admin user '{}' created (id: {})", created.username, created.id);
                }
                Err(e) => {
                    eprintln!("Error creating user: {}", e);
                    std::process::exit(1);
                }
            }
        }
        "create-key" => {
            let name = match name {
                Some(n) => n,
                None => {
                    eprintln!("Error: --name is required");
                    std::process::exit(1);
                }
            };

            match api_key::create_key(
                &pool,
                &config.api_key_salt,
                &name,
                None,
                expires_in.as_deref(),
            )
            .await
            {
                Ok((full_token, key)) => {
                    println!();
                    println!("  API Key Generated");
                    println!();
                    println!("  ID:      {}", key.id);
                    println!("  Name:    {}", key.name);
                    println!("  Key ID:  {}", key.key_id);
                    match key.expires_at {
                        Some(expires) => println!("  Expires: {}", expires.to_rfc3339()),
                        None => println!("  Expires: Never"),
                    }
                    println!();
                    println!("  Key:     {}", full_token);
                    println!();
                    println!("  Save this key! It cannot be retrieved later.");
                    println!();
                }
                Err(e) => {
                    eprintln!("Error generating key: {}", e);
                    std::process::exit(1);
                }
            }
        }
        "list-keys" => match api_key::list_keys(&pool).await {
            Ok(keys) => {
                if keys.is_empty() {
                    println!("No API keys.");
                }
                for key in keys {
                    let expires = key
                        .expires_at
                        .map(|e| e.to_rfc3339())
                        .unwrap_or_else(|| "never".to_string());
                    println!(
                        "{}  {}  name={}  expires={}",
                        key.id, key.key_id, key.name, expires
                    );
                }
            }
            Err(e) => {
                eprintln!("Error listing keys: {}", e);
                std::process::exit(1);
            }
        },
        _ => unreachable!(),
    }
}

fn print_usage() {
    eprintln!();
    eprintln!("Usage: admin-cli <command> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  create-admin  --username <name> --password <password>");
    eprintln!("  create-key    --name <name> [--expires-in <duration>]");
    eprintln!("  list-keys");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  admin-cli create-admin --username ops --password secret123");
    eprintln!("  admin-cli create-key --name \"CI - GitHub Actions\" --expires-in 365d");
    eprintln!();
}
