use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use slotdesk_core::config::Config;
use std::io::BufRead;
use std::path::Path;

#[derive(Subcommand)]
pub enum UserSubcommand {
    /// Add an account that can sign in
    Add {
        username: String,
        /// Password (read from stdin when omitted)
        #[arg(long, env = "SLOTDESK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// List accounts
    List,
}

pub fn run(root: &Path, subcmd: UserSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        UserSubcommand::Add { username, password } => add(root, &username, password, json),
        UserSubcommand::List => list(root, json),
    }
}

fn add(root: &Path, username: &str, password: Option<String>, json: bool) -> anyhow::Result<()> {
    let mut config = Config::load(root).context("failed to load config")?;
    let password = match password {
        Some(p) => p,
        None => read_password_line()?,
    };
    if password.is_empty() {
        anyhow::bail!("password must not be empty");
    }

    let account = config.add_user(username, &password)?.clone();
    config.save(root).context("failed to write config")?;

    if json {
        print_json(&serde_json::json!({
            "username": account.username,
            "user_id": account.user_id,
        }))?;
    } else {
        println!("Added user '{}' ({})", account.username, account.user_id);
    }
    Ok(())
}

fn read_password_line() -> anyhow::Result<String> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;

    if json {
        let users: Vec<_> = config
            .auth
            .users
            .iter()
            .map(|u| serde_json::json!({ "username": u.username, "user_id": u.user_id }))
            .collect();
        return print_json(&users);
    }

    if config.auth.users.is_empty() {
        println!("No users. Add one with 'slotdesk user add <username>'.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = config
        .auth
        .users
        .iter()
        .map(|u| vec![u.username.clone(), u.user_id.to_string()])
        .collect();
    print_table(&["USERNAME", "USER ID"], &rows);
    Ok(())
}
