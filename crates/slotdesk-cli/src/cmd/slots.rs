use crate::clipboard::{PrintClipboard, SystemClipboard};
use crate::output::{preview, print_json, print_table, print_toasts};
use anyhow::{anyhow, Context};
use clap::Subcommand;
use slotdesk_core::config::Config;
use slotdesk_core::context::LocalUser;
use slotdesk_core::editor::SlotEditor;
use slotdesk_core::notify::{Notifier, ToastLog, TracingNotifier};
use slotdesk_core::route::Route;
use slotdesk_core::store::SlotDb;
use slotdesk_core::types::{Collection, SlotIndex};
use slotdesk_core::SlotError;
use std::io::Read;
use std::path::Path;

const PREVIEW_WIDTH: usize = 60;

#[derive(Subcommand)]
pub enum SlotsSubcommand {
    /// List all twenty slots of an editor page
    List {
        /// Editor page slug: flutter-webview or lovable-prompts
        page: String,
        #[command(flatten)]
        user: UserArg,
    },

    /// Save a slot's text
    Save {
        page: String,
        /// Slot number, 1 to 20
        number: usize,
        /// Text to save (read from stdin when omitted)
        text: Option<String>,
        #[command(flatten)]
        user: UserArg,
    },

    /// Set a slot's label; an empty label restores the default
    Label {
        page: String,
        number: usize,
        label: String,
        #[command(flatten)]
        user: UserArg,
    },

    /// Copy a slot's text to the clipboard
    Copy {
        page: String,
        number: usize,
        /// Print the text to stdout instead
        #[arg(long)]
        print: bool,
        /// Linux: keep serving the selection until another program takes it
        #[arg(long, conflicts_with = "print")]
        wait: bool,
        #[command(flatten)]
        user: UserArg,
    },
}

#[derive(clap::Args)]
pub struct UserArg {
    /// Account whose slots to use (default: the only configured account)
    #[arg(long, env = "SLOTDESK_USER")]
    user: Option<String>,
}

pub fn run(root: &Path, subcmd: SlotsSubcommand, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let rt = tokio::runtime::Runtime::new()?;

    match subcmd {
        SlotsSubcommand::List { page, user } => {
            let log = ToastLog::new();
            let mut editor = open_editor(root, &config, &page, &user, &log)?;
            rt.block_on(editor.load())?;
            let views = editor.views();

            if json {
                return print_json(&views);
            }
            let rows: Vec<Vec<String>> = views
                .iter()
                .map(|v| {
                    vec![
                        v.number.to_string(),
                        v.display_label.clone(),
                        preview(&v.text, PREVIEW_WIDTH),
                    ]
                })
                .collect();
            print_table(&["#", "LABEL", "TEXT"], &rows);
            Ok(())
        }

        SlotsSubcommand::Save {
            page,
            number,
            text,
            user,
        } => {
            let index = SlotIndex::from_number(number)?;
            let text = match text {
                Some(t) => t,
                None => read_stdin()?,
            };
            let log = ToastLog::new();
            let mut editor = open_editor(root, &config, &page, &user, &log)?;
            let result = rt.block_on(async {
                editor.load().await?;
                editor.edit_text(index, text);
                editor.save_text(index).await
            });
            finish(result, &log, json, || serde_json::to_value(editor.view(index)))
        }

        SlotsSubcommand::Label {
            page,
            number,
            label,
            user,
        } => {
            let index = SlotIndex::from_number(number)?;
            let log = ToastLog::new();
            let mut editor = open_editor(root, &config, &page, &user, &log)?;
            let result = rt.block_on(async {
                editor.load().await?;
                editor.begin_label_edit(index);
                editor.set_temp_label(label);
                editor.save_label(index).await
            });
            finish(result, &log, json, || serde_json::to_value(editor.view(index)))
        }

        SlotsSubcommand::Copy {
            page,
            number,
            print,
            wait,
            user,
        } => {
            let index = SlotIndex::from_number(number)?;
            // Copy failures also come back as the command's error.
            let mut editor = open_editor(root, &config, &page, &user, TracingNotifier)?;
            rt.block_on(editor.load())?;
            if editor.slot(index).text.is_empty() {
                tracing::warn!(slot = %index, "copying an empty slot");
            }
            if print {
                editor.copy(index, &mut PrintClipboard)?;
            } else {
                editor.copy(index, &mut SystemClipboard::new(wait))?;
                if !json {
                    println!("Copied {}", editor.display_label(index));
                }
            }
            Ok(())
        }
    }
}

fn open_editor<N: Notifier>(
    root: &Path,
    config: &Config,
    page: &str,
    user: &UserArg,
    notifier: N,
) -> anyhow::Result<SlotEditor<SlotDb, LocalUser, N>> {
    let collection = page_collection(page)?;
    let user_id = resolve_user(config, user.user.as_deref())?;
    let db = SlotDb::open(&config.db_path(root)).context("failed to open slot database")?;
    Ok(SlotEditor::new(collection, db, LocalUser(user_id), notifier)
        .with_saved_pulse(config.editor.saved_pulse())
        .with_load_policy(config.errors.load))
}

fn page_collection(page: &str) -> anyhow::Result<Collection> {
    Route::from_slug(page)
        .and_then(Route::collection)
        .ok_or_else(|| {
            anyhow!(SlotError::UnknownPage(page.to_string()))
                .context("expected flutter-webview or lovable-prompts")
        })
}

/// `None` when no account can be picked; the editor then reports
/// "Authentication required" like a signed-out browser would.
fn resolve_user(
    config: &Config,
    username: Option<&str>,
) -> anyhow::Result<Option<slotdesk_core::types::UserId>> {
    match username {
        Some(name) => config
            .find_user(name)
            .map(|u| Some(u.user_id.clone()))
            .ok_or_else(|| SlotError::UserNotFound(name.to_string()).into()),
        None => match config.auth.users.as_slice() {
            [only] => Ok(Some(only.user_id.clone())),
            _ => Ok(None),
        },
    }
}

fn read_stdin() -> anyhow::Result<String> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("failed to read slot text from stdin")?;
    Ok(text)
}

/// Print the operation's outcome. The editor has already described any
/// failure in a notification, so the returned error only sets the exit code.
fn finish(
    result: slotdesk_core::Result<()>,
    log: &ToastLog,
    json: bool,
    view: impl FnOnce() -> serde_json::Result<serde_json::Value>,
) -> anyhow::Result<()> {
    let toasts = log.take();
    if json {
        print_json(&serde_json::json!({
            "ok": result.is_ok(),
            "slot": view()?,
            "notifications": toasts,
        }))?;
    } else {
        print_toasts(&toasts);
    }
    result.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_collection_accepts_editor_pages_only() {
        assert_eq!(
            page_collection("flutter-webview").unwrap(),
            Collection::FlutterWebviewConfigs
        );
        assert_eq!(
            page_collection("lovable-prompts").unwrap(),
            Collection::LovablePrompts
        );
        assert!(page_collection("odoo-hosting").is_err());
    }

    #[test]
    fn resolve_user_defaults_to_single_account() {
        let mut config = Config::new();
        assert_eq!(resolve_user(&config, None).unwrap(), None);

        config.add_user("ada", "pw").unwrap();
        let ada = config.find_user("ada").unwrap().user_id.clone();
        assert_eq!(resolve_user(&config, None).unwrap(), Some(ada.clone()));

        config.add_user("bob", "pw").unwrap();
        assert_eq!(resolve_user(&config, None).unwrap(), None);
        assert_eq!(resolve_user(&config, Some("ada")).unwrap(), Some(ada));
        assert!(resolve_user(&config, Some("carol")).is_err());
    }
}
