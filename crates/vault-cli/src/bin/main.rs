//! Password vault CLI
//!
//! Stores website logins in a local data directory with every password sealed
//! individually, and moves them in and out through encrypted export bundles
//! or plaintext files from other password managers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use tracing::{debug, info};

use vault_core::import::has_export_extension;
use vault_core::{
    generate_password, Complexity, CredentialId, CredentialManager, CredentialUpdate,
    ExportFormat, GeneratorOptions, JsonFileStore, NewCredential, SecretString, SettingsManager,
    StaticIdentity,
};

/// Password vault - encrypted storage, import and export of website logins
#[derive(Parser, Debug)]
#[command(name = "vault")]
#[command(version)]
#[command(about = "Password vault - encrypted storage, import and export of website logins")]
struct Args {
    /// Data directory holding credentials.json and settings.json
    #[arg(long, env = "VAULT_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Owner id the records are filed under
    #[arg(long, env = "VAULT_OWNER", default_value = "local", global = true)]
    owner: String,

    /// 32-byte secret for stored passwords (overrides settings.json)
    #[arg(long, env = "VAULT_FIXED_KEY", hide_env_values = true, global = true)]
    fixed_key: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a credential (the password is prompted unless generated)
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        url: Option<String>,
        /// Generate a random password instead of prompting
        #[arg(long)]
        generate: bool,
    },
    /// List credentials, newest first
    List,
    /// Show one credential including its password
    Show { id: String },
    /// Change fields of a credential
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long, conflicts_with = "clear_url")]
        url: Option<String>,
        /// Remove the website URL
        #[arg(long)]
        clear_url: bool,
        /// Prompt for a new password
        #[arg(long)]
        password: bool,
    },
    /// Delete a credential
    Delete { id: String },
    /// Import credentials from an export bundle or a JSON/CSV file
    Import {
        file: PathBuf,
        /// Secret key of an encrypted bundle
        #[arg(long, env = "VAULT_SECRET_KEY", hide_env_values = true)]
        secret_key: Option<String>,
    },
    /// Write an encrypted export bundle (`-` for stdout)
    Export {
        /// Output file; defaults to the generated bundle name
        file: Option<String>,
        #[arg(long)]
        format: Option<ExportFormat>,
        #[arg(long, env = "VAULT_SECRET_KEY", hide_env_values = true)]
        secret_key: Option<String>,
    },
    /// Print a random password
    Generate {
        #[arg(long, default_value_t = 16)]
        length: usize,
        #[arg(long, default_value_t = Complexity::High)]
        complexity: Complexity,
    },
}

fn default_data_dir() -> Result<PathBuf> {
    ProjectDirs::from("com", "obsidian", "vault")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .context("Could not determine a data directory; pass --data-dir")
}

fn prompt_secret(prompt: &str) -> Result<SecretString> {
    Ok(SecretString::new(rpassword::prompt_password(prompt)?))
}

/// Prompt twice and require both entries to match
fn prompt_confirmed(prompt: &str) -> Result<SecretString> {
    let first = prompt_secret(prompt)?;
    let second = prompt_secret("Confirm: ")?;
    if first != second {
        bail!("Entries do not match");
    }
    Ok(first)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    if let Command::Generate { length, complexity } = args.command {
        let password = generate_password(GeneratorOptions { length, complexity })?;
        println!("{}", password.expose());
        return Ok(());
    }

    let data_dir = match args.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };
    debug!("Using data directory {:?}", data_dir);

    let settings_manager = SettingsManager::new(&data_dir);
    let mut settings = settings_manager.get().clone();
    if let Some(secret) = args.fixed_key {
        settings.fixed_key_secret = Some(secret);
    }
    settings.validate()?;

    let store = JsonFileStore::open(&data_dir)
        .await
        .with_context(|| format!("Failed to open store in {}", data_dir.display()))?;
    let identity = StaticIdentity::new(args.owner)?;
    let manager = CredentialManager::from_settings(Arc::new(store), Arc::new(identity), &settings)?;

    match args.command {
        Command::Add {
            name,
            username,
            url,
            generate,
        } => {
            let password = if generate {
                generate_password(GeneratorOptions::default())?
            } else {
                prompt_confirmed("Password: ")?
            };
            let credential = manager
                .add(NewCredential::new(name, url, username, password.clone()))
                .await?;
            println!("Added {} ({})", credential.website_name, credential.id);
            if generate {
                println!("Generated password: {}", password.expose());
            }
        }
        Command::List => {
            let credentials = manager.list().await?;
            if credentials.is_empty() {
                println!("No credentials stored");
            }
            for c in credentials {
                println!(
                    "{}  {}  {}  {}  {}",
                    c.id,
                    c.website_name,
                    c.username,
                    c.website_url.as_deref().unwrap_or("-"),
                    c.created_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        Command::Show { id } => {
            let id = CredentialId::new(id);
            let credential = manager
                .list()
                .await?
                .into_iter()
                .find(|c| c.id == id)
                .with_context(|| format!("Credential not found: {}", id))?;
            let password = manager.reveal(&id).await?;

            println!("Website:  {}", credential.website_name);
            println!("URL:      {}", credential.website_url.as_deref().unwrap_or("-"));
            println!("Username: {}", credential.username);
            println!("Password: {}", password.expose());
        }
        Command::Update {
            id,
            name,
            username,
            url,
            clear_url,
            password,
        } => {
            let website_url = if clear_url { Some(None) } else { url.map(Some) };
            let password = if password {
                Some(prompt_confirmed("New password: ")?)
            } else {
                None
            };
            let updated = manager
                .update(
                    &CredentialId::new(id),
                    CredentialUpdate {
                        website_name: name,
                        website_url,
                        username,
                        password,
                    },
                )
                .await?;
            println!("Updated {} ({})", updated.website_name, updated.id);
        }
        Command::Delete { id } => {
            manager.delete(&CredentialId::new(id)).await?;
            println!("Deleted");
        }
        Command::Import { file, secret_key } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let file_name = file_name_of(&file);

            let secret_key = match secret_key {
                Some(key) => Some(SecretString::new(key)),
                None if has_export_extension(&file_name) => Some(prompt_secret(
                    "Secret key (leave empty for an unencrypted file): ",
                )?),
                None => None,
            }
            .filter(|key| !key.is_empty());

            let report = manager
                .import_file(
                    &text,
                    &file_name,
                    secret_key.as_ref().map(SecretString::expose),
                )
                .await?;

            if let Some(source) = report.source {
                info!("Detected {}", source);
            }
            println!(
                "Imported {} of {} credential(s){}",
                report.imported.len(),
                report.total(),
                if report.decrypted { " from an encrypted bundle" } else { "" }
            );
            for failure in &report.failures {
                eprintln!(
                    "  failed: {} ({}): {}",
                    failure.website_name, failure.username, failure.error
                );
            }
        }
        Command::Export {
            file,
            format,
            secret_key,
        } => {
            let format = format.unwrap_or(settings.default_export_format);
            let secret_key = match secret_key {
                Some(key) => SecretString::new(key),
                None => prompt_confirmed("Secret key for the export: ")?,
            };

            let bundle = manager
                .export(format, secret_key.expose(), &settings.export_file_prefix)
                .await?;

            match file.as_deref() {
                Some("-") => println!("{}", bundle.contents),
                other => {
                    let path = PathBuf::from(other.unwrap_or(&bundle.file_name));
                    tokio::fs::write(&path, &bundle.contents)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    eprintln!(
                        "Exported {} credential(s) as {} to {}",
                        bundle.count,
                        bundle.format,
                        path.display()
                    );
                }
            }
        }
        Command::Generate { .. } => unreachable!("handled before the store is opened"),
    }

    Ok(())
}
