use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use crate::bookmarks::{
    BookmarkChanges, Bookmarks, CreateOptions, Outcome, DEFAULT_READING_LIST_COUNT,
};
use crate::client::{LinkhutClient, PostQuery, PreviewClient};
use crate::config::{Config, Credential};
use crate::display;
use crate::progress::with_spinner;
use crate::prompts;
use crate::utils::{mask_secret, normalize_date, parse_tags};

#[derive(Parser)]
#[command(name = "linkhut-cli", version)]
#[command(about = "LinkHut CLI - Manage your bookmarks from the command line", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// LinkHut API base URL (overrides config)
    #[arg(long, env = "LINKHUT_API_URL", global = true)]
    pub api_url: Option<String>,

    /// LinkPreview API base URL (overrides config)
    #[arg(long, env = "LINKPREVIEW_API_URL", global = true)]
    pub preview_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check authentication configuration status
    ConfigStatus,

    /// Manage bookmarks
    #[command(subcommand)]
    Bookmarks(BookmarkCommands),

    /// Manage tags
    #[command(subcommand)]
    Tags(TagCommands),

    /// Store or remove credentials in the system keyring
    #[command(subcommand)]
    Auth(AuthCommands),

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum BookmarkCommands {
    /// List bookmarks. Without filters, shows the 15 most recent.
    List {
        /// Filter by tag (repeatable; only the first is used with --count)
        #[arg(short, long)]
        tag: Vec<String>,

        /// Number of recent bookmarks to show
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=100))]
        count: Option<u32>,

        /// Date to filter bookmarks (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,

        /// URL to filter bookmarks
        #[arg(short, long)]
        url: Option<String>,
    },

    /// Add a new bookmark. Prompts for details when URL is omitted.
    Add {
        /// URL of the bookmark
        url: Option<String>,

        /// Title of the bookmark (fetched automatically when omitted)
        #[arg(short, long)]
        title: Option<String>,

        /// Note for the bookmark
        #[arg(short, long)]
        note: Option<String>,

        /// Tags to associate with the bookmark (suggested when omitted)
        #[arg(short = 'g', long = "tag")]
        tags: Vec<String>,

        /// Make the bookmark private
        #[arg(short, long)]
        private: bool,

        /// Mark as to-read
        #[arg(short = 'r', long)]
        to_read: bool,

        /// Do not ask LinkHut for tag suggestions
        #[arg(long)]
        no_suggest: bool,
    },

    /// Update a bookmark: replace tags, append a note, change visibility
    Update {
        /// URL of the bookmark to update
        url: String,

        /// New tags for the bookmark
        #[arg(short = 'g', long = "tag")]
        tags: Vec<String>,

        /// Note to append to the bookmark
        #[arg(short, long)]
        note: Option<String>,

        /// Make the bookmark private
        #[arg(long, conflicts_with = "public")]
        private: bool,

        /// Make the bookmark public
        #[arg(long)]
        public: bool,
    },

    /// Delete a bookmark
    Delete {
        /// URL of the bookmark to delete
        url: String,

        /// Delete without confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Show your reading list (bookmarks marked as to-read)
    ReadingList {
        /// Number of bookmarks to show
        #[arg(
            short,
            long,
            default_value_t = DEFAULT_READING_LIST_COUNT,
            value_parser = clap::value_parser!(u32).range(1..=100)
        )]
        count: u32,
    },

    /// Mark a bookmark to-read or read, creating it if needed
    ToggleRead {
        /// URL of the bookmark
        url: String,

        /// Mark as to-read (default)
        #[arg(long = "to-read", overrides_with = "not_to_read")]
        to_read: bool,

        /// Mark as read
        #[arg(long = "not-to-read", overrides_with = "to_read")]
        not_to_read: bool,

        /// Note to add
        #[arg(short, long)]
        note: Option<String>,

        /// Tags to use if the bookmark doesn't exist
        #[arg(short = 'g', long = "tag")]
        tags: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum TagCommands {
    /// Rename a tag across all bookmarks
    Rename {
        /// Current tag name
        old_tag: String,
        /// New tag name
        new_tag: String,
    },

    /// Delete a tag from all bookmarks
    Delete {
        /// Tag to delete
        tag: String,

        /// Delete without confirmation
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Store credentials in the keyring (prompts when no flag is given)
    Login {
        /// LinkHut personal access token
        #[arg(long)]
        token: Option<String>,

        /// LinkPreview API key
        #[arg(long)]
        preview_key: Option<String>,
    },
    /// Remove stored credentials
    Logout,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Set a configuration value
    Set {
        /// Configuration key (e.g., api.url, preview.url)
        key: String,
        /// Configuration value
        value: String,
    },
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
}

fn non_empty(tags: Vec<String>) -> Option<Vec<String>> {
    if tags.is_empty() {
        None
    } else {
        Some(tags)
    }
}

fn visibility(private: bool, public: bool) -> Option<bool> {
    match (private, public) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

fn connect(config: &Config, api_url: &str, preview_url: &str) -> Result<Bookmarks> {
    let token = config.require(Credential::LinkhutToken)?;
    let api = LinkhutClient::new(api_url, &token)?;

    let preview = match config.credential(Credential::PreviewKey)? {
        Some((key, _)) => Some(PreviewClient::new(preview_url, &key)?),
        None => None,
    };

    Ok(Bookmarks::new(api, preview))
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;
        let api_url = config.resolve_api_url(self.api_url);
        let preview_url = config.resolve_preview_url(self.preview_url);

        match self.command {
            Commands::ConfigStatus => config_status(&config),
            Commands::Bookmarks(cmd) => {
                let bookmarks = connect(&config, &api_url, &preview_url)?;
                run_bookmarks(cmd, &bookmarks).await
            }
            Commands::Tags(cmd) => {
                let bookmarks = connect(&config, &api_url, &preview_url)?;
                run_tags(cmd, &bookmarks).await
            }
            Commands::Auth(cmd) => run_auth(cmd, &config),
            Commands::Config(cmd) => match cmd {
                ConfigCommands::Set { key, value } => {
                    config.set(&key, &value)?;
                    display::success(&format!("Configuration updated: {} = {}", key, value));
                    Ok(())
                }
                ConfigCommands::Get { key } => {
                    match config.get(&key)? {
                        Some(val) => println!("{}", val),
                        None => println!("Configuration key '{}' not found", key),
                    }
                    Ok(())
                }
            },
        }
    }
}

fn config_status(config: &Config) -> Result<()> {
    println!("Configuration status:");

    for credential in [Credential::LinkhutToken, Credential::PreviewKey] {
        match config.credential(credential)? {
            Some((value, source)) => {
                display::success(&format!(
                    "{} is configured (from {})",
                    credential.label(),
                    source
                ));
                let name = match credential {
                    Credential::LinkhutToken => "Token",
                    Credential::PreviewKey => "API Key",
                };
                println!("   {}: {}", name, mask_secret(&value));
            }
            None => {
                display::negative(&format!("{} is not configured", credential.label()));
                println!(
                    "   Set {} in your .env file or run 'linkhut-cli auth login'",
                    credential.env_var()
                );
            }
        }
    }

    Ok(())
}

async fn run_bookmarks(cmd: BookmarkCommands, bookmarks: &Bookmarks) -> Result<()> {
    match cmd {
        BookmarkCommands::List {
            tag,
            count,
            date,
            url,
        } => {
            let date = date.as_deref().map(normalize_date).transpose()?;
            let query = PostQuery::from_filters(parse_tags(&tag), date, url, count);
            let posts = with_spinner("Fetching bookmarks...", bookmarks.list(&query))
                .await
                .context("Error fetching bookmarks")?;
            display::print_posts(&posts);
        }
        BookmarkCommands::Add {
            url,
            title,
            note,
            tags,
            private,
            to_read,
            no_suggest,
        } => {
            let interactive = url.is_none();
            let url = match url {
                Some(url) => url,
                None => prompts::prompt_url()?,
            };
            let title = match title {
                None if interactive => prompts::prompt_title()?,
                title => title,
            };
            let note = match note {
                None if interactive => prompts::prompt_note()?,
                note => note,
            };
            let tags = match non_empty(parse_tags(&tags)) {
                None if interactive => prompts::prompt_tags()?,
                tags => tags,
            };

            let options = CreateOptions {
                title,
                note,
                tags,
                fetch_tags: !no_suggest,
                private,
                to_read,
                replace: false,
            };
            let post = with_spinner("Saving bookmark...", bookmarks.create(&url, options))
                .await
                .context("Error creating bookmark")?;

            display::success("Bookmark created successfully!");
            println!("{}", display::format_new_post(&post));
        }
        BookmarkCommands::Update {
            url,
            tags,
            note,
            private,
            public,
        } => {
            let changes = BookmarkChanges {
                tags: non_empty(parse_tags(&tags)),
                note,
                private: visibility(private, public),
            };
            let outcome = with_spinner("Updating bookmark...", bookmarks.update(&url, changes.clone()))
                .await
                .context("Error updating bookmark")?;

            match outcome {
                Outcome::Unchanged => {
                    println!("Nothing to update. Pass --tag, --note, --private or --public.")
                }
                Outcome::Created(post) => {
                    display::success("No existing bookmark found, created a new one!");
                    println!("{}", display::format_new_post(&post));
                }
                Outcome::Updated(_) => {
                    display::success("Bookmark updated successfully!");
                    println!("  URL: {}", url);
                    if let Some(tags) = &changes.tags {
                        println!("  Updated tags: {}", tags.join(", "));
                    }
                    if changes.note.is_some() {
                        println!("  Note appended");
                    }
                    if let Some(private) = changes.private {
                        let status = if private { "Private" } else { "Public" };
                        println!("  Updated visibility: {}", status);
                    }
                }
            }
        }
        BookmarkCommands::Delete { url, force } => {
            if !force
                && !prompts::confirm(&format!(
                    "Are you sure you want to delete bookmark with URL: {}?",
                    url
                ))?
            {
                println!("Operation cancelled.");
                return Ok(());
            }

            let deleted = with_spinner("Deleting bookmark...", bookmarks.delete(&url))
                .await
                .context("Error deleting bookmark")?;
            if !deleted {
                bail!("Failed to delete bookmark. It might not exist.");
            }
            display::success("Bookmark deleted successfully!");
        }
        BookmarkCommands::ReadingList { count } => {
            let posts = with_spinner("Fetching reading list...", bookmarks.reading_list(count))
                .await
                .context("Error fetching reading list")?;
            display::print_reading_list(&posts);
        }
        BookmarkCommands::ToggleRead {
            url,
            to_read: _,
            not_to_read,
            note,
            tags,
        } => {
            let to_read = !not_to_read;
            let status = if to_read { "to-read" } else { "read" };
            let outcome = with_spinner(
                "Updating read status...",
                bookmarks.toggle_read(&url, to_read, note, non_empty(parse_tags(&tags))),
            )
            .await
            .context("Error updating read status")?;

            match outcome {
                Outcome::Unchanged => {
                    println!("Bookmark is already marked as {}. Nothing to do.", status)
                }
                Outcome::Created(_) | Outcome::Updated(_) => {
                    display::success(&format!("Bookmark marked as {}!", status));
                }
            }
        }
    }

    Ok(())
}

async fn run_tags(cmd: TagCommands, bookmarks: &Bookmarks) -> Result<()> {
    match cmd {
        TagCommands::Rename { old_tag, new_tag } => {
            let renamed = with_spinner("Renaming tag...", bookmarks.rename_tag(&old_tag, &new_tag))
                .await
                .context("Error renaming tag")?;
            if !renamed {
                bail!("Failed to rename tag '{}'.", old_tag);
            }
            display::success(&format!(
                "Tag '{}' renamed to '{}' successfully!",
                old_tag, new_tag
            ));
        }
        TagCommands::Delete { tag, force } => {
            if !force
                && !prompts::confirm(&format!(
                    "Are you sure you want to delete the tag '{}' from all bookmarks?",
                    tag
                ))?
            {
                println!("Operation cancelled.");
                return Ok(());
            }

            let deleted = with_spinner("Deleting tag...", bookmarks.delete_tag(&tag))
                .await
                .context("Error deleting tag")?;
            if !deleted {
                bail!("Failed to delete tag '{}'. It might not exist.", tag);
            }
            display::success(&format!("Tag '{}' deleted successfully!", tag));
        }
    }

    Ok(())
}

fn run_auth(cmd: AuthCommands, config: &Config) -> Result<()> {
    match cmd {
        AuthCommands::Login { token, preview_key } => {
            let (token, preview_key) = if token.is_none() && preview_key.is_none() {
                (
                    prompts::prompt_secret("LinkHut personal access token (Enter to skip):")?,
                    prompts::prompt_secret("LinkPreview API key (Enter to skip):")?,
                )
            } else {
                (token, preview_key)
            };

            if token.is_none() && preview_key.is_none() {
                bail!("No credentials given, nothing stored");
            }

            if let Some(token) = token {
                config.store_credential(Credential::LinkhutToken, &token)?;
                display::success("LinkHut API Token saved to keyring");
            }
            if let Some(key) = preview_key {
                config.store_credential(Credential::PreviewKey, &key)?;
                display::success("Link Preview API Key saved to keyring");
            }
        }
        AuthCommands::Logout => {
            config.remove_credential(Credential::LinkhutToken)?;
            config.remove_credential(Credential::PreviewKey)?;
            display::success("Stored credentials removed");
        }
    }

    Ok(())
}
