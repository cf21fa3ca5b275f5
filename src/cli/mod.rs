//! CLI module for the voxdash command-line interface.
//!
//! Provides subcommands for administering a running assistant backend:
//! - `prompt show|set` - View or change the global AI prompt
//! - `support list|browse|reply` - Work through support requests
//! - `users list|browse|suspend` - Inspect users and toggle suspension
//! - `config check` - Validate configuration file

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::client::AdminClient;
use crate::config::Config;
use crate::models::PageQuery;
use crate::presenter::{
    EditorMode, ListAction, ListItem, ListState, PromptAction, PromptEditor,
};
use crate::session::{Resource, Session};
use crate::transform::{display_name, FrontendUser, SupportRow};
use crate::ui::{self, PromptCard, SupportDetail, SupportTable, UserDetail, UsersTable};

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "voxdash")]
#[command(author, version, about = "Admin console for the voice assistant backend", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "voxdash.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Admin API base URL (overrides api.base_url)
    #[arg(long, env = "VOXDASH_API_URL")]
    pub api_url: Option<String>,

    /// Bearer token for the admin API (can also be set via VOXDASH_TOKEN env var)
    #[arg(long, env = "VOXDASH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.api_url {
            config.api.base_url = url.clone();
        }
        if let Some(token) = &self.token {
            config.api.token = Some(token.clone());
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Global AI prompt commands
    #[command(subcommand)]
    Prompt(PromptCommands),

    /// Support request commands
    #[command(subcommand)]
    Support(SupportCommands),

    /// User management commands
    #[command(subcommand)]
    Users(UsersCommands),

    /// Configuration management commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Prompt subcommands
#[derive(Subcommand, Debug)]
pub enum PromptCommands {
    /// Show the current prompt
    Show,
    /// Create or replace the prompt
    Set {
        /// New prompt text
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        text: Option<String>,
        /// Read the prompt text from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Support subcommands
#[derive(Subcommand, Debug)]
pub enum SupportCommands {
    /// List one page of support requests
    List(ListArgs),
    /// Page through support requests interactively
    Browse(ListArgs),
    /// Print a pre-filled reply link for a requester
    Reply {
        /// Requester e-mail address
        email: String,
        /// Name used in the greeting (default: derived from the address)
        #[arg(long)]
        name: Option<String>,
        /// Open the link in the default browser
        #[arg(long)]
        open: bool,
    },
}

/// Users subcommands
#[derive(Subcommand, Debug)]
pub enum UsersCommands {
    /// List one page of users
    List(ListArgs),
    /// Page through users interactively
    Browse(ListArgs),
    /// Suspend an active user, or reinstate a suspended one
    Suspend {
        /// User ID
        id: String,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration file
    Check,
}

/// Paging and search options shared by list commands
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Page number (starting at 1)
    #[arg(long)]
    pub page: Option<u32>,
    /// Rows per page (default: display.page_size)
    #[arg(long)]
    pub limit: Option<u32>,
    /// Only show rows on the page containing this text
    #[arg(short, long)]
    pub search: Option<String>,
}

impl ListArgs {
    fn query(&self, config: &Config) -> Result<PageQuery> {
        PageQuery::new(self.page, Some(self.limit.unwrap_or(config.display.page_size)))
            .map_err(anyhow::Error::msg)
    }
}

// ============================================================================
// Interactive browsing
// ============================================================================

/// One line of input in browse mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Next,
    Prev,
    Jump(u32),
    /// Filter the loaded page; empty text clears the filter
    Search(String),
    /// Select a row by its 1-based position in the table
    Select(usize),
    /// Show the selected row in full
    Show,
    /// Run the row action (reply link or suspension toggle)
    Act,
    Refresh,
    Help,
    Quit,
}

/// Parse a browse-mode input line. Blank lines yield `None`.
pub fn parse_browse_command(line: &str) -> Result<Option<BrowseCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if let Some(text) = line.strip_prefix('/') {
        return Ok(Some(BrowseCommand::Search(text.trim().to_string())));
    }

    let (word, arg) = match line.split_once(char::is_whitespace) {
        Some((word, arg)) => (word, Some(arg.trim())),
        None => (line, None),
    };
    let positive = |what: &str| -> Result<u32, String> {
        let raw = arg.ok_or_else(|| format!("Usage: {} <N>", what))?;
        match raw.parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(format!("Not a positive number: {}", raw)),
        }
    };

    let command = match word {
        "n" | "next" => BrowseCommand::Next,
        "p" | "prev" => BrowseCommand::Prev,
        "g" | "goto" => BrowseCommand::Jump(positive(word)?),
        "s" | "select" => BrowseCommand::Select(positive(word)? as usize),
        "v" | "view" => BrowseCommand::Show,
        "a" | "act" => BrowseCommand::Act,
        "r" | "refresh" => BrowseCommand::Refresh,
        "h" | "help" | "?" => BrowseCommand::Help,
        "q" | "quit" | "exit" => BrowseCommand::Quit,
        other => return Err(format!("Unknown command: {} (type 'h' for help)", other)),
    };
    Ok(Some(command))
}

/// What the browse-mode row action does for a resource
enum RowAction {
    Mutate(String),
    Print(String),
}

/// Rendering and row action for a resource that can be browsed
trait Browsable: Resource {
    const NOUN: &'static str;
    const ACTION_HELP: &'static str;

    fn table(state: &ListState<Self>, color: bool) -> String;
    fn detail(&self, color: bool) -> String;
    fn action(&self, config: &Config) -> RowAction;
}

impl Browsable for SupportRow {
    const NOUN: &'static str = "support";
    const ACTION_HELP: &'static str = "print a reply link for the selected request";

    fn table(state: &ListState<Self>, color: bool) -> String {
        SupportTable::new(state, color).to_string()
    }

    fn detail(&self, color: bool) -> String {
        SupportDetail::new(self, color).to_string()
    }

    fn action(&self, config: &Config) -> RowAction {
        match ui::compose_link(&config.mail, &self.email, &self.name) {
            Ok(url) => RowAction::Print(format!("Reply to {}:\n  {}", self.email, url)),
            Err(e) => RowAction::Print(format!("[!!] {}", e)),
        }
    }
}

impl Browsable for FrontendUser {
    const NOUN: &'static str = "users";
    const ACTION_HELP: &'static str = "suspend or reinstate the selected user";

    fn table(state: &ListState<Self>, color: bool) -> String {
        UsersTable::new(state, color).to_string()
    }

    fn detail(&self, color: bool) -> String {
        UserDetail::new(self, color).to_string()
    }

    fn action(&self, _config: &Config) -> RowAction {
        RowAction::Mutate(self.id.clone())
    }
}

fn selected<T: ListItem>(state: &ListState<T>) -> Option<&T> {
    state.visible().get(state.scroll()).copied()
}

fn print_browse_help<T: Browsable>() {
    println!("Commands:");
    println!("  n / p        next / previous page");
    println!("  g <N>        go to page N");
    println!("  / <text>     filter this page (empty clears)");
    println!("  s <N>        select row N");
    println!("  v            view selected row");
    println!("  a            {}", T::ACTION_HELP);
    println!("  r            refresh (retry after an error)");
    println!("  q            quit");
}

async fn browse<T: Browsable>(
    session: &mut Session<AdminClient>,
    config: &Config,
    args: &ListArgs,
) -> Result<()> {
    let color = ui::stdout_supports_color();
    let mut state = ListState::new(args.query(config)?);
    session.run_list(&mut state, ListAction::Load).await;
    if let Some(search) = &args.search {
        state.update(ListAction::Search(search.clone()));
    }
    println!("{}", T::table(&state, color));
    print_browse_help::<T>();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}> ", T::NOUN);
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read input")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            break;
        };

        let command = match parse_browse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        let action = match command {
            BrowseCommand::Quit => break,
            BrowseCommand::Help => {
                print_browse_help::<T>();
                continue;
            }
            BrowseCommand::Next if !state.can_next() => {
                println!("Already on the last page.");
                continue;
            }
            BrowseCommand::Prev if !state.can_prev() => {
                println!("Already on the first page.");
                continue;
            }
            BrowseCommand::Next => ListAction::Next,
            BrowseCommand::Prev => ListAction::Prev,
            BrowseCommand::Jump(page) => {
                let total_pages = state.meta().map(|m| m.total_pages).unwrap_or(0);
                if page > total_pages {
                    println!("There are only {} pages.", total_pages);
                    continue;
                }
                ListAction::JumpTo(page)
            }
            BrowseCommand::Search(text) => ListAction::Search(text),
            BrowseCommand::Select(row) => ListAction::Scroll(row - 1),
            BrowseCommand::Refresh => ListAction::Refresh,
            BrowseCommand::Show => {
                match selected(&state) {
                    Some(item) => println!("{}", item.detail(color)),
                    None => println!("No row selected."),
                }
                continue;
            }
            BrowseCommand::Act => match selected(&state).map(|item| item.action(config)) {
                Some(RowAction::Mutate(item_id)) => ListAction::Mutate { item_id },
                Some(RowAction::Print(text)) => {
                    println!("{}", text);
                    continue;
                }
                None => {
                    println!("No row selected.");
                    continue;
                }
            },
        };

        session.run_list(&mut state, action).await;
        println!("{}", T::table(&state, color));
    }
    Ok(())
}

// ============================================================================
// CLI Command Handlers
// ============================================================================

/// Create an API session from the effective configuration
fn create_session(config: &Config) -> Result<Session<AdminClient>> {
    let client = AdminClient::from_config(&config.api).context("Failed to create API client")?;
    Ok(Session::new(client, config.cache.ttl()))
}

/// Run a CLI command
pub async fn run_command(cli: &Cli, config: &Config) -> Result<()> {
    match &cli.command {
        Commands::Prompt(PromptCommands::Show) => cmd_prompt_show(config).await,
        Commands::Prompt(PromptCommands::Set { text, file }) => {
            let text = match (text, file) {
                (Some(text), _) => text.clone(),
                (None, Some(path)) => tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read prompt file: {}", path.display()))?,
                (None, None) => anyhow::bail!("Provide the prompt text or --file"),
            };
            cmd_prompt_set(config, &text).await
        }
        Commands::Support(SupportCommands::List(args)) => {
            cmd_list::<SupportRow>(config, args).await
        }
        Commands::Support(SupportCommands::Browse(args)) => {
            let mut session = create_session(config)?;
            browse::<SupportRow>(&mut session, config, args).await
        }
        Commands::Support(SupportCommands::Reply { email, name, open }) => {
            cmd_support_reply(config, email, name.as_deref(), *open).await
        }
        Commands::Users(UsersCommands::List(args)) => {
            cmd_list::<FrontendUser>(config, args).await
        }
        Commands::Users(UsersCommands::Browse(args)) => {
            let mut session = create_session(config)?;
            browse::<FrontendUser>(&mut session, config, args).await
        }
        Commands::Users(UsersCommands::Suspend { id }) => cmd_users_suspend(config, id).await,
        Commands::Config(ConfigCommands::Check) => cmd_config_check(&cli.config),
    }
}

/// Load the prompt into a fresh editor, failing if the load failed
async fn load_prompt(session: &mut Session<AdminClient>) -> Result<PromptEditor> {
    let mut editor = PromptEditor::new();
    session.run_prompt(&mut editor, PromptAction::Load).await;
    if let Some(error) = editor.load_error() {
        anyhow::bail!("Failed to load prompt: {}", error);
    }
    Ok(editor)
}

/// Display the current prompt
async fn cmd_prompt_show(config: &Config) -> Result<()> {
    let mut session = create_session(config)?;
    let editor = load_prompt(&mut session).await?;
    println!();
    print!("{}", PromptCard::new(&editor));
    println!();
    Ok(())
}

/// Create or update the prompt
async fn cmd_prompt_set(config: &Config, text: &str) -> Result<()> {
    let mut session = create_session(config)?;
    let mut editor = load_prompt(&mut session).await?;

    let creating = editor.is_first_run();
    if editor.mode() == EditorMode::Viewing {
        editor.update(PromptAction::Edit);
    }
    editor.update(PromptAction::Input(text.trim().to_string()));
    // Same rule the editor uses to skip the request
    let unchanged = editor.is_unchanged();
    session.run_prompt(&mut editor, PromptAction::Save).await;

    if let Some(error) = editor.validation_error() {
        anyhow::bail!("{}", error);
    }
    if let Some(error) = editor.save_error() {
        anyhow::bail!("Failed to save prompt: {}", error);
    }

    println!();
    if unchanged {
        println!("Prompt unchanged; nothing to save.");
    } else if creating {
        println!("[OK] Prompt created!");
    } else {
        println!("[OK] Prompt updated!");
    }
    println!();
    print!("{}", PromptCard::new(&editor));
    println!();
    Ok(())
}

/// Print one page of a resource
async fn cmd_list<T: Browsable>(config: &Config, args: &ListArgs) -> Result<()> {
    let mut session = create_session(config)?;
    let mut state = ListState::new(args.query(config)?);
    session.run_list(&mut state, ListAction::Load).await;
    if let Some(error) = state.error() {
        anyhow::bail!("Failed to load {}: {}", T::NOUN, error);
    }
    if let Some(search) = &args.search {
        state.update(ListAction::Search(search.clone()));
    }

    println!();
    print!("{}", T::table(&state, ui::stdout_supports_color()));
    println!();
    Ok(())
}

/// Print (and optionally open) a reply link
async fn cmd_support_reply(config: &Config, email: &str, name: Option<&str>, open: bool) -> Result<()> {
    let name = name
        .map(str::to_string)
        .unwrap_or_else(|| display_name(None, email));
    let url = ui::compose_link(&config.mail, email, &name).map_err(anyhow::Error::msg)?;

    println!("{}", url);
    if open {
        open_in_browser(url.as_str()).await?;
    }
    Ok(())
}

/// Toggle a user's suspension
async fn cmd_users_suspend(config: &Config, id: &str) -> Result<()> {
    let mut session = create_session(config)?;
    let user = session
        .toggle_suspension(id)
        .await
        .with_context(|| format!("Failed to toggle suspension for user {}", id))?;

    println!();
    println!("[OK] {} ({}) is now {}.", user.name, user.email, user.status);
    println!();
    Ok(())
}

/// Hand a URL to the platform's default opener
async fn open_in_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    let mut command = tokio::process::Command::new("open");

    #[cfg(target_os = "windows")]
    let mut command = {
        let mut command = tokio::process::Command::new("cmd");
        command.args(["/C", "start", ""]);
        command
    };

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let mut command = tokio::process::Command::new("xdg-open");

    let status = command
        .arg(url)
        .status()
        .await
        .context("Failed to launch the default browser")?;
    if !status.success() {
        anyhow::bail!("Browser opener exited with {}", status);
    }
    Ok(())
}

/// Validate configuration file
pub fn cmd_config_check(config_path: &Path) -> Result<()> {
    println!("Checking configuration file: {}", config_path.display());
    println!();

    if !config_path.exists() {
        println!(
            "[!!] Configuration file not found: {}",
            config_path.display()
        );
        println!();
        println!("Defaults will be used. To customize, copy voxdash.example.toml to voxdash.toml");
        return Ok(());
    }

    match Config::load(config_path) {
        Ok(config) => {
            println!("[OK] Configuration file is valid!");
            println!();
            println!("=== Configuration Summary ===");
            println!();
            println!("API:");
            println!("  Base URL:     {}", config.api.base_url);
            println!(
                "  Token:        {}",
                if config.api.token.is_some() {
                    "Set"
                } else {
                    "Not set"
                }
            );
            println!("  Timeout:      {}s", config.api.timeout_secs);
            println!();
            println!("Display:");
            println!("  Page Size:    {}", config.display.page_size);
            println!("  Cache TTL:    {}s", config.cache.ttl_secs);
            println!("  Log Level:    {}", config.logging.level);
            println!();
            println!("Mail:");
            println!("  Compose URL:  {}", config.mail.compose_url);
            println!("  Subject:      {}", config.mail.subject);
            println!();
            Ok(())
        }
        Err(e) => {
            println!("[!!] Configuration file is invalid!");
            println!();
            println!("Error: {:#}", e);
            println!();
            anyhow::bail!("Configuration validation failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_navigation() {
        assert_eq!(parse_browse_command("n"), Ok(Some(BrowseCommand::Next)));
        assert_eq!(parse_browse_command(" prev "), Ok(Some(BrowseCommand::Prev)));
        assert_eq!(parse_browse_command("g 4"), Ok(Some(BrowseCommand::Jump(4))));
        assert_eq!(parse_browse_command("s 2"), Ok(Some(BrowseCommand::Select(2))));
        assert_eq!(parse_browse_command("r"), Ok(Some(BrowseCommand::Refresh)));
        assert_eq!(parse_browse_command("q"), Ok(Some(BrowseCommand::Quit)));
        assert_eq!(parse_browse_command(""), Ok(None));
    }

    #[test]
    fn test_parse_search() {
        assert_eq!(
            parse_browse_command("/ ada lovelace "),
            Ok(Some(BrowseCommand::Search("ada lovelace".to_string())))
        );
        assert_eq!(
            parse_browse_command("/premium"),
            Ok(Some(BrowseCommand::Search("premium".to_string())))
        );
        // A bare slash clears the filter
        assert_eq!(
            parse_browse_command("/"),
            Ok(Some(BrowseCommand::Search(String::new())))
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_browse_command("g").is_err());
        assert!(parse_browse_command("g 0").is_err());
        assert!(parse_browse_command("g two").is_err());
        assert!(parse_browse_command("s -1").is_err());
        assert!(parse_browse_command("dance").is_err());
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["voxdash", "users", "list", "--page", "2", "-s", "ada"]).unwrap();
        match cli.command {
            Commands::Users(UsersCommands::List(args)) => {
                assert_eq!(args.page, Some(2));
                assert_eq!(args.search.as_deref(), Some("ada"));
            }
            other => panic!("unexpected command: {:?}", other),
        }

        assert!(Cli::try_parse_from(["voxdash", "prompt", "set"]).is_err());
        assert!(Cli::try_parse_from(["voxdash", "prompt", "set", "hi", "--file", "p.txt"]).is_err());
    }

    #[test]
    fn test_overrides_apply_to_config() {
        let cli = Cli::try_parse_from([
            "voxdash",
            "--api-url",
            "https://admin.example.com",
            "--token",
            "secret",
            "--log-level",
            "debug",
            "config",
            "check",
        ])
        .unwrap();
        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.api.base_url, "https://admin.example.com");
        assert_eq!(config.api.token.as_deref(), Some("secret"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_list_args_fall_back_to_page_size() {
        let mut config = Config::default();
        config.display.page_size = 25;
        let query = ListArgs::default().query(&config).unwrap();
        assert_eq!(query, PageQuery { page: 1, limit: 25 });

        let args = ListArgs {
            page: Some(0),
            ..ListArgs::default()
        };
        assert!(args.query(&config).is_err());
    }
}
