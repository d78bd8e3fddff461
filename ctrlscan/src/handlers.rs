use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use ctrlscan_core::catalog::{PersistMode, RedirectPolicy, ScanOptions, ScanSummary};
use ctrlscan_core::config::{CONFIG_FILE_NAME, Config, DATABASE_FILE_NAME};
use ctrlscan_core::data::Database;
use ctrlscan_core::manual::{ManualEntry, add_manual_entry};
use ctrlscan_core::report::{CatalogReport, ReportFormat};
use ctrlscan_core::{CatalogBuilder, CatalogError, CatalogStore, MemoryStore};
use ctrlscan_scanner::CaseMode;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::menu::Menu;

/// Expand a leading `~` in a user supplied path
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Loaded configuration plus the directory it came from
pub struct AppContext {
    pub config_dir: PathBuf,
    pub config: Config,
}

impl AppContext {
    pub fn load(config_dir: PathBuf) -> Result<Self> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let config = Config::load(&config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?;
        Ok(Self { config_dir, config })
    }

    pub fn database_path(&self) -> PathBuf {
        self.config_dir.join(DATABASE_FILE_NAME)
    }

    pub fn open_database(&self) -> Result<Database> {
        let db_path = self.database_path();
        if !Database::exists(&db_path) {
            bail!(
                "No database at {}. Run `ctrlscan init` first.",
                db_path.display()
            );
        }
        Database::new(&db_path).with_context(|| format!("Failed to open {}", db_path.display()))
    }
}

/// Command-line values that take precedence over config.toml
#[derive(Debug, Clone, Default)]
pub struct ScanOverrides {
    pub directive_root: Option<PathBuf>,
    pub file_suffix: Option<String>,
    pub batched: bool,
    pub lowercase_directives: bool,
    pub redirect_policy: Option<RedirectPolicy>,
}

impl ScanOverrides {
    pub fn from_matches(args: &ArgMatches) -> Self {
        Self {
            directive_root: args
                .get_one::<String>("directive-root")
                .map(|p| expand_path(p)),
            file_suffix: args.get_one::<String>("suffix").cloned(),
            batched: args.get_flag("batch"),
            lowercase_directives: args.get_flag("lowercase-directives"),
            redirect_policy: args
                .get_one::<String>("redirect-policy")
                .and_then(|p| RedirectPolicy::from_str(p)),
        }
    }
}

pub fn build_scan_options(config: &Config, overrides: &ScanOverrides) -> ScanOptions {
    let mut options = config.scan_options();
    options.directive_root = options
        .directive_root
        .map(|p| expand_path(&p.to_string_lossy()));

    if let Some(ref dir) = overrides.directive_root {
        options.directive_root = Some(dir.clone());
    }
    if let Some(ref suffix) = overrides.file_suffix {
        options.file_suffix = suffix.clone();
    }
    if let Some(policy) = overrides.redirect_policy {
        options.redirect_policy = policy;
    }
    if overrides.batched {
        options.persist_mode = PersistMode::Batched;
    }
    if overrides.lowercase_directives {
        options.directive_case = CaseMode::Lowercase;
    }
    options
}

/// The root given on the command line, else the one in config.toml
pub fn resolve_scan_root(arg: Option<&str>, config: &Config) -> Result<PathBuf> {
    arg.map(expand_path)
        .or_else(|| {
            config
                .scan
                .root
                .as_ref()
                .map(|p| expand_path(&p.to_string_lossy()))
        })
        .context("No scan root given and none set in config.toml")
}

fn scan_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message("Starting scan...");
    spinner
}

/// Run the catalog builder, optionally behind a spinner
pub fn run_scan<S: CatalogStore + ?Sized>(
    store: &mut S,
    root: &Path,
    options: ScanOptions,
    show_progress: bool,
) -> Result<ScanSummary, CatalogError> {
    let spinner = show_progress.then(scan_spinner);

    let mut builder = CatalogBuilder::new(store, options);
    if let Some(ref pb) = spinner {
        let pb = pb.clone();
        builder = builder.with_progress_callback(Arc::new(move |path: &Path| {
            pb.set_message(format!("Scanning {}", path.display()));
        }));
    }

    let result = builder.scan(root);

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    result
}

/// Scan into the database, recording a scan session around the run.
/// A missing root is reported before anything is written.
pub fn scan_with_session(
    db: &mut Database,
    root: &Path,
    options: ScanOptions,
    show_progress: bool,
) -> Result<ScanSummary, CatalogError> {
    if !root.is_dir() {
        return Err(CatalogError::RootNotFound(root.to_path_buf()));
    }

    let session_id = db.create_session(&root.display().to_string())?;
    match run_scan(&mut *db, root, options, show_progress) {
        Ok(summary) => {
            db.complete_session(&session_id, summary.files_scanned, summary.endpoints_added)?;
            Ok(summary)
        }
        Err(e) => {
            if let Err(fail) = db.fail_session(&session_id) {
                warn!("Could not mark session {} failed: {}", session_id, fail);
            }
            Err(e)
        }
    }
}

pub fn format_scan_summary(summary: &ScanSummary) -> String {
    let mut out = String::new();

    for page in &summary.pages {
        out.push_str(&format!("Folder: {}\n", page.page.folder_name.bright_white()));
        out.push_str(&format!("Controller: {}\n", page.page.controller_name.bright_white()));
        out.push_str("APIs:\n");
        for endpoint in &page.endpoints {
            let marker = if endpoint.added { "+".green().bold() } else { "-".normal() };
            out.push_str(&format!(
                "  {} {} (Redirect: {})\n",
                marker, endpoint.url, endpoint.redirect
            ));
        }
        for skipped in &page.skipped_directives {
            out.push_str(&format!(
                "  {} directive skipped: {}\n",
                "⚠".yellow(),
                skipped.path.display()
            ));
        }
    }

    out.push('\n');
    out.push_str(&format!("{} Scan complete\n", "✓".green().bold()));
    out.push_str(&format!("  Files scanned:      {}\n", summary.files_scanned));
    out.push_str(&format!("  Pages created:      {}\n", summary.pages_created));
    out.push_str(&format!("  Endpoints added:    {}\n", summary.endpoints_added));
    out.push_str(&format!(
        "  Directives skipped: {}\n",
        summary.skipped_directives().count()
    ));
    if summary.directive_root_unresolved() {
        out.push_str(&format!(
            "  {} No directive file could be read. Pass --directive-root <web root> \
             (the directory directive references are relative to).\n",
            "⚠".yellow()
        ));
    }
    out
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn print_prompt(msg: &str) -> String {
    print!("{} ", msg.bright_cyan().bold());
    let _ = io::stdout().flush();
    let mut response = String::new();
    if io::stdin().read_line(&mut response).is_err() {
        return String::new();
    }
    response.trim().to_lowercase()
}

pub fn handle_init(args: &ArgMatches, config_dir: &Path) -> Result<()> {
    print_divider();
    println!("{}", "  CTRLSCAN INITIALIZATION".bright_white().bold());
    print_divider();
    println!();

    let force = args.get_flag("force");
    let db_path = config_dir.join(DATABASE_FILE_NAME);
    let config_path = config_dir.join(CONFIG_FILE_NAME);

    println!(
        "{} Target: {}",
        "→".blue(),
        config_dir.display().to_string().bright_white()
    );
    println!();

    if config_dir.exists() && !force {
        println!("{}", "⚠ WARNING".yellow().bold());
        println!("Configuration directory already exists:");
        println!(
            "  {} {}",
            "•".yellow(),
            config_dir.display().to_string().bright_white()
        );
        println!();

        let response = print_prompt("Do you want to continue? [y/N]:");
        println!();

        if response != "y" && response != "yes" {
            println!("{} Initialization cancelled.", "✗".red().bold());
            return Ok(());
        }
    }

    fs::create_dir_all(config_dir)
        .with_context(|| format!("Failed to create {}", config_dir.display()))?;

    if force && Database::exists(&db_path) {
        println!(
            "{} Deleting existing database (force mode)",
            "→".yellow().bold()
        );
        Database::drop(&db_path)
            .with_context(|| format!("Failed to remove {}", db_path.display()))?;
    }

    if force || !config_path.exists() {
        Config::default()
            .save(&config_path)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        println!(
            "{} Config written: {}",
            "✓".green().bold(),
            config_path.display().to_string().bright_white()
        );
    }

    Database::new(&db_path).with_context(|| format!("Failed to create {}", db_path.display()))?;
    println!(
        "{} Database initialized: {}",
        "✓".green().bold(),
        db_path.display().to_string().bright_white()
    );

    println!();
    print_divider();
    println!("{}", "  INITIALIZATION COMPLETE".green().bold());
    print_divider();
    println!();
    Ok(())
}

pub fn handle_scan(args: &ArgMatches, ctx: &AppContext) -> Result<()> {
    let root = resolve_scan_root(
        args.get_one::<String>("ROOT").map(String::as_str),
        &ctx.config,
    )?;
    let options = build_scan_options(&ctx.config, &ScanOverrides::from_matches(args));
    let dry_run = args.get_flag("dry-run");

    println!(
        "{} Scanning {}{}",
        "→".blue(),
        root.display().to_string().bright_white(),
        if dry_run { " (dry run)" } else { "" }
    );

    let summary = if dry_run {
        let mut store = MemoryStore::new();
        run_scan(&mut store, &root, options, true)?
    } else {
        let mut db = ctx.open_database()?;
        scan_with_session(&mut db, &root, options, true)?
    };

    print!("{}", format_scan_summary(&summary));
    Ok(())
}

pub fn handle_add(args: &ArgMatches, ctx: &AppContext) -> Result<()> {
    let folder = args
        .get_one::<String>("folder")
        .context("--folder is required")?;
    let controller = args
        .get_one::<String>("controller")
        .context("--controller is required")?;
    let redirect = args
        .get_one::<String>("redirect")
        .cloned()
        .unwrap_or_default();

    let entries: Vec<ManualEntry> = args
        .get_many::<String>("url")
        .into_iter()
        .flatten()
        .map(|url| ManualEntry::new(url.as_str(), redirect.as_str()))
        .collect();

    let mut db = ctx.open_database()?;
    let outcome = add_manual_entry(&mut db, folder, controller, &entries)?;

    println!(
        "{} {}/{}: {} added, {} skipped",
        "✓".green().bold(),
        outcome.page.folder_name,
        outcome.page.controller_name,
        outcome.added,
        outcome.skipped
    );
    Ok(())
}

pub fn handle_list(args: &ArgMatches, ctx: &AppContext) -> Result<()> {
    let format_name = args
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("text");
    let format = ReportFormat::from_str(format_name)
        .with_context(|| format!("Unknown report format '{}'", format_name))?;

    let db = ctx.open_database()?;
    let report = CatalogReport::from_store(&db)?;

    match args.get_one::<PathBuf>("output") {
        Some(path) => {
            report.write_to(path, format)?;
            println!(
                "{} Report saved: {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
        None => print!("{}", report.render(format)?),
    }
    Ok(())
}

pub fn handle_sessions(ctx: &AppContext) -> Result<()> {
    let db = ctx.open_database()?;
    let sessions = db.get_sessions()?;

    if sessions.is_empty() {
        println!("No scans recorded yet.");
        return Ok(());
    }

    for session in sessions {
        let started = chrono::DateTime::<chrono::Utc>::from_timestamp(session.start_time, 0)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| session.start_time.to_string());
        println!(
            "{}  {}  {:<9}  files: {:<5} added: {:<5} {}",
            &session.id[..8.min(session.id.len())],
            started,
            session.status.as_str(),
            session.files_scanned,
            session.endpoints_added,
            session.root
        );
    }
    Ok(())
}

pub fn handle_menu(ctx: &AppContext) -> Result<()> {
    let mut db = ctx.open_database()?;
    let options = build_scan_options(&ctx.config, &ScanOverrides::default());
    let default_root = ctx
        .config
        .scan
        .root
        .as_ref()
        .map(|p| expand_path(&p.to_string_lossy()));

    let stdin = io::stdin();
    Menu::new(&mut db, options, stdin.lock(), io::stdout())
        .with_default_root(default_root)
        .with_progress(true)
        .run()
}
