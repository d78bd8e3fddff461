// Interactive console menu

use anyhow::Result;
use colored::Colorize;
use ctrlscan_core::catalog::ScanOptions;
use ctrlscan_core::data::Database;
use ctrlscan_core::manual::{ManualEntry, add_manual_entry};
use ctrlscan_core::report::{CatalogReport, ReportFormat};
use ctrlscan_core::CatalogError;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::handlers::{expand_path, format_scan_summary, scan_with_session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Scan,
    Manual,
    List,
    Exit,
    Invalid,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            "1" => MenuChoice::Scan,
            "2" => MenuChoice::Manual,
            "3" => MenuChoice::List,
            "4" => MenuChoice::Exit,
            _ => MenuChoice::Invalid,
        }
    }
}

/// Read-eval loop over a line source. Runs until the user exits or input ends.
pub struct Menu<'a, R, W> {
    db: &'a mut Database,
    options: ScanOptions,
    default_root: Option<PathBuf>,
    show_progress: bool,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(db: &'a mut Database, options: ScanOptions, input: R, output: W) -> Self {
        Self {
            db,
            options,
            default_root: None,
            show_progress: false,
            input,
            output,
        }
    }

    /// Root used when the user answers the root prompt with an empty line
    pub fn with_default_root(mut self, root: Option<PathBuf>) -> Self {
        self.default_root = root;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.output)?;
            writeln!(self.output, "1. Automatic Scan")?;
            writeln!(self.output, "2. Manual Entry")?;
            writeln!(self.output, "3. List Catalog")?;
            writeln!(self.output, "4. Exit")?;

            let Some(choice) = self.prompt("Choose:")? else {
                break;
            };

            match MenuChoice::parse(&choice) {
                MenuChoice::Scan => self.scan()?,
                MenuChoice::Manual => self.manual()?,
                MenuChoice::List => self.list()?,
                MenuChoice::Exit => break,
                MenuChoice::Invalid => writeln!(self.output, "{}", "Error".red().bold())?,
            }
        }
        Ok(())
    }

    /// None once the input is exhausted
    fn prompt(&mut self, message: &str) -> Result<Option<String>> {
        write!(self.output, "{} ", message)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn scan(&mut self) -> Result<()> {
        let message = match self.default_root {
            Some(ref root) => format!("Root directory [{}]:", root.display()),
            None => "Root directory:".to_string(),
        };
        let Some(answer) = self.prompt(&message)? else {
            return Ok(());
        };

        let root = if answer.is_empty() {
            match self.default_root.clone() {
                Some(root) => root,
                None => {
                    writeln!(self.output, "{} No root directory given", "✗".red().bold())?;
                    return Ok(());
                }
            }
        } else {
            expand_path(&answer)
        };

        match scan_with_session(&mut *self.db, &root, self.options.clone(), self.show_progress) {
            Ok(summary) => write!(self.output, "{}", format_scan_summary(&summary))?,
            Err(CatalogError::RootNotFound(path)) => {
                writeln!(self.output, "{} Not Found => {}", "✗".red().bold(), path.display())?
            }
            Err(e) => writeln!(self.output, "{} Scan failed: {}", "✗".red().bold(), e)?,
        }
        Ok(())
    }

    fn manual(&mut self) -> Result<()> {
        let Some(folder) = self.prompt("Folder name:")? else {
            return Ok(());
        };
        let Some(controller) = self.prompt("Controller name:")? else {
            return Ok(());
        };

        let mut entries = Vec::new();
        loop {
            let Some(url) = self.prompt("API (empty to finish):")? else {
                break;
            };
            if url.is_empty() {
                break;
            }
            let redirect = self.prompt("Redirect (empty for none):")?.unwrap_or_default();
            entries.push(ManualEntry::new(url, redirect));
        }

        match add_manual_entry(&mut *self.db, &folder, &controller, &entries) {
            Ok(outcome) => writeln!(
                self.output,
                "{} Information added successfully: {} added, {} skipped",
                "✓".green().bold(),
                outcome.added,
                outcome.skipped
            )?,
            Err(e) => writeln!(self.output, "{} {}", "✗".red().bold(), e)?,
        }
        Ok(())
    }

    fn list(&mut self) -> Result<()> {
        let report = CatalogReport::from_store(&*self.db)?;
        write!(self.output, "{}", report.render(ReportFormat::Text)?)?;
        Ok(())
    }
}
