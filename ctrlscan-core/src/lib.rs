use colored::Colorize;

pub mod catalog;
pub mod config;
pub mod data;
pub mod error;
pub mod manual;
pub mod model;
pub mod report;
pub mod store;

pub use catalog::{CatalogBuilder, PersistMode, RedirectPolicy, ScanOptions, ScanSummary};
pub use error::{CatalogError, Result};
pub use store::{CatalogStore, MemoryStore};

pub fn print_banner() {
    let banner = r#"
   ___ _        _
  / __| |_ _ _| |___ __ __ _ _ _
 | (__|  _| '_| (_-</ _/ _` | ' \
  \___|\__|_| |_/__/\__\__,_|_||_|
"#;
    println!("{}", banner.bright_cyan().bold());
    println!(
        "  {} {}\n",
        "controller endpoint catalog".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
}
