pub mod commands;
pub mod handlers;
pub mod menu;

pub use handlers::{
    AppContext, ScanOverrides, build_scan_options, expand_path, format_scan_summary,
    resolve_scan_root, run_scan, scan_with_session,
};
pub use menu::{Menu, MenuChoice};
