use colored::Colorize;
use ctrlscan::commands::command_argument_builder;
use ctrlscan::handlers::{
    AppContext, expand_path, handle_add, handle_init, handle_list, handle_menu, handle_scan,
    handle_sessions,
};
use ctrlscan_core::config::DEFAULT_CONFIG_DIR;
use ctrlscan_core::print_banner;
use tracing::Level;

fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    init_tracing(chosen_command.get_flag("verbose"));

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    let Some((name, primary_command)) = chosen_command.subcommand() else {
        return;
    };

    let config_dir = expand_path(
        chosen_command
            .get_one::<String>("config-dir")
            .map(String::as_str)
            .unwrap_or(DEFAULT_CONFIG_DIR),
    );

    let result = if name == "init" {
        handle_init(primary_command, &config_dir)
    } else {
        AppContext::load(config_dir).and_then(|ctx| match name {
            "scan" => handle_scan(primary_command, &ctx),
            "add" => handle_add(primary_command, &ctx),
            "list" => handle_list(primary_command, &ctx),
            "sessions" => handle_sessions(&ctx),
            "menu" => handle_menu(&ctx),
            _ => unreachable!("clap should ensure we don't get here"),
        })
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}
