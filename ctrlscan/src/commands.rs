use clap::{arg, command};
use ctrlscan_core::config::DEFAULT_CONFIG_DIR;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("ctrlscan")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("ctrlscan")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner and non-essential output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-v --"verbose" "Log scan progress to stderr")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-c --"config-dir" <DIR>)
                .required(false)
                .help("Directory holding config.toml and the catalog database")
                .default_value(DEFAULT_CONFIG_DIR)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Creates the config directory, config.toml and the catalog database")
                .arg(
                    arg!(-f - -"force")
                        .help(
                            "Overwrites any existing config and database in the config \
                        directory.",
                        )
                        .required(false),
                ),
        )
        .subcommand(
            command!("scan")
                .about("Scans a directory tree of controller files into the catalog")
                .arg(
                    arg!([ROOT])
                        .required(false)
                        .help("Root directory to scan (default: scan.root from config.toml)"),
                )
                .arg(
                    arg!(-d --"directive-root" <PATH>)
                        .required(false)
                        .help("Base directory directive references resolve against (default: ROOT)"),
                )
                .arg(
                    arg!(-s --"suffix" <SUFFIX>)
                        .required(false)
                        .help("File name suffix of controller files (default: controller.js)"),
                )
                .arg(
                    arg!(-r --"redirect-policy" <POLICY>)
                        .required(false)
                        .help("How redirects attach to endpoints: first, nearest")
                        .value_parser(["first", "nearest"]),
                )
                .arg(
                    arg!(--"batch")
                        .required(false)
                        .help("Write all new endpoints in one transaction at the end of the scan")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"lowercase-directives")
                        .required(false)
                        .help("Lowercase endpoints read from directive files")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"dry-run")
                        .required(false)
                        .help("Scan into memory and print the result without touching the database")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("add")
                .about("Adds endpoints to a page by hand")
                .arg(
                    arg!(--"folder" <NAME>)
                        .required(true)
                        .help("Folder name of the page"),
                )
                .arg(
                    arg!(--"controller" <NAME>)
                        .required(true)
                        .help("Controller name of the page"),
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("Endpoint to add. May be repeated.")
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(-r --"redirect" <STATE>)
                        .required(false)
                        .help("Redirect recorded with every endpoint added"),
                ),
        )
        .subcommand(
            command!("list")
                .about("Prints or saves the endpoint catalog")
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, csv, markdown")
                        .value_parser(["text", "json", "csv", "markdown"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        )
        .subcommand(command!("sessions").about("Lists previous scan runs"))
        .subcommand(command!("menu").about("Starts the interactive menu"))
}
