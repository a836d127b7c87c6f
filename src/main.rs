use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use resettle_rank::config::{self, Scenario};
use resettle_rank::output::{self, Lang};
use resettle_rank::rank::{self, SortKey, SortOrder};
use resettle_rank::scenario::{ScenarioContext, ScenarioMaps};
use resettle_rank::scoring::{self, ResolvedWeights};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_CONFIG: i32 = 4;
const EXIT_IO: i32 = 5;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
enum OutputFormat {
    #[default]
    Table,
    Tsv,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rank municipalities for the group (default if no subcommand)
    Rank {
        /// Sort key: overall, name, or a module (capacity, work, connection, healthcare, education)
        #[arg(short, long, default_value = "overall")]
        sort: String,

        /// Sort ascending (scores sort highest first by default)
        #[arg(long)]
        asc: bool,

        /// Show only the first N municipalities
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Show per-module explanations and person traces for one municipality
    Inspect {
        /// Municipality id as listed in the scenario
        id: String,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the built-in weight templates
    Templates,
    /// Print the effective weight configuration as JSON
    Weights,
    /// Validate the scenario file and exit
    Validate,
    /// Write a starter scenario to the default location (or --scenario)
    Init {
        /// Overwrite an existing scenario file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "resettle-rank")]
#[command(
    about = "Rank municipalities for settling a group by weighted multi-criteria scoring",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to scenario file (defaults to ~/.config/resettle-rank/scenario.yaml)
    #[arg(short, long, global = true)]
    scenario: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Label language
    #[arg(long, global = true, value_enum, default_value_t = Lang::En)]
    lang: Lang,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Load and validate the scenario, exiting with a config error on failure.
fn load_valid_scenario(path: Option<PathBuf>) -> Scenario {
    let scenario = match config::load_scenario(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = config::validate_scenario(&scenario) {
        eprintln!("Scenario errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    scenario
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize output: {}", e);
            std::process::exit(EXIT_IO);
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Rank {
        sort: "overall".to_string(),
        asc: false,
        limit: None,
        format: OutputFormat::Table,
    });
    let start_time = Instant::now();

    if let Err(e) = resettle_rank::logging::init(cli.verbose) {
        eprintln!("Warning: {:#}", e);
    }

    let use_colors = !cli.no_color && output::should_use_colors();
    let scenario_path = cli.scenario.map(PathBuf::from);

    // Commands that do not need a scenario
    match command {
        Commands::Templates => {
            println!(
                "{}",
                output::format_templates(scoring::TEMPLATES, cli.lang, use_colors)
            );
            std::process::exit(EXIT_SUCCESS);
        }
        Commands::Init { force } => {
            let path = match scenario_path {
                Some(p) => p,
                None => {
                    if let Err(e) = config::ensure_config_dir() {
                        eprintln!("Failed to prepare config directory: {:#}", e);
                        std::process::exit(EXIT_IO);
                    }
                    match config::get_scenario_path() {
                        Ok(p) => p,
                        Err(e) => {
                            eprintln!("Config error: {:#}", e);
                            std::process::exit(EXIT_CONFIG);
                        }
                    }
                }
            };
            if let Err(e) = config::write_starter_scenario(&path, force) {
                eprintln!("{:#}", e);
                std::process::exit(EXIT_IO);
            }
            println!("Scenario written to {}", path.display());
            println!("Run `resettle-rank` to rank its municipalities.");
            std::process::exit(EXIT_SUCCESS);
        }
        _ => {}
    }

    let scenario = load_valid_scenario(scenario_path);
    let weights: ResolvedWeights = scenario.weights.resolve();
    let maps = ScenarioMaps::from_municipalities(&scenario.municipalities);
    for issue in &maps.issues {
        warn!("{}", issue);
    }
    info!(
        persons = scenario.group.persons.len(),
        municipalities = scenario.municipalities.len(),
        template = weights.template_id.as_str(),
        "scenario loaded"
    );

    let ctx = ScenarioContext {
        group: &scenario.group,
        municipalities: &scenario.municipalities,
        weights: &weights,
        maps: &maps,
    };

    match command {
        Commands::Rank {
            sort,
            asc,
            limit,
            format,
        } => {
            let key: SortKey = match sort.parse() {
                Ok(k) => k,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            };
            // Names read A to Z; scores read best first unless --asc
            let order = if asc || key == SortKey::Name {
                SortOrder::Ascending
            } else {
                SortOrder::Descending
            };

            let mut ranked = rank::rank_municipalities(&ctx);
            rank::sort_ranked(&mut ranked, key, order);
            if let Some(n) = limit {
                ranked.truncate(n);
            }

            let modules = weights.modules.enabled();
            match format {
                OutputFormat::Table => println!(
                    "{}",
                    output::format_ranked_table(&ranked, &modules, cli.lang, use_colors)
                ),
                OutputFormat::Tsv => {
                    let tsv = output::format_tsv(&ranked, &modules);
                    if !tsv.is_empty() {
                        println!("{}", tsv);
                    }
                }
                OutputFormat::Json => match output::format_json(&ranked) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("{:#}", e);
                        std::process::exit(EXIT_IO);
                    }
                },
            }

            if cli.verbose {
                eprintln!();
                eprintln!(
                    "Total: {} municipalities in {:?}",
                    ranked.len(),
                    start_time.elapsed()
                );
            }
        }
        Commands::Inspect { id, json } => {
            let Some(scored) = rank::score_municipality(&ctx, &id) else {
                eprintln!("Unknown municipality id '{}'.", id);
                std::process::exit(EXIT_CONFIG);
            };
            if json {
                print_json(&scored);
            } else {
                println!(
                    "{}",
                    output::format_municipality_detail(&scored, cli.lang, use_colors)
                );
            }
        }
        Commands::Weights => {
            print_json(&weights.export(chrono::Utc::now()));
        }
        Commands::Validate => {
            println!(
                "Scenario OK: {} persons, {} municipalities, template {}",
                scenario.group.persons.len(),
                scenario.municipalities.len(),
                weights.template_id
            );
            for issue in &maps.issues {
                println!("  - {}", issue);
            }
        }
        Commands::Templates | Commands::Init { .. } => {}
    }

    std::process::exit(EXIT_SUCCESS);
}
