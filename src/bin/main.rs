//! aggcalc CLI - Inspect formula tokens and normalize calculation variants
//!
//! Usage:
//!   aggcalc decode <token>
//!   aggcalc encode <formula> [--percent <n>] [--param <p>]
//!   aggcalc formulas --data-type <type> [--cube]
//!   aggcalc percent-options [--rows] [--cols] | --table [--group]
//!   aggcalc check <variant.json> [--group <name[:level]>]... [--no-reset <name>]...
//!
//! Examples:
//!   aggcalc decode "NthLargest<1>(3)"
//!   aggcalc encode Correlation --param quantity
//!   aggcalc formulas --data-type date
//!   aggcalc check running_total.json --group OrderDate:month --no-reset Region

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use aggcalc::binding::PercentDirection;
use aggcalc::calc::{CalcEditor, CalculationVariant, EditorContext};
use aggcalc::config::Settings;
use aggcalc::formula::{self, FormulaToken, NValue};
use aggcalc::metadata::StaticMetadataProvider;
use aggcalc::model::{DataType, DateLevel, GroupDimension, PercentageOption};
use clap::{Parser, Subcommand};
use serde_json::json;

#[derive(Parser)]
#[command(name = "aggcalc")]
#[command(about = "aggcalc - Aggregate formula tokens and secondary calculations")]
#[command(version)]
struct Cli {
    /// Config file (defaults to AGGCALC_CONFIG, ./aggcalc.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a formula token into its parts
    Decode {
        token: String,
    },

    /// Encode a formula and its decorations into a token
    Encode {
        /// Formula wire token, name or label
        formula: String,

        /// Percentage option value
        #[arg(long)]
        percent: Option<i32>,

        /// N value or secondary column
        #[arg(long)]
        param: Option<String>,
    },

    /// List the formulas offered for a data type
    Formulas {
        #[arg(long)]
        data_type: String,

        /// Column comes from a cube source
        #[arg(long)]
        cube: bool,

        /// Leave out the None entry
        #[arg(long)]
        no_none: bool,
    },

    /// List the legal percentage options for a grouping shape
    PercentOptions {
        /// Crosstab has row groups
        #[arg(long, conflicts_with = "table")]
        rows: bool,

        /// Crosstab has column groups
        #[arg(long, conflicts_with = "table")]
        cols: bool,

        /// Table or chart instead of a crosstab
        #[arg(long)]
        table: bool,

        /// Table has at least one group
        #[arg(long, requires = "table")]
        group: bool,
    },

    /// Normalize a persisted calculation variant
    Check {
        /// Path to the variant JSON
        file: PathBuf,

        /// Grouped dimension, optionally with a date level (`OrderDate:month`)
        #[arg(long = "group")]
        groups: Vec<String>,

        /// Dimension that does not support reset levels
        #[arg(long)]
        no_reset: Vec<String>,

        /// Treat the binding as a crosstab with rows and columns
        #[arg(long)]
        crosstab: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.logging.filter.as_str().into()),
        )
        .init();

    match cli.command {
        Commands::Decode { token } => cmd_decode(&token),
        Commands::Encode {
            formula,
            percent,
            param,
        } => cmd_encode(&formula, percent, param),
        Commands::Formulas {
            data_type,
            cube,
            no_none,
        } => cmd_formulas(&data_type, cube, no_none),
        Commands::PercentOptions {
            rows,
            cols,
            table,
            group,
        } => {
            let direction = if table {
                PercentDirection::table(group)
            } else {
                PercentDirection::crosstab(rows, cols)
            };
            cmd_percent_options(direction)
        }
        Commands::Check {
            file,
            groups,
            no_reset,
            crosstab,
        } => cmd_check(&settings, file, groups, no_reset, crosstab),
    }
}

fn print_json(value: &impl serde::Serialize) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error writing JSON: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_decode(token: &str) -> ExitCode {
    let (decoded, report) = formula::decode_with_report(token);
    let descriptor = decoded.descriptor();

    print_json(&json!({
        "formula": descriptor.formula_name,
        "name": descriptor.name,
        "percentage": decoded.percentage.map(|p| p.value()),
        "param": decoded.param,
        "dropped": {
            "unknownFormula": report.unknown_formula,
            "malformedPercentage": report.malformed_percentage,
            "malformedParam": report.malformed_param,
        },
    }))
}

fn cmd_encode(name: &str, percent: Option<i32>, param: Option<String>) -> ExitCode {
    let Some(descriptor) = formula::find(name) else {
        eprintln!("Unknown formula: {}", name);
        return ExitCode::FAILURE;
    };

    let mut token = FormulaToken::new(descriptor.id);

    if let Some(value) = percent {
        match PercentageOption::from_value(value) {
            Some(option) => token = token.with_percentage(option),
            None => {
                eprintln!("Unknown percentage option: {}", value);
                return ExitCode::FAILURE;
            }
        }
    }

    if let Some(param) = param {
        if descriptor.has_n {
            match NValue::parse(&param) {
                Some(n) => token = token.with_n(n),
                None => {
                    eprintln!("{} needs a number or a dynamic expression: {}", name, param);
                    return ExitCode::FAILURE;
                }
            }
        } else if descriptor.two_columns {
            token = token.with_column(param);
        } else {
            eprintln!("{} takes no parameter", descriptor.formula_name);
            return ExitCode::FAILURE;
        }
    }

    println!("{}", token.encode());
    ExitCode::SUCCESS
}

fn cmd_formulas(data_type: &str, cube: bool, no_none: bool) -> ExitCode {
    let Some(data_type) = DataType::from_str(data_type) else {
        eprintln!("Unknown data type: {}", data_type);
        return ExitCode::FAILURE;
    };

    let formulas = if no_none {
        formula::formulas_for_data_type_without_none(data_type, cube)
    } else {
        formula::formulas_for_data_type(data_type, cube)
    };

    for formula in formulas {
        println!("{:<28} {}", formula.formula_name, formula.label);
    }
    ExitCode::SUCCESS
}

fn cmd_percent_options(direction: PercentDirection) -> ExitCode {
    for option in direction.options() {
        println!("{:>3}  {}", option.value(), option);
    }
    ExitCode::SUCCESS
}

fn cmd_check(
    settings: &Settings,
    file: PathBuf,
    groups: Vec<String>,
    no_reset: Vec<String>,
    crosstab: bool,
) -> ExitCode {
    let source = match fs::read_to_string(&file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let variant = match CalculationVariant::from_json(&source) {
        Ok(variant) => variant,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut dimensions = Vec::with_capacity(groups.len());
    for group in &groups {
        match parse_group(group) {
            Some(dimension) => dimensions.push(dimension),
            None => {
                eprintln!("Invalid group '{}': expected NAME or NAME:LEVEL", group);
                return ExitCode::FAILURE;
            }
        }
    }

    let direction = if crosstab {
        PercentDirection::crosstab(true, true)
    } else {
        PercentDirection::table(!dimensions.is_empty())
    };
    let mut provider = StaticMetadataProvider::new(dimensions.clone());
    for dimension in no_reset {
        provider = provider.without_reset_support(dimension);
    }

    let context = EditorContext {
        columns: dimensions.iter().map(|d| d.name.clone()).collect(),
        ..EditorContext::default()
    };
    let mut editor = CalcEditor::open(Some(variant), context, settings.calc.clone());
    editor.regroup(dimensions, direction);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = runtime.block_on(editor.refresh_metadata(&provider)) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    print_json(&editor.commit())
}

fn parse_group(raw: &str) -> Option<GroupDimension> {
    match raw.split_once(':') {
        Some((name, level)) if !name.is_empty() => {
            DateLevel::from_str(level).map(|level| GroupDimension::date(name, level))
        }
        Some(_) => None,
        None if !raw.is_empty() => Some(GroupDimension::new(raw)),
        None => None,
    }
}
