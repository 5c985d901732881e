//! pdfcsv CLI - extract tabular records from PDF text into CSV

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfcsv::schema::ColumnPrompt;
use pdfcsv::{
    inspect, ConversionPipeline, ConversionResult, ConvertOptions, CsvSink, ExtractionMethod,
    GroupUnit, LengthPolicy, PageTextSource, ProbePolicy, ProgressObserver,
};

#[derive(Parser)]
#[command(name = "pdfcsv")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract tabular records from PDF text into CSV", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output CSV file (defaults to INPUT with a .csv extension)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    args: ConvertArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show page count, detected tables and the strategy Auto would pick
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        args: ConvertArgs,
    },
}

#[derive(Args, Debug, Clone)]
struct ConvertArgs {
    /// Extraction method
    #[arg(short, long, value_enum, default_value = "auto")]
    method: Method,

    /// Ask for column names after detecting the column count
    #[arg(short, long)]
    interactive: bool,

    /// Number of columns
    #[arg(short = 'c', long = "column-count", value_name = "N")]
    column_count: Option<usize>,

    /// Column names, comma separated
    #[arg(long, value_delimiter = ',', value_name = "NAMES")]
    columns: Option<Vec<String>>,

    /// Accept every row that fits the schema
    #[arg(long)]
    no_validate: bool,

    /// Report rejected rows and debug output
    #[arg(short, long)]
    verbose: bool,

    /// Password for encrypted documents
    #[arg(long, env = "PDFCSV_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Regex pattern for the regex method (repeatable, tried in order)
    #[arg(long = "pattern", value_name = "REGEX")]
    patterns: Vec<String>,

    /// Accepted category codes
    #[arg(long, value_delimiter = ',', default_value = "M,F")]
    categories: Vec<String>,

    /// Lowest accepted value of the numeric field
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    min: i64,

    /// Highest accepted value of the numeric field
    #[arg(long, default_value_t = 120, allow_negative_numbers = true)]
    max: i64,

    /// Reject rows with more fields than columns instead of truncating
    #[arg(long)]
    reject_long: bool,

    /// Pages probed when the method is auto
    #[arg(long, default_value_t = 3)]
    probe_pages: usize,

    /// How the auto method chooses
    #[arg(long, value_enum, default_value = "table-preferred")]
    probe_policy: Policy,

    /// Lines per record for the structured method (defaults to the column count)
    #[arg(long, value_name = "N")]
    group_size: Option<usize>,

    /// Group whitespace tokens instead of lines in the structured method
    #[arg(long)]
    group_tokens: bool,

    /// Only process the first N pages
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Skip table detection
    #[arg(long)]
    no_tables: bool,

    /// Summary format
    #[arg(long, value_enum, default_value = "text")]
    report: ReportFormat,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Method {
    /// Probe the first pages and pick
    Auto,
    /// Fixed groups of consecutive lines
    Structured,
    /// Line-by-line pattern matching
    Regex,
    /// Detected table grids
    Table,
}

impl From<Method> for ExtractionMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::Auto => ExtractionMethod::Auto,
            Method::Structured => ExtractionMethod::Structured,
            Method::Regex => ExtractionMethod::Regex,
            Method::Table => ExtractionMethod::Table,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Policy {
    /// Tables win whenever they produce rows
    TablePreferred,
    /// The strategy with the most rows wins
    MostRows,
}

impl From<Policy> for ProbePolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::TablePreferred => ProbePolicy::TablePreferred,
            Policy::MostRows => ProbePolicy::MostRows,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    /// Human-readable summary
    Text,
    /// JSON on stdout
    Json,
}

impl ConvertArgs {
    fn to_options(&self) -> ConvertOptions {
        let mut options = ConvertOptions::new()
            .with_method(self.method.into())
            .with_categories(self.categories.iter().cloned())
            .with_bounds(self.min, self.max)
            .verbose(self.verbose)
            .with_probe(self.probe_pages, self.probe_policy.into())
            .with_grouping(
                self.group_size,
                if self.group_tokens {
                    GroupUnit::Tokens
                } else {
                    GroupUnit::Lines
                },
            )
            .with_tables(!self.no_tables);

        if let Some(names) = &self.columns {
            options = options.with_columns(names.iter().map(|n| n.trim().to_string()));
        }
        if let Some(count) = self.column_count {
            options = options.with_column_count(count);
        }
        if self.interactive {
            options = options.interactive();
        }
        if self.no_validate {
            options = options.without_validation();
        }
        if self.reject_long {
            options = options.with_length_policy(LengthPolicy::Reject);
        }
        for pattern in &self.patterns {
            options = options.with_pattern(pattern.clone());
        }
        if let Some(password) = &self.password {
            options = options.with_password(password.clone());
        }
        if let Some(max) = self.max_pages {
            options = options.with_max_pages(max);
        }
        options
    }
}

fn main() {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Some(Commands::Info { args, .. }) => args.verbose,
        None => cli.args.verbose,
    };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if verbose { "debug" } else { "warn" }),
    )
    .init();

    let result = match cli.command {
        Some(Commands::Info { input, args }) => cmd_info(&input, &args),
        None => {
            if let Some(input) = cli.input {
                let output = cli
                    .output
                    .unwrap_or_else(|| input.with_extension("csv"));
                cmd_convert(&input, &output, &cli.args)
            } else {
                println!("{}", "Usage: pdfcsv <INPUT> [OUTPUT]".yellow());
                println!("       pdfcsv --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_convert(
    input: &Path,
    output: &Path,
    args: &ConvertArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = args.to_options();
    log::debug!(
        "Converting {} with method {:?}, schema {:?}",
        input.display(),
        options.method,
        options.schema.mode()
    );
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let source = PageTextSource::open(input, &options.source_options())?;
    let mut sink = CsvSink::create(output)?;

    let mut progress = BarProgress::default();
    let mut prompt = StdinPrompt;
    let mut pipeline = ConversionPipeline::new(options).with_observer(&mut progress);
    if args.interactive {
        pipeline = pipeline.with_prompt(&mut prompt);
    }
    let result = pipeline.run(source, &mut sink)?;
    drop(pipeline);

    match args.report {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        ReportFormat::Text => print_summary(&result, output),
    }
    ensure_records(&result)
}

/// A run that found no candidate rows at all is reported as a failure.
fn ensure_records(result: &ConversionResult) -> Result<(), Box<dyn std::error::Error>> {
    if result.total_records == 0 && !result.cancelled {
        return Err("No records were extracted".into());
    }
    Ok(())
}

fn print_summary(result: &ConversionResult, output: &Path) {
    let title = if result.cancelled {
        "Conversion cancelled".yellow().bold()
    } else {
        "Conversion complete".green().bold()
    };
    println!("\n{}", title);
    println!("{}", "─".repeat(40).dimmed());
    if let Some(strategy) = result.strategy {
        println!("{}: {}", "Strategy".bold(), strategy);
    }
    println!("{}: {}", "Pages".bold(), result.pages_processed);
    println!("{}: {}", "Rows found".bold(), result.total_records);
    println!(
        "{}: {} ({:.1}%)",
        "Rows written".bold(),
        result.valid_records,
        result.acceptance_rate() * 100.0
    );
    if result.rejected_records > 0 {
        println!("{}: {}", "Wrong length".bold(), result.rejected_records);
    }
    if result.invalid_records > 0 {
        println!("{}: {}", "Failed validation".bold(), result.invalid_records);
    }
    if result.page_errors > 0 {
        println!("{}: {}", "Page errors".red().bold(), result.page_errors);
    }
    println!("{} {}", "Saved to".green(), output.display());
}

fn cmd_info(input: &Path, args: &ConvertArgs) -> Result<(), Box<dyn std::error::Error>> {
    let options = args.to_options();
    let source = PageTextSource::open(input, &options.source_options())?;
    let info = inspect(&source, &options)?;

    if args.report == ReportFormat::Json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), info.pages);
    println!("{}: {}", "Columns".bold(), info.columns);

    let with_tables = info.tables_per_page.iter().filter(|&&n| n > 0).count();
    println!("{}: {} page(s)", "Tables".bold(), with_tables);
    for (index, count) in info.tables_per_page.iter().enumerate().filter(|(_, n)| **n > 0) {
        println!("  {} page {}: {} table(s)", "├─".dimmed(), index + 1, count);
    }

    println!();
    println!("{}", "Auto Probe".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Pages probed".bold(), info.probe.pages);
    for (kind, rows) in &info.probe.counts {
        println!("{}: {} row(s)", kind.to_string().bold(), rows);
    }
    println!("{}: {}", "Selected".bold(), info.probe.chosen.to_string().green());

    Ok(())
}

/// Progress bar over pages.
#[derive(Default)]
struct BarProgress {
    bar: Option<ProgressBar>,
}

impl ProgressObserver for BarProgress {
    fn on_start(&mut self, total_pages: usize) {
        let bar = ProgressBar::new(total_pages as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} pages {msg}")
            .map(|s| s.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        self.bar = Some(bar);
    }

    fn on_page(&mut self, index: usize, _total_pages: usize, total_rows: usize, valid_rows: usize) {
        if let Some(bar) = &self.bar {
            bar.set_position(index as u64 + 1);
            bar.set_message(format!("{} / {} rows", valid_rows, total_rows));
        }
    }

    fn on_finish(&mut self, _result: &ConversionResult) {
        if let Some(bar) = self.bar.take() {
            bar.finish_with_message("Done!");
        }
    }
}

/// Asks for column names on stdin.
struct StdinPrompt;

impl StdinPrompt {
    fn read_answer(question: &str) -> pdfcsv::Result<String> {
        print!("{} ", question);
        io::stdout()
            .flush()
            .map_err(|e| pdfcsv::Error::Prompt(e.to_string()))?;
        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| pdfcsv::Error::Prompt(e.to_string()))?;
        if read == 0 {
            return Err(pdfcsv::Error::Prompt("stdin closed".into()));
        }
        Ok(line.trim().to_string())
    }
}

impl ColumnPrompt for StdinPrompt {
    fn ask_column_name(&mut self, index: usize) -> pdfcsv::Result<String> {
        Self::read_answer(&format!(
            "Name for column {} [Column_{}]:",
            index + 1,
            index + 1
        ))
    }

    fn confirm_column_count(&mut self, detected: usize) -> pdfcsv::Result<usize> {
        loop {
            let answer = Self::read_answer(&format!(
                "Detected {} column(s). Press Enter to accept or type a number:",
                detected.to_string().cyan()
            ))?;
            if answer.is_empty() {
                return Ok(detected);
            }
            match answer.parse::<usize>() {
                Ok(n) if n > 0 => return Ok(n),
                _ => println!("{}", "Please enter a positive number.".yellow()),
            }
        }
    }

    fn confirm_columns(&mut self, names: &[String]) -> pdfcsv::Result<bool> {
        println!("{}: {}", "Columns".bold(), names.join(", "));
        let answer = Self::read_answer("Confirm? (y/n):")?;
        Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
    }
}
