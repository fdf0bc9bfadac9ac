//! jurimd CLI - legal PDF text cleanup tool
//!
//! A command-line tool that turns text extracted from court filings into
//! structured Markdown.

use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use jurimd::render::render_to_file;
use jurimd::{
    CleaningConfig, Config, Document, ErrorMode, HeadingLevel, HierarchyConfig, ProcessOptions,
    Processor, RenderOptions, RuleBook,
};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Legal PDF text cleanup to Markdown and JSON
#[derive(Parser)]
#[command(
    name = "jurimd",
    version,
    about = "Clean and structure text extracted from legal PDFs",
    long_about = "jurimd - configuration-driven cleanup of legal PDF text.\n\n\
                  Removes noise, marks headings and splits pages using the\n\
                  patterns in limpeza.toml and hierarquia.toml.\n\n\
                  Usage:\n  \
                  jurimd <file>              Write <file>_texto-limpo.md\n  \
                  jurimd <file> <output>     Write to the given file\n  \
                  jurimd json <file>         Output the processed document as JSON"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input text file (for default processing)
    #[arg(global = false)]
    input: Option<PathBuf>,

    /// Output Markdown file (for default processing)
    #[arg(global = false)]
    output: Option<PathBuf>,

    /// Cleaning patterns file (default: built-in limpeza.toml)
    #[arg(long, global = true)]
    limpeza: Option<PathBuf>,

    /// Hierarchy patterns file (default: built-in hierarquia.toml)
    #[arg(long, global = true)]
    hierarquia: Option<PathBuf>,

    /// Page count reported by the PDF extractor
    #[arg(long, global = true)]
    pages: Option<usize>,

    /// Process pages one at a time
    #[arg(long, global = true)]
    sequential: bool,

    /// Fail on the first malformed pattern instead of skipping it
    #[arg(long, global = true)]
    strict: bool,

    /// Include YAML frontmatter with metadata
    #[arg(short, long, global = true)]
    frontmatter: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean a text file into Markdown (default command)
    #[command(visible_alias = "md")]
    Process {
        /// Input text file
        input: PathBuf,

        /// Output file path (default: <filename>_texto-limpo.md)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Output the processed document as JSON
    Json {
        /// Input text file
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,
    },

    /// Compile the pattern configuration and report problems
    Check,

    /// Show version information
    Version,
}

/// Options shared by every command.
struct RunSettings {
    limpeza: Option<PathBuf>,
    hierarquia: Option<PathBuf>,
    pages: Option<usize>,
    sequential: bool,
    strict: bool,
    frontmatter: bool,
}

impl RunSettings {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            limpeza: cli.limpeza.clone(),
            hierarquia: cli.hierarquia.clone(),
            pages: cli.pages,
            sequential: cli.sequential,
            strict: cli.strict,
            frontmatter: cli.frontmatter,
        }
    }

    fn load_config(&self) -> jurimd::Result<Config> {
        let mut config = Config::builtin()?;
        if let Some(path) = &self.limpeza {
            config.cleaning = CleaningConfig::from_file(path)?;
        }
        if let Some(path) = &self.hierarquia {
            config.hierarchy = HierarchyConfig::from_file(path)?;
        }
        Ok(config)
    }

    fn process_options(&self) -> ProcessOptions {
        let mut options = if self.strict {
            ProcessOptions::new().strict()
        } else {
            ProcessOptions::new().lenient()
        };
        if self.sequential {
            options = options.sequential();
        }
        options
    }

    fn render_options(&self) -> RenderOptions {
        if self.frontmatter {
            RenderOptions::default().with_frontmatter()
        } else {
            RenderOptions::default()
        }
    }

    fn processor(&self) -> jurimd::Result<Processor> {
        let config = self.load_config()?;
        Ok(Processor::with_options(&config, self.process_options())?
            .with_render_options(self.render_options()))
    }

    fn process(&self, processor: &Processor, input: &Path) -> jurimd::Result<Document> {
        let text = fs::read_to_string(input)?;
        processor.process_text_with_page_count(&text, self.pages)
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let settings = RunSettings::from_cli(&cli);

    let Some(command) = cli.command else {
        // Handle default command (jurimd <file> [output])
        if let Some(input) = cli.input {
            return run_process(&settings, &input, cli.output.as_ref());
        }
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Process { input, output } => {
            run_process(&settings, &input, output.as_ref())?;
        }

        Commands::Json {
            input,
            output,
            compact,
        } => {
            let pb = create_spinner("Compiling patterns...");
            let processor = settings.processor()?;

            pb.set_message("Processing document...");
            let doc = settings.process(&processor, &input)?;

            let json = if compact {
                serde_json::to_string(&doc)?
            } else {
                serde_json::to_string_pretty(&doc)?
            };

            pb.finish_and_clear();
            write_output(output.as_ref(), &json)?;

            if let Some(path) = output {
                println!("{} Converted to JSON: {}", "✓".green().bold(), path.display());
            }
        }

        Commands::Check => {
            run_check(&settings)?;
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

/// Run the default command - writes cleaned Markdown and prints statistics
fn run_process(
    settings: &RunSettings,
    input: &Path,
    output: Option<&PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = create_spinner("Compiling patterns...");
    let processor = settings.processor()?;

    pb.set_message("Processing document...");
    let doc = settings.process(&processor, input)?;

    let output_path = match output {
        Some(p) => p.clone(),
        None => default_output_path(input),
    };

    if doc.pages.is_empty() {
        fs::write(&output_path, "*Documento vazio*")?;
    } else {
        render_to_file(&doc, &output_path, &settings.render_options())?;
    }

    pb.finish_and_clear();

    println!("{}", "Processing Complete".green().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Output".bold(), output_path.display());
    print_statistics(&doc);
    print_warnings(&doc);

    Ok(())
}

fn run_check(settings: &RunSettings) -> Result<(), Box<dyn std::error::Error>> {
    let config = settings.load_config()?;
    let error_mode = if settings.strict {
        ErrorMode::Strict
    } else {
        ErrorMode::Lenient
    };
    let rules = RuleBook::compile(&config, error_mode)?;

    println!("{}", "Rule Groups".cyan().bold());
    println!("{}", "─".repeat(40));
    for (group, patterns) in rules.noise().iter() {
        println!(
            "{:>2}. {} ({} patterns)",
            group.position() + 1,
            group.name().bold(),
            patterns.len()
        );
        if !group.description().is_empty() {
            println!("    {}", group.description().dimmed());
        }
    }

    println!("\n{}", "Hierarchy".cyan().bold());
    println!("{}", "─".repeat(40));
    for level in HeadingLevel::ALL {
        println!(
            "{}: {}",
            format!("H{}", level.as_u8()).bold(),
            rules.headings().level(level.as_u8()).len()
        );
    }
    println!("{}: {}", "Preserve".bold(), rules.preserve().len());
    println!("{}: {}", "Movement".bold(), rules.movement().len());
    println!("{}: {}", "Line breaks".bold(), rules.line_breaks().len());
    println!("{}: {}", "Fragments".bold(), rules.fragments().len());

    if rules.warnings().is_empty() {
        println!("\n{} Configuration is valid", "✓".green().bold());
    } else {
        println!();
        for warning in rules.warnings() {
            println!("{} {}", "!".yellow().bold(), warning);
        }
    }

    Ok(())
}

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(format!("{}_texto-limpo.md", stem))
}

fn print_statistics(doc: &Document) {
    let stats = &doc.statistics;
    println!("\n{}", "Statistics".cyan().bold());
    println!("{}", "─".repeat(40));
    if let Some(ref number) = doc.metadata.process_number {
        println!("{}: {}", "Process".bold(), number);
    }
    println!("{}: {}", "Pages".bold(), stats.page_count);
    println!("{}: {}", "Original chars".bold(), stats.original_length);
    println!("{}: {}", "Final chars".bold(), stats.final_length);
    println!(
        "{}: {} ({:.1}%)",
        "Removed".bold(),
        stats.removed_length,
        stats.removed_percentage
    );
    println!("{}: {}", "Noise matches".bold(), doc.removal.matches());
    println!("{}: {}", "Lines".bold(), stats.line_count);
    println!("{}: {}", "Words".bold(), stats.word_count);
}

fn print_warnings(doc: &Document) {
    if !doc.has_warnings() {
        return;
    }
    println!("\n{}", "Warnings".yellow().bold());
    println!("{}", "─".repeat(40));
    for warning in &doc.warnings {
        println!("{} {}", "!".yellow().bold(), warning);
    }
}

fn print_version() {
    println!("{} {}", "jurimd".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Configuration-driven cleanup of legal PDF text to Markdown");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}
