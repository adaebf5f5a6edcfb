use std::io::{BufRead, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use miette::{IntoDiagnostic, Result, WrapErr};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use evilmerge_core::{EvilMergeConfig, EvilMergeError, OutputFormat};
use evilmerge_detect::{analyze_hunks, analyze_tree, HunkReport, MergeSpec, TreeReport};
use evilmerge_gitpulse::GitRepository;

#[derive(Parser)]
#[command(
    name = "evilmerge",
    version,
    about = "Find merge commits that silently drop or override one side's changes",
    long_about = "Find evil merges: merge commits whose result quietly discards or rewrites\n\
                   what one of the merged branches changed.\n\n\
                   Two detectors are available. `tree` compares file content hashes of the\n\
                   merge, its parents and their merge bases. `hunks` compares each side's\n\
                   hunks with what the merge did to the other side.\n\n\
                   Examples:\n  \
                     evilmerge tree HEAD                      Check the latest merge\n  \
                     evilmerge hunks M A B -- Y               Explicit parents and base\n  \
                     git rev-list --merges HEAD | evilmerge tree --stdin\n  \
                     git rev-list --merges --parents HEAD | evilmerge hunks --stdin"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Repository to analyze (default: current directory)
    #[arg(long, global = true, default_value = ".")]
    repo: PathBuf,

    /// Path to configuration file (default: .evilmerge.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format (default: from config, else text)
    #[arg(
        long,
        global = true,
        long_help = "Output format for reports.\n\n\
                       Formats:\n  \
                         text      Plain report, nothing for clean merges (default)\n  \
                         json      One pretty JSON object per suspicious merge\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: Option<OutputFormat>,

    /// Enable debug logging on stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Flag files whose merge result is one side's version verbatim
    #[command(long_about = "Flag files whose merge result is one side's version verbatim.\n\n\
        A file changed on both sides must come out different from both parents.\n\
        A file changed on one side must come out as the changed version.\n\
        Works with any number of merge bases.\n\n\
        Examples:\n  evilmerge tree HEAD\n  evilmerge tree M A B -- Y1 Y2")]
    Tree(MergeArgs),
    /// Flag hunks the merge applied differently than the other side made them
    #[command(
        long_about = "Flag hunks the merge applied differently than the other side made them.\n\n\
        For each parent, the hunks only the other side introduced are diffed\n\
        against what the merge changed on top of that parent. Lines signed twice\n\
        (--, -+, +-, ++) in that interdiff are reported. Needs a unique merge base;\n\
        when several are passed explicitly the first is used.\n\n\
        Examples:\n  evilmerge hunks HEAD\n  evilmerge hunks M A B -- Y"
    )]
    Hunks(MergeArgs),
    /// Create a default .evilmerge.toml configuration file
    #[command(long_about = "Create a default .evilmerge.toml configuration file.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if .evilmerge.toml already exists.")]
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args)]
struct MergeArgs {
    /// Read one `<merge> [<parent1> <parent2> [<mergebase>...]]` per line from stdin
    #[arg(long)]
    stdin: bool,

    /// <merge> [<parent1> <parent2> [--] [<mergebase>...]]
    #[arg(value_name = "REV")]
    revs: Vec<String>,
}

#[derive(Clone, Copy)]
enum Detector {
    Tree,
    Hunks,
}

impl Detector {
    fn name(self) -> &'static str {
        match self {
            Detector::Tree => "tree",
            Detector::Hunks => "hunks",
        }
    }
}

enum Report {
    Tree(TreeReport),
    Hunks(HunkReport),
}

impl Report {
    /// Rendered report, or `None` when the merge looks clean.
    fn render(&self, format: OutputFormat, abbrev: usize) -> Result<Option<String>> {
        let clean = match self {
            Report::Tree(r) => r.is_clean(),
            Report::Hunks(r) => r.is_clean(),
        };
        if clean {
            return Ok(None);
        }
        let text = match (format, self) {
            (OutputFormat::Text, Report::Tree(r)) => r.to_string(),
            (OutputFormat::Text, Report::Hunks(r)) => r.render_text(abbrev),
            (OutputFormat::Markdown, Report::Tree(r)) => r.to_markdown(),
            (OutputFormat::Markdown, Report::Hunks(r)) => r.to_markdown(abbrev),
            (OutputFormat::Json, Report::Tree(r)) => {
                format!("{}\n", serde_json::to_string_pretty(r).into_diagnostic()?)
            }
            (OutputFormat::Json, Report::Hunks(r)) => {
                format!("{}\n", serde_json::to_string_pretty(r).into_diagnostic()?)
            }
        };
        Ok(Some(text))
    }
}

struct Session {
    repo: GitRepository,
    config: EvilMergeConfig,
    detector: Detector,
    format: OutputFormat,
}

impl Session {
    fn analyze(&self, spec: &MergeSpec) -> std::result::Result<Report, EvilMergeError> {
        match self.detector {
            Detector::Tree => analyze_tree(&self.repo, spec).map(Report::Tree),
            Detector::Hunks => {
                analyze_hunks(&self.repo, spec, &self.config.analysis).map(Report::Hunks)
            }
        }
    }

    fn render(&self, report: &Report) -> Result<Option<String>> {
        report.render(self.format, self.config.analysis.abbrev_length)
    }

    fn run_single(&self, spec: &MergeSpec) -> Result<()> {
        let report = self.analyze(spec)?;
        if let Some(text) = self.render(&report)? {
            print!("{text}");
        }
        Ok(())
    }

    fn run_batch(&self) -> Result<()> {
        let spinner = if std::io::stderr().is_terminal() {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})")
                    .into_diagnostic()?,
            );
            pb.enable_steady_tick(std::time::Duration::from_millis(120));
            Some(pb)
        } else {
            None
        };

        let mut analyzed = 0usize;
        let mut skipped = 0usize;
        for (index, line) in std::io::stdin().lock().lines().enumerate() {
            let line = line.into_diagnostic().wrap_err("reading stdin")?;
            let args: Vec<&str> = line.split_whitespace().collect();
            let Some(spec) = MergeSpec::from_args(&args) else {
                continue;
            };
            if let Some(pb) = &spinner {
                pb.set_message(format!(
                    "{} {}",
                    self.detector.name(),
                    spec.merge.abbrev(self.config.analysis.abbrev_length)
                ));
            }

            let report = match self.analyze(&spec) {
                Ok(report) => report,
                Err(err) if err.is_recoverable() => {
                    debug!(line = index + 1, merge = %spec.merge, error = %err, "skipping");
                    skipped += 1;
                    continue;
                }
                Err(err) => {
                    if let Some(pb) = &spinner {
                        pb.finish_and_clear();
                    }
                    return Err(err)
                        .wrap_err(format!("analyzing {} (input line {})", spec.merge, index + 1));
                }
            };
            analyzed += 1;

            if let Some(text) = self.render(&report)? {
                match &spinner {
                    Some(pb) => pb.suspend(|| print!("{text}")),
                    None => print!("{text}"),
                }
            }
        }

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }
        debug!(analyzed, skipped, "batch done");
        Ok(())
    }
}

const DEFAULT_CONFIG: &str = r#"# evilmerge configuration

[analysis]
# Prefix length for commit ids in hunk reports
# abbrev_length = 7
# Follow renames when computing diffs
# detect_renames = true
# Context lines around interdiff changes
# context_lines = 3

[output]
# text, json or markdown
# format = "text"
"#;

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn load_config(path: Option<&Path>) -> Result<EvilMergeConfig> {
    let config = match path {
        Some(path) => EvilMergeConfig::from_file(path)?,
        None => {
            let default_path = Path::new(".evilmerge.toml");
            if default_path.exists() {
                EvilMergeConfig::from_file(default_path)?
            } else {
                EvilMergeConfig::default()
            }
        }
    };
    Ok(config)
}

fn run_detector(cli: &Cli, detector: Detector, args: &MergeArgs) -> Result<ExitCode> {
    let spec = if args.stdin {
        None
    } else {
        match MergeSpec::from_args(&args.revs) {
            Some(spec) => Some(spec),
            None => {
                let mut cmd = Cli::command();
                if let Some(sub) = cmd.find_subcommand_mut(detector.name()) {
                    eprintln!("{}", sub.render_usage());
                }
                return Ok(ExitCode::FAILURE);
            }
        }
    };

    let config = load_config(cli.config.as_deref())?;
    let format = cli.format.unwrap_or(config.output.format);
    debug!(detector = detector.name(), %format, repo = %cli.repo.display(), "starting");

    let repo = GitRepository::discover(&cli.repo)?
        .with_rename_detection(config.analysis.detect_renames);
    let session = Session {
        repo,
        config,
        detector,
        format,
    };

    match spec {
        Some(spec) => session.run_single(&spec)?,
        None => session.run_batch()?,
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))?;
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Command::Tree(args) => run_detector(&cli, Detector::Tree, args),
        Command::Hunks(args) => run_detector(&cli, Detector::Hunks, args),
        Command::Init => {
            let path = Path::new(".evilmerge.toml");
            if path.exists() {
                miette::bail!(".evilmerge.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .evilmerge.toml with default configuration");
            Ok(ExitCode::SUCCESS)
        }
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "evilmerge", &mut std::io::stdout());
            Ok(ExitCode::SUCCESS)
        }
    }
}
