use clap::Parser;
use colored::Colorize;
use miette::{miette, IntoDiagnostic, Result, WrapErr};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use exactdeps::references::{BytecodeReferences, DotReferences, ReferenceSource};
use exactdeps::report::{check_failures, ReportContent, ReportFormat, Reporter};
use exactdeps::{ArtifactCache, Config, DependencyClassifier, ResolutionManifest};

/// exactdeps - Find unused and undeclared dependencies of JVM projects
#[derive(Parser, Debug)]
#[command(name = "exactdeps")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the project directory (config lookup and relative report paths)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Resolution manifest written by the build (YAML, JSON or TOML)
    #[arg(short, long, value_name = "FILE")]
    manifest: PathBuf,

    /// Compiled output to analyze: classes directory, jar or single class file
    #[arg(long, value_name = "PATH", conflicts_with = "dot_dir", required_unless_present = "dot_dir")]
    classes: Option<PathBuf>,

    /// Directory of jdeps dot reports, with the API report under `api/`
    #[arg(long, value_name = "DIR")]
    dot_dir: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write the YAML dependency report
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Console output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Fail when implicit or unused dependencies are found
    #[arg(long)]
    check: bool,

    /// Artifact cache file reused across runs
    #[arg(long, value_name = "FILE")]
    cache: Option<PathBuf>,

    /// Configuration to validate (can be specified multiple times)
    #[arg(long = "configuration", value_name = "NAME")]
    configurations: Vec<String>,

    /// Configuration whose artifacts are indexed
    #[arg(long, value_name = "NAME")]
    classpath_configuration: Option<String>,

    /// Dependencies never reported implicit or unused (can be specified multiple times)
    #[arg(long, value_name = "GROUP:NAME")]
    ignore: Vec<String>,

    /// Index artifacts and parse classes on a single thread
    #[arg(long)]
    no_parallel: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only output errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Terminal,
    Json,
    Yaml,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => ReportFormat::Terminal,
            OutputFormat::Json => ReportFormat::Json,
            OutputFormat::Yaml => ReportFormat::Yaml,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    info!("exactdeps v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;

    run_analysis(&config, &cli)
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        Config::from_default_locations(&cli.path)?
    };

    // Override with CLI arguments
    if !cli.configurations.is_empty() {
        config.configurations = cli.configurations.clone();
    }
    if let Some(classpath) = &cli.classpath_configuration {
        config.classpath_configuration = classpath.clone();
    }
    if !cli.ignore.is_empty() {
        config.ignore.extend(cli.ignore.clone());
    }
    if let Some(output) = &cli.output {
        config.report.output = output.clone();
    }
    if let Some(format) = cli.format {
        config.report.format = format!("{:?}", format).to_lowercase();
    }
    if let Some(cache) = &cli.cache {
        config.cache = Some(cache.clone());
    }
    if cli.no_parallel {
        config.parallel = false;
    }

    Ok(config)
}

fn run_analysis(config: &Config, cli: &Cli) -> Result<()> {
    let start_time = Instant::now();

    // Step 1: Read what the build resolved
    let manifest = ResolutionManifest::load(&cli.manifest).into_diagnostic()?;
    info!(
        "Loaded manifest for '{}' with {} configurations",
        manifest.project,
        manifest.configurations.len()
    );

    // Step 2: Collect referenced classes
    let references: Box<dyn ReferenceSource> = match (&cli.classes, &cli.dot_dir) {
        (Some(classes), _) => Box::new(
            BytecodeReferences::analyze(classes, config.parallel)
                .into_diagnostic()
                .wrap_err("Failed to analyze compiled classes")?,
        ),
        (None, Some(dot_dir)) => Box::new(
            DotReferences::from_dir(dot_dir)
                .into_diagnostic()
                .wrap_err("Failed to read dot reports")?,
        ),
        (None, None) => return Err(miette!("Either --classes or --dot-dir is required")),
    };
    info!(
        "Found {} referenced classes ({} in API)",
        references.used_classes().len(),
        references.api_classes().len()
    );

    // Step 3: Classify, reusing artifact listings when a cache is configured.
    // Relative cache and report paths are resolved against the project directory.
    let cache_path = config.cache.as_ref().map(|cache| cli.path.join(cache));
    let mut cache = cache_path.as_deref().map(ArtifactCache::load_or_default);
    let sets = {
        let mut classifier = DependencyClassifier::new(config).show_progress(!cli.quiet);
        if let Some(cache) = cache.as_mut() {
            classifier = classifier.with_cache(cache);
        }
        classifier
            .classify(&manifest, references.as_ref())
            .into_diagnostic()
            .wrap_err_with(|| format!("Dependency analysis of '{}' failed", manifest.project))?
    };

    if let (Some(cache), Some(cache_path)) = (cache.as_mut(), cache_path.as_deref()) {
        cache.prune_missing();
        if let Err(e) = cache.save(cache_path) {
            warn!("Failed to save artifact cache {}: {}", cache_path.display(), e);
        }
    }

    // Step 4: Persist the report
    let content = ReportContent::from(&sets);
    let report_path = cli.path.join(&config.report.output);
    content.save(&report_path).into_diagnostic()?;
    info!("Report written to {}", report_path.display());

    // Step 5: Print results
    if !cli.quiet {
        let format = ReportFormat::from_name(&config.report.format).unwrap_or_else(|| {
            warn!("Unknown report format '{}', using terminal", config.report.format);
            ReportFormat::Terminal
        });
        let reporter = Reporter::new(format).with_suggestions(config.report.suggestions);
        reporter.report(&content)?;

        let elapsed = start_time.elapsed();
        eprintln!(
            "{}",
            format!("Analyzed dependencies in {:.2}s", elapsed.as_secs_f64()).dimmed()
        );
    }

    if cli.check {
        let failures = check_failures(&content);
        if !failures.is_empty() {
            for failure in &failures {
                eprintln!("{}", failure.red());
            }
            return Err(miette!(
                "Found {} dependency problems in '{}'",
                failures.len(),
                manifest.project
            ));
        }
    }

    Ok(())
}
