use anyhow::Context;
use clap::Parser;
use prewire::model::{DeclarationSet, TypeDecl};
use prewire::{Generator, GeneratorConfig, Severity};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Run the prewire generation pass over a declaration set.
///
/// The input is a JSON array of type declarations, typically produced by
/// a host-compiler adapter. Generated units land in the output directory
/// under their unit names; diagnostics go to stderr.
#[derive(Parser)]
#[command(name = "prewire", version, about)]
struct Args {
    /// Declaration set to compile (JSON)
    input: PathBuf,

    /// Directory for generated source units
    #[arg(short, long, default_value = "generated")]
    out_dir: PathBuf,

    /// Print diagnostics as JSON instead of human-readable text
    #[arg(long)]
    json_diagnostics: bool,

    /// Simple name of the contextual marker type
    #[arg(long, default_value = "Logger")]
    contextual_type: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let declarations: Vec<TypeDecl> =
        serde_json::from_str(&text).context("malformed declaration set")?;
    let set = DeclarationSet::new(declarations)?;

    let config = GeneratorConfig {
        contextual_type: args.contextual_type,
        ..GeneratorConfig::default()
    };
    let output = Generator::new(config).run(&set);

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;
    for unit in &output.units {
        let path = args.out_dir.join(&unit.name);
        fs::write(&path, &unit.contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    tracing::info!(
        units = output.units.len(),
        out_dir = %args.out_dir.display(),
        "wrote generated units"
    );

    if args.json_diagnostics {
        println!("{}", serde_json::to_string_pretty(&output.diagnostics)?);
    } else {
        for diagnostic in &output.diagnostics {
            eprintln!("{diagnostic}");
        }
    }

    // Diagnostics never block the surrounding build; errors here mean the
    // generated table is already running on priority fallbacks.
    let errors = output
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    if errors > 0 {
        tracing::warn!(errors, "generation completed with errors");
    }
    Ok(())
}
