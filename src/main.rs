use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use virt16_core::assembler::assembler::{Assembler, AssemblerOptions};

/// Two-pass assembler for the virt16 instruction set.
#[derive(Parser, Debug)]
#[command(name = "virt16-asm", version, about)]
struct Cli {
    /// Source file to assemble
    source: PathBuf,

    /// Image path (defaults to build/<name>.bin)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fail without writing the image when any error was reported
    #[arg(long)]
    strict: bool,

    /// Write placements even where they overlap code or other placements
    #[arg(long)]
    allow_overlap: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("virt16-asm: {err:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(cli: Cli) -> Result<()> {
    let source = fs::read_to_string(&cli.source)
        .with_context(|| format!("failed to read {}", cli.source.display()))?;

    let options = AssemblerOptions {
        check_placements: !cli.allow_overlap,
        ..AssemblerOptions::default()
    };
    let assembly = Assembler::with_options(options).assemble(&source)?;

    for diagnostic in assembly.diagnostics().iter() {
        eprintln!(
            "{}: {}: {diagnostic}",
            cli.source.display(),
            diagnostic.severity()
        );
    }

    let errors = assembly.diagnostics().error_count();
    if cli.strict && errors > 0 {
        bail!("{errors} error(s) reported; image not written");
    }

    let output = cli.output.unwrap_or_else(|| default_output_path(&cli.source));
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let file = fs::File::create(&output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    assembly
        .image
        .write_to(std::io::BufWriter::new(file))
        .with_context(|| format!("failed to write {}", output.display()))?;

    log::info!(
        "wrote {} word(s) ({} instruction(s)) to {}",
        assembly.image.len(),
        assembly.program.len(),
        output.display()
    );
    Ok(())
}

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or(input.as_os_str());
    PathBuf::from("build").join(format!("{}.bin", stem.to_string_lossy()))
}
