//! `huffc`: compile a Huff source file to EVM bytecode.
//!
//! Usage: `huffc <input> [--macro NAME] [--template-arg ARG]... [-o FILE]`

use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use huff::{CompiledProgram, CompilerOptions, HuffError, Unit};

#[derive(Parser, Debug)]
#[command(name = "huffc")]
#[command(about = "Compile a Huff macro program to EVM bytecode")]
struct Args {
    /// Entry source file; includes resolve relative to its directory
    input: PathBuf,

    /// Macro to compile
    #[arg(long = "macro", default_value = "MAIN")]
    entry: String,

    /// Template argument for the entry macro (repeatable, in order)
    #[arg(long = "template-arg")]
    template_args: Vec<String>,

    /// Deepest allowed macro nesting
    #[arg(long, default_value_t = huff_compiler::options::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Most macro expansions in one compile
    #[arg(long, default_value_t = huff_compiler::options::DEFAULT_MAX_EXPANSIONS)]
    max_expansions: usize,

    /// Largest allowed bytecode in bytes, jump tables included
    #[arg(long, default_value_t = huff_compiler::options::DEFAULT_MAX_OUTPUT_BYTES)]
    max_output_bytes: usize,

    /// Print the source file and line of every byte
    #[arg(long)]
    source_map: bool,

    /// Print resolved jump labels and jump tables
    #[arg(long)]
    labels: bool,

    /// Write raw bytecode here instead of printing hex
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "huffc=info,huff=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        match err.downcast_ref::<HuffError>() {
            Some(HuffError::Parse(parse)) => error!("{}", parse.display_with_source()),
            _ => error!("{err:#}"),
        }
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let options = CompilerOptions::new()
        .with_max_depth(args.max_depth)
        .with_max_expansions(args.max_expansions)
        .with_max_output_bytes(args.max_output_bytes);

    let unit = Unit::open(&args.input)?.with_options(options);
    let program = unit.compile_with(&args.entry, &args.template_args)?;
    info!(
        entry = %args.entry,
        bytes = program.len(),
        "compiled {}",
        args.input.display()
    );

    match &args.output {
        Some(path) => fs::write(path, &program.bytecode)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", program.to_hex()),
    }

    if args.labels {
        print_labels(&program);
    }
    if args.source_map {
        print_source_map(&unit, &program);
    }
    Ok(())
}

fn print_labels(program: &CompiledProgram) {
    println!("labels:");
    for (label, index) in program.jump_indices.sorted() {
        println!("  {:#06x}  {label}", index.offset);
    }
    if program.tables.is_empty() {
        return;
    }
    println!("tables:");
    for table in &program.tables {
        let kind = if table.compressed { "packed" } else { "word" };
        println!(
            "  {:#06x}  {} ({kind}, {} bytes): {}",
            table.offset,
            table.name,
            table.size,
            table.labels.join(" ")
        );
    }
}

fn print_source_map(unit: &Unit, program: &CompiledProgram) {
    println!("source map:");
    for (offset, (byte, location)) in program
        .bytecode
        .iter()
        .zip(&program.source_map)
        .enumerate()
    {
        println!("  {offset:#06x}  {byte:02x}  {}", unit.describe(*location));
    }
}
