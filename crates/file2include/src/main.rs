use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{CommandFactory, FromArgMatches, Parser};
use include_gen::{GenOptions, Generator, HeaderStyle};

// Exit statuses, one per failure class.
const EXIT_WRONG_OPTIONS: u8 = 1;
const EXIT_MISSING_INPUT_FILENAME: u8 = 2;
const EXIT_MISSING_OUTPUT_FILENAME: u8 = 3;
const EXIT_MISSING_INPUT_FILE: u8 = 4;
const EXIT_OUT_OF_MEMORY: u8 = 5;
const EXIT_CANNOT_CREATE_OUTPUT: u8 = 6;

#[derive(Debug, Parser)]
#[command(name = "file2include")]
#[command(about = "Convert one or more binary files into a C include/source pair")]
struct Args {
    /// Input filename of a binary file to embed. May be repeated.
    #[arg(short, long)]
    input: Vec<PathBuf>,

    /// Name to derive the generated symbols from instead of the input
    /// filename. Attaches to the most recent --input before it.
    #[arg(short, long)]
    name: Vec<String>,

    /// Output filename of the generated source file.
    #[arg(short = 'c', long)]
    source: Option<PathBuf>,

    /// Output filename of the generated include file.
    #[arg(short = 'H', long)]
    header: Option<PathBuf>,

    /// Declare per-file sizes as extern arrays instead of _SIZE macros.
    #[arg(long)]
    extern_sizes: bool,

    /// Reproduce the final-byte quirk of the legacy generator.
    #[arg(long)]
    legacy_final_byte: bool,

    /// Make execution verbose.
    #[arg(short, long)]
    verbose: bool,
}

/// One input file together with its optional display-name override.
#[derive(Debug)]
struct InputSpec {
    path: PathBuf,
    name: Option<String>,
}

/// Failure classes that map to the documented exit statuses.
#[derive(Copy, Clone, Debug)]
enum Failure {
    MissingInputFile,
    OutOfMemory,
    CannotWriteOutput,
}

impl Failure {
    fn exit_code(&self) -> u8 {
        match self {
            Self::MissingInputFile => EXIT_MISSING_INPUT_FILE,
            Self::OutOfMemory => EXIT_OUT_OF_MEMORY,
            Self::CannotWriteOutput => EXIT_CANNOT_CREATE_OUTPUT,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::MissingInputFile => "input file cannot be opened",
            Self::OutOfMemory => "cannot materialize file contents",
            Self::CannotWriteOutput => "output file cannot be written",
        };

        f.write_str(msg)
    }
}

impl std::error::Error for Failure {}

fn main() -> ExitCode {
    let mut cmd = Args::command();

    let matches = match cmd.clone().try_get_matches() {
        Ok(matches) => matches,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(EXIT_WRONG_OPTIONS);
        }
    };
    let args = match Args::from_arg_matches(&matches) {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(EXIT_WRONG_OPTIONS);
        }
    };

    if args.input.is_empty() {
        eprintln!("Missing input filename.");
        let _ = cmd.print_help();
        return ExitCode::from(EXIT_MISSING_INPUT_FILENAME);
    }

    let (source_path, header_path) = match (&args.source, &args.header) {
        (Some(source), Some(header)) => (source.clone(), header.clone()),
        _ => {
            eprintln!("Missing output filename.");
            let _ = cmd.print_help();
            return ExitCode::from(EXIT_MISSING_OUTPUT_FILENAME);
        }
    };

    let input_indices: Vec<_> = matches.indices_of("input").into_iter().flatten().collect();
    let name_indices: Vec<_> = matches.indices_of("name").into_iter().flatten().collect();
    let inputs = match pair_overrides(&args.input, &args.name, &input_indices, &name_indices) {
        Ok(inputs) => inputs,
        Err(err) => {
            eprintln!("{err}");
            let _ = cmd.print_help();
            return ExitCode::from(EXIT_WRONG_OPTIONS);
        }
    };

    match run(&args, &source_path, &header_path, &inputs) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            let _ = cmd.print_help();
            let code = err
                .downcast_ref::<Failure>()
                .map(Failure::exit_code)
                .unwrap_or(EXIT_WRONG_OPTIONS);
            ExitCode::from(code)
        }
    }
}

/// Attach each name override to the most recent input preceding it on the
/// command line, using the argument positions reported by clap. A later
/// override for the same input wins.
fn pair_overrides(
    inputs: &[PathBuf],
    names: &[String],
    input_indices: &[usize],
    name_indices: &[usize],
) -> anyhow::Result<Vec<InputSpec>> {
    let mut specs: Vec<InputSpec> = inputs
        .iter()
        .map(|path| InputSpec {
            path: path.clone(),
            name: None,
        })
        .collect();

    for (name, &at) in names.iter().zip(name_indices) {
        let slot = input_indices.partition_point(|&idx| idx < at);
        if slot == 0 {
            anyhow::bail!("name override `{name}` given before any input file");
        }
        specs[slot - 1].name = Some(name.clone());
    }

    Ok(specs)
}

fn run(
    args: &Args,
    source_path: &Path,
    header_path: &Path,
    inputs: &[InputSpec],
) -> anyhow::Result<()> {
    if args.verbose {
        for spec in inputs {
            match &spec.name {
                Some(name) => println!(
                    "Input filename          : {} (replaced as {})",
                    spec.path.display(),
                    name
                ),
                None => println!("Input filename          : {}", spec.path.display()),
            }
        }
        println!("Output source filename  : {}", source_path.display());
        println!("Output include filename : {}", header_path.display());
    }

    let source = File::create(source_path)
        .with_context(|| format!("cannot create file `{}`", source_path.display()))
        .context(Failure::CannotWriteOutput)?;
    let header = File::create(header_path)
        .with_context(|| format!("cannot create file `{}`", header_path.display()))
        .context(Failure::CannotWriteOutput)?;

    let options = GenOptions::new()
        .header_style(if args.extern_sizes {
            HeaderStyle::ExternArrays
        } else {
            HeaderStyle::SizeMacros
        })
        .legacy_final_byte(args.legacy_final_byte);

    let mut gen = Generator::new(options, BufWriter::new(source), BufWriter::new(header))
        .context(Failure::CannotWriteOutput)?;

    for spec in inputs {
        let file = File::open(&spec.path)
            .with_context(|| format!("missing file `{}`", spec.path.display()))
            .context(Failure::MissingInputFile)?;
        let len = file
            .metadata()
            .with_context(|| format!("missing file `{}`", spec.path.display()))
            .context(Failure::MissingInputFile)?
            .len();

        // Zero-length mappings are rejected on most platforms; an empty file
        // still gets its (empty) array.
        let map = match len {
            0 => None,
            _ => Some(
                unsafe { memmap2::Mmap::map(&file) }
                    .with_context(|| {
                        format!("out of memory during reading of `{}`", spec.path.display())
                    })
                    .context(Failure::OutOfMemory)?,
            ),
        };
        let data: &[u8] = map.as_deref().unwrap_or(&[]);

        let display = match &spec.name {
            Some(name) => name.clone(),
            None => spec.path.to_string_lossy().into_owned(),
        };
        gen.add(&display, data)
            .with_context(|| format!("failed to emit `{}`", spec.path.display()))
            .context(Failure::CannotWriteOutput)?;

        if args.verbose {
            println!("\t{}: {} bytes", spec.path.display(), data.len());
        }
    }

    gen.finish().context(Failure::CannotWriteOutput)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_attaches_to_most_recent_input() {
        // file2include -i a -n A -i b
        let inputs = [PathBuf::from("a"), PathBuf::from("b")];
        let names = ["A".to_string()];

        let specs = pair_overrides(&inputs, &names, &[1, 5], &[3]).unwrap();
        assert_eq!(specs[0].name.as_deref(), Some("A"));
        assert_eq!(specs[1].name, None);
    }

    #[test]
    fn later_override_wins() {
        // file2include -i a -n A -n B
        let inputs = [PathBuf::from("a")];
        let names = ["A".to_string(), "B".to_string()];

        let specs = pair_overrides(&inputs, &names, &[1], &[3, 5]).unwrap();
        assert_eq!(specs[0].name.as_deref(), Some("B"));
    }

    #[test]
    fn override_before_any_input_is_rejected() {
        // file2include -n A -i a
        let inputs = [PathBuf::from("a")];
        let names = ["A".to_string()];

        assert!(pair_overrides(&inputs, &names, &[3], &[1]).is_err());
    }
}
