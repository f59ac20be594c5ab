//! Command-line glue: read a source file, drive the `tac_parser` compiler
//! façade over it, and write the six output artifacts under an `output/`
//! directory. Everything here is the "external collaborator" spec §1 calls
//! trivial — argument parsing, file I/O, directory creation — the core
//! lives entirely in `tac_lexer` and `tac_parser`.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use log::info;

use tac_parser::compile;

/// CLI configuration, generalizing the teacher's/original's ad hoc
/// `-i <path>` argument and `OUTPUT`/`DEBUG` kwargs into one explicit,
/// owned value (spec §9: state should be "passed explicitly as an owned
/// collaborator rather than as ambient state").
struct CompilerOptions {
    input_path: PathBuf,
    output_dir: PathBuf,
}

impl CompilerOptions {
    /// Parses `tacc -i <path> [-o <dir>]`, matching the teacher's `-i`
    /// convention (`io::parse_args`) plus an optional output-directory
    /// override. `-o` defaults to `output`, mirroring spec §6's "four
    /// [sic, six] text files ... under an `output/` directory."
    fn from_args() -> Result<Self> {
        let mut args = std::env::args().skip(1);
        let mut input_path = None;
        let mut output_dir = PathBuf::from("output");

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-i" => {
                    input_path = Some(PathBuf::from(
                        args.next().context("expected a file path after -i")?,
                    ));
                }
                "-o" => {
                    output_dir = PathBuf::from(
                        args.next().context("expected a directory path after -o")?,
                    );
                }
                other => {
                    anyhow::bail!("unrecognized argument `{other}` (expected -i <path> [-o <dir>])");
                }
            }
        }

        Ok(CompilerOptions {
            input_path: input_path.context("provide an input file with -i <path>")?,
            output_dir,
        })
    }
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR - {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let options = CompilerOptions::from_args()?;

    let source = fs::read(&options.input_path)
        .with_context(|| format!("cannot read contents of {}", options.input_path.display()))?;

    info!("compiling {}", options.input_path.display());
    let out = compile(&source);

    // `fs::create_dir_all` tolerates the directory already existing, the
    // same leniency the original's `os.mkdir` wanted from a caught
    // `FileExistsError`.
    fs::create_dir_all(&options.output_dir)
        .with_context(|| format!("cannot create output directory {}", options.output_dir.display()))?;

    write_artifact(&options.output_dir, "tokens.txt", &out.render_tokens())?;
    write_artifact(&options.output_dir, "lexical_errors.txt", &out.render_lexical_errors())?;
    write_artifact(&options.output_dir, "parse_tree.txt", &out.parse_tree)?;
    write_artifact(&options.output_dir, "syntax_errors.txt", &out.render_syntax_errors())?;
    write_artifact(&options.output_dir, "semantic_error.txt", &out.semantic_errors_rendered)?;
    write_artifact(&options.output_dir, "output.txt", &out.output_rendered)?;

    info!("wrote six artifacts to {}", options.output_dir.display());
    Ok(())
}

fn write_artifact(dir: &std::path::Path, name: &str, contents: &str) -> Result<()> {
    let path = dir.join(name);
    fs::write(&path, contents).with_context(|| format!("cannot write {}", path.display()))
}
