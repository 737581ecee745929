//! zjump CLI - a file compressor built on the Jump-Sequence Transform.

use clap::Parser;
use std::fs::File;
use std::io::{self, Cursor, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use zjump::{compress_stream, decompress_stream};
use zjump_core::{Result, ZjumpError};

const COMPRESSED_EXT: &str = "zjump";
const DECOMPRESSED_EXT: &str = "orig";

#[derive(Parser)]
#[command(name = "zjump")]
#[command(version, about = "A file compressor built on the Jump-Sequence Transform")]
#[command(long_about = "\
zjump, a file compressor/decompressor.

If no FILE is given, zjump compresses or decompresses from standard input
to standard output.")]
struct Cli {
    /// Write on standard output
    #[arg(short = 'c', long = "stdout")]
    stdout: bool,

    /// Decompress FILE
    #[arg(short, long)]
    decompress: bool,

    /// Force overwriting the output file
    #[arg(short, long)]
    force: bool,

    /// File to compress or decompress; standard input when omitted
    file: Option<PathBuf>,
}

/// Default output file: `<input>.zjump` when compressing; when
/// decompressing, strip a trailing `.zjump`, else append `.orig`. `None`
/// targets standard output.
fn output_path(cli: &Cli) -> Option<PathBuf> {
    if cli.stdout {
        return None;
    }
    let input = cli.file.as_ref()?;

    if cli.decompress {
        if input.extension().and_then(|ext| ext.to_str()) == Some(COMPRESSED_EXT) {
            Some(input.with_extension(""))
        } else {
            let mut name = input.clone().into_os_string();
            name.push(".");
            name.push(DECOMPRESSED_EXT);
            Some(name.into())
        }
    } else {
        let mut name = input.clone().into_os_string();
        name.push(".");
        name.push(COMPRESSED_EXT);
        Some(name.into())
    }
}

fn run(cli: &Cli) -> Result<()> {
    let out_path = output_path(cli);

    if let Some(path) = &out_path {
        if !cli.force && path.exists() {
            return Err(ZjumpError::Io(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("output file {} already exists", path.display()),
            )));
        }
    }

    let mut input: Box<dyn Read> = match &cli.file {
        Some(path) => Box::new(File::open(path)?),
        None => Box::new(io::stdin().lock()),
    };

    if cli.decompress {
        match &out_path {
            Some(path) => {
                let mut output = File::create(path)?;
                decompress_stream(&mut input, &mut output)
            }
            None => decompress_stream(&mut input, &mut io::stdout().lock()),
        }
    } else {
        match &out_path {
            Some(path) => {
                let mut output = File::create(path)?;
                compress_stream(&mut input, &mut output)
            }
            None => {
                // Standard output is not seekable, and the compressor must
                // back-patch its block count: stage the stream in memory.
                let mut staged = Cursor::new(Vec::new());
                compress_stream(&mut input, &mut staged)?;
                let mut stdout = io::stdout().lock();
                stdout.write_all(staged.get_ref())?;
                stdout.flush()?;
                Ok(())
            }
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("zjump: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
