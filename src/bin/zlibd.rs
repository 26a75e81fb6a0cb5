use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use structopt::StructOpt;
use zlib_codec_rs::{compress, decompress};

#[derive(StructOpt)]
struct ZlibParams {
    /// Input file; reads stdin if omitted.
    input: Option<PathBuf>,

    /// Output file; writes stdout if omitted.
    output: Option<PathBuf>,

    /// Decompress instead of compress.
    #[structopt(short, long)]
    decompress: bool,
}

fn read_input(input: &Option<PathBuf>) -> io::Result<Vec<u8>> {
    match input {
        Some(path) => fs::read(path),
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

fn write_output(output: &Option<PathBuf>, data: &[u8]) -> io::Result<()> {
    match output {
        Some(path) => fs::write(path, data),
        None => io::stdout().write_all(data),
    }
}

fn main() {
    env_logger::init();
    let params: ZlibParams = ZlibParams::from_args();

    let input = read_input(&params.input).unwrap_or_else(|e| {
        eprintln!("zlibd: failed to read input: {e}");
        std::process::exit(1);
    });

    let result = if params.decompress {
        decompress(&input).unwrap_or_else(|e| {
            eprintln!("zlibd: {e}");
            std::process::exit(1);
        })
    } else {
        compress(&input)
    };

    if let Err(e) = write_output(&params.output, &result) {
        eprintln!("zlibd: failed to write output: {e}");
        std::process::exit(1);
    }
}
