use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use std::{io::Write, path::PathBuf};
use tracing::info;

use crate::commands::{create_output, read_input};

#[derive(Args)]
pub struct DecompressArgs {
    /// An input Yaz0 file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target file
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl DecompressArgs {
    pub fn handle(&self) -> Result<()> {
        let data = read_input(&self.file)?;
        let header = ead_yaz0::Yaz0Header::parse(&data)
            .context(format!("reading header of {}", self.file.display()))?;
        info!(
            "decompressing {} into {} bytes",
            self.file.display(),
            header.uncompressed_size
        );

        let decompressed = ead_yaz0::decompress(&data)
            .context(format!("decompressing {}", self.file.display()))?;

        create_output(&self.output, self.overwrite)?
            .write_all(&decompressed)
            .into_diagnostic()
            .context(format!("writing {}", self.output.display()))?;

        Ok(())
    }
}
