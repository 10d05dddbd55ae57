use clap::Args;
use miette::{miette, Context, IntoDiagnostic, Result};
use std::{
    io::Write,
    path::{Component, Path, PathBuf},
};
use tracing::info;

use ead_sarc::SarcArchive;

use crate::commands::{create_output, read_input, sarc::unnamed_file_name};

#[derive(Args)]
pub struct ExtractArgs {
    /// An input SARC file, optionally Yaz0 compressed
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

/// Join an archived name onto `directory`, refusing names that would escape it
fn target_path(directory: &Path, name: &str) -> Result<PathBuf> {
    let relative = Path::new(name);
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        return Err(miette!(
            "refusing to extract {name} outside of {}",
            directory.display()
        ));
    }

    Ok(directory.join(relative))
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let data = read_input(&self.file)?;
        let sarc = SarcArchive::open_compressed(&data)?;

        for file in sarc.files() {
            let p = match file.name() {
                Some(name) => target_path(&self.directory, name)?,
                None => self.directory.join(unnamed_file_name(file.name_hash())),
            };
            info!("writing {}", p.display());

            if let Some(parent) = p.parent() {
                std::fs::create_dir_all(parent)
                    .into_diagnostic()
                    .context(format!("creating {}", parent.display()))?;
            }

            create_output(&p, self.overwrite)?
                .write_all(file.data())
                .into_diagnostic()
                .context(format!("writing {}", p.display()))?;
        }

        Ok(())
    }
}
