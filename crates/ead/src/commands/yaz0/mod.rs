pub mod decompress;

#[derive(clap::Subcommand)]
pub enum Yaz0Commands {
    /// Decompress a Yaz0 file
    Decompress(decompress::DecompressArgs),
}

impl Yaz0Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Yaz0Commands::Decompress(decompress) => decompress.handle(),
        }
    }
}
