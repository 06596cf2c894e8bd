use clap::Parser;

use arpa_linker::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = Args::parse();

	arpa_linker::run(args).await
}
