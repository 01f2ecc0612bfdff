use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = campus_api::Args::parse();

	campus_api::run(args).await
}
