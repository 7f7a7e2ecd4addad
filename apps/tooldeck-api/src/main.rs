use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = tooldeck_api::Args::parse();

	tooldeck_api::run(args).await
}
