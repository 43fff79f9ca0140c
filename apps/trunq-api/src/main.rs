use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = trunq_api::Args::parse();

	trunq_api::run(args).await
}
