use anyhow::Result;
use clap::Parser;
use pvmatch::{commands, telemetry};
use tracing::Level;

#[derive(Parser)]
#[command(name = "pvmatch")]
#[command(about = "Pair bound PersistentVolumes of a source and a target cluster", long_about = None)]
#[command(version)]
struct Cli {
	#[command(flatten)]
	run: commands::RunArgs,

	/// Log level (possible values: error, warn, info, debug, trace). Overrides RUST_LOG
	#[arg(long)]
	log_level: Option<Level>,
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	telemetry::init(cli.log_level);

	commands::run(cli.run, std::io::stdout().lock())
}
