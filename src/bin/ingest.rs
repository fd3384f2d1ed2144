//! Builds `data/graph.json` and `data/content.json` from a tree of markdown posts.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
	use std::path::PathBuf;

	use anyhow::Context;
	use clap::Parser;
	use knowledge_garden::ingest::{self, IngestConfig};

	#[derive(Parser)]
	#[command(name = "ingest")]
	#[command(about = "Convert markdown posts into the knowledge graph data files")]
	struct Cli {
		/// Root of the content tree, one directory per category.
		source: PathBuf,

		/// Directory receiving graph.json and content.json.
		#[arg(long, default_value = "data")]
		data_dir: PathBuf,

		/// Directory receiving copied images.
		#[arg(long, default_value = "public/migrated")]
		public_dir: PathBuf,

		/// URL path the public directory is served under.
		#[arg(long, default_value = "/migrated")]
		public_prefix: String,

		/// Name of the central node.
		#[arg(long, default_value = "Simone Mattioli")]
		me_name: String,

		/// Description of the central node.
		#[arg(long, default_value = "Computer Science Student, AI Enthusiast, Volunteer.")]
		me_desc: String,

		/// Parse and validate only; write nothing.
		#[arg(long)]
		dry_run: bool,

		/// Log every file.
		#[arg(short, long)]
		verbose: bool,
	}

	pub fn main() -> anyhow::Result<()> {
		let cli = Cli::parse();

		let filter = if cli.verbose { "debug" } else { "info" };
		env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

		let config = IngestConfig {
			source_dir: cli.source,
			data_dir: cli.data_dir,
			public_dir: cli.public_dir,
			public_prefix: cli.public_prefix,
			me_name: cli.me_name,
			me_desc: cli.me_desc,
			dry_run: cli.dry_run,
		};
		let summary = ingest::run(&config)
			.with_context(|| format!("ingesting {}", config.source_dir.display()))?;

		println!(
			"{} nodes, {} links, {} skipped, {} hierarchy problems",
			summary.nodes,
			summary.links,
			summary.skipped,
			summary.violations.len()
		);
		Ok(())
	}
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
	cli::main()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
