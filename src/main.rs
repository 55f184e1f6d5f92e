// src/main.rs

use monorepo_diff::env::ProcessEnv;
use monorepo_diff::exec::RealCommandRunner;
use monorepo_diff::{cli, load_plugin, logging, run};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("monorepo-diff error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    let env = ProcessEnv;
    let plugin = load_plugin(&args, &env)?;
    logging::init_logging(args.log_level, &plugin.log_level)?;
    run(&args, &plugin, &RealCommandRunner, &env).await?;
    Ok(())
}
