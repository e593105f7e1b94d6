mod cli;
mod handlers;
mod printer;

use anyhow::Result;
use scriptrun::Config;

#[tokio::main]
async fn main() {
    let args = cli::Cli::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if args.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    match dispatch(args).await {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

async fn dispatch(args: cli::Cli) -> Result<i32> {
    let cfg = Config::load();
    log::debug!("loaded config from {}", cfg.config_path.display());

    if let Some(id) = &args.add_script {
        // clap guarantees --file alongside --add-script
        if let Some(file) = &args.file {
            handlers::scripts::add(&cfg, id, file)?;
        }
        return Ok(0);
    }
    if let Some(id) = &args.remove_script {
        handlers::scripts::remove(&cfg, id)?;
        return Ok(0);
    }
    if args.list_scripts {
        handlers::scripts::list(&cfg)?;
        return Ok(0);
    }
    if args.list_history {
        handlers::history::list(&cfg, args.limit, args.json)?;
        return Ok(0);
    }

    handlers::run::run(&cfg, args.id.as_deref(), args.file.as_deref(), args.json).await
}
