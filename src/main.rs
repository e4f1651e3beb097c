use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use spdlog::{info, warn};

use penned::blog_server::server_run;
use penned::config::{get_config_path, read_config, write_sample_cfg, Config, CFG_FILE_NAME};
use penned::logger::configure_logger;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config path
    #[arg(short, long)]
    config_path: Option<String>,

    /// Write a sample penned.toml to the current directory and exit
    #[arg(long)]
    generate_config: bool,
}

fn open_config(cfg_path: Option<PathBuf>) -> Result<Config, String> {
    let config_path = cfg_path.unwrap_or(match get_config_path() {
        None => return Err("Could not find penned configuration".to_string()),
        Some(x) => x,
    });

    println!("Reading config from {}", config_path.to_str().unwrap());
    let mut config = match read_config(&config_path) {
        Ok(config) => config,
        Err(e) => return Err(e.to_string()),
    };

    if let Some(mut log) = config.log {
        let location = log.location.unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap()
                .join("penned")
                .join("log")
                .join("blog.log")
        });
        println!("Log enabled. Files will be written in {}", location.to_str().unwrap());
        log.location = Some(location);
        config.log = Some(log);
    } else {
        println!("Log disabled. Using stdout");
    }

    Ok(config)
}

#[ntex::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.generate_config {
        let target = PathBuf::from(CFG_FILE_NAME);
        write_sample_cfg(&target)?;
        println!("Sample configuration written to {}", target.display());
        return Ok(());
    }

    let config = match open_config(args.config_path.map(PathBuf::from)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("Please run penned --help");
            return Ok(());
        }
    };

    if let Err(err) = configure_logger(&config) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }

    info!("Starting penned blog =-=-=-=-=-=-=-=-=-=-=-=-=-=-=-");
    info!("Listening on {}:{}", config.blog.address, config.blog.port);

    server_run(config).await?;

    Ok(())
}
