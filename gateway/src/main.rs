#![deny(clippy::all)]
#![deny(rust_2018_idioms)]

use clap::{crate_version, Arg, Command};

use gateway::{application::EnvConfig, Application};
use primitives::{config::configuration, util::logging::new_logger};
use slog::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Command::new("Gateway")
        .version(crate_version!())
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("the config file for the gateway")
                .takes_value(true),
        )
        .get_matches();

    let env_config = EnvConfig::from_env()?;
    let config = configuration(env_config.env, cli.value_of("config"))?;

    let logger = new_logger("gateway");
    info!(&logger, "Starting gateway"; "environment" => ?env_config.env, "base_url" => %config.base_url);

    Application::new(config, logger)
        .run(env_config.socket_addr())
        .await;

    Ok(())
}
