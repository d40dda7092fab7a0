#![deny(rust_2018_idioms)]
#![deny(clippy::all)]

use std::error::Error;

use clap::{crate_version, Arg, ArgMatches, Command};
use serde::Serialize;
use slog::{error, info};

use adapter::Credentials;
use primitives::{
    config::{configuration, Environment},
    util::logging::new_logger,
    Period, ReportKind,
};
use report_worker::{
    stats::{campaign_stats, compare_periods},
    ReportJobs, SearchAdApi,
};

fn year_month_args(year: &'static str, month: &'static str) -> [Arg<'static>; 2] {
    [
        Arg::new(year)
            .long(year)
            .help("the year of the period")
            .required(true)
            .takes_value(true),
        Arg::new(month)
            .long(month)
            .help("the month of the period, 1 to 12")
            .required(true)
            .takes_value(true),
    ]
}

fn period_of(matches: &ArgMatches, year: &str, month: &str) -> Result<Period, Box<dyn Error>> {
    let year = matches.value_of_t::<i32>(year)?;
    let month = matches.value_of_t::<u32>(month)?;

    Ok(Period::month(year, month)?)
}

fn credentials_from_env() -> Result<Credentials, Box<dyn Error>> {
    let api_key = std::env::var("SEARCHAD_API_KEY")?;
    let customer_id = std::env::var("SEARCHAD_CUSTOMER_ID")?;
    let secret_key = std::env::var("SEARCHAD_SECRET_KEY")?;

    Ok(Credentials::new(api_key, customer_id, secret_key)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Command::new("Report worker")
        .version(crate_version!())
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("the config file for the report worker")
                .takes_value(true),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("report")
                .about("submits a report job and waits for its download url")
                .arg(
                    Arg::new("kind")
                        .long("kind")
                        .short('k')
                        .help("the kind of report, e.g. `Campaign` or `CampaignPerformance`")
                        .default_value("Campaign")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("profile")
                        .long("profile")
                        .short('p')
                        .help("the report profile from the config, defaults to `report_job.default_profile`")
                        .takes_value(true),
                )
                .args(year_month_args("year", "month")),
        )
        .subcommand(
            Command::new("stats")
                .about("prints the stats of every campaign for a month")
                .args(year_month_args("year", "month")),
        )
        .subcommand(
            Command::new("compare")
                .about("compares the stats of every campaign between two months")
                .args(year_month_args("year1", "month1"))
                .args(year_month_args("year2", "month2")),
        )
        .get_matches();

    let environment = std::env::var("ENV")
        .ok()
        .map(|env| serde_json::from_value::<Environment>(serde_json::Value::String(env)))
        .transpose()?
        .unwrap_or_default();
    let config = configuration(environment, cli.value_of("config"))?;

    let logger = new_logger("report_worker");
    let api = SearchAdApi::from_config(&config, credentials_from_env()?, logger.clone())?;

    info!(&logger, "Running report worker"; "environment" => ?environment, "base_url" => %config.base_url, "customer" => api.customer_id());

    match cli.subcommand() {
        Some(("report", matches)) => {
            let kind = matches.value_of_t::<ReportKind>("kind")?;
            let period = period_of(matches, "year", "month")?;
            let profile = config.report_profile(matches.value_of("profile"))?;

            let jobs = ReportJobs::new(api, profile.clone(), &config.report_job);
            match jobs.run(kind, period).await {
                Ok(result) => print_json(&result)?,
                Err(err) => {
                    error!(&logger, "Report job failed"; "error" => %err);
                    return Err(err.into());
                }
            }
        }
        Some(("stats", matches)) => {
            let period = period_of(matches, "year", "month")?;

            print_json(&campaign_stats(&api, &config, period).await?)?;
        }
        Some(("compare", matches)) => {
            let before = period_of(matches, "year1", "month1")?;
            let after = period_of(matches, "year2", "month2")?;

            print_json(&compare_periods(&api, &config, before, after).await?)?;
        }
        _ => unreachable!("A subcommand is required"),
    }

    Ok(())
}
