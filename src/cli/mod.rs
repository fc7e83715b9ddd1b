use crate::{
    config::AppConfig,
    server,
    tools::budget::{MAX_PARTY_SIZE, MAX_TRIP_DAYS},
    travel::{estimate, format_travel_summary},
    types::travel_types::{AgeGroup, TravelProfile, TravelStyle},
    DEFAULT_SESSION_ID,
};
use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn command() -> Command {
    Command::new("travel-assistant")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Conversational travel assistant: budgets, weather and tourism knowledge")
        .subcommand_required(true)
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .global(true)
                .value_name("MODEL")
                .help("Chat model to use (or set TRAVEL_MODEL)"),
        )
        .arg(
            Arg::new("api-key")
                .short('k')
                .long("api-key")
                .global(true)
                .value_name("KEY")
                .help("API key (or set OPENAI_API_KEY env var)"),
        )
        .arg(
            Arg::new("base-url")
                .short('u')
                .long("base-url")
                .global(true)
                .value_name("URL")
                .help("API base URL (or set OPENAI_BASE_URL / OPENROUTER_BASE_URL env vars)"),
        )
        .arg(
            Arg::new("max-iterations")
                .short('i')
                .long("max-iterations")
                .global(true)
                .value_name("COUNT")
                .value_parser(value_parser!(usize))
                .help("Maximum policy decisions per turn"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .value_name("FILTER")
                .help("Log filter, e.g. `debug` or `travel::weather=debug` (defaults to RUST_LOG or info)"),
        )
        .subcommand(
            Command::new("serve").about("Run the HTTP endpoint").arg(
                Arg::new("bind")
                    .short('b')
                    .long("bind")
                    .value_name("ADDR")
                    .help("Address to listen on (or set TRAVEL_BIND)"),
            ),
        )
        .subcommand(
            Command::new("ask")
                .about("Send one message to the assistant")
                .arg(Arg::new("message").required(true).index(1))
                .arg(
                    Arg::new("session")
                        .short('s')
                        .long("session")
                        .value_name("ID")
                        .default_value(DEFAULT_SESSION_ID),
                )
                .arg(
                    Arg::new("trace")
                        .long("trace")
                        .action(ArgAction::SetTrue)
                        .help("Print the step-by-step trace of the turn"),
                ),
        )
        .subcommand(
            Command::new("budget")
                .about("Estimate a trip budget offline")
                .arg(Arg::new("destination").required(true).index(1))
                .arg(
                    Arg::new("days")
                        .required(true)
                        .index(2)
                        .value_parser(value_parser!(u32).range(1..=i64::from(MAX_TRIP_DAYS))),
                )
                .arg(
                    Arg::new("style")
                        .required(true)
                        .index(3)
                        .help("budget, midrange or luxury"),
                )
                .arg(
                    Arg::new("people")
                        .short('p')
                        .long("people")
                        .value_name("N")
                        .value_parser(value_parser!(u32).range(1..=i64::from(MAX_PARTY_SIZE)))
                        .default_value("1"),
                )
                .arg(
                    Arg::new("age-group")
                        .short('a')
                        .long("age-group")
                        .value_name("GROUP")
                        .help("kids or elderly"),
                ),
        )
        .subcommand(
            Command::new("weather")
                .about("Look up the weather for a city and date")
                .arg(Arg::new("city").required(true).index(1))
                .arg(Arg::new("date").required(true).index(2)),
        )
}

fn init_logging(filter: Option<&str>) -> anyhow::Result<()> {
    let default_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = EnvFilter::try_new(filter.unwrap_or(&default_filter))
        .context("Invalid log filter")?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .try_init()
        .context("Failed to initialize logging")?;
    Ok(())
}

fn apply_overrides(config: &mut AppConfig, matches: &ArgMatches) {
    if let Some(model) = matches.get_one::<String>("model") {
        config.model = model.clone();
    }
    if let Some(api_key) = matches.get_one::<String>("api-key") {
        config.api_key = Some(api_key.clone());
    }
    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config.base_url = base_url.clone();
    }
    if let Some(max_iterations) = matches.get_one::<usize>("max-iterations") {
        config.max_iterations = *max_iterations;
    }
}

/// CLI entry point for the travel assistant
pub async fn run() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let matches = command().get_matches();
    init_logging(matches.get_one::<String>("log-level").map(String::as_str))?;

    let mut config = AppConfig::from_env().context("Failed to load configuration")?;
    apply_overrides(&mut config, &matches);

    match matches.subcommand() {
        Some(("serve", sub)) => {
            apply_overrides(&mut config, sub);
            if let Some(bind) = sub.get_one::<String>("bind") {
                config.bind = bind.clone();
            }
            let assistant = Arc::new(config.build_assistant()?);
            info!(model = %config.model, base_url = %config.base_url, "starting server");
            server::serve(assistant, &config.bind).await?;
        }
        Some(("ask", sub)) => {
            apply_overrides(&mut config, sub);
            let assistant = config.build_assistant()?;
            let message = sub
                .get_one::<String>("message")
                .context("message is required")?;
            let session = sub
                .get_one::<String>("session")
                .map(String::as_str)
                .unwrap_or(DEFAULT_SESSION_ID);

            info!(model = %config.model, "running turn");
            if sub.get_flag("trace") {
                let result = assistant.run(session, message).await?;
                println!("{}", result.replay());
            } else {
                let reply = assistant.chat(session, message).await;
                println!("{}", reply.response);
                if let Some(error) = reply.error {
                    anyhow::bail!(error);
                }
            }
        }
        Some(("budget", sub)) => {
            let destination = sub
                .get_one::<String>("destination")
                .context("destination is required")?;
            let days = *sub.get_one::<u32>("days").context("days is required")?;
            let style = sub
                .get_one::<String>("style")
                .map(|s| TravelStyle::parse_lenient(s))
                .unwrap_or_default();
            let people = sub.get_one::<u32>("people").copied().unwrap_or(1);
            let age_group = sub
                .get_one::<String>("age-group")
                .map(|g| AgeGroup::parse_lenient(g))
                .unwrap_or_default();

            let profile = TravelProfile::new(destination.clone(), days, style)
                .with_party_size(people)
                .with_age_group(age_group);
            println!("{}", format_travel_summary(&profile, &estimate(&profile)));
        }
        Some(("weather", sub)) => {
            let city = sub.get_one::<String>("city").context("city is required")?;
            let date = sub.get_one::<String>("date").context("date is required")?;
            let answer = config.weather_resolver()?.resolve(city, date).await?;
            println!("{}", answer.render());
        }
        _ => anyhow::bail!("Unknown command; run with --help"),
    }

    Ok(())
}
