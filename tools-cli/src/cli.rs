use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{CustomType, Text};
use tools_core::{
    Config, ToolBox, ToolCall, WeatherResult, builtin_tools, current_time, provider_from_config,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "assistant-tools", version, about = "Clock and weather tools for assistants")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the current local time.
    Time,

    /// Show current weather for a location.
    Weather {
        /// City or place name, forwarded to the geocoder as-is.
        city: String,

        /// Print the raw result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run tool calls, e.g. `get_weather(city="Paris")`, and print their JSON results.
    Call {
        /// Call syntax, JSON, or any tagged tool-call format an assistant emits.
        call: String,
    },

    /// Print the function-calling schema of every tool.
    Schema,

    /// Interactively set the endpoints and client label.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Time => println!("{}", current_time()),
            Command::Weather { city, json } => {
                let config = Config::load()?;
                let provider = provider_from_config(&config)?;
                let weather = provider
                    .get_weather(&city)
                    .await
                    .with_context(|| format!("Failed to get weather for '{city}'"))?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&weather)?);
                } else {
                    print_weather(&city, &weather);
                }
            }
            Command::Call { call } => {
                let calls = ToolCall::parse_all(&call)?;
                let config = Config::load()?;
                let toolbox = ToolBox::new(provider_from_config(&config)?);

                let mut results = Vec::with_capacity(calls.len());
                for call in &calls {
                    let value = toolbox
                        .invoke(call)
                        .await
                        .with_context(|| format!("Tool '{}' failed", call.name))?;
                    results.push(value);
                }

                let output = match results.as_slice() {
                    [single] => serde_json::to_string_pretty(single)?,
                    _ => serde_json::to_string_pretty(&results)?,
                };
                println!("{output}");
            }
            Command::Schema => {
                let schema: Vec<_> = builtin_tools().iter().map(|t| t.to_json()).collect();
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
            Command::Configure => configure()?,
        }

        Ok(())
    }
}

fn print_weather(city: &str, weather: &WeatherResult) {
    println!("Weather for {city} ({})", weather.location);
    println!("  Time:          {} ({})", weather.time, weather.timezone);
    println!("  Temperature:   {}{}", weather.temperature, weather.temperature_unit);
    println!("  Precipitation: {}%", weather.precipitation_probability);
}

fn configure() -> anyhow::Result<()> {
    let current = Config::load()?;

    let geocode_url = Text::new("Geocoding endpoint:")
        .with_default(&current.geocode_url)
        .prompt()
        .context("Failed to read geocoding endpoint")?;

    let forecast_url = Text::new("Forecast endpoint:")
        .with_default(&current.forecast_url)
        .prompt()
        .context("Failed to read forecast endpoint")?;

    let user_agent = Text::new("Client label (User-Agent):")
        .with_default(&current.user_agent)
        .prompt()
        .context("Failed to read client label")?;

    let timeout_secs = CustomType::<u64>::new("Request timeout in seconds (0 = client default):")
        .with_default(current.timeout_secs.unwrap_or(0))
        .prompt()
        .context("Failed to read timeout")?;

    let config = Config {
        geocode_url,
        forecast_url,
        user_agent,
        timeout_secs: (timeout_secs > 0).then_some(timeout_secs),
    };

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}
