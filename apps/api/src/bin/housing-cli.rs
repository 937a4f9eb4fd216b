use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use housing_api::client::{HousingClient, DEFAULT_BASE_URL};
use housing_api::prediction::record::PropertyRecord;

#[derive(Parser, Debug)]
#[command(
    name = "housing-cli",
    about = "Query a running Housing Price Prediction API",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Commands,
    /// Base URL of the prediction service
    #[arg(long, default_value = DEFAULT_BASE_URL, global = true)]
    url: String,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show which model components the service has loaded
    Health,
    /// Show model type and feature schema
    Info,
    /// Predict from the attributes given (missing ones are zero-filled)
    Predict(PropertyArgs),
    /// Predict with service-side defaults for missing attributes
    Simple(PropertyArgs),
}

#[derive(ClapArgs, Debug)]
struct PropertyArgs {
    /// Floor area in square feet
    #[arg(long)]
    area: Option<f64>,
    #[arg(long)]
    bedrooms: Option<u32>,
    #[arg(long)]
    bathrooms: Option<u32>,
    #[arg(long)]
    stories: Option<u32>,
    /// Parking spaces
    #[arg(long)]
    parking: Option<u32>,
    /// Connected to a main road (yes/no)
    #[arg(long)]
    mainroad: Option<String>,
    #[arg(long)]
    guestroom: Option<String>,
    #[arg(long)]
    basement: Option<String>,
    #[arg(long)]
    hotwaterheating: Option<String>,
    #[arg(long)]
    airconditioning: Option<String>,
    /// In a preferred area (yes/no)
    #[arg(long)]
    prefarea: Option<String>,
    /// furnished, semi-furnished or unfurnished
    #[arg(long)]
    furnishingstatus: Option<String>,
}

impl PropertyArgs {
    fn into_record(self) -> PropertyRecord {
        let mut record = PropertyRecord::new();
        let numbers = [
            ("area", self.area),
            ("bedrooms", self.bedrooms.map(f64::from)),
            ("bathrooms", self.bathrooms.map(f64::from)),
            ("stories", self.stories.map(f64::from)),
            ("parking", self.parking.map(f64::from)),
        ];
        for (field, value) in numbers {
            if let Some(v) = value {
                record.insert(field, v);
            }
        }
        let categories = [
            ("mainroad", self.mainroad),
            ("guestroom", self.guestroom),
            ("basement", self.basement),
            ("hotwaterheating", self.hotwaterheating),
            ("airconditioning", self.airconditioning),
            ("prefarea", self.prefarea),
            ("furnishingstatus", self.furnishingstatus),
        ];
        for (field, value) in categories {
            if let Some(v) = value {
                record.insert(field, v);
            }
        }
        record
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let client = HousingClient::new(args.url)?;

    match args.command {
        Commands::Health => {
            let health = client.health().await?;
            println!("Status:          {}", health.status);
            println!("Model loaded:    {}", health.model_loaded);
            println!("Scaler loaded:   {}", health.scaler_loaded);
            println!("Encoders loaded: {}", health.encoders_loaded);
            println!("Checked at:      {}", health.timestamp);
        }
        Commands::Info => {
            let info = client.info().await?;
            println!("Model:    {}", info.model_type);
            println!("Scaler:   {}", info.scaler_type);
            println!("Features ({}): {}", info.num_features, info.features.join(", "));
            println!("Categorical: {}", info.categorical_features.join(", "));
        }
        Commands::Predict(property) => {
            let response = client.predict(&property.into_record()).await?;
            println!("Predicted price: {:.2}", response.predicted_price);
            println!("Input: {}", serde_json::to_string(&response.input_data)?);
        }
        Commands::Simple(property) => {
            let response = client.predict_simple(&property.into_record()).await?;
            let summary = response.input_summary;
            println!("Predicted price: {:.2}", response.predicted_price);
            println!("Price per sqft:  {:.2}", response.price_per_sqft);
            println!(
                "Area {} sqft, {} bedrooms, {} bathrooms, location {:?}",
                summary.area, summary.bedrooms, summary.bathrooms, summary.location_quality
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_only_given_flags_are_sent() {
        let args = Args::parse_from([
            "housing-cli",
            "simple",
            "--area",
            "1500",
            "--prefarea",
            "yes",
        ]);
        let Commands::Simple(property) = args.command else {
            panic!("expected simple subcommand");
        };
        let record = property.into_record();
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("area"), Some(&json!(1500.0)));
        assert_eq!(record.get("prefarea"), Some(&json!("yes")));
    }

    #[test]
    fn test_url_defaults_to_localhost() {
        let args = Args::parse_from(["housing-cli", "health"]);
        assert_eq!(args.url, DEFAULT_BASE_URL);
        assert_eq!(args.verbose, 0);
    }
}
