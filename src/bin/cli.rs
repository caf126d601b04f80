use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use hotel_knn::{
    features, resolve, state, storage, Coordinate, Dataset, Error, NominatimGeocoder,
    RankedHotel, RecommendRequest, Recommender, ReferenceIndex, Settings,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hotel-knn", about = "Recommend hotels near a location")]
struct Cli {
    /// Settings file (defaults to hotel-knn.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Hotel dataset CSV
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,
    /// Model artifact
    #[arg(long, global = true)]
    model: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the model artifact from the dataset
    Fit,
    /// Geocode a city and recommend hotels around it
    Recommend {
        #[arg(long)]
        city: String,
        #[arg(long)]
        state: String,
        #[arg(long, default_value_t = 3)]
        rating: i64,
        #[arg(long = "amenity")]
        amenities: Vec<String>,
        #[arg(short)]
        k: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Query the index directly with a coordinate
    Neighbors {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long, default_value_t = 3)]
        rating: i64,
        #[arg(long = "amenity")]
        amenities: Vec<String>,
        #[arg(short)]
        k: Option<usize>,
    },
    /// List states, or the cities of one state
    Locations {
        #[arg(long)]
        state: Option<String>,
    },
}

fn print_table(hotels: &[RankedHotel]) {
    println!("{:>4}  {:<40} {:<40} {:<16} {}", "rank", "name", "address", "phone", "website");
    for h in hotels {
        println!(
            "{:>4}  {:<40} {:<40} {:<16} {}",
            h.rank, h.hotel.name, h.hotel.address, h.hotel.phone, h.hotel.website
        );
    }
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(p) = cli.dataset {
        settings.dataset_path = p;
    }
    if let Some(p) = cli.model {
        settings.model_path = p;
    }

    let dataset = Dataset::open(&settings.dataset_path)
        .with_context(|| format!("loading {}", settings.dataset_path.display()))?;

    match cli.command {
        Commands::Fit => {
            let index = ReferenceIndex::fit(&dataset, settings.retrieval);
            storage::save(&index, &settings.model_path)?;
            println!("{} rows -> {}", index.len(), settings.model_path.display());
        }
        Commands::Locations { state } => match state {
            Some(s) => dataset.cities(&s).iter().for_each(|c| println!("{c}")),
            None => dataset.states().iter().for_each(|s| println!("{s}")),
        },
        Commands::Neighbors {
            lat,
            lon,
            rating,
            amenities,
            k,
        } => {
            let index = storage::load(&settings.model_path, settings.retrieval)
                .with_context(|| format!("loading {}", settings.model_path.display()))?;
            let vector = features::build(Coordinate::new(lat, lon)?, rating, &amenities)?;
            let result = index.query(&vector, k.unwrap_or(settings.k))?;
            for n in &result {
                println!("{} {}", n.code, n.distance);
            }
            print_table(&resolve(&dataset, &result));
        }
        Commands::Recommend {
            city,
            state: state_name,
            rating,
            amenities,
            k,
            json,
        } => {
            let index = storage::load(&settings.model_path, settings.retrieval)
                .with_context(|| format!("loading {}", settings.model_path.display()))?;
            state::init(dataset, index)?;
            let geocoder = NominatimGeocoder::new(&settings.geocoder)?;
            let recommender = Recommender::from_shared(geocoder)?;
            let request = RecommendRequest {
                city,
                state: state_name,
                rating,
                amenities,
                k: k.unwrap_or(settings.k),
            };
            let recommendation = match recommender.recommend(&request) {
                Ok(r) => r,
                Err(e @ Error::GeocodeNotFound { .. }) => {
                    eprintln!("{e}");
                    return Ok(ExitCode::from(2));
                }
                Err(e @ Error::ServiceUnavailable(_)) => {
                    eprintln!("{e}; try again later");
                    return Ok(ExitCode::from(3));
                }
                Err(e) => return Err(e.into()),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&recommendation)?);
            } else if recommendation.is_empty() {
                println!("No hotels found near {}, {}.", request.city, request.state);
            } else {
                print_table(recommendation.top(settings.display));
                let mappable = recommendation.mappable().count();
                println!(
                    "{mappable} of {} hotels have map coordinates",
                    recommendation.hotels.len()
                );
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
