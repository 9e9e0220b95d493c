//! `catchlog` - CLI for the catchlog trip wizard
//!
//! Each subcommand performs one wizard page action against the local
//! database and prints where the trip goes next.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use clap::Parser;

use catchlog::cli::{CatchCommand, Cli, Command, ConfigCommand, TripCommand};
use catchlog::format::{format_24_hour_to_12_hour, format_date};
use catchlog::validate::FieldErrors;
use catchlog::wizard::{BatchOutcome, Navigation, PageLoad, Review, Route};
use catchlog::{
    init_logging, Catch, CatchInput, Config, Error, FormOutcome, Storage, Trip, Wizard,
    WriteOutcome,
};

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() -> CliResult {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Trip(trip_cmd) => handle_trip(&config, trip_cmd),
        Command::Catch(catch_cmd) => handle_catch(&config, catch_cmd),
        Command::Species => {
            handle_species(&config);
            Ok(())
        }
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

fn open_wizard(config: &Config) -> Result<Wizard<Storage>, Error> {
    let storage = Storage::open(config.database_path())?;
    Ok(Wizard::new(storage, config.catch_limits()))
}

/// Print field errors and turn them into a failing result.
fn rejected(form: &str, errors: &FieldErrors) -> Box<dyn std::error::Error> {
    for message in errors.values() {
        eprintln!("  {message}");
    }
    format!("{form} was not saved").into()
}

fn display_time(value: Option<&str>) -> String {
    match value {
        Some(time) => {
            let formatted = format_24_hour_to_12_hour(time);
            if formatted.is_empty() {
                time.to_string()
            } else {
                formatted
            }
        }
        None => "-".to_string(),
    }
}

fn trip_line(config: &Config, trip: &Trip) -> String {
    format!(
        "{}  {:<20}  {:<14}  step {}",
        trip.id,
        format_date(trip.trip_date.as_deref(), &config.display.date_format),
        trip.status.as_str(),
        trip.step
    )
}

fn catch_line(catch: &Catch) -> String {
    let measure = |value: Option<f64>| value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"));
    let mut line = format!(
        "{}  {:>8}  {:<12}  {:>6} lbs  {:>6} in",
        catch.id,
        display_time(Some(catch.time.as_str())),
        catch.species,
        measure(catch.weight),
        measure(catch.length)
    );
    if let (Some(lat), Some(lon)) = (catch.latitude, catch.longitude) {
        line.push_str(&format!("  ({lat}, {lon})"));
    }
    line
}

fn handle_trip(config: &Config, cmd: TripCommand) -> CliResult {
    let wizard = open_wizard(config)?;

    match cmd {
        TripCommand::Start {
            date,
            time,
            weather,
            trip,
        } => {
            let input = TripCommand::start_input(&date, &time, &weather);
            match wizard.start_trip(&input, trip.as_deref())? {
                FormOutcome::Saved { record, next } => {
                    println!("Trip {} started.", record.id);
                    println!("Next: {next}");
                }
                FormOutcome::Invalid(errors) => return Err(rejected("Trip", &errors)),
            }
        }
        TripCommand::List { all } => {
            let trips: Vec<Trip> = if all {
                wizard.all_trips()?
            } else {
                wizard
                    .resumable_trips()?
                    .into_iter()
                    .map(|entry| entry.trip)
                    .collect()
            };
            if trips.is_empty() {
                println!("No trips.");
            }
            for trip in &trips {
                println!("{}", trip_line(config, trip));
            }
        }
        TripCommand::Resume { id } => match wizard.open(Route::Catch, Some(&id))? {
            PageLoad::Ready(trip) if trip.is_resumable() => {
                println!("{}", trip_line(config, &trip));
                println!("Next: {}", Navigation::resume(&trip));
            }
            PageLoad::Ready(trip) => {
                println!("Trip {} was already submitted.", trip.id);
            }
            PageLoad::Redirect(next) => {
                println!("Trip {id} not found.");
                println!("Next: {next}");
            }
            PageLoad::Fresh => {}
        },
        TripCommand::End { id, time, weather } => {
            let input = TripCommand::end_input(&time, &weather);
            match wizard.end_trip(&id, &input)? {
                FormOutcome::Saved { record, next } => {
                    println!("Trip {} ended.", record.id);
                    println!("Next: {next}");
                }
                FormOutcome::Invalid(errors) => return Err(rejected("Trip end", &errors)),
            }
        }
        TripCommand::Review { id, json } => {
            let review = wizard.review(&id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&review)?);
            } else {
                print_review(config, &review);
            }
        }
        TripCommand::Submit { id } => {
            let next = wizard.submit_trip(&id)?;
            println!("Trip {id} submitted.");
            println!("Next: {next}");
        }
        TripCommand::Delete { id, yes } => match wizard.delete_trip(&id, yes) {
            Ok(removed) => println!("Deleted trip {id} and {removed} catch(es)."),
            Err(Error::ConfirmationRequired { action }) => {
                println!("Confirm {action} with --yes.");
            }
            Err(e) => return Err(e.into()),
        },
    }
    Ok(())
}

fn print_review(config: &Config, review: &Review) {
    let trip = &review.trip;
    println!("Trip {}", trip.id);
    println!("------------------------------------");
    println!(
        "Date:     {}",
        format_date(trip.trip_date.as_deref(), &config.display.date_format)
    );
    println!(
        "Start:    {}  {}",
        display_time(trip.start_time.as_deref()),
        trip.start_weather.as_deref().unwrap_or("")
    );
    println!(
        "End:      {}  {}",
        display_time(trip.end_time.as_deref()),
        trip.end_weather.as_deref().unwrap_or("")
    );
    println!("Status:   {}", trip.status);
    println!();

    println!("Catches by species");
    for row in &review.by_species {
        println!(
            "  {:<12} {:>3}  {:>8} lbs  avg {:>6} in",
            row.species,
            row.count,
            row.total_weight.to_string(),
            row.avg_length.to_string()
        );
    }
    println!();
    println!(
        "Total: {} catch(es), {} lbs, avg length {} in",
        review.stats.total_count, review.stats.total_weight, review.stats.avg_length
    );
}

fn handle_catch(config: &Config, cmd: CatchCommand) -> CliResult {
    let wizard = open_wizard(config)?;

    match cmd {
        CatchCommand::Add { trip, fields } => {
            let input = CatchInput::from(fields);
            if !input.species.trim().is_empty() && !config.is_known_species(&input.species) {
                tracing::warn!("Species '{}' is not in the configured list", input.species);
            }
            match wizard.add_catch(&trip, &input)? {
                FormOutcome::Saved { record, .. } => {
                    println!("Logged {}", catch_line(&record));
                }
                FormOutcome::Invalid(errors) => return Err(rejected("Catch", &errors)),
            }
        }
        CatchCommand::List { trip, json } => {
            let catches = wizard.catches(&trip)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&catches)?);
            } else if catches.is_empty() {
                println!("No catches logged.");
            } else {
                for catch in &catches {
                    println!("{}", catch_line(catch));
                }
            }
        }
        CatchCommand::Edit { trip, id, fields } => {
            let mut log = wizard.catch_log(&trip)?;
            match wizard.edit_catch(&mut log, &id, &fields.into())? {
                WriteOutcome::Persisted => {
                    if let Some(catch) = log.catch(&id) {
                        println!("Updated {}", catch_line(catch));
                    }
                }
                WriteOutcome::Rejected(errors) => return Err(rejected("Catch edit", &errors)),
                WriteOutcome::Reverted { error } => return Err(error.into()),
            }
        }
        CatchCommand::Remove { id, yes } => match wizard.delete_catch(&id, yes) {
            Ok(true) => println!("Removed catch {id}."),
            Ok(false) => println!("No catch {id}."),
            Err(Error::ConfirmationRequired { action }) => {
                println!("Confirm {action} with --yes.");
            }
            Err(e) => return Err(e.into()),
        },
        CatchCommand::Done { trip } => match wizard.finish_catches(&trip)? {
            BatchOutcome::Advanced(next) => {
                println!("All catches look good.");
                println!("Next: {next}");
            }
            BatchOutcome::Blocked(errors) => {
                let catches = wizard.catches(&trip)?;
                for (index, fields) in &errors {
                    let label = catches.get(*index).map_or("?", |c| c.id.as_str());
                    eprintln!("Catch {label}:");
                    for message in fields.values() {
                        eprintln!("  {message}");
                    }
                }
                return Err(format!("{} catch(es) need fixing", errors.len()).into());
            }
        },
    }
    Ok(())
}

fn handle_species(config: &Config) {
    for species in &config.catch.species {
        println!("{species}");
    }
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> CliResult {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Catch]");
                println!("  Species:            {}", config.catch.species.join(", "));
                println!("  Max weight (lbs):   {}", config.catch.max_weight_lbs);
                println!("  Max length (in):    {}", config.catch.max_length_in);
                println!();
                println!("[Display]");
                println!("  Date format:        {}", config.display.date_format);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
