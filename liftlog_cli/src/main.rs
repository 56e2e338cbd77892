use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use liftlog_core::food::{self, Endpoint};
use liftlog_core::nutrition::{self, fetch_day};
use liftlog_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "liftlog")]
#[command(about = "Workout and nutrition tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use a specific config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build up the workout draft
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },

    /// Log the draft as a workout and clear it
    Submit {
        /// Workout name
        #[arg(long)]
        name: String,
    },

    /// Calculate daily calorie and macro targets
    Macros(MacroArgs),

    /// Look up products in the food database
    Food {
        #[command(subcommand)]
        action: FoodAction,
    },

    /// Show logged nutrition for a day
    Nutrition {
        /// Day to summarize (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// List or search the built-in exercise catalog
    Catalog {
        /// Filter by name or muscle group
        search: Option<String>,
    },
}

#[derive(Subcommand)]
enum DraftAction {
    /// Add an exercise by catalog id
    Add {
        exercise: String,

        /// Display name for exercises not in the catalog
        #[arg(long)]
        name: Option<String>,

        /// Number of empty sets to start with
        #[arg(long)]
        sets: Option<u32>,

        /// Rest between sets in seconds
        #[arg(long)]
        rest: Option<u32>,
    },

    /// Remove an exercise from the draft
    Remove { exercise: String },

    /// Set weight and/or reps on a set
    Set {
        exercise: String,
        set: String,

        #[arg(long)]
        weight: Option<f64>,

        #[arg(long)]
        reps: Option<u32>,
    },

    /// Mark a set done or not done
    Toggle { exercise: String, set: String },

    /// Append an empty set
    AddSet { exercise: String },

    /// Remove a set
    RemoveSet { exercise: String, set: String },

    /// Discard the whole draft
    Clear,

    /// Print the draft
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the number of exercises in the draft
    Count,
}

#[derive(Subcommand)]
enum FoodAction {
    /// Free-text product search
    Search { query: String },

    /// Product lookup by barcode
    Barcode { barcode: String },
}

#[derive(Args)]
struct MacroArgs {
    /// Bodyweight in kg
    #[arg(long)]
    weight: f64,

    /// Height in cm
    #[arg(long)]
    height: f64,

    #[arg(long)]
    age: u32,

    /// Man, Kvinna, Annat (or male, female, other)
    #[arg(long)]
    gender: Gender,

    /// Activity label or key (sedentary, light, moderate, high, very_high)
    #[arg(long)]
    activity: ActivityLevel,

    /// Goal label or key (lose_weight, maintain, build_muscle)
    #[arg(long)]
    goal: Goal,

    /// Print as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    liftlog_core::logging::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let mut config = Config::load_from(path)?;
            config.apply_env();
            config
        }
        None => Config::load()?,
    };
    if let Some(data_dir) = cli.data_dir {
        config.data.data_dir = data_dir;
    }

    match cli.command {
        Commands::Draft { action } => cmd_draft(action, &config),
        Commands::Submit { name } => cmd_submit(&name, &config),
        Commands::Macros(args) => cmd_macros(args),
        Commands::Food { action } => cmd_food(action, &config),
        Commands::Nutrition { date } => cmd_nutrition(date, &config),
        Commands::Catalog { search } => cmd_catalog(search),
    }
}

fn open_draft(config: &Config) -> Result<DraftStore<FileStorage>> {
    let storage = FileStorage::new(config.draft_dir());
    // Saves happen in the background, so a bad namespace must fail here
    storage.path_for(&config.draft.namespace)?;
    Ok(DraftStore::open(storage, config.draft.namespace.clone()))
}

/// Resolve a draft exercise by catalog id or draft-id prefix
fn resolve_exercise(store: &DraftStore<FileStorage>, reference: &str) -> Option<String> {
    if let Some(exercise) = store.find_by_exercise_id(reference) {
        return Some(exercise.id.clone());
    }
    let mut matches = store.exercises().iter().filter(|e| e.id.starts_with(reference));
    match (matches.next(), matches.next()) {
        (Some(exercise), None) => Some(exercise.id.clone()),
        _ => None,
    }
}

/// Resolve a set by 1-based position or set-id prefix
fn resolve_set(
    store: &DraftStore<FileStorage>,
    exercise_id: &str,
    reference: &str,
) -> Option<String> {
    let exercise = store.get(exercise_id)?;
    if let Ok(position) = reference.parse::<usize>() {
        if position >= 1 {
            if let Some(set) = exercise.sets.get(position - 1) {
                return Some(set.id.clone());
            }
        }
    }
    let mut matches = exercise.sets.iter().filter(|s| s.id.starts_with(reference));
    match (matches.next(), matches.next()) {
        (Some(set), None) => Some(set.id.clone()),
        _ => None,
    }
}

/// Like `resolve_exercise`, telling the user when nothing matches
fn find_exercise(store: &DraftStore<FileStorage>, reference: &str) -> Option<String> {
    let found = resolve_exercise(store, reference);
    if found.is_none() {
        println!("No exercise in the draft matches {:?}", reference);
    }
    found
}

/// Resolve an exercise and one of its sets, telling the user when either is unknown
fn find_set(
    store: &DraftStore<FileStorage>,
    exercise: &str,
    set: &str,
) -> Option<(String, String)> {
    let exercise_id = find_exercise(store, exercise)?;
    match resolve_set(store, &exercise_id, set) {
        Some(set_id) => Some((exercise_id, set_id)),
        None => {
            println!("No set of {} matches {:?}", exercise, set);
            None
        }
    }
}

fn cmd_draft(action: DraftAction, config: &Config) -> Result<()> {
    let mut store = open_draft(config)?;

    match action {
        DraftAction::Add {
            exercise,
            name,
            sets,
            rest,
        } => {
            let snapshot = match (get_default_catalog().get(&exercise), name) {
                (_, Some(name)) => Exercise::custom(exercise.clone(), name),
                (Some(known), None) => known.clone(),
                (None, None) => {
                    return Err(Error::InvalidInput(format!(
                        "{} is not in the catalog; pass --name to add it as a custom exercise",
                        exercise
                    )))
                }
            };
            let already_there = store.find_by_exercise_id(&exercise).is_some();
            store.add_exercise(
                snapshot,
                sets.unwrap_or(config.draft.default_set_count),
                rest.unwrap_or(config.draft.default_rest_time),
            );
            if already_there {
                println!("{} is already in the draft", exercise);
            } else {
                println!("✓ Added {} to the draft", exercise);
            }
        }
        DraftAction::Remove { exercise } => {
            if let Some(id) = find_exercise(&store, &exercise) {
                store.remove_exercise(&id);
                println!("✓ Removed {} from the draft", exercise);
            }
        }
        DraftAction::Set {
            exercise,
            set,
            weight,
            reps,
        } => {
            if weight.is_none() && reps.is_none() {
                return Err(Error::InvalidInput("pass --weight and/or --reps".into()));
            }
            if let Some((exercise_id, set_id)) = find_set(&store, &exercise, &set) {
                if let Some(weight) = weight {
                    store.update_set(&exercise_id, &set_id, SetField::Weight, weight);
                }
                if let Some(reps) = reps {
                    store.update_set(&exercise_id, &set_id, SetField::Reps, f64::from(reps));
                }
                println!("✓ Updated set {} of {}", set, exercise);
            }
        }
        DraftAction::Toggle { exercise, set } => {
            if let Some((exercise_id, set_id)) = find_set(&store, &exercise, &set) {
                store.toggle_set_completion(&exercise_id, &set_id);
                let completed = store
                    .get(&exercise_id)
                    .and_then(|e| e.sets.iter().find(|s| s.id == set_id))
                    .map_or(false, |s| s.completed);
                let state = if completed { "done" } else { "not done" };
                println!("✓ Set {} of {} marked {}", set, exercise, state);
            }
        }
        DraftAction::AddSet { exercise } => {
            if let Some(exercise_id) = find_exercise(&store, &exercise) {
                store.add_set(&exercise_id);
                let count = store.get(&exercise_id).map_or(0, |e| e.sets.len());
                println!("✓ Added set {} to {}", count, exercise);
            }
        }
        DraftAction::RemoveSet { exercise, set } => {
            if let Some((exercise_id, set_id)) = find_set(&store, &exercise, &set) {
                store.remove_set(&exercise_id, &set_id);
                println!("✓ Removed set {} from {}", set, exercise);
            }
        }
        DraftAction::Clear => {
            store.clear_draft();
            println!("✓ Draft cleared");
        }
        DraftAction::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(store.exercises())?);
            } else {
                display_draft(&store);
            }
        }
        DraftAction::Count => {
            println!("{}", store.exercise_count());
        }
    }

    Ok(())
}

fn short(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn display_draft(store: &DraftStore<FileStorage>) {
    if store.is_empty() {
        println!("The workout draft is empty.");
        return;
    }

    let total_sets: usize = store.exercises().iter().map(|e| e.sets.len()).sum();
    println!(
        "Workout draft: {} exercises, {}/{} sets completed, volume {:.1} kg",
        store.exercise_count(),
        store.completed_set_count(),
        total_sets,
        store.total_volume()
    );
    println!();

    for (index, exercise) in store.exercises().iter().enumerate() {
        println!(
            "  {}. {} [{}]  rest {}s  id {}",
            index + 1,
            exercise.exercise.name,
            exercise.exercise_id,
            exercise.rest_time,
            short(&exercise.id)
        );
        for (position, set) in exercise.sets.iter().enumerate() {
            let mark = if set.completed { "✓" } else { "·" };
            println!(
                "     {}) {} {:>6.1} kg × {:<3} id {}",
                position + 1,
                mark,
                set.weight,
                set.reps,
                short(&set.id)
            );
        }
    }
}

fn cmd_submit(name: &str, config: &Config) -> Result<()> {
    let mut store = open_draft(config)?;
    if store.is_empty() {
        println!("The workout draft is empty - nothing to submit.");
        return Ok(());
    }

    let gateway = RestGateway::new(&config.gateway)?;
    match submit_workout(&mut store, &gateway, name, chrono::Utc::now()) {
        Ok(log) => {
            println!("✓ Workout logged: {} ({} exercises)", log.name, log.exercises.len());
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Could not log the workout: {}", e);
            eprintln!("  Your draft was kept. Run `liftlog submit` again to retry.");
            Err(e)
        }
    }
}

fn cmd_macros(args: MacroArgs) -> Result<()> {
    let metrics = BodyMetrics {
        weight_kg: args.weight,
        height_cm: args.height,
        age: args.age,
        gender: args.gender,
        activity: args.activity,
        goal: args.goal,
    };
    let targets = calculate_macros(&metrics)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&targets)?);
        return Ok(());
    }

    println!("Activity: {}", metrics.activity);
    println!("Goal:     {}", metrics.goal);
    println!();
    println!("  BMR:      {} kcal", targets.bmr);
    println!("  Calories: {} kcal", targets.calories);
    println!("  Protein:  {} g", targets.protein);
    println!("  Fat:      {} g", targets.fat);
    println!("  Carbs:    {} g", targets.carbs);
    Ok(())
}

fn cmd_food(action: FoodAction, config: &Config) -> Result<()> {
    let client = OpenFoodFactsClient::new(&config.food)?;
    let (endpoint, request) = match action {
        FoodAction::Search { query } => (Endpoint::Search, ProxyRequest::get([("query", query)])),
        FoodAction::Barcode { barcode } => {
            (Endpoint::Barcode, ProxyRequest::get([("barcode", barcode)]))
        }
    };

    let response = food::handle(endpoint, &request, &client, config.food.search_limit);
    println!("{}", serde_json::to_string_pretty(&response.body)?);

    if response.status == 200 {
        Ok(())
    } else {
        Err(Error::Other(format!("food lookup failed with status {}", response.status)))
    }
}

fn cmd_nutrition(date: Option<NaiveDate>, config: &Config) -> Result<()> {
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let gateway = RestGateway::new(&config.gateway)?;

    let entries = match fetch_day(&gateway, date) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("✗ Could not load nutrition for {}: {}", date, e);
            eprintln!("  Run the command again to retry.");
            return Err(e);
        }
    };

    println!("Nutrition for {}", date);
    println!();
    for (meal, totals) in nutrition::totals_by_meal(&entries, date) {
        println!(
            "  {:<10} {:>7.0} kcal  P {:>5.1} g  F {:>5.1} g  C {:>5.1} g",
            format!("{:?}", meal),
            totals.calories,
            totals.protein,
            totals.fat,
            totals.carbs
        );
    }
    let day = daily_totals(&entries, date);
    println!();
    println!(
        "  {:<10} {:>7.0} kcal  P {:>5.1} g  F {:>5.1} g  C {:>5.1} g  (sugar {:.1} g)",
        "Total", day.calories, day.protein, day.fat, day.carbs, day.sugar
    );
    Ok(())
}

fn cmd_catalog(search: Option<String>) -> Result<()> {
    let catalog = get_default_catalog();
    let exercises: Vec<&Exercise> = match &search {
        Some(needle) => catalog.search(needle),
        None => catalog.exercises.values().collect(),
    };

    for exercise in exercises {
        println!(
            "  {:<16} {:<20} {}",
            exercise.id,
            exercise.name,
            exercise.muscle_group.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
