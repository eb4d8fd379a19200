use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use streak_core::*;

#[derive(Parser)]
#[command(name = "streak")]
#[command(about = "Habit tracker with cycle-based scheduling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new habit
    Add {
        /// Habit name
        name: String,

        /// Recurrence unit (day, week, month); omit for a plain daily habit
        #[arg(long)]
        unit: Option<String>,

        /// Allowed slot within the unit; repeatable.
        /// Weekday 0-6 (0 = Sunday) for week, day-of-month 0-30 or -1
        /// for "last day" for month.
        #[arg(long = "slot", allow_hyphen_values = true)]
        slots: Vec<i32>,

        /// Whole units to rest between active occurrences
        #[arg(long, default_value_t = 0)]
        rest: u32,

        /// Which residue class of the rest cycle is active
        #[arg(long, default_value_t = 0)]
        phase: u32,
    },

    /// List all habits
    List,

    /// Show habits due on a date (default: today)
    Due {
        /// Date to check, YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
    },

    /// Mark a habit done on a date (default: today)
    Done {
        name: String,

        #[arg(long)]
        date: Option<String>,
    },

    /// Undo a completion on a date (default: today)
    Undo {
        name: String,

        #[arg(long)]
        date: Option<String>,
    },

    /// Show the next date a habit is due (default: from today)
    Next {
        name: String,

        /// Start of the search, YYYY-MM-DD, inclusive
        #[arg(long)]
        from: Option<String>,
    },

    /// Enumerate the upcoming phases of a rest cycle
    Phases {
        /// Recurrence unit (day, week, month)
        #[arg(long)]
        unit: String,

        /// Whole units to rest between active occurrences
        #[arg(long)]
        rest: u32,

        /// Reference date, YYYY-MM-DD (default: today)
        #[arg(long)]
        from: Option<String>,
    },

    /// Remove a habit
    Remove { name: String },
}

fn main() -> Result<()> {
    // Initialize logging
    streak_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    let habits_path = data_dir.join("habits.json");
    let journal_path = data_dir.join("completions.jsonl");

    match cli.command {
        Commands::Add {
            name,
            unit,
            slots,
            rest,
            phase,
        } => cmd_add(&habits_path, name, unit, slots, rest, phase),
        Commands::List => cmd_list(&habits_path),
        Commands::Due { date } => cmd_due(&habits_path, &journal_path, date),
        Commands::Done { name, date } => {
            cmd_mark(&habits_path, &journal_path, &name, date, CompletionAction::Done)
        }
        Commands::Undo { name, date } => {
            cmd_mark(&habits_path, &journal_path, &name, date, CompletionAction::Undone)
        }
        Commands::Next { name, from } => cmd_next(&habits_path, &name, from),
        Commands::Phases { unit, rest, from } => cmd_phases(&unit, rest, from),
        Commands::Remove { name } => cmd_remove(&habits_path, &name),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn resolve_date(arg: Option<String>) -> Result<NaiveDate> {
    match arg {
        Some(s) => dates::parse_date(&s),
        None => Ok(today()),
    }
}

fn parse_unit(s: &str) -> Result<CycleUnit> {
    match s.to_lowercase().as_str() {
        "day" => Ok(CycleUnit::Day),
        "week" => Ok(CycleUnit::Week),
        "month" => Ok(CycleUnit::Month),
        _ => Err(Error::Other(format!(
            "Unknown unit '{}': expected day, week or month",
            s
        ))),
    }
}

fn cmd_add(
    habits_path: &std::path::Path,
    name: String,
    unit: Option<String>,
    slots: Vec<i32>,
    rest: u32,
    phase: u32,
) -> Result<()> {
    let cycle = match unit {
        Some(ref u) => {
            let config = CycleConfig {
                unit: parse_unit(u)?,
                slots,
                rest,
                phase,
            };
            let errors = config.validate();
            if !errors.is_empty() {
                for error in &errors {
                    eprintln!("  - {}", error);
                }
                return Err(Error::Other("Invalid cycle configuration".into()));
            }
            Some(config)
        }
        None => {
            if !slots.is_empty() || rest > 0 || phase > 0 {
                return Err(Error::Other(
                    "--slot/--rest/--phase require --unit".into(),
                ));
            }
            None
        }
    };

    let habit = Habit::new(name, cycle);
    let summary = describe_cycle(habit.cycle.as_ref());
    let name = habit.name.clone();

    HabitBook::update(habits_path, |book| book.add(habit))?;

    println!("Added '{}' ({})", name, summary);
    Ok(())
}

fn cmd_list(habits_path: &std::path::Path) -> Result<()> {
    let book = HabitBook::load(habits_path)?;

    if book.habits.is_empty() {
        println!("No habits yet. Add one with 'streak add'.");
        return Ok(());
    }

    for habit in book.active() {
        println!("{}  ({})", habit.name, describe_cycle(habit.cycle.as_ref()));
    }
    Ok(())
}

fn cmd_due(
    habits_path: &std::path::Path,
    journal_path: &std::path::Path,
    date: Option<String>,
) -> Result<()> {
    let date = resolve_date(date)?;
    let book = HabitBook::load(habits_path)?;

    let mut any = false;
    for habit in book.active() {
        if !is_due_on(habit.cycle.as_ref(), date) {
            continue;
        }
        any = true;
        let done = completed_dates(journal_path, habit.id)?.contains(&date);
        let mark = if done { "x" } else { " " };
        println!("[{}] {}", mark, habit.name);
    }

    if !any {
        println!("Nothing due on {}.", dates::format_date(date));
    }
    Ok(())
}

fn cmd_mark(
    habits_path: &std::path::Path,
    journal_path: &std::path::Path,
    name: &str,
    date: Option<String>,
    action: CompletionAction,
) -> Result<()> {
    let date = resolve_date(date)?;
    let book = HabitBook::load(habits_path)?;
    let habit = book
        .find_by_name(name)
        .ok_or_else(|| Error::Store(format!("No habit named '{}'", name)))?;

    if action == CompletionAction::Done && !is_due_on(habit.cycle.as_ref(), date) {
        tracing::info!("'{}' is not due on {}, recording anyway", name, date);
    }

    let mut sink = JsonlSink::new(journal_path);
    sink.append(&CompletionRecord::new(habit.id, date, action))?;

    match action {
        CompletionAction::Done => println!("Marked '{}' done on {}", name, dates::format_date(date)),
        CompletionAction::Undone => println!("Undid '{}' on {}", name, dates::format_date(date)),
    }
    Ok(())
}

fn cmd_next(habits_path: &std::path::Path, name: &str, from: Option<String>) -> Result<()> {
    let from = resolve_date(from)?;
    let book = HabitBook::load(habits_path)?;
    let habit = book
        .find_by_name(name)
        .ok_or_else(|| Error::Store(format!("No habit named '{}'", name)))?;

    match &habit.cycle {
        // A habit without a cycle is due every day, starting now
        None => println!("{}", dates::format_date(from)),
        Some(cycle) => match next_due_date(cycle, from) {
            Some(date) => println!("{}", dates::format_date(date)),
            None => println!("No upcoming occurrence found for '{}'", name),
        },
    }
    Ok(())
}

fn cmd_phases(unit: &str, rest: u32, from: Option<String>) -> Result<()> {
    let unit = parse_unit(unit)?;
    let from = resolve_date(from)?;

    let phases = phase_dates(unit, rest, from);
    if phases.is_empty() {
        println!("No rest configured; the cycle has a single phase.");
        return Ok(());
    }

    for descriptor in phases {
        println!(
            "phase {}: {}  starting {}",
            descriptor.phase,
            phase_label(unit, descriptor.date),
            dates::format_date(descriptor.date)
        );
    }
    Ok(())
}

fn cmd_remove(habits_path: &std::path::Path, name: &str) -> Result<()> {
    let mut removed = false;
    HabitBook::update(habits_path, |book| {
        removed = book.remove_by_name(name).is_some();
        Ok(())
    })?;

    if removed {
        println!("Removed '{}'", name);
        Ok(())
    } else {
        Err(Error::Store(format!("No habit named '{}'", name)))
    }
}

/// Human description of a cycle for list output
fn describe_cycle(cycle: Option<&CycleConfig>) -> String {
    const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

    let Some(cycle) = cycle else {
        return "every day".to_string();
    };

    let mut parts = Vec::new();
    match cycle.unit {
        CycleUnit::Day => parts.push("daily".to_string()),
        CycleUnit::Week => {
            if cycle.slots.is_empty() {
                parts.push("weekly".to_string());
            } else {
                let names: Vec<&str> = cycle
                    .slots
                    .iter()
                    .filter_map(|s| WEEKDAYS.get(*s as usize).copied())
                    .collect();
                parts.push(format!("weekly on {}", names.join(", ")));
            }
        }
        CycleUnit::Month => {
            if cycle.slots.is_empty() {
                parts.push("monthly".to_string());
            } else {
                let days: Vec<String> = cycle
                    .slots
                    .iter()
                    .map(|s| {
                        if *s == LAST_DAY_SLOT {
                            "last day".to_string()
                        } else {
                            format!("day {}", s + 1)
                        }
                    })
                    .collect();
                parts.push(format!("monthly on {}", days.join(", ")));
            }
        }
        CycleUnit::Unknown => parts.push("unknown cycle".to_string()),
    }

    if cycle.rest > 0 {
        parts.push(format!(
            "resting {} {}(s), phase {}",
            cycle.rest,
            match cycle.unit {
                CycleUnit::Week => "week",
                CycleUnit::Month => "month",
                _ => "day",
            },
            cycle.phase
        ));
    }

    parts.join(", ")
}
