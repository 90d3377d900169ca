use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

use practice_rooms::booking::BookingRequest;
use practice_rooms::calendar::{format_hhmm, Clock, SystemClock};
use practice_rooms::cleanup::{reservations_to_cleanup, CleanupKind};
use practice_rooms::config::Config;
use practice_rooms::eligibility::WindowState;
use practice_rooms::error::Result;
use practice_rooms::repository::{ReservationRepository, StaticUserDirectory, UserDirectory};
use practice_rooms::scheduler;
use practice_rooms::service::{BookingOutcome, BookingService};
use practice_rooms::store::ReservationStore;
use practice_rooms::util::{format_duration, parse_date, truncate};

#[derive(Parser)]
#[command(name = "practice_rooms")]
#[command(about = "Book school music practice rooms")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List practice rooms
    Rooms,
    /// List time slots
    Slots,
    /// Show window state and room holders for a date
    Windows {
        /// User to evaluate windows for
        #[arg(short, long)]
        user: String,
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },
    /// List active reservations on a date
    List {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Book a room for a time slot
    Book {
        #[arg(short, long)]
        user: String,
        #[arg(short, long)]
        room: String,
        #[arg(short, long)]
        slot: String,
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Name to record on the booking, defaults to the user's name
        #[arg(long)]
        name: Option<String>,
        /// Student id to record on the booking, defaults to the user's
        #[arg(long)]
        student_id: Option<String>,
    },
    /// Cancel a reservation
    Cancel {
        #[arg(short, long)]
        user: String,
        #[arg(short, long)]
        reservation: String,
    },
    /// Run a cleanup sweep now
    Cleanup {
        #[arg(short, long, value_enum)]
        kind: CleanupKind,
        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Only print what would be cancelled
        #[arg(long)]
        dry_run: bool,
    },
    /// Run the cleanup daemon
    Daemon,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("practice_rooms=info".parse().expect("valid directive")),
        )
        .init();

    let cli = Cli::parse();

    let config = Arc::new(Config::load(&cli.config)?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let users = Arc::new(StaticUserDirectory::new(config.users.clone()));
    let store = Arc::new(ReservationStore::load(&config.store_path)?);
    let service = BookingService::new(config.clone(), users.clone(), store.clone(), clock.clone());

    let date_or_today = |date: Option<String>| match date {
        Some(d) => parse_date(&d),
        None => Ok(clock.today()),
    };

    match cli.command {
        Commands::Rooms => {
            println!("\n{:<6} {:<20} {:<10} {:<10}", "ID", "Room", "Capacity", "Available");
            println!("{}", "-".repeat(49));
            for room in &config.rooms {
                println!(
                    "{:<6} {:<20} {:<10} {:<10}",
                    room.id,
                    truncate(&room.name, 18),
                    room.capacity,
                    if room.available { "yes" } else { "no" }
                );
            }
        }
        Commands::Slots => {
            println!("\n{:<12} {:<14} {:<14} {:<14} {:<8}", "ID", "Slot", "Time", "Category", "Active");
            println!("{}", "-".repeat(66));
            for slot in &config.slots {
                println!(
                    "{:<12} {:<14} {:<14} {:<14} {:<8}",
                    slot.id,
                    truncate(&slot.name, 12),
                    format!("{}-{}", format_hhmm(slot.start), format_hhmm(slot.end)),
                    slot.category,
                    if slot.active { "yes" } else { "no" }
                );
            }
        }
        Commands::Windows { user, date } => {
            let date = date_or_today(date)?;
            let now = clock.now();
            let view = service.availability(&user, date).await?;

            println!("\nWindows for {} on {}", user, date);
            println!("\n{:<12} {:<22} {}", "Slot", "Window", "Rooms");
            println!("{}", "-".repeat(70));
            for entry in view {
                let window = match entry.window {
                    WindowState::Open { .. } => "open".to_string(),
                    WindowState::OpensAt { opens_at } => {
                        let wait = now.date().and_time(opens_at) - now;
                        format!("opens {} ({})", format_hhmm(opens_at), format_duration(wait))
                    }
                    WindowState::WrongDay => "opens on the day".to_string(),
                    WindowState::NoSchedule => "no schedule".to_string(),
                    WindowState::Misconfigured => "misconfigured".to_string(),
                };
                let rooms: Vec<String> = entry
                    .rooms
                    .iter()
                    .map(|r| match (&r.holder, r.room_available) {
                        (Some(holder), _) => format!("{}:{}", r.room_id, truncate(&holder.student_name, 8)),
                        (None, false) => format!("{}:closed", r.room_id),
                        (None, true) => format!("{}:free", r.room_id),
                    })
                    .collect();
                println!("{:<12} {:<22} {}", entry.slot.id, window, rooms.join(" "));
            }
        }
        Commands::List { date } => {
            let date = date_or_today(date)?;
            let reservations = service.reservations_on(date).await?;

            if reservations.is_empty() {
                println!("\nNo reservations on {}.", date);
            } else {
                println!("\n{:<38} {:<6} {:<12} {:<8} {:<12}", "ID", "Room", "Slot", "Student", "Name");
                println!("{}", "-".repeat(80));
                for r in reservations {
                    println!(
                        "{:<38} {:<6} {:<12} {:<8} {:<12}",
                        r.id,
                        r.room_id,
                        r.slot_id,
                        r.student_id,
                        truncate(&r.student_name, 10)
                    );
                }
            }
        }
        Commands::Book {
            user,
            room,
            slot,
            date,
            name,
            student_id,
        } => {
            let date = date_or_today(date)?;
            let booker = users.get_user(&user).await?;
            let request = BookingRequest {
                room_id: room,
                slot_id: slot,
                date,
                student_id: student_id.unwrap_or_else(|| booker.student_id.clone()),
                student_name: name.unwrap_or_else(|| booker.name.clone()),
            };

            match service.book(&user, request).await? {
                BookingOutcome::Booked(r) => {
                    info!("Booked room {} {} on {} (reservation {})", r.room_id, r.slot_id, r.date, r.id);
                }
                BookingOutcome::CancelAvailable(r) => {
                    println!(
                        "Already held by {} ({}). Cancel with: cancel --user {} --reservation {}",
                        r.student_name, r.student_id, user, r.id
                    );
                }
            }
        }
        Commands::Cancel { user, reservation } => {
            let cancelled = service.cancel(&user, &reservation).await?;
            info!("Cancelled reservation {}", cancelled.id);
        }
        Commands::Cleanup { kind, date, dry_run } => {
            let date = date_or_today(date)?;
            if dry_run {
                let all = store.list_all().await?;
                let targets = reservations_to_cleanup(
                    &all,
                    &config.slots,
                    kind,
                    date,
                    config.system.weekly_cleanup.exclude_after_school,
                );
                println!("\n{} cleanup would cancel {} reservations:", kind, targets.len());
                for r in targets {
                    println!("  {} {} {} {}", r.id, r.date, r.room_id, r.slot_id);
                }
            } else {
                let cancelled = service.run_cleanup(kind, date).await?;
                info!("{} cleanup cancelled {} reservations", kind, cancelled.len());
            }
        }
        Commands::Daemon => {
            info!("Starting cleanup daemon...");
            scheduler::run_scheduler(service, clock).await?;
        }
    }

    Ok(())
}
