use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use finca_core::*;
use rust_decimal::Decimal;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "finca")]
#[command(about = "Farm inventory and livestock tracking system", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Stock ledger operations on consumable resources
    Stock {
        #[command(subcommand)]
        command: StockCommands,
    },

    /// Livestock lifecycle and treatment history
    Herd {
        #[command(subcommand)]
        command: HerdCommands,
    },

    /// Workers and equipment issuances
    Worker {
        #[command(subcommand)]
        command: WorkerCommands,
    },

    /// Maintenance tasks
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },

    /// Wage payment obligations
    Payment {
        #[command(subcommand)]
        command: PaymentCommands,
    },

    /// Show everything due inside the lookahead window
    Remind {
        /// Lookahead in days (defaults to the configured value)
        #[arg(long)]
        days: Option<i64>,

        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Roll up audit events to the CSV archive
    Rollup {
        /// Clean up processed audit logs after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

#[derive(Subcommand)]
enum StockCommands {
    /// Register a new resource with an initial batch
    New {
        #[arg(long)]
        name: String,

        /// feed, medicine, pesticide, fuel or vaccine
        #[arg(long)]
        kind: ResourceKind,

        /// unit, kg, g, l, ml or gallon
        #[arg(long)]
        unit: Unit,

        /// Initial batch size
        #[arg(long)]
        amount: Decimal,

        #[arg(long)]
        expiry: Option<NaiveDate>,

        #[arg(long)]
        price: Option<Decimal>,
    },

    /// Add a batch to an existing resource
    Add {
        /// Resource name
        #[arg(long)]
        resource: String,

        #[arg(long)]
        amount: Decimal,
    },

    /// Consume from a resource's remaining stock
    Consume {
        #[arg(long)]
        resource: String,

        #[arg(long)]
        amount: Decimal,
    },

    /// Show a resource's remaining stock
    Remaining {
        #[arg(long)]
        resource: String,
    },

    /// List all resources with their totals
    List,

    /// Show recent stock movements
    History {
        #[arg(long, default_value_t = 7)]
        days: i64,
    },
}

#[derive(Subcommand)]
enum HerdCommands {
    /// Register a new animal
    Add {
        /// External identifier, e.g. ear tag
        #[arg(long)]
        tag: String,

        #[arg(long, default_value = "cattle")]
        animal_type: String,

        #[arg(long)]
        breed: String,

        /// male or female
        #[arg(long)]
        sex: Sex,

        #[arg(long)]
        birth_date: Option<NaiveDate>,
    },

    /// Mark an animal as sold (all sale fields are required together)
    Sell {
        #[arg(long)]
        tag: String,

        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        value: Option<Decimal>,

        #[arg(long)]
        reason: Option<String>,

        #[arg(long)]
        buyer: Option<String>,

        #[arg(long)]
        buyer_phone: Option<String>,
    },

    /// Mark an animal as deceased
    Deceased {
        #[arg(long)]
        tag: String,

        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        reason: Option<String>,
    },

    /// Set an animal back to alive, clearing sale/death data
    Revive {
        #[arg(long)]
        tag: String,
    },

    /// Record a vaccine dose (does not consume vaccine stock)
    Vaccinate {
        #[arg(long)]
        tag: String,

        /// Vaccine resource name
        #[arg(long)]
        vaccine: String,

        #[arg(long)]
        date: NaiveDate,

        #[arg(long)]
        next_dose: Option<NaiveDate>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Record a medicine application
    Medicate {
        #[arg(long)]
        tag: String,

        /// Medicine resource name
        #[arg(long)]
        medicine: String,

        #[arg(long)]
        date: NaiveDate,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Show an animal's status and derived age
    Show {
        #[arg(long)]
        tag: String,
    },
}

#[derive(Subcommand)]
enum WorkerCommands {
    /// Register a worker
    Add {
        #[arg(long)]
        name: String,
    },

    /// Record an equipment issuance for a worker
    Issue {
        /// Worker name
        #[arg(long)]
        worker: String,

        #[arg(long)]
        date: NaiveDate,
    },
}

#[derive(Subcommand)]
enum TaskCommands {
    /// Schedule a maintenance task
    Add {
        #[arg(long)]
        equipment: String,

        #[arg(long)]
        description: String,

        #[arg(long)]
        date: NaiveDate,
    },

    /// Mark a maintenance task as completed
    Done {
        #[arg(long)]
        id: Uuid,
    },
}

#[derive(Subcommand)]
enum PaymentCommands {
    /// Schedule a wage payment
    Add {
        /// Worker name
        #[arg(long)]
        worker: Option<String>,

        #[arg(long)]
        amount: Decimal,

        #[arg(long)]
        due: NaiveDate,
    },

    /// Mark a payment as realized
    Paid {
        #[arg(long)]
        id: Uuid,
    },
}

struct Paths {
    inventory: PathBuf,
    wal: PathBuf,
    csv: PathBuf,
    wal_dir: PathBuf,
}

impl Paths {
    fn new(data_dir: &PathBuf) -> Self {
        let wal_dir = data_dir.join("wal");
        Self {
            inventory: data_dir.join("inventory.json"),
            wal: wal_dir.join("stock_events.wal"),
            csv: data_dir.join("stock_events.csv"),
            wal_dir,
        }
    }
}

fn main() -> Result<()> {
    finca_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let paths = Paths::new(&data_dir);

    match cli.command {
        Commands::Stock { command } => cmd_stock(command, &paths, &config),
        Commands::Herd { command } => cmd_herd(command, &paths),
        Commands::Worker { command } => cmd_worker(command, &paths),
        Commands::Task { command } => cmd_task(command, &paths),
        Commands::Payment { command } => cmd_payment(command, &paths),
        Commands::Remind { days, json } => cmd_remind(&paths, &config, days, json),
        Commands::Rollup { cleanup } => cmd_rollup(&paths, cleanup),
    }
}

fn cmd_stock(command: StockCommands, paths: &Paths, config: &Config) -> Result<()> {
    match command {
        StockCommands::New {
            name,
            kind,
            unit,
            amount,
            expiry,
            price,
        } => {
            let (resource_name, remaining) = InventoryStore::update(&paths.inventory, |store| {
                let mut resource = ConsumableResource::new(&name, kind, unit, amount)?;
                resource.expiry_date = expiry;
                resource.unit_price = price;
                let out = (resource.name.clone(), resource.remaining());
                store.resources.insert(resource.id, resource);
                Ok(out)
            })?;
            println!("✓ Registered '{}' with {} in stock", resource_name, remaining);
        }

        StockCommands::Add { resource, amount } => {
            let mut sink = JsonlSink::new(&paths.wal);
            let actor = config.farm.operator.clone();
            let receipt = InventoryStore::update(&paths.inventory, |store| {
                let id = store.resource_by_name(&resource)?.id;
                add_stock(store, &mut sink, &actor, id, amount)
            })?;
            println!(
                "✓ Added {} to '{}': ingested {}, remaining {}",
                amount, resource, receipt.new_ingested, receipt.new_remaining
            );
        }

        StockCommands::Consume { resource, amount } => {
            let mut sink = JsonlSink::new(&paths.wal);
            let actor = config.farm.operator.clone();
            let receipt = InventoryStore::update(&paths.inventory, |store| {
                let id = store.resource_by_name(&resource)?.id;
                consume(store, &mut sink, &actor, id, amount)
            })?;
            println!(
                "✓ Consumed {} of '{}': used {}, remaining {}",
                amount, resource, receipt.new_used, receipt.new_remaining
            );
        }

        StockCommands::Remaining { resource } => {
            let store = InventoryStore::load(&paths.inventory)?;
            let r = store.resource_by_name(&resource)?;
            println!("{}: {} {} remaining", r.name, r.remaining(), r.unit);
        }

        StockCommands::List => {
            let store = InventoryStore::load(&paths.inventory)?;
            let mut resources: Vec<_> = store.resources.values().collect();
            resources.sort_by(|a, b| a.name.cmp(&b.name));
            if resources.is_empty() {
                println!("No resources registered.");
            }
            for r in resources {
                println!(
                    "{:<24} {:<10} ingested {:>10}  used {:>10}  remaining {:>10} {}",
                    r.name,
                    r.kind.to_string(),
                    r.ingested,
                    r.used,
                    r.remaining(),
                    r.unit
                );
            }
        }

        StockCommands::History { days } => {
            let events = load_recent_events(&paths.wal, &paths.csv, days)?;
            if events.is_empty() {
                println!("No stock movements in the last {} days.", days);
            }
            for e in events {
                let verb = match e.action {
                    StockAction::Added => "added",
                    StockAction::Consumed => "consumed",
                };
                println!(
                    "{}  {} {} {} of '{}' (ingested {}, used {})",
                    e.recorded_at.format("%Y-%m-%d %H:%M"),
                    e.actor,
                    verb,
                    e.amount,
                    e.resource_name,
                    e.ingested_after,
                    e.used_after
                );
            }
        }
    }

    Ok(())
}

fn cmd_herd(command: HerdCommands, paths: &Paths) -> Result<()> {
    match command {
        HerdCommands::Add {
            tag,
            animal_type,
            breed,
            sex,
            birth_date,
        } => {
            InventoryStore::update(&paths.inventory, |store| {
                let mut animal = Animal::new(&tag, &animal_type, &breed, sex);
                animal.birth_date = birth_date;
                register_animal(store, animal)
            })?;
            println!("✓ Registered animal '{}'", tag);
        }

        HerdCommands::Sell {
            tag,
            date,
            value,
            reason,
            buyer,
            buyer_phone,
        } => {
            let payload = TransitionPayload {
                sale_date: date,
                sale_value: value,
                sale_reason: reason,
                buyer_name: buyer,
                buyer_phone,
                ..Default::default()
            };
            InventoryStore::update(&paths.inventory, |store| {
                let id = store.animal_by_tag(&tag)?.id;
                transition(store, id, AnimalStatus::Sold, payload)
            })?;
            println!("✓ Animal '{}' marked as sold", tag);
        }

        HerdCommands::Deceased { tag, date, reason } => {
            let payload = TransitionPayload {
                death_date: date,
                death_reason: reason,
                ..Default::default()
            };
            InventoryStore::update(&paths.inventory, |store| {
                let id = store.animal_by_tag(&tag)?.id;
                transition(store, id, AnimalStatus::Deceased, payload)
            })?;
            println!("✓ Animal '{}' marked as deceased", tag);
        }

        HerdCommands::Revive { tag } => {
            InventoryStore::update(&paths.inventory, |store| {
                let id = store.animal_by_tag(&tag)?.id;
                transition(store, id, AnimalStatus::Alive, TransitionPayload::default())
            })?;
            println!("✓ Animal '{}' set back to alive", tag);
        }

        HerdCommands::Vaccinate {
            tag,
            vaccine,
            date,
            next_dose,
            notes,
        } => {
            let record_id = InventoryStore::update(&paths.inventory, |store| {
                let animal_id = store.animal_by_tag(&tag)?.id;
                let vaccine_id = store.resource_by_name(&vaccine)?.id;
                record_vaccination(store, animal_id, vaccine_id, date, next_dose, notes)
            })?;
            println!("✓ Vaccination recorded ({})", record_id);
        }

        HerdCommands::Medicate {
            tag,
            medicine,
            date,
            notes,
        } => {
            let record_id = InventoryStore::update(&paths.inventory, |store| {
                let animal_id = store.animal_by_tag(&tag)?.id;
                let medicine_id = store.resource_by_name(&medicine)?.id;
                record_medication(store, animal_id, medicine_id, date, notes)
            })?;
            println!("✓ Medication recorded ({})", record_id);
        }

        HerdCommands::Show { tag } => {
            let store = InventoryStore::load(&paths.inventory)?;
            let animal = store.animal_by_tag(&tag)?;
            let today = chrono::Local::now().date_naive();
            let animal_age = age(&store, animal.id, today)?;

            println!("{} ({} {})", animal.tag, animal.breed, animal.animal_type);
            println!("  status: {}", animal.status);
            println!("  age: {}", animal_age);
            if let Some(sale) = &animal.sale {
                println!(
                    "  sold {} to {} ({}) for {}",
                    sale.sale_date, sale.buyer_name, sale.buyer_phone, sale.sale_value
                );
            }
            if let Some(death) = &animal.death {
                println!("  deceased {}: {}", death.death_date, death.reason);
            }
        }
    }

    Ok(())
}

fn cmd_worker(command: WorkerCommands, paths: &Paths) -> Result<()> {
    match command {
        WorkerCommands::Add { name } => {
            let worker_name = InventoryStore::update(&paths.inventory, |store| {
                let worker = Worker::new(&name);
                let out = worker.name.clone();
                store.workers.insert(worker.id, worker);
                Ok(out)
            })?;
            println!("✓ Registered worker '{}'", worker_name);
        }

        WorkerCommands::Issue { worker, date } => {
            InventoryStore::update(&paths.inventory, |store| {
                let worker_id = store.worker_by_name(&worker)?.id;
                store.issuances.push(EquipmentIssuance {
                    id: Uuid::new_v4(),
                    worker_id,
                    issued_on: date,
                    notes: None,
                });
                Ok(())
            })?;
            println!("✓ Issuance recorded for '{}' on {}", worker, date);
        }
    }

    Ok(())
}

fn cmd_task(command: TaskCommands, paths: &Paths) -> Result<()> {
    match command {
        TaskCommands::Add {
            equipment,
            description,
            date,
        } => {
            let task_id = InventoryStore::update(&paths.inventory, |store| {
                let task = MaintenanceTask {
                    id: Uuid::new_v4(),
                    equipment,
                    description,
                    scheduled_on: date,
                    completed: false,
                };
                let id = task.id;
                store.maintenance.push(task);
                Ok(id)
            })?;
            println!("✓ Maintenance task scheduled ({})", task_id);
        }

        TaskCommands::Done { id } => {
            InventoryStore::update(&paths.inventory, |store| {
                let task = store
                    .maintenance
                    .iter_mut()
                    .find(|t| t.id == id)
                    .ok_or_else(|| Error::NotFound(format!("maintenance task {}", id)))?;
                task.completed = true;
                Ok(())
            })?;
            println!("✓ Maintenance task marked as completed");
        }
    }

    Ok(())
}

fn cmd_payment(command: PaymentCommands, paths: &Paths) -> Result<()> {
    match command {
        PaymentCommands::Add { worker, amount, due } => {
            let payment_id = InventoryStore::update(&paths.inventory, |store| {
                let worker_id = match &worker {
                    Some(name) => Some(store.worker_by_name(name)?.id),
                    None => None,
                };
                let payment = PaymentObligation {
                    id: Uuid::new_v4(),
                    worker_id,
                    amount,
                    due_on: due,
                    paid: false,
                };
                let id = payment.id;
                store.payments.push(payment);
                Ok(id)
            })?;
            println!("✓ Payment scheduled ({})", payment_id);
        }

        PaymentCommands::Paid { id } => {
            InventoryStore::update(&paths.inventory, |store| {
                let payment = store
                    .payments
                    .iter_mut()
                    .find(|p| p.id == id)
                    .ok_or_else(|| Error::NotFound(format!("payment {}", id)))?;
                payment.paid = true;
                Ok(())
            })?;
            println!("✓ Payment marked as realized");
        }
    }

    Ok(())
}

fn cmd_remind(paths: &Paths, config: &Config, days: Option<i64>, json: bool) -> Result<()> {
    let store = InventoryStore::load(&paths.inventory)?;
    let today = chrono::Local::now().date_naive();
    let days = days.unwrap_or(config.reminders.lookahead_days);

    let report = build_reminder_report(
        &store,
        today,
        days,
        config.reminders.issuance_interval_months,
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.is_empty() {
        println!("Nothing due in the next {} days.", days);
        return Ok(());
    }

    display_report(&report);
    Ok(())
}

fn display_report(report: &ReminderReport) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  UPCOMING — {} (+{}d)", report.today, report.lookahead_days);
    println!("╰─────────────────────────────────────────╯");

    if !report.expiring.is_empty() {
        println!("\nExpiring stock:");
        for r in &report.expiring {
            if let Some(expiry) = r.expiry_date {
                println!("  → {} expires {}", r.name, expiry);
            }
        }
    }

    if !report.due_vaccinations.is_empty() {
        println!("\nVaccination doses due:");
        for v in &report.due_vaccinations {
            if let Some(next) = v.next_dose_on {
                println!("  → animal {} next dose {}", v.animal_id, next);
            }
        }
    }

    if !report.due_maintenance.is_empty() {
        println!("\nMaintenance due:");
        for t in &report.due_maintenance {
            println!("  → {} on {}: {}", t.equipment, t.scheduled_on, t.description);
        }
    }

    if !report.due_issuance.is_empty() {
        println!("\nEquipment issuances due:");
        for d in &report.due_issuance {
            println!("  → {} due {}", d.worker_name, d.due_on);
        }
    }

    if !report.due_payments.is_empty() {
        println!("\nPayments due:");
        for p in &report.due_payments {
            println!("  → {} due {}", p.amount, p.due_on);
        }
    }

    println!();
}

fn cmd_rollup(paths: &Paths, cleanup: bool) -> Result<()> {
    if !paths.wal.exists() {
        println!("No audit log found - nothing to roll up.");
        return Ok(());
    }

    let count = finca_core::csv_rollup::wal_to_csv_and_archive(&paths.wal, &paths.csv)?;

    println!("✓ Rolled up {} events to CSV", count);
    println!("  CSV: {}", paths.csv.display());

    if cleanup {
        let cleaned = finca_core::csv_rollup::cleanup_processed_wals(&paths.wal_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed audit logs", cleaned);
        }
    }

    Ok(())
}
