use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;

use fouryou_portal::billing::demo_customer;
use fouryou_portal::{
    format_inr, init_config, init_telemetry, shutdown_telemetry, AttachmentMeta, LocalIdentity,
    MemoryStore, PlanTier, Portal, PortalConfig, Role, TaskDraft, TaskStatus,
};

#[derive(Parser)]
#[command(name = "fouryou-portal")]
#[command(about = "Broadband portal workflow engine demo")]
#[command(
    long_about = "Runs the 4You Broadband portal workflow engine against in-memory \
                  fakes: the seeded bill ledger, the simulated payment flow, and the \
                  engineer installation-task flow."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the seeded bill ledger and the outstanding balance
    Bills,
    /// Run a scripted customer + engineer session end to end
    Demo,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry()?;
    init_config()?;
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Demo) {
        Commands::Bills => show_bills(),
        Commands::Demo => run_demo().await?,
    }

    shutdown_telemetry();
    Ok(())
}

fn show_bills() {
    let customer = demo_customer();
    println!("{} | {}", customer.name, customer.plan);

    let portal = Portal::new(PortalConfig::default());
    for bill in portal.bills().list_bills() {
        println!(
            "{:>4}  {:<16} {:>10}  due {}  [{}]",
            bill.id,
            bill.month,
            format_inr(bill.amount),
            bill.due_date,
            bill.status
        );
    }
    println!("Outstanding balance: {}", format_inr(portal.total_due()));
}

async fn run_demo() -> Result<()> {
    let config = PortalConfig::load()?;
    let identity = LocalIdentity::new();
    let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());

    // --- Customer session: pay the overdue bill --------------------------
    let mut portal = Portal::new(config.clone());
    portal
        .initialize(&identity, store.clone(), None)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    portal
        .login("9876543210", "password", Role::Customer)
        .map_err(|e| anyhow::anyhow!("login failed: {e}"))?;

    println!("Outstanding balance: {}", format_inr(portal.total_due()));
    let overdue: Vec<_> = portal.bills().overdue_bills().map(|b| b.id).collect();
    for id in overdue {
        portal.select_bill(id).map_err(|e| anyhow::anyhow!("{e}"))?;
        println!("Paying bill {id}...");
        portal
            .confirm_payment()
            .await
            .map_err(|e| anyhow::anyhow!("{e}"))?;
    }
    if let Some(note) = portal.notifier().current() {
        println!("* {}", note.message);
    }
    println!("Outstanding balance: {}", format_inr(portal.total_due()));
    portal.logout();

    // --- Engineer session: onboard a customer and track the install ------
    let mut portal = Portal::new(config);
    portal
        .initialize(&identity, store, None)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    portal
        .login("8888888888", "engineer", Role::Engineer)
        .map_err(|e| anyhow::anyhow!("login failed: {e}"))?;

    let draft = TaskDraft {
        name: "Suresh Kumar".to_string(),
        mobile: "9876501234".to_string(),
        address: "Flat 12, MG Road, Bengaluru".to_string(),
        plan: Some(PlanTier::FiberBlast300),
        initial_password: "temp123".to_string(),
        photo: Some(AttachmentMeta::new("photo.jpg", 240_000)),
        document: Some(AttachmentMeta::new("aadhaar.pdf", 512_000)),
    };
    let id = portal
        .create_task(draft)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    portal
        .advance_task(&id, TaskStatus::InstallationScheduled)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    portal
        .advance_task(&id, TaskStatus::Completed)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let tasks = portal.tasks().map_err(|e| anyhow::anyhow!("{e}"))?;
    println!(
        "Tasks: {} pending, {} completed",
        tasks.pending_tasks().len(),
        tasks.completed_tasks().len()
    );
    if let Some(note) = portal.notifier().current() {
        println!("* {}", note.message);
    }

    Ok(())
}
