use anyhow::Context;
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password, Select};
use dotenvy::dotenv;
use sams::cli::seeder::{SeedConfig, clear_seeded_data, seed_database};
use sams::cli::{check_attendance, create_user};
use sams_core::Role;
use sams_models::{CreateUserDto, Email};
use sqlx::PgPool;

#[derive(Parser)]
#[command(name = "sams-cli")]
#[command(about = "SAMS CLI - Administrative tools for the attendance system", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account (admin, teacher, student or parent)
    CreateUser {
        /// Full name
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Role: admin, teacher, student or parent
        #[arg(short = 'r', long)]
        role: Option<Role>,

        /// Department (teachers)
        #[arg(short = 'd', long)]
        department: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Seed the database with demo classes, people and attendance
    Seed {
        /// Number of teachers
        #[arg(long, default_value = "4")]
        teachers: usize,

        /// Classes taught by each teacher
        #[arg(long, default_value = "2")]
        classes_per_teacher: usize,

        /// Number of students (two per parent)
        #[arg(short = 's', long, default_value = "40")]
        students: usize,

        /// Classes each student is enrolled in
        #[arg(long, default_value = "4")]
        classes_per_student: usize,

        /// Weekdays of attendance history
        #[arg(long, default_value = "20")]
        days: usize,
    },
    /// Clear all seeded data (keeps admins)
    ClearSeed,
    /// Email the parent of every student below 75% attendance
    CheckAttendance,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let pool = sams_db::init_db_pool().await?;
    sams_db::run_migrations(&pool).await?;

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::CreateUser {
            name,
            email,
            role,
            department,
            password,
        } => handle_create_user(&pool, name, email, role, department, password).await,
        Commands::Seed {
            teachers,
            classes_per_teacher,
            students,
            classes_per_student,
            days,
        } => {
            let config = SeedConfig {
                teachers,
                classes_per_teacher,
                students,
                classes_per_student,
                days,
            };
            seed_database(&pool, &config).await.map(|_| ())
        }
        Commands::ClearSeed => clear_seeded_data(&pool).await,
        Commands::CheckAttendance => handle_check_attendance(&pool).await,
    };

    if let Err(e) = result {
        eprintln!("\n❌ {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn prompt_role() -> anyhow::Result<Role> {
    let labels: Vec<&str> = Role::ALL.iter().map(Role::as_str).collect();
    let choice = Select::new()
        .with_prompt("Role")
        .items(&labels)
        .default(1)
        .interact()
        .context("Failed to read role")?;
    Ok(Role::ALL[choice])
}

async fn handle_create_user(
    pool: &PgPool,
    name: Option<String>,
    email: Option<String>,
    role: Option<Role>,
    department: Option<String>,
    password: Option<String>,
) -> anyhow::Result<()> {
    // Use provided values or prompt interactively
    let full_name = match name {
        Some(name) => name,
        None => Input::new()
            .with_prompt("Full name")
            .interact_text()
            .context("Failed to read name")?,
    };

    let email: String = match email {
        Some(email) => email,
        None => Input::new()
            .with_prompt("Email address")
            .interact_text()
            .context("Failed to read email")?,
    };
    let email = Email::new(email)?;

    let role = match role {
        Some(role) => role,
        None => prompt_role()?,
    };

    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .context("Failed to read password")?,
    };

    let user = create_user(
        pool,
        CreateUserDto {
            email,
            full_name,
            password,
            role,
            phone: None,
            address: None,
            department,
        },
    )
    .await?;

    println!("\n✅ {} account created successfully!", user.role);
    println!("   Email: {}", user.email);
    println!("   Name: {}", user.full_name);
    Ok(())
}

async fn handle_check_attendance(pool: &PgPool) -> anyhow::Result<()> {
    println!("📬 Checking attendance for every student...");
    let report = check_attendance(pool).await?;
    println!(
        "\n✅ Checked {} students: {} alerts sent, {} failed",
        report.checked, report.alerted, report.failed
    );
    Ok(())
}
