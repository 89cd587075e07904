//! Argument model and command dispatch.

mod commands;
pub mod helpers;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use redekids_core::{default_log_level, init_logging};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "redekids")]
#[command(about = "Cadastro, escala e presença do ministério infantil")]
#[command(version)]
pub struct Cli {
    /// SQLite database file
    #[arg(long, env = "REDEKIDS_DB", default_value = "redekids.sqlite3", global = true)]
    pub db: PathBuf,

    /// trace|debug|info|warn|error
    #[arg(long, env = "REDEKIDS_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files; file logging is off when unset
    #[arg(long, env = "REDEKIDS_LOG_DIR", global = true)]
    pub log_dir: Option<String>,

    /// Reference date (YYYY-MM-DD) for ages and report dates
    #[arg(long, env = "REDEKIDS_TODAY", global = true)]
    pub today: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create or migrate the database
    Init,

    /// Manage registered children
    Child {
        #[command(subcommand)]
        command: ChildCommands,
    },

    /// Manage servants and their schedule
    Servant {
        #[command(subcommand)]
        command: ServantCommands,
    },

    /// Register and review attendance
    Attendance {
        #[command(subcommand)]
        command: AttendanceCommands,
    },

    /// Write CSV reports
    Export {
        #[command(subcommand)]
        command: ExportCommands,
    },

    /// Show roster and attendance totals
    Summary,
}

#[derive(Args, Debug, Clone)]
pub struct ChildFieldArgs {
    #[arg(long)]
    pub name: String,
    /// YYYY-MM-DD
    #[arg(long)]
    pub birth_date: NaiveDate,
    #[arg(long)]
    pub guardian: String,
    /// Pai, Mãe, Avô, Avó, Tio(a), Responsável legal, Outro
    #[arg(long, default_value = "Mãe")]
    pub relationship: String,
    #[arg(long)]
    pub phone: String,
}

#[derive(Subcommand, Debug)]
pub enum ChildCommands {
    /// Register a child
    Add(ChildFieldArgs),
    /// Replace a child's registration
    Edit {
        id: Uuid,
        #[command(flatten)]
        fields: ChildFieldArgs,
    },
    /// Deactivate a child (attendance history is kept)
    Remove { id: Uuid },
    /// List active children
    List {
        /// Only children whose age falls into this classroom
        #[arg(long)]
        classroom: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ServantCommands {
    /// Register a servant
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Replace a servant's registration
    Edit {
        id: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Deactivate a servant
    Remove { id: Uuid },
    /// List active servants
    List,
    /// Schedule a servant for a service
    Assign {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, default_value = "morning")]
        slot: String,
        #[arg(long)]
        servant: Uuid,
        /// professor, auxiliar or any other role
        #[arg(long)]
        role: String,
        #[arg(long)]
        classroom: String,
    },
    /// Remove one schedule entry
    Unassign { id: Uuid },
    /// Show the schedule of a service
    Schedule {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, default_value = "morning")]
        slot: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum AttendanceCommands {
    /// Register children present in a classroom
    Register {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, default_value = "morning")]
        slot: String,
        #[arg(long)]
        classroom: String,
        #[arg(required = true)]
        child_ids: Vec<Uuid>,
    },
    /// Register a visitor; the classroom follows their age
    Visitor {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, default_value = "morning")]
        slot: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        birth_date: NaiveDate,
        #[arg(long)]
        guardian: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Delete one attendance record
    Remove { id: Uuid },
    /// Children already registered for a service and classroom
    Registered {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, default_value = "morning")]
        slot: String,
        #[arg(long)]
        classroom: String,
    },
    /// Attendance of one month, grouped by service and classroom
    Month { year: i32, month: u32 },
}

#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Active children, optionally limited to one classroom
    Children {
        #[arg(long)]
        classroom: Option<String>,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Active servants
    Servants {
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Attendance of one month
    Attendance {
        year: i32,
        month: u32,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

/// Runs one parsed invocation.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).map_err(anyhow::Error::msg)?;
    }

    let today = cli
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let conn = redekids_core::open_db(&cli.db)?;

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Child { command } => match command {
            ChildCommands::Add(fields) => commands::cmd_child_add(&conn, &fields, today),
            ChildCommands::Edit { id, fields } => {
                commands::cmd_child_edit(&conn, id, &fields, today)
            }
            ChildCommands::Remove { id } => commands::cmd_child_remove(&conn, id),
            ChildCommands::List { classroom } => {
                commands::cmd_child_list(&conn, classroom.as_deref(), today)
            }
        },
        Commands::Servant { command } => match command {
            ServantCommands::Add { name, phone } => {
                commands::cmd_servant_add(&conn, name, phone)
            }
            ServantCommands::Edit { id, name, phone } => {
                commands::cmd_servant_edit(&conn, id, name, phone)
            }
            ServantCommands::Remove { id } => commands::cmd_servant_remove(&conn, id),
            ServantCommands::List => commands::cmd_servant_list(&conn),
            ServantCommands::Assign {
                date,
                slot,
                servant,
                role,
                classroom,
            } => commands::cmd_servant_assign(&conn, date, slot, servant, role, classroom),
            ServantCommands::Unassign { id } => commands::cmd_servant_unassign(&conn, id),
            ServantCommands::Schedule { date, slot } => {
                commands::cmd_servant_schedule(&conn, date, &slot)
            }
        },
        Commands::Attendance { command } => match command {
            AttendanceCommands::Register {
                date,
                slot,
                classroom,
                child_ids,
            } => commands::cmd_attendance_register(&conn, date, slot, classroom, child_ids),
            AttendanceCommands::Visitor {
                date,
                slot,
                name,
                birth_date,
                guardian,
                phone,
            } => commands::cmd_attendance_visitor(
                &conn,
                redekids_core::RegisterVisitorRequest {
                    service_date: Some(date),
                    time_slot: slot,
                    name,
                    birth_date: Some(birth_date),
                    guardian_name: guardian,
                    phone,
                },
                today,
            ),
            AttendanceCommands::Remove { id } => commands::cmd_attendance_remove(&conn, id),
            AttendanceCommands::Registered {
                date,
                slot,
                classroom,
            } => commands::cmd_attendance_registered(&conn, date, &slot, &classroom),
            AttendanceCommands::Month { year, month } => {
                commands::cmd_attendance_month(&conn, year, month)
            }
        },
        Commands::Export { command } => match command {
            ExportCommands::Children { classroom, out } => {
                commands::cmd_export_children(&conn, classroom.as_deref(), &out, today)
            }
            ExportCommands::Servants { out } => commands::cmd_export_servants(&conn, &out, today),
            ExportCommands::Attendance { year, month, out } => {
                commands::cmd_export_attendance(&conn, year, month, &out, today)
            }
        },
        Commands::Summary => commands::cmd_summary(&conn, today),
    }
}
