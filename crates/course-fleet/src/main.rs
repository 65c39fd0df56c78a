//! course-fleet: per-student EC2 instances and Route 53 records for a course
//!
//! `provision` launches one instance per roster entry and points
//! `<entry>.<domain>` at it; `teardown` finds everything tagged with the
//! course and removes it.

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand, ValueEnum};
use course_fleet::aws::{AwsContext, Ec2Client, FromAwsContext, Route53Client};
use course_fleet::config::{FleetConfig, ImageFilter, WaitTimeouts};
use course_fleet::listing::instance_table;
use course_fleet::workflow::discovery::discover_course_instances;
use course_fleet::workflow::{Provisioner, StdoutReporter, Teardown};
use course_fleet_common::defaults::{
    DEFAULT_ALLOWED_PORTS, DEFAULT_DOMAIN, DEFAULT_INGRESS_CIDR, DEFAULT_INSTANCE_TYPE,
    DEFAULT_KEY_PAIR, DEFAULT_RECORD_TTL, DEFAULT_REGION, DEFAULT_RUNNING_TIMEOUT_SECS,
    DEFAULT_TERMINATED_TIMEOUT_SECS,
};
use course_fleet_common::{CourseId, Roster, RosterError};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "course-fleet")]
#[command(about = "Provision and tear down per-student EC2 instances and DNS records")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

/// Options shared by every subcommand
#[derive(clap::Args, Debug)]
struct FleetArgs {
    /// AWS region
    #[arg(long, env = "AWS_REGION", default_value = DEFAULT_REGION)]
    region: String,

    /// AWS profile to use
    #[arg(long, env = "AWS_PROFILE")]
    aws_profile: Option<String>,

    /// Domain of the public hosted zone holding student records
    #[arg(long, env = "COURSE_FLEET_DOMAIN", default_value = DEFAULT_DOMAIN)]
    domain: String,

    /// EC2 key pair attached to every instance
    #[arg(long, env = "COURSE_FLEET_KEY_PAIR", default_value = DEFAULT_KEY_PAIR)]
    key_pair: String,

    /// EC2 instance type
    #[arg(long, env = "COURSE_FLEET_INSTANCE_TYPE", default_value = DEFAULT_INSTANCE_TYPE)]
    instance_type: String,

    /// Comma-separated inbound TCP ports
    #[arg(
        long,
        env = "COURSE_FLEET_PORTS",
        value_delimiter = ',',
        default_values_t = DEFAULT_ALLOWED_PORTS
    )]
    ports: Vec<u16>,

    /// TTL of student A records in seconds
    #[arg(long, env = "COURSE_FLEET_TTL", default_value_t = DEFAULT_RECORD_TTL)]
    ttl: i64,

    /// Seconds to wait for instances to be running
    #[arg(long, default_value_t = DEFAULT_RUNNING_TIMEOUT_SECS)]
    running_timeout: u64,

    /// Seconds to wait for instances to terminate
    #[arg(long, default_value_t = DEFAULT_TERMINATED_TIMEOUT_SECS)]
    terminated_timeout: u64,
}

impl From<FleetArgs> for FleetConfig {
    fn from(args: FleetArgs) -> Self {
        Self {
            region: args.region,
            aws_profile: args.aws_profile,
            key_pair: args.key_pair,
            domain: args.domain,
            instance_size: args.instance_type,
            allowed_ports: args.ports,
            ingress_cidr: DEFAULT_INGRESS_CIDR.to_string(),
            record_ttl: args.ttl,
            image: ImageFilter::default(),
            wait: WaitTimeouts {
                running: Duration::from_secs(args.running_timeout),
                terminated: Duration::from_secs(args.terminated_timeout),
                ..WaitTimeouts::default()
            },
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Launch one instance and DNS record per roster entry
    Provision {
        /// Course identifier (value of the `course` tag)
        course_name: String,

        /// File with one student name per line
        roster_file: PathBuf,

        #[command(flatten)]
        fleet: FleetArgs,
    },

    /// Terminate the course's instances and delete its security group and DNS records
    Teardown {
        /// Course identifier (value of the `course` tag)
        course_name: String,

        #[command(flatten)]
        fleet: FleetArgs,
    },

    /// Show the live instances tagged with a course
    List {
        /// Course identifier (value of the `course` tag)
        course_name: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        #[command(flatten)]
        fleet: FleetArgs,
    },
}

#[tokio::main]
async fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            print!("{}", e.render());
            std::process::exit(1);
        }
    };

    init_tracing();

    if let Err(e) = run(args).await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Logs go to stderr so the stdout transcript stays exact
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,aws_config=warn,aws_smithy_runtime=warn,aws_smithy_runtime_api=warn")
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }

    if std::env::var("RUST_BACKTRACE").is_err() {
        let _ = writeln!(
            stderr,
            "\n\x1b[2mSet RUST_BACKTRACE=1 for a detailed backtrace\x1b[0m"
        );
    } else {
        let backtrace = e.backtrace();
        if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
            let _ = writeln!(stderr, "\n\x1b[2mBacktrace:\x1b[0m\n{backtrace}");
        }
    }
}

/// Report a configuration error on stdout and exit before touching AWS
fn config_error(e: &RosterError) -> ! {
    match e {
        RosterError::NotFound(path) => {
            println!("Error: File '{path}' not found. Please provide a valid roster file.")
        }
        other => println!("Error: {other}"),
    }
    std::process::exit(1);
}

fn parse_course(course_name: &str) -> CourseId {
    CourseId::new(course_name).unwrap_or_else(|e| config_error(&e))
}

fn load_roster(path: &Path) -> Roster {
    Roster::load(path).unwrap_or_else(|e| config_error(&e))
}

/// Cancel waits on the first Ctrl-C, exit on the second
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let signalled = token.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!("Interrupted, cancelling wait (press Ctrl-C again to exit immediately)");
        signalled.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    });

    token
}

async fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Provision {
            course_name,
            roster_file,
            fleet,
        } => {
            let course = parse_course(&course_name);
            let roster = load_roster(&roster_file);
            handle_provision(course, roster, fleet.into()).await
        }

        Command::Teardown { course_name, fleet } => {
            let course = parse_course(&course_name);
            handle_teardown(course, fleet.into()).await
        }

        Command::List {
            course_name,
            format,
            fleet,
        } => {
            let course = parse_course(&course_name);
            handle_list(course, format, fleet.into()).await
        }
    }
}

async fn aws_context(config: &FleetConfig) -> AwsContext {
    if let Some(profile) = &config.aws_profile {
        info!(profile = %profile, "Using AWS profile");
    }
    AwsContext::with_profile(&config.region, config.aws_profile.as_deref()).await
}

/// Handle the provision command
async fn handle_provision(course: CourseId, roster: Roster, config: FleetConfig) -> Result<()> {
    info!(
        course = %course,
        students = roster.len(),
        region = %config.region,
        domain = %config.domain,
        instance_type = %config.instance_size,
        "Provisioning course"
    );

    let aws = aws_context(&config).await;
    let ec2 = Ec2Client::from_context(&aws);
    let route53 = Route53Client::from_context(&aws);

    Provisioner::new(&ec2, &route53, &config, &StdoutReporter)
        .with_cancel(cancel_on_ctrl_c())
        .run(&course, &roster)
        .await?;

    Ok(())
}

/// Handle the teardown command
async fn handle_teardown(course: CourseId, config: FleetConfig) -> Result<()> {
    info!(course = %course, region = %config.region, domain = %config.domain, "Tearing down course");

    let aws = aws_context(&config).await;
    let ec2 = Ec2Client::from_context(&aws);
    let route53 = Route53Client::from_context(&aws);

    Teardown::new(&ec2, &route53, &config, &StdoutReporter)
        .with_cancel(cancel_on_ctrl_c())
        .run(&course)
        .await?;

    Ok(())
}

/// Handle the list command
async fn handle_list(course: CourseId, format: OutputFormat, config: FleetConfig) -> Result<()> {
    let aws = aws_context(&config).await;
    let ec2 = Ec2Client::from_context(&aws);

    let instances = discover_course_instances(&ec2, &course).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&instances)?),
        OutputFormat::Table => {
            if instances.is_empty() {
                println!("No instances found with 'course' tag value '{course}'.");
                return Ok(());
            }
            println!("{}", instance_table(&instances));
            println!("\nTotal: {} instances", instances.len());
        }
    }

    Ok(())
}
