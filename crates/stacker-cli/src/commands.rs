use colored::Colorize;
use stacker_core::{IntegrityReport, Stacker};
use stacker_server::{StackerConfig, StackerServer, StoreConfig};

use crate::cli::{Cli, Command, ConfigArgs, OutputFormat, RepairArgs};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Check(args) => cmd_check(args, cli.format),
        Command::Repair(args) => cmd_repair(args, cli.format),
        Command::Config(args) => cmd_config(args),
    }
}

fn open(config: StackerConfig) -> anyhow::Result<StackerServer> {
    if config.store == StoreConfig::Memory {
        tracing::warn!("memory store selected; data lives only as long as this process");
    }
    Ok(StackerServer::new(config)?)
}

fn cmd_serve(args: ConfigArgs) -> anyhow::Result<()> {
    let server = open(args.resolve()?)?;
    println!(
        "{} Stacker listening on {}",
        "✓".green().bold(),
        server.config().server.bind_addr.to_string().bold()
    );
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_check(args: ConfigArgs, format: OutputFormat) -> anyhow::Result<()> {
    let server = open(args.resolve()?)?;
    let report = server.stacker().check_integrity()?;
    print_report(&report, format)?;
    if !report.is_clean() {
        anyhow::bail!("{} integrity issue(s) found", report.issues.len());
    }
    Ok(())
}

fn cmd_repair(args: RepairArgs, format: OutputFormat) -> anyhow::Result<()> {
    let server = open(args.config.resolve()?)?;
    let report = server.stacker().check_integrity()?;
    print_report(&report, format)?;
    if report.is_clean() || args.dry_run {
        return Ok(());
    }
    let fixed = repair(server.stacker(), &report)?;
    println!(
        "{} Repaired {} of {} issue(s)",
        "✓".green().bold(),
        fixed.to_string().bold(),
        report.issues.len()
    );
    Ok(())
}

/// Apply every repair, then rescan so the caller sees what remains.
fn repair(stacker: &Stacker, report: &IntegrityReport) -> anyhow::Result<usize> {
    let fixed = stacker.repair_all(report)?;
    let after = stacker.check_integrity()?;
    for issue in &after.issues {
        println!("  {} {}", "still present:".yellow(), issue);
    }
    Ok(fixed)
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<()> {
    print!("{}", args.resolve()?.to_toml()?);
    Ok(())
}

fn print_report(report: &IntegrityReport, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => {
            println!(
                "Scanned {} user(s), {} task(s)",
                report.users_scanned.to_string().bold(),
                report.tasks_scanned.to_string().bold()
            );
            if report.is_clean() {
                println!("{} No issues.", "✓".green().bold());
            }
            for issue in &report.issues {
                println!("  {} {}", "✗".red(), issue);
            }
        }
    }
    Ok(())
}
