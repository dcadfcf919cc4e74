use clap::{Parser, Subcommand};
use drivesmith_core::{DeviceRecord, FormatError, FormatManager, SystemRunner};
use drivesmith_formatters::DiskpartFormatter;
use drivesmith_platform::WmicDeviceEnumerator;

#[derive(Parser)]
#[command(name = "drivesmith")]
#[command(about = "Disk reinitialization utility for Windows hosts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List attached physical disk drives
    List,
    /// Wipe a drive and recreate it as a single NTFS partition (ERASES ALL DATA)
    Format {
        /// Device path, e.g. \\.\PHYSICALDRIVE2
        device: String,
        /// Skip the interactive confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

fn print_record(record: &DeviceRecord) {
    println!("Device: {}", record.caption);
    println!("  Path: {}", record.device_id);
    match record.size_gib() {
        Some(gib) => println!("  Size: {:.2} GiB", gib),
        None => println!("  Size: unknown (not reported by the system)"),
    }
}

fn elevation_hint() {
    eprintln!("Hint: enumerating and formatting disks requires an elevated (Administrator) prompt.");
}

fn confirm_on_stdin(record: &DeviceRecord) -> anyhow::Result<bool> {
    println!();
    println!("WARNING: This will ERASE ALL DATA on:");
    println!("  {}", record.display_line());
    println!("Type 'yes' to continue: ");

    use std::io::{self, BufRead};
    let stdin = io::stdin();
    let mut line = String::new();
    stdin.lock().read_line(&mut line)?;
    Ok(line.trim() == "yes")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut manager = FormatManager::new(
        WmicDeviceEnumerator::new(SystemRunner),
        DiskpartFormatter::new(SystemRunner),
    );

    match cli.command {
        Commands::List => {
            let snapshot = match manager.refresh_inventory().await {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Error enumerating devices: {}", e);
                    elevation_hint();
                    return Ok(());
                }
            };
            if snapshot.is_empty() {
                println!("No devices found.");
            } else {
                println!("Available devices:\n");
                for record in snapshot.devices() {
                    print_record(record);
                    println!();
                }
            }
        }
        Commands::Format { device, yes } => {
            // Refresh first so the confirmation shows current identity,
            // not whatever the user remembers from an earlier listing.
            let snapshot = match manager.refresh_inventory().await {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Error enumerating devices: {}", e);
                    elevation_hint();
                    return Ok(());
                }
            };

            let record = snapshot
                .get(&device)
                .ok_or_else(|| {
                    anyhow::anyhow!("Device not found: {}. Use 'drivesmith list' to see attached drives.", device)
                })?
                .clone();

            println!("Target device:");
            print_record(&record);

            let confirmed = yes || confirm_on_stdin(&record)?;
            if !confirmed {
                println!("Format cancelled.");
                return Ok(());
            }

            match manager.request_format(&record.device_id, confirmed).await {
                Ok(report) => {
                    println!("Format completed successfully.");
                    println!("--- diskpart output ---");
                    println!("{}", report.output);
                    println!("-----------------------");
                    if let Some(warning) = report.cleanup_warning {
                        eprintln!("Warning: {}", warning);
                    }
                }
                Err(FormatError::NotConfirmed) => {
                    println!("Format refused: the selection no longer matches the inventory.");
                }
                Err(e) => {
                    eprintln!("Format failed: {}", e);
                    elevation_hint();
                }
            }

            // Partition state and labels changed; show the fresh view.
            match manager.refresh_inventory().await {
                Ok(snapshot) => {
                    println!("Inventory refreshed: {} disks attached.", snapshot.len())
                }
                Err(e) => eprintln!("Could not refresh inventory afterwards: {}", e),
            }
        }
    }

    Ok(())
}
