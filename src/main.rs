/*!
 * Relic CLI - Command Line Interface
 */

use clap::{Parser, Subcommand};
use relic::{
    compare, compare_with_directory, config::RelicConfig, error::EXIT_DIFFERENCES, logging,
    Bagger, ChecksumAlgorithm, FileInventory, FileInventoryDifference, RelicError, Result,
    SignatureCatalog, StorageObject, CHANGE_TYPES,
};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::error;

#[derive(Parser)]
#[command(name = "relic")]
#[command(version, about = "Versioned digital preservation storage with content-addressed deduplication", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Digest algorithms, comma-separated (md5,sha1,sha256)
    #[arg(long = "algorithms", value_name = "LIST", global = true)]
    algorithms: Option<String>,

    /// Log file path (default: stdout)
    #[arg(long = "log-file", value_name = "FILE", global = true)]
    log_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Harvest a fixity inventory from a directory
    Inventory {
        /// Directory to harvest
        directory: PathBuf,

        /// Digital object identifier
        #[arg(long = "object-id", value_name = "ID")]
        object_id: String,

        /// Version number the inventory describes
        #[arg(long = "version", value_name = "N", default_value_t = 1)]
        version: u32,

        /// Write the inventory document here instead of stdout
        #[arg(short = 'o', long = "output", value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Compare two inventories, or an inventory against a directory
    Diff {
        /// Basis inventory document
        basis: PathBuf,

        /// Other inventory document, or a directory to harvest
        other: PathBuf,

        /// Print the full JSON report instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Verify that a directory still matches an inventory exactly
    Verify {
        /// Inventory document
        inventory: PathBuf,

        /// Directory to verify
        directory: PathBuf,
    },

    /// Report which files of an inventory are new to a catalog (dry run)
    Additions {
        /// Catalog document
        catalog: PathBuf,

        /// Inventory document
        inventory: PathBuf,
    },

    /// Ingest a directory as the next version of an object
    Ingest {
        /// Object home directory (its name is the object id)
        object_home: PathBuf,

        /// Directory holding the new version's files
        source: PathBuf,
    },

    /// Export a stored version as a bag directory
    Bag {
        /// Object home directory
        object_home: PathBuf,

        /// Version to export
        #[arg(long = "version", value_name = "N")]
        version: u32,

        /// Destination directory (must not exist)
        dest: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            error!("{err}");
            eprintln!("error: {err}");
            err.exit_code()
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    let mut config = match &cli.config {
        Some(path) => RelicConfig::from_file(path)?,
        None => RelicConfig::default(),
    };
    if let Some(list) = &cli.algorithms {
        config.algorithms = parse_algorithms(list)?;
    }
    if cli.log_file.is_some() {
        config.log_file = cli.log_file.clone();
    }
    config.verbose |= cli.verbose;
    config.validate()?;
    logging::init_logging(&config)?;

    match cli.command {
        Command::Inventory {
            directory,
            object_id,
            version,
            output,
        } => {
            let inventory = FileInventory::from_directory(
                &directory,
                &object_id,
                version,
                &config.algorithms,
                &config.default_group_id,
            )
            .map_err(RelicError::from)?;
            match output {
                Some(path) => {
                    inventory.save(&path).map_err(RelicError::from)?;
                    println!(
                        "wrote {} ({} files, {} bytes)",
                        path.display(),
                        inventory.file_count,
                        inventory.byte_count
                    );
                }
                None => println!("{}", serde_json::to_string_pretty(&inventory)?),
            }
            Ok(0)
        }

        Command::Diff { basis, other, json } => {
            let basis_inventory = FileInventory::load(&basis).map_err(RelicError::from)?;
            let report = if other.is_dir() {
                compare_with_directory(
                    &basis_inventory,
                    &other,
                    &config.algorithms,
                    &config.default_group_id,
                )
                .map_err(RelicError::from)?
            } else {
                let other_inventory = FileInventory::load(&other).map_err(RelicError::from)?;
                compare(&basis_inventory, &other_inventory)
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
            Ok(if report.difference_count > 0 {
                EXIT_DIFFERENCES
            } else {
                0
            })
        }

        Command::Verify {
            inventory,
            directory,
        } => {
            let inventory = FileInventory::load(&inventory).map_err(RelicError::from)?;
            let report = compare_with_directory(
                &inventory,
                &directory,
                &config.algorithms,
                &config.default_group_id,
            )
            .map_err(RelicError::from)?;
            if report.difference_count == 0 {
                println!("ok: {} matches {}", report.basis, report.other);
                Ok(0)
            } else {
                println!(
                    "FAILED: {} difference(s) between {} and {}",
                    report.difference_count, report.basis, report.other
                );
                print_report(&report);
                Ok(EXIT_DIFFERENCES)
            }
        }

        Command::Additions { catalog, inventory } => {
            let catalog = SignatureCatalog::load(&catalog).map_err(RelicError::from)?;
            let inventory = FileInventory::load(&inventory).map_err(RelicError::from)?;
            let additions = catalog.version_additions(&inventory);
            println!("{}", serde_json::to_string_pretty(&additions)?);
            Ok(0)
        }

        Command::Ingest {
            object_home,
            source,
        } => {
            let object = StorageObject::from_home(&object_home)?;
            let summary = object.ingest_version(&source, &config)?;
            println!(
                "ingested {} v{}: {} file(s), {} new signature(s), {} stored ({} bytes)",
                object.object_id(),
                summary.version_id,
                summary.file_count,
                summary.new_entries,
                summary.files_stored,
                summary.bytes_stored
            );
            Ok(0)
        }

        Command::Bag {
            object_home,
            version,
            dest,
        } => {
            let object = StorageObject::from_home(&object_home)?;
            let summary = Bagger::new(&object).fill_bag(version, &dest)?;
            println!(
                "bagged {} v{} into {} ({} files, {} bytes)",
                object.object_id(),
                summary.version_id,
                dest.display(),
                summary.file_count,
                summary.byte_count
            );
            Ok(0)
        }
    }
}

/// Parse a comma-separated algorithm list
fn parse_algorithms(list: &str) -> Result<Vec<ChecksumAlgorithm>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| ChecksumAlgorithm::from_str(s).map_err(RelicError::from))
        .collect()
}

/// Print a per-group change summary
fn print_report(report: &FileInventoryDifference) {
    println!("{}", report.summary());
    for group in &report.group_differences {
        println!(
            "  group '{}': {} difference(s)",
            group.group_id, group.difference_count
        );
        for change in CHANGE_TYPES {
            let count = group.count(change);
            if count > 0 {
                println!("    {change}: {count}");
            }
        }
    }
}
