//! Interactive import flow: login, pick a robot, scan for unregistered
//! bags, register them, upload one at a time.

use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use bagport_api::{ApiClient, Robot};
use bagport_archive::CompressionMode;
use bagport_bags::find_unregistered_bags;
use bagport_upload::{BagUploader, BatchUploader, UploadEvent, UploadTarget};
use clap::Parser;

use crate::config::Config;

/// Import bags recorded onto external storage and upload them.
#[derive(Debug, Parser)]
#[command(name = "bagport", version, about)]
pub struct Args {
    /// Mount path of the storage device holding bag directories.
    pub dir: PathBuf,

    /// Account email (prompted when omitted).
    #[arg(long)]
    pub email: Option<String>,

    /// Robot the bags were recorded on (prompted when omitted).
    #[arg(long)]
    pub robot: Option<i64>,

    /// Upload every unregistered bag without per-bag confirmation.
    #[arg(long)]
    pub all: bool,

    /// Service base URL override.
    #[arg(long)]
    pub host: Option<String>,

    /// Archive without compression.
    #[arg(long)]
    pub stored: bool,
}

pub async fn run(args: Args, config: Config) -> anyhow::Result<()> {
    let host = args.host.as_deref().unwrap_or(&config.host);
    let client = ApiClient::with_base_url(host).context("building API client")?;

    println!("bagport: import bags recorded outside the platform\n");

    let email = match &args.email {
        Some(email) => email.clone(),
        None => prompt("Email: ")?,
    };
    let password = rpassword::prompt_password("Password: ")?;

    println!("Logging in...");
    let mut session = client
        .login(&email, &password)
        .await
        .context("login failed, check your credentials")?;
    println!("Successfully logged in.\n");

    let robots = client.list_robots(&session).await?;
    anyhow::ensure!(!robots.is_empty(), "no robots registered on this account");
    let robot_id = match args.robot {
        Some(id) if robots.iter().any(|r| r.id == id) => id,
        Some(id) => anyhow::bail!("robot id {id} not found on this account"),
        None => pick_robot(&robots)?,
    };

    println!(
        "\nSearching for unregistered bags in {} ...",
        args.dir.display()
    );
    let registered: HashSet<String> = client
        .list_bags(&session)
        .await?
        .into_iter()
        .map(|b| b.bag_uuid)
        .collect();
    let bags = find_unregistered_bags(&args.dir, &registered)?;

    if bags.is_empty() {
        println!("No unregistered bags found in {}. Exiting.", args.dir.display());
        return Ok(());
    }

    println!("Found the following bags to import:");
    for bag in &bags {
        println!("  - {}", bag.name);
    }
    println!();

    // Register everything found; upload what the user confirms.
    let mut targets = Vec::new();
    for bag in &bags {
        let registration = bag.registration(robot_id);
        client
            .register_bag(&session, &registration)
            .await
            .with_context(|| format!("failed to register {}", bag.name))?;
        tracing::info!(bag = %bag.name, uuid = %registration.bag_uuid, "registered bag");

        if args.all || confirm(&format!("Upload {}? (y/n): ", bag.name))? {
            targets.push(UploadTarget {
                bag_uuid: registration.bag_uuid,
                name: bag.name.clone(),
                path: bag.path.clone(),
            });
        }
    }

    if targets.is_empty() {
        println!("Nothing selected for upload.");
        return Ok(());
    }

    let compression = if args.stored {
        CompressionMode::Stored
    } else {
        CompressionMode::Deflate
    };
    let uploader = BagUploader::new(&client).with_compression(compression);
    let mut batch = BatchUploader::new(uploader);
    let mut events = batch.take_events().expect("fresh batch");

    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                UploadEvent::PartUploaded {
                    part_number, bytes, ..
                } => {
                    println!("    part {part_number}: {:.1} MiB", bytes as f64 / (1 << 20) as f64);
                }
                UploadEvent::Retrying { reason, .. } => {
                    println!("    attempt failed ({reason}); refreshed session, restarting upload");
                }
                _ => {}
            }
        }
    });

    let total = targets.len();
    let results = batch.run(&mut session, &targets).await;
    drop(batch);
    let _ = printer.await;

    let mut failed = 0;
    for (i, result) in results.iter().enumerate() {
        if result.success {
            println!(
                "Uploaded {}/{}: {} ({} part{})",
                i + 1,
                total,
                result.name,
                result.parts,
                if result.parts == 1 { "" } else { "s" }
            );
        } else {
            failed += 1;
            eprintln!(
                "Failed to upload {}: {}",
                result.name,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    anyhow::ensure!(failed == 0, "{failed} bag(s) failed to upload");
    Ok(())
}

fn prompt(message: &str) -> anyhow::Result<String> {
    print!("{message}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn confirm(message: &str) -> anyhow::Result<bool> {
    loop {
        match prompt(message)?.as_str() {
            "y" => return Ok(true),
            "n" => return Ok(false),
            _ => println!("Please enter a valid response (y/n)."),
        }
    }
}

fn pick_robot(robots: &[Robot]) -> anyhow::Result<i64> {
    println!("\nRobots on this account:");
    for robot in robots {
        println!("  - {} (id={})", robot.name, robot.id);
    }
    loop {
        let input = prompt("Which robot were these bags recorded on? (id): ")?;
        if let Ok(id) = input.parse::<i64>()
            && robots.iter().any(|r| r.id == id)
        {
            return Ok(id);
        }
        println!("Please enter a valid robot id.");
    }
}
