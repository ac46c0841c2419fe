use std::env;
use std::time::Duration;

use terneo::{DeviceSession, MessageLogMode};

async fn print_status(session: &mut DeviceSession, label: &str) {
    session.refresh().await;
    println!("\n=== {label} ===");
    if session.available() {
        println!("{:#?}", session.attributes());
    } else {
        println!("device unavailable");
    }
}

#[tokio::main]
async fn main() -> terneo::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let host = args
        .get(1)
        .expect("usage: power_cycle <host> <serial> [--user <u> --password <p>] [--no-log]");
    let serial = args
        .get(2)
        .expect("usage: power_cycle <host> <serial> [--user <u> --password <p>] [--no-log]");
    let no_log = args.iter().any(|a| a == "--no-log");
    let flag = |name: &str| {
        args.iter()
            .position(|a| a == name)
            .and_then(|i| args.get(i + 1))
            .cloned()
    };

    let mut builder = DeviceSession::builder(serial, host);
    if let Some(user) = flag("--user") {
        builder = builder.username(user);
    }
    if let Some(pass) = flag("--password") {
        builder = builder.password(pass);
    }
    if !no_log {
        let ts = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path = format!("logs/power_cycle_{ts}.ndjson");
        std::fs::create_dir_all("logs").ok();
        println!("Logging all requests/responses to {path}");
        builder = builder.message_log(MessageLogMode::Full, &path);
    }

    let mut session = builder.build()?;
    let settle = Duration::from_secs(2);

    print_status(&mut session, "Status").await;

    println!("\n=== Power state ===");
    match session.query_power().await {
        Some(true) => println!("on"),
        Some(false) => println!("off"),
        None => println!("unknown"),
    }

    println!("\n=== Turn off ===");
    println!("accepted: {}", session.turn_off().await?);
    tokio::time::sleep(settle).await;
    print_status(&mut session, "Status after turn off").await;

    println!("\n=== Turn on ===");
    println!("accepted: {}", session.turn_on().await?);
    tokio::time::sleep(settle).await;
    print_status(&mut session, "Status after turn on").await;

    Ok(())
}
