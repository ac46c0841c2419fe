use std::env;
use std::time::Duration;

use terneo::DeviceSession;

#[tokio::main]
async fn main() -> terneo::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let usage = "usage: monitor <host> <serial> [--port <n>] [--user <u> --password <p>] [--interval <secs>]";
    let host = args.get(1).expect(usage);
    let serial = args.get(2).expect(usage);
    let flag = |name: &str| {
        args.iter()
            .position(|a| a == name)
            .and_then(|i| args.get(i + 1))
            .cloned()
    };

    let mut builder = DeviceSession::builder(serial, host);
    if let Some(port) = flag("--port").and_then(|v| v.parse().ok()) {
        builder = builder.port(port);
    }
    if let Some(user) = flag("--user") {
        builder = builder.username(user);
    }
    if let Some(pass) = flag("--password") {
        builder = builder.password(pass);
    }
    let interval = flag("--interval")
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(30));

    let mut session = builder.build()?;
    println!("Polling {} every {:?}...", session.endpoint(), interval);

    loop {
        session.refresh().await;
        if session.available() {
            let fmt_temp = |t: Option<terneo::Temperature>| {
                t.map(|t| t.to_string()).unwrap_or_else(|| "--".to_string())
            };
            println!(
                "[{}] {} -> {} | mode: {:?} | action: {:?}",
                session.name(),
                fmt_temp(session.current_temperature()),
                fmt_temp(session.setpoint()),
                session.mode(),
                session.action(),
            );
        } else {
            println!("[{}] unavailable", session.name());
        }
        tokio::time::sleep(interval).await;
    }
}
