use std::env;
use tracing::info;

pub fn welcome() {

    let version = env!("CARGO_PKG_VERSION");
    let run_mode = env::var("COURIER_MODE").unwrap_or_else(|_| "development".into());

    let title = [
        r"   ____ ___  _   _ ____  ___ _____ ____   ",
        r"  / ___/ _ \| | | |  _ \|_ _| ____|  _ \  ",
        r" | |  | | | | | | | |_) || ||  _| | |_) | ",
        r" | |__| |_| | |_| |  _ < | || |___|  _ <  ",
        r"  \____\___/ \___/|_| \_\___|_____|_| \_\ ",
    ];
    for line in title {
        println!("{}", line);
    }
    println!();
    println!("Version: {} | Run-Mode: {}", version, run_mode);
    println!();
    info!("Starting up courier in {run_mode} mode.");
}
