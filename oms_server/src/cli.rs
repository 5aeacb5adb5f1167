use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // OMS_INVENTORY_API_KEY is deliberately left out
    const DISPLAY_ENVS: [&str; 20] = [
        "RUST_LOG",
        "OMS_HOST",
        "OMS_PORT",
        "OMS_DATABASE_URL",
        "OMS_INVENTORY_URL",
        "OMS_INVENTORY_TIMEOUT_SECS",
        "OMS_OBJECT_STORE_ROOT",
        "OMS_STAGING_DIR",
        "OMS_PUBLIC_DIR",
        "OMS_PUBLIC_BASE_URL",
        "OMS_UPLOAD_BUCKET",
        "OMS_UPLOAD_KEY",
        "OMS_CSV_BATCH_SIZE",
        "OMS_SWEEP_INTERVAL_SECS",
        "OMS_QUEUE_WORKERS",
        "OMS_QUEUE_MAX_MESSAGES",
        "OMS_QUEUE_VISIBILITY_SECS",
        "OMS_EVENT_PARTITIONS",
        "OMS_PUBLISH_RETRIES",
        "OMS_WEBHOOK_TIMEOUT_SECS",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
