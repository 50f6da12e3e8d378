use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty.
///
/// Returns true if any arguments were given, in which case the help text has been printed and the caller should exit.
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
    // Be explicit about which envars to print, so as to avoid accidentally exposing secrets
    const DISPLAY_ENVS: [&str; 14] = [
        "RUST_LOG",
        "FPG_HOST",
        "FPG_PORT",
        "FPG_DATABASE_URL",
        "FPG_PUBLIC_BASE_URL",
        "FPG_GATEWAY_BASE_URL",
        "FPG_GATEWAY_SIGNATURE_CHECKS",
        "FPG_GATEWAY_TIMEOUT_MS",
        "FPG_VERIFY_ATTEMPTS",
        "FPG_VERIFY_BACKOFF_MS",
        "FPG_CURRENCY",
        "FPG_SMTP_HOST",
        "FPG_SMTP_PORT",
        "FPG_SMTP_FROM",
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
