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
    // Keys, tokens and the database url are deliberately left off this list
    const DISPLAY_ENVS: [&str; 10] = [
        "RUST_LOG",
        "SF_HOST",
        "SF_PORT",
        "SF_VISITOR_COOKIE",
        "SF_VERIFY_CART_ON_CHECKOUT",
        "SF_RAZORPAY_API_URL",
        "SF_GATEWAY_TIMEOUT_SECS",
        "SF_NOTIFY_RELAY_URL",
        "SF_NOTIFY_TO",
        "SF_NOTIFY_TIMEOUT_SECS",
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
