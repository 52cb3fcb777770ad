// src/banner.rs

/// Prints the startup banner to stderr so stdout carries only template output.
pub fn print_banner() {
    let banner = r#"
             _ _               _            _
  ___  _ __ | (_)_ __   ___   | |_ ___  ___| |_ ___ _ __
 / _ \| '_ \| | | '_ \ / _ \  | __/ _ \/ __| __/ _ \ '__|
| (_) | | | | | | | | |  __/  | ||  __/\__ \ ||  __/ |
 \___/|_| |_|_|_|_| |_|\___|   \__\___||___/\__\___|_|

    Template Execution Client
"#;
    eprintln!("{}", banner);
}
