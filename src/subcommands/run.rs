use std::path::PathBuf;

use super::{notify, report};

#[derive(clap::Args, Debug)]
pub struct Args {
    /// The warehouse API key to use. This key will be cached.
    #[arg(long, default_value = None, env = "WAREHOUSE_API_KEY")]
    api_key: Option<String>,

    /// Path to the JSON config file. Built-in defaults are used when
    /// omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// The first day of the report window, of the form "%Y-%m-%d". Defaults
    /// to 30 days before the last day.
    #[arg(long = "from")]
    from_date: Option<String>,

    /// The last day of the report window, of the form "%Y-%m-%d". Defaults
    /// to today.
    #[arg(long = "to")]
    to_date: Option<String>,

    /// The SMTP password for the sender account.
    #[arg(long, env = "SMTP_PASSWORD")]
    smtp_password: String,
}

pub fn main(args: Args) -> anyhow::Result<()> {
    let Args { api_key, config, from_date, to_date, smtp_password } = args;

    report::main(report::Args { api_key, config: config.clone(), from_date, to_date })?;
    notify::main(notify::Args { config, smtp_password })?;

    Ok(())
}
