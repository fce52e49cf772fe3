use std::path::PathBuf;

use crate::config::Config;
use crate::mail;

#[derive(clap::Args, Debug)]
pub struct Args {
    /// Path to the JSON config file. Built-in defaults are used when
    /// omitted.
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// The SMTP password for the sender account.
    #[arg(long, env = "SMTP_PASSWORD")]
    pub(crate) smtp_password: String,
}

pub fn main(args: Args) -> anyhow::Result<()> {
    let Args { config, smtp_password } = args;

    let config = Config::load(config.as_deref())?;
    let charts = config.mailed_chart_paths();
    let message = mail::build_digest(&config.mail, &charts)?;
    mail::send_digest(&config.mail, &smtp_password, &message)?;

    Ok(())
}
