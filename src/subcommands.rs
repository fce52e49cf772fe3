pub mod notify;
pub mod report;
pub mod run;

#[derive(clap::Subcommand, Debug)]
pub enum Subcommand {
    /// Query the warehouse and render every report chart.
    Report(report::Args),
    /// Email the already-rendered charts to the configured recipients.
    Notify(notify::Args),
    /// Render the charts, then email them. The cron entry point.
    Run(run::Args),
}
