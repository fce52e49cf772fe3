use std::path::PathBuf;

use anyhow::bail;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone as _, Utc};

use crate::config::Config;
use crate::date_range::DateWindow;
use crate::{reports, warehouse};

#[derive(clap::Args, Debug)]
pub struct Args {
    /// The warehouse API key to use. This key will be cached.
    #[arg(long, default_value = None, env = "WAREHOUSE_API_KEY")]
    pub(crate) api_key: Option<String>,

    /// Path to the JSON config file. Built-in defaults are used when
    /// omitted.
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// The first day of the report window, of the form "%Y-%m-%d". Defaults
    /// to 30 days before the last day.
    #[arg(long = "from")]
    pub(crate) from_date: Option<String>,

    /// The last day of the report window, of the form "%Y-%m-%d". Defaults
    /// to today.
    #[arg(long = "to")]
    pub(crate) to_date: Option<String>,
}

pub fn main(args: Args) -> anyhow::Result<()> {
    let Args { api_key, config, from_date, to_date } = args;

    let config = Config::load(config.as_deref())?;
    let api_key = warehouse::get_api_key(api_key)?;
    let client = warehouse::SqlClient::new(&config.warehouse, api_key);

    let window =
        DateWindow::new(parse_day(from_date.as_deref())?, parse_day(to_date.as_deref())?);
    reports::generate_all(&client, &config, &window)?;

    Ok(())
}

fn parse_day(arg: Option<&str>) -> anyhow::Result<Option<DateTime<Utc>>> {
    let Some(arg) = arg else { return Ok(None) };
    match NaiveDate::parse_from_str(arg, "%Y-%m-%d") {
        Ok(date) => Ok(Some(Utc.from_utc_datetime(&NaiveDateTime::new(date, NaiveTime::MIN)))),
        Err(_) => bail!("invalid date format \"{arg}\". Use '%Y-%m-%d'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_parsing() {
        assert_eq!(parse_day(None).unwrap(), None);
        let parsed = parse_day(Some("2020-06-06")).unwrap().unwrap();
        assert_eq!(parsed.to_rfc3339(), "2020-06-06T00:00:00+00:00");
        assert!(parse_day(Some("06/06/2020")).is_err());
    }
}
