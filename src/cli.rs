use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub config_path: Option<PathBuf>,
    pub ticks: Option<usize>,
    pub capacity: Option<usize>,
    pub interval_ms: Option<u64>,
    pub help: bool,
}

pub const USAGE: &str = "\
usage: nexus-feed [--config <path>] [--ticks <n>] [--capacity <n>] [--interval-ms <n>]

  --config <path>     JSON feed configuration
  --ticks <n>         stop after n events have been pushed
  --capacity <n>      override the feed capacity
  --interval-ms <n>   override the generation interval
  -h, --help          show this message";

impl CliOptions {
    /// Parse flags (without the program name).
    pub fn parse<I>(args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = Self::default();
        let mut args = args.into_iter();

        while let Some(flag) = args.next() {
            match flag.as_str() {
                "-h" | "--help" => options.help = true,
                "--config" => {
                    options.config_path = Some(PathBuf::from(required_value(&flag, args.next())?));
                }
                "--ticks" => options.ticks = Some(parse_number(&flag, args.next())?),
                "--capacity" => options.capacity = Some(parse_number(&flag, args.next())?),
                "--interval-ms" => options.interval_ms = Some(parse_number(&flag, args.next())?),
                other => return Err(format!("unknown argument '{other}'\n\n{USAGE}")),
            }
        }

        Ok(options)
    }
}

fn required_value(flag: &str, value: Option<String>) -> Result<String, String> {
    value
        .filter(|v| !v.starts_with("--"))
        .ok_or_else(|| format!("missing value for {flag}"))
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: Option<String>) -> Result<T, String> {
    let raw = required_value(flag, value)?;
    raw.trim()
        .parse::<T>()
        .map_err(|_| format!("invalid {flag} value '{raw}': expected a non-negative integer"))
}
