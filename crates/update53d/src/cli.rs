use clap::{Parser, ValueEnum};
use update53_core::config::{DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_INTERVAL_SECS};
use update53_core::{UpdateConfig, ZoneMatch};
use update53_ip_http::DEFAULT_METADATA_ENDPOINT;

macro_rules! env_prefix {
    () => {
        "UPDATE53_"
    };
}

/// Point a Route 53 A record at this host's public address
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "update53", author, version, about, long_about = None)]
pub struct Cli {
    /// Use this ip instead of the real public ip
    #[arg(
        long,
        alias = "forceip",
        value_name = "IP",
        env = concat!(env_prefix!(), "FORCE_IP")
    )]
    pub force_ip: Option<String>,

    /// Get the public ip as plain text from this url
    #[arg(
        long,
        alias = "getip",
        value_name = "URL",
        env = concat!(env_prefix!(), "GET_IP")
    )]
    pub get_ip: Option<String>,

    /// Hostname to update
    #[arg(
        long,
        required = true,
        value_name = "HOSTNAME",
        env = concat!(env_prefix!(), "HOSTNAME")
    )]
    pub hostname: String,

    /// Hosted zone id if known. Saves a zone listing call
    #[arg(
        long,
        alias = "hostedzone",
        value_name = "ZONE_ID",
        env = concat!(env_prefix!(), "HOSTED_ZONE")
    )]
    pub hosted_zone: Option<String>,

    /// Run as a daemon and check every interval
    #[arg(long, action, default_value_t = false, env = concat!(env_prefix!(), "DAEMON"))]
    pub daemon: bool,

    /// Display status info
    #[arg(long, action, default_value_t = false, env = concat!(env_prefix!(), "VERBOSE"))]
    pub verbose: bool,

    /// Produce extra output. Implies --verbose
    #[arg(long, action, default_value_t = false, env = concat!(env_prefix!(), "DEBUG"))]
    pub debug: bool,

    /// Seconds between checks in daemon mode
    #[arg(
        long,
        default_value_t = DEFAULT_INTERVAL_SECS,
        value_parser = clap::value_parser!(u64).range(10..=86400),
        env = concat!(env_prefix!(), "INTERVAL")
    )]
    pub interval: u64,

    /// Timeout in seconds for public ip lookups
    #[arg(
        long,
        default_value_t = DEFAULT_HTTP_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..=300),
        env = concat!(env_prefix!(), "HTTP_TIMEOUT")
    )]
    pub http_timeout: u64,

    /// Instance metadata endpoint used when neither --force-ip nor --get-ip is given
    #[arg(
        long,
        default_value = DEFAULT_METADATA_ENDPOINT,
        value_name = "URL",
        env = concat!(env_prefix!(), "METADATA_ENDPOINT")
    )]
    pub metadata_endpoint: String,

    /// How the hostname is matched against hosted zone names
    #[arg(
        value_enum,
        long,
        default_value_t = ZoneMatchArg::First,
        env = concat!(env_prefix!(), "ZONE_MATCH")
    )]
    pub zone_match: ZoneMatchArg,

    /// Do not change any records, only log what would be submitted
    #[arg(long, action, default_value_t = false, env = concat!(env_prefix!(), "DRY_RUN"))]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ZoneMatchArg {
    /// First zone in listing order whose name is a suffix of the hostname
    First,
    /// Most specific zone whose name is a suffix of the hostname
    Longest,
}

impl From<ZoneMatchArg> for ZoneMatch {
    fn from(value: ZoneMatchArg) -> Self {
        match value {
            ZoneMatchArg::First => ZoneMatch::First,
            ZoneMatchArg::Longest => ZoneMatch::Longest,
        }
    }
}

impl Cli {
    /// Build the core configuration; empty strings count as unset
    pub fn to_config(&self) -> UpdateConfig {
        let mut config = UpdateConfig::new(self.hostname.as_str())
            .with_daemon(self.daemon)
            .with_zone_match(self.zone_match.into())
            .with_debug(self.debug);

        if let Some(ref ip) = self.force_ip {
            config = config.with_force_ip(ip.as_str());
        }
        if let Some(ref url) = self.get_ip {
            config = config.with_ip_source_url(url.as_str());
        }
        if let Some(ref zone) = self.hosted_zone {
            config = config.with_hosted_zone_id(zone.as_str());
        }

        config.verbose |= self.verbose;
        config.interval_secs = self.interval;
        config
    }
}
