//! Parameter table and module constants
//!
//! Single source of truth for every parameter the renderer knows about. The
//! table order is the render order inside each section, so appending a field
//! means choosing where its line goes in datadog.conf.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use crate::os::OsFamily;
use crate::types::{FieldKind, OutputFormat, ParamValue, Presence, Section};

/// Agent configuration directory
pub const CONF_DIR: &str = "/etc/dd-agent";

/// Rendered agent configuration file
pub const CONF_FILE: &str = "/etc/dd-agent/datadog.conf";

/// Puppet run-report configuration file
pub const REPORTS_CONF_FILE: &str = "/etc/dd-agent/datadog.yaml";

/// Owner of the configuration files
pub const DD_USER: &str = "dd-agent";

/// Group of the configuration files
pub const DD_GROUP: &str = "root";

/// Agent package name, identical on every family
pub const PACKAGE_NAME: &str = "datadog-agent";

/// Agent service name, identical on every family
pub const SERVICE_NAME: &str = "datadog-agent";

/// Default value of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    /// No default: the field stays unset unless overridden
    None,
    Bool(bool),
    Int(i64),
    Str(&'static str),
    /// String default that differs per family
    ByFamily {
        debian: &'static str,
        redhat: &'static str,
    },
}

impl DefaultValue {
    pub fn is_family_specific(&self) -> bool {
        matches!(self, Self::ByFamily { .. })
    }

    /// Materialize the default for a family
    pub fn value_for(&self, family: OsFamily) -> Option<ParamValue> {
        match *self {
            Self::None => None,
            Self::Bool(b) => Some(ParamValue::Bool(b)),
            Self::Int(i) => Some(ParamValue::Int(i)),
            Self::Str(s) => Some(ParamValue::Str(s.to_string())),
            Self::ByFamily { debian, redhat } => Some(ParamValue::Str(
                match family {
                    OsFamily::Debian => debian,
                    OsFamily::RedHat => redhat,
                }
                .to_string(),
            )),
        }
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "(unset)"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Str(s) => write!(f, "{}", s),
            Self::ByFamily { debian, redhat } => write!(f, "debian: {}, redhat: {}", debian, redhat),
        }
    }
}

/// Declaration of one known parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Key as written in datadog.conf and in overrides
    pub key: &'static str,
    /// Alternative override names for the same field
    pub aliases: &'static [&'static str],
    pub kind: FieldKind,
    pub format: OutputFormat,
    pub presence: Presence,
    /// `None` for module-level fields that only drive the install plan
    pub section: Option<Section>,
    pub default: DefaultValue,
    pub description: &'static str,
}

impl FieldSpec {
    const fn new(
        key: &'static str,
        section: Option<Section>,
        kind: FieldKind,
        format: OutputFormat,
        presence: Presence,
        default: DefaultValue,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            aliases: &[],
            kind,
            format,
            presence,
            section,
            default,
            description,
        }
    }

    const fn with_aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    /// True when `name` is this field's key or one of its aliases
    pub fn answers_to(&self, name: &str) -> bool {
        self.key == name || self.aliases.iter().any(|alias| *alias == name)
    }

    /// True when the field has a line in datadog.conf
    pub fn is_rendered(&self) -> bool {
        self.section.is_some()
    }
}

use DefaultValue as D;
use FieldKind as K;
use OutputFormat as F;
use Presence as P;

const GENERAL: Option<Section> = Some(Section::General);
const PROXY: Option<Section> = Some(Section::Proxy);
const PUP: Option<Section> = Some(Section::Pup);
const DOGSTATSD: Option<Section> = Some(Section::Dogstatsd);
const GANGLIA: Option<Section> = Some(Section::Ganglia);
const LOGGING: Option<Section> = Some(Section::Logging);
const MODULE: Option<Section> = None;

/// Every known parameter, in render order.
#[rustfmt::skip]
pub static FIELDS: &[FieldSpec] = &[
    // General
    FieldSpec::new("dd_url", GENERAL, K::Url, F::Plain, P::Live,
        D::Str("https://app.datadoghq.com"), "Datadog intake URL"),
    FieldSpec::new("api_key", GENERAL, K::Text, F::QuotedDefault, P::Live,
        D::Str("your_API_key"), "Datadog API key"),
    FieldSpec::new("hostname", GENERAL, K::Text, F::Plain, P::Optional,
        D::None, "Force the reported hostname").with_aliases(&["host"]),
    FieldSpec::new("tags", GENERAL, K::List, F::CommaList, P::Optional,
        D::None, "Host tags, e.g. env:prod, role:database"),
    FieldSpec::new("use_mount", GENERAL, K::Boolean, F::TrueFalse, P::Live,
        D::Bool(false), "Report disk usage by mount point instead of device"),
    FieldSpec::new("non_local_traffic", GENERAL, K::Boolean, F::TrueFalse, P::Live,
        D::Bool(false), "Accept metrics from other hosts"),
    FieldSpec::new("collect_ec2_tags", GENERAL, K::Boolean, F::YesNo, P::CommentedDefault,
        D::Bool(false), "Collect AWS EC2 custom tags as host tags"),
    FieldSpec::new("collect_instance_metadata", GENERAL, K::Boolean, F::YesNo, P::CommentedDefault,
        D::Bool(true), "Collect cloud instance metadata"),
    FieldSpec::new("recent_point_threshold", GENERAL, K::Integer, F::Plain, P::CommentedDefault,
        D::Int(30), "Seconds after which incoming points are considered stale"),
    FieldSpec::new("listen_port", GENERAL, K::Port, F::Plain, P::CommentedDefault,
        D::Int(17123), "Forwarder listening port"),
    FieldSpec::new("graphite_listen_port", GENERAL, K::Port, F::Plain, P::CommentedDefault,
        D::Int(17123), "Graphite listener port"),
    FieldSpec::new("additional_checksd", GENERAL, K::Text, F::Plain, P::CommentedDefault,
        D::Str("/etc/dd-agent/checks.d"), "Directory of additional custom checks"),
    FieldSpec::new("use_curl_http_client", GENERAL, K::Boolean, F::TrueFalse, P::CommentedDefault,
        D::Bool(false), "Use the curl HTTP client in the forwarder"),
    FieldSpec::new("skip_ssl_validation", GENERAL, K::Boolean, F::TrueFalse, P::CommentedDefault,
        D::Bool(false), "Skip SSL certificate validation towards the intake"),
    FieldSpec::new("device_blacklist_re", GENERAL, K::Text, F::Plain, P::CommentedDefault,
        D::Str(r".*\/dev\/mapper\/lxc-box.*"), "Regular expression of devices to ignore"),
    // Proxy
    FieldSpec::new("proxy_host", PROXY, K::Text, F::Plain, P::Optional,
        D::None, "Proxy host"),
    FieldSpec::new("proxy_port", PROXY, K::Port, F::Plain, P::Optional,
        D::None, "Proxy port"),
    FieldSpec::new("proxy_user", PROXY, K::Text, F::Plain, P::Optional,
        D::None, "Proxy user"),
    FieldSpec::new("proxy_password", PROXY, K::Text, F::Plain, P::Optional,
        D::None, "Proxy password"),
    // Pup
    FieldSpec::new("use_pup", PUP, K::Boolean, F::YesNo, P::CommentedDefault,
        D::Bool(false), "Run the pup web interface"),
    FieldSpec::new("pup_port", PUP, K::Port, F::Plain, P::CommentedDefault,
        D::Int(17125), "Pup listening port"),
    FieldSpec::new("pup_interface", PUP, K::Text, F::Plain, P::CommentedDefault,
        D::Str("localhost"), "Pup listening interface"),
    FieldSpec::new("pup_url", PUP, K::Url, F::Plain, P::CommentedDefault,
        D::Str("http://localhost:17125"), "Pup URL"),
    // DogStatsD
    FieldSpec::new("bind_host", DOGSTATSD, K::Text, F::Plain, P::CommentedDefault,
        D::Str("localhost"), "Interface DogStatsD and the forwarder bind to"),
    FieldSpec::new("use_dogstatsd", DOGSTATSD, K::Boolean, F::YesNo, P::Live,
        D::Bool(false), "Run DogStatsD"),
    FieldSpec::new("dogstatsd_port", DOGSTATSD, K::Port, F::Plain, P::Live,
        D::Int(8125), "DogStatsD UDP port"),
    FieldSpec::new("dogstatsd_target", DOGSTATSD, K::Url, F::Plain, P::CommentedDefault,
        D::Str("http://localhost:17123"), "Where DogStatsD sends aggregated metrics"),
    FieldSpec::new("dogstatsd_interval", DOGSTATSD, K::Integer, F::Plain, P::CommentedDefault,
        D::Int(10), "DogStatsD flush interval in seconds"),
    FieldSpec::new("dogstatsd_normalize", DOGSTATSD, K::Boolean, F::YesNo, P::CommentedDefault,
        D::Bool(true), "Normalize counters to per-second rates"),
    FieldSpec::new("statsd_forward_host", DOGSTATSD, K::Text, F::Plain, P::CommentedDefault,
        D::Str("address_of_own_statsd_server"), "Forward received packets to another statsd"),
    FieldSpec::new("statsd_forward_port", DOGSTATSD, K::Port, F::Plain, P::CommentedDefault,
        D::Int(8125), "Port of the forwarded statsd"),
    // Ganglia
    FieldSpec::new("ganglia_host", GANGLIA, K::Text, F::Plain, P::CommentedDefault,
        D::Str("localhost"), "Ganglia gmetad host"),
    FieldSpec::new("ganglia_port", GANGLIA, K::Port, F::Plain, P::CommentedDefault,
        D::Int(8651), "Ganglia gmetad port"),
    // Logging
    FieldSpec::new("log_level", LOGGING, K::Text, F::Upper, P::Live,
        D::Str("info"), "Agent log level"),
    FieldSpec::new("log_to_syslog", LOGGING, K::Boolean, F::YesNo, P::Live,
        D::Bool(true), "Send agent logs to syslog"),
    FieldSpec::new("collector_log_file", LOGGING, K::Text, F::Plain, P::CommentedDefault,
        D::Str("/var/log/datadog/collector.log"), "Collector log file"),
    FieldSpec::new("forwarder_log_file", LOGGING, K::Text, F::Plain, P::CommentedDefault,
        D::Str("/var/log/datadog/forwarder.log"), "Forwarder log file"),
    FieldSpec::new("dogstatsd_log_file", LOGGING, K::Text, F::Plain, P::CommentedDefault,
        D::Str("/var/log/datadog/dogstatsd.log"), "DogStatsD log file"),
    FieldSpec::new("pup_log_file", LOGGING, K::Text, F::Plain, P::CommentedDefault,
        D::Str("/var/log/datadog/pup.log"), "Pup log file"),
    FieldSpec::new("syslog_host", LOGGING, K::Text, F::Plain, P::Optional,
        D::None, "Remote syslog host"),
    FieldSpec::new("syslog_port", LOGGING, K::Port, F::Plain, P::Optional,
        D::None, "Remote syslog port"),
    // Module-level, consumed by the install plan
    FieldSpec::new("puppet_run_reports", MODULE, K::Boolean, F::TrueFalse, P::Live,
        D::Bool(false), "Install the Puppet run-report integration"),
    FieldSpec::new("puppet_gem_provider", MODULE, K::Text, F::Plain, P::Live,
        D::Str("gem"), "Gem provider used for dogapi"),
    FieldSpec::new("rubydev_package", MODULE, K::Text, F::Plain, P::Live,
        D::ByFamily { debian: "ruby-dev", redhat: "ruby-devel" },
        "Ruby headers package needed by dogapi"),
    FieldSpec::new("service_ensure", MODULE, K::Choice(&["running", "stopped"]), F::Plain, P::Live,
        D::Str("running"), "Desired state of the agent service"),
    FieldSpec::new("service_enable", MODULE, K::Boolean, F::TrueFalse, P::Live,
        D::Bool(true), "Start the agent service at boot"),
];

/// Key and alias lookup into `FIELDS`
static INDEX: LazyLock<HashMap<&'static str, usize>> = LazyLock::new(|| {
    FIELDS
        .iter()
        .enumerate()
        .flat_map(|(i, spec)| {
            std::iter::once(spec.key)
                .chain(spec.aliases.iter().copied())
                .map(move |name| (name, i))
        })
        .collect()
});

/// Find a field by key or alias
pub fn lookup(name: &str) -> Option<&'static FieldSpec> {
    INDEX.get(name).map(|&i| &FIELDS[i])
}

/// Fields placed in a section, in render order
pub fn section_fields(section: Section) -> impl Iterator<Item = &'static FieldSpec> {
    FIELDS.iter().filter(move |spec| spec.section == Some(section))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use strum::IntoEnumIterator;

    #[test]
    fn test_keys_and_aliases_are_unique() {
        let mut seen = HashSet::new();
        for spec in FIELDS {
            assert!(seen.insert(spec.key), "duplicate key {}", spec.key);
            for alias in spec.aliases {
                assert!(seen.insert(*alias), "duplicate alias {}", alias);
            }
        }
        assert_eq!(INDEX.len(), seen.len());
    }

    #[test]
    fn test_lookup_by_alias() {
        assert_eq!(lookup("host").map(|s| s.key), Some("hostname"));
        assert_eq!(lookup("hostname").map(|s| s.key), Some("hostname"));
        assert!(lookup("not_a_real_field").is_none());
    }

    #[test]
    fn test_optional_fields_have_no_default() {
        for spec in FIELDS.iter().filter(|s| s.presence == Presence::Optional) {
            assert_eq!(spec.default, DefaultValue::None, "{} should have no default", spec.key);
        }
    }

    #[test]
    fn test_non_optional_fields_have_a_default() {
        for spec in FIELDS.iter().filter(|s| s.presence != Presence::Optional) {
            assert_ne!(spec.default, DefaultValue::None, "{} needs a default", spec.key);
        }
    }

    #[test]
    fn test_sections_are_contiguous() {
        // Render order relies on each section's fields being adjacent
        let order: Vec<Section> = FIELDS.iter().filter_map(|s| s.section).collect();
        let mut deduped = order.clone();
        deduped.dedup();
        let expected: Vec<Section> = Section::iter().collect();
        assert_eq!(deduped, expected);
    }

    #[test]
    fn test_family_specific_default() {
        let spec = lookup("rubydev_package").unwrap();
        assert!(spec.default.is_family_specific());
        assert_eq!(
            spec.default.value_for(OsFamily::Debian),
            Some(ParamValue::from("ruby-dev"))
        );
        assert_eq!(
            spec.default.value_for(OsFamily::RedHat),
            Some(ParamValue::from("ruby-devel"))
        );
    }

    #[test]
    fn test_default_display() {
        assert_eq!(lookup("proxy_host").unwrap().default.to_string(), "(unset)");
        assert_eq!(lookup("pup_port").unwrap().default.to_string(), "17125");
        assert_eq!(
            lookup("rubydev_package").unwrap().default.to_string(),
            "debian: ruby-dev, redhat: ruby-devel"
        );
    }

    #[test]
    fn test_section_fields_order() {
        let proxy: Vec<&str> = section_fields(Section::Proxy).map(|s| s.key).collect();
        assert_eq!(proxy, vec!["proxy_host", "proxy_port", "proxy_user", "proxy_password"]);
    }
}
