//! Install Plan
//!
//! Describes, as data, what the provisioning caller has to do around the
//! rendered file: repository, packages, the config directory and file, the
//! service, and the optional Puppet run-report integration.
//!
//! # What This Explicitly Refuses To Do
//!
//! - Execute any step: the caller owns package managers and service control
//! - Validate repository reachability
//! - Pick package versions beyond `latest` / `present` / `absent`

use serde::Serialize;

use crate::defaults::{
    CONF_DIR, CONF_FILE, DD_GROUP, DD_USER, PACKAGE_NAME, REPORTS_CONF_FILE, SERVICE_NAME,
};
use crate::logic::renderer::RenderedDocument;
use crate::logic::resolver::ResolvedConfig;
use crate::os::OsFamily;
use crate::types::ServiceEnsure;

/// apt signing key id for the Datadog repository
const APT_KEY_ID: &str = "C7A7DA52";

const APT_LOCATION: &str = "http://apt.datadoghq.com/";
const YUM_BASEURL: &str = "http://yum.datadoghq.com/rpm/x86_64/";
const YUM_GPGKEY: &str = "https://yum.datadoghq.com/DATADOG_RPM_KEY.public";

/// Legacy Debian package that conflicts with the agent package
const LEGACY_DEBIAN_PACKAGE: &str = "datadog-agent-base";

/// Gem the Puppet report processor talks to the API with
const DOGAPI_GEM: &str = "dogapi";

/// Desired package state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageEnsure {
    Latest,
    Present,
    Absent,
}

/// Package repository definition, per family
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum Repository {
    Apt {
        name: String,
        location: String,
        release: String,
        repos: String,
        key: String,
    },
    Yum {
        name: String,
        baseurl: String,
        gpgkey: String,
    },
}

/// One declarative provisioning step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    Repository(Repository),
    Package {
        name: String,
        provider: String,
        ensure: PackageEnsure,
    },
    Gem {
        name: String,
        provider: String,
    },
    Directory {
        path: String,
        owner: String,
        group: String,
        mode: String,
    },
    File {
        path: String,
        owner: String,
        group: String,
        mode: String,
        content: String,
        /// Service restarted when the content changes
        notify: Option<String>,
    },
    Service {
        name: String,
        ensure: ServiceEnsure,
        enable: bool,
    },
}

/// Ordered steps for one host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallPlan {
    pub family: OsFamily,
    pub steps: Vec<Step>,
}

impl InstallPlan {
    /// Paths of every file the plan writes
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().filter_map(|step| match step {
            Step::File { path, .. } => Some(path.as_str()),
            _ => None,
        })
    }

    /// Names of every package the plan installs or removes
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().filter_map(|step| match step {
            Step::Package { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }
}

/// Build the provisioning steps for a resolved configuration.
///
/// `document` is the rendered datadog.conf, embedded as the config file step.
pub fn resolve_plan(config: &ResolvedConfig, document: &RenderedDocument) -> InstallPlan {
    let family = config.family();
    let provider = family.package_provider().to_string();
    let mut steps = Vec::new();

    // 1. Repository, plus the legacy package cleanup on Debian
    match family {
        OsFamily::Debian => {
            steps.push(Step::Repository(Repository::Apt {
                name: "datadog".into(),
                location: APT_LOCATION.into(),
                release: "stable".into(),
                repos: "main".into(),
                key: APT_KEY_ID.into(),
            }));
            steps.push(Step::Package {
                name: LEGACY_DEBIAN_PACKAGE.into(),
                provider: provider.clone(),
                ensure: PackageEnsure::Absent,
            });
        }
        OsFamily::RedHat => {
            steps.push(Step::Repository(Repository::Yum {
                name: "datadog".into(),
                baseurl: YUM_BASEURL.into(),
                gpgkey: YUM_GPGKEY.into(),
            }));
        }
    }

    // 2. Agent package
    steps.push(Step::Package {
        name: PACKAGE_NAME.into(),
        provider: provider.clone(),
        ensure: PackageEnsure::Latest,
    });

    // 3. Config directory and file
    steps.push(Step::Directory {
        path: CONF_DIR.into(),
        owner: DD_USER.into(),
        group: DD_GROUP.into(),
        mode: "0755".into(),
    });
    steps.push(Step::File {
        path: CONF_FILE.into(),
        owner: DD_USER.into(),
        group: DD_GROUP.into(),
        mode: "0640".into(),
        content: document.to_text(),
        notify: Some(SERVICE_NAME.into()),
    });

    // 4. Service
    steps.push(Step::Service {
        name: SERVICE_NAME.into(),
        ensure: config.service_ensure(),
        enable: config.bool_value("service_enable").unwrap_or(true),
    });

    // 5. Puppet run reports
    if config.bool_value("puppet_run_reports").unwrap_or(false) {
        steps.extend(report_steps(config, &provider));
    }

    tracing::debug!(%family, steps = steps.len(), "resolved install plan");

    InstallPlan { family, steps }
}

fn report_steps(config: &ResolvedConfig, provider: &str) -> Vec<Step> {
    let rubydev = config
        .str_value("rubydev_package")
        .unwrap_or_else(|| config.family().rubydev_package());
    let gem_provider = config.str_value("puppet_gem_provider").unwrap_or("gem");
    let api_key = config.str_value("api_key").unwrap_or_default();

    vec![
        Step::Package {
            name: rubydev.into(),
            provider: provider.into(),
            ensure: PackageEnsure::Present,
        },
        Step::Gem {
            name: DOGAPI_GEM.into(),
            provider: gem_provider.into(),
        },
        Step::File {
            path: REPORTS_CONF_FILE.into(),
            owner: "root".into(),
            group: "root".into(),
            mode: "0640".into(),
            content: format!("---\n:datadog_api_key: '{}'\n", api_key),
            notify: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::normalizer::normalize;
    use crate::logic::renderer::render;
    use crate::logic::resolver::{resolve, Overrides};
    use crate::types::ParamValue;

    fn plan_for(family: OsFamily, pairs: &[(&str, ParamValue)]) -> InstallPlan {
        let overrides: Overrides = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        let config = resolve(family, &overrides).unwrap();
        let document = render(&normalize(&config));
        resolve_plan(&config, &document)
    }

    #[test]
    fn test_debian_plan() {
        let plan = plan_for(OsFamily::Debian, &[]);
        assert!(matches!(plan.steps[0], Step::Repository(Repository::Apt { .. })));
        let packages: Vec<&str> = plan.packages().collect();
        assert_eq!(packages, vec!["datadog-agent-base", "datadog-agent"]);
    }

    #[test]
    fn test_redhat_plan() {
        let plan = plan_for(OsFamily::RedHat, &[]);
        assert!(matches!(plan.steps[0], Step::Repository(Repository::Yum { .. })));
        let packages: Vec<&str> = plan.packages().collect();
        assert_eq!(packages, vec!["datadog-agent"]);
    }

    #[test]
    fn test_plan_writes_config_file() {
        let plan = plan_for(OsFamily::Debian, &[("api_key", "notakey".into())]);
        let files: Vec<&str> = plan.files().collect();
        assert_eq!(files, vec!["/etc/dd-agent/datadog.conf"]);

        let content = plan
            .steps
            .iter()
            .find_map(|s| match s {
                Step::File { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .unwrap();
        assert!(content.lines().any(|l| l == "api_key: notakey"));
    }

    #[test]
    fn test_directory_precedes_file() {
        let plan = plan_for(OsFamily::Debian, &[]);
        let dir = plan
            .steps
            .iter()
            .position(|s| matches!(s, Step::Directory { .. }))
            .unwrap();
        let file = plan
            .steps
            .iter()
            .position(|s| matches!(s, Step::File { .. }))
            .unwrap();
        assert!(dir < file);
    }

    #[test]
    fn test_service_step_follows_parameters() {
        let plan = plan_for(
            OsFamily::RedHat,
            &[("service_ensure", "stopped".into()), ("service_enable", false.into())],
        );
        let service = plan.steps.last().unwrap();
        assert_eq!(
            service,
            &Step::Service {
                name: "datadog-agent".into(),
                ensure: ServiceEnsure::Stopped,
                enable: false,
            }
        );
    }

    #[test]
    fn test_run_reports_steps() {
        let plan = plan_for(
            OsFamily::RedHat,
            &[("puppet_run_reports", true.into()), ("api_key", "abc123".into())],
        );
        let packages: Vec<&str> = plan.packages().collect();
        assert!(packages.contains(&"ruby-devel"));
        assert!(plan.steps.contains(&Step::Gem {
            name: "dogapi".into(),
            provider: "gem".into(),
        }));
        assert!(plan.steps.iter().any(|s| matches!(
            s,
            Step::File { path, content, .. }
                if path == "/etc/dd-agent/datadog.yaml"
                    && content == "---\n:datadog_api_key: 'abc123'\n"
        )));
    }

    #[test]
    fn test_run_reports_disabled_by_default() {
        let plan = plan_for(OsFamily::Debian, &[]);
        assert!(!plan.steps.iter().any(|s| matches!(s, Step::Gem { .. })));
    }

    #[test]
    fn test_plan_serializes_with_kind_tags() {
        let plan = plan_for(OsFamily::Debian, &[]);
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["family"], "Debian");
        assert_eq!(json["steps"][0]["kind"], "repository");
        assert_eq!(json["steps"][0]["provider"], "apt");
        assert_eq!(json["steps"][2]["ensure"], "latest");
    }
}
