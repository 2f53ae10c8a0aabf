//! Deployment artifact rendering.
//!
//! The `policyfile` and `unitfile` subcommands print static documents
//! parameterized by the endpoint naming and GPIO selection. Nothing here
//! is consumed by the daemon itself; the documents are installed by
//! deployment tooling.

use std::path::Path;

use blinkd_config::AppConfig;

/// Program name used in artifact headers and install paths.
pub const PROGNAME: &str = "blinkd";

/// Render the access-policy document for the control endpoint.
///
/// Default deny; the daemon may own the service name, and any local
/// caller may send to it or invoke the control interface.
pub fn render_policyfile(service_name: &str, interface_name: &str) -> String {
    format!(
        r#"# Access policy for the {PROGNAME} control endpoint.
# Install as /etc/{PROGNAME}/policy.toml; enforced by deployment tooling.

[policy]
default_effect = "deny"

[[policy.rules]]
role = "root"
action = "own"
resource = "{service_name}"
effect = "allow"

[[policy.rules]]
role = "*"
action = "send"
resource = "{service_name}"
effect = "allow"

[[policy.rules]]
role = "*"
action = "call"
resource = "{interface_name}"
effect = "allow"
"#
    )
}

/// Render the systemd service unit for the daemon.
///
/// Flags whose value matches the built-in default are elided from
/// `ExecStart`, so a default deployment gets the bare `service` command.
pub fn render_unitfile(exe: &Path, config: &AppConfig) -> String {
    let defaults = AppConfig::default();

    let mut naming_opts = String::new();
    if config.endpoint.service_name != defaults.endpoint.service_name {
        naming_opts.push_str(&format!(
            " --service-name={}",
            config.endpoint.service_name
        ));
    }

    let mut service_opts = String::new();
    if config.gpio.chip != defaults.gpio.chip {
        service_opts.push_str(&format!(" --chip={}", config.gpio.chip));
    }
    if config.gpio.line != defaults.gpio.line {
        service_opts.push_str(&format!(" --line={}", config.gpio.line));
    }

    format!(
        r#"# Save this as /etc/systemd/system/{PROGNAME}.service
[Unit]
Description=LED indicator service
DefaultDependencies=no
Before=network-pre.target

[Service]
Type=exec
ExecStart={exe}{naming_opts} service{service_opts}

[Install]
WantedBy=sysinit.target
"#,
        exe = exe.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn exe() -> PathBuf {
        PathBuf::from("/usr/bin/blinkd")
    }

    #[test]
    fn test_policyfile_names_service_and_interface() {
        let doc = render_policyfile("org.blinkd.Indicator", "org.blinkd.Indicator");
        assert!(doc.contains(r#"resource = "org.blinkd.Indicator""#));
        assert!(doc.contains(r#"default_effect = "deny""#));
    }

    #[test]
    fn test_policyfile_carries_overridden_names() {
        let doc = render_policyfile("com.example.Led", "com.example.LedIface");
        assert!(doc.contains(r#"resource = "com.example.Led""#));
        assert!(doc.contains(r#"resource = "com.example.LedIface""#));
        assert!(!doc.contains("org.blinkd"));
    }

    #[test]
    fn test_unitfile_defaults_elide_flags() {
        let doc = render_unitfile(&exe(), &AppConfig::default());
        assert!(doc.contains("ExecStart=/usr/bin/blinkd service\n"));
        assert!(doc.contains("WantedBy=sysinit.target"));
        assert!(!doc.contains("--chip"));
        assert!(!doc.contains("--line"));
        assert!(!doc.contains("--service-name"));
    }

    #[test]
    fn test_unitfile_includes_overridden_flags() {
        let mut config = AppConfig::default();
        config.gpio.chip = "gpiochip2".to_string();
        config.gpio.line = 27;
        config.endpoint.service_name = "com.example.Led".to_string();

        let doc = render_unitfile(&exe(), &config);
        assert!(doc.contains(
            "ExecStart=/usr/bin/blinkd --service-name=com.example.Led service --chip=gpiochip2 --line=27"
        ));
    }
}
