//! Network interface MTU discovery
//!
//! Probes, in order: `ip -o link show`, `ifconfig`, `/sys/class/net/*/mtu`.
//! The loopback interface is never considered. Without a requested interface
//! the one with the largest MTU is selected (the first one listed on ties).

use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::OnceLock;

const LOOPBACK: &str = "lo";

/// Which probe produced the result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    IpCommand,
    IpCommandAuto,
    Ifconfig,
    IfconfigAuto,
    Sysfs,
    SysfsAuto,
    Failed,
}

impl DetectionMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            DetectionMethod::IpCommand => "ip_command",
            DetectionMethod::IpCommandAuto => "ip_command_auto",
            DetectionMethod::Ifconfig => "ifconfig",
            DetectionMethod::IfconfigAuto => "ifconfig_auto",
            DetectionMethod::Sysfs => "sysfs",
            DetectionMethod::SysfsAuto => "sysfs_auto",
            DetectionMethod::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Probe {
    Ip,
    Ifconfig,
    Sysfs,
}

impl Probe {
    fn method(self, auto: bool) -> DetectionMethod {
        match (self, auto) {
            (Probe::Ip, false) => DetectionMethod::IpCommand,
            (Probe::Ip, true) => DetectionMethod::IpCommandAuto,
            (Probe::Ifconfig, false) => DetectionMethod::Ifconfig,
            (Probe::Ifconfig, true) => DetectionMethod::IfconfigAuto,
            (Probe::Sysfs, false) => DetectionMethod::Sysfs,
            (Probe::Sysfs, true) => DetectionMethod::SysfsAuto,
        }
    }
}

/// One non-loopback interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceMtu {
    pub name: String,
    pub mtu: u32,
}

/// Outcome of MTU discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MtuDetection {
    pub selected: Option<InterfaceMtu>,
    /// Every interface seen by the last probe that ran, in listing order
    pub interfaces: Vec<InterfaceMtu>,
    pub method: DetectionMethod,
}

impl MtuDetection {
    pub fn failed(interfaces: Vec<InterfaceMtu>) -> Self {
        Self {
            selected: None,
            interfaces,
            method: DetectionMethod::Failed,
        }
    }

    pub fn mtu(&self) -> Option<u32> {
        self.selected.as_ref().map(|iface| iface.mtu)
    }

    pub fn interface(&self) -> Option<&str> {
        self.selected.as_ref().map(|iface| iface.name.as_str())
    }
}

fn ip_link_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+:\s+(\S+):.*mtu\s+(\d+)").expect("ip link pattern is valid"))
}

fn ifconfig_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\S+):").expect("ifconfig header pattern is valid"))
}

fn ifconfig_mtu() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)mtu[:\s]+(\d+)").expect("ifconfig mtu pattern is valid"))
}

/// Parse `ip -o link show` output
pub fn parse_ip_link(output: &str) -> Vec<InterfaceMtu> {
    output
        .lines()
        .filter_map(|line| {
            let caps = ip_link_line().captures(line)?;
            let mtu = caps[2].parse().ok()?;
            Some(InterfaceMtu {
                // `ip` reports VLAN and veth names as name@parent
                name: caps[1].split('@').next().unwrap_or(&caps[1]).to_string(),
                mtu,
            })
        })
        .filter(|iface| iface.name != LOOPBACK)
        .collect()
}

/// Parse `ifconfig` output (Linux and BSD layouts)
pub fn parse_ifconfig(output: &str) -> Vec<InterfaceMtu> {
    let mut interfaces: Vec<InterfaceMtu> = Vec::new();
    let mut current: Option<String> = None;

    for line in output.lines() {
        if let Some(caps) = ifconfig_header().captures(line) {
            current = Some(caps[1].to_string());
        }

        let Some(name) = current.as_deref() else {
            continue;
        };
        if name == LOOPBACK || interfaces.iter().any(|iface| iface.name == name) {
            continue;
        }
        if let Some(mtu) = ifconfig_mtu()
            .captures(line)
            .and_then(|caps| caps[1].parse().ok())
        {
            interfaces.push(InterfaceMtu {
                name: name.to_string(),
                mtu,
            });
        }
    }

    interfaces
}

/// Read `<root>/<iface>/mtu` for every interface directory under `root`
pub fn read_sysfs(root: &Path) -> Vec<InterfaceMtu> {
    let Ok(entries) = fs::read_dir(root) else {
        return Vec::new();
    };

    let mut interfaces: Vec<InterfaceMtu> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == LOOPBACK {
                return None;
            }
            let mtu = fs::read_to_string(entry.path().join("mtu"))
                .ok()?
                .trim()
                .parse()
                .ok()?;
            Some(InterfaceMtu { name, mtu })
        })
        .collect();

    // read_dir order is unspecified
    interfaces.sort_by(|a, b| a.name.cmp(&b.name));
    interfaces
}

/// Pick the requested interface, or the largest MTU when none was requested
pub fn select_interface(
    interfaces: &[InterfaceMtu],
    requested: Option<&str>,
) -> Option<InterfaceMtu> {
    match requested {
        Some(name) => interfaces.iter().find(|iface| iface.name == name).cloned(),
        None => interfaces
            .iter()
            .fold(None::<&InterfaceMtu>, |best, iface| match best {
                Some(best) if best.mtu >= iface.mtu => Some(best),
                _ => Some(iface),
            })
            .cloned(),
    }
}

fn run(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program)
        .args(args)
        .stderr(Stdio::null())
        .output()
        .map_err(|e| tracing::debug!("{} unavailable: {}", program, e))
        .ok()?;

    if !output.status.success() {
        tracing::debug!("{} exited with {}", program, output.status);
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn list_interfaces(probe: Probe, interface: Option<&str>) -> Option<Vec<InterfaceMtu>> {
    match probe {
        Probe::Ip => run("ip", &["-o", "link", "show"]).map(|out| parse_ip_link(&out)),
        Probe::Ifconfig => {
            let args: Vec<&str> = interface.into_iter().collect();
            run("ifconfig", &args).map(|out| parse_ifconfig(&out))
        }
        Probe::Sysfs => Some(read_sysfs(Path::new("/sys/class/net"))),
    }
}

/// Detect the MTU of `interface`, or of the largest-MTU interface
pub fn detect_mtu(interface: Option<&str>) -> MtuDetection {
    let mut last_seen = Vec::new();

    for probe in [Probe::Ip, Probe::Ifconfig, Probe::Sysfs] {
        let Some(interfaces) = list_interfaces(probe, interface) else {
            continue;
        };

        if let Some(selected) = select_interface(&interfaces, interface) {
            tracing::info!(
                "Selected {} (MTU {}) via {:?}",
                selected.name,
                selected.mtu,
                probe
            );
            return MtuDetection {
                selected: Some(selected),
                interfaces,
                method: probe.method(interface.is_none()),
            };
        }

        tracing::debug!("{:?} probe found no matching interface", probe);
        if !interfaces.is_empty() {
            last_seen = interfaces;
        }
    }

    MtuDetection::failed(last_seen)
}
