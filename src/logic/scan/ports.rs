//! Port Collector
//!
//! Enumerates open ports and active connections by parsing `ss` output on
//! Linux, `lsof` on macOS and `netstat` on Windows, then classifies each
//! local port against the static port tables.

use crate::logic::error::{EngineError, EngineResult};
use crate::logic::records::{Category, PortRecord};
use crate::logic::risk;

/// Scan all open ports and active connections
pub fn collect() -> EngineResult<Vec<PortRecord>> {
    let records = enumerate_sockets()?;
    log::debug!("Collected {} ports/connections", records.len());
    Ok(records)
}

#[cfg(target_os = "linux")]
fn enumerate_sockets() -> EngineResult<Vec<PortRecord>> {
    let output = std::process::Command::new("ss")
        .args(["-tunap"])
        .output()
        .map_err(|e| EngineError::collection(Category::Ports, e.to_string()))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout.lines().skip(1).filter_map(parse_ss_line).collect())
}

#[cfg(target_os = "macos")]
fn enumerate_sockets() -> EngineResult<Vec<PortRecord>> {
    let output = std::process::Command::new("lsof")
        .args(["-i", "-n", "-P"])
        .output()
        .map_err(|e| EngineError::collection(Category::Ports, e.to_string()))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout.lines().skip(1).filter_map(parse_lsof_line).collect())
}

#[cfg(target_os = "windows")]
fn enumerate_sockets() -> EngineResult<Vec<PortRecord>> {
    let output = std::process::Command::new("netstat")
        .args(["-ano"])
        .output()
        .map_err(|e| EngineError::collection(Category::Ports, e.to_string()))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout.lines().filter_map(parse_netstat_line).collect())
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn enumerate_sockets() -> EngineResult<Vec<PortRecord>> {
    Err(EngineError::collection(
        Category::Ports,
        "socket enumeration is not supported on this platform",
    ))
}

// ============================================================================
// LINE PARSERS
// ============================================================================

/// Parse an `ss -tunap` output line:
/// `tcp LISTEN 0 128 0.0.0.0:22 0.0.0.0:* users:(("sshd",pid=801,fd=3))`
fn parse_ss_line(line: &str) -> Option<PortRecord> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 6 {
        return None;
    }

    let protocol = parts[0].to_string();
    let status = normalize_state(parts[1]);
    let (local_address, local_port) = split_addr_port(parts[4])?;
    let remote = split_addr_port(parts[5]);

    let (process_name, pid) = parts
        .get(6)
        .map(|s| parse_ss_process(s))
        .unwrap_or((None, None));

    Some(build_record(
        local_address,
        local_port,
        remote,
        status,
        protocol,
        process_name,
        pid,
    ))
}

/// Extract process name and pid from an ss users column:
/// `users:(("sshd",pid=801,fd=3))`
fn parse_ss_process(field: &str) -> (Option<String>, Option<u32>) {
    let name = field
        .split("((\"")
        .nth(1)
        .and_then(|s| s.split('"').next())
        .map(|s| s.to_string());

    let pid = field
        .split("pid=")
        .nth(1)
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.parse().ok());

    (name, pid)
}

/// Parse an `lsof -i -n -P` output line (macOS)
#[cfg(target_os = "macos")]
fn parse_lsof_line(line: &str) -> Option<PortRecord> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 9 {
        return None;
    }

    let process_name = Some(parts[0].to_string());
    let pid: Option<u32> = parts[1].parse().ok();

    let protocol = if parts[7].contains("TCP") {
        "tcp"
    } else if parts[7].contains("UDP") {
        "udp"
    } else {
        return None;
    }
    .to_string();

    let name_field = parts.last()?;
    let status = if line.contains("(LISTEN)") {
        "LISTEN"
    } else if line.contains("(ESTABLISHED)") {
        "ESTABLISHED"
    } else {
        "NONE"
    }
    .to_string();

    if let Some((local, remote)) = name_field.split_once("->") {
        let (local_address, local_port) = split_addr_port(local)?;
        let remote = split_addr_port(remote);
        Some(build_record(
            local_address,
            local_port,
            remote,
            status,
            protocol,
            process_name,
            pid,
        ))
    } else {
        let (local_address, local_port) = split_addr_port(name_field)?;
        Some(build_record(
            local_address,
            local_port,
            None,
            status,
            protocol,
            process_name,
            pid,
        ))
    }
}

/// Parse a `netstat -ano` output line (Windows)
#[cfg(target_os = "windows")]
fn parse_netstat_line(line: &str) -> Option<PortRecord> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 4 {
        return None;
    }

    let protocol = match parts[0] {
        "TCP" => "tcp".to_string(),
        "UDP" => "udp".to_string(),
        _ => return None,
    };

    let (local_address, local_port) = split_addr_port(parts[1])?;
    let remote = split_addr_port(parts[2]);

    // UDP rows have no state column; the pid is always last
    let status = if protocol == "tcp" {
        normalize_state(parts[3])
    } else {
        "NONE".to_string()
    };
    let pid: Option<u32> = parts.last().and_then(|s| s.parse().ok());

    Some(build_record(
        local_address,
        local_port,
        remote,
        status,
        protocol,
        None,
        pid,
    ))
}

// ============================================================================
// HELPERS
// ============================================================================

fn build_record(
    local_address: String,
    local_port: u16,
    remote: Option<(String, u16)>,
    status: String,
    protocol: String,
    process_name: Option<String>,
    pid: Option<u32>,
) -> PortRecord {
    let risk_level = risk::classify_port(local_port);
    let (remote_address, remote_port) = match remote {
        Some((addr, port)) => (Some(addr), Some(port)),
        None => (None, None),
    };

    PortRecord {
        local_address,
        local_port,
        remote_address,
        remote_port,
        status,
        protocol,
        process_name,
        pid,
        risk_level,
    }
}

/// Split `addr:port` into its parts, tolerating `[::1]:80` and `*:22`.
/// Returns `None` for wildcard or unparsable ports (`*:*`).
fn split_addr_port(s: &str) -> Option<(String, u16)> {
    let pos = s.rfind(':')?;
    let addr = s[..pos].trim_matches(['[', ']']).to_string();
    let port: u16 = s[pos + 1..].parse().ok()?;
    Some((addr, port))
}

/// Map `ss`/`netstat` state spellings onto the canonical record states
fn normalize_state(state: &str) -> String {
    match state {
        "ESTAB" => "ESTABLISHED".to_string(),
        "UNCONN" => "NONE".to_string(),
        "LISTENING" => "LISTEN".to_string(),
        other => other.replace('-', "_"),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::records::RiskLevel;

    #[test]
    fn test_parse_ss_listen_line() {
        let line = r#"tcp   LISTEN 0      128    0.0.0.0:22   0.0.0.0:*    users:(("sshd",pid=801,fd=3))"#;
        let record = parse_ss_line(line).expect("line should parse");

        assert_eq!(record.protocol, "tcp");
        assert_eq!(record.status, "LISTEN");
        assert_eq!(record.local_address, "0.0.0.0");
        assert_eq!(record.local_port, 22);
        assert_eq!(record.remote_address, None);
        assert_eq!(record.process_name.as_deref(), Some("sshd"));
        assert_eq!(record.pid, Some(801));
        assert_eq!(record.risk_level, RiskLevel::Safe);
    }

    #[test]
    fn test_parse_ss_established_line() {
        let line = "tcp   ESTAB  0      0      192.168.1.5:43210  93.184.216.34:443";
        let record = parse_ss_line(line).expect("line should parse");

        assert_eq!(record.status, "ESTABLISHED");
        assert_eq!(record.remote_address.as_deref(), Some("93.184.216.34"));
        assert_eq!(record.remote_port, Some(443));
        assert_eq!(record.process_name, None);
    }

    #[test]
    fn test_parse_ss_classifies_malware_port() {
        let line = "tcp   LISTEN 0      5      0.0.0.0:4444 0.0.0.0:*";
        let record = parse_ss_line(line).expect("line should parse");
        assert_eq!(record.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_split_addr_port_ipv6() {
        assert_eq!(split_addr_port("[::1]:8080"), Some(("::1".to_string(), 8080)));
        assert_eq!(split_addr_port("0.0.0.0:*"), None);
    }

    #[test]
    fn test_normalize_state() {
        assert_eq!(normalize_state("ESTAB"), "ESTABLISHED");
        assert_eq!(normalize_state("TIME-WAIT"), "TIME_WAIT");
        assert_eq!(normalize_state("LISTEN"), "LISTEN");
    }
}
