//! Startup Item Collector
//!
//! Enumerates autostart entries per platform: XDG autostart desktop files
//! and systemd user units on Linux, startup folders on Windows. Other
//! platforms report an empty list.

use std::fs;
use std::path::{Path, PathBuf};

use crate::logic::error::EngineResult;
use crate::logic::records::StartupRecord;
use crate::logic::risk;

/// Scan autostart entries for the current platform
pub fn collect() -> EngineResult<Vec<StartupRecord>> {
    let records = platform_collect();
    log::debug!("Collected {} startup items", records.len());
    Ok(records)
}

// ============================================================================
// LINUX
// ============================================================================

#[cfg(target_os = "linux")]
fn platform_collect() -> Vec<StartupRecord> {
    let mut items = scan_xdg_autostart();
    items.extend(scan_systemd_units());
    items
}

#[cfg(target_os = "linux")]
fn scan_xdg_autostart() -> Vec<StartupRecord> {
    let mut dirs_to_scan = vec![
        PathBuf::from("/etc/xdg/autostart"),
        PathBuf::from("/usr/share/autostart"),
    ];
    if let Some(config) = dirs::config_dir() {
        dirs_to_scan.insert(0, config.join("autostart"));
    }

    let mut items = Vec::new();

    for dir in dirs_to_scan {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().map_or(true, |e| e != "desktop") {
                continue;
            }

            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();

            let exec_line = parse_desktop_exec(&path).unwrap_or_default();
            let command = if exec_line.is_empty() {
                path.to_string_lossy().to_string()
            } else {
                exec_line
            };

            items.push(StartupRecord {
                risk_level: risk::classify_startup(&name, &command),
                name,
                path: command.clone(),
                location: dir.to_string_lossy().to_string(),
                enabled: desktop_file_enabled(&path),
                publisher: None,
            });
        }
    }

    items
}

#[cfg(target_os = "linux")]
fn scan_systemd_units() -> Vec<StartupRecord> {
    let mut dirs_to_scan = vec![
        PathBuf::from("/etc/systemd/user"),
        PathBuf::from("/usr/lib/systemd/user"),
    ];
    if let Some(config) = dirs::config_dir() {
        dirs_to_scan.insert(0, config.join("systemd").join("user"));
    }

    let mut items = Vec::new();

    for dir in dirs_to_scan {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().map_or(true, |e| e != "service") {
                continue;
            }

            let name = path
                .file_name()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let path_str = path.to_string_lossy().to_string();

            items.push(StartupRecord {
                risk_level: risk::classify_startup(&name, &path_str),
                name,
                path: path_str,
                location: dir.to_string_lossy().to_string(),
                enabled: true,
                publisher: None,
            });
        }
    }

    items
}

// ============================================================================
// WINDOWS
// ============================================================================

#[cfg(target_os = "windows")]
fn platform_collect() -> Vec<StartupRecord> {
    let mut folders = Vec::new();
    if let Ok(appdata) = std::env::var("APPDATA") {
        folders.push(PathBuf::from(appdata).join(r"Microsoft\Windows\Start Menu\Programs\Startup"));
    }
    if let Ok(profile) = std::env::var("ALLUSERSPROFILE") {
        folders.push(PathBuf::from(profile).join(r"Microsoft\Windows\Start Menu\Programs\Startup"));
    }

    let mut items = Vec::new();

    for folder in folders {
        let entries = match fs::read_dir(&folder) {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let name = path
                .file_name()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let path_str = path.to_string_lossy().to_string();

            let publisher = risk::resolve_publisher(&path_str).map(|p| p.to_string());
            let mut risk_level = risk::classify_startup(&name, &path_str);
            // Unsigned/unknown publisher on Windows is worth a second look
            if risk_level == crate::logic::records::RiskLevel::Safe && publisher.is_none() {
                risk_level = crate::logic::records::RiskLevel::Low;
            }

            items.push(StartupRecord {
                name,
                path: path_str,
                location: folder.to_string_lossy().to_string(),
                enabled: true,
                publisher,
                risk_level,
            });
        }
    }

    items
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
fn platform_collect() -> Vec<StartupRecord> {
    Vec::new()
}

// ============================================================================
// DESKTOP FILE PARSING
// ============================================================================

/// Extract the Exec line from a .desktop file
fn parse_desktop_exec(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    content
        .lines()
        .find_map(|line| line.strip_prefix("Exec="))
        .map(|s| s.trim().to_string())
}

/// A .desktop entry is disabled when it carries `Hidden=true`
fn desktop_file_enabled(path: &Path) -> bool {
    match fs::read_to_string(path) {
        Ok(content) => !content
            .lines()
            .any(|line| line.trim().eq_ignore_ascii_case("hidden=true")),
        Err(_) => true,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_desktop_file(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_parse_desktop_exec() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_desktop_file(
            dir.path(),
            "sync.desktop",
            "[Desktop Entry]\nName=Sync\nExec=/usr/bin/sync-agent --daemon\n",
        );

        assert_eq!(
            parse_desktop_exec(&path).as_deref(),
            Some("/usr/bin/sync-agent --daemon")
        );
    }

    #[test]
    fn test_desktop_exec_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_desktop_file(dir.path(), "broken.desktop", "[Desktop Entry]\nName=X\n");
        assert_eq!(parse_desktop_exec(&path), None);
    }

    #[test]
    fn test_hidden_desktop_file_is_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let hidden = write_desktop_file(
            dir.path(),
            "hidden.desktop",
            "[Desktop Entry]\nExec=/bin/true\nHidden=true\n",
        );
        let visible = write_desktop_file(
            dir.path(),
            "visible.desktop",
            "[Desktop Entry]\nExec=/bin/true\n",
        );

        assert!(!desktop_file_enabled(&hidden));
        assert!(desktop_file_enabled(&visible));
    }
}
