use poolwatch::core::locate::LocateProvider;
use poolwatch::platform::locate::SysfsLocator;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn bay(root: &Path, enclosure: &str, slot: &str, device: &str) {
    let dir = root.join(enclosure).join(slot);
    fs::create_dir_all(dir.join("device").join("block").join(device)).unwrap();
    fs::write(dir.join("locate"), "0\n").unwrap();
}

#[test]
fn test_toggle_across_enclosures() {
    let temp_dir = TempDir::new().unwrap();
    bay(temp_dir.path(), "0:0:0:0", "Slot01", "sda");
    bay(temp_dir.path(), "1:0:0:0", "Slot07", "sdq");

    let locator = SysfsLocator::new(temp_dir.path());
    assert!(!locator.query("sdq").unwrap());

    locator.set("sdq", true).unwrap();
    assert!(locator.query("sdq").unwrap());
    assert!(!locator.query("sda").unwrap());
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("1:0:0:0/Slot07/locate")).unwrap(),
        "1"
    );

    locator.set("sdq", false).unwrap();
    assert!(!locator.query("sdq").unwrap());
}

#[test]
fn test_unknown_device_and_missing_root() {
    let temp_dir = TempDir::new().unwrap();
    bay(temp_dir.path(), "0:0:0:0", "Slot01", "sda");

    let locator = SysfsLocator::new(temp_dir.path());
    assert!(locator.query("sdz").is_err());
    assert!(locator.set("sdz", true).is_err());

    let missing = SysfsLocator::new(temp_dir.path().join("nope"));
    assert!(missing.query("sda").is_err());
}
