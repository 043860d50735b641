use std::io::Write;

use tempfile::NamedTempFile;

#[test]
fn test_init_from_yaml_file() {
    assert!(common_log::init_with_yaml("missing-logging.yaml").is_err());

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "console:\n  level: debug\nloggers: []").unwrap();

    common_log::init_with_yaml(file.path()).unwrap();
    common_log::debug!("yaml logger initialized");

    assert!(common_log::init_with_yaml(file.path()).is_err());
}
