use super::*;

#[cfg(unix)]
fn write_script(dir: &Path, name: &str, mode: u32) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
    path
}

#[test]
fn empty_name_is_not_found() {
    assert_eq!(locate_executable(""), None);
    assert_eq!(locate_executable("   "), None);
}

#[cfg(unix)]
#[test]
fn explicit_paths_are_checked_directly() {
    let dir = tempfile::tempdir().unwrap();
    let exec = write_script(dir.path(), "tool", 0o755);
    let plain = write_script(dir.path(), "notes", 0o644);

    assert_eq!(locate_executable(exec.to_str().unwrap()), Some(exec.clone()));
    assert_eq!(locate_executable(plain.to_str().unwrap()), None);
    assert_eq!(locate_executable(dir.path().to_str().unwrap()), None);
    assert_eq!(
        locate_executable(dir.path().join("missing").to_str().unwrap()),
        None
    );
}

#[cfg(unix)]
#[test]
fn directory_lookup_requires_exec_bit() {
    let dir = tempfile::tempdir().unwrap();
    let exec = write_script(dir.path(), "tool", 0o700);
    write_script(dir.path(), "notes", 0o600);

    assert_eq!(executable_in_dir(dir.path(), "tool"), Some(exec));
    assert_eq!(executable_in_dir(dir.path(), "notes"), None);
    assert_eq!(executable_in_dir(dir.path(), "absent"), None);
}

#[cfg(unix)]
#[test]
fn shell_is_found_on_path() {
    assert!(locate_executable("sh").is_some());
    assert_eq!(locate_executable("definitely-not-a-real-program-4821"), None);
}
