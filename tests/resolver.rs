// tests/resolver.rs

use std::env;
use std::error::Error;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use aidy_bridge::bridge::resolve_executable;
use aidy_bridge::errors::BridgeError;
use aidy_bridge::fs::mock::MockFileSystem;

type TestResult = Result<(), Box<dyn Error>>;

fn exe(name: &str) -> String {
    format!("{name}{}", env::consts::EXE_SUFFIX)
}

fn root() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(r"C:\")
    } else {
        PathBuf::from("/")
    }
}

fn path_var(dirs: &[&PathBuf]) -> Result<OsString, Box<dyn Error>> {
    Ok(env::join_paths(dirs)?)
}

#[test]
fn blank_identifier_fails() {
    let fs = MockFileSystem::new();
    let cwd = root().join("work");

    for ident in ["", "   "] {
        let err = resolve_executable(&fs, ident, &cwd, None).unwrap_err();
        assert!(matches!(err, BridgeError::ExecutableNotFound(_)));
    }
}

#[test]
fn missing_absolute_path_fails() {
    let fs = MockFileSystem::new();
    let cwd = root().join("work");
    let missing = root().join("opt").join("python").join(exe("python"));

    let err = resolve_executable(&fs, &missing.to_string_lossy(), &cwd, None).unwrap_err();
    assert!(matches!(err, BridgeError::ExecutableNotFound(_)));
}

#[test]
fn existing_absolute_path_is_returned_as_is() -> TestResult {
    let fs = MockFileSystem::new();
    let python = root().join("opt").join("python").join(exe("python"));
    fs.add_file(&python, "bin");

    let resolved = resolve_executable(&fs, &python.to_string_lossy(), &root(), None)?;
    assert_eq!(resolved, python);
    Ok(())
}

#[test]
fn absolute_path_is_not_searched_on_path() -> TestResult {
    let fs = MockFileSystem::new();
    let bin = root().join("usr").join("bin");
    fs.add_file(bin.join(exe("python")), "bin");
    let missing = root().join("nowhere").join(exe("python"));

    let var = path_var(&[&bin])?;
    let result = resolve_executable(&fs, &missing.to_string_lossy(), &root(), Some(&var));
    assert!(result.is_err());
    Ok(())
}

#[test]
fn relative_path_resolves_against_cwd_first() -> TestResult {
    let fs = MockFileSystem::new();
    let cwd = root().join("app");
    let local = cwd.join("venv").join(exe("python"));
    fs.add_file(&local, "bin");
    let bin = root().join("usr").join("bin");
    fs.add_file(bin.join("venv").join(exe("python")), "bin");

    let relative = Path::new("venv").join(exe("python"));
    let var = path_var(&[&bin])?;
    let resolved = resolve_executable(&fs, &relative.to_string_lossy(), &cwd, Some(&var))?;
    assert_eq!(resolved, local);
    Ok(())
}

#[test]
fn bare_name_is_found_in_the_one_path_dir_that_has_it() -> TestResult {
    let fs = MockFileSystem::new();
    let empty = root().join("empty");
    fs.add_dir(&empty);
    let bin = root().join("usr").join("bin");
    fs.add_file(bin.join(exe("python")), "bin");

    let var = path_var(&[&empty, &bin])?;
    let resolved = resolve_executable(&fs, "python", &root().join("work"), Some(&var))?;
    assert_eq!(resolved, bin.join(exe("python")));
    Ok(())
}

#[test]
fn first_path_dir_wins() -> TestResult {
    let fs = MockFileSystem::new();
    let first = root().join("first");
    let second = root().join("second");
    fs.add_file(first.join(exe("python")), "1");
    fs.add_file(second.join(exe("python")), "2");

    let var = path_var(&[&first, &second])?;
    let resolved = resolve_executable(&fs, "python", &root().join("work"), Some(&var))?;
    assert_eq!(resolved, first.join(exe("python")));
    Ok(())
}

#[test]
fn identifier_is_trimmed() -> TestResult {
    let fs = MockFileSystem::new();
    let bin = root().join("bin");
    fs.add_file(bin.join(exe("python")), "bin");

    let var = path_var(&[&bin])?;
    let resolved = resolve_executable(&fs, "  python \n", &root().join("work"), Some(&var))?;
    assert_eq!(resolved, bin.join(exe("python")));
    Ok(())
}

#[test]
fn exhausted_search_fails() -> TestResult {
    let fs = MockFileSystem::new();
    let bin = root().join("bin");
    fs.add_dir(&bin);

    let var = path_var(&[&bin])?;
    let err = resolve_executable(&fs, "python", &root().join("work"), Some(&var)).unwrap_err();
    assert!(matches!(err, BridgeError::ExecutableNotFound(_)));

    let err = resolve_executable(&fs, "python", &root().join("work"), None).unwrap_err();
    assert!(matches!(err, BridgeError::ExecutableNotFound(_)));
    Ok(())
}

