//! Smoke tests driving the compiled `meshbridge` binary.
#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::process::Command;

use meshbridge_geometry::{Shape, TriangleMesh, mesh::unit_cube};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_meshbridge")
}

/// Lay out a working directory with a stub tool and a scripts dir.
fn workspace() -> (tempfile::TempDir, PathBuf) {
    use std::os::unix::fs::PermissionsExt;

    let temp = tempfile::tempdir().expect("tempdir");

    let stub = temp.path().join("fake-blender");
    let body = "#!/bin/sh\nwhile [ \"$1\" != \"--\" ]; do shift; done\nshift\ncp \"$1\" \"$2\"\n";
    std::fs::write(&stub, body).expect("write stub");
    std::fs::set_permissions(&stub, std::fs::Permissions::from_mode(0o755)).expect("chmod");

    let scripts = temp.path().join("scripts");
    std::fs::create_dir_all(&scripts).expect("scripts dir");
    std::fs::write(scripts.join("solidify.py"), "# transform stub\n").expect("write script");

    (temp, stub)
}

fn run_in(dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new(bin())
        .args(args)
        .current_dir(dir)
        .output()
        .expect("run meshbridge")
}

#[test]
fn solidify_end_to_end_writes_a_closed_solid() {
    let (temp, stub) = workspace();

    let input = temp.path().join("part.stl");
    unit_cube().write_stl(&input).expect("write input");
    let output = temp.path().join("solid.stl");

    let result = run_in(
        temp.path(),
        &[
            "solidify",
            input.to_str().expect("utf8"),
            "-o",
            output.to_str().expect("utf8"),
            "--thickness",
            "1.5",
            "--blender",
            stub.to_str().expect("utf8"),
        ],
    );

    assert!(
        result.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&result.stderr)
    );
    let mesh = TriangleMesh::read_stl(&output).expect("read output");
    let shape = Shape::from_mesh(&mesh, 0.1, true).expect("shape");
    assert!(shape.is_solid());
}

#[test]
fn solidify_reports_missing_tool() {
    let (temp, _stub) = workspace();

    let input = temp.path().join("part.stl");
    unit_cube().write_stl(&input).expect("write input");

    let result = run_in(
        temp.path(),
        &[
            "solidify",
            input.to_str().expect("utf8"),
            "-o",
            "out.stl",
            "--blender",
            "/nonexistent/fake-blender",
        ],
    );

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("not found"), "stderr: {stderr}");
}

#[test]
fn doctor_passes_with_stub_tool() {
    let (temp, stub) = workspace();

    let result = run_in(
        temp.path(),
        &["doctor", "--blender", stub.to_str().expect("utf8")],
    );

    assert!(result.status.success());
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("all checks passed"), "stdout: {stdout}");
}

#[test]
fn doctor_flags_missing_tool_and_script() {
    let temp = tempfile::tempdir().expect("tempdir");

    let result = run_in(
        temp.path(),
        &["doctor", "--blender", "/nonexistent/fake-blender"],
    );

    assert!(!result.status.success());
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("NOT FOUND"), "stdout: {stdout}");
    assert!(stdout.contains("MISSING"), "stdout: {stdout}");
}
