use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8(output.stdout).ok()?.trim().to_string();
    (!value.is_empty()).then_some(value)
}

fn main() {
    let commit_hash = git(&["rev-parse", "HEAD"]).unwrap_or_else(|| "unknown".to_string());

    let repo_name = git(&["rev-parse", "--show-toplevel"])
        .and_then(|top| {
            std::path::Path::new(&top)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "micros".to_string());

    let build_epoch_sec = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    println!("cargo:rustc-env=BUILD_COMMIT_HASH={}", commit_hash);
    println!("cargo:rustc-env=BUILD_REPO_NAME={}", repo_name);
    println!("cargo:rustc-env=BUILD_EPOCH_SEC={}", build_epoch_sec);
    println!("cargo:rerun-if-changed=../.git/HEAD");
}
