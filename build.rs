use std::process::Command;

fn main() {
    // Short commit hash when building from a checkout, package version otherwise
    let hash = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| {
            format!("v{}", std::env::var("CARGO_PKG_VERSION").unwrap_or_default())
        });

    println!("cargo:rustc-env=BUILD_HASH={}", hash);
    println!("cargo:rerun-if-changed=.git/HEAD");
}
