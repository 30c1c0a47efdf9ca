use std::process::Command;

/// Run a git command and return trimmed stdout if it succeeded.
fn git(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
}

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");
    println!("cargo:rerun-if-changed=.git/refs/tags/");

    let hash = git(&["rev-parse", "--short", "HEAD"]).unwrap_or_else(|| "unknown".to_string());
    let on_tag = git(&["describe", "--exact-match", "--tags", "HEAD"]).is_some();
    let dirty = git(&["status", "--porcelain"]).is_some_and(|out| !out.is_empty());

    let hash = if dirty { format!("{hash}-dirty") } else { hash };

    println!("cargo:rustc-env=FORGE_GIT_HASH={hash}");
    println!("cargo:rustc-env=FORGE_IS_RELEASE={on_tag}");
}
