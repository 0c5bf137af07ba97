use std::env;
use std::process::Command;

// Stamp the build so the selfplay banner and the web page footer can show
// which engine produced a game. SOURCE_DATE_EPOCH pins the stamp for
// reproducible builds; without it the local clock is used.
fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    let stamp = match env::var("SOURCE_DATE_EPOCH") {
        Ok(epoch) => format_date(&["-u", "-d", &format!("@{}", epoch.trim())]),
        Err(_) => format_date(&[]),
    };
    println!(
        "cargo:rustc-env=BUILD_TIMESTAMP={}",
        stamp.unwrap_or_else(|| "unknown".to_string())
    );
}

fn format_date(extra: &[&str]) -> Option<String> {
    let output = Command::new("date")
        .args(extra)
        .arg("+%Y-%m-%d %H:%M")
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let stamp = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!stamp.is_empty()).then_some(stamp)
}
