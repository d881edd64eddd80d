use chrono::Utc;

/// Stamps `BUILD_TIME` for the health endpoint.
fn main() {
    let stamp = Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    println!("cargo:rustc-env=BUILD_TIME={}", stamp);
    println!("cargo:rerun-if-changed=build.rs");
}
