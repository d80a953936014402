use std::env;
use std::fs;
use std::path::Path;

/// Version string of `name` in a `[workspace.dependencies]` line, either
/// `name = "x.y"` or `name = { version = "x.y", ... }`
fn dependency_version<'a>(cargo_toml: &'a str, name: &str) -> &'a str {
    let prefix = format!("{} = ", name);
    for line in cargo_toml.lines() {
        let Some(spec) = line.strip_prefix(&prefix) else {
            continue;
        };
        if spec.starts_with('"') {
            return spec.split('"').nth(1).unwrap_or("unknown");
        }
        if let Some(version_part) = spec.split("version = ").nth(1) {
            return version_part.split('"').nth(1).unwrap_or("unknown");
        }
    }
    "unknown"
}

fn main() {
    // Read Cargo.toml to extract dependency versions
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let cargo_toml_path = Path::new(&manifest_dir).join("Cargo.toml");
    println!("cargo:rerun-if-changed={}", cargo_toml_path.display());
    let cargo_toml = fs::read_to_string(cargo_toml_path).unwrap();

    // These will be available as env!() variables at compile time
    println!("cargo:rustc-env=EGUI_VERSION={}", dependency_version(&cargo_toml, "egui"));
    println!("cargo:rustc-env=BEVY_ECS_VERSION={}", dependency_version(&cargo_toml, "bevy_ecs"));
    println!("cargo:rustc-env=NALGEBRA_VERSION={}", dependency_version(&cargo_toml, "nalgebra"));
}
