// Build provenance for `flbout version --extended`.
fn main() {
    for (var, exported) in [
        ("TARGET", "FLBOUT_BUILD_TARGET"),
        ("PROFILE", "FLBOUT_BUILD_PROFILE"),
    ] {
        println!("cargo:rerun-if-env-changed={var}");
        if let Ok(value) = std::env::var(var) {
            println!("cargo:rustc-env={exported}={value}");
        }
    }
}
