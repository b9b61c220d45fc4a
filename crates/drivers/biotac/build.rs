use std::env;

fn main() {
    // only the real driver links against the vendor SDK
    if env::var_os("CARGO_FEATURE_HARDWARE").is_none() {
        return;
    }

    println!("cargo:rerun-if-env-changed=BIOTAC_SDK_DIR");
    if let Some(dir) = env::var_os("BIOTAC_SDK_DIR") {
        let dir = dir.to_string_lossy();
        println!("cargo:rustc-link-search=native={}/lib", dir);
    }
}
