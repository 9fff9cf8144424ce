/// Values baked into the firmware with `env!`. Read from `.env` when present,
/// otherwise from the build environment.
const BAKED_VARS: [&str; 3] = ["WIFI_SSID", "WIFI_PASSWORD", "UPLINK_ENDPOINT"];

fn main() {
    println!("cargo:rerun-if-changed=.env");
    if let Err(e) = dotenvy::dotenv() {
        println!("cargo:warning=no .env loaded ({e}); using build environment");
    }

    for key in BAKED_VARS {
        println!("cargo:rerun-if-env-changed={key}");
        let value = std::env::var(key).unwrap_or_default();
        if value.is_empty() && key != "UPLINK_ENDPOINT" {
            println!("cargo:warning={key} is not set");
        }
        println!("cargo:rustc-env={key}={value}");
    }

    println!("cargo:rustc-link-arg=-Tlinkall.x");
}
