use std::error::Error;

/// Stamps the binary with its build date and cargo profile for `--version`.
fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rustc-env=LIARS_BUILD_DATE={}", build_date()?);
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=LIARS_BUILD_PROFILE={profile}");
    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}

fn build_date() -> Result<String, Box<dyn Error>> {
    let format = time::macros::format_description!("[year]-[month]-[day] [hour]:[minute] UTC");
    Ok(time::OffsetDateTime::now_utc().format(format)?)
}
