use env_overlay as envo;

fn main() -> Result<(), env_overlay::Error> {
    // Merge ./.env if one exists; a missing file is fine.
    if let Err(err) = envo::load_default() {
        if !err.is_missing_file() {
            return Err(err.into());
        }
    }

    println!("PORT = {}", envo::var_or("PORT", "3000"));

    // Local override: visible through the overlay, invisible to the OS.
    envo::set("FEATURE_FLAG", "on");
    println!(
        "FEATURE_FLAG = {} (OS sees {:?})",
        envo::var_or("FEATURE_FLAG", "off"),
        std::env::var("FEATURE_FLAG").ok(),
    );

    // Scoped substitution: everything inside runs against a private copy.
    envo::temp(|| {
        envo::set("PORT", "9999");
        println!("inside temp, PORT = {}", envo::var_or("PORT", "3000"));
    });
    println!("after temp, PORT = {}", envo::var_or("PORT", "3000"));

    println!("cargo lives under {}", envo::cargo_home());
    println!("this program belongs to `{}`", envo::current_package()?);

    Ok(())
}
