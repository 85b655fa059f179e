//! Embeds the build stamp printed by `c3d-anim version`.

fn main() {
    println!("cargo:rerun-if-env-changed=C3D_ANIM_BUILD_STAMP");
    let stamp = std::env::var("C3D_ANIM_BUILD_STAMP").unwrap_or_else(|_| build_stamp());
    println!("cargo:rustc-env=C3D_ANIM_BUILD_STAMP={stamp}");
}

fn build_stamp() -> String {
    let Ok(fmt) = time::format_description::parse("[year]-[month]-[day] [hour]:[minute] UTC") else {
        return "unknown".to_string();
    };
    time::OffsetDateTime::now_utc()
        .format(&fmt)
        .unwrap_or_else(|_| "unknown".to_string())
}
