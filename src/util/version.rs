pub const APP_NAME: &str = "Buyables";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_TAG: Option<&str> = option_env!("GIT_TAG");

pub fn version_label() -> String {
    if let Some(tag) = GIT_TAG {
        tag.to_string()
    } else {
        format!("v{}", APP_VERSION)
    }
}

/// Client tag sent with every upstream request, e.g. `Buyables/1.0.0`.
pub fn default_user_agent() -> String {
    let version = version_label();
    format!("{}/{}", APP_NAME, version.trim_start_matches(['v', 'V']))
}
