use rocket::{
    figment::{
        providers::{Env, Format, Toml},
        Figment,
    },
    Config,
};

pub fn figment() -> Figment {
    let default_config_path = option_env!("SKIFF_CONFIG_DEFAULT_PATH").unwrap_or("./skiff.toml");
    let result = Figment::from(Config::default())
        .merge(Toml::file(Env::var_or("SKIFF_CONFIG", default_config_path)).nested())
        .merge(Env::prefixed("SKIFF_").split("__"));
    result.select(profile_name())
}

fn profile_name() -> String {
    if let Ok(profile) = std::env::var("SKIFF_PROFILE") {
        profile
    } else if cfg!(test) {
        "test".to_owned()
    } else if cfg!(debug_assertions) {
        "debug".to_owned()
    } else {
        "release".to_owned()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_env_config_key() {
        std::env::set_var("SKIFF_LOG_LEVEL", "normal");
        let figment = figment();
        let extracted1: String = figment.extract_inner("log_level").unwrap();

        let extracted = figment.extract::<Config>().unwrap();
        assert_eq!(extracted1, "normal");
        assert_eq!(extracted.log_level, rocket::config::LogLevel::Normal);
    }

    #[test]
    fn test_nested_env_key() {
        std::env::set_var("SKIFF_NETLIFY__API_URL", "http://localhost:9999");
        let api_url: String = figment().extract_inner("netlify.api_url").unwrap();
        assert_eq!(api_url, "http://localhost:9999");
    }
}
