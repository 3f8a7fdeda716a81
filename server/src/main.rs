#[macro_use]
extern crate rocket;

mod config;
mod http;
mod message;

use http::deployment_routes::{deploy, package, platforms};
use rocket::{figment::Figment, Build, Rocket};

#[launch]
fn rocket() -> _ {
    build(config::figment())
}

fn build(figment: Figment) -> Rocket<Build> {
    let deployment_manager = match skiff_deployment::config::manager(&figment) {
        Ok(manager) => manager,
        Err(e) => {
            error!("Failed to create deployment manager: {:?}", e);
            std::process::exit(1);
        }
    };

    rocket::custom(figment)
        .mount("/", routes![deploy, package, platforms])
        .manage(deployment_manager)
}

#[cfg(test)]
fn rocket_test(overrides: serde_json::Value) -> Rocket<Build> {
    use rocket::figment::providers::Serialized;

    std::env::set_var("SKIFF_PROFILE", "test");
    build(config::figment().merge(Serialized::globals(overrides)))
}
