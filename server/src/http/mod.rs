pub mod deployment_routes;
