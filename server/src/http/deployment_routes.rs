use std::io::Cursor;

use rocket::http::{ContentType, Status};
use rocket::response::{self, status::Custom, Responder};
use rocket::serde::{json::Json, Deserialize, Serialize};
use rocket::{Request, Response, State};
use skiff_deployment::{build_package, Bundle, DeployConfig, DeployRequest, DeploymentManager, Platform};

use crate::message::AsyncLogStream;

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct DeployBody {
    html: String,
    project_name: String,
    platform: Platform,
    #[serde(default)]
    framework: Option<String>,
    #[serde(default)]
    token: Option<String>,
}

impl From<DeployBody> for DeployRequest {
    fn from(body: DeployBody) -> Self {
        let config = DeployConfig {
            platform: body.platform,
            project_name: body.project_name,
            framework: body.framework,
        };
        DeployRequest {
            config,
            artifact: body.html,
            token: body.token,
        }
    }
}

#[post("/deploy", format = "json", data = "<body>")]
pub fn deploy(body: Json<DeployBody>, deployment_service: &State<DeploymentManager>) -> AsyncLogStream {
    let request = DeployRequest::from(body.into_inner());
    info!(
        "Deployment of {:?} to {} requested",
        request.config.project_name, request.config.platform
    );
    AsyncLogStream::from_attempt(deployment_service.deploy(request))
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct PackageBody {
    html: String,
    project_name: String,
    platform: Platform,
}

pub struct BundleDownload(Bundle);

impl<'r> Responder<'r, 'static> for BundleDownload {
    fn respond_to(self, _request: &'r Request<'_>) -> response::Result<'static> {
        let Bundle { file_name, bytes } = self.0;
        Response::build()
            .header(ContentType::ZIP)
            .raw_header(
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", file_name),
            )
            .sized_body(bytes.len(), Cursor::new(bytes))
            .ok()
    }
}

#[post("/package", format = "json", data = "<body>")]
pub fn package(body: Json<PackageBody>) -> Result<BundleDownload, Custom<String>> {
    let config = DeployConfig::new(body.platform, body.project_name.as_str());
    build_package(&body.html, &config)
        .map(BundleDownload)
        .map_err(|e| {
            Custom(
                Status::InternalServerError,
                format!("Failed to build package: {}", e),
            )
        })
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct PlatformInfo {
    id: Platform,
    name: &'static str,
    has_token: bool,
}

#[get("/platforms")]
pub fn platforms(deployment_service: &State<DeploymentManager>) -> Json<Vec<PlatformInfo>> {
    let credentials = deployment_service.credentials();
    Json(
        deployment_service
            .platforms()
            .into_iter()
            .map(|platform| PlatformInfo {
                id: platform,
                name: platform.display_name(),
                has_token: credentials.has_token(platform),
            })
            .collect(),
    )
}
