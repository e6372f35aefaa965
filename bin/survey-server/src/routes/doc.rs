use crate::routes::{analyze, health};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "survey-server",
    description = "Survey analysis relay API",
    version = "0.1.0",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(analyze::AnalyzeApi::openapi());
    root
}
