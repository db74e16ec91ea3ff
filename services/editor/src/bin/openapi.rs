//! services/editor/src/bin/openapi.rs
//!
//! Writes the editor API's OpenAPI document. The output path is the first
//! argument and defaults to `openapi.json`.

use editor_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

fn write_document(
    api_doc: utoipa::openapi::OpenApi,
    path: &str,
) -> Result<usize, Box<dyn std::error::Error>> {
    let routes = api_doc.paths.paths.len();
    if routes == 0 {
        return Err("the API document lists no routes".into());
    }
    std::fs::write(path, api_doc.to_pretty_json()?)?;
    Ok(routes)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
    let routes = write_document(ApiDoc::openapi(), &output)?;
    println!("Wrote {} routes to {}", routes, output);
    Ok(())
}
