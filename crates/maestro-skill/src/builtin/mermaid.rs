// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mermaid diagram rendering through a remote render service.
//!
//! The diagram source is base64-encoded into the render URL. The response
//! must be a recognizable image before it is written to disk.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use maestro_config::model::MermaidConfig;
use maestro_core::{
    Conversation, MaestroError, ToolDispatcher, ToolInvocation, ToolResult, ToolSchema,
};
use tracing::{debug, info, warn};

use super::resolve_within;

const TOOL_NAME: &str = "mermaid";
const DEFAULT_OUTPUT_FILE: &str = "diagram.png";
const GENERATION_FAILED: &str =
    "Failed to generate diagram. Please check the diagram syntax and try again.";

/// Image container formats accepted from the render service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

/// Identifies an image by its leading magic bytes.
pub fn sniff_image(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some(ImageFormat::Png)
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(ImageFormat::Jpeg)
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some(ImageFormat::Gif)
    } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        Some(ImageFormat::Webp)
    } else {
        None
    }
}

/// Renders Mermaid diagrams to image files under `output_dir`.
pub struct MermaidDispatcher {
    client: reqwest::Client,
    output_dir: PathBuf,
    base_url: String,
    theme: String,
    default_width: u32,
    default_height: u32,
    timeout: Duration,
}

impl MermaidDispatcher {
    pub fn from_config(config: &MermaidConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            output_dir: PathBuf::from(&config.output_dir),
            base_url: config.base_url.clone(),
            theme: config.theme.clone(),
            default_width: config.default_width,
            default_height: config.default_height,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Builds the render URL for a diagram.
    pub fn render_url(&self, diagram: &str, width: u64, height: u64) -> String {
        let encoded = STANDARD.encode(diagram.as_bytes());
        format!(
            "{}{encoded}?width={width}&height={height}&theme={}",
            self.base_url, self.theme
        )
    }

    async fn run(&self, invocation: &ToolInvocation) -> Result<String, MaestroError> {
        let diagram = invocation
            .str_arg("diagram")
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| MaestroError::tool("No diagram content provided"))?;
        let output_file = invocation
            .str_arg("output_file")
            .unwrap_or(DEFAULT_OUTPUT_FILE);
        let width = invocation
            .u64_arg("width")
            .unwrap_or(u64::from(self.default_width));
        let height = invocation
            .u64_arg("height")
            .unwrap_or(u64::from(self.default_height));

        let output_path = resolve_within(&self.output_dir, output_file).ok_or_else(|| {
            MaestroError::tool(format!(
                "Output file {output_file} is outside the diagram directory"
            ))
        })?;

        match self.generate(diagram, &output_path, width, height).await {
            Ok(()) => {
                info!(path = %output_path.display(), "diagram saved");
                Ok(format!(
                    "Diagram generated successfully at {}",
                    output_path.display()
                ))
            }
            Err(e) => {
                warn!(error = %e, "diagram generation failed");
                Err(MaestroError::tool(GENERATION_FAILED))
            }
        }
    }

    async fn generate(
        &self,
        diagram: &str,
        output_path: &Path,
        width: u64,
        height: u64,
    ) -> Result<(), MaestroError> {
        debug!(diagram, "generating diagram");
        let url = self.render_url(diagram, width, height);

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(render_error)?
            .error_for_status()
            .map_err(render_error)?;
        let bytes = response.bytes().await.map_err(render_error)?;

        let format = sniff_image(&bytes)
            .ok_or_else(|| MaestroError::tool("render service did not return an image"))?;
        debug!(?format, size = bytes.len(), "received diagram image");

        if let Some(parent) = output_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(write_error)?;
        }
        tokio::fs::write(output_path, &bytes)
            .await
            .map_err(write_error)?;
        Ok(())
    }
}

fn render_error(e: reqwest::Error) -> MaestroError {
    MaestroError::Tool {
        message: format!("diagram request failed: {e}"),
        source: Some(Box::new(e)),
    }
}

fn write_error(e: std::io::Error) -> MaestroError {
    MaestroError::Tool {
        message: format!("failed to save diagram: {e}"),
        source: Some(Box::new(e)),
    }
}

#[async_trait]
impl ToolDispatcher for MermaidDispatcher {
    fn tool_name(&self) -> &str {
        TOOL_NAME
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.to_string(),
            description: "Generate a Mermaid diagram. Use flowchart TD for top-down flowcharts. \
                          Keep node IDs simple and alphanumeric. Use quotes for labels with \
                          spaces. Avoid special characters."
                .to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "diagram": {
                        "type": "string",
                        "description": "The Mermaid diagram definition without backticks. Use simple node IDs."
                    },
                    "output_file": {
                        "type": "string",
                        "description": "Output filename (e.g. workflow.png)"
                    },
                    "width": {
                        "type": "integer",
                        "description": "Width in pixels",
                        "default": self.default_width
                    },
                    "height": {
                        "type": "integer",
                        "description": "Height in pixels",
                        "default": self.default_height
                    }
                },
                "required": ["diagram"]
            }),
        }
    }

    async fn invoke(&self, invocation: &ToolInvocation, _conversation: &Conversation) -> ToolResult {
        match self.run(invocation).await {
            Ok(text) => ToolResult::success(&invocation.id, text),
            Err(e) => ToolResult::error(&invocation.id, e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";

    fn dispatcher(server: &MockServer, output_dir: &Path) -> MermaidDispatcher {
        let config = MermaidConfig {
            output_dir: output_dir.to_string_lossy().into_owned(),
            base_url: format!("{}/img/", server.uri()),
            timeout_secs: 5,
            ..MermaidConfig::default()
        };
        MermaidDispatcher::from_config(&config)
    }

    async fn run(mermaid: &MermaidDispatcher, input: Value) -> ToolResult {
        let invocation = ToolInvocation {
            id: "toolu_m".to_string(),
            name: TOOL_NAME.to_string(),
            input,
        };
        mermaid.invoke(&invocation, &Conversation::new()).await
    }

    #[test]
    fn sniff_known_formats() {
        assert_eq!(sniff_image(PNG), Some(ImageFormat::Png));
        assert_eq!(sniff_image(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(sniff_image(b"GIF89a...."), Some(ImageFormat::Gif));
        assert_eq!(sniff_image(b"RIFF\x00\x00\x00\x00WEBPVP8 "), Some(ImageFormat::Webp));
        assert_eq!(sniff_image(b"<html>syntax error</html>"), None);
        assert_eq!(sniff_image(b""), None);
    }

    #[test]
    fn render_url_encodes_diagram() {
        let mermaid = MermaidDispatcher::from_config(&MermaidConfig::default());
        let url = mermaid.render_url("graph TD; A-->B", 1200, 800);
        let encoded = STANDARD.encode("graph TD; A-->B");
        assert_eq!(
            url,
            format!("https://mermaid.ink/img/{encoded}?width=1200&height=800&theme=default")
        );
    }

    #[tokio::test]
    async fn successful_render_writes_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/img/.+"))
            .and(query_param("width", "640"))
            .and(query_param("height", "800"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mermaid = dispatcher(&server, dir.path());
        let result = run(
            &mermaid,
            json!({"diagram": "flowchart TD\n  A --> B", "output_file": "flows/login.png", "width": 640}),
        )
        .await;

        assert!(!result.is_error, "{}", result.text());
        assert!(result.text().starts_with("Diagram generated successfully at "));
        let saved = std::fs::read(dir.path().join("flows/login.png")).unwrap();
        assert_eq!(saved, PNG);
    }

    #[tokio::test]
    async fn non_image_response_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Syntax error in graph"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mermaid = dispatcher(&server, dir.path());
        let result = run(&mermaid, json!({"diagram": "not a diagram"})).await;

        assert!(result.is_error);
        assert_eq!(result.text(), GENERATION_FAILED);
        assert!(!dir.path().join(DEFAULT_OUTPUT_FILE).exists());
    }

    #[tokio::test]
    async fn http_error_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mermaid = dispatcher(&server, dir.path());
        let result = run(&mermaid, json!({"diagram": "graph TD; A-->"})).await;
        assert!(result.is_error);
        assert_eq!(result.text(), GENERATION_FAILED);
    }

    #[tokio::test]
    async fn missing_diagram() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let mermaid = dispatcher(&server, dir.path());
        let result = run(&mermaid, json!({"output_file": "x.png"})).await;
        assert!(result.is_error);
        assert_eq!(result.text(), "No diagram content provided");
    }
}
