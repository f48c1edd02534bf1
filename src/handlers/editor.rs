use std::sync::Arc;

use axum::{Extension, Json};

use crate::{
    ai::generate_markdown,
    authentication::AuthUser,
    data_formats::{
        GenerateContentRequest, GeneratedContentResponse, HtmlResponse, HtmlToMarkdownRequest,
        MarkdownResponse, MarkdownToHtmlRequest,
    },
    markdown::{html_to_markdown, markdown_to_html},
    AppState,
};

use super::JsonResult;

// ----------------- Editor Handlers -----------------
pub async fn convert_html(
    _auth: AuthUser,
    Json(request): Json<HtmlToMarkdownRequest>,
) -> JsonResult<MarkdownResponse> {
    Ok(Json(MarkdownResponse {
        markdown: html_to_markdown(&request.html),
    }))
}

pub async fn render_markdown(
    _auth: AuthUser,
    Json(request): Json<MarkdownToHtmlRequest>,
) -> JsonResult<HtmlResponse> {
    Ok(Json(HtmlResponse {
        html: markdown_to_html(&request.markdown),
    }))
}

pub async fn generate_content(
    Extension(state): Extension<Arc<AppState>>,
    auth: AuthUser,
    Json(request): Json<GenerateContentRequest>,
) -> JsonResult<GeneratedContentResponse> {
    let generated = generate_markdown(state.ai.as_ref(), &request.prompt)
        .await
        .map_err(|e| {
            tracing::error!("AI generation failed for user {}: {}", auth.id, e);
            e
        })?;
    tracing::info!("Generated {} characters with {}", generated.markdown.len(), generated.model);
    Ok(Json(GeneratedContentResponse {
        html: markdown_to_html(&generated.markdown),
        markdown: generated.markdown,
        model: generated.model,
    }))
}
