use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::error::{GactivityError, HttpStatusCode};
use crate::html::{escape_html, page};

pub mod client;

/// Errors render as a small HTML page carrying the mapped status code.
impl IntoResponse for GactivityError {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = format!(
            "<h1>{} {}</h1>\n<p>{}</p>\n<p><a href=\"/\">Back to home</a></p>",
            status_code.as_u16(),
            status_code.canonical_reason().unwrap_or("Error"),
            escape_html(&self.to_string()),
        );

        (status_code, Html(page("Error", &body))).into_response()
    }
}
