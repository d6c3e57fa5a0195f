use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use humansize::{format_size, BINARY};
use maud::{html, Markup, PreEscaped, DOCTYPE};
use std::path::PathBuf;

use crate::listing::FileEntry;

const STYLES: &str = include_str!("../assets/styles.css");

/// Everything the page needs; no decisions are made while rendering.
#[derive(Debug)]
pub struct PageView {
    pub port: String,
    pub source_dir: PathBuf,
    pub ip_addresses: Vec<String>,
    /// Root-relative path being shown, `"."` for the root.
    pub current_path: String,
    pub files: Vec<FileEntry>,
}

/// Maps a root-relative path to a link, percent-encoding each segment.
pub fn entry_href(rel_path: &str) -> String {
    if rel_path == "." {
        return "/".to_string();
    }
    let encoded: Vec<String> = rel_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!("/{}", encoded.join("/"))
}

fn parent_href(rel_path: &str) -> String {
    match rel_path.rsplit_once('/') {
        Some((parent, _)) => entry_href(parent),
        None => "/".to_string(),
    }
}

fn page_shell(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(STYLES)) }
            }
            body { (body) }
        }
    }
}

/// Renders the control page / directory listing.
pub fn render_page(view: &PageView) -> Markup {
    let at_root = view.current_path == ".";
    let display_path = if at_root {
        "/".to_string()
    } else {
        format!("/{}", view.current_path)
    };

    page_shell(
        "File Server",
        html! {
            h1 { "File Server" }
            p { "Serving " code { (view.source_dir.display().to_string()) } " on port " strong { (view.port) } }

            section #addresses {
                h2 { "Open from another device" }
                ul {
                    @for ip in &view.ip_addresses {
                        @let url = format!("http://{}:{}", ip, view.port);
                        li { a href=(url) { (url) } }
                    }
                }
            }

            section #settings {
                h2 { "Settings" }
                form method="post" action="/" {
                    label for="port" { "Port" }
                    input type="text" id="port" name="port" placeholder=(view.port);
                    label for="directory" { "Directory" }
                    input type="text" id="directory" name="directory"
                        placeholder=(view.source_dir.display().to_string());
                    button type="submit" { "Apply" }
                }
            }

            section #upload {
                h2 { "Upload" }
                form method="post" action="/upload" enctype="multipart/form-data" {
                    input type="file" name="file" required;
                    button type="submit" { "Upload" }
                }
            }

            section #files {
                div #current-path { "Current: " (display_path) }
                table {
                    thead {
                        tr { th { "Name" } th { "Size" } th { "Type" } th { "Modified" } }
                    }
                    tbody {
                        @if !at_root {
                            tr {
                                td { a href=(parent_href(&view.current_path)) { span class="icon" { "⬆" } ".." } }
                                td {} td {} td {}
                            }
                        }
                        @for entry in &view.files {
                            tr {
                                @if entry.is_dir {
                                    td { a href=(entry_href(&entry.rel_path)) { span class="icon" { "📁" } (entry.name) "/" } }
                                    td class="size" { "-" }
                                    td { "directory" }
                                } @else {
                                    td { a href=(entry_href(&entry.rel_path)) { span class="icon" { "📄" } (entry.name) } }
                                    td class="size" { (format_size(entry.size, BINARY)) }
                                    td { (mime_guess::from_path(&entry.name).first_or_octet_stream().essence_str()) }
                                }
                                td class="modified" { (entry.mod_time) }
                            }
                        }
                        @if view.files.is_empty() {
                            tr { td colspan="4" { "Empty directory" } }
                        }
                    }
                }
            }
        },
    )
}

/// Helper to generate consistent Maud-based error responses.
pub fn error_response(status_code: StatusCode, message: &str) -> Response {
    let markup = page_shell(
        "Error",
        html! {
            div class="error" {
                h2 { (status_code.to_string()) }
                p { (message) }
                a href="/" { "Back" }
            }
        },
    );
    (status_code, markup).into_response()
}
