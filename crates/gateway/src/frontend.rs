//! The playground page, compiled into the binary.
//!
//! Each asset carries its own content type and cache policy. The page itself
//! is never cached so a rebuilt binary serves the matching script.

use axum::{
    Router,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};

#[derive(Debug, Clone, Copy)]
struct Asset {
    path: &'static str,
    content_type: &'static str,
    cache_control: &'static str,
    body: &'static str,
}

const ASSETS: &[Asset] = &[
    Asset {
        path: "/",
        content_type: "text/html; charset=utf-8",
        cache_control: "no-cache",
        body: include_str!("../../../frontend/index.html"),
    },
    Asset {
        path: "/static/style.css",
        content_type: "text/css; charset=utf-8",
        cache_control: "public, max-age=3600",
        body: include_str!("../../../frontend/style.css"),
    },
    Asset {
        path: "/static/app.js",
        content_type: "application/javascript; charset=utf-8",
        cache_control: "public, max-age=3600",
        body: include_str!("../../../frontend/app.js"),
    },
];

impl Asset {
    fn response(self) -> Response {
        (
            [
                (header::CONTENT_TYPE, self.content_type),
                (header::CACHE_CONTROL, self.cache_control),
                (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
            ],
            self.body,
        )
            .into_response()
    }
}

/// Routes for every embedded asset.
pub fn frontend_router() -> Router {
    ASSETS.iter().fold(Router::new(), |router, &asset| {
        router.route(asset.path, get(move || async move { asset.response() }))
    })
}
