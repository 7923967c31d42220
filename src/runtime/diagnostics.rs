//! Built-in diagnostic routes for the local runner.

use serde_json::json;

use crate::binding::Param;
use crate::error::RouteError;
use crate::http::response::{Response, APPLICATION_OCTET_STREAM};
use crate::routing::{Reply, Route};

/// `GET /health`, `POST /echo` and `GET /version`.
pub fn diagnostic_routes() -> Vec<Route> {
    vec![
        Route::get("/health", |_args| async { Ok::<_, RouteError>(json!({ "status": "ok" })) }),
        Route::get("/version", |_args| async {
            Ok::<_, RouteError>(json!({
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            }))
        }),
        Route::post("/echo", |args| async move {
            let request = args
                .request("request")
                .ok_or_else(|| RouteError::unhandled("echo route has no request parameter"))?;

            let reply = match (request.json(), request.body()) {
                (Some(value), _) => Reply::Json(value.clone()),
                (None, Some(body)) => {
                    let media_type = request.header("content-type").unwrap_or(APPLICATION_OCTET_STREAM);
                    Reply::Response(Response::binary(body.to_vec(), media_type))
                }
                (None, None) => Reply::Empty,
            };
            Ok::<_, RouteError>(reply)
        })
        .param(Param::request("request")),
    ]
}
