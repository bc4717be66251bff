// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::presentation::handlers::{dispatch_handler, event_handler, queue_handler};
use axum::{
    routing::{get, post},
    Router,
};

/// 创建应用路由
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes() -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version));

    let api_routes = Router::new()
        .route("/v1/queue", post(queue_handler::enqueue))
        .route("/v1/events", post(event_handler::ingest_event))
        .route(
            "/v1/accounts/{account_id}/dispatch/pause",
            post(dispatch_handler::pause_dispatch),
        )
        .route(
            "/v1/accounts/{account_id}/dispatch/resume",
            post(dispatch_handler::resume_dispatch),
        );

    Router::new().merge(public_routes).merge(api_routes)
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
