// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::dispatch::dispatcher::Dispatcher;
use axum::extract::{Extension, Path};
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// 暂停账户派发
///
/// 只拦截后续认领，已提交的在途呼叫不受影响
pub async fn pause_dispatch(
    Extension(dispatcher): Extension<Arc<Dispatcher>>,
    Path(account_id): Path<Uuid>,
) -> Json<serde_json::Value> {
    dispatcher.pause_account(account_id);

    Json(json!({
        "account_id": account_id,
        "paused": true,
    }))
}

/// 恢复账户派发
pub async fn resume_dispatch(
    Extension(dispatcher): Extension<Arc<Dispatcher>>,
    Path(account_id): Path<Uuid>,
) -> Json<serde_json::Value> {
    dispatcher.resume_account(account_id);

    Json(json!({
        "account_id": account_id,
        "paused": false,
    }))
}
