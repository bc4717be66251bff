// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 派发模块
///
/// 并发治理、条目派发与滞留对账
pub mod dispatcher;
pub mod governor;
pub mod reconciler;
