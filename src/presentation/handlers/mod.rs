// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 处理器模块
pub mod dispatch_handler;
pub mod event_handler;
pub mod queue_handler;
