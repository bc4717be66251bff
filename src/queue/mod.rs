// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 队列模块
///
/// 提供拨号队列和调度循环
/// 负责条目的排队、认领和结果落账
pub mod dialing_queue;
pub mod scheduler;
