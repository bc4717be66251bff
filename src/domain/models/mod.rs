// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod call_attempt;
pub mod disposition;
pub mod lead;
pub mod pipeline;
pub mod provider_number;
pub mod queue_entry;
pub mod workflow;
