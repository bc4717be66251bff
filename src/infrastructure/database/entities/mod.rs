// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod call_attempt;
pub mod disposition;
pub mod disposition_audit;
pub mod disposition_error;
pub mod dnc_entry;
pub mod lead;
pub mod pipeline_board;
pub mod pipeline_position;
pub mod provider_number;
pub mod queue_entry;
pub mod workflow_progress;
