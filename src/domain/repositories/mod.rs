// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod audit_repository;
pub mod call_attempt_repository;
pub mod disposition_repository;
pub mod dnc_repository;
pub mod lead_repository;
pub mod pipeline_repository;
pub mod provider_number_repository;
pub mod queue_repository;
pub mod workflow_repository;
