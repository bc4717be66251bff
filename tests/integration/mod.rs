// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

mod helpers;

mod api_test;
mod dispatch_test;
mod disposition_test;
mod queue_test;
mod reconciler_test;
mod scheduler_test;
