// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "disposition_audit")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    pub lead_id: Uuid,
    pub call_id: Option<Uuid>,
    pub disposition_name: String,
    pub set_by: String,
    pub confidence: Option<f64>,
    pub lead_status_before: String,
    pub lead_status_after: String,
    pub stage_before: Option<String>,
    pub stage_after: Option<String>,
    pub time_to_disposition_ms: Option<i64>,
    pub actions: Json,
    pub created_at: ChronoDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
