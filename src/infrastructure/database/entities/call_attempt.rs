// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "call_attempts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    pub queue_entry_id: Option<Uuid>,
    pub lead_id: Uuid,
    pub provider: String,
    pub from_number: String,
    pub to_number: String,
    pub channel: String,
    pub status: String,
    pub provider_call_id: Option<String>,
    pub outcome: Option<String>,
    pub started_at: Option<ChronoDateTimeWithTimeZone>,
    pub ended_at: Option<ChronoDateTimeWithTimeZone>,
    pub metadata: Json,
    pub created_at: ChronoDateTimeWithTimeZone,
    pub updated_at: ChronoDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
