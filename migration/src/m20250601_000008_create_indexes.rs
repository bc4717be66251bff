use sea_orm_migration::prelude::*;

use crate::m20250601_000001_create_dialing_queue::DialingQueue;
use crate::m20250601_000002_create_call_attempts::CallAttempts;
use crate::m20250601_000004_create_dispositions_and_pipeline::PipelineBoards;
use crate::m20250601_000005_create_workflow_progress::WorkflowProgress;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_dialing_queue_status_priority")
                    .table(DialingQueue::Table)
                    .col(DialingQueue::Status)
                    .col(DialingQueue::Priority)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_dialing_queue_campaign_lead")
                    .table(DialingQueue::Table)
                    .col(DialingQueue::CampaignId)
                    .col(DialingQueue::LeadId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_dialing_queue_account_status")
                    .table(DialingQueue::Table)
                    .col(DialingQueue::AccountId)
                    .col(DialingQueue::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_call_attempts_account_status")
                    .table(CallAttempts::Table)
                    .col(CallAttempts::AccountId)
                    .col(CallAttempts::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_call_attempts_provider_call_id")
                    .table(CallAttempts::Table)
                    .col(CallAttempts::ProviderCallId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_workflow_progress_lead_status")
                    .table(WorkflowProgress::Table)
                    .col(WorkflowProgress::LeadId)
                    .col(WorkflowProgress::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pipeline_boards_account_normalized")
                    .table(PipelineBoards::Table)
                    .col(PipelineBoards::AccountId)
                    .col(PipelineBoards::NormalizedName)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_dialing_queue_status_priority",
            "idx_dialing_queue_campaign_lead",
            "idx_dialing_queue_account_status",
            "idx_call_attempts_account_status",
            "idx_call_attempts_provider_call_id",
            "idx_workflow_progress_lead_status",
            "idx_pipeline_boards_account_normalized",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }
        Ok(())
    }
}
