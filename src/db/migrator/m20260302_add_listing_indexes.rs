use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Public listing: ORDER BY sort_order, created_at DESC
        manager
            .create_index(
                Index::create()
                    .name("idx_projects_sort_order_created_at")
                    .table(Projects::Table)
                    .col(Projects::SortOrder)
                    .col(Projects::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_contact_messages_is_read_created_at")
                    .table(ContactMessages::Table)
                    .col(ContactMessages::IsRead)
                    .col(ContactMessages::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_contact_messages_is_read_created_at")
                    .table(ContactMessages::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_projects_sort_order_created_at")
                    .table(Projects::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    SortOrder,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ContactMessages {
    Table,
    IsRead,
    CreatedAt,
}
