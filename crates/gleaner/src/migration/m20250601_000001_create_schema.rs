//! Initial migration to create the gleaner database schema.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        self.create_repositories(manager).await?;
        self.create_issues(manager).await?;
        self.create_labels(manager).await?;
        self.create_issue_labels(manager).await?;
        self.create_metadata(manager).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Metadata::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IssueLabels::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Labels::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Issues::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Repositories::Table).to_owned())
            .await?;
        Ok(())
    }
}

impl Migration {
    async fn create_repositories(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Repositories::Table)
                    .if_not_exists()
                    // Internal
                    .col(
                        ColumnDef::new(Repositories::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    // Identity
                    .col(
                        ColumnDef::new(Repositories::GithubId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Repositories::Name).string().not_null())
                    .col(ColumnDef::new(Repositories::FullName).string().not_null())
                    .col(ColumnDef::new(Repositories::HtmlUrl).text().not_null())
                    // Statistics
                    .col(
                        ColumnDef::new(Repositories::StargazersCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Repositories::ForksCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Repositories::WatchersCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    // Languages
                    .col(ColumnDef::new(Repositories::Language).string().null())
                    .col(
                        ColumnDef::new(Repositories::Languages)
                            .json()
                            .not_null()
                            .default(Expr::cust("'[]'")),
                    )
                    // Timestamps
                    .col(
                        ColumnDef::new(Repositories::CreatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Repositories::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Repositories::LastRefreshed)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique natural key on github_id
        manager
            .create_index(
                Index::create()
                    .name("idx_repositories_github_id")
                    .table(Repositories::Table)
                    .col(Repositories::GithubId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index on stargazers_count (display-side popularity filter)
        manager
            .create_index(
                Index::create()
                    .name("idx_repositories_stargazers_count")
                    .table(Repositories::Table)
                    .col(Repositories::StargazersCount)
                    .to_owned(),
            )
            .await?;

        // Index on full_name
        manager
            .create_index(
                Index::create()
                    .name("idx_repositories_full_name")
                    .table(Repositories::Table)
                    .col(Repositories::FullName)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_issues(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Issues::Table)
                    .if_not_exists()
                    // Internal
                    .col(ColumnDef::new(Issues::Id).uuid().not_null().primary_key())
                    // Identity
                    .col(ColumnDef::new(Issues::GithubId).big_integer().not_null())
                    .col(ColumnDef::new(Issues::RepositoryId).uuid().not_null())
                    .col(ColumnDef::new(Issues::Number).integer().not_null())
                    // Content
                    .col(ColumnDef::new(Issues::Title).text().not_null())
                    .col(ColumnDef::new(Issues::HtmlUrl).text().not_null())
                    .col(ColumnDef::new(Issues::State).string().not_null())
                    .col(
                        ColumnDef::new(Issues::Comments)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Issues::Assignee).string().null())
                    .col(
                        ColumnDef::new(Issues::IsGoodFirstIssue)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    // Timestamps
                    .col(
                        ColumnDef::new(Issues::CreatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Issues::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Issues::LastRefreshed)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_issues_repository")
                            .from(Issues::Table, Issues::RepositoryId)
                            .to(Repositories::Table, Repositories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique natural key on github_id
        manager
            .create_index(
                Index::create()
                    .name("idx_issues_github_id")
                    .table(Issues::Table)
                    .col(Issues::GithubId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index on repository_id (issue listing per repository)
        manager
            .create_index(
                Index::create()
                    .name("idx_issues_repository_id")
                    .table(Issues::Table)
                    .col(Issues::RepositoryId)
                    .to_owned(),
            )
            .await?;

        // Composite index on (state, is_good_first_issue) - the display filter
        // and the cleanup step both select on this pair
        manager
            .create_index(
                Index::create()
                    .name("idx_issues_state_good_first")
                    .table(Issues::Table)
                    .col(Issues::State)
                    .col(Issues::IsGoodFirstIssue)
                    .to_owned(),
            )
            .await?;

        // Index on last_refreshed (staleness selection)
        manager
            .create_index(
                Index::create()
                    .name("idx_issues_last_refreshed")
                    .table(Issues::Table)
                    .col(Issues::LastRefreshed)
                    .to_owned(),
            )
            .await?;

        // Index on updated_at (staleness ordering, display sort)
        manager
            .create_index(
                Index::create()
                    .name("idx_issues_updated_at")
                    .table(Issues::Table)
                    .col(Issues::UpdatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_labels(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Labels::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Labels::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Labels::Name).string().not_null())
                    .col(ColumnDef::new(Labels::Color).string().null())
                    .to_owned(),
            )
            .await?;

        // Unique natural key on name
        manager
            .create_index(
                Index::create()
                    .name("idx_labels_name")
                    .table(Labels::Table)
                    .col(Labels::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_issue_labels(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(IssueLabels::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(IssueLabels::IssueId).uuid().not_null())
                    .col(ColumnDef::new(IssueLabels::LabelId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(IssueLabels::IssueId)
                            .col(IssueLabels::LabelId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_issue_labels_issue")
                            .from(IssueLabels::Table, IssueLabels::IssueId)
                            .to(Issues::Table, Issues::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_issue_labels_label")
                            .from(IssueLabels::Table, IssueLabels::LabelId)
                            .to(Labels::Table, Labels::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_metadata(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Metadata::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Metadata::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Metadata::LastRefresh)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Metadata::Status).string().not_null())
                    .col(ColumnDef::new(Metadata::Error).text().null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
#[sea_orm(iden = "repositories")]
enum Repositories {
    Table,
    Id,
    GithubId,
    Name,
    FullName,
    HtmlUrl,
    StargazersCount,
    ForksCount,
    WatchersCount,
    Language,
    Languages,
    CreatedAt,
    UpdatedAt,
    LastRefreshed,
}

#[derive(DeriveIden)]
#[sea_orm(iden = "issues")]
enum Issues {
    Table,
    Id,
    GithubId,
    RepositoryId,
    Number,
    Title,
    HtmlUrl,
    State,
    Comments,
    Assignee,
    IsGoodFirstIssue,
    CreatedAt,
    UpdatedAt,
    LastRefreshed,
}

#[derive(DeriveIden)]
#[sea_orm(iden = "labels")]
enum Labels {
    Table,
    Id,
    Name,
    Color,
}

#[derive(DeriveIden)]
#[sea_orm(iden = "issue_labels")]
enum IssueLabels {
    Table,
    IssueId,
    LabelId,
}

#[derive(DeriveIden)]
#[sea_orm(iden = "metadata")]
enum Metadata {
    Table,
    Id,
    LastRefresh,
    Status,
    Error,
}
