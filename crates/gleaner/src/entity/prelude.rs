//! Common re-exports for convenient entity usage.

pub use super::issue::{
    ActiveModel as IssueActiveModel, Column as IssueColumn, Entity as Issue, Model as IssueModel,
};
pub use super::issue_label::{
    ActiveModel as IssueLabelActiveModel, Column as IssueLabelColumn, Entity as IssueLabel,
    Model as IssueLabelModel,
};
pub use super::issue_state::IssueState;
pub use super::label::{
    ActiveModel as LabelActiveModel, Column as LabelColumn, Entity as Label, Model as LabelModel,
};
pub use super::metadata::{
    ActiveModel as MetadataActiveModel, Column as MetadataColumn, Entity as Metadata,
    Model as MetadataModel,
};
pub use super::refresh_status::RefreshStatus;
pub use super::repository::{
    ActiveModel as RepositoryActiveModel, Column as RepositoryColumn, Entity as Repository,
    Model as RepositoryModel,
};
