//! UseCase layer: one struct per hub operation.

pub mod add_group_member;
pub mod connect_participant;
pub mod create_group;
pub mod disconnect_participant;
pub mod error;
pub mod get_hub_state;
mod group_departure;
pub mod leave_group;
pub mod notifier;
pub mod remove_group_member;
pub mod request_history;
pub mod send_group_message;
pub mod send_private_message;
pub mod update_last_seen;

pub use add_group_member::AddGroupMemberUseCase;
pub use connect_participant::{ConnectOutcome, ConnectParticipantUseCase};
pub use create_group::CreateGroupUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{HistoryError, SendMessageError};
pub use get_hub_state::{GetHubStateUseCase, GroupSummary};
pub use leave_group::LeaveGroupUseCase;
pub use notifier::Notifier;
pub use remove_group_member::RemoveGroupMemberUseCase;
pub use request_history::RequestHistoryUseCase;
pub use send_group_message::SendGroupMessageUseCase;
pub use send_private_message::{PrivateDelivery, SendPrivateMessageUseCase};
pub use update_last_seen::UpdateLastSeenUseCase;
