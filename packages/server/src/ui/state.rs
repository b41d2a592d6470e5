//! Shared application state.

use std::sync::Arc;

use nagare_shared::time::Clock;

use crate::{
    config::ServerConfig,
    domain::{GroupRepository, LastSeenRepository, MessagePusher, MessageRepository},
    infrastructure::{
        message_pusher::SessionRegistry,
        repository::{
            InMemoryGroupRepository, InMemoryLastSeenRepository, InMemoryMessageRepository,
        },
    },
    usecase::{
        AddGroupMemberUseCase, ConnectParticipantUseCase, CreateGroupUseCase,
        DisconnectParticipantUseCase, GetHubStateUseCase, LeaveGroupUseCase, Notifier,
        RemoveGroupMemberUseCase, RequestHistoryUseCase, SendGroupMessageUseCase,
        SendPrivateMessageUseCase, UpdateLastSeenUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// Bounded outbound queue length per session
    pub queue_capacity: usize,
    /// Maximum inbound WebSocket frame size (bytes)
    pub max_message_size: usize,
    /// Notifier（受信時刻の打刻と system 通知に使う）
    pub notifier: Arc<Notifier>,
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    pub send_private_message_usecase: Arc<SendPrivateMessageUseCase>,
    pub send_group_message_usecase: Arc<SendGroupMessageUseCase>,
    pub create_group_usecase: Arc<CreateGroupUseCase>,
    pub add_group_member_usecase: Arc<AddGroupMemberUseCase>,
    pub remove_group_member_usecase: Arc<RemoveGroupMemberUseCase>,
    pub leave_group_usecase: Arc<LeaveGroupUseCase>,
    pub request_history_usecase: Arc<RequestHistoryUseCase>,
    pub update_last_seen_usecase: Arc<UpdateLastSeenUseCase>,
    pub get_hub_state_usecase: Arc<GetHubStateUseCase>,
}

impl AppState {
    /// Wire every use case against the in-memory stores and a fresh session registry.
    pub fn in_memory(config: &ServerConfig, clock: Arc<dyn Clock>) -> Self {
        // 1. Repository
        let group_repository: Arc<dyn GroupRepository> = Arc::new(InMemoryGroupRepository::new());
        let message_repository: Arc<dyn MessageRepository> =
            Arc::new(InMemoryMessageRepository::new());
        let last_seen_repository: Arc<dyn LastSeenRepository> =
            Arc::new(InMemoryLastSeenRepository::new());

        // 2. MessagePusher (session registry)
        let message_pusher: Arc<dyn MessagePusher> = Arc::new(SessionRegistry::new());

        // 3. Notifier
        let notifier = Arc::new(Notifier::new(
            group_repository.clone(),
            message_repository.clone(),
            last_seen_repository.clone(),
            message_pusher.clone(),
            clock,
        ));

        // 4. UseCases
        Self {
            queue_capacity: config.queue_capacity,
            max_message_size: config.max_message_size,
            connect_participant_usecase: Arc::new(ConnectParticipantUseCase::new(
                message_pusher.clone(),
                notifier.clone(),
            )),
            disconnect_participant_usecase: Arc::new(DisconnectParticipantUseCase::new(
                message_pusher.clone(),
                notifier.clone(),
            )),
            send_private_message_usecase: Arc::new(SendPrivateMessageUseCase::new(
                message_repository.clone(),
                message_pusher.clone(),
                notifier.clone(),
            )),
            send_group_message_usecase: Arc::new(SendGroupMessageUseCase::new(
                group_repository.clone(),
                message_repository.clone(),
                message_pusher.clone(),
                notifier.clone(),
            )),
            create_group_usecase: Arc::new(CreateGroupUseCase::new(
                group_repository.clone(),
                notifier.clone(),
            )),
            add_group_member_usecase: Arc::new(AddGroupMemberUseCase::new(
                group_repository.clone(),
                notifier.clone(),
            )),
            remove_group_member_usecase: Arc::new(RemoveGroupMemberUseCase::new(
                group_repository.clone(),
                message_repository.clone(),
                last_seen_repository.clone(),
                notifier.clone(),
            )),
            leave_group_usecase: Arc::new(LeaveGroupUseCase::new(
                group_repository.clone(),
                message_repository.clone(),
                last_seen_repository.clone(),
                notifier.clone(),
            )),
            request_history_usecase: Arc::new(RequestHistoryUseCase::new(
                group_repository.clone(),
                message_repository.clone(),
                message_pusher.clone(),
                notifier.clone(),
            )),
            update_last_seen_usecase: Arc::new(UpdateLastSeenUseCase::new(
                group_repository.clone(),
                last_seen_repository,
                notifier.clone(),
            )),
            get_hub_state_usecase: Arc::new(GetHubStateUseCase::new(
                group_repository,
                message_repository,
                message_pusher,
            )),
            notifier,
        }
    }
}
