//! Property-based tests for the access state machine.
//!
//! Tests verify that the access policy holds under arbitrary sequences of UI
//! commands, timer ticks, and backend responses.

use call0_access::{
    AccessAction, AccessClient, AccessConfig, AccessEvent, AccessGrant, CallId, CreatorInfo,
    FetchOutcome, JoinOutcome, UserIdentity,
};
use proptest::prelude::*;

/// One step applied to the client. Responses are tagged with the current
/// generation when applied unless `stale` is set.
#[derive(Debug, Clone)]
enum Op {
    SetCall(Option<u8>),
    SetJoined(bool),
    Tick,
    RequestAccess,
    Creator { stale: bool, outcome: FetchOutcome<CreatorInfo> },
    Access { stale: bool, outcome: FetchOutcome<AccessGrant> },
    JoinDone { stale: bool, outcome: JoinOutcome },
}

fn fetch_strategy<T: Clone + std::fmt::Debug + 'static>(
    ok: impl Strategy<Value = T> + 'static,
) -> impl Strategy<Value = FetchOutcome<T>> {
    prop_oneof![
        2 => ok.prop_map(FetchOutcome::Ok),
        1 => Just(FetchOutcome::NotFound),
        1 => Just(FetchOutcome::Failed("network".into())),
    ]
}

fn creator_strategy() -> impl Strategy<Value = CreatorInfo> {
    "[a-z]{1,4}".prop_map(|id| CreatorInfo { id, name: None, email: None, image: None })
}

fn grant_strategy() -> impl Strategy<Value = AccessGrant> {
    (any::<bool>(), any::<bool>())
        .prop_map(|(has_access, is_creator)| AccessGrant { has_access, is_creator })
}

fn join_strategy() -> impl Strategy<Value = JoinOutcome> {
    prop_oneof![
        Just(JoinOutcome::Requested),
        (400u16..600, proptest::option::of("[A-Za-z ]{0,12}"))
            .prop_map(|(status, message)| JoinOutcome::Rejected { status, message }),
        Just(JoinOutcome::Failed("timeout".into())),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => proptest::option::of(0u8..3).prop_map(Op::SetCall),
        1 => any::<bool>().prop_map(Op::SetJoined),
        3 => Just(Op::Tick),
        1 => Just(Op::RequestAccess),
        2 => (any::<bool>(), fetch_strategy(creator_strategy()))
            .prop_map(|(stale, outcome)| Op::Creator { stale, outcome }),
        2 => (any::<bool>(), fetch_strategy(grant_strategy()))
            .prop_map(|(stale, outcome)| Op::Access { stale, outcome }),
        1 => (any::<bool>(), join_strategy())
            .prop_map(|(stale, outcome)| Op::JoinDone { stale, outcome }),
    ]
}

fn user_strategy() -> impl Strategy<Value = UserIdentity> {
    prop_oneof![
        Just(UserIdentity::Guest),
        "[a-z]{1,6}".prop_map(|id| UserIdentity::from_raw(Some(&id))),
    ]
}

fn apply(client: &mut AccessClient, op: Op) -> Vec<AccessAction> {
    let tag = |stale: bool, client: &AccessClient| {
        if stale { client.generation().wrapping_sub(1) } else { client.generation() }
    };
    match op {
        Op::SetCall(id) => client.set_call(id.and_then(|n| CallId::parse(format!("call-{n}")))),
        Op::SetJoined(joined) => client.set_joined(joined),
        Op::Tick => client.handle(AccessEvent::PollTick),
        Op::RequestAccess => client.request_access(),
        Op::Creator { stale, outcome } => {
            let generation = tag(stale, &*client);
            client.handle(AccessEvent::CreatorFetched { generation, outcome })
        },
        Op::Access { stale, outcome } => {
            let generation = tag(stale, &*client);
            client.handle(AccessEvent::AccessChecked { generation, outcome })
        },
        Op::JoinDone { stale, outcome } => {
            let generation = tag(stale, &*client);
            client.handle(AccessEvent::JoinRequestCompleted { generation, outcome })
        },
    }
}

fn issues_check(actions: &[AccessAction]) -> bool {
    actions.iter().any(|a| matches!(a, AccessAction::CheckAccess { .. }))
}

fn issues_join(actions: &[AccessAction]) -> bool {
    actions.iter().any(|a| matches!(a, AccessAction::RequestJoin { .. }))
}

proptest! {
    #[test]
    fn prop_guest_never_checks_access(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let mut client = AccessClient::new(UserIdentity::Guest, AccessConfig::default());

        for op in ops {
            let actions = apply(&mut client, op);
            prop_assert!(!issues_check(&actions));
            prop_assert!(!issues_join(&actions));

            let session = client.session();
            if session.call_id.is_some() {
                prop_assert_eq!(session.has_access, Some(true));
            }
        }
    }

    #[test]
    fn prop_joined_never_checks_access(
        user in user_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..60),
    ) {
        let mut client = AccessClient::new(user, AccessConfig::default());

        for op in ops {
            let joined_before = client.session().joined;
            let leaves = matches!(op, Op::SetJoined(false));
            let actions = apply(&mut client, op);

            if joined_before && !leaves {
                prop_assert!(!issues_check(&actions));
            }
            if client.session().joined {
                prop_assert!(!client.is_polling());
            }
        }
    }

    #[test]
    fn prop_not_found_opens_room(
        user in user_strategy(),
        prefix in prop::collection::vec(op_strategy(), 0..30),
    ) {
        let mut client = AccessClient::new(user, AccessConfig::default());
        let _ = client.set_call(CallId::parse("open-room"));
        for op in prefix {
            let _ = apply(&mut client, op);
        }
        let _ = client.set_call(CallId::parse("anonymous"));
        let generation = client.generation();

        let _ = client.handle(AccessEvent::CreatorFetched { generation, outcome: FetchOutcome::NotFound });
        let _ = client.handle(AccessEvent::AccessChecked { generation, outcome: FetchOutcome::NotFound });

        let session = client.session();
        prop_assert_eq!(session.has_access, Some(true));
        prop_assert!(!session.is_creator);
        prop_assert_eq!(&session.creator_info, &None);
    }

    #[test]
    fn prop_join_completion_clears_requesting(
        ops in prop::collection::vec(op_strategy(), 0..40),
        outcome in join_strategy(),
    ) {
        let mut client = AccessClient::new(
            UserIdentity::Identified { id: "u2".into() },
            AccessConfig::default(),
        );
        let _ = client.set_call(CallId::parse("abc123"));
        for op in ops {
            let _ = apply(&mut client, op);
        }

        let _ = client.request_access();
        let generation = client.generation();
        let _ = client.handle(AccessEvent::JoinRequestCompleted { generation, outcome });

        prop_assert!(!client.session().is_requesting_access);
    }

    #[test]
    fn prop_stale_responses_are_ignored(
        user in user_strategy(),
        grant in grant_strategy(),
    ) {
        let mut client = AccessClient::new(user, AccessConfig::default());
        let _ = client.set_call(CallId::parse("first"));
        let old = client.generation();
        let _ = client.set_call(CallId::parse("second"));
        let before = client.session().clone();

        let actions = client.handle(AccessEvent::AccessChecked {
            generation: old,
            outcome: FetchOutcome::Ok(grant),
        });

        prop_assert!(actions.is_empty());
        prop_assert_eq!(client.session(), &before);
    }
}
