use serde_json::json;
use tabme_sync::SyncPhase;

#[test]
fn default_is_idle() {
    assert_eq!(SyncPhase::default(), SyncPhase::Idle);
}

#[test]
fn busy_phases() {
    assert!(SyncPhase::Syncing.is_busy());
    assert!(
        SyncPhase::Resolving {
            backup_id: "G1".into()
        }
        .is_busy()
    );
    assert!(!SyncPhase::Idle.is_busy());
    assert!(
        !SyncPhase::Conflict {
            backup_id: "G1".into()
        }
        .is_busy()
    );
}

#[test]
fn reset_leaves_busy_phases_alone() {
    assert_eq!(SyncPhase::Syncing.reset(), SyncPhase::Syncing);

    let finished = [
        SyncPhase::Created {
            backup_id: "G1".into(),
        },
        SyncPhase::Conflict {
            backup_id: "G1".into(),
        },
        SyncPhase::Resolved {
            backup_id: "G1".into(),
        },
        SyncPhase::Error {
            message: "boom".into(),
        },
    ];
    for phase in finished {
        assert_eq!(phase.reset(), SyncPhase::Idle);
    }
}

#[test]
fn terminal_success() {
    assert!(
        SyncPhase::Resolved {
            backup_id: "G1".into()
        }
        .is_terminal_success()
    );
    assert!(
        !SyncPhase::Error {
            message: "x".into()
        }
        .is_terminal_success()
    );
}

#[test]
fn serializes_with_phase_tag() {
    let value = serde_json::to_value(SyncPhase::Conflict {
        backup_id: "G1".into(),
    })
    .unwrap();
    assert_eq!(value, json!({"phase": "conflict", "backup_id": "G1"}));
    assert!(SyncPhase::Conflict { backup_id: "G1".into() }.is_conflict());
}
