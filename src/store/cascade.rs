//! Declared cascade rules, run by one routine when a parent row is removed in
//! offline mode. Authenticated mode leaves cascading to the server.

use crate::remote::EntityKind;
use crate::snapshot::Snapshot;

pub(crate) struct CascadeRule {
    pub parent: EntityKind,
    pub run: fn(&mut Snapshot, i64),
}

pub(crate) const CASCADES: &[CascadeRule] = &[
    CascadeRule {
        parent: EntityKind::Student,
        run: strip_student_from_guardians,
    },
    CascadeRule {
        parent: EntityKind::Student,
        run: strip_student_from_pickups,
    },
    CascadeRule {
        parent: EntityKind::Student,
        run: purge_student_events,
    },
];

pub(crate) fn run_cascades(snapshot: &mut Snapshot, parent: EntityKind, id: i64) {
    for rule in CASCADES {
        if rule.parent == parent {
            (rule.run)(snapshot, id);
        }
    }
}

fn strip_student_from_guardians(snapshot: &mut Snapshot, student_id: i64) {
    for g in &mut snapshot.guardians {
        g.student_ids.retain(|sid| *sid != student_id);
    }
}

fn strip_student_from_pickups(snapshot: &mut Snapshot, student_id: i64) {
    for p in &mut snapshot.authorized_pickups {
        p.student_ids.retain(|sid| *sid != student_id);
    }
}

fn purge_student_events(snapshot: &mut Snapshot, student_id: i64) {
    snapshot
        .attendance_events
        .retain(|e| e.student_id != student_id);
}
