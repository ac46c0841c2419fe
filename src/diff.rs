use std::collections::BTreeMap;

/// One register whose value differs between two status reads.
/// `None` marks a register absent on that side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RegisterChange {
    pub id: u16,
    pub old: Option<String>,
    pub new: Option<String>,
}

pub(crate) fn diff_registers(
    previous: &BTreeMap<u16, String>,
    current: &BTreeMap<u16, String>,
) -> Vec<RegisterChange> {
    let mut changes = Vec::new();

    for (id, value) in current {
        match previous.get(id) {
            Some(prev) if prev == value => {}
            prev => changes.push(RegisterChange {
                id: *id,
                old: prev.cloned(),
                new: Some(value.clone()),
            }),
        }
    }

    for (id, prev) in previous {
        if !current.contains_key(id) {
            changes.push(RegisterChange {
                id: *id,
                old: Some(prev.clone()),
                new: None,
            });
        }
    }

    changes.sort_by_key(|c| c.id);
    changes
}
