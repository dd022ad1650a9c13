use crate::error::Result;
use formdesk_core::{normalized_email_sql, Statement, StatementExecutor, Value};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DedupeGroup {
    pub email: String,
    pub keep: i64,
    pub remove: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DedupePlan {
    pub groups: Vec<DedupeGroup>,
    pub applied: bool,
}

impl DedupePlan {
    pub fn removed_count(&self) -> usize {
        self.groups.iter().map(|group| group.remove.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Groups membership rows by normalized email and keeps the earliest row of
/// each group. Rows are only deleted when `apply` is set.
pub fn dedupe_membership_emails<E: StatementExecutor + ?Sized>(
    executor: &E,
    apply: bool,
) -> Result<DedupePlan> {
    let normalized = normalized_email_sql("email");
    let result = executor.execute(&Statement::new(format!(
        "SELECT id, {normalized} FROM membership_applications
         WHERE {normalized} IN (
           SELECT {normalized} FROM membership_applications
           GROUP BY {normalized} HAVING COUNT(*) > 1
         )
         ORDER BY id ASC;"
    )))?;

    let mut by_email: BTreeMap<String, Vec<i64>> = BTreeMap::new();
    for row in &result.rows {
        let (Some(id), Some(email)) = (
            row.first().and_then(Value::as_i64),
            row.get(1).and_then(Value::as_str),
        ) else {
            continue;
        };
        by_email.entry(email.to_string()).or_default().push(id);
    }

    let groups: Vec<DedupeGroup> = by_email
        .into_iter()
        .filter_map(|(email, ids)| {
            let (keep, remove) = ids.split_first()?;
            Some(DedupeGroup {
                email,
                keep: *keep,
                remove: remove.to_vec(),
            })
        })
        .collect();

    let mut plan = DedupePlan {
        groups,
        applied: false,
    };
    if plan.is_empty() {
        return Ok(plan);
    }
    warn!(
        groups = plan.groups.len(),
        rows = plan.removed_count(),
        "duplicate membership emails found"
    );

    if apply {
        let deletes: Vec<Statement> = plan
            .groups
            .iter()
            .flat_map(|group| group.remove.iter())
            .map(|id| Statement::new("DELETE FROM membership_applications WHERE id = ?1;").bind(*id))
            .collect();
        executor.execute_batch(&deletes)?;
        plan.applied = true;
        info!(rows = plan.removed_count(), "duplicate membership rows removed");
    }
    Ok(plan)
}
