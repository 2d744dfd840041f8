// ==========================================
// Realty Ledger - Duplicate Sale Detector
// ==========================================
// A candidate is a duplicate of an existing sale when development,
// client, broker and sale date all match. When the candidate names
// a unit or block, the unit identifiers must match exactly as well
// (empty equals empty); a candidate with neither identifier
// matches on the base key alone.
//
// Correctness across a batch depends on strict row sequencing: the
// sale inserted for row N must be visible to the check of row N+1.
// ==========================================

use crate::domain::Sale;
use crate::engine::SaleDraft;

/// First existing sale the candidate duplicates, if any.
pub fn find_duplicate<'a>(candidate: &SaleDraft, existing: &'a [Sale]) -> Option<&'a Sale> {
    existing.iter().find(|sale| is_duplicate(candidate, sale))
}

pub fn is_duplicate(candidate: &SaleDraft, existing: &Sale) -> bool {
    if candidate.development_id != existing.development_id
        || candidate.client_id != existing.client_id
        || candidate.broker_id != existing.broker_id
        || candidate.sale_date != existing.sale_date
    {
        return false;
    }

    let unit = normalized(&candidate.unit_number);
    let block = normalized(&candidate.block);

    // No unit identifiers supplied: the base key alone decides.
    if unit.is_empty() && block.is_empty() {
        return true;
    }

    unit == normalized(&existing.unit_number) && block == normalized(&existing.block)
}

fn normalized(value: &Option<String>) -> String {
    value.as_deref().unwrap_or("").trim().to_string()
}
