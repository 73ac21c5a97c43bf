//! Credit-ledger arithmetic: conservation of credited value (PRD-11).
//!
//! Pure functions over caller-supplied claims and existing allocations.
//! The invariant enforced here is that credited value never exceeds
//! claimed value, at the individual-claim scope and at the metric pool
//! scope. The storage layer is responsible for calling these checks
//! inside an atomically-isolated read-validate-write step; the math
//! itself carries no state.

use serde::Serialize;

use crate::claim::ClaimObservation;
use crate::error::CoreError;
use crate::types::DbId;

/// Tolerance for floating-point sums; rejections within this margin
/// would be pure float noise, not real over-allocation.
pub const CAPACITY_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// An existing credit allocation, as read from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub id: DbId,
    /// `None` means the metric-level pool spanning all claims.
    pub claim_id: Option<DbId>,
    pub credited_value: f64,
}

/// A proposed new or updated allocation awaiting validation.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationCandidate {
    /// `Some` when updating an existing allocation; its prior value is
    /// then excluded from the availability computation.
    pub id: Option<DbId>,
    pub metric_id: DbId,
    pub claim_id: Option<DbId>,
    pub credited_value: f64,
}

/// Remaining creditable capacity for a scope, reported to callers so
/// they can offer a corrected value after a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Availability {
    pub available: f64,
}

// ---------------------------------------------------------------------------
// Capacity
// ---------------------------------------------------------------------------

/// Remaining creditable value against a single claim: the claim's value
/// minus all allocations scoped to it, optionally excluding one
/// allocation's own prior value (the update path).
pub fn claim_capacity(
    claim_value: f64,
    allocations: &[Allocation],
    claim_id: DbId,
    exclude: Option<DbId>,
) -> f64 {
    let credited: f64 = allocations
        .iter()
        .filter(|a| a.claim_id == Some(claim_id) && Some(a.id) != exclude)
        .map(|a| a.credited_value)
        .sum();
    claim_value - credited
}

/// Remaining creditable value in the metric-level pool: the sum of all
/// claim values minus every allocation for the metric, claim-scoped or
/// pool-scoped.
pub fn pool_capacity(
    claims: &[ClaimObservation],
    allocations: &[Allocation],
    exclude: Option<DbId>,
) -> f64 {
    let claimed: f64 = claims.iter().map(|c| c.value).sum();
    let credited: f64 = allocations
        .iter()
        .filter(|a| Some(a.id) != exclude)
        .map(|a| a.credited_value)
        .sum();
    claimed - credited
}

/// Remaining creditable capacity for a claim or, with `claim_id = None`,
/// for the whole metric pool.
///
/// Fails with [`CoreError::UnknownReference`] when the named claim is not
/// in the supplied set; capacity is never silently defaulted to zero.
pub fn available_to_credit(
    claims: &[ClaimObservation],
    allocations: &[Allocation],
    claim_id: Option<DbId>,
    exclude: Option<DbId>,
) -> Result<f64, CoreError> {
    match claim_id {
        Some(id) => {
            let claim = claims
                .iter()
                .find(|c| c.id == id)
                .ok_or(CoreError::UnknownReference {
                    entity: "ImpactClaim",
                    id,
                })?;
            Ok(claim_capacity(claim.value, allocations, id, exclude))
        }
        None => Ok(pool_capacity(claims, allocations, exclude)),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate lowering a claim's value against credits already recorded.
///
/// A claim's value is effectively immutable downward once credits pin it:
/// the claim's own credits must still fit under the new value, and the
/// metric pool (total claimed minus every credit) must not go negative.
/// Raising a value can never violate conservation and always passes.
pub fn validate_claim_revaluation(
    claim_id: DbId,
    new_value: f64,
    claims: &[ClaimObservation],
    allocations: &[Allocation],
) -> Result<(), CoreError> {
    let claim_credited: f64 = allocations
        .iter()
        .filter(|a| a.claim_id == Some(claim_id))
        .map(|a| a.credited_value)
        .sum();
    if new_value + CAPACITY_EPSILON < claim_credited {
        return Err(CoreError::Conflict(format!(
            "claim value {new_value} is below the {claim_credited} already credited to it"
        )));
    }

    let claimed: f64 = claims
        .iter()
        .map(|c| if c.id == claim_id { new_value } else { c.value })
        .sum();
    let credited: f64 = allocations.iter().map(|a| a.credited_value).sum();
    if claimed + CAPACITY_EPSILON < credited {
        return Err(CoreError::Conflict(format!(
            "claim value {new_value} would drop the metric total below the {credited} already credited"
        )));
    }
    Ok(())
}

/// Validate removing a claim entirely.
///
/// Credits scoped to the claim are removed with it, but pool-scoped
/// credits stay behind: the metric's remaining claims must still cover
/// them or the deletion is rejected.
pub fn validate_claim_removal(
    claim_id: DbId,
    claims: &[ClaimObservation],
    allocations: &[Allocation],
) -> Result<(), CoreError> {
    let remaining_claimed: f64 = claims
        .iter()
        .filter(|c| c.id != claim_id)
        .map(|c| c.value)
        .sum();
    let remaining_credited: f64 = allocations
        .iter()
        .filter(|a| a.claim_id != Some(claim_id))
        .map(|a| a.credited_value)
        .sum();
    if remaining_claimed + CAPACITY_EPSILON < remaining_credited {
        return Err(CoreError::Conflict(format!(
            "removing the claim would strand {remaining_credited} credited against only \
             {remaining_claimed} still claimed"
        )));
    }
    Ok(())
}

/// Validate a proposed allocation against the conservation invariant.
///
/// On rejection the error carries the actual available amount for the
/// candidate's scope. For updates (`candidate.id` set) availability is
/// computed excluding the allocation's own prior value, so raising an
/// existing credit within capacity succeeds.
pub fn validate_allocation(
    candidate: &AllocationCandidate,
    claims: &[ClaimObservation],
    allocations: &[Allocation],
) -> Result<(), CoreError> {
    if !candidate.credited_value.is_finite() || candidate.credited_value <= 0.0 {
        return Err(CoreError::Validation(format!(
            "credited value must be a positive number, got {}",
            candidate.credited_value
        )));
    }

    let available = available_to_credit(claims, allocations, candidate.claim_id, candidate.id)?;
    if candidate.credited_value > available + CAPACITY_EPSILON {
        return Err(CoreError::OverAllocation {
            requested: candidate.credited_value,
            available: available.max(0.0),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn claim(id: DbId, value: f64) -> ClaimObservation {
        ClaimObservation {
            id,
            metric_id: 1,
            value,
            window: None,
        }
    }

    fn alloc(id: DbId, claim_id: Option<DbId>, credited_value: f64) -> Allocation {
        Allocation {
            id,
            claim_id,
            credited_value,
        }
    }

    fn candidate(claim_id: Option<DbId>, credited_value: f64) -> AllocationCandidate {
        AllocationCandidate {
            id: None,
            metric_id: 1,
            claim_id,
            credited_value,
        }
    }

    // -- capacity --

    #[test]
    fn claim_capacity_subtracts_existing_credits() {
        let allocations = vec![alloc(10, Some(5), 20.0)];
        assert_eq!(claim_capacity(30.0, &allocations, 5, None), 10.0);
    }

    #[test]
    fn claim_capacity_ignores_other_claims() {
        let allocations = vec![alloc(10, Some(6), 20.0), alloc(11, None, 5.0)];
        assert_eq!(claim_capacity(30.0, &allocations, 5, None), 30.0);
    }

    #[test]
    fn pool_capacity_counts_all_scopes() {
        let claims = vec![claim(5, 30.0), claim(6, 20.0)];
        let allocations = vec![alloc(10, Some(5), 20.0), alloc(11, None, 15.0)];
        assert_eq!(pool_capacity(&claims, &allocations, None), 15.0);
    }

    #[test]
    fn available_for_unknown_claim_is_an_error() {
        assert_matches!(
            available_to_credit(&[claim(5, 30.0)], &[], Some(99), None),
            Err(CoreError::UnknownReference {
                entity: "ImpactClaim",
                id: 99
            })
        );
    }

    // -- validation: claim scope --

    #[test]
    fn over_allocation_reports_available_amount() {
        // Claim of 30 with 20 already credited: proposing 15 more fails
        // and reports 10 available; proposing exactly 10 succeeds.
        let claims = vec![claim(5, 30.0)];
        let allocations = vec![alloc(10, Some(5), 20.0)];

        assert_matches!(
            validate_allocation(&candidate(Some(5), 15.0), &claims, &allocations),
            Err(CoreError::OverAllocation {
                requested,
                available,
            }) if requested == 15.0 && available == 10.0
        );
        assert!(validate_allocation(&candidate(Some(5), 10.0), &claims, &allocations).is_ok());
    }

    #[test]
    fn first_violating_proposal_is_rejected_not_prior_ones() {
        let claims = vec![claim(5, 30.0)];
        let mut allocations = Vec::new();
        let mut next_id = 1;

        // Successive proposals of 12 against a claim of 30: two fit,
        // the third is the first to violate and is the one rejected.
        for round in 0..3 {
            let cand = candidate(Some(5), 12.0);
            let result = validate_allocation(&cand, &claims, &allocations);
            if round < 2 {
                assert!(result.is_ok());
                allocations.push(alloc(next_id, Some(5), 12.0));
                next_id += 1;
            } else {
                assert_matches!(result, Err(CoreError::OverAllocation { available, .. })
                    if (available - 6.0).abs() < 1e-9);
            }
        }
        let total: f64 = allocations.iter().map(|a| a.credited_value).sum();
        assert!(total <= 30.0);
    }

    #[test]
    fn update_excludes_own_prior_value() {
        // Raising an existing 20-credit to 25 on a claim of 30 succeeds:
        // availability is recomputed without the allocation's old value.
        let claims = vec![claim(5, 30.0)];
        let allocations = vec![alloc(10, Some(5), 20.0)];
        let update = AllocationCandidate {
            id: Some(10),
            metric_id: 1,
            claim_id: Some(5),
            credited_value: 25.0,
        };
        assert!(validate_allocation(&update, &claims, &allocations).is_ok());

        // But an update can still overshoot the claim itself.
        let too_much = AllocationCandidate {
            credited_value: 31.0,
            ..update
        };
        assert_matches!(
            validate_allocation(&too_much, &claims, &allocations),
            Err(CoreError::OverAllocation { available, .. }) if available == 30.0
        );
    }

    // -- validation: pool scope --

    #[test]
    fn pool_allocation_bounded_by_unclaimed_remainder() {
        let claims = vec![claim(5, 30.0), claim(6, 20.0)];
        let allocations = vec![alloc(10, Some(5), 25.0)];

        // 50 claimed - 25 credited = 25 available in the pool.
        assert!(validate_allocation(&candidate(None, 25.0), &claims, &allocations).is_ok());
        assert_matches!(
            validate_allocation(&candidate(None, 26.0), &claims, &allocations),
            Err(CoreError::OverAllocation { available, .. }) if available == 25.0
        );
    }

    #[test]
    fn exact_capacity_is_not_over_allocation() {
        let claims = vec![claim(5, 30.0)];
        assert!(validate_allocation(&candidate(Some(5), 30.0), &claims, &[]).is_ok());
    }

    #[test]
    fn float_noise_within_epsilon_is_tolerated() {
        // 0.1 + 0.2 != 0.3 in binary; the epsilon keeps the difference
        // from surfacing as a spurious rejection.
        let claims = vec![claim(5, 0.3)];
        let allocations = vec![alloc(10, Some(5), 0.1)];
        assert!(validate_allocation(&candidate(Some(5), 0.2), &claims, &allocations).is_ok());
    }

    #[test]
    fn non_positive_credit_rejected() {
        let claims = vec![claim(5, 30.0)];
        assert_matches!(
            validate_allocation(&candidate(Some(5), 0.0), &claims, &[]),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            validate_allocation(&candidate(Some(5), -5.0), &claims, &[]),
            Err(CoreError::Validation(_))
        );
    }

    // -- validation: claim revaluation and removal --

    #[test]
    fn revaluation_below_claim_credits_rejected() {
        // Claim of 30 with 20 + 10 credited to it: lowering to 5 would
        // leave 30 credited against 5 claimed.
        let claims = vec![claim(5, 30.0)];
        let allocations = vec![alloc(10, Some(5), 20.0), alloc(11, Some(5), 10.0)];
        assert_matches!(
            validate_claim_revaluation(5, 5.0, &claims, &allocations),
            Err(CoreError::Conflict(_))
        );
        // Lowering to exactly the credited total is fine.
        assert!(validate_claim_revaluation(5, 30.0, &claims, &allocations).is_ok());
    }

    #[test]
    fn revaluation_that_drains_the_pool_rejected() {
        // The claim's own credits fit, but a pool credit pinned the
        // metric total: 30 + 20 claimed, 30 pool-credited, so lowering
        // either claim breaks the pool.
        let claims = vec![claim(5, 30.0), claim(6, 20.0)];
        let allocations = vec![alloc(10, None, 30.0)];
        assert_matches!(
            validate_claim_revaluation(5, 25.0, &claims, &allocations),
            Err(CoreError::Conflict(_))
        );
        // With pool headroom the same lowering passes.
        let loose = vec![alloc(10, None, 15.0)];
        assert!(validate_claim_revaluation(5, 25.0, &claims, &loose).is_ok());
    }

    #[test]
    fn raising_a_claim_value_always_passes() {
        let claims = vec![claim(5, 30.0)];
        let allocations = vec![alloc(10, Some(5), 30.0)];
        assert!(validate_claim_revaluation(5, 45.0, &claims, &allocations).is_ok());
    }

    #[test]
    fn removal_stranding_pool_credits_rejected() {
        // 30 + 20 claimed with 40 in the pool: removing the 30-claim
        // leaves 40 credited against 20 claimed.
        let claims = vec![claim(5, 30.0), claim(6, 20.0)];
        let allocations = vec![alloc(10, None, 40.0)];
        assert_matches!(
            validate_claim_removal(5, &claims, &allocations),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn removal_takes_own_scoped_credits_along() {
        // Credits scoped to the removed claim disappear with it, so they
        // never count against the remaining claims.
        let claims = vec![claim(5, 30.0), claim(6, 20.0)];
        let allocations = vec![alloc(10, Some(5), 30.0), alloc(11, None, 20.0)];
        assert!(validate_claim_removal(5, &claims, &allocations).is_ok());
    }

    #[test]
    fn deleting_an_allocation_frees_capacity() {
        // Modelled as exclusion: with allocation 10 gone, the full claim
        // value is available again.
        let claims = vec![claim(5, 30.0)];
        let allocations = vec![alloc(10, Some(5), 30.0)];
        assert_eq!(
            available_to_credit(&claims, &allocations, Some(5), Some(10)).unwrap(),
            30.0
        );
    }
}
