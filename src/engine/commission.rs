// ==========================================
// Realty Ledger - Commission Calculator
// ==========================================
// Resolves which roles participate in a sale's commission, derives
// the aggregate factor, and splits per-installment commission
// across the participating roles.
//
// A broker tied to a development uses that development's role table
// for their category. A broker with no development ("independent")
// gets a single virtual role carrying their personal percentage,
// falling back to the category default.
// ==========================================

use crate::config::ImportConfig;
use crate::domain::{Broker, BrokerCategory, CommissionAllocation, Development, Role};
use crate::resolver::normalize_name;
use uuid::Uuid;

pub const INDEPENDENT_ROLE_NAME: &str = "Independent Broker";

/// Roles participating in this sale's commission split.
///
/// A development-linked broker uses the development's role table
/// for their category, even when that filter yields nothing — an
/// empty role table means a zero commission factor, not a silent
/// fallback. The virtual role exists only for independent brokers
/// (or sales carrying no development).
pub fn applicable_roles(
    development: Option<&Development>,
    broker: &Broker,
    config: &ImportConfig,
) -> Vec<Role> {
    if let Some(dev) = development {
        if !broker.is_independent() {
            return dev.roles_for_category(broker.category);
        }
    }

    vec![Role {
        name: INDEPENDENT_ROLE_NAME.to_string(),
        category: broker.category,
        percentage: personal_pct_or_default(broker, config),
    }]
}

fn personal_pct_or_default(broker: &Broker, config: &ImportConfig) -> f64 {
    broker.personal_commission_pct.unwrap_or(match broker.category {
        BrokerCategory::Internal => config.default_internal_commission_pct,
        BrokerCategory::External => config.default_external_commission_pct,
    })
}

/// Aggregate commission factor: the sum of all role percentages,
/// as a fraction of the sale price.
pub fn commission_factor(roles: &[Role]) -> f64 {
    roles.iter().map(|r| r.percentage).sum::<f64>() / 100.0
}

pub fn total_commission(sale_price: f64, roles: &[Role]) -> f64 {
    sale_price * commission_factor(roles)
}

/// The broker's own share of the total commission. Looks for the
/// role that names the broker position; independent brokers fall
/// through to their personal percentage.
pub fn broker_own_commission(
    sale_price: f64,
    roles: &[Role],
    broker: &Broker,
    config: &ImportConfig,
) -> f64 {
    // Normalized comparison so "Autônomo" matches "autonomo".
    let broker_role = roles.iter().find(|r| {
        let name = normalize_name(&r.name);
        name.contains("broker") || name.contains("corretor") || name.contains("autonomo")
    });

    match broker_role {
        Some(role) => sale_price * role.percentage / 100.0,
        None => sale_price * personal_pct_or_default(broker, config) / 100.0,
    }
}

/// One allocation row per participating role.
pub fn build_allocations(sale_id: &str, sale_price: f64, roles: &[Role]) -> Vec<CommissionAllocation> {
    roles
        .iter()
        .map(|role| CommissionAllocation {
            id: Uuid::new_v4().to_string(),
            sale_id: sale_id.to_string(),
            role_name: role.name.clone(),
            percentage: role.percentage,
            amount: sale_price * role.percentage / 100.0,
        })
        .collect()
}

/// Commission carried by a single installment.
pub fn installment_commission(amount: f64, factor: f64) -> f64 {
    amount * factor
}

/// Split one installment's stored commission across the roles,
/// proportional to their percentages. The last share absorbs the
/// rounding remainder so the parts always sum to `stored`.
pub fn split_installment_commission(
    stored: f64,
    allocations: &[CommissionAllocation],
) -> Vec<(String, f64)> {
    let total_pct: f64 = allocations.iter().map(|a| a.percentage).sum();
    if total_pct <= 0.0 || allocations.is_empty() {
        return Vec::new();
    }

    let mut shares: Vec<(String, f64)> = allocations
        .iter()
        .map(|a| (a.role_name.clone(), stored * a.percentage / total_pct))
        .collect();

    let assigned: f64 = shares.iter().map(|(_, v)| v).sum();
    if let Some(last) = shares.last_mut() {
        last.1 += stored - assigned;
    }
    shares
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ImportConfig {
        ImportConfig::default()
    }

    fn broker(category: BrokerCategory, development_id: Option<&str>) -> Broker {
        Broker {
            id: "b1".to_string(),
            name: "Jane Doe".to_string(),
            category,
            personal_commission_pct: None,
            development_id: development_id.map(str::to_string),
            role_name: None,
        }
    }

    fn role(name: &str, category: BrokerCategory, percentage: f64) -> Role {
        Role {
            name: name.to_string(),
            category,
            percentage,
        }
    }

    #[test]
    fn test_development_roles_drive_factor() {
        let dev = Development {
            id: "d1".to_string(),
            name: "Ocean View".to_string(),
            roles: vec![
                role("Broker", BrokerCategory::External, 4.0),
                role("Manager", BrokerCategory::Internal, 1.0),
            ],
        };
        let b = broker(BrokerCategory::External, Some("d1"));

        let roles = applicable_roles(Some(&dev), &b, &config());
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].name, "Broker");

        // 500k at 4% -> factor 0.04, total 20k.
        assert!((commission_factor(&roles) - 0.04).abs() < 1e-12);
        assert!((total_commission(500_000.0, &roles) - 20_000.0).abs() < 1e-9);

        // Signal of 10k carries 400; a 1k installment carries 40.
        let factor = commission_factor(&roles);
        assert!((installment_commission(10_000.0, factor) - 400.0).abs() < 1e-9);
        assert!((installment_commission(1_000.0, factor) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_independent_broker_gets_virtual_role() {
        let b = broker(BrokerCategory::External, None);
        let roles = applicable_roles(None, &b, &config());
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].name, INDEPENDENT_ROLE_NAME);
        assert_eq!(roles[0].percentage, 4.0);

        let internal = broker(BrokerCategory::Internal, None);
        let roles = applicable_roles(None, &internal, &config());
        assert_eq!(roles[0].percentage, 2.5);
    }

    #[test]
    fn test_personal_percentage_overrides_default() {
        let mut b = broker(BrokerCategory::External, None);
        b.personal_commission_pct = Some(5.5);
        let roles = applicable_roles(None, &b, &config());
        assert_eq!(roles[0].percentage, 5.5);
    }

    #[test]
    fn test_empty_category_roles_mean_zero_factor() {
        // Development with roles only for the other category: the
        // linked broker gets no fallback, the split is empty.
        let dev = Development {
            id: "d1".to_string(),
            name: "Harbor Point".to_string(),
            roles: vec![role("Manager", BrokerCategory::Internal, 1.0)],
        };
        let b = broker(BrokerCategory::External, Some("d1"));
        let roles = applicable_roles(Some(&dev), &b, &config());
        assert!(roles.is_empty());
        assert_eq!(commission_factor(&roles), 0.0);
        assert_eq!(total_commission(500_000.0, &roles), 0.0);
        // The broker's own commission still falls back to the
        // personal/category percentage.
        let own = broker_own_commission(500_000.0, &roles, &b, &config());
        assert!((own - 20_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_broker_own_commission_picks_broker_role() {
        let roles = vec![
            role("Corretor", BrokerCategory::External, 4.0),
            role("Coordenador", BrokerCategory::External, 1.0),
        ];
        let b = broker(BrokerCategory::External, Some("d1"));
        let own = broker_own_commission(500_000.0, &roles, &b, &config());
        assert!((own - 20_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_broker_own_commission_matches_accented_role_names() {
        let roles = vec![role("Autônomo", BrokerCategory::External, 6.0)];
        let b = broker(BrokerCategory::External, Some("d1"));
        let own = broker_own_commission(100_000.0, &roles, &b, &config());
        assert!((own - 6_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_allocations_sum_to_total() {
        let roles = vec![
            role("Broker", BrokerCategory::External, 4.0),
            role("Manager", BrokerCategory::External, 1.5),
        ];
        let allocations = build_allocations("s1", 200_000.0, &roles);
        assert_eq!(allocations.len(), 2);
        let sum: f64 = allocations.iter().map(|a| a.amount).sum();
        assert!((sum - total_commission(200_000.0, &roles)).abs() < 1e-9);
    }

    #[test]
    fn test_split_reconciles_to_stored_amount() {
        let allocations = vec![
            CommissionAllocation {
                id: "a1".to_string(),
                sale_id: "s1".to_string(),
                role_name: "Broker".to_string(),
                percentage: 4.0,
                amount: 0.0,
            },
            CommissionAllocation {
                id: "a2".to_string(),
                sale_id: "s1".to_string(),
                role_name: "Manager".to_string(),
                percentage: 1.0,
                amount: 0.0,
            },
        ];
        let shares = split_installment_commission(50.0, &allocations);
        assert_eq!(shares.len(), 2);
        assert!((shares[0].1 - 40.0).abs() < 1e-9);
        let sum: f64 = shares.iter().map(|(_, v)| v).sum();
        assert!((sum - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_split_with_no_roles_is_empty() {
        assert!(split_installment_commission(50.0, &[]).is_empty());
    }
}
