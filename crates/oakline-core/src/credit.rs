//! # Credit Management
//!
//! Customer credit lines: limits, usage, holds and derived risk.
//!
//! `available_credit = credit_limit - used_credit` after every action, and
//! the risk level is re-derived from utilization:
//!
//! | Utilization | Risk   |
//! |-------------|--------|
//! | < 70%       | Low    |
//! | 70% – 89.99%| Medium |
//! | >= 90%      | High   |

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::list::{average_rate, count_where, sum_money, AggregateScope, AggregateValue, ListSpec};
use crate::money::{Money, Rate};
use crate::record::Record;
use crate::validation::{check_invariant, validate_non_negative, validate_positive_amount};

const HIGH_RISK_BPS: i64 = 9_000;
const MEDIUM_RISK_BPS: i64 = 7_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn for_utilization(utilization: Rate) -> RiskLevel {
        match utilization.bps() {
            bps if bps >= HIGH_RISK_BPS => RiskLevel::High,
            bps if bps >= MEDIUM_RISK_BPS => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum CreditStatus {
    Active,
    OnHold,
}

impl CreditStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CreditStatus::Active => "Active",
            CreditStatus::OnHold => "On Hold",
        }
    }
}

/// A customer's credit line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreditAccount {
    pub id: String,
    pub customer_name: String,
    pub credit_limit: Money,
    pub used_credit: Money,
    pub available_credit: Money,
    pub risk_level: RiskLevel,
    pub status: CreditStatus,
    pub payment_terms_days: u32,
}

impl CreditAccount {
    /// Share of the limit in use; zero for a zero limit.
    pub fn utilization(&self) -> Rate {
        Rate::ratio(self.used_credit, self.credit_limit).unwrap_or_default()
    }

    /// Re-derives available credit and risk.
    pub fn refresh(&mut self) {
        self.available_credit = self.credit_limit - self.used_credit;
        self.risk_level = RiskLevel::for_utilization(self.utilization());
    }

    pub fn check_invariants(&self) -> CoreResult<()> {
        check_invariant(
            &self.id,
            self.available_credit + self.used_credit == self.credit_limit,
            || {
                format!(
                    "available {} + used {} != limit {}",
                    self.available_credit, self.used_credit, self.credit_limit
                )
            },
        )?;
        check_invariant(&self.id, !self.used_credit.is_negative(), || {
            "used credit is negative".to_string()
        })?;
        check_invariant(
            &self.id,
            self.risk_level == RiskLevel::for_utilization(self.utilization()),
            || format!("risk {} disagrees with utilization {}", self.risk_level.label(), self.utilization()),
        )
    }

    fn charge(&mut self, amount: Money) -> CoreResult<()> {
        if self.status != CreditStatus::Active {
            return Err(CoreError::invalid_status(
                Self::KIND,
                &self.id,
                self.status.label(),
                "charge",
            ));
        }
        validate_positive_amount("amount", amount)?;
        if amount > self.available_credit {
            return Err(CoreError::CreditLimitExceeded {
                account_id: self.id.clone(),
                available: self.available_credit.cents(),
                requested: amount.cents(),
            });
        }
        self.used_credit += amount;
        Ok(())
    }

    fn payment(&mut self, amount: Money) -> CoreResult<()> {
        validate_positive_amount("amount", amount)?;
        if amount > self.used_credit {
            return Err(ValidationError::OutOfRange {
                field: "amount".to_string(),
                min: 1,
                max: self.used_credit.cents(),
            }
            .into());
        }
        self.used_credit -= amount;
        Ok(())
    }

    fn set_limit(&mut self, limit: Money) -> CoreResult<()> {
        validate_non_negative("creditLimit", limit)?;
        if limit < self.used_credit {
            return Err(ValidationError::OutOfRange {
                field: "creditLimit".to_string(),
                min: self.used_credit.cents(),
                max: i64::MAX,
            }
            .into());
        }
        self.credit_limit = limit;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum CreditAction {
    Charge { amount: Money },
    Payment { amount: Money },
    SetLimit { limit: Money },
    Hold,
    Release,
}

impl Record for CreditAccount {
    const KIND: &'static str = "CreditAccount";
    type Patch = CreditAction;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply_patch(&mut self, patch: CreditAction) -> CoreResult<()> {
        match patch {
            CreditAction::Charge { amount } => self.charge(amount)?,
            CreditAction::Payment { amount } => self.payment(amount)?,
            CreditAction::SetLimit { limit } => self.set_limit(limit)?,
            CreditAction::Hold => {
                if self.status == CreditStatus::OnHold {
                    return Err(CoreError::invalid_status(Self::KIND, &self.id, "On Hold", "hold"));
                }
                self.status = CreditStatus::OnHold;
            }
            CreditAction::Release => {
                if self.status == CreditStatus::Active {
                    return Err(CoreError::invalid_status(Self::KIND, &self.id, "Active", "release"));
                }
                self.status = CreditStatus::Active;
            }
        }
        self.refresh();
        self.check_invariants()
    }

    fn list_spec() -> ListSpec<Self> {
        ListSpec::<Self>::new()
            .search_field("id", |c| c.id.as_str())
            .search_field("customerName", |c| c.customer_name.as_str())
            .category("risk", |c| c.risk_level.label())
            .category("status", |c| c.status.label())
            .sort_key("customer", |a, b| a.customer_name.cmp(&b.customer_name))
            .sort_key("limit", |a, b| a.credit_limit.cmp(&b.credit_limit))
            .sort_key("utilization", |a, b| a.utilization().cmp(&b.utilization()))
            .aggregate("totalLimit", AggregateScope::All, |rows| {
                AggregateValue::Money(sum_money(rows, |c| c.credit_limit))
            })
            .aggregate("totalUsed", AggregateScope::All, |rows| {
                AggregateValue::Money(sum_money(rows, |c| c.used_credit))
            })
            .aggregate("totalAvailable", AggregateScope::All, |rows| {
                AggregateValue::Money(sum_money(rows, |c| c.available_credit))
            })
            .aggregate("highRiskCount", AggregateScope::All, |rows| {
                AggregateValue::Count(count_where(rows, |c| c.risk_level == RiskLevel::High))
            })
            .aggregate("averageUtilization", AggregateScope::Filtered, |rows| {
                AggregateValue::Rate(average_rate(rows, |c| Some(c.utilization())))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::list::ListQuery;

    fn account(id: &str) -> CreditAccount {
        fixtures::credit_accounts().into_iter().find(|c| c.id == id).unwrap()
    }

    #[test]
    fn test_risk_thresholds() {
        assert_eq!(RiskLevel::for_utilization(Rate::from_bps(6_999)), RiskLevel::Low);
        assert_eq!(RiskLevel::for_utilization(Rate::from_bps(7_000)), RiskLevel::Medium);
        assert_eq!(RiskLevel::for_utilization(Rate::from_bps(9_000)), RiskLevel::High);
    }

    #[test]
    fn test_charge_within_and_over_limit() {
        let mut cred = account("CRED-001");
        cred.apply_patch(CreditAction::Charge {
            amount: Money::from_major(4_000),
        })
        .unwrap();
        assert_eq!(cred.used_credit, Money::from_major(20_000));
        assert_eq!(cred.available_credit, Money::from_major(130_000));

        let mut tight = account("CRED-003");
        let err = tight
            .apply_patch(CreditAction::Charge {
                amount: Money::from_major(5_000),
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::CreditLimitExceeded { .. }));
        assert_eq!(tight.used_credit, Money::from_major(48_200));
    }

    #[test]
    fn test_payment_lowers_risk() {
        let mut cred = account("CRED-003");
        assert_eq!(cred.risk_level, RiskLevel::High);
        cred.apply_patch(CreditAction::Payment {
            amount: Money::from_major(12_000),
        })
        .unwrap();
        // 36,200 / 50,000 = 72.4%
        assert_eq!(cred.risk_level, RiskLevel::Medium);
        assert!(cred
            .apply_patch(CreditAction::Payment {
                amount: Money::from_major(40_000)
            })
            .is_err());
    }

    #[test]
    fn test_limit_cannot_drop_below_used() {
        let mut cred = account("CRED-002");
        assert!(cred
            .apply_patch(CreditAction::SetLimit {
                limit: Money::from_major(40_000)
            })
            .is_err());
        cred.apply_patch(CreditAction::SetLimit {
            limit: Money::from_major(45_000),
        })
        .unwrap();
        assert_eq!(cred.available_credit, Money::from_major(2_500));
        assert_eq!(cred.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_hold_blocks_charges() {
        let mut cred = account("CRED-004");
        cred.apply_patch(CreditAction::Hold).unwrap();
        assert!(cred
            .apply_patch(CreditAction::Charge {
                amount: Money::from_major(10)
            })
            .is_err());
        cred.apply_patch(CreditAction::Release).unwrap();
        assert!(cred
            .apply_patch(CreditAction::Charge {
                amount: Money::from_major(10)
            })
            .is_ok());
    }

    #[test]
    fn test_zero_limit_utilization_is_zero() {
        let mut cred = account("CRED-004");
        cred.apply_patch(CreditAction::SetLimit { limit: Money::zero() }).unwrap();
        assert_eq!(cred.utilization(), Rate::zero());
        assert_eq!(cred.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_list_aggregates() {
        let accounts = fixtures::credit_accounts();
        let page = CreditAccount::list_spec().view(&accounts, &ListQuery::default());
        assert_eq!(
            page.aggregate("totalLimit").and_then(|v| v.as_money()),
            Some(Money::from_major(375_000))
        );
        assert_eq!(page.aggregate("highRiskCount").and_then(|v| v.as_count()), Some(1));
    }
}
