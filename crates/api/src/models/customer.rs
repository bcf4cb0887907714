//! Customer domain models.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crm_core::{CustomerId, Email};

use super::page::Keyed;

/// A stored customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Unique customer ID.
    pub id: CustomerId,
    /// Display name.
    pub name: String,
    /// Globally unique email address.
    pub email: Email,
    /// Optional phone number, never an empty string.
    pub phone: Option<String>,
    /// When the customer was created.
    pub created_at: DateTime<Utc>,
}

impl Keyed for Customer {
    fn key(&self) -> i32 {
        self.id.as_i32()
    }
}

/// A validated customer ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
}

/// Arguments of `createCustomer` and one item of `bulkCreateCustomers`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCustomerInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl CreateCustomerInput {
    /// Convenience constructor used by the seeder and tests.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: Option<&str>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.map(String::from),
        }
    }
}

/// How `bulkCreateCustomers` treats a batch with rejected items.
///
/// Rejected items are always reported in the `errors` list; the policy only
/// decides what happens to the items that passed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, juniper::GraphQLEnum)]
#[serde(rename_all = "snake_case")]
pub enum BulkPolicy {
    /// Commit every valid item; rejected items are skipped.
    #[default]
    Partial,
    /// Commit nothing if any item was rejected.
    AllOrNothing,
}

impl FromStr for BulkPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "partial" => Ok(Self::Partial),
            "all_or_nothing" | "all-or-nothing" | "atomic" => Ok(Self::AllOrNothing),
            other => Err(format!(
                "unknown bulk policy '{other}' (expected 'partial' or 'all_or_nothing')"
            )),
        }
    }
}

/// Result of a bulk creation, both lists in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkCreateOutcome {
    pub customers: Vec<Customer>,
    pub errors: Vec<String>,
}

/// Criteria for listing customers. Unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CustomerFilter {
    /// Case-insensitive substring of the name.
    pub name_icontains: Option<String>,
    /// Case-insensitive substring of the email.
    pub email_icontains: Option<String>,
    /// Phone prefix, e.g. `+1`.
    pub phone_starts_with: Option<String>,
    pub created_at_gte: Option<DateTime<Utc>>,
    pub created_at_lte: Option<DateTime<Utc>>,
}

impl CustomerFilter {
    /// Whether `customer` satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, customer: &Customer) -> bool {
        contains_ci(self.name_icontains.as_deref(), &customer.name)
            && contains_ci(self.email_icontains.as_deref(), customer.email.as_str())
            && self.phone_starts_with.as_deref().is_none_or(|prefix| {
                customer
                    .phone
                    .as_deref()
                    .is_some_and(|phone| phone.starts_with(prefix))
            })
            && self
                .created_at_gte
                .is_none_or(|from| customer.created_at >= from)
            && self
                .created_at_lte
                .is_none_or(|to| customer.created_at <= to)
    }
}

/// Case-insensitive substring match; an unset needle matches everything.
pub(crate) fn contains_ci(needle: Option<&str>, haystack: &str) -> bool {
    needle.is_none_or(|n| haystack.to_lowercase().contains(&n.to_lowercase()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn customer(name: &str, email: &str, phone: Option<&str>) -> Customer {
        Customer {
            id: CustomerId::new(1),
            name: name.to_string(),
            email: Email::parse(email).unwrap(),
            phone: phone.map(String::from),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_bulk_policy_from_str() {
        assert_eq!("partial".parse::<BulkPolicy>().unwrap(), BulkPolicy::Partial);
        assert_eq!(
            "ALL_OR_NOTHING".parse::<BulkPolicy>().unwrap(),
            BulkPolicy::AllOrNothing
        );
        assert!("sometimes".parse::<BulkPolicy>().is_err());
    }

    #[test]
    fn test_filter_name_is_case_insensitive() {
        let alice = customer("Alice Smith", "alice@example.com", None);
        let filter = CustomerFilter {
            name_icontains: Some("SMITH".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&alice));
    }

    #[test]
    fn test_filter_phone_prefix_requires_phone() {
        let with_phone = customer("Bob", "bob@example.com", Some("+1234567890"));
        let without = customer("Carol", "carol@example.com", None);
        let filter = CustomerFilter {
            phone_starts_with: Some("+1".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&with_phone));
        assert!(!filter.matches(&without));
    }

    #[test]
    fn test_filter_created_range_is_inclusive() {
        let c = customer("Dana", "dana@example.com", None);
        let filter = CustomerFilter {
            created_at_gte: Some(c.created_at),
            created_at_lte: Some(c.created_at),
            ..Default::default()
        };
        assert!(filter.matches(&c));
    }
}
