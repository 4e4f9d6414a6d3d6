//! Association rules mined by the backend ("customers who bought X also
//! bought Y").
//!
//! Rules arrive as strings of the form `"12 -> 7"`. The right-hand side may
//! name several products separated by commas.

use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// Separator between the two sides of a rule.
const ARROW: &str = " -> ";

/// One mined rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationRule {
    pub rule: String,
    #[serde(default)]
    pub support: Option<f64>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub lift: Option<f64>,
}

impl AssociationRule {
    #[must_use]
    pub fn new(rule: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            support: None,
            confidence: None,
            lift: None,
        }
    }

    /// Left and right side of the rule, trimmed. `None` when the arrow is
    /// missing or either side is empty.
    #[must_use]
    pub fn sides(&self) -> Option<(&str, &str)> {
        let (lhs, rhs) = self.rule.split_once(ARROW)?;
        let (lhs, rhs) = (lhs.trim(), rhs.trim());
        if lhs.is_empty() || rhs.is_empty() {
            return None;
        }
        Some((lhs, rhs))
    }
}

/// Products the rules associate with `product`, without duplicates, in the
/// order they first appear. Rules that do not parse are skipped.
#[must_use]
pub fn related_product_ids(rules: &[AssociationRule], product: ProductId) -> Vec<ProductId> {
    let key = product.to_string();
    let mut related: Vec<ProductId> = Vec::new();

    let candidates = rules
        .iter()
        .filter_map(AssociationRule::sides)
        .filter(|(lhs, _)| *lhs == key)
        .flat_map(|(_, rhs)| rhs.split(','))
        .filter_map(|id| id.parse::<ProductId>().ok());

    for id in candidates {
        if id != product && !related.contains(&id) {
            related.push(id);
        }
    }
    related
}

/// Related products for the detail page: the member's own rules first, the
/// shop-wide rules when the member's yield nothing.
#[must_use]
pub fn recommend_for(
    product: ProductId,
    member_rules: &[AssociationRule],
    global_rules: &[AssociationRule],
) -> Vec<ProductId> {
    let own = related_product_ids(member_rules, product);
    if own.is_empty() {
        related_product_ids(global_rules, product)
    } else {
        own
    }
}

/// Comma-joined id list for the `ids` query parameter.
#[must_use]
pub fn ids_param(ids: &[ProductId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rules(raw: &[&str]) -> Vec<AssociationRule> {
        raw.iter().map(|r| AssociationRule::new(*r)).collect()
    }

    #[test]
    fn test_sides() {
        assert_eq!(AssociationRule::new("1 -> 2").sides(), Some(("1", "2")));
        assert_eq!(AssociationRule::new("1->2").sides(), None);
        assert_eq!(AssociationRule::new(" -> 2").sides(), None);
    }

    #[test]
    fn test_related_ids_dedupe_and_skip_malformed() {
        let rules = rules(&["4 -> 7", "4 -> 2,7", "garbage", "5 -> 9", "4 -> x", "4 -> 4"]);
        let ids = related_product_ids(&rules, ProductId::new(4));
        assert_eq!(ids, vec![ProductId::new(7), ProductId::new(2)]);
    }

    #[test]
    fn test_member_rules_take_precedence() {
        let mine = rules(&["1 -> 3"]);
        let all = rules(&["1 -> 5"]);
        assert_eq!(recommend_for(ProductId::new(1), &mine, &all), vec![ProductId::new(3)]);
    }

    #[test]
    fn test_falls_back_to_global_rules() {
        let mine = rules(&["2 -> 3"]);
        let all = rules(&["1 -> 5", "1 -> 6"]);
        let ids = recommend_for(ProductId::new(1), &mine, &all);
        assert_eq!(ids_param(&ids), "5,6");
    }

    #[test]
    fn test_rule_deserializes_with_metrics() {
        let rule: AssociationRule =
            serde_json::from_str(r#"{"rule":"3 -> 8","confidence":0.75,"lift":1.2}"#).unwrap();
        assert_eq!(rule.sides(), Some(("3", "8")));
        assert_eq!(rule.support, None);
    }
}
