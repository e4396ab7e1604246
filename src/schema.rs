//! Knowledge-graph schema context
//!
//! The enumerated node/relationship vocabulary handed to every
//! prompt-consuming component. Deployments whose graph differs from the
//! default financial vocabulary swap in their own.

const FINANCIAL_SCHEMA: &str = "\
The knowledge graph contains:
- Company nodes (id, name, ticker, sector, industry, market_cap, founded_year, headquarters)
- Person nodes (id, name, title, age, nationality, education)
- Rating nodes (id, rating, rating_agency, rating_type, valid_from, valid_to)
- Transaction nodes (id, type, value, currency, status, announced_date, completed_date, description)
- RegulatoryEvent nodes (id, event_type, regulator, description, amount, currency, event_date, resolution_date, status)

Relationships:
- EMPLOYED_BY: Person -> Company (with position, start_date, end_date, salary)
- HAS_RATING: Company -> Rating
- PARTICIPATES_IN: Company -> Transaction (as acquirer)
- TARGET_OF: Company -> Transaction (as target)
- SUBJECT_TO: Company -> RegulatoryEvent";

#[derive(Debug, Clone)]
pub struct SchemaContext(String);

impl SchemaContext {
    /// Default financial entity/relationship vocabulary.
    pub fn financial() -> Self {
        Self(FINANCIAL_SCHEMA.to_string())
    }

    pub fn custom(schema: impl Into<String>) -> Self {
        Self(schema.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SchemaContext {
    fn default() -> Self {
        Self::financial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schema_names_core_vocabulary() {
        let schema = SchemaContext::default();
        assert!(schema.as_str().contains("Company"));
        assert!(schema.as_str().contains("EMPLOYED_BY"));
        assert!(schema.as_str().contains("RegulatoryEvent"));
    }

    #[test]
    fn test_custom_schema_replaces_default() {
        let schema = SchemaContext::custom("Only Widget nodes here");
        assert_eq!(schema.as_str(), "Only Widget nodes here");
    }
}
