//! Result accumulation and deduplication
//!
//! Owns the running entity/relationship sets for the duration of one
//! retrieval run. Entities deduplicate by id (first discovery wins, order
//! preserved); relationships are kept verbatim — the same edge seen on two
//! hops may carry different evidence.

use crate::models::{Entity, GraphResultSet, Relationship};
use crate::Result;
use serde_json::json;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct ResultAccumulator {
    entities: Vec<Entity>,
    relationships: Vec<Relationship>,
}

impl ResultAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one hop's results into the running sets.
    pub fn absorb(&mut self, results: GraphResultSet) {
        self.entities.extend(results.entities);
        self.relationships.extend(results.relationships);
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.relationships.is_empty()
    }

    /// Compact JSON summary of everything accumulated so far, used as
    /// step-local context when generating the next hop's query.
    pub fn context_summary(&self) -> Result<String> {
        let entities: Vec<_> = self
            .entities
            .iter()
            .map(|e| json!({ "id": e.id, "label": e.label, "properties": e.properties }))
            .collect();
        let relationships: Vec<_> = self
            .relationships
            .iter()
            .map(|r| json!({ "from_id": r.from_id, "to_id": r.to_id, "label": r.label }))
            .collect();

        Ok(serde_json::to_string(&json!({
            "entities": entities,
            "relationships": relationships,
        }))?)
    }

    /// Final sets for the caller: entities deduplicated by id, edges as-is.
    pub fn finish(self) -> (Vec<Entity>, Vec<Relationship>) {
        (dedup_entities(self.entities), self.relationships)
    }
}

/// First occurrence of each id wins; discovery order is preserved.
pub fn dedup_entities(entities: Vec<Entity>) -> Vec<Entity> {
    let mut seen = HashSet::new();
    entities
        .into_iter()
        .filter(|e| seen.insert(e.id.clone()))
        .collect()
}
