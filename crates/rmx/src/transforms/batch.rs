// ai
//! 🏭 Route Batch Transformer — one operation, every route, order preserved.
//!
//! 🎬 COLD OPEN — INT. ASSEMBLY LINE — NIGHT SHIFT
//!
//! Routes roll in on the left. Each one gets the same treatment. Most roll out
//! on the right, in the same order they came in. A few don't:
//!
//! - 🗑️ **dropped**: a queue operation left the route with zero targets. A route
//!   with nowhere to go can't be resubmitted, so it quietly leaves the line.
//! - 💀 **failed**: the operation refused one of its targets (malformed name).
//!   The route is skipped, the reason is written down, and the line keeps moving.
//!   Skipped routes are never submitted, so the remote copy stays as it was.
//!
//! Pure. No I/O. No shared state. Run it twice, get the same answer twice.
//! Run two of them on two threads, get two answers and zero locks. 🦆

use tracing::{debug, warn};

use super::{MigrationContext, Operation, TransformTarget};
use crate::common::Route;
use crate::error::TransformError;

/// 💀 A route the operation refused, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteFailure {
    pub uuid: String,
    pub name: String,
    pub error: TransformError,
}

/// 📦 What came out of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// ✅ retained routes, in input order, none with an empty queue list
    pub routes: Vec<Route>,
    /// 🗑️ uuids of routes excluded because their queue list came out empty
    pub dropped: Vec<String>,
    /// 💀 routes skipped because the operation failed on them
    pub failed: Vec<RouteFailure>,
}

/// 🏭 Applies one [`Operation`] across a route collection.
#[derive(Debug, Clone)]
pub struct RouteBatchTransformer {
    operation: Operation,
    context: MigrationContext,
}

impl RouteBatchTransformer {
    pub fn new(operation: Operation, context: MigrationContext) -> Self {
        Self { operation, context }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// 🔄 Run the operation over every route, returning survivors in their original order.
    pub fn apply(&self, routes: &[Route]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for route in routes {
            match self.operation.apply(route, &self.context) {
                Ok(candidate)
                    if self.operation.target() == TransformTarget::Queues
                        && candidate.queues.is_empty() =>
                {
                    warn!(
                        "🗑️ route '{}' ({}) has no targets left after {}, dropping it",
                        route.name, route.uuid, self.operation
                    );
                    outcome.dropped.push(route.uuid.clone());
                }
                Ok(candidate) => {
                    if candidate != *route {
                        debug!("🔄 {} rewrote route '{}' ({})", self.operation, route.name, route.uuid);
                    }
                    outcome.routes.push(candidate);
                }
                Err(error) => {
                    warn!(
                        "💀 {} failed on route '{}' ({}): {}. skipping it, the remote copy stays untouched",
                        self.operation, route.name, route.uuid, error
                    );
                    outcome.failed.push(RouteFailure {
                        uuid: route.uuid.clone(),
                        name: route.name.clone(),
                        error,
                    });
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::RoutesList;
    use anyhow::Result;

    fn the_transformer(operation: Operation) -> RouteBatchTransformer {
        RouteBatchTransformer::new(operation, MigrationContext::new("dev"))
    }

    fn the_route(name: &str, rule: &str, queues: &[&str]) -> Route {
        Route {
            uuid: format!("uuid-{name}"),
            name: name.to_string(),
            rule: rule.to_string(),
            description: String::new(),
            enabled: true,
            queues: queues.iter().map(|q| q.to_string()).collect(),
            created_date: "2023-03-28".to_string(),
            modified_date: "2023-03-28".to_string(),
        }
    }

    const ELEND_RULE: &str = r#"emxSourceSystem=="cars" && emxSourceEnvironment=="stage" && emxDatatype=="vendor""#;

    #[test]
    fn the_one_where_the_production_document_becomes_endpoints() -> Result<()> {
        let the_document = r#"{
          "routesList":[
            {
              "uuid": "32354541274",
              "name": "Elend",
              "rule": "emxSourceSystem==\"cars\" && emxSourceEnvironment==\"stage\" && emxDatatype==\"vendor\"",
              "description": "",
              "enabled": true,
              "queues": ["emx-to-scms-stage", "emx-trash", "emx-to-archive-core", "emx-to-emx-healthcheck", "emx-to-cfis-dev:skim", "scms#test", "emx-to-cfis-test;"],
              "createdDate": "2023-03-28",
              "modifiedDate": "2023-03-28"
            }
          ]
        }"#;
        let the_routes = RoutesList::parse(the_document)?.routes;
        let the_outcome = the_transformer(Operation::EncodeQueues).apply(&the_routes);

        assert_eq!(the_outcome.routes.len(), 1);
        let the_route = &the_outcome.routes[0];
        assert_eq!(
            the_route.queues,
            vec![
                "scms#stage",
                "emx-core-trash#dev",
                "emx-core-archive#dev",
                "emx-core-healthcheck#dev",
                "cfis#dev%3Askim",
                "scms#test",
                "cfis#test%3B",
            ]
        );
        assert_eq!(the_route.name, "Elend");
        assert_eq!(the_route.uuid, "32354541274");
        assert!(the_route.description.is_empty());
        assert!(the_route.enabled);
        assert!(the_route.rule.contains("emxSourceEnvironment"));
        assert_eq!(the_route.created_date, "2023-03-28");
        assert_eq!(the_route.modified_date, "2023-03-28");
        Ok(())
    }

    #[test]
    fn the_one_where_routes_with_no_targets_leave_the_line() {
        let the_routes = vec![
            the_route("Elend", ELEND_RULE, &["emx-to-scms-stage"]),
            the_route("Nobody", ELEND_RULE, &[]),
            the_route("Vin", ELEND_RULE, &["emx-trash"]),
        ];
        let the_outcome = the_transformer(Operation::EncodeQueues).apply(&the_routes);

        let the_names: Vec<&str> = the_outcome.routes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(the_names, vec!["Elend", "Vin"]);
        assert_eq!(the_outcome.dropped, vec!["uuid-Nobody"]);
        assert!(the_outcome.routes.iter().all(|r| !r.queues.is_empty()));
    }

    #[test]
    fn the_one_where_rule_operations_never_drop_a_route() {
        let the_routes = vec![the_route("Nobody", ELEND_RULE, &[])];
        let the_outcome = the_transformer(Operation::HeadersToStructured).apply(&the_routes);
        assert_eq!(the_outcome.routes.len(), 1);
        assert!(the_outcome.dropped.is_empty());
    }

    #[test]
    fn the_one_where_one_malformed_queue_skips_only_its_own_route() {
        let the_routes = vec![
            the_route("Rand", ELEND_RULE, &["emx-to-scms-stage"]),
            the_route("Mat", ELEND_RULE, &["emx-to-scms-stage", "emx-stage"]),
            the_route("Perrin", ELEND_RULE, &["emx-to-cmiss-prod"]),
        ];
        let the_outcome = the_transformer(Operation::EncodeQueues).apply(&the_routes);

        let the_names: Vec<&str> = the_outcome.routes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(the_names, vec!["Rand", "Perrin"]);
        assert_eq!(the_outcome.failed.len(), 1);
        assert_eq!(the_outcome.failed[0].name, "Mat");
        assert_eq!(
            the_outcome.failed[0].error,
            TransformError::MalformedTarget {
                target: "emx-stage".to_string(),
                reason: "a queue name needs at least 4 hyphen-separated segments (prefix, system, environment), found 2".to_string(),
            }
        );
    }

    #[test]
    fn the_one_where_headers_swap_dialects_and_endpoint_rules_stay_put() {
        let the_routes = vec![
            the_route("Elend", ELEND_RULE, &["scms#stage", "emx-core-trash#dev"]),
            the_route("Rand", r#"endpoint=="cars#stage/vendor""#, &["scms#stage"]),
        ];
        let the_outcome = the_transformer(Operation::HeadersToStructured).apply(&the_routes);

        assert_eq!(
            the_outcome.routes[0].rule,
            r#"endpoint.system=="cars" && endpoint.env=="stage" && emxDatatype=="vendor""#
        );
        assert_eq!(the_outcome.routes[0].queues, vec!["scms#stage", "emx-core-trash#dev"]);
        assert_eq!(the_outcome.routes[1].rule, r#"endpoint=="cars#stage/vendor""#);

        let the_way_back = the_transformer(Operation::HeadersToLegacy).apply(&the_outcome.routes);
        assert_eq!(the_way_back.routes, the_routes);
    }

    #[test]
    fn the_one_where_the_whole_cast_gets_expanded_then_collapsed() {
        let the_routes = vec![
            the_route("Elend", ELEND_RULE, &["scms#stage"]),
            the_route("Rand", r#"endpoint=="cars#stage/vendor""#, &["scms#stage"]),
            the_route("Mat", r#"endpoint=="ews-payment#test" && s3.object.path=="joe/bob""#, &["scms#stage"]),
            the_route("Egwene", r#"(objectType=="Person" || objectType=="Unit") && endpoint=="cmiss#prod/raw""#, &["scms#stage"]),
            the_route("Vin", r#"(endpoint=="cars/vendor#stage" || endpoint=="cars#stage/vendor")"#, &["scms#stage"]),
        ];

        let the_expanded = the_transformer(Operation::ExpandEndpointPattern).apply(&the_routes);
        let the_rules: Vec<&str> = the_expanded.routes.iter().map(|r| r.rule.as_str()).collect();
        assert_eq!(
            the_rules,
            vec![
                ELEND_RULE,
                r#"(endpoint=="cars/vendor#stage" || endpoint=="cars#stage/vendor")"#,
                r#"endpoint=="ews-payment#test" && s3.object.path=="joe/bob""#,
                r#"(objectType=="Person" || objectType=="Unit") && (endpoint=="cmiss/raw#prod" || endpoint=="cmiss#prod/raw")"#,
                r#"(endpoint=="cars/vendor#stage" || endpoint=="cars#stage/vendor")"#,
            ]
        );

        let the_collapsed = the_transformer(Operation::CollapseEndpointPattern).apply(&the_expanded.routes);
        let the_rules: Vec<&str> = the_collapsed.routes.iter().map(|r| r.rule.as_str()).collect();
        assert_eq!(
            the_rules,
            vec![
                ELEND_RULE,
                r#"endpoint=="cars/vendor#stage""#,
                r#"endpoint=="ews-payment#test" && s3.object.path=="joe/bob""#,
                r#"(objectType=="Person" || objectType=="Unit") && endpoint=="cmiss/raw#prod""#,
                r#"endpoint=="cars/vendor#stage""#,
            ]
        );
    }

    #[test]
    fn the_one_where_qualifier_targets_converge() {
        let the_routes = vec![
            the_route("Elend", ELEND_RULE, &["scms#stage", "emx-core-trash#dev"]),
            the_route("Rand", ELEND_RULE, &["scms#stage", "crm-aveng#stage/cmiss"]),
            the_route("Thom", ELEND_RULE, &["crm-aveng#stage/cmiss", "crm-central-america/cmiss#stage"]),
        ];
        let the_outcome = the_transformer(Operation::NormalizeQualifiers).apply(&the_routes);

        assert_eq!(the_outcome.routes.len(), 3);
        assert_eq!(the_outcome.routes[0].queues, vec!["scms#stage", "emx-core-trash#dev"]);
        assert_eq!(the_outcome.routes[1].queues, vec!["scms#stage", "crm-aveng/cmiss#stage"]);
        assert_eq!(
            the_outcome.routes[2].queues,
            vec!["crm-aveng/cmiss#stage", "crm-central-america/cmiss#stage"]
        );
    }

    #[test]
    fn the_one_where_applying_twice_gives_the_same_answer_twice() {
        let the_routes = vec![the_route("Rand", ELEND_RULE, &["emx-to-scms-stage", "emx-trash"])];
        let the_transformer = the_transformer(Operation::EncodeQueues);
        assert_eq!(the_transformer.apply(&the_routes), the_transformer.apply(&the_routes));
    }
}
