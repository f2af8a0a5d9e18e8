//! Admission adapter
//!
//! Turns AdmissionReview requests for Seeds into allow/deny responses. The
//! HTTP side (server, TLS, webhook registration) belongs to the hosting
//! infrastructure; this module only maps requests to decisions.

use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation};
use kube::core::DynamicObject;
use tracing::{debug, error, warn};

use crate::validator::SeedValidator;

/// Decide a single admission request.
///
/// Create and update requests are validated; delete and connect requests
/// pass through. Denials carry the validation error text as the message and
/// [`ValidationError::reason`](crate::ValidationError::reason) as the status reason.
pub fn review(
    validator: &SeedValidator,
    request: &AdmissionRequest<DynamicObject>,
) -> AdmissionResponse {
    let uid = &request.uid;

    let old = match request.operation {
        Operation::Create => None,
        Operation::Update => match request.old_object.as_ref() {
            Some(old) => Some(old),
            None => {
                // Falling back to create rules would skip the never-disable check
                warn!(uid = %uid, name = %request.name, "Update request has no old object");
                return AdmissionResponse::from(request)
                    .deny("admission request for update has no old object");
            }
        },
        Operation::Delete | Operation::Connect => {
            debug!(
                uid = %uid,
                operation = ?request.operation,
                "Operation not validated, allowing"
            );
            return AdmissionResponse::from(request);
        }
    };

    let Some(new) = request.object.as_ref() else {
        warn!(uid = %uid, name = %request.name, "Admission request has no object");
        return AdmissionResponse::from(request).deny("admission request has no object");
    };

    match validator.validate(new, old) {
        Ok(()) => AdmissionResponse::from(request),
        Err(e) => {
            debug!(
                uid = %uid,
                name = %request.name,
                reason = e.reason(),
                "Denying admission request"
            );
            let mut response = AdmissionResponse::from(request).deny(e.to_string());
            response.result.reason = e.reason().to_string();
            response
        }
    }
}

/// Decide a full AdmissionReview, answering malformed reviews as invalid
pub fn review_admission(
    validator: &SeedValidator,
    body: AdmissionReview<DynamicObject>,
) -> AdmissionReview<DynamicObject> {
    let request: AdmissionRequest<DynamicObject> = match body.try_into() {
        Ok(req) => req,
        Err(e) => {
            error!(error = %e, "Failed to parse admission request");
            return AdmissionResponse::invalid(e.to_string()).into_review();
        }
    };

    review(validator, &request).into_review()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn seed(provider_config: Option<Value>) -> Value {
        let mut backup = json!({ "provider": "gcp" });
        if let Some(config) = provider_config {
            backup["providerConfig"] = config;
        }
        json!({
            "apiVersion": "core.gardener.cloud/v1beta1",
            "kind": "Seed",
            "metadata": { "name": "gcp-eu1" },
            "spec": { "backup": backup }
        })
    }

    fn settings(period: &str) -> Value {
        json!({ "immutableSettings": { "retentionType": "bucket", "retentionPeriod": period } })
    }

    fn admission_review(
        operation: &str,
        object: Option<Value>,
        old: Option<Value>,
    ) -> AdmissionReview<DynamicObject> {
        let mut request = json!({
            "uid": "7f5a3c1e-0000-4000-8000-000000000001",
            "kind": { "group": "core.gardener.cloud", "version": "v1beta1", "kind": "Seed" },
            "resource": { "group": "core.gardener.cloud", "version": "v1beta1", "resource": "seeds" },
            "name": "gcp-eu1",
            "operation": operation,
            "userInfo": { "username": "admin" },
            "dryRun": false
        });
        if let Some(object) = object {
            request["object"] = object;
        }
        if let Some(old) = old {
            request["oldObject"] = old;
        }
        serde_json::from_value(json!({
            "apiVersion": "admission.k8s.io/v1",
            "kind": "AdmissionReview",
            "request": request
        }))
        .expect("valid admission review")
    }

    fn decide(operation: &str, object: Option<Value>, old: Option<Value>) -> AdmissionResponse {
        let request: AdmissionRequest<DynamicObject> = admission_review(operation, object, old)
            .try_into()
            .expect("review has a request");
        review(&SeedValidator::new(), &request)
    }

    fn response_json(response: &AdmissionResponse) -> String {
        serde_json::to_string(response).expect("response serializes")
    }

    #[test]
    fn test_create_valid_is_allowed() {
        let response = decide("CREATE", Some(seed(Some(settings("96h")))), None);
        assert!(response.allowed);
    }

    #[test]
    fn test_update_reducing_period_is_denied_with_message() {
        let response = decide(
            "UPDATE",
            Some(seed(Some(settings("48h")))),
            Some(seed(Some(settings("96h")))),
        );
        assert!(!response.allowed);
        assert!(response_json(&response).contains("reducing the retention period is not allowed"));

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["status"]["reason"], "RetentionPeriodReduced");
    }

    #[test]
    fn test_denial_reason_names_the_rule() {
        let cases = [
            (Some(seed(Some(settings("96h")))), Some(seed(None)), "DisablingNotAllowed"),
            (None, Some(seed(Some(settings("-1h")))), "NonPositiveRetentionPeriod"),
        ];
        for (old, new, reason) in cases {
            let operation = if old.is_some() { "UPDATE" } else { "CREATE" };
            let response = decide(operation, new, old);
            assert!(!response.allowed);
            assert_eq!(response.result.reason, reason);
        }
    }

    #[test]
    fn test_update_without_old_object_is_denied() {
        // Disabling would pass under create rules; it must not slip through
        let response = decide("UPDATE", Some(seed(None)), None);
        assert!(!response.allowed);
        assert!(response_json(&response).contains("admission request for update has no old object"));
    }

    #[test]
    fn test_create_ignores_old_object() {
        // An old object on CREATE is not meaningful and must not trigger update rules
        let response = decide(
            "CREATE",
            Some(seed(None)),
            Some(seed(Some(settings("96h")))),
        );
        assert!(response.allowed);
    }

    #[test]
    fn test_delete_is_allowed() {
        let response = decide("DELETE", None, Some(seed(Some(settings("96h")))));
        assert!(response.allowed);
    }

    #[test]
    fn test_missing_object_is_denied() {
        let response = decide("UPDATE", None, Some(seed(None)));
        assert!(!response.allowed);
        assert!(response_json(&response).contains("admission request has no object"));
    }

    #[test]
    fn test_review_round_trip_keeps_uid() {
        let review = admission_review("CREATE", Some(seed(Some(settings("-96h")))), None);
        let answered = review_admission(&SeedValidator::new(), review);
        let body = serde_json::to_value(&answered).unwrap();
        assert_eq!(body["response"]["uid"], "7f5a3c1e-0000-4000-8000-000000000001");
        assert_eq!(body["response"]["allowed"], false);
        assert!(body.to_string().contains("retentionPeriod must be greater than zero"));
    }

    #[test]
    fn test_review_without_request_is_invalid() {
        let review: AdmissionReview<DynamicObject> = serde_json::from_value(json!({
            "apiVersion": "admission.k8s.io/v1",
            "kind": "AdmissionReview"
        }))
        .unwrap();
        let answered = review_admission(&SeedValidator::new(), review);
        let body = serde_json::to_value(&answered).unwrap();
        assert_eq!(body["response"]["allowed"], false);
    }
}
